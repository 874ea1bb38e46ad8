//! Automatic credit reset when the balance falls below a threshold
//!
//! Disabled unless `autoResetEnabled` is set in the config file. The reset
//! request is fire-and-forget: its outcome never affects the status line.

use serde_json::Value;
use tracing::{debug, info};

use super::client::Fetcher;
use super::snapshot::{number, CreditSnapshot};
use crate::extract::Record;

/// Endpoint that spends the daily reset
pub const RESET_PATH: &str = "/api/user/credit-reset";

/// Threshold used when the config file does not set one
pub const DEFAULT_CREDIT_THRESHOLD: f64 = 1000.0;

/// When to trigger a reset
#[derive(Debug, Clone, PartialEq)]
pub struct ResetPolicy {
    /// `autoResetEnabled` config field
    pub enabled: bool,
    /// `creditThreshold` config field
    pub threshold: f64,
}

impl Default for ResetPolicy {
    fn default() -> Self {
        Self {
            enabled: false,
            threshold: DEFAULT_CREDIT_THRESHOLD,
        }
    }
}

impl ResetPolicy {
    /// Reads the policy from the loaded config
    pub fn from_config(config: &Record) -> Self {
        Self {
            enabled: config
                .get("autoResetEnabled")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            threshold: number(config.get("creditThreshold"))
                .filter(|t| *t > 0.0)
                .unwrap_or(DEFAULT_CREDIT_THRESHOLD),
        }
    }

    /// Whether `snapshot` calls for a reset
    pub fn should_reset(&self, snapshot: &CreditSnapshot) -> bool {
        self.enabled && snapshot.current < self.threshold
    }
}

/// Posts a reset request if the policy calls for one
///
/// Returns whether a request was sent. Failures are logged and absorbed.
pub async fn trigger_reset_if_needed<F: Fetcher>(
    fetcher: &F,
    policy: &ResetPolicy,
    snapshot: &CreditSnapshot,
    credential: &str,
) -> bool {
    if !policy.should_reset(snapshot) {
        return false;
    }

    info!(
        current = snapshot.current,
        threshold = policy.threshold,
        "credits below threshold, requesting reset"
    );
    if let Err(e) = fetcher.post(RESET_PATH, credential).await {
        debug!(error = %e, "credit reset request failed");
    }
    true
}
