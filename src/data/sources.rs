//! Upstream endpoints and the extraction strategies that apply to each

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::extract::Strategy;

/// Cache key for credit records
pub const CREDITS_KEY: &str = "credits";

/// Cache key for per-key usage records
pub const USAGE_KEY: &str = "usage";

/// Config field that can replace the default credit sources
pub const CREDIT_SOURCES_FIELD: &str = "credit_sources";

fn default_accept() -> String {
    "*/*".to_string()
}

/// One endpoint to fetch plus the strategies used to read its body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    /// Name used in logs
    pub name: String,
    /// Path relative to the dashboard base URL
    pub path: String,
    /// `Accept` header value
    #[serde(default = "default_accept")]
    pub accept: String,
    /// Strategies in priority order
    pub strategies: Vec<Strategy>,
}

/// Default sources for credit data, issued concurrently and preferred in order
///
/// The dashboard page has changed shape several times; its strategies are
/// listed newest first.
pub fn default_credit_sources() -> Vec<Source> {
    vec![
        Source {
            name: "dashboard".to_string(),
            path: "/dashboard".to_string(),
            accept: "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8".to_string(),
            strategies: vec![
                Strategy::fields("weekly-usage", &["userPlan", "creditData", "weeklyUsageData"]),
                Strategy::fields("usage", &["plan", "creditData", "usageData"]),
                Strategy::embedded("initial-data", "initialData"),
            ],
        },
        Source {
            name: "credits-api".to_string(),
            path: "/api/user/credits".to_string(),
            accept: "application/json".to_string(),
            strategies: vec![Strategy::document("credits-json", None)],
        },
    ]
}

/// Default source for the last 24 hours of per-key usage
pub fn default_usage_sources() -> Vec<Source> {
    vec![Source {
        name: "usage-api".to_string(),
        path: "/api/user/usage?hours=24".to_string(),
        accept: "application/json".to_string(),
        strategies: vec![Strategy::document("usage-json", Some("records"))],
    }]
}

/// Credit sources from the config override, or the defaults
///
/// An override that is not a valid list of sources is ignored.
pub fn credit_sources_from(override_value: Option<Value>) -> Vec<Source> {
    let Some(raw) = override_value else {
        return default_credit_sources();
    };

    match serde_json::from_value::<Vec<Source>>(raw) {
        Ok(sources) if !sources.is_empty() => sources,
        Ok(_) => default_credit_sources(),
        Err(e) => {
            warn!(error = %e, "ignoring invalid {} override", CREDIT_SOURCES_FIELD);
            default_credit_sources()
        }
    }
}
