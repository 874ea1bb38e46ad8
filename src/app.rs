//! Application flows behind each subcommand
//!
//! Every flow degrades to a "no data" rendering instead of failing; only
//! saving a cookie reports an error to the caller.

use std::path::PathBuf;

use serde_json::Value;
use tracing::debug;

use crate::cache::ConfigStore;
use crate::data::sources::CREDIT_SOURCES_FIELD;
use crate::data::{
    credit_sources_from, default_usage_sources, trigger_reset_if_needed, CreditSnapshot, Fetcher,
    Orchestrator, ResetPolicy, UsageSummary, CREDITS_KEY, USAGE_KEY,
};
use crate::display::{render_missing_cookie, render_other_host, render_status, StatusLine};
use crate::error::FetchError;
use crate::extract::Record;
use crate::git;
use crate::settings::Settings;

/// Config field holding the dashboard session cookie
pub const COOKIE_FIELD: &str = "cookies";

/// Returns the saved cookie, if any
fn saved_cookie(config: &Record) -> Option<String> {
    config
        .get(COOKIE_FIELD)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
}

/// Main application state
pub struct App<F> {
    orchestrator: Orchestrator<F>,
    settings: Settings,
    cwd: PathBuf,
}

impl<F: Fetcher> App<F> {
    /// Creates the app for one invocation
    pub fn new(fetcher: F, store: ConfigStore, settings: Settings, cwd: PathBuf) -> Self {
        Self {
            orchestrator: Orchestrator::new(fetcher, store),
            settings,
            cwd,
        }
    }

    fn store(&self) -> &ConfigStore {
        self.orchestrator.store()
    }

    /// Builds the status line
    ///
    /// Falls back to an expired cache entry (rendered as a warning) when the
    /// fetch fails, and to a "no data" line when there is nothing cached.
    pub async fn status_line(&self) -> String {
        if !self.settings.uses_mirror() {
            return render_other_host(&self.settings.model, &self.settings.display_host());
        }

        let config = self.store().load();
        let Some(cookie) = saved_cookie(&config) else {
            return render_missing_cookie(&self.settings.model);
        };
        let sources = credit_sources_from(config.get(CREDIT_SOURCES_FIELD).cloned());

        let (fetched, branch, modified_files) = tokio::join!(
            self.orchestrator.get(CREDITS_KEY, &sources, &cookie),
            git::current_branch(&self.cwd),
            git::modified_files_count(&self.cwd),
        );

        let (record, stale) = match fetched {
            Some(record) => (Some(record), false),
            None => (self.store().read_entry(CREDITS_KEY).map(|e| e.data), true),
        };

        render_status(&StatusLine {
            snapshot: record.as_ref().and_then(CreditSnapshot::from_record),
            stale,
            model: self.settings.model.clone(),
            output_style: self.settings.output_style.clone(),
            branch,
            modified_files,
            workspace: self.cwd.display().to_string(),
        })
    }

    /// Refreshes the credit cache regardless of freshness, then applies the reset policy
    ///
    /// Returns whether the cache is up to date afterwards. Without a mirror
    /// base URL there is nothing to refresh, which counts as success.
    pub async fn refresh(&self) -> bool {
        if !self.settings.uses_mirror() {
            debug!("base URL is not the mirror, nothing to refresh");
            return true;
        }

        let config = self.store().load();
        let Some(cookie) = saved_cookie(&config) else {
            debug!("no cookie saved");
            return false;
        };
        let sources = credit_sources_from(config.get(CREDIT_SOURCES_FIELD).cloned());

        let Some(record) = self.orchestrator.refresh(CREDITS_KEY, &sources, &cookie).await else {
            return false;
        };

        if let Some(snapshot) = CreditSnapshot::from_record(&record) {
            let policy = ResetPolicy::from_config(&config);
            trigger_reset_if_needed(self.orchestrator.fetcher(), &policy, &snapshot, &cookie).await;
        }
        true
    }

    /// Stores the session cookie, keeping every other field
    pub fn save_cookie(&self, cookie: &str) -> Result<(), FetchError> {
        self.store()
            .set_field(COOKIE_FIELD, Value::String(cookie.to_string()))
    }

    /// Renders per-key usage for the last 24 hours
    ///
    /// Returns `None` without a cookie or when no usage data could be fetched.
    pub async fn usage_report(&self) -> Option<String> {
        let cookie = saved_cookie(&self.store().load())?;
        let record = self
            .orchestrator
            .get(USAGE_KEY, &default_usage_sources(), &cookie)
            .await?;
        Some(UsageSummary::from_record(&record).render())
    }

    /// Path of the config file in use
    pub fn config_path(&self) -> PathBuf {
        self.store().path().to_path_buf()
    }
}
