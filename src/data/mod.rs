//! Account data from the dashboard host
//!
//! This module contains the HTTP fetcher, the upstream source definitions, the
//! cache-backed orchestrator and the typed views over cached records.

pub mod client;
pub mod orchestrator;
pub mod reset;
pub mod snapshot;
pub mod sources;
pub mod usage;

pub use client::{Fetcher, HttpFetcher};
pub use orchestrator::{CacheState, Orchestrator};
pub use reset::{trigger_reset_if_needed, ResetPolicy};
pub use snapshot::CreditSnapshot;
pub use sources::{credit_sources_from, default_usage_sources, Source, CREDITS_KEY, USAGE_KEY};
pub use usage::UsageSummary;
