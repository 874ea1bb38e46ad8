//! Per-API-key usage over the last 24 hours

use std::collections::HashMap;

use serde_json::Value;

use super::snapshot::number;
use crate::extract::Record;

/// Credits used by one API key
#[derive(Debug, Clone, PartialEq)]
pub struct KeyUsage {
    /// `apiKeyLabel` of the key
    pub label: String,
    /// Sum of `creditsUsed`, in raw credit units
    pub credits: f64,
}

/// Usage totals per key, largest first
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UsageSummary {
    /// One entry per key, sorted by credits descending
    pub keys: Vec<KeyUsage>,
}

impl UsageSummary {
    /// Aggregates the `records` array of a usage record
    ///
    /// Entries without a label are counted under `(unlabelled)`.
    pub fn from_record(record: &Record) -> Self {
        let mut totals: HashMap<String, f64> = HashMap::new();

        let entries = record
            .get("records")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();

        for entry in entries {
            let label = entry
                .get("apiKeyLabel")
                .and_then(Value::as_str)
                .unwrap_or("(unlabelled)");
            let credits = number(entry.get("creditsUsed")).unwrap_or(0.0);
            *totals.entry(label.to_string()).or_insert(0.0) += credits;
        }

        let mut keys: Vec<KeyUsage> = totals
            .into_iter()
            .map(|(label, credits)| KeyUsage { label, credits })
            .collect();
        keys.sort_by(|a, b| {
            b.credits
                .total_cmp(&a.credits)
                .then_with(|| a.label.cmp(&b.label))
        });

        Self { keys }
    }

    /// Sum over all keys
    pub fn total(&self) -> f64 {
        self.keys.iter().map(|k| k.credits).sum()
    }

    /// Renders the summary as an aligned table
    pub fn render(&self) -> String {
        let mut lines: Vec<String> = self
            .keys
            .iter()
            .enumerate()
            .map(|(i, key)| {
                format!(
                    "{:>2}. {:<20} {:>10}",
                    i + 1,
                    key.label,
                    format_thousandths(key.credits)
                )
            })
            .collect();

        lines.push(format!("{:<24} {:>10}", "Total", format_thousandths(self.total())));
        lines.join("\n")
    }
}

/// Formats raw credits as thousandths with three decimals (1405 -> "1.405")
pub fn format_thousandths(credits: f64) -> String {
    format!("{:.3}", credits / 1000.0)
}
