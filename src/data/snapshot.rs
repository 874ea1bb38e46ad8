//! Normalised view of a credit record
//!
//! The cached record keeps whatever shape the upstream sent. This module maps
//! every known shape onto the handful of numbers the status line shows.

use serde_json::Value;

use crate::extract::Record;

/// Credit figures read out of a cached record
#[derive(Debug, Clone, PartialEq)]
pub struct CreditSnapshot {
    /// Credits currently available
    pub current: f64,
    /// Daily credit allowance
    pub max: f64,
    /// Subscription plan (ULTRA, MAX, PRO, FREE, ...), if the record names one
    pub plan: Option<String>,
    /// Whether a manual reset is still available today
    pub can_reset_today: bool,
    /// Credits left in the weekly budget, when the record carries one
    pub weekly_remaining: Option<f64>,
}

impl CreditSnapshot {
    /// Reads a snapshot from any known record shape
    ///
    /// Returns `None` if no credit figure can be found at all.
    pub fn from_record(record: &Record) -> Option<Self> {
        let credits = record
            .get("creditData")
            .and_then(Value::as_object)
            .unwrap_or(record);

        let current = number(credits.get("current")).or_else(|| number(credits.get("credits")))?;
        let max = number(credits.get("max")).unwrap_or(0.0);

        let plan = [record.get("userPlan"), record.get("plan"), credits.get("plan")]
            .into_iter()
            .flatten()
            .find_map(Value::as_str)
            .map(str::to_string);

        let can_reset_today = credits
            .get("canResetToday")
            .or_else(|| record.get("canResetToday"))
            .and_then(Value::as_bool)
            .unwrap_or(false);

        Some(Self {
            current,
            max,
            plan,
            can_reset_today,
            weekly_remaining: weekly_remaining(record),
        })
    }

    /// Credits usable today, counting an unused reset as a full refill
    pub fn effective_current(&self) -> f64 {
        if self.can_reset_today {
            self.current + self.max
        } else {
            self.current
        }
    }
}

fn weekly_remaining(record: &Record) -> Option<f64> {
    if let Some(weekly) = record.get("weeklyUsageData").and_then(Value::as_object) {
        let limit = number(weekly.get("weeklyLimit"))?;
        let used = number(weekly.get("weeklyUsed")).unwrap_or(0.0);
        return Some(limit - used);
    }

    let usage = record.get("usageData").and_then(Value::as_object)?;
    let limit = number(usage.get("limit"))?;
    let used = number(usage.get("used")).unwrap_or(0.0);
    Some(limit - used)
}

/// Reads a JSON number or a numeric string
pub(crate) fn number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
