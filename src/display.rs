//! Rendering of the single status line

use crate::data::CreditSnapshot;

/// Purple (#BD93F9) for a normal line
const PURPLE: &str = "\x1b[38;2;189;147;249m";
/// Bold red for warnings and missing data
const RED: &str = "\x1b[31;1m";
const RESET: &str = "\x1b[0m";

/// Separator between status line parts
const SEPARATOR: &str = " | ";

/// Inputs for one rendering of the status line
#[derive(Debug, Clone, PartialEq)]
pub struct StatusLine {
    /// Credit figures, if any record was available
    pub snapshot: Option<CreditSnapshot>,
    /// The record came from an expired cache entry because the fetch failed
    pub stale: bool,
    /// Model family
    pub model: String,
    /// Output style name
    pub output_style: String,
    /// Current git branch
    pub branch: Option<String>,
    /// Number of modified files in the working tree
    pub modified_files: usize,
    /// Working directory
    pub workspace: String,
}

/// Icon for a subscription plan; unknown or missing plans get `❓`
pub fn plan_icon(plan: Option<&str>) -> &'static str {
    match plan {
        Some("ULTRA") => "👑",
        Some("MAX") => "💎",
        Some("PRO") => "⭐",
        Some("FREE") => "🆓",
        _ => "❓",
    }
}

/// Formats a credit amount without a trailing `.0`
fn format_credits(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{:.1}", value)
    }
}

/// Joins the non-blank parts with the separator
fn join_parts(parts: &[String]) -> String {
    parts
        .iter()
        .filter(|p| !p.trim().is_empty())
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(SEPARATOR)
}

/// Renders the status line with ANSI colors
pub fn render_status(line: &StatusLine) -> String {
    let Some(snapshot) = &line.snapshot else {
        return format!("{}🔴 no credit data ({}){}", RED, line.model, RESET);
    };

    let budget = snapshot.weekly_remaining.unwrap_or(snapshot.max);
    let credits = format!(
        "{} {}/{} ({})",
        plan_icon(snapshot.plan.as_deref()),
        format_credits(snapshot.effective_current()),
        format_credits(budget),
        line.model
    );

    let style = if line.output_style == "default" {
        String::new()
    } else {
        line.output_style.clone()
    };
    let branch = line
        .branch
        .as_ref()
        .map(|b| format!("{}({})", b, line.modified_files))
        .unwrap_or_default();

    let color = if line.stale { RED } else { PURPLE };
    format!(
        "{}{}{}",
        color,
        join_parts(&[credits, style, branch, line.workspace.clone()]),
        RESET
    )
}

/// Line shown when no session cookie has been saved
pub fn render_missing_cookie(model: &str) -> String {
    format!("{}🍪 cookie required ({}){}", RED, model, RESET)
}

/// Line shown when the base URL is not the mirror
pub fn render_other_host(model: &str, host: &str) -> String {
    format!("{}{}{}", model, SEPARATOR, host)
}
