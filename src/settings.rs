//! Resolution of settings from the environment and editor settings files
//!
//! Every value comes from an ordered list of candidates; the first present one
//! wins. The environment is passed in as a lookup function so resolution has
//! no hidden inputs besides the files it is told to read.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

/// Host whose base URL enables credit lookups
pub const MIRROR_HOST: &str = "aicodemirror.com";

/// Where a setting may come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Candidate {
    /// An environment variable
    Env(String),
    /// A string field of a JSON settings file
    SettingsFile { path: PathBuf, key: String },
}

impl Candidate {
    /// Candidate read from the environment variable `name`
    pub fn env(name: &str) -> Self {
        Candidate::Env(name.to_string())
    }

    /// Candidate read from the string field `key` of the JSON file at `path`
    pub fn file(path: impl Into<PathBuf>, key: &str) -> Self {
        Candidate::SettingsFile {
            path: path.into(),
            key: key.to_string(),
        }
    }

    fn lookup(&self, env: &impl Fn(&str) -> Option<String>) -> Option<String> {
        match self {
            Candidate::Env(name) => env(name),
            Candidate::SettingsFile { path, key } => {
                let content = fs::read_to_string(path).ok()?;
                let settings: Value = serde_json::from_str(&content).ok()?;
                settings.get(key)?.as_str().map(str::to_string)
            }
        }
    }
}

/// Returns the first candidate that yields a non-empty value
pub fn resolve_first(
    candidates: &[Candidate],
    env: impl Fn(&str) -> Option<String>,
) -> Option<String> {
    candidates
        .iter()
        .filter_map(|c| c.lookup(&env))
        .find(|v| !v.trim().is_empty())
}

/// Candidates for the model name
pub fn model_candidates(home: &Path) -> Vec<Candidate> {
    vec![
        Candidate::env("ANTHROPIC_MODEL"),
        Candidate::file(home.join(".claude").join("settings.json"), "model"),
    ]
}

/// Candidates for the output style, most specific first
pub fn output_style_candidates(cwd: &Path, home: &Path) -> Vec<Candidate> {
    vec![
        Candidate::env("CLAUDE_OUTPUT_STYLE"),
        Candidate::file(cwd.join(".claude").join("settings.local.json"), "outputStyle"),
        Candidate::file(home.join(".claude").join("settings.local.json"), "outputStyle"),
        Candidate::file(cwd.join(".claude").join("settings.json"), "outputStyle"),
        Candidate::file(home.join(".claude").join("settings.json"), "outputStyle"),
    ]
}

/// Shortens a model name to its family
pub fn model_family(model: Option<&str>) -> &'static str {
    let Some(model) = model else {
        return "auto";
    };
    let lower = model.to_lowercase();
    ["haiku", "sonnet", "opus"]
        .into_iter()
        .find(|family| lower.contains(family))
        .unwrap_or("auto")
}

/// Whether credit lookups apply to this base URL
pub fn uses_mirror(base_url: Option<&str>) -> bool {
    base_url.is_some_and(|url| url.contains(MIRROR_HOST))
}

/// Host part of the base URL for display
pub fn display_host(base_url: Option<&str>) -> String {
    let Some(url) = base_url.filter(|u| !u.is_empty()) else {
        return "anthropic.com".to_string();
    };
    if url.contains(MIRROR_HOST) {
        return MIRROR_HOST.to_string();
    }

    url.split_once("://")
        .map(|(_, rest)| rest)
        .and_then(|rest| rest.split('/').next())
        .filter(|host| !host.is_empty())
        .unwrap_or("anthropic.com")
        .to_string()
}

/// Everything the status line needs from the environment
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Model family (haiku, sonnet, opus, auto)
    pub model: String,
    /// Output style name, `default` when unset
    pub output_style: String,
    /// `ANTHROPIC_BASE_URL`, if set
    pub base_url: Option<String>,
}

impl Settings {
    /// Resolves all settings for the given working and home directories
    pub fn resolve(cwd: &Path, home: &Path, env: impl Fn(&str) -> Option<String>) -> Self {
        let model = resolve_first(&model_candidates(home), &env);
        let output_style = resolve_first(&output_style_candidates(cwd, home), &env)
            .unwrap_or_else(|| "default".to_string());
        let base_url = resolve_first(&[Candidate::env("ANTHROPIC_BASE_URL")], &env);

        Self {
            model: model_family(model.as_deref()).to_string(),
            output_style,
            base_url,
        }
    }

    /// Whether credit lookups apply
    pub fn uses_mirror(&self) -> bool {
        uses_mirror(self.base_url.as_deref())
    }

    /// Host for display
    pub fn display_host(&self) -> String {
        display_host(self.base_url.as_deref())
    }
}

/// Reads a variable from the process environment
pub fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    fn write_settings(dir: &Path, file: &str, content: &str) {
        let claude = dir.join(".claude");
        fs::create_dir_all(&claude).unwrap();
        fs::write(claude.join(file), content).unwrap();
    }

    #[test]
    fn test_resolve_first_order() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("s.json");
        fs::write(&file, r#"{"model": "from-file"}"#).unwrap();

        let candidates = vec![Candidate::env("A"), Candidate::file(&file, "model")];

        assert_eq!(
            resolve_first(&candidates, env_from(&[("A", "from-env")])),
            Some("from-env".to_string())
        );
        assert_eq!(
            resolve_first(&candidates, env_from(&[])),
            Some("from-file".to_string())
        );
        assert_eq!(
            resolve_first(&candidates, env_from(&[("A", "  ")])),
            Some("from-file".to_string())
        );
    }

    #[test]
    fn test_resolve_first_skips_bad_files() {
        let temp_dir = TempDir::new().unwrap();
        let corrupt = temp_dir.path().join("corrupt.json");
        let non_string = temp_dir.path().join("number.json");
        fs::write(&corrupt, "{").unwrap();
        fs::write(&non_string, r#"{"k": 3}"#).unwrap();

        let candidates = vec![
            Candidate::file(&corrupt, "k"),
            Candidate::file(&non_string, "k"),
            Candidate::file(temp_dir.path().join("missing.json"), "k"),
        ];
        assert_eq!(resolve_first(&candidates, env_from(&[])), None);
    }

    #[test]
    fn test_output_style_precedence() {
        let cwd = TempDir::new().unwrap();
        let home = TempDir::new().unwrap();
        write_settings(home.path(), "settings.json", r#"{"outputStyle": "home"}"#);
        write_settings(cwd.path(), "settings.json", r#"{"outputStyle": "workspace"}"#);
        write_settings(home.path(), "settings.local.json", r#"{"outputStyle": "home-local"}"#);

        let settings = Settings::resolve(cwd.path(), home.path(), env_from(&[]));
        assert_eq!(settings.output_style, "home-local");

        write_settings(cwd.path(), "settings.local.json", r#"{"outputStyle": "ws-local"}"#);
        let settings = Settings::resolve(cwd.path(), home.path(), env_from(&[]));
        assert_eq!(settings.output_style, "ws-local");

        let settings = Settings::resolve(
            cwd.path(),
            home.path(),
            env_from(&[("CLAUDE_OUTPUT_STYLE", "explanatory")]),
        );
        assert_eq!(settings.output_style, "explanatory");
    }

    #[test]
    fn test_defaults_without_any_source() {
        let cwd = TempDir::new().unwrap();
        let home = TempDir::new().unwrap();

        let settings = Settings::resolve(cwd.path(), home.path(), env_from(&[]));
        assert_eq!(settings.model, "auto");
        assert_eq!(settings.output_style, "default");
        assert_eq!(settings.base_url, None);
        assert!(!settings.uses_mirror());
        assert_eq!(settings.display_host(), "anthropic.com");
    }

    #[test]
    fn test_model_from_home_settings() {
        let cwd = TempDir::new().unwrap();
        let home = TempDir::new().unwrap();
        write_settings(home.path(), "settings.json", r#"{"model": "claude-opus-4-1"}"#);

        let settings = Settings::resolve(cwd.path(), home.path(), env_from(&[]));
        assert_eq!(settings.model, "opus");
    }

    #[test]
    fn test_model_family() {
        assert_eq!(model_family(Some("claude-3-5-haiku-latest")), "haiku");
        assert_eq!(model_family(Some("Claude-Sonnet-4")), "sonnet");
        assert_eq!(model_family(Some("gpt-5")), "auto");
        assert_eq!(model_family(None), "auto");
    }

    #[test]
    fn test_mirror_detection_and_host() {
        assert!(uses_mirror(Some("https://api.aicodemirror.com/api/claudecode")));
        assert!(!uses_mirror(Some("https://api.anthropic.com")));
        assert!(!uses_mirror(None));

        assert_eq!(display_host(Some("https://api.aicodemirror.com/x")), "aicodemirror.com");
        assert_eq!(display_host(Some("https://proxy.example.com:8443/v1")), "proxy.example.com:8443");
        assert_eq!(display_host(Some("not a url")), "anthropic.com");
        assert_eq!(display_host(Some("")), "anthropic.com");
    }
}
