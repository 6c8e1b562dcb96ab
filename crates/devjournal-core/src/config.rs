//! Typed configuration: YAML on disk, `${VAR}` environment interpolation, sensible defaults.
//!
//! Source format and load order per external interface spec: `<repo>/.devjournalrc.yaml`,
//! falling back to `~/.devjournalrc.yaml`, falling back to built-in defaults. Unknown keys in
//! the YAML are ignored with a warning rather than rejected.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::Deserialize;
use serde_yaml::Value;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct JournalConfig {
    pub path: String,
    pub auto_generate: bool,
    pub include_terminal: bool,
    pub include_chat: bool,
    pub include_mood: bool,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            path: "journal/".to_string(),
            auto_generate: true,
            include_terminal: true,
            include_chat: true,
            include_mood: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GitConfig {
    pub exclude_patterns: Vec<String>,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            exclude_patterns: vec!["journal/**".to_string(), ".devjournalrc.yaml".to_string()],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    pub provider: String,
    pub model: String,
    pub openai_api_key: String,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-4o-mini".to_string(),
            openai_api_key: String::new(),
        }
    }
}

impl AiConfig {
    /// The environment variable name this provider's key is conventionally sourced from,
    /// used by the AI Invoker's auth-error short-circuit (spec §4.7).
    pub fn api_key_env_var(&self) -> &'static str {
        match self.provider.as_str() {
            "anthropic" => "ANTHROPIC_API_KEY",
            _ => "OPENAI_API_KEY",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    pub enabled: bool,
    pub service_name: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            service_name: "devjournal".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub journal: JournalConfig,
    pub git: GitConfig,
    pub ai: AiConfig,
    pub telemetry: TelemetryConfig,
}

const KNOWN_TOP_LEVEL_KEYS: &[&str] = &["journal", "git", "ai", "telemetry"];

/// Loads configuration starting at `repo_path`, per the documented search order.
pub fn load_config(repo_path: &Path) -> Result<AppConfig> {
    let repo_config = repo_path.join(".devjournalrc.yaml");
    if repo_config.is_file() {
        return load_from_file(&repo_config);
    }

    if let Some(home) = dirs::home_dir() {
        let home_config = home.join(".devjournalrc.yaml");
        if home_config.is_file() {
            return load_from_file(&home_config);
        }
    }

    Ok(AppConfig::default())
}

fn load_from_file(path: &PathBuf) -> Result<AppConfig> {
    let raw = std::fs::read_to_string(path)?;
    let raw_value: Value = serde_yaml::from_str(&raw)
        .map_err(|e| Error::config(format!("invalid YAML in {}: {e}", path.display())))?;

    warn_unknown_keys(&raw_value);

    let resolved = resolve_env_vars(raw_value)?;

    serde_yaml::from_value(resolved)
        .map_err(|e| Error::config(format!("invalid configuration in {}: {e}", path.display())))
}

fn warn_unknown_keys(value: &Value) {
    if let Value::Mapping(map) = value {
        for key in map.keys() {
            if let Some(key_str) = key.as_str() {
                if !KNOWN_TOP_LEVEL_KEYS.contains(&key_str) {
                    log::warn!("ignoring unknown configuration key: {key_str}");
                }
            }
        }
    }
}

/// Recursively resolves `${VAR_NAME}` references against the process environment.
/// Missing or malformed variable names are a fatal `Config` error.
pub fn resolve_env_vars(value: Value) -> Result<Value> {
    match value {
        Value::String(s) => Ok(Value::String(resolve_env_vars_in_string(&s)?)),
        Value::Mapping(map) => {
            let mut out = serde_yaml::Mapping::new();
            for (k, v) in map {
                out.insert(k, resolve_env_vars(v)?);
            }
            Ok(Value::Mapping(out))
        }
        Value::Sequence(seq) => {
            let mut out = Vec::with_capacity(seq.len());
            for item in seq {
                out.push(resolve_env_vars(item)?);
            }
            Ok(Value::Sequence(out))
        }
        other => Ok(other),
    }
}

fn resolve_env_vars_in_string(text: &str) -> Result<String> {
    let var_pattern = Regex::new(r"\$\{([^}]*)\}").unwrap();
    let valid_name = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();

    for caps in var_pattern.captures_iter(text) {
        let name = &caps[1];
        if !valid_name.is_match(name) {
            return Err(Error::config(format!(
                "invalid environment variable syntax: ${{{name}}}"
            )));
        }
    }

    let mut err = None;
    let result = var_pattern.replace_all(text, |caps: &regex::Captures| {
        let name = &caps[1];
        match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
                err = Some(Error::config(format!(
                    "environment variable '{name}' not found"
                )));
                String::new()
            }
        }
    });

    if let Some(e) = err {
        return Err(e);
    }

    Ok(result.into_owned())
}

/// Checks whether every path in `changed_files` falls under the journal root or an excluded
/// glob, per the "journal-only commit" exclusion (Glossary; SPEC_FULL.md §1).
pub fn is_journal_only_commit(config: &AppConfig, changed_files: &[String]) -> bool {
    if changed_files.is_empty() {
        return false;
    }
    let journal_prefix = config.journal.path.trim_end_matches('/');
    let excluded: HashSet<&str> = config
        .git
        .exclude_patterns
        .iter()
        .map(|s| s.trim_end_matches("/**"))
        .collect();

    changed_files.iter().all(|f| {
        f.starts_with(journal_prefix) || excluded.iter().any(|prefix| f.starts_with(prefix))
    })
}
