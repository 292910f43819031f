//! Configuration system for lapdash.
//!
//! Provides a layered configuration hierarchy:
//!
//! 1. **Built-in defaults** — hardcoded in [`schema::DashConfig::default()`]
//! 2. **User global config** — `~/.lapdash/config.toml`
//! 3. **Project local config** — `.lapdash.toml` in the current working directory
//! 4. **Environment variables** — `LAPDASH_*` overrides (highest precedence)
//!
//! Later layers override earlier ones. Missing sections in a TOML file fall
//! back to defaults.
//!
//! # Usage
//!
//! ```rust,ignore
//! use lapdash::config;
//!
//! let cfg = config::load();
//! let client = lapdash::api::ApiClient::from_config(&cfg.api);
//! ```

pub mod schema;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

pub use schema::DashConfig;

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the fully resolved lapdash configuration.
///
/// Merges all layers in order: defaults → global TOML → project TOML → env
/// vars. File layers merge key by key, so a project file that only sets
/// `[api] base_url` keeps every other value from the global file.
pub fn load() -> DashConfig {
    let mut merged = toml::Table::new();
    for path in [global_config_path(), project_config_path()] {
        if let Some(layer) = load_toml_file(path) {
            merge_tables(&mut merged, layer);
        }
    }

    let mut config = toml::Value::Table(merged)
        .try_into::<DashConfig>()
        .unwrap_or_else(|e| {
            log::warn!("ignoring config files: {e}");
            DashConfig::default()
        });

    apply_env_overrides(&mut config);

    config
}

/// Load one TOML config file as a raw table.
///
/// Returns `None` if the path is `None`, the file doesn't exist, or the
/// content is malformed. A malformed file is reported on the console log and
/// otherwise ignored.
fn load_toml_file(path: Option<PathBuf>) -> Option<toml::Table> {
    let path = path?;
    let content = fs::read_to_string(&path).ok()?;
    let table = match toml::from_str::<toml::Table>(&content) {
        Ok(table) => table,
        Err(e) => {
            log::warn!("ignoring malformed config {}: {e}", path.display());
            return None;
        }
    };
    // Reject a layer whose values do not fit the schema before it can
    // poison the merge.
    if let Err(e) = toml::Value::Table(table.clone()).try_into::<DashConfig>() {
        log::warn!("ignoring invalid config {}: {e}", path.display());
        return None;
    }
    Some(table)
}

/// Overlay `overlay` onto `base`, recursing into tables present in both.
fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        let toml::Value::Table(nested) = value else {
            base.insert(key, value);
            continue;
        };
        if let Some(toml::Value::Table(existing)) = base.get_mut(&key) {
            merge_tables(existing, nested);
            continue;
        }
        base.insert(key, toml::Value::Table(nested));
    }
}

// ---------------------------------------------------------------------------
// File paths
// ---------------------------------------------------------------------------

/// Path to the user global config: `~/.lapdash/config.toml`.
fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".lapdash").join("config.toml"))
}

/// Path to the project local config: `.lapdash.toml` in the current directory.
fn project_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|cwd| cwd.join(".lapdash.toml"))
}

/// Return the path to the global config file for display/init purposes.
pub fn global_config_file() -> Option<PathBuf> {
    global_config_path()
}

/// Return the path to the project config file for display purposes.
pub fn project_config_file() -> Option<PathBuf> {
    project_config_path()
}

/// Expand a leading `~` to the home directory.
pub fn expand_home(path: &str) -> Option<PathBuf> {
    if path == "~" {
        return dirs::home_dir();
    }
    match path.strip_prefix("~/") {
        Some(rest) => dirs::home_dir().map(|home| home.join(rest)),
        None => Some(PathBuf::from(path)),
    }
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides (highest precedence layer).
///
/// Supported variables:
/// - `LAPDASH_API_URL` — backend base URL
/// - `LAPDASH_TIMEOUT_MS` — per-request timeout
/// - `LAPDASH_WEB_ADDR` — listen address for `lapdash web`
/// - `LAPDASH_REQUEST_LOG` — request log enabled (`1`/`true`/`yes`/`on`)
/// - `LAPDASH_LOG_LEVEL` — console log level
/// - `NO_COLOR` — disable colored output when set to anything
fn apply_env_overrides(config: &mut DashConfig) {
    if let Ok(val) = std::env::var("LAPDASH_API_URL")
        && !val.is_empty()
    {
        config.api.base_url = val;
    }
    if let Ok(val) = std::env::var("LAPDASH_TIMEOUT_MS")
        && let Ok(ms) = val.parse::<u64>()
    {
        config.api.timeout_ms = ms;
    }
    if let Ok(val) = std::env::var("LAPDASH_WEB_ADDR")
        && !val.is_empty()
    {
        config.web.addr = val;
    }
    if let Ok(val) = std::env::var("LAPDASH_REQUEST_LOG") {
        config.logging.enabled = is_truthy(&val);
    }
    if let Ok(val) = std::env::var("LAPDASH_LOG_LEVEL")
        && let Some(level) = parse_level(&val)
    {
        config.logging.level = level.to_string();
    }
    if std::env::var_os("NO_COLOR").is_some() {
        config.display.color = false;
    }
}

/// Check if a string value represents a truthy boolean.
fn is_truthy(val: &str) -> bool {
    matches!(
        val.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Normalize a console log level name.
fn parse_level(val: &str) -> Option<&'static str> {
    match val.to_ascii_lowercase().as_str() {
        "error" => Some("error"),
        "warn" | "warning" => Some("warn"),
        "info" => Some("info"),
        "debug" => Some("debug"),
        "trace" => Some("trace"),
        "off" => Some("off"),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Config init / set / reset
// ---------------------------------------------------------------------------

/// Write the default annotated config to `~/.lapdash/config.toml`.
///
/// Returns an error if the file already exists (use `force = true` to
/// overwrite).
pub fn init_config(force: bool) -> Result<PathBuf> {
    let path = global_config_path().context("could not determine home directory")?;

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create ~/.lapdash/ directory")?;
    }

    fs::write(&path, DashConfig::default_toml()).context("failed to write config file")?;

    Ok(path)
}

/// Set a single config key to a value in the global config file.
///
/// Supports dotted keys like `api.base_url`. When no file exists yet the
/// defaults are serialized first and the key is updated in that tree.
pub fn set_config_value(key: &str, value: &str) -> Result<()> {
    let path = global_config_path().context("could not determine home directory")?;

    let mut value_table: toml::Value = if path.exists() {
        let content = fs::read_to_string(&path).context("failed to read config file")?;
        toml::from_str(&content).context("failed to parse config as TOML value")?
    } else {
        let defaults = toml::to_string_pretty(&DashConfig::default())
            .context("failed to serialize default config")?;
        toml::from_str(&defaults).context("failed to parse serialized defaults")?
    };

    set_toml_value(&mut value_table, key, value)?;

    // Reject values that no longer deserialize into the schema
    let output =
        toml::to_string_pretty(&value_table).context("failed to serialize updated config")?;
    toml::from_str::<DashConfig>(&output)
        .with_context(|| format!("invalid value for '{key}': {value}"))?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }
    fs::write(&path, output).context("failed to write config file")?;

    Ok(())
}

/// Set a value in a TOML value tree using a dotted key path.
fn set_toml_value(root: &mut toml::Value, key: &str, raw_value: &str) -> Result<()> {
    let parts: Vec<&str> = key.split('.').collect();
    if parts.iter().any(|p| p.is_empty()) {
        anyhow::bail!("empty config key segment in '{key}'");
    }

    let mut current = root;
    for &part in &parts[..parts.len() - 1] {
        current = current
            .get_mut(part)
            .with_context(|| format!("config key not found: section '{part}' in '{key}'"))?;
    }

    let leaf = parts[parts.len() - 1];

    let table = current.as_table_mut().with_context(|| {
        format!(
            "expected table at '{}'",
            key.rsplit_once('.').map(|(s, _)| s).unwrap_or("")
        )
    })?;

    let new_value = match table.get(leaf) {
        Some(toml::Value::Boolean(_)) => toml::Value::Boolean(is_truthy(raw_value)),
        Some(toml::Value::Integer(_)) => {
            let n: i64 = raw_value
                .parse()
                .with_context(|| format!("expected integer for '{key}', got '{raw_value}'"))?;
            toml::Value::Integer(n)
        }
        Some(toml::Value::Float(_)) => {
            let f: f64 = raw_value
                .parse()
                .with_context(|| format!("expected float for '{key}', got '{raw_value}'"))?;
            toml::Value::Float(f)
        }
        Some(_) => toml::Value::String(raw_value.to_string()),
        None => anyhow::bail!("unknown config key: '{key}'"),
    };

    table.insert(leaf.to_string(), new_value);
    Ok(())
}

/// Reset the global config to defaults (overwrite the file).
pub fn reset_config() -> Result<PathBuf> {
    init_config(true)
}

/// Show the effective (fully resolved) config as TOML.
pub fn show_effective_config() -> Result<String> {
    let config = load();
    toml::to_string_pretty(&config).context("failed to serialize effective config")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_truthy_accepts_variants() {
        assert!(is_truthy("1"));
        assert!(is_truthy("TRUE"));
        assert!(is_truthy("yes"));
        assert!(is_truthy("on"));
        assert!(!is_truthy("0"));
        assert!(!is_truthy("off"));
        assert!(!is_truthy(""));
    }

    #[test]
    fn parse_level_handles_variants() {
        assert_eq!(parse_level("WARN"), Some("warn"));
        assert_eq!(parse_level("warning"), Some("warn"));
        assert_eq!(parse_level("debug"), Some("debug"));
        assert_eq!(parse_level("loud"), None);
    }

    #[test]
    fn expand_home_handles_relative_and_tilde() {
        assert_eq!(
            expand_home("logs/requests.jsonl"),
            Some(PathBuf::from("logs/requests.jsonl"))
        );
        if let Some(home) = dirs::home_dir() {
            assert_eq!(
                expand_home("~/.lapdash/requests.jsonl"),
                Some(home.join(".lapdash/requests.jsonl"))
            );
        }
    }

    #[test]
    fn set_toml_value_updates_string() {
        let mut root: toml::Value = toml::from_str(
            r#"
[api]
base_url = "http://127.0.0.1:5000"
"#,
        )
        .unwrap();
        set_toml_value(&mut root, "api.base_url", "http://10.0.0.2:5000").unwrap();
        assert_eq!(
            root["api"]["base_url"].as_str(),
            Some("http://10.0.0.2:5000")
        );
    }

    #[test]
    fn set_toml_value_updates_bool_and_integer() {
        let mut root: toml::Value = toml::from_str(
            r#"
[web]
open_browser = true

[api]
timeout_ms = 15000
"#,
        )
        .unwrap();
        set_toml_value(&mut root, "web.open_browser", "no").unwrap();
        set_toml_value(&mut root, "api.timeout_ms", "2500").unwrap();
        assert_eq!(root["web"]["open_browser"].as_bool(), Some(false));
        assert_eq!(root["api"]["timeout_ms"].as_integer(), Some(2500));
    }

    #[test]
    fn set_toml_value_rejects_bad_integer() {
        let mut root: toml::Value = toml::from_str("[api]\ntimeout_ms = 1\n").unwrap();
        assert!(set_toml_value(&mut root, "api.timeout_ms", "soon").is_err());
    }

    #[test]
    fn set_toml_value_rejects_unknown_keys() {
        let mut root: toml::Value = toml::from_str("[api]\ntimeout_ms = 1\n").unwrap();
        assert!(set_toml_value(&mut root, "nonexistent.key", "value").is_err());
        assert!(set_toml_value(&mut root, "api.retries", "3").is_err());
        assert!(set_toml_value(&mut root, "api..timeout_ms", "3").is_err());
    }

    #[test]
    fn merge_tables_keeps_unrelated_keys() {
        let mut base: toml::Table = toml::from_str(
            r#"
[api]
base_url = "http://global:5000"
timeout_ms = 2000

[display]
color = false
"#,
        )
        .unwrap();
        let overlay: toml::Table =
            toml::from_str("[api]\nbase_url = \"http://project:5000\"\n").unwrap();
        merge_tables(&mut base, overlay);

        let config: DashConfig = toml::Value::Table(base).try_into().unwrap();
        assert_eq!(config.api.base_url, "http://project:5000");
        assert_eq!(config.api.timeout_ms, 2000);
        assert!(!config.display.color);
        assert_eq!(config.display.top_n, 20);
    }

    #[test]
    fn show_effective_config_returns_toml() {
        let toml_str = show_effective_config().unwrap();
        let _: DashConfig = toml::from_str(&toml_str).unwrap();
    }
}
