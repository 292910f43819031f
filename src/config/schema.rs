//! Configuration schema and defaults for lapdash.
//!
//! Defines the TOML-serializable configuration structure with all sections:
//! `[api]`, `[web]`, `[logging]`, and `[display]`.
//!
//! Every field has a sensible built-in default. Users only need to set the
//! values they want to override.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level lapdash configuration.
///
/// Maps directly to the `~/.lapdash/config.toml` and `.lapdash.toml` file
/// schemas. All sections and fields are optional — missing values fall back
/// to built-in defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DashConfig {
    pub api: ApiConfig,
    pub web: WebConfig,
    pub logging: LoggingConfig,
    pub display: DisplayConfig,
}

// ---------------------------------------------------------------------------
// [api]
// ---------------------------------------------------------------------------

/// Backend analytics API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the analytics backend, without a trailing slash.
    pub base_url: String,
    /// Per-request timeout (milliseconds).
    pub timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            timeout_ms: 15_000,
        }
    }
}

// ---------------------------------------------------------------------------
// [web]
// ---------------------------------------------------------------------------

/// Embedded dashboard server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    /// Listen address for `lapdash web`.
    pub addr: String,
    /// Open the dashboard in the default browser on start.
    pub open_browser: bool,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:9747".to_string(),
            open_browser: true,
        }
    }
}

// ---------------------------------------------------------------------------
// [logging]
// ---------------------------------------------------------------------------

/// Request log and console log settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Whether the JSONL request log is written.
    pub enabled: bool,
    /// Path to the request log file. `~` is expanded to the home directory.
    pub path: String,
    /// Console log level: `"error"`, `"warn"`, `"info"`, `"debug"`.
    /// `RUST_LOG` takes precedence when set.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "~/.lapdash/requests.jsonl".to_string(),
            level: "warn".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// [display]
// ---------------------------------------------------------------------------

/// Terminal rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Maximum rows shown in terminal tables.
    pub top_n: usize,
    /// Width (in cells) of terminal bar charts.
    pub bar_width: usize,
    /// Colored terminal output.
    pub color: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            top_n: 20,
            bar_width: 40,
            color: true,
        }
    }
}

impl DashConfig {
    /// Annotated default config written by `lapdash config init`.
    pub fn default_toml() -> String {
        r#"# lapdash Configuration
# Laptop market analytics dashboard
#
# Configuration hierarchy (highest precedence wins):
#   1. Environment variables (LAPDASH_*)
#   2. Project config (.lapdash.toml in current directory)
#   3. User global config (~/.lapdash/config.toml)
#   4. Built-in defaults

[api]
base_url = "http://127.0.0.1:5000"   # Analytics backend
timeout_ms = 15000

[web]
addr = "127.0.0.1:9747"
open_browser = true

[logging]
enabled = true                        # JSONL request log
path = "~/.lapdash/requests.jsonl"
level = "warn"                        # error | warn | info | debug (RUST_LOG wins)

[display]
top_n = 20
bar_width = 40
color = true
"#
        .to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let config = DashConfig::default();
        assert_eq!(config.api.base_url, "http://127.0.0.1:5000");
        assert_eq!(config.api.timeout_ms, 15_000);
        assert_eq!(config.web.addr, "127.0.0.1:9747");
        assert!(config.logging.enabled);
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.display.top_n, 20);
    }

    #[test]
    fn deserialize_minimal_toml() {
        let toml_str = r#"
[api]
base_url = "http://analytics.local:8080"
"#;
        let config: DashConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.api.base_url, "http://analytics.local:8080");
        // Unset fields keep their defaults
        assert_eq!(config.api.timeout_ms, 15_000);
        assert!(config.web.open_browser);
    }

    #[test]
    fn empty_toml_produces_defaults() {
        let config: DashConfig = toml::from_str("").unwrap();
        assert_eq!(config.display.bar_width, 40);
        assert_eq!(config.logging.path, "~/.lapdash/requests.jsonl");
    }

    #[test]
    fn default_toml_parses_back() {
        let toml_str = DashConfig::default_toml();
        let config: DashConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config.api.base_url, DashConfig::default().api.base_url);
        assert!(config.display.color);
    }
}
