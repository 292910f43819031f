//! Structured request log: one JSONL line per panel request.
//!
//! Log file: `~/.lapdash/requests.jsonl` by default (`[logging] path`).
//! Writing is best-effort; a log that cannot be written never fails the
//! request it describes.

use std::fs::{self, OpenOptions, create_dir_all};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::config::expand_home;
use crate::config::schema::LoggingConfig;

// ---------------------------------------------------------------------------
// Entry
// ---------------------------------------------------------------------------

/// How a request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// Rendered into its panel.
    Ok,
    /// Answered, but a newer request had already been issued.
    Stale,
    /// Transport, status, decode or server-reported failure, or a
    /// blocking alert such as insufficient data.
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestLogEntry {
    pub timestamp: String,
    /// Panel that issued the request (`"competitive"`, `"overview"`, ...).
    pub panel: String,
    pub endpoint: String,
    pub ticket: u64,
    pub outcome: Outcome,
    pub latency_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}

impl RequestLogEntry {
    pub fn new(panel: &str, endpoint: &str, ticket: u64, outcome: Outcome, latency_ms: u64) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            panel: panel.to_string(),
            endpoint: endpoint.to_string(),
            ticket,
            outcome,
            latency_ms,
            error: None,
        }
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}

// ---------------------------------------------------------------------------
// Log handle
// ---------------------------------------------------------------------------

/// Append-only JSONL sink. A disabled log drops every entry.
#[derive(Debug, Clone, Default)]
pub struct RequestLog {
    path: Option<PathBuf>,
}

impl RequestLog {
    pub fn from_config(config: &LoggingConfig) -> Self {
        if !config.enabled {
            return Self::disabled();
        }
        Self {
            path: expand_home(&config.path),
        }
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    pub fn disabled() -> Self {
        Self { path: None }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Append an entry, ignoring I/O failures.
    pub fn record(&self, entry: &RequestLogEntry) {
        if let Err(e) = self.append(entry) {
            log::debug!("request log write failed: {e}");
        }
    }

    fn append(&self, entry: &RequestLogEntry) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        let json = serde_json::to_string(entry)?;
        writeln!(file, "{json}")?;

        Ok(())
    }

    /// Every readable entry. Malformed lines are skipped; a missing file
    /// reads as empty.
    pub fn read_all(&self) -> Vec<RequestLogEntry> {
        let Some(path) = &self.path else {
            return Vec::new();
        };
        let Ok(file) = fs::File::open(path) else {
            return Vec::new();
        };

        BufReader::new(file)
            .lines()
            .map_while(Result::ok)
            .filter_map(|line| serde_json::from_str::<RequestLogEntry>(&line).ok())
            .collect()
    }

    pub fn summarize(&self) -> LogSummary {
        LogSummary::from_entries(&self.read_all())
    }
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// Aggregate view of the request log, reported by `lapdash health`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LogSummary {
    pub total: usize,
    pub ok: usize,
    pub stale: usize,
    pub failed: usize,
    pub avg_latency_ms: f64,
    pub last_failure: Option<String>,
}

impl LogSummary {
    pub fn from_entries(entries: &[RequestLogEntry]) -> Self {
        let mut summary = Self {
            total: entries.len(),
            ..Self::default()
        };
        let mut latency_sum = 0u64;

        for entry in entries {
            latency_sum += entry.latency_ms;
            match entry.outcome {
                Outcome::Ok => summary.ok += 1,
                Outcome::Stale => summary.stale += 1,
                Outcome::Failed => {
                    summary.failed += 1;
                    summary.last_failure = Some(format!(
                        "{} {}: {}",
                        entry.timestamp,
                        entry.endpoint,
                        entry.error.as_deref().unwrap_or("unknown")
                    ));
                }
            }
        }

        if summary.total > 0 {
            summary.avg_latency_ms = latency_sum as f64 / summary.total as f64;
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_log(name: &str) -> RequestLog {
        let dir = std::env::temp_dir().join(format!("lapdash-reqlog-{}-{name}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        RequestLog::at(dir.join("requests.jsonl"))
    }

    #[test]
    fn record_then_read_back() {
        let log = temp_log("roundtrip");
        log.record(&RequestLogEntry::new("trend", "/api/price_trend_prediction", 1, Outcome::Ok, 12));
        log.record(
            &RequestLogEntry::new("trend", "/api/price_trend_prediction", 2, Outcome::Failed, 30)
                .with_error("HTTP 500"),
        );

        let entries = log.read_all();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].outcome, Outcome::Failed);
        assert_eq!(entries[1].error.as_deref(), Some("HTTP 500"));

        let summary = log.summarize();
        assert_eq!(summary.total, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.avg_latency_ms, 21.0);
        assert!(summary.last_failure.unwrap().contains("HTTP 500"));
    }

    #[test]
    fn disabled_log_is_silent() {
        let log = RequestLog::disabled();
        log.record(&RequestLogEntry::new("overview", "/api/overview_stats", 1, Outcome::Ok, 1));
        assert!(log.read_all().is_empty());
        assert_eq!(log.summarize(), LogSummary::default());
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let log = temp_log("malformed");
        let path = log.path().unwrap().to_path_buf();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "not json\n").unwrap();
        log.record(&RequestLogEntry::new("clustering", "/api/laptop_clustering", 1, Outcome::Stale, 5));
        let entries = log.read_all();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].outcome, Outcome::Stale);
    }
}
