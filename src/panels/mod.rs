//! Analysis panels and the request/update protocol they share.
//!
//! Every panel follows the same cycle:
//!
//! 1. `begin` validates input, issues a [`Ticket`] from the panel's own
//!    [`Sequencer`] and marks the panel loading (result hidden).
//! 2. The request runs through a [`Session`], which times it.
//! 3. `apply` checks the ticket. Anything but the latest ticket is
//!    [`PanelUpdate::Stale`] and changes nothing. Otherwise the payload is
//!    transformed into the panel's view-model, or the failure becomes an
//!    [`Alert`].
//! 4. The session appends the outcome to the request log.

pub mod clustering;
pub mod competitive;
pub mod overview;
pub mod sentiment;
pub mod trend;

use std::fmt;
use std::time::Instant;

use serde::Serialize;

use crate::analytics::requests::{Outcome, RequestLog, RequestLogEntry};
use crate::api::{ApiClient, ApiError, Endpoint};
use crate::config::schema::DashConfig;

pub use clustering::ClusteringPanel;
pub use competitive::CompetitivePanel;
pub use overview::OverviewPanel;
pub use sentiment::SentimentPanel;
pub use trend::TrendPanel;

// ---------------------------------------------------------------------------
// Sequencing
// ---------------------------------------------------------------------------

/// Identifies one request of one panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Ticket(u64);

impl Ticket {
    pub fn id(self) -> u64 {
        self.0
    }
}

/// Issues monotonically increasing tickets; only the newest is current.
#[derive(Debug, Clone, Default)]
pub struct Sequencer {
    latest: u64,
}

impl Sequencer {
    pub fn issue(&mut self) -> Ticket {
        self.latest += 1;
        Ticket(self.latest)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.latest
    }
}

// ---------------------------------------------------------------------------
// Alerts and updates
// ---------------------------------------------------------------------------

/// Shown when a transport-level failure prevented an analysis.
pub const REQUEST_FAILED: &str = "请求失败，请稍后再试";

/// Shown when an analysis needs a brand and none was chosen.
pub const SELECT_BRAND: &str = "请选择品牌";

/// Blocking, user-facing failure notice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alert {
    pub message: String,
}

impl Alert {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Map a failed call: server-reported failures keep their message
    /// behind `prefix`, everything else gets the generic retry notice.
    pub fn from_api(prefix: &str, err: &ApiError) -> Self {
        match err.server_message() {
            Some(message) => Self::new(format!("{prefix}: {message}")),
            None => Self::new(REQUEST_FAILED),
        }
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// What applying a response did to a panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum PanelUpdate {
    Rendered,
    /// A newer request had been issued; the response was dropped.
    Stale,
    Failed(Alert),
}

impl PanelUpdate {
    pub fn alert(&self) -> Option<&Alert> {
        match self {
            Self::Failed(alert) => Some(alert),
            _ => None,
        }
    }

    pub fn is_rendered(&self) -> bool {
        matches!(self, Self::Rendered)
    }
}

/// Visibility state of a panel's result area.
#[derive(Debug, Clone, Serialize)]
pub struct PanelState<V> {
    pub loading: bool,
    pub visible: bool,
    pub view: Option<V>,
}

impl<V> Default for PanelState<V> {
    fn default() -> Self {
        Self {
            loading: false,
            visible: false,
            view: None,
        }
    }
}

impl<V> PanelState<V> {
    /// Request issued: spinner on, result hidden.
    pub fn start(&mut self) {
        self.loading = true;
        self.visible = false;
    }

    pub fn show(&mut self, view: V) {
        self.loading = false;
        self.visible = true;
        self.view = Some(view);
    }

    /// Request failed: spinner off, result stays hidden.
    pub fn fail(&mut self) {
        self.loading = false;
    }

    /// The rendered view, if the result area is visible.
    pub fn shown(&self) -> Option<&V> {
        if self.visible { self.view.as_ref() } else { None }
    }

    pub fn shown_mut(&mut self) -> Option<&mut V> {
        if self.visible { self.view.as_mut() } else { None }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// A finished call plus what the request log needs to know about it.
#[derive(Debug)]
pub struct Fetched<T> {
    pub endpoint: Endpoint,
    pub latency_ms: u64,
    pub result: Result<T, ApiError>,
}

impl<T> Fetched<T> {
    /// Wrap an already-available result (zero latency).
    pub fn ready(endpoint: Endpoint, result: Result<T, ApiError>) -> Self {
        Self {
            endpoint,
            latency_ms: 0,
            result,
        }
    }

    pub fn meta(&self) -> RequestMeta {
        RequestMeta {
            endpoint: self.endpoint,
            latency_ms: self.latency_ms,
            error: self.result.as_ref().err().map(ToString::to_string),
        }
    }
}

/// Request facts captured before the payload is consumed.
#[derive(Debug, Clone)]
pub struct RequestMeta {
    pub endpoint: Endpoint,
    pub latency_ms: u64,
    pub error: Option<String>,
}

/// API client plus request log, shared by every panel.
#[derive(Debug, Clone)]
pub struct Session {
    client: ApiClient,
    log: RequestLog,
}

impl Session {
    pub fn new(client: ApiClient, log: RequestLog) -> Self {
        Self { client, log }
    }

    pub fn from_config(config: &DashConfig) -> Self {
        Self::new(
            ApiClient::from_config(&config.api),
            RequestLog::from_config(&config.logging),
        )
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn request_log(&self) -> &RequestLog {
        &self.log
    }

    /// Run one call and time it.
    pub fn fetch<T>(
        &self,
        endpoint: Endpoint,
        call: impl FnOnce(&ApiClient) -> Result<T, ApiError>,
    ) -> Fetched<T> {
        let start = Instant::now();
        let result = call(&self.client);
        Fetched {
            endpoint,
            latency_ms: start.elapsed().as_millis() as u64,
            result,
        }
    }

    /// Log the outcome of a request to the console tier and the JSONL log.
    pub fn record(&self, panel: &str, ticket: Ticket, meta: &RequestMeta, update: &PanelUpdate) {
        let (outcome, error) = match (update, &meta.error) {
            (PanelUpdate::Stale, _) => {
                log::debug!("{panel}: dropped stale response #{} from {}", ticket.id(), meta.endpoint);
                (Outcome::Stale, None)
            }
            (_, Some(error)) => {
                log::error!("{panel}: {error}");
                (Outcome::Failed, Some(error.clone()))
            }
            (PanelUpdate::Failed(alert), None) => {
                log::warn!("{panel}: {alert}");
                (Outcome::Failed, Some(alert.message.clone()))
            }
            (PanelUpdate::Rendered, None) => (Outcome::Ok, None),
        };

        let mut entry = RequestLogEntry::new(
            panel,
            meta.endpoint.path(),
            ticket.id(),
            outcome,
            meta.latency_ms,
        );
        if let Some(error) = error {
            entry = entry.with_error(error);
        }
        self.log.record(&entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_latest_ticket_is_current() {
        let mut seq = Sequencer::default();
        let first = seq.issue();
        assert!(seq.is_current(first));
        let second = seq.issue();
        assert!(!seq.is_current(first));
        assert!(seq.is_current(second));
        assert!(second > first);
    }

    #[test]
    fn alert_from_server_failure_keeps_message() {
        let err = ApiError::Server {
            endpoint: Endpoint::CompetitiveAnalysis,
            message: "品牌不存在".to_string(),
        };
        assert_eq!(Alert::from_api("分析失败", &err).message, "分析失败: 品牌不存在");
    }

    #[test]
    fn alert_from_transport_failure_is_generic() {
        let err = ApiError::Status {
            endpoint: Endpoint::CompetitiveAnalysis,
            status: 502,
        };
        assert_eq!(Alert::from_api("分析失败", &err).message, REQUEST_FAILED);
    }

    #[test]
    fn panel_state_hides_result_while_loading() {
        let mut state: PanelState<u32> = PanelState::default();
        state.show(1);
        assert_eq!(state.shown(), Some(&1));
        state.start();
        assert!(state.loading);
        assert_eq!(state.shown(), None);
        state.fail();
        assert!(!state.loading);
        assert_eq!(state.shown(), None);
    }

    #[test]
    fn update_serializes_with_status_tag() {
        let v = serde_json::to_value(PanelUpdate::Failed(Alert::new(SELECT_BRAND))).unwrap();
        assert_eq!(v["status"], "failed");
        assert_eq!(v["message"], SELECT_BRAND);
        let v = serde_json::to_value(PanelUpdate::Stale).unwrap();
        assert_eq!(v["status"], "stale");
    }
}
