//! JSON handlers for the web dashboard.
//!
//! The server owns one [`Dashboard`] for its whole lifetime, so panel
//! tickets, chart slots, dropdowns and tab selections persist across
//! requests the way they would on a long-lived page.

use std::io::Cursor;

use anyhow::{Context, Result};
use serde::Serialize;
use tiny_http::{Response, StatusCode};

use crate::analytics::requests::LogSummary;
use crate::config::{self, schema::DashConfig};
use crate::panels::trend::TrendRequest;
use crate::panels::{
    ClusteringPanel, CompetitivePanel, OverviewPanel, PanelUpdate, SentimentPanel, Session,
    TrendPanel,
};
use crate::view::dropdown::FilterDropdowns;
use crate::view::tabs::{Tab, TabGroup};

use super::content_type_json;

pub type HttpResponse = Response<Cursor<Vec<u8>>>;

// ---------------------------------------------------------------------------
// JSON response types
// ---------------------------------------------------------------------------

/// What an analysis request did, plus the panel as it now stands.
#[derive(Serialize)]
struct PanelResponse<'a, P> {
    update: &'a PanelUpdate,
    panel: &'a P,
}

/// Everything the page needs on first load.
#[derive(Serialize)]
struct StateResponse<'a> {
    dropdowns: &'a FilterDropdowns,
    chart_tabs: &'a TabGroup,
    advanced_tabs: &'a TabGroup,
}

#[derive(Serialize)]
struct TabResponse<'a> {
    group: &'a str,
    changed: bool,
    active: Option<&'a Tab>,
    visible_panel: Option<&'a str>,
}

#[derive(Serialize)]
struct HealthResponse {
    backend_ok: bool,
    base_url: String,
    config_exists: bool,
    request_log: Option<String>,
    requests: LogSummary,
}

#[derive(Serialize)]
struct ConfigResponse {
    config: DashConfig,
    toml_text: String,
}

/// Config update request: a list of dotted key / value pairs.
#[derive(serde::Deserialize)]
struct ConfigUpdateRequest {
    updates: Vec<ConfigKeyValue>,
}

#[derive(serde::Deserialize)]
struct ConfigKeyValue {
    key: String,
    value: String,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn json_response<T: Serialize>(data: &T) -> Result<HttpResponse> {
    json_with_status(data, 200)
}

fn json_with_status<T: Serialize>(data: &T, status: u16) -> Result<HttpResponse> {
    let body = serde_json::to_string(data).context("failed to serialize JSON response")?;
    Ok(Response::from_data(body.into_bytes())
        .with_header(content_type_json())
        .with_status_code(StatusCode(status)))
}

fn panel_response<P: Serialize>(update: &PanelUpdate, panel: &P) -> Result<HttpResponse> {
    json_response(&PanelResponse { update, panel })
}

/// Percent-decoded value of query parameter `key`. A key without `=`
/// yields an empty string.
fn query_param(url: &str, key: &str) -> Option<String> {
    url.split_once('?')?.1.split('&').find_map(|pair| {
        let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
        if k != key {
            return None;
        }
        urlencoding::decode(&v.replace('+', " "))
            .ok()
            .map(|s| s.into_owned())
    })
}

// ---------------------------------------------------------------------------
// Dashboard state
// ---------------------------------------------------------------------------

/// Server-side page state: one instance of every panel and control.
pub struct Dashboard {
    session: Session,
    overview: OverviewPanel,
    competitive: CompetitivePanel,
    trend: TrendPanel,
    sentiment: SentimentPanel,
    clustering: ClusteringPanel,
    dropdowns: FilterDropdowns,
    chart_tabs: TabGroup,
    advanced_tabs: TabGroup,
}

impl Dashboard {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            overview: OverviewPanel::new(),
            competitive: CompetitivePanel::new(),
            trend: TrendPanel::new(),
            sentiment: SentimentPanel::new(),
            clustering: ClusteringPanel::new(),
            dropdowns: FilterDropdowns::new(),
            chart_tabs: TabGroup::chart_tabs(),
            advanced_tabs: TabGroup::advanced_tabs(),
        }
    }

    /// Run the overview, handing each intermediate panel to `on_update`.
    pub fn run_overview(&mut self, on_update: impl FnMut(&OverviewPanel)) {
        self.overview.run(&self.session, on_update);
    }

    // -----------------------------------------------------------------------
    // Handlers
    // -----------------------------------------------------------------------

    /// `GET /view/state` — dropdowns and tab groups as they stand.
    pub fn get_state(&self) -> Result<HttpResponse> {
        json_response(&StateResponse {
            dropdowns: &self.dropdowns,
            chart_tabs: &self.chart_tabs,
            advanced_tabs: &self.advanced_tabs,
        })
    }

    /// `GET /view/dropdowns` — reload every filter selector from the backend.
    pub fn get_dropdowns(&mut self) -> Result<HttpResponse> {
        self.dropdowns = FilterDropdowns::load(self.session.client());
        json_response(&self.dropdowns)
    }

    /// `GET /view/rams?brand=B` — narrow the trend RAM selector to `B`.
    pub fn get_rams(&mut self, url: &str) -> Result<HttpResponse> {
        let brand = query_param(url, "brand").unwrap_or_default();
        self.dropdowns.select_trend_brand(&brand);
        json_response(&self.dropdowns.trend_ram)
    }

    /// `POST /view/tab?group=charts|advanced&tab=ID`
    pub fn post_tab(&mut self, url: &str) -> Result<HttpResponse> {
        let group_name = query_param(url, "group").unwrap_or_default();
        let tab = query_param(url, "tab").unwrap_or_default();
        let group = match group_name.as_str() {
            "charts" => &mut self.chart_tabs,
            "advanced" => &mut self.advanced_tabs,
            _ => {
                return json_with_status(
                    &serde_json::json!({ "error": format!("unknown tab group '{group_name}'") }),
                    400,
                );
            }
        };
        let changed = group.activate(&tab).is_some();
        json_response(&TabResponse {
            group: &group_name,
            changed,
            active: group.active(),
            visible_panel: group.visible_panel(),
        })
    }

    /// `GET /view/competitive?brand=B`
    pub fn get_competitive(&mut self, url: &str) -> Result<HttpResponse> {
        let brand = query_param(url, "brand").unwrap_or_default();
        let update = self.competitive.run(&self.session, &brand);
        panel_response(&update, &self.competitive)
    }

    /// `GET /view/trend?brand=&ram=&days=` — every parameter optional.
    pub fn get_trend(&mut self, url: &str) -> Result<HttpResponse> {
        let brand = query_param(url, "brand");
        let ram = query_param(url, "ram");
        let days = query_param(url, "days");
        let request = TrendRequest::from_form(brand.as_deref(), ram.as_deref(), days.as_deref());
        let update = self.trend.run(&self.session, &request);
        panel_response(&update, &self.trend)
    }

    /// `GET /view/sentiment?brand=B`
    pub fn get_sentiment(&mut self, url: &str) -> Result<HttpResponse> {
        let brand = query_param(url, "brand").unwrap_or_default();
        let update = self.sentiment.run(&self.session, &brand);
        panel_response(&update, &self.sentiment)
    }

    /// `GET /view/clusters`
    pub fn get_clusters(&mut self) -> Result<HttpResponse> {
        let update = self.clustering.run(&self.session);
        panel_response(&update, &self.clustering)
    }

    /// `GET /view/health` — backend reachability and request log summary.
    pub fn get_health(&self) -> Result<HttpResponse> {
        let client = self.session.client();
        let log = self.session.request_log();
        let resp = HealthResponse {
            backend_ok: client.is_healthy(),
            base_url: client.base_url().to_string(),
            config_exists: config::global_config_file()
                .map(|p| p.exists())
                .unwrap_or(false),
            request_log: log.path().map(|p| p.display().to_string()),
            requests: log.summarize(),
        };
        json_response(&resp)
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// `GET /api/config` — current effective configuration.
pub fn get_config() -> Result<HttpResponse> {
    let cfg = config::load();
    let toml_text = toml::to_string_pretty(&cfg).unwrap_or_default();
    json_response(&ConfigResponse {
        config: cfg,
        toml_text,
    })
}

/// `PUT /api/config` — update configuration keys.
///
/// Expects `{ "updates": [{ "key": "api.timeout_ms", "value": "5000" }] }`.
/// Takes effect on the next start.
pub fn put_config(body: &str) -> Result<HttpResponse> {
    let req: ConfigUpdateRequest =
        serde_json::from_str(body).context("invalid JSON in config update request")?;

    let mut errors: Vec<String> = Vec::new();
    let mut applied: Vec<String> = Vec::new();
    for kv in &req.updates {
        match config::set_config_value(&kv.key, &kv.value) {
            Ok(()) => applied.push(format!("{} = {}", kv.key, kv.value)),
            Err(e) => errors.push(format!("{}: {}", kv.key, e)),
        }
    }

    json_response(&serde_json::json!({
        "applied": applied,
        "errors": errors,
        "success": errors.is_empty(),
    }))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::analytics::requests::RequestLog;
    use crate::api::ApiClient;
    use crate::panels::SELECT_BRAND;

    fn offline_dashboard() -> Dashboard {
        let client = ApiClient::new("http://127.0.0.1:9", Duration::from_millis(200));
        Dashboard::new(Session::new(client, RequestLog::disabled()))
    }

    #[test]
    fn query_param_decodes_values() {
        assert_eq!(
            query_param("/view/competitive?brand=%E8%81%94%E6%83%B3", "brand").as_deref(),
            Some("联想")
        );
        assert_eq!(
            query_param("/view/trend?brand=Dell+XPS&ram=16GB", "brand").as_deref(),
            Some("Dell XPS")
        );
        assert_eq!(query_param("/view/trend?brand=A&ram=16GB", "ram").as_deref(), Some("16GB"));
    }

    #[test]
    fn query_param_handles_missing_and_bare_keys() {
        assert_eq!(query_param("/view/clusters", "brand"), None);
        assert_eq!(query_param("/view/trend?ram=8GB", "brand"), None);
        assert_eq!(query_param("/view/trend?brand", "brand").as_deref(), Some(""));
        assert_eq!(query_param("/view/trend?brand=", "brand").as_deref(), Some(""));
    }

    #[test]
    fn tab_switch_changes_visible_panel() {
        let mut dash = offline_dashboard();
        let resp = dash.post_tab("/view/tab?group=advanced&tab=trend-tab").unwrap();
        assert_eq!(resp.status_code().0, 200);
        assert_eq!(dash.advanced_tabs.visible_panel(), Some("trend"));

        dash.post_tab("/view/tab?group=advanced&tab=nope").unwrap();
        assert_eq!(dash.advanced_tabs.visible_panel(), Some("trend"));
    }

    #[test]
    fn unknown_tab_group_is_bad_request() {
        let mut dash = offline_dashboard();
        let resp = dash.post_tab("/view/tab?group=sidebar&tab=x").unwrap();
        assert_eq!(resp.status_code().0, 400);
    }

    #[test]
    fn competitive_without_brand_never_loads() {
        let mut dash = offline_dashboard();
        let resp = dash.get_competitive("/view/competitive?brand=").unwrap();
        assert_eq!(resp.status_code().0, 200);
        assert!(!dash.competitive.state.loading);
        assert!(dash.competitive.view().is_none());
    }

    #[test]
    fn panel_response_serializes_update_and_panel() {
        let update = PanelUpdate::Failed(crate::panels::Alert::new(SELECT_BRAND));
        let panel = SentimentPanel::new();
        let json = serde_json::to_value(PanelResponse {
            update: &update,
            panel: &panel,
        })
        .unwrap();
        assert_eq!(json["update"]["status"], "failed");
        assert_eq!(json["update"]["message"], SELECT_BRAND);
        assert_eq!(json["panel"]["visible"], false);
    }

    #[test]
    fn config_update_request_deserializes() {
        let json = r#"{"updates": [{"key": "api.timeout_ms", "value": "5000"}]}"#;
        let req: ConfigUpdateRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.updates.len(), 1);
        assert_eq!(req.updates[0].key, "api.timeout_ms");
    }
}
