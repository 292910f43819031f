//! Canned analytics backend for integration tests.
//!
//! Runs a `tiny_http` server on an ephemeral port in a background thread
//! and answers each path with a fixed envelope. Unknown paths get a 404.
#![allow(dead_code)]

use std::collections::HashMap;
use std::thread;
use std::time::Duration;

use lapdash::analytics::requests::RequestLog;
use lapdash::api::ApiClient;
use lapdash::panels::Session;
use serde_json::{Value, json};
use tiny_http::{Header, Response, Server, StatusCode};

pub struct MockBackend {
    base_url: String,
}

impl MockBackend {
    /// Serve `routes`, each a request path and the JSON body to answer with.
    pub fn start(routes: Vec<(&str, String)>) -> Self {
        let server = Server::http("127.0.0.1:0").expect("bind mock backend");
        let addr = server
            .server_addr()
            .to_ip()
            .expect("mock backend listens on an IP address");
        let routes: HashMap<String, String> = routes
            .into_iter()
            .map(|(path, body)| (path.to_string(), body))
            .collect();

        thread::spawn(move || {
            for request in server.incoming_requests() {
                let path = request.url().split('?').next().unwrap_or("").to_string();
                let (status, body) = match routes.get(&path) {
                    Some(body) => (200, body.clone()),
                    None => (404, r#"{"error": "not found"}"#.to_string()),
                };
                let header = Header::from_bytes("Content-Type", "application/json").unwrap();
                let resp = Response::from_string(body)
                    .with_header(header)
                    .with_status_code(StatusCode(status));
                let _ = request.respond(resp);
            }
        });

        Self {
            base_url: format!("http://{addr}"),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn client(&self) -> ApiClient {
        ApiClient::new(&self.base_url, Duration::from_secs(5))
    }

    pub fn session(&self) -> Session {
        Session::new(self.client(), RequestLog::disabled())
    }

    pub fn session_with_log(&self, log: RequestLog) -> Session {
        Session::new(self.client(), log)
    }
}

/// A session whose backend refuses every connection.
pub fn offline_session() -> Session {
    let client = ApiClient::new("http://127.0.0.1:9", Duration::from_millis(500));
    Session::new(client, RequestLog::disabled())
}

pub fn ok(data: Value) -> String {
    json!({ "success": true, "data": data }).to_string()
}

pub fn fail(message: &str) -> String {
    json!({ "success": false, "message": message }).to_string()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn brand_analysis() -> Value {
    json!([
        {"brand": "Lenovo", "count": 40, "avg_price": 6200.5, "total_sales": 6000},
        {"brand": "ASUS", "count": 30, "avg_price": 5400.0, "total_sales": 3000},
        {"brand": "apple", "count": 12, "avg_price": 11999.0, "total_sales": 1000},
        {"brand": "Lenovo", "count": 1, "avg_price": 3000.0, "total_sales": 0}
    ])
}

pub fn ram_analysis() -> Value {
    json!([
        {"ram": "32GB", "count": 10, "avg_price": 9000.0, "total_sales": 800},
        {"ram": "8GB", "count": 25, "avg_price": 4000.0, "total_sales": 3000},
        {"ram": "未知", "count": 2, "avg_price": 3000.0, "total_sales": 10},
        {"ram": "16GB", "count": 45, "avg_price": 6000.0, "total_sales": 6000}
    ])
}

pub fn brand_ram_options() -> Value {
    json!([
        {"brand": "Lenovo", "ram": "32GB"},
        {"brand": "Lenovo", "ram": "16GB"},
        {"brand": "ASUS", "ram": "8GB"},
        {"brand": "ASUS", "ram": null}
    ])
}

/// Every route the overview and dropdowns read, all succeeding.
pub fn market_routes() -> Vec<(&'static str, String)> {
    vec![
        (
            "/api/overview_stats",
            ok(json!({"total_products": 82, "avg_price": 6543.21, "total_sales": 10000, "total_brands": 3})),
        ),
        ("/api/brand_analysis", ok(brand_analysis())),
        ("/api/ram_analysis", ok(ram_analysis())),
        ("/api/brand_ram_options", ok(brand_ram_options())),
        (
            "/api/price_range_analysis",
            ok(json!([
                {"range": "0-3000", "count": 5, "avg_price": 2500.0, "total_sales": 400},
                {"range": "3000-6000", "count": 50, "avg_price": 4800.0, "total_sales": 7000}
            ])),
        ),
        (
            "/api/price_sales_correlation",
            ok(json!({
                "correlation": -0.31234,
                "price_sales_data": [
                    {"price_range": "0-3000", "avg_price": 2500.0, "avg_sales": 80.0, "count": 5},
                    {"price_range": "3000-6000", "avg_price": null, "avg_sales": 140.0, "count": 0}
                ]
            })),
        ),
        (
            "/api/cpu_analysis",
            ok(json!([{"cpu": "i7-13700H", "count": 20, "avg_price": 7000.0, "total_sales": 2000}])),
        ),
    ]
}
