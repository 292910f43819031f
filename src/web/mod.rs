//! Embedded web dashboard for lapdash.
//!
//! Provides a lightweight HTTP server (sync, via `tiny_http`) that serves:
//! - The single-page dashboard
//! - `/view/*` endpoints returning rendered panel view-models as JSON
//! - `/api/config` for reading and editing configuration
//!
//! Launched via `lapdash web` (default: `http://127.0.0.1:9747`).

mod api;
mod frontend;

use std::io::{self, Cursor, Read};
use std::sync::mpsc::{self, Receiver};
use std::thread;

use anyhow::{Context, Result};
use tiny_http::{Header, Method, Request, Response, Server, StatusCode};

use crate::config::schema::DashConfig;
use crate::panels::Session;

use api::{Dashboard, HttpResponse};

// ---------------------------------------------------------------------------
// Server entry point
// ---------------------------------------------------------------------------

/// Start the dashboard server on `addr`.
///
/// Blocks the current thread. Requests are handled one at a time against a
/// single [`Dashboard`]; a failing handler answers 500 and the loop carries
/// on.
pub fn serve(config: &DashConfig, addr: &str) -> Result<()> {
    let server = Server::http(addr)
        .map_err(|e| anyhow::anyhow!("failed to start HTTP server on {addr}: {e}"))?;

    println!("lapdash dashboard running at http://{addr}");
    println!("Backend: {}", config.api.base_url);
    println!("Press Ctrl+C to stop.\n");

    if config.web.open_browser {
        let url = format!("http://{addr}");
        if let Err(e) = open_browser(&url) {
            log::warn!("{e:#}");
        }
    }

    let mut dashboard = Dashboard::new(Session::from_config(config));

    for mut request in server.incoming_requests() {
        let method = request.method().clone();
        let url = request.url().to_string();
        let path = url.split('?').next().unwrap_or(&url).to_string();

        if method == Method::Get && path == "/view/overview" {
            stream_overview(&mut dashboard, request);
            access_log(&method, &url);
            continue;
        }

        let body = if matches!(method, Method::Put | Method::Post) {
            let mut buf = String::new();
            let _ = request.as_reader().read_to_string(&mut buf);
            Some(buf)
        } else {
            None
        };

        match dispatch(&mut dashboard, &method, &url, body.as_deref()) {
            Ok(resp) => {
                let _ = request.respond(resp);
            }
            Err(e) => {
                log::error!("{method} {url}: {e:#}");
                let body = serde_json::json!({ "error": format!("{e:#}") }).to_string();
                let resp = Response::from_data(body.into_bytes())
                    .with_header(content_type_json())
                    .with_status_code(StatusCode(500));
                let _ = request.respond(resp);
            }
        }

        access_log(&method, &url);
    }

    Ok(())
}

fn access_log(method: &Method, url: &str) {
    println!("{} {} {}", method, url, chrono::Local::now().format("%H:%M:%S"));
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

fn dispatch(
    dashboard: &mut Dashboard,
    method: &Method,
    url: &str,
    body: Option<&str>,
) -> Result<HttpResponse> {
    let path = url.split('?').next().unwrap_or(url);

    match (method, path) {
        (&Method::Get, "/") | (&Method::Get, "/index.html") => Ok(serve_frontend()),

        // Views
        (&Method::Get, "/view/state") => dashboard.get_state(),
        (&Method::Get, "/view/dropdowns") => dashboard.get_dropdowns(),
        (&Method::Get, "/view/rams") => dashboard.get_rams(url),
        (&Method::Post, "/view/tab") => dashboard.post_tab(url),
        (&Method::Get, "/view/competitive") => dashboard.get_competitive(url),
        (&Method::Get, "/view/trend") => dashboard.get_trend(url),
        (&Method::Get, "/view/sentiment") => dashboard.get_sentiment(url),
        (&Method::Get, "/view/clusters") => dashboard.get_clusters(),
        (&Method::Get, "/view/health") => dashboard.get_health(),

        // Configuration
        (&Method::Get, "/api/config") => api::get_config(),
        (&Method::Put, "/api/config") => api::put_config(body.unwrap_or("{}")),

        _ => Ok(not_found()),
    }
}

// ---------------------------------------------------------------------------
// Overview stream
// ---------------------------------------------------------------------------

/// Answer `/view/overview` with one NDJSON line per settled request, each
/// carrying the whole overview panel, so the page's progress bar follows
/// the real requests.
fn stream_overview(dashboard: &mut Dashboard, request: Request) {
    let (tx, rx) = mpsc::channel::<Vec<u8>>();

    thread::scope(|scope| {
        scope.spawn(move || {
            dashboard.run_overview(|panel| match serde_json::to_vec(panel) {
                Ok(mut line) => {
                    line.push(b'\n');
                    let _ = tx.send(line);
                }
                Err(e) => log::error!("failed to serialize overview: {e}"),
            });
        });

        let resp = Response::new(
            StatusCode(200),
            vec![content_type_ndjson()],
            LineReader::new(rx),
            None,
            None,
        );
        if let Err(e) = request.respond(resp) {
            log::warn!("overview stream aborted: {e}");
        }
    });
}

/// Reads channel messages back to back until every sender is gone.
struct LineReader {
    rx: Receiver<Vec<u8>>,
    current: Cursor<Vec<u8>>,
}

impl LineReader {
    fn new(rx: Receiver<Vec<u8>>) -> Self {
        Self {
            rx,
            current: Cursor::new(Vec::new()),
        }
    }
}

impl Read for LineReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        loop {
            let n = self.current.read(buf)?;
            if n > 0 || buf.is_empty() {
                return Ok(n);
            }
            match self.rx.recv() {
                Ok(next) => self.current = Cursor::new(next),
                Err(_) => return Ok(0),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

fn serve_frontend() -> HttpResponse {
    Response::from_data(frontend::INDEX_HTML.as_bytes().to_vec())
        .with_header(header("text/html; charset=utf-8"))
        .with_status_code(StatusCode(200))
}

fn not_found() -> HttpResponse {
    let body = r#"{"error": "not found"}"#;
    Response::from_data(body.as_bytes().to_vec())
        .with_header(content_type_json())
        .with_status_code(StatusCode(404))
}

fn header(content_type: &'static str) -> Header {
    Header::from_bytes("Content-Type", content_type).expect("static header must be valid")
}

pub(crate) fn content_type_json() -> Header {
    header("application/json; charset=utf-8")
}

fn content_type_ndjson() -> Header {
    header("application/x-ndjson; charset=utf-8")
}

/// Attempt to open a URL in the system default browser.
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", url])
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_reader_concatenates_messages() {
        let (tx, rx) = mpsc::channel();
        tx.send(b"{\"a\":1}\n".to_vec()).unwrap();
        tx.send(Vec::new()).unwrap();
        tx.send(b"{\"a\":2}\n".to_vec()).unwrap();
        drop(tx);

        let mut out = String::new();
        LineReader::new(rx).read_to_string(&mut out).unwrap();
        assert_eq!(out, "{\"a\":1}\n{\"a\":2}\n");
    }

    #[test]
    fn unknown_route_is_not_found() {
        use crate::analytics::requests::RequestLog;
        use crate::api::ApiClient;
        use std::time::Duration;

        let client = ApiClient::new("http://127.0.0.1:9", Duration::from_millis(200));
        let mut dash = Dashboard::new(Session::new(client, RequestLog::disabled()));
        let resp = dispatch(&mut dash, &Method::Get, "/nope", None).unwrap();
        assert_eq!(resp.status_code().0, 404);
        let resp = dispatch(&mut dash, &Method::Get, "/", None).unwrap();
        assert_eq!(resp.status_code().0, 200);
    }
}
