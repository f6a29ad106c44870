//! Local stand-in for the MobSF REST API.
//!
//! Serves canned responses per path from an axum app running on its own
//! current-thread tokio runtime, and records every request so tests can
//! assert on what the client sent.

#![allow(dead_code)]

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const API_PREFIX: &str = "/api/v1";
pub const API_KEY: &str = "0123456789abcdef";
pub const HASH: &str = "3a4c8b1f2e9d7a6b5c4d3e2f1a0b9c8d";
pub const PDF_BYTES: &[u8] = b"%PDF-1.4\n% fake report\n%%EOF\n";

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl Recorded {
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[derive(Debug, Clone)]
pub struct Canned {
    pub status: StatusCode,
    pub content_type: &'static str,
    pub body: Vec<u8>,
    pub delay: Option<Duration>,
}

impl Canned {
    pub fn json(status: u16, value: Value) -> Self {
        Canned {
            status: StatusCode::from_u16(status).expect("valid status"),
            content_type: "application/json",
            body: value.to_string().into_bytes(),
            delay: None,
        }
    }

    /// Hold the response back, like a scan that takes a while to finish.
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn pdf() -> Self {
        Canned {
            status: StatusCode::OK,
            content_type: "application/pdf",
            body: PDF_BYTES.to_vec(),
            delay: None,
        }
    }
}

pub fn sample_report() -> Value {
    json!({
        "file_name": "app.apk",
        "md5": HASH,
        "appsec": {"security_score": 52, "high": [], "warning": []},
        "permissions": {"android.permission.INTERNET": {"status": "normal"}}
    })
}

/// Responses of a healthy MobSF instance for every endpoint the tool uses.
pub fn happy_routes() -> HashMap<&'static str, Canned> {
    HashMap::from([
        (
            "/upload",
            Canned::json(
                200,
                json!({"analyzer": "static_analyzer", "status": "success", "hash": HASH, "scan_type": "apk", "file_name": "app.apk"}),
            ),
        ),
        ("/scan", Canned::json(200, json!({"version": "4.0.0"}))),
        ("/report_json", Canned::json(200, sample_report())),
        ("/download_pdf", Canned::pdf()),
        (
            "/dynamic/get_apps",
            Canned::json(200, json!({"apks": [{"MD5": HASH, "APP_NAME": "app"}], "status": "ok"})),
        ),
        ("/dynamic/start_analysis", Canned::json(200, json!({"status": "ok"}))),
        ("/dynamic/stop_analysis", Canned::json(200, json!({"status": "ok"}))),
    ])
}

struct Shared {
    routes: HashMap<&'static str, Canned>,
    calls: Mutex<Vec<Recorded>>,
}

pub struct FakeMobsf {
    pub base_url: String,
    shared: Arc<Shared>,
}

impl FakeMobsf {
    pub fn start(routes: HashMap<&'static str, Canned>) -> Self {
        let shared = Arc::new(Shared {
            routes,
            calls: Mutex::new(Vec::new()),
        });
        let app = Router::new().fallback(handle).with_state(shared.clone());

        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind fake server");
        listener.set_nonblocking(true).expect("nonblocking listener");
        let addr = listener.local_addr().expect("local addr");

        std::thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("tokio runtime");
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::from_std(listener).expect("tokio listener");
                axum::serve(listener, app).await.expect("serve");
            });
        });

        FakeMobsf {
            base_url: format!("http://{}{}", addr, API_PREFIX),
            shared,
        }
    }

    pub fn happy() -> Self {
        Self::start(happy_routes())
    }

    pub fn with(path: &'static str, canned: Canned) -> Self {
        let mut routes = happy_routes();
        routes.insert(path, canned);
        Self::start(routes)
    }

    pub fn calls(&self) -> Vec<Recorded> {
        self.shared.calls.lock().expect("calls lock").clone()
    }

    pub fn paths(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.path).collect()
    }
}

async fn handle(
    State(shared): State<Arc<Shared>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri
        .path()
        .strip_prefix(API_PREFIX)
        .unwrap_or(uri.path())
        .to_string();
    let header_str = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let recorded = Recorded {
        method,
        authorization: header_str(header::AUTHORIZATION),
        content_type: header_str(header::CONTENT_TYPE),
        body: body.to_vec(),
        path: path.clone(),
    };
    shared.calls.lock().expect("calls lock").push(recorded);

    match shared.routes.get(path.as_str()).cloned() {
        Some(canned) => {
            if let Some(delay) = canned.delay {
                tokio::time::sleep(delay).await;
            }
            (
                canned.status,
                [(header::CONTENT_TYPE, canned.content_type)],
                canned.body,
            )
                .into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
