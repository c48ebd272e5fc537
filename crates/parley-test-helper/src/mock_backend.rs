//! Stand-in for the REST backend that records every request it receives

use actix_web::{http::StatusCode, web, App, HttpRequest, HttpResponse, HttpServer};
use serde_json::{json, Value};
use std::{
    collections::HashMap,
    net::TcpListener,
    sync::{Arc, Mutex},
};

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: String,
    /// Path without the `/api` prefix
    pub path: String,
    pub query: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: Option<Value>,
}

#[derive(Debug, Default)]
struct BackendState {
    requests: Vec<RecordedRequest>,
    /// Keyed by "METHOD /path"
    responses: HashMap<String, (u16, Value)>,
}

#[derive(Debug, Clone)]
pub struct MockBackend {
    port: u16,
    state: Arc<Mutex<BackendState>>,
}

const API_PREFIX: &str = "/api";

impl MockBackend {
    /// Starts the backend on a random port in the background
    pub async fn spawn() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("failed to bind random port");
        let port = listener
            .local_addr()
            .expect("failed to get local address")
            .port();
        let state = Arc::new(Mutex::new(BackendState::default()));
        let app_state = web::Data::from(Arc::clone(&state));
        let server = HttpServer::new(move || {
            App::new()
                .app_data(app_state.clone())
                .default_service(web::to(record_and_respond))
        })
        .workers(1)
        .listen(listener)
        .expect("failed to listen")
        .run();
        tokio::spawn(server);
        Self { port, state }
    }

    pub fn api_url(&self) -> String {
        format!("http://127.0.0.1:{}{API_PREFIX}", self.port)
    }

    /// Sets the response for `method` + `path` (path without the `/api` prefix)
    pub fn respond_with(&self, method: &str, path: &str, status: u16, body: Value) {
        self.state
            .lock()
            .unwrap()
            .responses
            .insert(format!("{method} {path}"), (status, body));
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    /// The only request received, panics if there is not exactly one
    pub fn single_request(&self) -> RecordedRequest {
        let mut requests = self.requests();
        assert_eq!(requests.len(), 1, "expected exactly one request: {requests:#?}");
        requests.remove(0)
    }
}

async fn record_and_respond(
    req: HttpRequest,
    body: web::Bytes,
    state: web::Data<Mutex<BackendState>>,
) -> HttpResponse {
    let header = |name: &str| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };
    let path = req
        .path()
        .strip_prefix(API_PREFIX)
        .unwrap_or(req.path())
        .to_string();
    let recorded = RecordedRequest {
        method: req.method().to_string(),
        path: path.clone(),
        query: req.query_string().to_string(),
        authorization: header("authorization"),
        content_type: header("content-type"),
        body: if body.is_empty() {
            None
        } else {
            Some(serde_json::from_slice(&body).unwrap_or(Value::Null))
        },
    };
    let mut guard = state.lock().unwrap();
    guard.requests.push(recorded);
    let (status, body) = guard
        .responses
        .get(&format!("{} {path}", req.method()))
        .cloned()
        .unwrap_or_else(|| (200, json!({"ok": true})));
    HttpResponse::build(StatusCode::from_u16(status).unwrap()).json(body)
}
