//! Local HTTP stand-in for the Spanner REST API used by the unit tests.
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use axum::{
    Router,
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri, header},
};
use serde_json::{Value, json};
use tokio::net::TcpListener;

pub(crate) struct SpannerStub {
    fail_batch: Option<usize>,
    execute: (StatusCode, String),
    batches: AtomicUsize,
    created: AtomicUsize,
    deleted: Mutex<Vec<String>>,
    auth: Mutex<Vec<String>>,
}

impl SpannerStub {
    pub(crate) fn new() -> Self {
        Self {
            fail_batch: None,
            execute: (StatusCode::OK, json!({ "rows": [["1"]] }).to_string()),
            batches: AtomicUsize::new(0),
            created: AtomicUsize::new(0),
            deleted: Mutex::new(Vec::new()),
            auth: Mutex::new(Vec::new()),
        }
    }

    /// The `n`-th `batchCreate` call (1-based) answers 429 `RESOURCE_EXHAUSTED`.
    pub(crate) fn fail_batch(mut self, n: usize) -> Self {
        self.fail_batch = Some(n);
        self
    }

    /// Raw response returned by every `executeSql`.
    pub(crate) fn execute_responds(mut self, status: StatusCode, body: impl Into<String>) -> Self {
        self.execute = (status, body.into());
        self
    }

    /// Bind to an ephemeral port and serve until the test runtime shuts down.
    pub(crate) async fn serve(self) -> (Arc<Self>, String) {
        let stub = Arc::new(self);
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = format!("http://{}", listener.local_addr().unwrap());

        let router = Router::new().fallback(handle).with_state(Arc::clone(&stub));
        tokio::spawn(async move { axum::serve(listener, router).await });

        (stub, endpoint)
    }

    pub(crate) fn batches(&self) -> usize {
        self.batches.load(Ordering::SeqCst)
    }

    pub(crate) fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub(crate) fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }

    /// `Authorization` header of every request received, empty when absent.
    pub(crate) fn auth_headers(&self) -> Vec<String> {
        self.auth.lock().unwrap().clone()
    }
}

async fn handle(
    State(stub): State<Arc<SpannerStub>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, String) {
    let auth = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    stub.auth.lock().unwrap().push(auth);

    let path = uri.path().trim_start_matches("/v1/").to_string();

    if method == Method::DELETE {
        stub.deleted.lock().unwrap().push(path);
        return (StatusCode::OK, "{}".into());
    }

    if let Some(database) = path.strip_suffix("/sessions:batchCreate") {
        let batch = stub.batches.fetch_add(1, Ordering::SeqCst) + 1;
        if stub.fail_batch == Some(batch) {
            let err = json!({
                "error": { "code": 429, "message": "too many sessions", "status": "RESOURCE_EXHAUSTED" }
            });
            return (StatusCode::TOO_MANY_REQUESTS, err.to_string());
        }

        let count = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| v["sessionCount"].as_u64())
            .unwrap_or(0) as usize;
        let first = stub.created.fetch_add(count, Ordering::SeqCst);
        let sessions: Vec<Value> = (first..first + count)
            .map(|i| json!({ "name": format!("{database}/sessions/s{i}") }))
            .collect();
        return (StatusCode::OK, json!({ "session": sessions }).to_string());
    }

    if path.ends_with(":executeSql") {
        return stub.execute.clone();
    }

    (StatusCode::NOT_FOUND, String::new())
}
