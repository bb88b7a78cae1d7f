use std::{collections::HashMap, sync::Arc};

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::{
    net::TcpListener,
    sync::{oneshot, Mutex},
};

use crate::{ApiClient, AppStore, MemoryTokenStore};

#[derive(Debug, Clone)]
pub(crate) struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub body: Value,
    pub authorization: Option<String>,
}

#[derive(Debug, Clone)]
enum Reply {
    Json(StatusCode, Value),
    Echo,
    Empty,
}

struct Gate {
    arrived: oneshot::Sender<Value>,
    release: oneshot::Receiver<()>,
}

#[derive(Clone, Default)]
struct BackendState {
    replies: Arc<Mutex<HashMap<String, Reply>>>,
    gates: Arc<Mutex<HashMap<String, Gate>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

/// In-process stand-in for the forecasting API. Routes are keyed by
/// `"METHOD /path?query"`; anything unregistered answers 404.
pub(crate) struct MockBackend {
    pub url: String,
    state: BackendState,
}

fn route_key(method: &str, path: &str) -> String {
    format!("{} /{}", method.to_ascii_uppercase(), path.trim_start_matches('/'))
}

async fn handle(
    State(state): State<BackendState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string());
    let key = route_key(method.as_str(), &path);
    let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);

    state.requests.lock().await.push(RecordedRequest {
        method: method.to_string(),
        path: path.clone(),
        body: body.clone(),
        authorization: headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    });

    let gate = state.gates.lock().await.remove(&key);
    if let Some(gate) = gate {
        let _ = gate.arrived.send(body.clone());
        let _ = gate.release.await;
    }

    let reply = state.replies.lock().await.get(&key).cloned();
    match reply {
        Some(Reply::Json(status, value)) => (status, Json(value)).into_response(),
        Some(Reply::Echo) => (StatusCode::OK, Json(body)).into_response(),
        Some(Reply::Empty) => StatusCode::OK.into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({ "msg": "not found" }))).into_response(),
    }
}

pub(crate) async fn spawn_backend() -> MockBackend {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let state = BackendState::default();
    let app = Router::new().fallback(handle).with_state(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    MockBackend {
        url: format!("http://{addr}/"),
        state,
    }
}

impl MockBackend {
    pub fn store(&self) -> Arc<AppStore> {
        let api = ApiClient::new(&self.url, Arc::new(MemoryTokenStore::new())).expect("api");
        AppStore::new(api)
    }

    pub async fn reply(&self, method: &str, path: &str, body: Value) {
        self.reply_status(method, path, 200, body).await;
    }

    pub async fn reply_status(&self, method: &str, path: &str, status: u16, body: Value) {
        let status = StatusCode::from_u16(status).expect("status");
        self.state
            .replies
            .lock()
            .await
            .insert(route_key(method, path), Reply::Json(status, body));
    }

    /// Answers with the request body, as a save endpoint would.
    pub async fn echo(&self, method: &str, path: &str) {
        self.state
            .replies
            .lock()
            .await
            .insert(route_key(method, path), Reply::Echo);
    }

    /// Answers 200 with no body at all.
    pub async fn reply_empty(&self, method: &str, path: &str) {
        self.state
            .replies
            .lock()
            .await
            .insert(route_key(method, path), Reply::Empty);
    }

    /// Holds the next matching request until the returned sender fires. The
    /// receiver yields the request body once the request has arrived.
    pub async fn gate(&self, method: &str, path: &str) -> (oneshot::Receiver<Value>, oneshot::Sender<()>) {
        let (arrived_tx, arrived_rx) = oneshot::channel();
        let (release_tx, release_rx) = oneshot::channel();
        self.state.gates.lock().await.insert(
            route_key(method, path),
            Gate {
                arrived: arrived_tx,
                release: release_rx,
            },
        );
        (arrived_rx, release_tx)
    }

    pub async fn hits(&self, method: &str, path: &str) -> usize {
        let key = route_key(method, path);
        self.state
            .requests
            .lock()
            .await
            .iter()
            .filter(|r| route_key(&r.method, &r.path) == key)
            .count()
    }

    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().await.clone()
    }
}

pub(crate) fn scenario_json(id: &str, name: &str) -> Value {
    json!({
        "id": id,
        "saved": {
            "name": name,
            "configs": { "cost_bigdeal": 2100000, "include_bronze": true },
            "subrs": ["0140-6736"]
        },
        "summary": { "cost_percent": 38.5, "num_journals_subscribed": 1 },
        "configs": { "cost_bigdeal": 2100000, "include_bronze": true },
        "subrs": ["0140-6736"],
        "journals": []
    })
}

pub(crate) fn publisher_json(id: &str, scenario_ids: &[&str]) -> Value {
    let scenarios: Vec<Value> = scenario_ids.iter().map(|sid| json!({ "id": sid })).collect();
    json!({
        "id": id,
        "publisher": "Elsevier",
        "name": "Elsevier 2021",
        "is_demo": false,
        "scenarios": scenarios,
        "journal_detail": { "counts": { "in_counter": 2 } },
        "journals": [
            { "issnl": "0140-6736", "title": "The Lancet", "issns": ["0140-6736"], "price": 1200.0 },
            { "issnl": "1234-5678", "title": "Orphan", "error": "missing_price" }
        ],
        "data_files": [
            { "name": "counter", "uploaded": true, "is_live": true },
            { "name": "counter-trj2", "uploaded": false },
            { "name": "counter-trj3", "uploaded": false },
            { "name": "counter-trj4", "uploaded": false },
            { "name": "prices", "uploaded": true, "is_live": true },
            { "name": "perpetual-access", "uploaded": false }
        ],
        "warnings": [
            { "id": "missing_perpetual_access", "is_dismissed": false },
            { "id": "missing_prices", "is_dismissed": true }
        ],
        "cost_bigdeal": 2100000.0,
        "is_owned_by_consortium": true,
        "currency": "GBP"
    })
}
