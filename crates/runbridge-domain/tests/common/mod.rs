//! In-memory stand-in for the platform API, plugged in as the client's
//! transport.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE, HeaderName, HeaderValue};
use runbridge_client::{
    ApiRequest, ApiResponse, PAGINATION_TOTAL_HEADER, PlatformClient, RequestBody, RetryPolicy,
    Transport,
};
use runbridge_domain::{Actions, DomainConfig, DomainServices};
use serde_json::{Value, json};

#[derive(Default)]
struct State {
    runs: Vec<Value>,
    datasets: Vec<(Value, Vec<Value>)>,
    stores: Vec<Value>,
    records: HashMap<(String, String), (String, Vec<u8>)>,
    webhooks: Vec<Value>,
    actors: Vec<Value>,
    tasks: Vec<Value>,
    failures: HashMap<String, u16>,
    delays: HashMap<String, Duration>,
    requests: Vec<ApiRequest>,
    next_id: u32,
}

impl State {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}{}", prefix, self.next_id)
    }
}

/// Fake platform. Clones share state.
#[derive(Clone, Default)]
pub struct FakePlatform {
    state: Arc<Mutex<State>>,
}

impl FakePlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn client(&self) -> PlatformClient {
        PlatformClient::builder()
            .token("test-token")
            .retry_policy(RetryPolicy::none())
            .transport(Arc::new(self.clone()))
            .build()
            .unwrap()
    }

    pub fn actions(&self) -> Actions {
        self.actions_with(DomainConfig::default())
    }

    pub fn actions_with(&self, config: DomainConfig) -> Actions {
        Actions::new(DomainServices::new(self.client(), config))
    }

    // ── fixtures ────────────────────────────────────────────────────────────

    pub fn add_run(&self, run: Value) {
        self.state.lock().runs.push(run);
    }

    pub fn add_dataset(&self, id: &str, name: Option<&str>, act_id: Option<&str>, items: Vec<Value>) {
        let meta = json!({"id": id, "name": name, "actId": act_id, "itemCount": items.len()});
        self.state.lock().datasets.push((meta, items));
    }

    pub fn add_store(&self, id: &str, name: Option<&str>) {
        self.state
            .lock()
            .stores
            .push(json!({"id": id, "name": name, "userId": "u1"}));
    }

    pub fn add_record(&self, store_id: &str, key: &str, content_type: &str, content: &[u8]) {
        self.state.lock().records.insert(
            (store_id.to_string(), key.to_string()),
            (content_type.to_string(), content.to_vec()),
        );
    }

    pub fn add_actor(&self, actor: Value) {
        self.state.lock().actors.push(actor);
    }

    pub fn add_task(&self, task: Value) {
        self.state.lock().tasks.push(task);
    }

    /// Store a record that carries no content type.
    pub fn add_untyped_record(&self, store_id: &str, key: &str, content: &[u8]) {
        self.add_record(store_id, key, "", content);
    }

    /// Hold every response for `path` back by `delay`.
    pub fn delay(&self, path: &str, delay: Duration) {
        self.state.lock().delays.insert(path.to_string(), delay);
    }

    /// Answer every request to `path` with `status`.
    pub fn fail(&self, path: &str, status: u16) {
        self.state
            .lock()
            .failures
            .insert(path.to_string(), status);
    }

    // ── inspection ──────────────────────────────────────────────────────────

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.state.lock().requests.clone()
    }

    /// Requests made with `method` to `path`.
    pub fn count(&self, method: &str, path: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.method.as_str() == method && r.path == path)
            .count()
    }

    pub fn webhooks(&self) -> Vec<Value> {
        self.state.lock().webhooks.clone()
    }

    pub fn record(&self, store_id: &str, key: &str) -> Option<(String, Vec<u8>)> {
        self.state
            .lock()
            .records
            .get(&(store_id.to_string(), key.to_string()))
            .cloned()
    }

    pub fn store_count(&self) -> usize {
        self.state.lock().stores.len()
    }

    // ── routing ─────────────────────────────────────────────────────────────

    fn handle(&self, request: &ApiRequest) -> ApiResponse {
        let mut state = self.state.lock();
        state.requests.push(request.clone());

        if let Some(status) = state.failures.get(&request.path) {
            return error(*status, "forced failure");
        }

        let segments: Vec<&str> = request.path.split('/').collect();
        let method = request.method.as_str();

        match (method, segments.as_slice()) {
            ("GET", ["users", "me"]) => data(200, json!({"id": "u1", "username": "tester"})),

            ("GET", ["actor-runs", id]) => match state.runs.iter().find(|r| r["id"] == *id) {
                Some(run) => data(200, run.clone()),
                None => not_found("Actor run"),
            },
            ("POST", [collection, id, "runs"]) => {
                let run_id = state.next_id("run");
                let mut run = json!({
                    "id": run_id,
                    "actId": id,
                    "status": "READY",
                    "startedAt": "2024-05-01T12:00:00.000Z",
                    "finishedAt": null,
                    "defaultDatasetId": format!("{}-ds", run_id),
                    "defaultKeyValueStoreId": format!("{}-kv", run_id),
                    "options": {"build": request.query_value("build").unwrap_or("latest")}
                });
                if *collection == "actor-tasks" {
                    run["actId"] = json!("task-actor");
                    run["actorTaskId"] = json!(id);
                }
                if let Some(RequestBody::Json(input)) = &request.body {
                    run["input"] = input.clone();
                }
                state.runs.push(run.clone());
                data(201, run)
            }
            ("GET", [collection, id, "runs"]) => {
                let mut items: Vec<Value> = state
                    .runs
                    .iter()
                    .filter(|r| belongs_to(r, collection, id))
                    .cloned()
                    .collect();
                if request.query_value("desc") == Some("1") {
                    items.reverse();
                }
                if let Some(limit) = request.query_value("limit").and_then(|l| l.parse().ok()) {
                    items.truncate(limit);
                }
                data(200, page(items))
            }
            ("GET", [collection, id, "runs", "last"]) => {
                let status = request.query_value("status");
                let last = state
                    .runs
                    .iter()
                    .rev()
                    .filter(|r| belongs_to(r, collection, id))
                    .find(|r| status.is_none_or(|s| r["status"] == s));
                match last {
                    Some(run) => data(200, run.clone()),
                    None => not_found("Actor run"),
                }
            }

            ("GET", ["acts"]) => data(200, page(state.actors.clone())),
            ("GET", ["actor-tasks"]) => data(200, page(state.tasks.clone())),

            ("POST", ["datasets"]) => {
                let name = request.query_value("name").unwrap_or_default().to_string();
                let id = state.next_id("ds");
                let meta = json!({"id": id, "name": name});
                state.datasets.push((meta.clone(), Vec::new()));
                data(201, meta)
            }
            ("GET", ["datasets", id]) => match find_dataset(&state, id) {
                Some((meta, _)) => data(200, meta.clone()),
                None => not_found("Dataset"),
            },
            ("GET", ["datasets", id, "items"]) => match find_dataset(&state, id) {
                Some((_, items)) => {
                    let offset = query_usize(request, "offset").unwrap_or(0);
                    let limit = query_usize(request, "limit").unwrap_or(usize::MAX);
                    let slice: Vec<Value> = items.iter().skip(offset).take(limit).cloned().collect();
                    let mut response = raw(200, "application/json", json!(slice).to_string().into_bytes());
                    response.headers.insert(
                        HeaderName::from_static(PAGINATION_TOTAL_HEADER),
                        HeaderValue::from(items.len()),
                    );
                    response
                }
                None => not_found("Dataset"),
            },

            ("POST", ["key-value-stores"]) => {
                let name = request.query_value("name").unwrap_or_default().to_string();
                let id = state.next_id("kv");
                let store = json!({"id": id, "name": name, "userId": "u1"});
                state.stores.push(store.clone());
                data(201, store)
            }
            ("GET", ["key-value-stores", id]) => match find_store(&state, id) {
                Some(store) => data(200, store.clone()),
                None => not_found("Key-value store"),
            },
            (_, ["key-value-stores", id, "records", key]) => {
                let Some(store_id) = find_store(&state, id).map(|s| s["id"].as_str().unwrap_or_default().to_string())
                else {
                    return not_found("Key-value store");
                };
                let record_key = (store_id, key.to_string());
                match method {
                    "PUT" => {
                        let (content_type, content) = match &request.body {
                            Some(RequestBody::Bytes { content_type, data }) => (content_type.clone(), data.clone()),
                            Some(RequestBody::Json(value)) => ("application/json".to_string(), value.to_string().into_bytes()),
                            None => ("application/octet-stream".to_string(), Vec::new()),
                        };
                        state.records.insert(record_key, (content_type, content));
                        ApiResponse::new(201, Vec::new())
                    }
                    "GET" | "HEAD" => match state.records.get(&record_key) {
                        Some((content_type, content)) => {
                            let body = if method == "HEAD" { Vec::new() } else { content.clone() };
                            let mut response = raw(200, content_type, body);
                            response
                                .headers
                                .insert(CONTENT_LENGTH, HeaderValue::from(content.len()));
                            response
                        }
                        None => not_found("Record"),
                    },
                    _ => error(405, "method not allowed"),
                }
            }

            ("POST", ["webhooks"]) => {
                let Some(RequestBody::Json(body)) = &request.body else {
                    return error(400, "missing body");
                };
                let mut webhook = body.clone();
                webhook["id"] = json!(state.next_id("wh"));
                state.webhooks.push(webhook.clone());
                data(201, webhook)
            }
            ("GET", ["webhooks"]) => data(200, page(state.webhooks.clone())),
            ("DELETE", ["webhooks", id]) => {
                let before = state.webhooks.len();
                state.webhooks.retain(|w| w["id"] != *id);
                if state.webhooks.len() == before {
                    not_found("Webhook")
                } else {
                    ApiResponse::new(204, Vec::new())
                }
            }

            _ => error(400, "unexpected request"),
        }
    }
}

#[async_trait]
impl Transport for FakePlatform {
    async fn send(&self, request: &ApiRequest) -> runbridge_client::Result<ApiResponse> {
        let delay = self.state.lock().delays.get(&request.path).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.handle(request))
    }
}

// ── response helpers ────────────────────────────────────────────────────────

fn data(status: u16, value: Value) -> ApiResponse {
    raw(status, "application/json", json!({ "data": value }).to_string().into_bytes())
}

fn raw(status: u16, content_type: &str, content: Vec<u8>) -> ApiResponse {
    let mut response = ApiResponse::new(status, content);
    if !content_type.is_empty()
        && let Ok(value) = HeaderValue::from_str(content_type)
    {
        response.headers.insert(CONTENT_TYPE, value);
    }
    response
}

fn error(status: u16, message: &str) -> ApiResponse {
    raw(
        status,
        "application/json",
        json!({"error": {"type": "fake-error", "message": message}})
            .to_string()
            .into_bytes(),
    )
}

fn not_found(what: &str) -> ApiResponse {
    error(404, &format!("{} was not found", what))
}

fn page(items: Vec<Value>) -> Value {
    json!({
        "total": items.len(),
        "offset": 0,
        "limit": 1000,
        "count": items.len(),
        "desc": false,
        "items": items
    })
}

fn belongs_to(run: &Value, collection: &str, id: &str) -> bool {
    match collection {
        "acts" => run["actId"] == id && run.get("actorTaskId").is_none_or(Value::is_null),
        _ => run["actorTaskId"] == id,
    }
}

fn find_dataset<'a>(state: &'a State, id_or_name: &str) -> Option<&'a (Value, Vec<Value>)> {
    state
        .datasets
        .iter()
        .find(|(meta, _)| meta["id"] == id_or_name || meta["name"] == id_or_name)
}

fn find_store<'a>(state: &'a State, id_or_name: &str) -> Option<&'a Value> {
    state
        .stores
        .iter()
        .find(|s| s["id"] == id_or_name || s["name"] == id_or_name)
}

fn query_usize(request: &ApiRequest, key: &str) -> Option<usize> {
    request.query_value(key).and_then(|v| v.parse().ok())
}

/// A run record as the platform returns it.
pub fn run_json(
    id: &str,
    act_id: &str,
    status: &str,
    key_value_store: Option<&str>,
    dataset: Option<&str>,
) -> Value {
    let terminal = matches!(status, "SUCCEEDED" | "FAILED" | "TIMED-OUT" | "ABORTED");
    json!({
        "id": id,
        "actId": act_id,
        "status": status,
        "startedAt": "2024-05-01T12:00:00.000Z",
        "finishedAt": if terminal { json!("2024-05-01T12:05:00.000Z") } else { Value::Null },
        "defaultKeyValueStoreId": key_value_store,
        "defaultDatasetId": dataset,
        "userId": "u1",
        "stats": {"runTimeSecs": 300},
        "meta": {"origin": "API"},
        "options": {"build": "latest"}
    })
}

/// `n` dataset items `{"n": i}`.
pub fn items(n: usize) -> Vec<Value> {
    (0..n).map(|i| json!({ "n": i })).collect()
}
