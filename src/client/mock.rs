//! In-memory stand-in for the management API used by unit tests.
//!
//! Records live at `{collection}/{id}`. POST assigns ids and server-computed
//! timestamps, GET on a collection answers with the `{"totalPages","list"}`
//! envelope (honouring `search`, `page` and `pagesize`), PUT replaces, DELETE
//! removes, and missing ids answer 404 with the ZPA error body.

use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Mutex;

use super::error::{ApiError, OBJECT_NOT_FOUND_ID};
use super::transport::{HttpRequest, HttpResponse, Method, Transport};

struct Route {
    method: Method,
    path: String,
    response: HttpResponse,
    once: bool,
}

#[derive(Default)]
struct MockState {
    records: HashMap<String, Value>,
    order: Vec<String>,
    next_id: u64,
    routes: Vec<Route>,
    requests: Vec<HttpRequest>,
}

pub struct MockTransport {
    state: Mutex<MockState>,
    page_size: Option<u32>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                next_id: 72058304855015000,
                ..MockState::default()
            }),
            page_size: None,
        }
    }

    /// Cap listing pages at `size` records regardless of the requested page size
    pub fn with_page_size(mut self, size: u32) -> Self {
        self.page_size = Some(size);
        self
    }

    /// Seed a record into a collection, returning its id
    pub fn insert(&self, collection: &str, mut record: Value) -> String {
        let mut state = self.state.lock().unwrap();
        let id = match record.get("id").and_then(Value::as_str) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => {
                state.next_id += 1;
                state.next_id.to_string()
            }
        };

        record["id"] = Value::String(id.clone());
        let key = format!("{}/{}", collection, id);
        if !state.records.contains_key(&key) {
            state.order.push(key.clone());
        }
        state.records.insert(key, record);

        id
    }

    /// Seed a record at an exact path (e.g. a policy set addressed by type)
    pub fn insert_at(&self, path: &str, record: Value) {
        let mut state = self.state.lock().unwrap();
        if !state.records.contains_key(path) {
            state.order.push(path.to_string());
        }
        state.records.insert(path.to_string(), record);
    }

    pub fn record(&self, path: &str) -> Option<Value> {
        self.state.lock().unwrap().records.get(path).cloned()
    }

    pub fn remove(&self, path: &str) {
        let mut state = self.state.lock().unwrap();
        state.records.remove(path);
        state.order.retain(|key| key != path);
    }

    /// Always answer `method path` with `response`
    pub fn route(&self, method: Method, path: &str, response: HttpResponse) {
        self.add_route(method, path, response, false);
    }

    /// Answer the next `method path` with `response`, then fall back to the store
    pub fn route_once(&self, method: Method, path: &str, response: HttpResponse) {
        self.add_route(method, path, response, true);
    }

    fn add_route(&self, method: Method, path: &str, response: HttpResponse, once: bool) {
        self.state.lock().unwrap().routes.push(Route {
            method,
            path: path.to_string(),
            response,
            once,
        });
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn requests_matching(&self, method: Method, path: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .requests
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    /// Requests other than GET
    pub fn mutations(&self) -> Vec<HttpRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method != Method::Get)
            .collect()
    }

    fn not_found(path: &str) -> HttpResponse {
        HttpResponse::new(
            404,
            json!({
                "id": OBJECT_NOT_FOUND_ID,
                "reason": format!("Object not found: {}", path)
            })
            .to_string(),
        )
    }

    fn query_value<'a>(request: &'a HttpRequest, key: &str) -> Option<&'a str> {
        request
            .query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn list(&self, state: &MockState, request: &HttpRequest) -> HttpResponse {
        let prefix = format!("{}/", request.path);
        let search = Self::query_value(request, "search").map(str::to_lowercase);

        let matching: Vec<&Value> = state
            .order
            .iter()
            .filter(|key| {
                key.strip_prefix(&prefix)
                    .map(|rest| !rest.contains('/'))
                    .unwrap_or(false)
            })
            .filter_map(|key| state.records.get(key))
            .filter(|record| match &search {
                Some(term) => record
                    .get("name")
                    .and_then(Value::as_str)
                    .map(|name| name.to_lowercase().contains(term))
                    .unwrap_or(false),
                None => true,
            })
            .collect();

        let requested = Self::query_value(request, "pagesize")
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(500);
        let size = self.page_size.map(|cap| cap.min(requested)).unwrap_or(requested).max(1) as usize;
        let page = Self::query_value(request, "page")
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(1)
            .max(1);

        let total_pages = matching.len().div_ceil(size).max(1);
        let items: Vec<Value> = matching
            .into_iter()
            .skip((page - 1) * size)
            .take(size)
            .cloned()
            .collect();

        HttpResponse::new(
            200,
            json!({
                "totalPages": total_pages.to_string(),
                "list": items
            })
            .to_string(),
        )
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for MockTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        let mut state = self.state.lock().unwrap();
        state.requests.push(request.clone());

        if let Some(index) = state
            .routes
            .iter()
            .position(|r| r.method == request.method && r.path == request.path)
        {
            let response = state.routes[index].response.clone();
            if state.routes[index].once {
                state.routes.remove(index);
            }
            return Ok(response);
        }

        let path = request.path.clone();

        let response = match request.method {
            Method::Get => {
                if let Some(record) = state.records.get(&path) {
                    HttpResponse::new(200, record.to_string())
                } else if Self::query_value(request, "page").is_some() {
                    self.list(&state, request)
                } else {
                    Self::not_found(&path)
                }
            }
            Method::Post => {
                state.next_id += 1;
                let id = state.next_id.to_string();
                let mut record = request.body.clone().unwrap_or_else(|| json!({}));
                record["id"] = Value::String(id.clone());
                record["creationTime"] = Value::String("1700000000".to_string());
                record["modifiedTime"] = Value::String("1700000000".to_string());
                record["modifiedBy"] = Value::String("72058304855015574".to_string());

                let key = format!("{}/{}", path, id);
                state.order.push(key.clone());
                state.records.insert(key, record.clone());

                HttpResponse::new(200, record.to_string())
            }
            Method::Put => {
                if path.contains("/reorder/") {
                    HttpResponse::new(204, "")
                } else if let Some(existing) = state.records.get(&path).cloned() {
                    let mut record = request.body.clone().unwrap_or_else(|| json!({}));
                    record["id"] = existing["id"].clone();
                    if let Some(created) = existing.get("creationTime") {
                        record["creationTime"] = created.clone();
                    }
                    record["modifiedTime"] = Value::String("1700000500".to_string());
                    state.records.insert(path.clone(), record);
                    HttpResponse::new(204, "")
                } else {
                    Self::not_found(&path)
                }
            }
            Method::Delete => {
                if state.records.remove(&path).is_some() {
                    state.order.retain(|key| key != &path);
                    HttpResponse::new(204, "")
                } else {
                    Self::not_found(&path)
                }
            }
        };

        Ok(response)
    }
}
