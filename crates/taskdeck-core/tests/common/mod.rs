//! In-process mock of the to-do service.
//!
//! Accepts `a@b.com` / `secret` (token `T1`, user 1) and `legacy@b.com` /
//! `secret` (token under the `token` key, `T9`, user 2). Signup for
//! `quiet@b.com` answers 201 with an empty body. Every request is recorded
//! so tests can assert on what went over the wire.

#![allow(dead_code)]

use std::sync::atomic::{AtomicI64, AtomicU16, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use taskdeck_core::{ApiClient, CredentialStore};

pub const VALID_TOKENS: [&str; 2] = ["T1", "T9"];

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: &'static str,
    pub path: &'static str,
    pub authorization: Option<String>,
    pub body: Option<Value>,
}

pub struct MockState {
    requests: Mutex<Vec<RecordedRequest>>,
    tasks: Mutex<Vec<Value>>,
    next_id: AtomicI64,
    logout_status: AtomicU16,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            tasks: Mutex::new(vec![
                json!({"id": 1, "title": "Walk dog", "description": "", "completed": false}),
                json!({"id": 2, "title": "Pay rent", "description": "June", "completed": true}),
            ]),
            next_id: AtomicI64::new(3),
            logout_status: AtomicU16::new(200),
        }
    }
}

impl MockState {
    fn record(
        &self,
        method: &'static str,
        path: &'static str,
        headers: &HeaderMap,
        body: Option<Value>,
    ) {
        let authorization = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        self.requests.lock().unwrap().push(RecordedRequest {
            method,
            path,
            authorization,
            body,
        });
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == path)
            .collect()
    }

    pub fn server_tasks(&self) -> Vec<Value> {
        self.tasks.lock().unwrap().clone()
    }

    pub fn set_logout_status(&self, status: u16) {
        self.logout_status.store(status, Ordering::SeqCst);
    }
}

pub struct MockServer {
    pub base_url: String,
    pub state: Arc<MockState>,
}

impl MockServer {
    pub async fn start() -> Self {
        let state = Arc::new(MockState::default());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = router(Arc::clone(&state));
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self {
            base_url: format!("http://{}", addr),
            state,
        }
    }

    pub fn api(&self) -> ApiClient {
        ApiClient::new(&self.base_url).unwrap()
    }
}

/// Fresh in-memory credential store
pub fn memory_store() -> CredentialStore {
    CredentialStore::in_memory()
}

fn router(state: Arc<MockState>) -> Router {
    Router::new()
        .route("/auth/api/v1/login", post(login))
        .route("/auth/api/v1/signup", post(signup))
        .route("/auth/api/v1/profile", get(profile))
        .route("/auth/api/v1/logout", post(logout))
        .route("/todos/api/v1/get", get(list_tasks))
        .route("/todos/api/v1/create", post(create_task))
        .with_state(state)
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

fn authorized(headers: &HeaderMap) -> bool {
    bearer(headers).is_some_and(|t| VALID_TOKENS.contains(&t))
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({"detail": "Invalid token"}))).into_response()
}

async fn login(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.record("POST", "/auth/api/v1/login", &headers, Some(body.clone()));
    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();

    match (email, password) {
        ("a@b.com", "secret") => {
            Json(json!({"access_token": "T1", "user": {"id": 1, "name": "A"}})).into_response()
        }
        ("legacy@b.com", "secret") => {
            Json(json!({"token": "T9", "user": {"id": 2, "name": "L"}})).into_response()
        }
        ("slow@b.com", "secret") => {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Json(json!({"access_token": "T1", "user": {"id": 1, "name": "A"}})).into_response()
        }
        ("broken@b.com", _) => Json(json!({"user": {"id": 3}})).into_response(),
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "Invalid credentials"})),
        )
            .into_response(),
    }
}

async fn signup(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.record("POST", "/auth/api/v1/signup", &headers, Some(body.clone()));
    if body["email"] == "quiet@b.com" {
        return StatusCode::CREATED.into_response();
    }
    if body["email"] == "taken@b.com" {
        return (
            StatusCode::CONFLICT,
            Json(json!({"detail": "Email already registered"})),
        )
            .into_response();
    }
    (
        StatusCode::CREATED,
        Json(json!({"message": "User created successfully"})),
    )
        .into_response()
}

async fn profile(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    state.record("GET", "/auth/api/v1/profile", &headers, None);
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(json!({
        "id": 1,
        "email": "a@b.com",
        "first_name": "Ada",
        "last_name": "Byron",
        "created_at": "2024-01-01T00:00:00Z"
    }))
    .into_response()
}

async fn logout(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    state.record("POST", "/auth/api/v1/logout", &headers, None);
    let status = StatusCode::from_u16(state.logout_status.load(Ordering::SeqCst))
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(json!({"message": "bye"}))).into_response()
}

async fn list_tasks(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    state.record("GET", "/todos/api/v1/get", &headers, None);
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(Value::Array(state.server_tasks())).into_response()
}

async fn create_task(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.record("POST", "/todos/api/v1/create", &headers, Some(body.clone()));
    if !authorized(&headers) {
        return unauthorized();
    }
    let task = json!({
        "id": state.next_id.fetch_add(1, Ordering::SeqCst),
        "title": body["title"],
        "description": body["description"],
        "completed": false,
    });
    state.tasks.lock().unwrap().push(task.clone());
    (StatusCode::CREATED, Json(task)).into_response()
}
