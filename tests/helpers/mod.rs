//! In-process fake of the calculation API for integration tests.
//!
//! Honours the HTTP contract the client consumes (auth, BREAD, health) and
//! records every request it receives, so tests can assert that an action
//! sent nothing at all.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, Query, Request, State},
    http::{HeaderMap, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use calc_client::{ClientConfig, MemoryTokenStore, SessionClient, TokenStore};
use calc_types::{
    Calculation, CalculationCreate, CalculationUpdate, ErrorBody, HealthResponse, ListQuery,
    LoginRequest, Operation, RegisterRequest, TokenResponse,
};
use chrono::Utc;
use serde_json::json;
use tokio::net::TcpListener;

// ---------------------------------------------------------------------------
// Backend state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
}

#[derive(Debug, Clone)]
struct User {
    id: i64,
    password: String,
}

#[derive(Default)]
struct BackendState {
    users: HashMap<String, User>,
    tokens: HashMap<String, i64>,
    calculations: Vec<Calculation>,
    next_user_id: i64,
    next_calc_id: i64,
    next_token: u64,
    requests: Vec<RecordedRequest>,
    /// Forced status for `GET /calculations`
    list_failure: Option<StatusCode>,
    /// Forced status with an empty body for every route
    bare_failure: Option<StatusCode>,
}

#[derive(Clone, Default)]
pub struct FakeBackend {
    inner: Arc<Mutex<BackendState>>,
}

type ApiError = (StatusCode, Json<ErrorBody>);
type ApiResult<T> = Result<T, ApiError>;

fn reject(status: StatusCode, detail: &str) -> ApiError {
    (status, Json(ErrorBody::new(detail)))
}

fn validation_error(field: &str, msg: &str) -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({
            "detail": [{ "loc": ["body", field], "msg": msg, "type": "value_error" }]
        })),
    )
        .into_response()
}

fn perform(operation: &str, a: f64, b: f64) -> Result<f64, String> {
    match operation.parse::<Operation>() {
        Ok(Operation::Add) => Ok(a + b),
        Ok(Operation::Subtract) => Ok(a - b),
        Ok(Operation::Multiply) => Ok(a * b),
        Ok(Operation::Divide) if b == 0.0 => Err("Cannot divide by zero".to_string()),
        Ok(Operation::Divide) => Ok(a / b),
        Err(_) => Err(format!("Invalid operation: {}", operation)),
    }
}

impl FakeBackend {
    fn lock(&self) -> std::sync::MutexGuard<'_, BackendState> {
        self.inner.lock().unwrap()
    }

    fn authorize(&self, headers: &HeaderMap) -> ApiResult<i64> {
        let token = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "));
        token
            .and_then(|t| self.lock().tokens.get(t).copied())
            .ok_or_else(|| reject(StatusCode::UNAUTHORIZED, "Could not validate credentials"))
    }

    /// Every request received so far
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.lock().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.lock().requests.len()
    }

    /// Requests matching a method and path
    pub fn count(&self, method: Method, path: &str) -> usize {
        self.lock()
            .requests
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    /// Invalidate every issued token
    pub fn expire_tokens(&self) {
        self.lock().tokens.clear();
    }

    /// Make `GET /calculations` answer with `status`
    pub fn fail_list_with(&self, status: u16) {
        self.lock().list_failure = Some(StatusCode::from_u16(status).expect("valid status"));
    }

    /// Answer every request with `status` and an empty body (no `detail`)
    pub fn fail_all_without_detail(&self, status: u16) {
        self.lock().bare_failure = Some(StatusCode::from_u16(status).expect("valid status"));
    }

    /// Stored calculations for `username`
    pub fn calculations_of(&self, username: &str) -> Vec<Calculation> {
        let state = self.lock();
        let Some(user) = state.users.get(username) else {
            return Vec::new();
        };
        state
            .calculations
            .iter()
            .filter(|c| c.user_id == Some(user.id))
            .cloned()
            .collect()
    }

    /// Issue a token for an existing user without going through login
    pub fn issue_token(&self, username: &str) -> Option<String> {
        let mut state = self.lock();
        let user_id = state.users.get(username)?.id;
        state.next_token += 1;
        let token = format!("token-{}-{}", user_id, state.next_token);
        state.tokens.insert(token.clone(), user_id);
        Some(token)
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn record(State(backend): State<FakeBackend>, req: Request, next: Next) -> Response {
    let recorded = RecordedRequest {
        method: req.method().clone(),
        path: req.uri().path().to_string(),
        query: req.uri().query().map(str::to_string),
        authorization: req
            .headers()
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    };
    let forced = {
        let mut state = backend.lock();
        state.requests.push(recorded);
        state.bare_failure
    };
    match forced {
        Some(status) => status.into_response(),
        None => next.run(req).await,
    }
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
    })
}

async fn register(
    State(backend): State<FakeBackend>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<serde_json::Value>)> {
    let mut state = backend.lock();
    if state.users.contains_key(&req.username) {
        return Err(reject(StatusCode::BAD_REQUEST, "Username already registered"));
    }
    state.next_user_id += 1;
    let id = state.next_user_id;
    state.users.insert(
        req.username.clone(),
        User {
            id,
            password: req.password,
        },
    );
    Ok((
        StatusCode::CREATED,
        Json(json!({ "id": id, "username": req.username, "email": req.email })),
    ))
}

async fn login(
    State(backend): State<FakeBackend>,
    Form(req): Form<LoginRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let user = backend
        .lock()
        .users
        .get(&req.username)
        .filter(|u| u.password == req.password)
        .cloned();
    match user {
        Some(_) => {
            let token = backend
                .issue_token(&req.username)
                .ok_or_else(|| reject(StatusCode::UNAUTHORIZED, "Incorrect username or password"))?;
            Ok(Json(TokenResponse {
                access_token: token,
                token_type: Some("bearer".to_string()),
            }))
        }
        None => Err(reject(
            StatusCode::UNAUTHORIZED,
            "Incorrect username or password",
        )),
    }
}

async fn list_calculations(
    State(backend): State<FakeBackend>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<Calculation>>> {
    if let Some(status) = backend.lock().list_failure {
        return Err((status, Json(ErrorBody::default())));
    }
    let user_id = backend.authorize(&headers)?;
    let state = backend.lock();
    let items = state
        .calculations
        .iter()
        .filter(|c| c.user_id == Some(user_id))
        .skip(query.skip as usize)
        .take(query.limit as usize)
        .cloned()
        .collect();
    Ok(Json(items))
}

async fn get_calculation(
    State(backend): State<FakeBackend>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> ApiResult<Json<Calculation>> {
    let user_id = backend.authorize(&headers)?;
    backend
        .lock()
        .calculations
        .iter()
        .find(|c| c.id == id && c.user_id == Some(user_id))
        .cloned()
        .map(Json)
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "Calculation not found"))
}

async fn create_calculation(
    State(backend): State<FakeBackend>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> Response {
    let user_id = match backend.authorize(&headers) {
        Ok(id) => id,
        Err(e) => return e.into_response(),
    };
    let req: CalculationCreate = match serde_json::from_value(body) {
        Ok(req) => req,
        Err(e) => return validation_error("operation", &e.to_string()),
    };
    if req.operation == Operation::Divide && req.operand2 == 0.0 {
        return validation_error("operand2", "Value error, Cannot divide by zero");
    }
    let result = match perform(req.operation.as_str(), req.operand1, req.operand2) {
        Ok(r) => r,
        Err(msg) => return reject(StatusCode::BAD_REQUEST, &msg).into_response(),
    };

    let mut state = backend.lock();
    state.next_calc_id += 1;
    let calc = Calculation {
        id: state.next_calc_id,
        user_id: Some(user_id),
        operation: req.operation.as_str().to_string(),
        operand1: req.operand1,
        operand2: req.operand2,
        result,
        created_at: Utc::now(),
    };
    state.calculations.push(calc.clone());
    (StatusCode::CREATED, Json(calc)).into_response()
}

async fn update_calculation(
    State(backend): State<FakeBackend>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(update): Json<CalculationUpdate>,
) -> Response {
    let user_id = match backend.authorize(&headers) {
        Ok(id) => id,
        Err(e) => return e.into_response(),
    };
    if let Some(op) = &update.operation {
        if op.parse::<Operation>().is_err() {
            return validation_error(
                "operation",
                "Input should be 'add', 'subtract', 'multiply' or 'divide'",
            );
        }
    }

    let mut state = backend.lock();
    let Some(calc) = state
        .calculations
        .iter_mut()
        .find(|c| c.id == id && c.user_id == Some(user_id))
    else {
        return reject(StatusCode::NOT_FOUND, "Calculation not found").into_response();
    };

    let operation = update.operation.unwrap_or_else(|| calc.operation.clone());
    let operand1 = update.operand1.unwrap_or(calc.operand1);
    let operand2 = update.operand2.unwrap_or(calc.operand2);
    match perform(&operation, operand1, operand2) {
        Ok(result) => {
            calc.operation = operation;
            calc.operand1 = operand1;
            calc.operand2 = operand2;
            calc.result = result;
            Json(calc.clone()).into_response()
        }
        Err(msg) => reject(StatusCode::BAD_REQUEST, &msg).into_response(),
    }
}

async fn delete_calculation(
    State(backend): State<FakeBackend>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let user_id = backend.authorize(&headers)?;
    let mut state = backend.lock();
    let before = state.calculations.len();
    state
        .calculations
        .retain(|c| !(c.id == id && c.user_id == Some(user_id)));
    if state.calculations.len() == before {
        return Err(reject(StatusCode::NOT_FOUND, "Calculation not found"));
    }
    Ok(StatusCode::NO_CONTENT)
}

fn router(backend: FakeBackend) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route(
            "/calculations",
            get(list_calculations).post(create_calculation),
        )
        .route(
            "/calculations/:id",
            get(get_calculation)
                .put(update_calculation)
                .delete(delete_calculation),
        )
        .layer(middleware::from_fn_with_state(backend.clone(), record))
        .with_state(backend)
}

// ---------------------------------------------------------------------------
// TestRig - fake backend on a random port plus client constructors
// ---------------------------------------------------------------------------

pub struct TestRig {
    pub addr: SocketAddr,
    pub backend: FakeBackend,
}

impl TestRig {
    pub async fn spawn() -> Self {
        let backend = FakeBackend::default();
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind TCP listener");
        let addr = listener.local_addr().expect("Failed to get local address");

        let app = router(backend.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("fake backend failed");
        });

        Self { addr, backend }
    }

    pub fn config(&self) -> ClientConfig {
        ClientConfig::default()
            .with_base_url(&format!("http://{}", self.addr))
            .expect("valid rig URL")
    }

    pub fn client(&self) -> SessionClient<MemoryTokenStore> {
        self.client_with_store(MemoryTokenStore::new())
    }

    pub fn client_with_store<S: TokenStore>(&self, store: S) -> SessionClient<S> {
        SessionClient::new(self.config(), store).expect("Failed to build client")
    }

    /// Register and log in `username`, returning a client on the dashboard
    pub async fn logged_in_client(&self, username: &str) -> SessionClient<MemoryTokenStore> {
        let mut client = self.client();
        client
            .register(username, &format!("{}@test.com", username), "password123")
            .await
            .expect("register");
        client.login(username, "password123").await.expect("login");
        client
    }
}

/// Config pointing at a port nothing listens on
pub async fn unreachable_config() -> ClientConfig {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind TCP listener");
    let addr = listener.local_addr().expect("Failed to get local address");
    drop(listener);
    ClientConfig::default()
        .with_base_url(&format!("http://{}", addr))
        .expect("valid URL")
}
