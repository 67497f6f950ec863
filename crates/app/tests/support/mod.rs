//! In-process study planner API backed by axum, used to drive the harness over real HTTP.
#![allow(dead_code)]

use std::{
    collections::{BTreeMap, HashMap, HashSet},
    net::SocketAddr,
    sync::Arc,
};

use axum::{
    Json, Router,
    extract::{Path, Query, Request, State},
    http::{StatusCode, header::AUTHORIZATION},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, patch, post, put},
};
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::{net::TcpListener, runtime::Runtime};

const COLLECTIONS: [&str; 4] = ["subjects", "study-sessions", "tasks", "goals"];
const COMPLETABLE: [&str; 2] = ["study-sessions", "tasks"];

#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub bearer: Option<String>,
}

#[derive(Default)]
pub struct MockState {
    users: HashMap<String, String>,
    tokens: HashMap<String, String>,
    collections: HashMap<String, BTreeMap<String, Value>>,
    next_id: u64,
    failures: HashSet<(String, String)>,
    seen: Vec<SeenRequest>,
}

impl MockState {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn issue_token(&mut self, email: &str) -> Value {
        let n = self.next_id();
        let token = format!("tok-{n}");
        let user_id = format!("user-{n}");
        self.tokens.insert(token.clone(), user_id.clone());
        json!({
            "access_token": token,
            "token_type": "bearer",
            "user": {"id": user_id, "email": email},
        })
    }
}

type Shared = Arc<Mutex<MockState>>;

/// Running mock server. Dropping it shuts the runtime (and the server) down.
pub struct MockApi {
    runtime: Runtime,
    addr: SocketAddr,
    state: Shared,
}

impl MockApi {
    pub fn start() -> Self {
        Self::start_failing(&[])
    }

    /// Start with the given `(METHOD, path)` routes forced to answer 500.
    pub fn start_failing(failures: &[(&str, &str)]) -> Self {
        let runtime = Runtime::new().expect("tokio runtime");
        let state: Shared = Arc::new(Mutex::new(MockState {
            failures: failures
                .iter()
                .map(|(method, path)| (method.to_string(), path.to_string()))
                .collect(),
            ..MockState::default()
        }));
        let listener = runtime
            .block_on(TcpListener::bind("127.0.0.1:0"))
            .expect("bind mock api");
        let addr = listener.local_addr().expect("mock api addr");
        let app = router(state.clone());
        runtime.spawn(async move {
            axum::serve(listener, app).await.expect("mock api server");
        });
        Self {
            runtime,
            addr,
            state,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    pub fn seen(&self) -> Vec<SeenRequest> {
        self.state.lock().seen.clone()
    }

    pub fn items(&self, collection: &str) -> Vec<Value> {
        self.state
            .lock()
            .collections
            .get(collection)
            .map(|items| items.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn item(&self, collection: &str, id: &str) -> Option<Value> {
        self.state
            .lock()
            .collections
            .get(collection)
            .and_then(|items| items.get(id).cloned())
    }

    pub fn is_known_token(&self, token: &str) -> bool {
        self.state.lock().tokens.contains_key(token)
    }
}

fn router(state: Shared) -> Router {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/generate-schedule", post(generate_schedule))
        .route("/api/analytics/dashboard", get(dashboard))
        .route("/api/analytics/progress", get(progress))
        .route("/api/{collection}", get(list).post(create))
        .route("/api/{collection}/{id}", put(update).delete(remove))
        .route("/api/{collection}/{id}/complete", patch(complete))
        .layer(middleware::from_fn_with_state(state.clone(), gatekeeper))
        .with_state(state)
}

/// Records every request, applies injected failures and enforces bearer auth outside
/// `auth/*`.
async fn gatekeeper(State(state): State<Shared>, request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let path = request
        .uri()
        .path()
        .trim_start_matches("/api/")
        .to_owned();
    let query = request.uri().query().map(str::to_owned);
    let bearer = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_owned);

    {
        let mut guard = state.lock();
        guard.seen.push(SeenRequest {
            method: method.clone(),
            path: path.clone(),
            query,
            bearer: bearer.clone(),
        });
        if guard.failures.contains(&(method, path.clone())) {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"detail": "injected failure"})),
            )
                .into_response();
        }
        let authorized = bearer
            .as_deref()
            .is_some_and(|token| guard.tokens.contains_key(token));
        if !path.starts_with("auth/") && !authorized {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({"detail": "Not authenticated"})),
            )
                .into_response();
        }
    }

    next.run(request).await
}

fn field<'a>(body: &'a Value, key: &str) -> Result<&'a str, StatusCode> {
    body.get(key)
        .and_then(Value::as_str)
        .ok_or(StatusCode::UNPROCESSABLE_ENTITY)
}

async fn register(
    State(state): State<Shared>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    field(&body, "username")?;
    let email = field(&body, "email")?;
    let password = field(&body, "password")?;
    let mut guard = state.lock();
    if guard.users.contains_key(email) {
        return Err(StatusCode::BAD_REQUEST);
    }
    guard.users.insert(email.to_owned(), password.to_owned());
    Ok(Json(guard.issue_token(email)))
}

async fn login(
    State(state): State<Shared>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    let email = field(&body, "email")?;
    let password = field(&body, "password")?;
    let mut guard = state.lock();
    if guard.users.get(email).map(String::as_str) != Some(password) {
        return Err(StatusCode::UNAUTHORIZED);
    }
    Ok(Json(guard.issue_token(email)))
}

fn known_collection(collection: &str) -> Result<(), StatusCode> {
    if COLLECTIONS.contains(&collection) {
        Ok(())
    } else {
        Err(StatusCode::NOT_FOUND)
    }
}

async fn create(
    State(state): State<Shared>,
    Path(collection): Path<String>,
    Json(mut body): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    known_collection(&collection)?;
    let mut guard = state.lock();
    let id = format!("{collection}-{}", guard.next_id());
    let Some(fields) = body.as_object_mut() else {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    };
    fields.insert("id".into(), Value::String(id.clone()));
    guard
        .collections
        .entry(collection)
        .or_default()
        .insert(id, body.clone());
    Ok(Json(body))
}

async fn list(
    State(state): State<Shared>,
    Path(collection): Path<String>,
) -> Result<Json<Value>, StatusCode> {
    known_collection(&collection)?;
    let guard = state.lock();
    let items = guard
        .collections
        .get(&collection)
        .map(|items| items.values().cloned().collect())
        .unwrap_or_default();
    Ok(Json(Value::Array(items)))
}

async fn update(
    State(state): State<Shared>,
    Path((collection, id)): Path<(String, String)>,
    Json(mut body): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    known_collection(&collection)?;
    let mut guard = state.lock();
    let item = guard
        .collections
        .get_mut(&collection)
        .and_then(|items| items.get_mut(&id))
        .ok_or(StatusCode::NOT_FOUND)?;
    let Some(fields) = body.as_object_mut() else {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    };
    fields.insert("id".into(), Value::String(id));
    *item = body.clone();
    Ok(Json(body))
}

async fn remove(
    State(state): State<Shared>,
    Path((collection, id)): Path<(String, String)>,
) -> Result<Json<Value>, StatusCode> {
    known_collection(&collection)?;
    let mut guard = state.lock();
    guard
        .collections
        .get_mut(&collection)
        .and_then(|items| items.remove(&id))
        .ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(json!({"message": "deleted"})))
}

async fn complete(
    State(state): State<Shared>,
    Path((collection, id)): Path<(String, String)>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, StatusCode> {
    if !COMPLETABLE.contains(&collection.as_str()) {
        return Err(StatusCode::NOT_FOUND);
    }
    let completed = params.get("completed").is_none_or(|flag| flag != "false");
    let mut guard = state.lock();
    let item = guard
        .collections
        .get_mut(&collection)
        .and_then(|items| items.get_mut(&id))
        .ok_or(StatusCode::NOT_FOUND)?;
    item["completed"] = Value::Bool(completed);
    Ok(Json(item.clone()))
}

async fn generate_schedule(Json(body): Json<Value>) -> Result<Json<Value>, StatusCode> {
    let subjects = body
        .get("subjects")
        .and_then(Value::as_array)
        .ok_or(StatusCode::UNPROCESSABLE_ENTITY)?;
    let hours = body
        .get("available_hours_per_day")
        .and_then(Value::as_u64)
        .ok_or(StatusCode::UNPROCESSABLE_ENTITY)?;
    Ok(Json(json!({
        "schedule": subjects
            .iter()
            .map(|subject| json!({"subject": subject["name"], "hours": hours}))
            .collect::<Vec<_>>(),
    })))
}

async fn dashboard(State(state): State<Shared>) -> Json<Value> {
    let guard = state.lock();
    let count = |name: &str| guard.collections.get(name).map_or(0, BTreeMap::len);
    Json(json!({
        "total_subjects": count("subjects"),
        "total_sessions": count("study-sessions"),
        "total_tasks": count("tasks"),
    }))
}

async fn progress() -> Json<Value> {
    Json(json!({"weekly_hours": [], "streak": 0}))
}
