//! In-memory stand-in for the study planner API used by unit tests.

use parking_lot::Mutex;
use serde_json::json;

use crate::transport::{ApiRequest, ApiResponse, Method, Transport, TransportError};

const BASE_PATH: &str = "/api/";

enum Scripted {
    Respond { status: u16, body: String },
    Fail,
}

struct Override {
    method: Method,
    path: String,
    reply: Scripted,
}

/// Answers like a healthy API unless a route has been overridden. Every request is
/// recorded for later inspection.
pub(crate) struct ScriptedTransport {
    overrides: Vec<Override>,
    requests: Mutex<Vec<ApiRequest>>,
    next_id: Mutex<u32>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self {
            overrides: Vec::new(),
            requests: Mutex::new(Vec::new()),
            next_id: Mutex::new(0),
        }
    }

    pub(crate) fn respond(mut self, method: Method, path: &str, status: u16, body: &str) -> Self {
        self.overrides.push(Override {
            method,
            path: path.to_owned(),
            reply: Scripted::Respond {
                status,
                body: body.to_owned(),
            },
        });
        self
    }

    pub(crate) fn fail(mut self, method: Method, path: &str) -> Self {
        self.overrides.push(Override {
            method,
            path: path.to_owned(),
            reply: Scripted::Fail,
        });
        self
    }

    pub(crate) fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().clone()
    }

    /// `(method, path)` pairs relative to the API base, in call order.
    pub(crate) fn calls(&self) -> Vec<(Method, String)> {
        self.requests
            .lock()
            .iter()
            .map(|request| (request.method, relative_path(&request.url).to_owned()))
            .collect()
    }

    fn next_id(&self, prefix: &str) -> String {
        let mut guard = self.next_id.lock();
        *guard += 1;
        format!("{prefix}-{}", *guard)
    }

    fn default_reply(&self, method: Method, path: &str) -> ApiResponse {
        let body = match (method, path) {
            (Method::Post, "auth/register" | "auth/login") => {
                let id = self.next_id("user");
                json!({"access_token": format!("token-{id}"), "user": {"id": id}}).to_string()
            }
            (Method::Post, "subjects") => json!({"id": self.next_id("subject")}).to_string(),
            (Method::Post, "study-sessions") => json!({"id": self.next_id("session")}).to_string(),
            (Method::Post, "tasks") => json!({"id": self.next_id("task")}).to_string(),
            (Method::Post, "goals") => json!({"id": self.next_id("goal")}).to_string(),
            (Method::Get, "subjects" | "study-sessions" | "tasks" | "goals") => "[]".to_owned(),
            (Method::Delete, _) => String::new(),
            _ => "{}".to_owned(),
        };
        ApiResponse { status: 200, body }
    }
}

impl Transport for ScriptedTransport {
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        self.requests.lock().push(request.clone());
        let path = relative_path(&request.url);
        let scripted = self
            .overrides
            .iter()
            .find(|o| o.method == request.method && o.path == path);
        match scripted.map(|o| &o.reply) {
            Some(Scripted::Respond { status, body }) => Ok(ApiResponse {
                status: *status,
                body: body.clone(),
            }),
            Some(Scripted::Fail) => Err(TransportError::Request {
                url: request.url.clone(),
                message: "connection refused".into(),
            }),
            None => Ok(self.default_reply(request.method, path)),
        }
    }
}

fn relative_path(url: &str) -> &str {
    url.split_once(BASE_PATH).map(|(_, path)| path).unwrap_or(url)
}
