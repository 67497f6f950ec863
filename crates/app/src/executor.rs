use serde_json::Value;
use tracing::{error, info, warn};

use crate::{
    context::RunContext,
    transport::{ApiRequest, Method, Transport},
};

/// Response payload as the harness sees it. Field lookups are always checked.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(Value),
    Empty,
    Unparseable(String),
}

impl ResponseBody {
    pub fn parse(raw: &str) -> Self {
        if raw.trim().is_empty() {
            return ResponseBody::Empty;
        }
        match serde_json::from_str(raw) {
            Ok(value) => ResponseBody::Json(value),
            Err(_) => ResponseBody::Unparseable(raw.to_owned()),
        }
    }

    pub fn json(&self) -> Option<&Value> {
        match self {
            ResponseBody::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Look up a value by JSON pointer, e.g. `/user/id`.
    pub fn pointer(&self, pointer: &str) -> Option<&Value> {
        self.json().and_then(|value| value.pointer(pointer))
    }

    pub fn str_at(&self, pointer: &str) -> Option<&str> {
        self.pointer(pointer).and_then(Value::as_str)
    }

    /// Identifier at `pointer`, accepting either a string or a number.
    pub fn id_at(&self, pointer: &str) -> Option<String> {
        self.pointer(pointer).and_then(id_value)
    }

    pub fn is_sequence(&self) -> bool {
        matches!(self, ResponseBody::Json(Value::Array(_)))
    }

    pub fn items(&self) -> &[Value] {
        match self {
            ResponseBody::Json(Value::Array(items)) => items,
            _ => &[],
        }
    }
}

/// Render an identifier value as a string. Empty strings and non-scalar values are not ids.
pub fn id_value(value: &Value) -> Option<String> {
    match value {
        Value::String(id) if !id.is_empty() => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

/// One call to make: a display name plus the request shape and the status that counts
/// as a pass.
#[derive(Debug, Clone)]
pub struct Call {
    pub name: String,
    pub method: Method,
    pub endpoint: String,
    pub expected_status: u16,
    pub body: Option<Value>,
    pub query: Vec<(String, String)>,
}

impl Call {
    pub fn new(name: impl Into<String>, method: Method, endpoint: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            method,
            endpoint: endpoint.into(),
            expected_status: 200,
            body: None,
            query: Vec::new(),
        }
    }

    pub fn get(name: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self::new(name, Method::Get, endpoint)
    }

    pub fn post(name: impl Into<String>, endpoint: impl Into<String>, body: Value) -> Self {
        Self::new(name, Method::Post, endpoint).json(body)
    }

    pub fn put(name: impl Into<String>, endpoint: impl Into<String>, body: Value) -> Self {
        Self::new(name, Method::Put, endpoint).json(body)
    }

    pub fn patch(name: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self::new(name, Method::Patch, endpoint)
    }

    pub fn delete(name: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self::new(name, Method::Delete, endpoint)
    }

    pub fn expect(mut self, status: u16) -> Self {
        self.expected_status = status;
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallOutcome {
    pub success: bool,
    pub body: ResponseBody,
}

impl CallOutcome {
    fn failed() -> Self {
        Self {
            success: false,
            body: ResponseBody::Empty,
        }
    }
}

pub struct RequestExecutor<T> {
    base_url: String,
    transport: T,
}

impl<T: Transport> RequestExecutor<T> {
    pub fn new(base_url: impl Into<String>, transport: T) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self {
            base_url,
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn url_for(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    /// Issue one call and count it. Never fails: status mismatches and transport errors
    /// both come back as `success == false` with an empty body.
    pub fn execute(&self, ctx: &mut RunContext, call: Call) -> CallOutcome {
        let request = self.build_request(ctx, &call);

        let response = match self.transport.send(&request) {
            Ok(response) => response,
            Err(err) => {
                ctx.counters.record(false);
                error!(
                    call = %call.name,
                    method = %call.method,
                    url = %request.url,
                    error = %err,
                    "call failed before a response arrived"
                );
                return CallOutcome::failed();
            }
        };

        let success = response.status == call.expected_status;
        ctx.counters.record(success);
        if success {
            info!(
                call = %call.name,
                method = %call.method,
                status = response.status,
                "passed"
            );
            return CallOutcome {
                success,
                body: ResponseBody::parse(&response.body),
            };
        }

        let detail = match ResponseBody::parse(&response.body) {
            ResponseBody::Json(value) => value.to_string(),
            ResponseBody::Empty => String::new(),
            ResponseBody::Unparseable(raw) => raw,
        };
        warn!(
            call = %call.name,
            method = %call.method,
            url = %request.url,
            expected = call.expected_status,
            actual = response.status,
            response = %detail,
            "unexpected status"
        );
        CallOutcome::failed()
    }

    fn build_request(&self, ctx: &RunContext, call: &Call) -> ApiRequest {
        let mut headers = vec![("Content-Type".to_owned(), "application/json".to_owned())];
        if let Some(bearer) = ctx.session.bearer() {
            headers.push(("Authorization".to_owned(), bearer));
        }
        let body = if call.method.carries_body() {
            call.body.clone()
        } else {
            None
        };
        ApiRequest {
            method: call.method,
            url: self.url_for(&call.endpoint),
            headers,
            query: call.query.clone(),
            body,
        }
    }
}
