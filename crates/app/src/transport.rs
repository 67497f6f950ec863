use std::{fmt, time::Duration};

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use ureq::{
    Agent, RequestBuilder,
    typestate::{WithBody, WithoutBody},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }

    /// Whether a JSON body is sent along with the request.
    pub fn carries_body(self) -> bool {
        matches!(self, Method::Post | Method::Put | Method::Patch)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully resolved outgoing request: absolute URL, headers and optional JSON body.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request to {url} failed: {message}")]
    Request { url: String, message: String },
    #[error("failed to read response body from {url}: {message}")]
    Body { url: String, message: String },
}

/// Sends one request and hands back the raw status and body. Non-2xx statuses are
/// responses, not errors; only connection/protocol failures surface as `Err`.
pub trait Transport {
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError>;
}

pub struct UreqTransport {
    agent: Agent,
}

impl UreqTransport {
    pub fn new(timeout: Option<Duration>) -> Self {
        let config = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(timeout)
            .build();
        Self {
            agent: Agent::new_with_config(config),
        }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Transport for UreqTransport {
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        let url = request.url.as_str();
        let result = match request.method {
            Method::Get => without_body(self.agent.get(url), request),
            Method::Delete => without_body(self.agent.delete(url), request),
            Method::Post => with_body(self.agent.post(url), request),
            Method::Put => with_body(self.agent.put(url), request),
            Method::Patch => with_body(self.agent.patch(url), request),
        };
        let response = result.map_err(|err| TransportError::Request {
            url: request.url.clone(),
            message: err.to_string(),
        })?;

        let status = response.status().as_u16();
        let body = response
            .into_body()
            .read_to_string()
            .map_err(|err| TransportError::Body {
                url: request.url.clone(),
                message: err.to_string(),
            })?;
        Ok(ApiResponse { status, body })
    }
}

fn decorate<B>(mut builder: RequestBuilder<B>, request: &ApiRequest) -> RequestBuilder<B> {
    for (name, value) in &request.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    for (key, value) in &request.query {
        builder = builder.query(key, value);
    }
    builder
}

fn without_body(
    builder: RequestBuilder<WithoutBody>,
    request: &ApiRequest,
) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
    decorate(builder, request).call()
}

fn with_body(
    builder: RequestBuilder<WithBody>,
    request: &ApiRequest,
) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
    let builder = decorate(builder, request);
    match &request.body {
        Some(body) => builder.send_json(body),
        None => builder.send_empty(),
    }
}
