// src/utils/http.rs

//! HTTP transport.
//!
//! Every status code reaches the caller as a [`HttpResponse`]. Transport
//! failures come back as a typed [`TransportError`] so the backend layer
//! never has to sniff error shapes.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::BackendConfig;

/// HTTP verbs used by the backend API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Delete => "DELETE",
        })
    }
}

/// A request relative to the configured base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,

    /// Unencoded path segments, e.g. `["couples", "ИС-21"]`
    pub segments: Vec<String>,

    /// JSON body, if any
    pub body: Option<Value>,
}

impl HttpRequest {
    pub fn new<I, S>(method: Method, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            method,
            segments: segments.into_iter().map(Into::into).collect(),
            body: None,
        }
    }

    pub fn get<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Method::Get, segments)
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Path as sent on the wire, for logs and matching.
    pub fn path(&self) -> String {
        format!("/{}", self.segments.join("/"))
    }
}

/// Response of any status. The body is JSON when it parses, a string
/// otherwise, and `Null` when empty.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Value,
}

impl HttpResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }
}

/// Failure before a response could be read.
#[derive(Error, Debug)]
pub enum TransportError {
    /// No response reached the client (refused, timed out, reset...)
    #[error("Network error: {0}")]
    Network(String),

    /// Not a transport failure; handed back to the caller unchanged
    #[error(transparent)]
    Unclassified(AppError),
}

/// Sends requests to the backend.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> std::result::Result<HttpResponse, TransportError>;
}

/// Create a configured asynchronous HTTP client.
pub fn create_async_client(config: &BackendConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

/// Decode a raw body: JSON if possible, else the text itself.
pub fn decode_body(bytes: &[u8]) -> Value {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).trim().to_string()))
}

/// reqwest-backed transport.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: Url,
}

impl ReqwestTransport {
    pub fn new(client: reqwest::Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    /// Build the client and base URL from configuration.
    pub fn from_config(config: &BackendConfig) -> Result<Self> {
        Ok(Self::new(create_async_client(config)?, config.url()?))
    }

    /// Join path segments onto the base URL, percent-encoding each one.
    pub fn url_for(&self, segments: &[String]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| AppError::config(format!("Base URL cannot hold a path: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn classify(err: reqwest::Error) -> TransportError {
        if err.is_builder() {
            TransportError::Unclassified(AppError::Http(err))
        } else {
            TransportError::Network(err.to_string())
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> std::result::Result<HttpResponse, TransportError> {
        let url = self
            .url_for(&request.segments)
            .map_err(TransportError::Unclassified)?;

        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.client.request(method, url);
        if let Some(body) = &request.body {
            let bytes = serde_json::to_vec(body)
                .map_err(|e| TransportError::Unclassified(AppError::Json(e)))?;
            builder = builder
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(bytes);
        }

        let response = builder.send().await.map_err(Self::classify)?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await.map_err(Self::classify)?;

        Ok(HttpResponse::new(status, decode_body(&bytes)))
    }
}

#[cfg(test)]
pub mod mock {
    //! Scripted transport for service tests.

    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;

    use super::*;

    type Reply = std::result::Result<HttpResponse, TransportError>;

    /// Replies are queued per (method, path); the last reply for a route
    /// repeats once the queue is down to one entry.
    #[derive(Default)]
    pub struct MockTransport {
        routes: Mutex<HashMap<(Method, String), VecDeque<ReplySpec>>>,
        requests: Mutex<Vec<HttpRequest>>,
    }

    #[derive(Clone)]
    enum ReplySpec {
        Ok(u16, Value),
        Network(String),
    }

    impl ReplySpec {
        fn build(&self) -> Reply {
            match self {
                ReplySpec::Ok(status, body) => Ok(HttpResponse::new(*status, body.clone())),
                ReplySpec::Network(msg) => Err(TransportError::Network(msg.clone())),
            }
        }
    }

    impl MockTransport {
        pub fn new() -> Self {
            Self::default()
        }

        fn push(&self, method: Method, path: &str, reply: ReplySpec) {
            self.routes
                .lock()
                .unwrap()
                .entry((method, path.to_string()))
                .or_default()
                .push_back(reply);
        }

        pub fn reply(&self, method: Method, path: &str, status: u16, body: Value) {
            self.push(method, path, ReplySpec::Ok(status, body));
        }

        pub fn fail(&self, method: Method, path: &str, message: &str) {
            self.push(method, path, ReplySpec::Network(message.to_string()));
        }

        pub fn requests(&self) -> Vec<HttpRequest> {
            self.requests.lock().unwrap().clone()
        }

        pub fn count(&self, method: Method, path: &str) -> usize {
            self.requests()
                .iter()
                .filter(|r| r.method == method && r.path() == path)
                .count()
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn send(&self, request: HttpRequest) -> Reply {
            let key = (request.method, request.path());
            self.requests.lock().unwrap().push(request);

            let mut routes = self.routes.lock().unwrap();
            match routes.get_mut(&key) {
                Some(queue) if queue.len() > 1 => queue.pop_front().map(|r| r.build()).unwrap(),
                Some(queue) if !queue.is_empty() => queue[0].build(),
                _ => Err(TransportError::Network(format!(
                    "connect ECONNREFUSED {} {}",
                    key.0, key.1
                ))),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transport(base: &str) -> ReqwestTransport {
        ReqwestTransport::new(reqwest::Client::new(), Url::parse(base).unwrap())
    }

    #[test]
    fn url_encodes_segments() {
        let url = transport("https://api.example.org/v1/")
            .url_for(&["couples".to_string(), "ИС-21".to_string()])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.example.org/v1/couples/%D0%98%D0%A1-21"
        );
    }

    #[test]
    fn url_without_trailing_slash() {
        let url = transport("http://localhost:8080")
            .url_for(&["subscribes".to_string(), "add".to_string()])
            .unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/subscribes/add");
    }

    #[test]
    fn slash_in_name_stays_one_segment() {
        let url = transport("http://localhost:8080")
            .url_for(&["couples".to_string(), "А/1".to_string()])
            .unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/couples/%D0%90%2F1");
    }

    #[test]
    fn decode_body_variants() {
        assert_eq!(decode_body(b""), Value::Null);
        assert_eq!(decode_body(b"[\"a\"]"), serde_json::json!(["a"]));
        assert_eq!(
            decode_body(b"Bad Gateway\n"),
            Value::String("Bad Gateway".to_string())
        );
    }

    #[test]
    fn request_path() {
        let req = HttpRequest::get(["subscribes", "tok"]);
        assert_eq!(req.path(), "/subscribes/tok");
        assert_eq!(req.method, Method::Get);
    }
}
