// src/services/backend.rs

//! Backend API access.
//!
//! Every call goes through [`ensure_success`] and
//! [`normalize_transport_error`], so callers only ever see an
//! [`AppError::Backend`] or an unclassified error passed through unchanged.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{AppError, BackendError, Result};
use crate::models::{
    Ack, DirectoryKind, Notification, RawSchedule, ReleaseInfo, SubscribeRequest,
    SubscriptionEntry, TargetType, TrackedType,
};
use crate::utils::http::{HttpRequest, HttpResponse, Method, Transport, TransportError};

/// Return the body of a 2xx response, or a [`BackendError`] describing
/// the rejection.
///
/// The message comes from, in order: a string body, a `message` field,
/// the first entry of an `errors` array, or a generic status line.
pub fn ensure_success(status: u16, body: Value) -> std::result::Result<Value, BackendError> {
    if (200..300).contains(&status) {
        return Ok(body);
    }

    let message = extract_message(&body)
        .unwrap_or_else(|| format!("Backend responded with status {status}"));
    let payload = (!body.is_null()).then_some(body);

    Err(BackendError::rejected(status, message, payload))
}

fn extract_message(body: &Value) -> Option<String> {
    let non_empty = |s: &str| {
        let s = s.trim();
        (!s.is_empty()).then(|| s.to_string())
    };

    match body {
        Value::String(s) => non_empty(s),
        Value::Object(map) => {
            if let Some(msg) = map.get("message").and_then(Value::as_str).and_then(non_empty) {
                return Some(msg);
            }
            match map.get("errors").and_then(Value::as_array)?.first()? {
                Value::String(s) => non_empty(s),
                Value::Object(err) => err.get("message").and_then(Value::as_str).and_then(non_empty),
                other => Some(other.to_string()),
            }
        }
        _ => None,
    }
}

/// Map a transport failure to the error callers see.
///
/// Network failures become a [`BackendError`] with status 0. Anything else
/// is returned as-is.
pub fn normalize_transport_error(err: TransportError) -> AppError {
    match err {
        TransportError::Network(message) => {
            let message = if message.trim().is_empty() {
                "Network request failed".to_string()
            } else {
                message
            };
            AppError::Backend(BackendError::network(message))
        }
        TransportError::Unclassified(inner) => inner,
    }
}

/// Typed client for the schedule backend.
#[derive(Clone)]
pub struct BackendClient {
    transport: Arc<dyn Transport>,
}

impl BackendClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Send a request and return the 2xx response.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let method = request.method;
        let path = request.path();
        log::debug!("{} {}", method, path);

        let HttpResponse { status, body } = self
            .transport
            .send(request)
            .await
            .map_err(normalize_transport_error)
            .inspect_err(|e| log::debug!("{} {} failed: {}", method, path, e))?;

        log::debug!("{} {} -> {}", method, path, status);
        let body = ensure_success(status, body)?;
        Ok(HttpResponse::new(status, body))
    }

    /// Send a request and decode the 2xx body.
    async fn request<T: DeserializeOwned>(&self, request: HttpRequest) -> Result<T> {
        let response = self.send(request).await?;
        Ok(serde_json::from_value(response.body)?)
    }

    /// Send a mutation and check its `{success, message}` acknowledgement.
    async fn mutate(&self, request: HttpRequest) -> Result<Ack> {
        let label = format!("{} {}", request.method, request.path());
        let HttpResponse { status, body } = self.send(request).await?;

        let ack = match &body {
            Value::Object(_) => serde_json::from_value::<Ack>(body.clone())?,
            _ => Ack::default(),
        };

        if !ack.success {
            let message = ack
                .message
                .clone()
                .unwrap_or_else(|| format!("{label} was not accepted"));
            log::debug!("{} rejected: {}", label, message);
            return Err(BackendError::rejected(status, message, Some(body)).into());
        }
        Ok(ack)
    }

    /// `GET /groups`, `/prepods` or `/cabs`.
    pub async fn fetch_directory(&self, kind: DirectoryKind) -> Result<Vec<String>> {
        self.request(HttpRequest::get([kind.path()])).await
    }

    pub async fn fetch_groups(&self) -> Result<Vec<String>> {
        self.fetch_directory(DirectoryKind::Groups).await
    }

    pub async fn fetch_teachers(&self) -> Result<Vec<String>> {
        self.fetch_directory(DirectoryKind::Teachers).await
    }

    pub async fn fetch_cabinets(&self) -> Result<Vec<String>> {
        self.fetch_directory(DirectoryKind::Cabinets).await
    }

    /// `GET /couples/{name}`: raw days keyed by date.
    pub async fn fetch_couples(&self, name: &str) -> Result<RawSchedule> {
        self.request(HttpRequest::get(["couples", name])).await
    }

    /// `GET /subscribes/{token}`.
    pub async fn get_subscribers(&self, token: &str) -> Result<Vec<String>> {
        let entries: Vec<SubscriptionEntry> =
            self.request(HttpRequest::get(["subscribes", token])).await?;
        Ok(entries.into_iter().map(SubscriptionEntry::into_name).collect())
    }

    /// `POST /subscribes/add`.
    pub async fn subscribe(&self, token: &str, name: &str, kind: TargetType) -> Result<Ack> {
        let body = SubscribeRequest {
            token,
            tracked_name: name,
            tracked_type: TrackedType::from(kind),
        };
        let request = HttpRequest::new(Method::Post, ["subscribes", "add"])
            .with_body(serde_json::to_value(body)?);
        self.mutate(request).await
    }

    /// `DELETE /subscribes/{token}/{name}`.
    pub async fn delete_subscription(&self, token: &str, name: &str) -> Result<Ack> {
        self.mutate(HttpRequest::new(Method::Delete, ["subscribes", token, name]))
            .await
    }

    /// `GET /notifications/{token}`.
    pub async fn fetch_notifications(&self, token: &str) -> Result<Vec<Notification>> {
        self.request(HttpRequest::get(["notifications", token])).await
    }

    /// `GET /latest-release`.
    pub async fn latest_release(&self) -> Result<String> {
        let info: ReleaseInfo = self.request(HttpRequest::get(["latest-release"])).await?;
        Ok(info.into_version())
    }
}
