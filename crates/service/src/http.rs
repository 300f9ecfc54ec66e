//! Shared plumbing for talking to the hosted backend over HTTP.

use reqwest::{RequestBuilder, Response};
use serde_json::Value;

use crate::errors::ServiceError;

/// Attach the project key the way the backend gateway expects it.
pub(crate) fn authorize(req: RequestBuilder, key: &str) -> RequestBuilder {
    req.header("apikey", key).bearer_auth(key)
}

pub(crate) async fn send(req: RequestBuilder) -> Result<Response, ServiceError> {
    let resp = req.send().await.map_err(|e| ServiceError::Transport(e.to_string()))?;
    ensure_success(resp).await
}

/// Turn a non-2xx response into `ServiceError::Remote`, preferring the
/// backend's own `message`/`error_description`/`error` text over the raw body.
pub(crate) async fn ensure_success(resp: Response) -> Result<Response, ServiceError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(ServiceError::Remote { status: status.as_u16(), message: error_message(status, &body) })
}

fn error_message(status: reqwest::StatusCode, body: &str) -> String {
    let from_json = serde_json::from_str::<Value>(body).ok().and_then(|v| {
        ["message", "error_description", "error"]
            .iter()
            .find_map(|k| v.get(*k).and_then(Value::as_str).map(str::to_string))
    });
    match from_json.filter(|m| !m.trim().is_empty()) {
        Some(m) => m,
        None if body.trim().is_empty() => status.to_string(),
        None => body.trim().to_string(),
    }
}
