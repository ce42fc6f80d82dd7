//! Response classification.
//!
//! Decides what a single HTTP response means for the pipeline: a usable
//! event stream, an empty result, a retryable `503`, or an error.

use reqwest::header::CONTENT_TYPE;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::client::{Backend, ClientError};
use crate::model::Payload;

/// Content type of an SSE response body.
pub const EVENT_STREAM: &str = "text/event-stream";

const JSON: &str = "application/json";

/// Outcome of a streaming attempt.
#[derive(Debug)]
pub enum StreamOutcome {
    /// OK response with an event-stream body
    Stream(Response),

    /// OK response with an event-stream content type but no body
    Empty,

    /// `503` that the caller allowed to be retried
    Unavailable,
}

/// Outcome of a one-shot attempt.
#[derive(Debug)]
pub enum OneShotOutcome<T> {
    Payload(Payload<T>),
    Unavailable,
}

fn content_type(response: &Response) -> Option<String> {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

fn is_json(content_type: Option<&str>) -> bool {
    content_type.is_some_and(|ct| ct.starts_with(JSON))
}

fn is_retryable(status: StatusCode, retry_unavailable: bool) -> bool {
    retry_unavailable && status == StatusCode::SERVICE_UNAVAILABLE
}

/// Classify the response to a streaming request.
///
/// A retryable response is dropped here, so its connection is released
/// before any retry starts.
pub async fn classify_stream<B: Backend + ?Sized>(
    backend: &B,
    response: Response,
    retry_unavailable: bool,
) -> Result<StreamOutcome, ClientError> {
    let status = response.status();

    if is_retryable(status, retry_unavailable) {
        return Ok(StreamOutcome::Unavailable);
    }

    if !status.is_success() {
        return Err(server_error(response).await);
    }

    let content_type = content_type(&response);
    if !content_type
        .as_deref()
        .is_some_and(|ct| backend.is_event_stream(ct))
    {
        let content_type = content_type.unwrap_or_else(|| "none".to_string());
        warn!(backend = backend.name(), "unexpected content type {}", content_type);
        return Err(ClientError::UnsupportedContentType(content_type));
    }

    if response.content_length() == Some(0) {
        return Ok(StreamOutcome::Empty);
    }

    Ok(StreamOutcome::Stream(response))
}

/// Classify the response to a one-shot request and read its body.
pub async fn classify_one_shot<T: DeserializeOwned>(
    response: Response,
    retry_unavailable: bool,
) -> Result<OneShotOutcome<T>, ClientError> {
    let status = response.status();

    if is_retryable(status, retry_unavailable) {
        return Ok(OneShotOutcome::Unavailable);
    }

    if !status.is_success() {
        return Err(server_error(response).await);
    }

    let json = is_json(content_type(&response).as_deref());
    let body = response.bytes().await?;

    let payload = if json {
        Payload::Json(serde_json::from_slice(&body)?)
    } else {
        Payload::Binary(body)
    };

    Ok(OneShotOutcome::Payload(payload))
}

/// Build the error for a non-OK response.
///
/// A JSON body with a truthy `error` field yields [`ClientError::Server`]
/// with that message; anything else yields [`ClientError::Transport`].
pub async fn server_error(response: Response) -> ClientError {
    let status = response.status();

    if is_json(content_type(&response).as_deref()) {
        match response.json::<Value>().await {
            Ok(body) => {
                if let Some(message) = reported_error(&body) {
                    debug!("server reported error ({}): {}", status, message);
                    return ClientError::Server(message);
                }
            }
            Err(e) => debug!("unreadable JSON error body ({}): {}", status, e),
        }
    }

    ClientError::Transport { status }
}

/// Message of a truthy `error` field.
pub fn reported_error(body: &Value) -> Option<String> {
    match body.get("error")? {
        Value::Null | Value::Bool(false) => None,
        Value::String(message) if message.is_empty() => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::String(message) => Some(message.clone()),
        other => Some(other.to_string()),
    }
}
