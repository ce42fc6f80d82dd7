//! Request building.
//!
//! Turns generation arguments into a complete request descriptor. No I/O
//! happens here; a fresh descriptor is built for every attempt.

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use std::collections::HashMap;

use crate::client::{Backend, ClientError};
use crate::http::add_extra_headers;
use crate::model::GenerationArgs;

/// Everything needed to issue one HTTP request.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub url: String,
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Build the request for `backend`.
///
/// `Content-Type` and `Authorization` always win over same-named extra headers.
pub fn build_request<B: Backend + ?Sized>(
    backend: &B,
    args: &GenerationArgs,
    stream: bool,
    extra_headers: &Option<HashMap<String, String>>,
) -> Result<RequestDescriptor, ClientError> {
    let mut headers = HeaderMap::new();
    add_extra_headers(&mut headers, extra_headers)?;

    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    if let Some(token) = backend.access_token() {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
            .map_err(|_| ClientError::Build("access token is not a valid header value".to_string()))?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }

    let body = serde_json::to_vec(&backend.build_body(args, stream))
        .map_err(|e| ClientError::Build(format!("could not serialize request body: {}", e)))?;

    Ok(RequestDescriptor {
        url: backend.endpoint().to_string(),
        method: Method::POST,
        headers,
        body: Bytes::from(body),
    })
}
