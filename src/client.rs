//! Core client, backend adapter trait and error types.

use futures::stream;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::http::{self, build_http_client};
use crate::model::{GenerationArgs, Payload};
use crate::options::{RequestOptions, SecretString, TransportOptions};
use crate::request::build_request;
use crate::sse::SSEResponseExt;
use crate::stream::{decode_events, ResultStream};
use crate::transport::{classify_one_shot, classify_stream, OneShotOutcome, StreamOutcome, EVENT_STREAM};

/// Errors that can occur during client operations.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The request could not be assembled.
    #[error("Invalid request: {0}")]
    Build(String),

    /// Non-OK response without a usable error message.
    #[error("Server response contains error: {status}")]
    Transport { status: StatusCode },

    /// Error message reported by the server, verbatim.
    #[error("{0}")]
    Server(String),

    #[error("Server does not support event stream content type, it returned {0}")]
    UnsupportedContentType(String),

    /// Error payload received inside an otherwise successful stream.
    #[error("{0}")]
    Stream(String),

    #[error("Invalid inference output: {0}")]
    InvalidOutput(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Adapter describing one inference backend.
///
/// The pipeline (build, send, classify, parse, decode) is shared; a backend
/// only supplies its endpoint, credentials, body shape and result type.
///
/// # Example
/// ```rust,ignore
/// struct Echo { url: String }
///
/// impl Backend for Echo {
///     type Body = serde_json::Value;
///     type Output = serde_json::Value;
///
///     fn name(&self) -> &'static str { "echo" }
///     fn endpoint(&self) -> &str { &self.url }
///     fn build_body(&self, args: &GenerationArgs, _stream: bool) -> Self::Body {
///         serde_json::json!({ "prompt": args.inputs })
///     }
/// }
/// ```
pub trait Backend: Send + Sync {
    /// Serialized request body.
    type Body: Serialize;

    /// Decoded result of one stream event.
    type Output: DeserializeOwned + Send + 'static;

    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// URL requests are posted to.
    fn endpoint(&self) -> &str;

    /// Bearer token, if the backend authenticates.
    fn access_token(&self) -> Option<&SecretString> {
        None
    }

    fn build_body(&self, args: &GenerationArgs, stream: bool) -> Self::Body;

    /// Whether a response content type denotes an event stream.
    fn is_event_stream(&self, content_type: &str) -> bool {
        content_type.contains(EVENT_STREAM)
    }
}

/// Streaming generation client for a single backend.
///
/// Each call owns its own connection and parser state; a client can serve
/// any number of concurrent calls.
///
/// # Example
/// ```no_run
/// use futures::StreamExt;
/// use genstream::model::GenerationArgs;
/// use genstream::providers::{Watsonx, WatsonxClient};
///
/// # async fn run() -> Result<(), genstream::ClientError> {
/// let client = WatsonxClient::new(Watsonx::new("https://bam.example.com/v1/generate", "token"))?;
/// let mut results = client.stream(&GenerationArgs::new("Hello")).await?;
/// while let Some(output) = results.next().await {
///     print!("{}", output?.text());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct GenerationClient<B> {
    backend: B,
    http: reqwest::Client,
    transport_options: TransportOptions,
    request_options: RequestOptions,
}

impl<B: Backend> GenerationClient<B> {
    /// Create a client with default transport options.
    pub fn new(backend: B) -> Result<Self, ClientError> {
        Self::with_transport(backend, TransportOptions::default())
    }

    /// Create a client with explicit transport options.
    pub fn with_transport(
        backend: B,
        transport_options: TransportOptions,
    ) -> Result<Self, ClientError> {
        let http = build_http_client(&transport_options)?;
        Ok(Self {
            backend,
            http,
            transport_options,
            request_options: RequestOptions::default(),
        })
    }

    /// Replace the default retry options.
    pub fn with_request_options(mut self, request_options: RequestOptions) -> Self {
        self.request_options = request_options;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn request_options(&self) -> RequestOptions {
        self.request_options
    }

    /// Start a streaming generation with the client's default options.
    pub async fn stream(&self, args: &GenerationArgs) -> Result<ResultStream<B::Output>, ClientError> {
        self.stream_with_options(args, self.request_options).await
    }

    /// Start a streaming generation.
    ///
    /// Fails before yielding anything when the response is not a usable event
    /// stream. A `503` is retried at most once.
    pub async fn stream_with_options(
        &self,
        args: &GenerationArgs,
        mut options: RequestOptions,
    ) -> Result<ResultStream<B::Output>, ClientError> {
        loop {
            let response = self.send(args, true).await?;

            match classify_stream(&self.backend, response, options.retries_unavailable()).await? {
                StreamOutcome::Unavailable => {
                    warn!(backend = self.backend.name(), "service unavailable, waiting for model");
                    options.wait_for_model = true;
                }
                StreamOutcome::Empty => {
                    debug!(backend = self.backend.name(), "event stream has no body");
                    return Ok(Box::pin(stream::empty()));
                }
                StreamOutcome::Stream(response) => {
                    return Ok(Box::pin(decode_events::<B::Output, _>(response.sse())));
                }
            }
        }
    }

    /// One-shot (non-streaming) generation with the client's default options.
    pub async fn request<T: DeserializeOwned>(
        &self,
        args: &GenerationArgs,
    ) -> Result<Payload<T>, ClientError> {
        self.request_with_options(args, self.request_options).await
    }

    /// One-shot (non-streaming) generation.
    ///
    /// JSON bodies are decoded as `T`; any other body is returned as bytes.
    pub async fn request_with_options<T: DeserializeOwned>(
        &self,
        args: &GenerationArgs,
        mut options: RequestOptions,
    ) -> Result<Payload<T>, ClientError> {
        loop {
            let response = self.send(args, false).await?;

            match classify_one_shot(response, options.retries_unavailable()).await? {
                OneShotOutcome::Unavailable => {
                    warn!(backend = self.backend.name(), "service unavailable, waiting for model");
                    options.wait_for_model = true;
                }
                OneShotOutcome::Payload(payload) => return Ok(payload),
            }
        }
    }

    async fn send(&self, args: &GenerationArgs, stream: bool) -> Result<reqwest::Response, ClientError> {
        let descriptor = build_request(
            &self.backend,
            args,
            stream,
            &self.transport_options.extra_headers,
        )?;

        debug!(
            backend = self.backend.name(),
            url = %descriptor.url,
            stream,
            "sending generation request"
        );

        http::send(&self.http, descriptor).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ClientError::Transport {
            status: StatusCode::BAD_GATEWAY,
        };
        assert_eq!(err.to_string(), "Server response contains error: 502 Bad Gateway");

        let err = ClientError::Server("Model is overloaded".to_string());
        assert_eq!(err.to_string(), "Model is overloaded");

        let err = ClientError::UnsupportedContentType("application/json".to_string());
        assert_eq!(
            err.to_string(),
            "Server does not support event stream content type, it returned application/json"
        );
    }
}
