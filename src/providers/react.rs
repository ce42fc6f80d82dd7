//! ReAct agent API.
//!
//! Unauthenticated; the request carries only the raw prompt and each stream
//! event is a backend-defined JSON document.

use serde::Serialize;
use serde_json::Value;

use crate::client::{Backend, ClientError, GenerationClient};
use crate::model::GenerationArgs;

/// Environment variable holding the agent endpoint URL.
pub const ENDPOINT_ENV: &str = "REACT_API_BASE_URL";

/// Client for the ReAct backend.
pub type ReactClient = GenerationClient<React>;

/// ReAct backend adapter.
#[derive(Debug, Clone)]
pub struct React {
    endpoint: String,
}

impl React {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }

    /// Read the endpoint from the environment.
    pub fn from_env() -> Result<Self, ClientError> {
        std::env::var(ENDPOINT_ENV)
            .map(Self::new)
            .map_err(|_| ClientError::Config(format!("{} is not set", ENDPOINT_ENV)))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReactRequest {
    input: String,
}

impl Backend for React {
    type Body = ReactRequest;
    type Output = Value;

    fn name(&self) -> &'static str {
        "react"
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn build_body(&self, args: &GenerationArgs, _stream: bool) -> ReactRequest {
        ReactRequest {
            input: args.inputs.clone(),
        }
    }
}
