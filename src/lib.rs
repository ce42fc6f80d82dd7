//! # genstream - Streaming Text Generation Client
//!
//! A small client library for consuming incremental text-generation results
//! delivered over HTTP as Server-Sent Events.
//!
//! ## Features
//! - Async-first, tokio compatible
//! - One generic pipeline, parameterized by a backend adapter
//! - Incremental SSE parsing that survives arbitrary chunk splits
//! - Typed results as a pull-based `Stream`
//! - One immediate retry when the backend answers `503`
//!
//! ## Architecture
//!
//! Every call runs the same four steps:
//!
//! 1. **Request building** (`request`): arguments become a `RequestDescriptor`
//! 2. **Transport** (`http`, `transport`): one HTTP request, classified into
//!    stream / empty / retry / error
//! 3. **SSE parsing** (`sse`): body chunks become discrete events
//! 4. **Decoding** (`stream`): each event's data becomes a typed result, or
//!    ends the sequence with an error
//!
//! Backends implement [`Backend`](client::Backend) to provide the endpoint,
//! credentials, body shape and result type.
//!
//! ## Example
//! ```no_run
//! use futures::StreamExt;
//! use genstream::model::{GenerationArgs, GenerationParameters};
//! use genstream::providers::{Watsonx, WatsonxClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = WatsonxClient::new(Watsonx::from_env()?)?;
//!
//!     let args = GenerationArgs::new("Hello")
//!         .with_model("google/flan-ul2")
//!         .with_parameters(GenerationParameters::default().with_instruction("Be concise."));
//!
//!     let mut results = client.stream(&args).await?;
//!     while let Some(output) = results.next().await {
//!         println!("{:?}", output?);
//!     }
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod http;
pub mod model;
pub mod options;
pub mod providers;
pub mod request;
pub mod sse;
pub mod stream;
pub mod transport;

// Re-exports for convenience
pub use client::{Backend, ClientError, GenerationClient};
pub use model::{GenerationArgs, GenerationOutput, GenerationParameters, Payload};
pub use sse::{SseEvent, SseParser};
pub use stream::ResultStream;
