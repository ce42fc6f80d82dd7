//! Inference backend implementations.

pub mod react;
pub mod watsonx;

// Re-export for convenience
pub use react::{React, ReactClient};
pub use watsonx::{Watsonx, WatsonxClient};
