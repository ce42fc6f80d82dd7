//! Streaming generation from the prompt-builder backend.
//!
//! Run with:
//! ```bash
//! export WATSONX_INFERENCE_API_BASE_URL="https://.../v1/generate"
//! export WATSONX_ACCESS_TOKEN="your-token"
//! RUST_LOG=genstream=debug cargo run --example watsonx_streaming
//! ```

use std::io::Write;

use futures::StreamExt;
use genstream::model::{FewShotExample, GenerationArgs, GenerationParameters};
use genstream::providers::{Watsonx, WatsonxClient};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let client = WatsonxClient::new(Watsonx::from_env()?)?;

    let args = GenerationArgs::new("Write a haiku about Rust programming.")
        .with_model("google/flan-ul2")
        .with_parameters(
            GenerationParameters::default()
                .with_instruction("You are a poet. Answer with the poem only.")
                .with_examples(vec![FewShotExample::new(
                    "Write a haiku about autumn.",
                    "Crimson leaves drifting\nwhispers on the cooling wind\nthe year exhales slow",
                )])
                .with_stop_sequences(vec!["Input:".to_string()]),
        );

    println!("Streaming response...\n");

    let mut results = match client.stream(&args).await {
        Ok(results) => results,
        Err(e) => {
            eprintln!("Error starting stream: {}", e);
            return Err(e.into());
        }
    };

    while let Some(output) = results.next().await {
        match output {
            Ok(output) => {
                print!("{}", output.text());
                std::io::stdout().flush()?;

                if let Some(reason) = output.results.first().and_then(|r| r.stop_reason.as_ref()) {
                    println!("\n\n=== Stream Complete ===");
                    println!("Stop reason: {}", reason);
                }
            }
            Err(e) => {
                eprintln!("\nError in stream: {}", e);
                return Err(e.into());
            }
        }
    }

    Ok(())
}
