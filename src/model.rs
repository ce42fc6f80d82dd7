//! Data models for generation requests and decoded results.

use bytes::Bytes;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// A single few-shot example passed to prompt-builder templates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FewShotExample {
    pub input: String,
    pub output: String,
}

impl FewShotExample {
    pub fn new(input: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
        }
    }
}

/// Optional generation parameters.
///
/// Which of these a backend honours is backend-specific; the values are
/// passed through without validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GenerationParameters {
    /// Use sampling instead of greedy decoding
    pub do_sample: Option<bool>,

    /// Number of new tokens to generate
    pub max_new_tokens: Option<u32>,

    /// Soft time budget in seconds, enforced by the server
    pub max_time: Option<f32>,

    pub num_return_sequences: Option<u32>,

    pub repetition_penalty: Option<f32>,

    /// Include the prompt in the returned text
    pub return_full_text: Option<bool>,

    /// Temperature for sampling
    pub temperature: Option<f32>,

    pub top_k: Option<u32>,

    pub top_p: Option<f32>,

    /// Maximum number of input tokens
    pub truncate: Option<u32>,

    pub stop_sequences: Option<Vec<String>>,

    /// Instruction text placed ahead of the examples
    pub instruction: Option<String>,

    /// Few-shot examples
    pub examples: Option<Vec<FewShotExample>>,
}

impl GenerationParameters {
    pub fn with_max_new_tokens(mut self, max_new_tokens: u32) -> Self {
        self.max_new_tokens = Some(max_new_tokens);
        self
    }

    pub fn with_max_time(mut self, seconds: f32) -> Self {
        self.max_time = Some(seconds);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_top_k(mut self, top_k: u32) -> Self {
        self.top_k = Some(top_k);
        self
    }

    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }

    pub fn with_stop_sequences(mut self, stop_sequences: Vec<String>) -> Self {
        self.stop_sequences = Some(stop_sequences);
        self
    }

    pub fn with_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.instruction = Some(instruction.into());
        self
    }

    pub fn with_examples(mut self, examples: Vec<FewShotExample>) -> Self {
        self.examples = Some(examples);
        self
    }
}

/// Arguments for a single generation call.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GenerationArgs {
    /// Prompt text to generate from
    pub inputs: String,

    /// Target model identifier
    pub model: Option<String>,

    pub parameters: Option<GenerationParameters>,
}

impl GenerationArgs {
    pub fn new(inputs: impl Into<String>) -> Self {
        Self {
            inputs: inputs.into(),
            model: None,
            parameters: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_parameters(mut self, parameters: GenerationParameters) -> Self {
        self.parameters = Some(parameters);
        self
    }
}

/// One entry of a prompt-builder generation result.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GenerationResult {
    /// Text generated so far (or the chunk for this event)
    pub generated_text: Option<String>,
    pub generated_token_count: Option<u32>,
    pub input_token_count: Option<u32>,
    pub stop_reason: Option<String>,
    pub seed: Option<u64>,
}

/// Prompt-builder generation output, both per streamed event and for one-shot calls.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GenerationOutput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,

    #[serde(default)]
    pub results: Vec<GenerationResult>,
}

impl GenerationOutput {
    /// Concatenated text of all results.
    pub fn text(&self) -> String {
        self.results
            .iter()
            .filter_map(|r| r.generated_text.as_deref())
            .join("")
    }
}

/// Simplified one-shot output: the text of the first result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TextGenerationOutput {
    pub generated_text: String,
}

/// Body of a one-shot (non-streaming) response.
#[derive(Debug, Clone)]
pub enum Payload<T> {
    /// `application/json` body decoded as `T`
    Json(T),

    /// Any other content type, returned as raw bytes
    Binary(Bytes),
}

impl<T> Payload<T> {
    /// The decoded JSON value, if the body was JSON.
    pub fn json(self) -> Option<T> {
        match self {
            Payload::Json(value) => Some(value),
            Payload::Binary(_) => None,
        }
    }
}
