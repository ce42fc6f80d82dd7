//! Prompt-builder generation API (watsonx / BAM).
//!
//! Requests use bearer authentication and wrap the prompt in a
//! `prompt_builder` template carrying the instruction and few-shot examples.
//! Decoding parameters are fixed to deterministic values; only stop
//! sequences and the stream flag come from the caller.

use serde::Serialize;

use crate::client::{Backend, ClientError, GenerationClient};
use crate::model::{FewShotExample, GenerationArgs, GenerationOutput, TextGenerationOutput};
use crate::options::SecretString;
use crate::transport::EVENT_STREAM;

/// Environment variable holding the generation endpoint URL.
pub const ENDPOINT_ENV: &str = "WATSONX_INFERENCE_API_BASE_URL";

/// Environment variable holding the access token.
pub const ACCESS_TOKEN_ENV: &str = "WATSONX_ACCESS_TOKEN";

const TEMPLATE_ID: &str = "prompt_builder";
const INPUT_PREFIX: &str = "Input:";
const OUTPUT_PREFIX: &str = "Output:";

const DECODING_METHOD: &str = "sample";
const MIN_NEW_TOKENS: u32 = 1;
const MAX_NEW_TOKENS: u32 = 500;
const BEAM_WIDTH: u32 = 1;

/// Client for the prompt-builder backend.
pub type WatsonxClient = GenerationClient<Watsonx>;

/// Prompt-builder backend adapter.
#[derive(Debug, Clone)]
pub struct Watsonx {
    endpoint: String,
    access_token: SecretString,
}

impl Watsonx {
    pub fn new(endpoint: impl Into<String>, access_token: impl Into<SecretString>) -> Self {
        Self {
            endpoint: endpoint.into(),
            access_token: access_token.into(),
        }
    }

    /// Read the endpoint and access token from the environment.
    pub fn from_env() -> Result<Self, ClientError> {
        let endpoint = std::env::var(ENDPOINT_ENV)
            .map_err(|_| ClientError::Config(format!("{} is not set", ENDPOINT_ENV)))?;
        let access_token = std::env::var(ACCESS_TOKEN_ENV)
            .map_err(|_| ClientError::Config(format!("{} is not set", ACCESS_TOKEN_ENV)))?;
        Ok(Self::new(endpoint, access_token))
    }
}

impl Backend for Watsonx {
    type Body = WatsonxRequest;
    type Output = GenerationOutput;

    fn name(&self) -> &'static str {
        "watsonx"
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn access_token(&self) -> Option<&SecretString> {
        Some(&self.access_token)
    }

    fn build_body(&self, args: &GenerationArgs, stream: bool) -> WatsonxRequest {
        let parameters = args.parameters.as_ref();

        WatsonxRequest {
            model_id: args.model.clone(),
            inputs: vec![args.inputs.clone()],
            template: PromptTemplate {
                id: TEMPLATE_ID,
                data: TemplateData {
                    instruction: parameters.and_then(|p| p.instruction.clone()),
                    input_prefix: INPUT_PREFIX,
                    output_prefix: OUTPUT_PREFIX,
                    examples: parameters.and_then(|p| p.examples.clone()),
                },
            },
            parameters: DecodingParameters {
                decoding_method: DECODING_METHOD,
                min_new_tokens: MIN_NEW_TOKENS,
                max_new_tokens: MAX_NEW_TOKENS,
                beam_width: BEAM_WIDTH,
                stop_sequences: parameters.and_then(|p| p.stop_sequences.clone()),
                stream,
                temperature: 0,
                top_k: 1,
                top_p: 1,
            },
        }
    }

    /// The content type must be exactly `text/event-stream`.
    fn is_event_stream(&self, content_type: &str) -> bool {
        content_type == EVENT_STREAM
    }
}

impl GenerationClient<Watsonx> {
    /// One-shot generation returning the text of the first result.
    pub async fn text_generation(
        &self,
        args: &GenerationArgs,
    ) -> Result<TextGenerationOutput, ClientError> {
        let output = self
            .request::<GenerationOutput>(args)
            .await?
            .json()
            .ok_or_else(|| ClientError::InvalidOutput("expected a JSON response".to_string()))?;

        let first = output
            .results
            .into_iter()
            .next()
            .ok_or_else(|| ClientError::InvalidOutput("response contains no results".to_string()))?;

        Ok(TextGenerationOutput {
            generated_text: first.generated_text.unwrap_or_default(),
        })
    }
}

// --- Prompt-builder API Request Types ---

#[derive(Debug, Clone, Serialize)]
pub struct WatsonxRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    model_id: Option<String>,
    inputs: Vec<String>,
    template: PromptTemplate,
    parameters: DecodingParameters,
}

#[derive(Debug, Clone, Serialize)]
struct PromptTemplate {
    id: &'static str,
    data: TemplateData,
}

#[derive(Debug, Clone, Serialize)]
struct TemplateData {
    #[serde(skip_serializing_if = "Option::is_none")]
    instruction: Option<String>,
    input_prefix: &'static str,
    output_prefix: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    examples: Option<Vec<FewShotExample>>,
}

#[derive(Debug, Clone, Serialize)]
struct DecodingParameters {
    decoding_method: &'static str,
    min_new_tokens: u32,
    max_new_tokens: u32,
    beam_width: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop_sequences: Option<Vec<String>>,
    stream: bool,
    temperature: u32,
    top_k: u32,
    top_p: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::GenerationParameters;
    use serde_json::json;

    #[test]
    fn test_body_with_template_data() {
        let backend = Watsonx::new("http://localhost/v1/generate", "tok");
        let args = GenerationArgs::new("Hello")
            .with_model("google/flan-ul2")
            .with_parameters(
                GenerationParameters::default()
                    .with_instruction("Answer briefly.")
                    .with_examples(vec![FewShotExample::new("2+2", "4")])
                    .with_stop_sequences(vec!["\n\n".to_string()])
                    // Ignored: decoding is fixed
                    .with_temperature(0.9),
            );

        let body = serde_json::to_value(backend.build_body(&args, true)).unwrap();
        assert_eq!(
            body,
            json!({
                "model_id": "google/flan-ul2",
                "inputs": ["Hello"],
                "template": {
                    "id": "prompt_builder",
                    "data": {
                        "instruction": "Answer briefly.",
                        "input_prefix": "Input:",
                        "output_prefix": "Output:",
                        "examples": [{"input": "2+2", "output": "4"}]
                    }
                },
                "parameters": {
                    "decoding_method": "sample",
                    "min_new_tokens": 1,
                    "max_new_tokens": 500,
                    "beam_width": 1,
                    "stop_sequences": ["\n\n"],
                    "stream": true,
                    "temperature": 0,
                    "top_k": 1,
                    "top_p": 1
                }
            })
        );
    }

    #[test]
    fn test_body_omits_absent_values() {
        let backend = Watsonx::new("http://localhost/v1/generate", "tok");
        let body = serde_json::to_value(backend.build_body(&GenerationArgs::new("Hi"), false)).unwrap();

        assert!(body.get("model_id").is_none());
        assert!(body["template"]["data"].get("instruction").is_none());
        assert!(body["template"]["data"].get("examples").is_none());
        assert!(body["parameters"].get("stop_sequences").is_none());
        assert_eq!(body["parameters"]["stream"], false);
    }

    #[test]
    fn test_requires_exact_event_stream_type() {
        let backend = Watsonx::new("http://localhost", "tok");
        assert!(backend.is_event_stream("text/event-stream"));
        assert!(!backend.is_event_stream("text/event-stream; charset=utf-8"));
        assert!(!backend.is_event_stream("application/json"));
    }

    #[test]
    fn test_always_authenticates() {
        let backend = Watsonx::new("http://localhost", "tok");
        assert_eq!(backend.access_token().unwrap().expose_secret(), "tok");
    }

    #[test]
    fn test_from_env() {
        std::env::set_var(ENDPOINT_ENV, "http://localhost/v1/generate");
        std::env::set_var(ACCESS_TOKEN_ENV, "env-token");
        let backend = Watsonx::from_env().unwrap();
        assert_eq!(backend.endpoint(), "http://localhost/v1/generate");
        assert_eq!(backend.access_token().unwrap().expose_secret(), "env-token");
    }
}
