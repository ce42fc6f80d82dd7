//! Decoding of SSE events into typed results.

use std::pin::Pin;

use futures::{Stream, StreamExt};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::client::ClientError;
use crate::sse::SseEvent;

/// Forward-only sequence of decoded results.
///
/// Pull with `StreamExt::next`. The stream owns the response body; dropping
/// it at any point releases the connection.
pub type ResultStream<T> = Pin<Box<dyn Stream<Item = Result<T, ClientError>> + Send>>;

/// Decode each event's data as JSON and yield it as `T`.
///
/// Events with empty data are skipped. An `{"error": ...}` payload fails the
/// sequence with [`ClientError::Stream`] and nothing further is yielded;
/// results yielded before it remain valid.
pub fn decode_events<T, S>(events: S) -> impl Stream<Item = Result<T, ClientError>> + Send
where
    T: DeserializeOwned + Send + 'static,
    S: Stream<Item = Result<SseEvent, ClientError>> + Send + 'static,
{
    async_stream::try_stream! {
        let mut events = Box::pin(events);
        let mut decoded = 0usize;

        while let Some(event) = events.next().await {
            let event = event?;
            if event.data.is_empty() {
                continue;
            }

            let result = decode_event::<T>(&event.data)?;
            decoded += 1;
            yield result;
        }

        debug!("event stream ended after {} results", decoded);
    }
}

/// Decode a single event payload.
pub fn decode_event<T: DeserializeOwned>(data: &str) -> Result<T, ClientError> {
    let value: Value = serde_json::from_str(data)?;

    if let Some(message) = error_message(&value) {
        debug!("error payload in stream: {}", message);
        return Err(ClientError::Stream(message));
    }

    Ok(serde_json::from_value(value)?)
}

fn error_message(value: &Value) -> Option<String> {
    let error = value.as_object()?.get("error")?;
    Some(match error {
        Value::String(message) => message.clone(),
        other => other.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::GenerationOutput;
    use futures::stream;

    fn event(data: &str) -> Result<SseEvent, ClientError> {
        Ok(SseEvent {
            data: data.to_string(),
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn test_yields_in_order() {
        let events = vec![
            event(r#"{"results":[{"generated_text":"Hi","generated_token_count":1}]}"#),
            event(r#"{"results":[{"generated_text":"Hi there","generated_token_count":2}]}"#),
        ];
        let results: Vec<_> = decode_events::<GenerationOutput, _>(stream::iter(events))
            .collect()
            .await;

        assert_eq!(results.len(), 2);
        let first = results[0].as_ref().unwrap();
        let second = results[1].as_ref().unwrap();
        assert_eq!(first.results[0].generated_text.as_deref(), Some("Hi"));
        assert_eq!(second.results[0].generated_token_count, Some(2));
    }

    #[tokio::test]
    async fn test_error_payload_stops_sequence() {
        let events = vec![
            event(r#"{"n":1}"#),
            event(r#"{"n":2}"#),
            event(r#"{"error":"model overloaded"}"#),
            event(r#"{"n":3}"#),
        ];
        let results: Vec<_> = decode_events::<Value, _>(stream::iter(events))
            .collect()
            .await;

        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(results[1].is_ok());
        match &results[2] {
            Err(ClientError::Stream(message)) => assert_eq!(message, "model overloaded"),
            other => panic!("expected stream error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_data_is_skipped() {
        let events = vec![event(""), event(r#"{"n":1}"#)];
        let results: Vec<_> = decode_events::<Value, _>(stream::iter(events))
            .collect()
            .await;
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_json_fails_sequence() {
        let events = vec![event("not json"), event(r#"{"n":1}"#)];
        let results: Vec<_> = decode_events::<Value, _>(stream::iter(events))
            .collect()
            .await;
        assert_eq!(results.len(), 1);
        assert!(matches!(results[0], Err(ClientError::Parse(_))));
    }

    #[test]
    fn test_non_string_error_is_rendered_as_json() {
        let err = decode_event::<Value>(r#"{"error":{"code":429}}"#).unwrap_err();
        match err {
            ClientError::Stream(message) => assert_eq!(message, r#"{"code":429}"#),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_error_key_only_checked_on_objects() {
        let value = decode_event::<Value>(r#"["error"]"#).unwrap();
        assert_eq!(value, serde_json::json!(["error"]));
    }

    #[test]
    fn test_multiline_data_is_one_document() {
        let value = decode_event::<Value>("{\"a\":\n1}").unwrap();
        assert_eq!(value["a"], 1);
    }
}
