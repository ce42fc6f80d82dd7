//! Server-Sent Events (SSE) stream processing.
//!
//! Bytes are split into lines first and decoded afterwards, so a line (or a
//! multi-byte character) split across any number of chunks is reassembled
//! before it is interpreted. Lines are grouped into events; a blank line
//! finalizes the current event.
//!
//! SSE format:
//! ```text
//! : comment
//! event: message
//! id: 42
//! data: {"first": "line",
//! data:  "second": "line"}
//!
//! data: {"another": "event"}
//! ```

use std::collections::VecDeque;

use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};
use tracing::debug;

use crate::client::ClientError;

/// A single finalized SSE event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SseEvent {
    /// The `id:` field, if present
    pub id: Option<String>,

    /// The `event:` field, if present
    pub event: Option<String>,

    /// All `data:` lines of the event joined with `\n`
    pub data: String,

    /// The `retry:` field in milliseconds, if present and numeric
    pub retry: Option<u64>,
}

/// Incremental SSE parser.
///
/// Feed it raw chunks in arrival order; it returns every event completed by
/// that chunk. One parser serves exactly one response body.
#[derive(Debug, Default)]
pub struct SseParser {
    /// Bytes of the incomplete trailing line
    buffer: Vec<u8>,
    /// Previous line ended in `\r`; a leading `\n` belongs to it
    discard_trailing_newline: bool,
    event: SseEvent,
    last_event_id: Option<String>,
    reconnection_time: Option<u64>,
}

impl SseParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw bytes from the response body. Returns the events completed by this chunk.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        let mut buffer = std::mem::take(&mut self.buffer);
        buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        let mut rest: &[u8] = &buffer;

        loop {
            if self.discard_trailing_newline && !rest.is_empty() {
                if rest[0] == b'\n' {
                    rest = &rest[1..];
                }
                self.discard_trailing_newline = false;
            }

            let Some(end) = rest.iter().position(|&b| b == b'\r' || b == b'\n') else {
                break;
            };
            if rest[end] == b'\r' {
                self.discard_trailing_newline = true;
            }

            if let Some(event) = self.process_line(&rest[..end]) {
                events.push(event);
            }
            rest = &rest[end + 1..];
        }

        self.buffer = rest.to_vec();
        events
    }

    /// Whether a partial line or an unterminated event is still buffered.
    pub fn has_pending(&self) -> bool {
        !self.buffer.is_empty() || !self.event.data.is_empty()
    }

    /// Id of the most recent event that carried one.
    pub fn last_event_id(&self) -> Option<&str> {
        self.last_event_id.as_deref()
    }

    /// Most recent reconnection interval announced by the server, in milliseconds.
    pub fn reconnection_time(&self) -> Option<u64> {
        self.reconnection_time
    }

    fn process_line(&mut self, line: &[u8]) -> Option<SseEvent> {
        if line.is_empty() {
            return self.dispatch();
        }

        let line = String::from_utf8_lossy(line);

        // Comment
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = line.split_once(':')?;
        let value = value.strip_prefix(' ').unwrap_or(value);

        match field {
            "data" => {
                if !self.event.data.is_empty() {
                    self.event.data.push('\n');
                }
                self.event.data.push_str(value);
            }
            "event" => self.event.event = Some(value.to_string()),
            "id" => {
                if !value.contains('\0') {
                    self.event.id = Some(value.to_string());
                    self.last_event_id = Some(value.to_string());
                }
            }
            "retry" => {
                if !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) {
                    if let Ok(millis) = value.parse::<u64>() {
                        self.event.retry = Some(millis);
                        self.reconnection_time = Some(millis);
                    }
                }
            }
            _ => {}
        }

        None
    }

    fn dispatch(&mut self) -> Option<SseEvent> {
        let event = std::mem::take(&mut self.event);
        if event.data.is_empty() {
            None
        } else {
            Some(event)
        }
    }
}

/// Turn any byte-chunk stream into a stream of SSE events.
///
/// Events are yielded in wire order. A transport error is yielded once and
/// ends the stream. An unterminated event at end of stream is dropped.
pub fn event_stream<S, E>(body: S) -> impl Stream<Item = Result<SseEvent, ClientError>> + Send
where
    S: Stream<Item = Result<Bytes, E>> + Send,
    E: Into<ClientError> + Send,
{
    stream::unfold(
        (Box::pin(body), SseParser::new(), VecDeque::new(), false),
        |(mut body, mut parser, mut pending, mut ended)| async move {
            loop {
                if let Some(event) = pending.pop_front() {
                    return Some((Ok(event), (body, parser, pending, ended)));
                }

                if ended {
                    return None;
                }

                match body.next().await {
                    Some(Ok(chunk)) => pending.extend(parser.feed(&chunk)),
                    Some(Err(e)) => {
                        ended = true;
                        return Some((Err(e.into()), (body, parser, pending, ended)));
                    }
                    None => {
                        if parser.has_pending() {
                            debug!("discarding unterminated SSE event at end of stream");
                        }
                        ended = true;
                    }
                }
            }
        },
    )
}

/// Extension trait for `reqwest::Response` to enable SSE streaming.
///
/// # Example
/// ```ignore
/// use genstream::sse::SSEResponseExt;
///
/// let response = client.post(url).send().await?;
/// let mut events = Box::pin(response.sse());
/// while let Some(event) = events.next().await {
///     println!("SSE data: {}", event?.data);
/// }
/// ```
pub trait SSEResponseExt {
    /// Convert the response body into a stream of SSE events.
    ///
    /// Dropping the stream drops the body and releases the connection.
    fn sse(self) -> impl Stream<Item = Result<SseEvent, ClientError>> + Send;
}

impl SSEResponseExt for reqwest::Response {
    fn sse(self) -> impl Stream<Item = Result<SseEvent, ClientError>> + Send {
        event_stream(self.bytes_stream())
    }
}
