//! SSE Record Parser
//!
//! Parses a raw byte stream (from a reqwest response) into named
//! Server-Sent-Event records. The backend engine uses named events, so unlike
//! a plain `data:`-only stream the parser tracks the current `event:` field
//! and dispatches one record per blank line:
//!
//! ```text
//! event: station
//! data: {"stage":"ADAPTER","status":"ok","time_ms":412}
//!
//! event: done
//! data: {"ok":true}
//! ```
//!
//! Comment lines and `id:`/`retry:` fields are skipped. A record still
//! buffered when the stream ends is flushed so a final `done` without a
//! trailing blank line is not lost.

use std::collections::VecDeque;
use std::pin::Pin;

use futures_util::{Stream, StreamExt};

use crate::utils::error::AppError;

/// Default event name per the SSE specification.
const DEFAULT_EVENT_NAME: &str = "message";

/// One complete named SSE record.
#[derive(Debug, Clone, PartialEq)]
pub struct SseRecord {
    /// The record's event name ("message" when the stream never named one).
    pub event: String,
    /// Joined `data:` payload lines.
    pub data: String,
}

/// Internal state for the SSE byte stream parser.
struct SseParserState<S> {
    inner: Pin<Box<S>>,
    buffer: String,
    record: RecordBuilder,
    pending: VecDeque<Result<SseRecord, AppError>>,
    finished: bool,
}

/// Accumulates fields of the in-progress record between blank lines.
#[derive(Default)]
struct RecordBuilder {
    event: Option<String>,
    data_lines: Vec<String>,
}

impl RecordBuilder {
    /// Dispatches the accumulated record, if it carries any data.
    fn take(&mut self) -> Option<SseRecord> {
        if self.data_lines.is_empty() {
            self.event = None;
            return None;
        }
        let event = self
            .event
            .take()
            .unwrap_or_else(|| DEFAULT_EVENT_NAME.to_string());
        let data = std::mem::take(&mut self.data_lines).join("\n");
        Some(SseRecord { event, data })
    }

    /// Feeds one line into the record. Returns a record when the line is the
    /// blank dispatch line.
    fn feed(&mut self, line: &str) -> Option<SseRecord> {
        let line = line.strip_suffix('\r').unwrap_or(line);

        if line.is_empty() {
            return self.take();
        }
        // Comment line
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            // A field with no colon is a field name with empty value
            None => (line, ""),
        };
        match field {
            "event" => self.event = Some(value.to_string()),
            "data" => self.data_lines.push(value.to_string()),
            // id: and retry: are irrelevant to this consumer
            _ => {}
        }
        None
    }
}

/// Parses a raw byte stream into named SSE records.
///
/// Buffers incoming chunks, splits on newlines, and assembles
/// `event:`/`data:` fields into records. Transport errors are surfaced
/// in-stream and terminate parsing.
pub fn parse_sse_records<S>(
    byte_stream: S,
) -> impl Stream<Item = Result<SseRecord, AppError>> + Send
where
    S: Stream<Item = Result<bytes::Bytes, reqwest::Error>> + Send + 'static,
{
    let state = SseParserState {
        inner: Box::pin(byte_stream),
        buffer: String::new(),
        record: RecordBuilder::default(),
        pending: VecDeque::new(),
        finished: false,
    };

    futures_util::stream::unfold(state, |mut state| async move {
        loop {
            // Drain pending records first (FIFO order)
            if let Some(item) = state.pending.pop_front() {
                return Some((item, state));
            }
            if state.finished {
                return None;
            }

            match state.inner.next().await {
                Some(Ok(chunk)) => {
                    state.buffer.push_str(&String::from_utf8_lossy(&chunk));

                    while let Some(pos) = state.buffer.find('\n') {
                        let line = state.buffer[..pos].to_string();
                        state.buffer.drain(..=pos);
                        if let Some(record) = state.record.feed(&line) {
                            state.pending.push_back(Ok(record));
                        }
                    }
                }
                Some(Err(e)) => {
                    state.finished = true;
                    state
                        .pending
                        .push_back(Err(AppError::stream(format!("Stream read error: {}", e))));
                }
                None => {
                    // Stream ended; feed the unterminated tail line, then
                    // flush any record still being assembled.
                    state.finished = true;
                    if !state.buffer.is_empty() {
                        let remainder = std::mem::take(&mut state.buffer);
                        if let Some(record) = state.record.feed(&remainder) {
                            state.pending.push_back(Ok(record));
                        }
                    }
                    if let Some(record) = state.record.take() {
                        state.pending.push_back(Ok(record));
                    }
                }
            }
        }
    })
}
