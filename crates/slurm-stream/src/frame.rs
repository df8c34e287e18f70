//! SSE frames.
//!
//! A frame is one Server-Sent Event: optional `id`, optional `event`, a JSON
//! `data` payload and an optional `retry` hint. Frames are built here and
//! converted to [`axum::response::sse::Event`] at the HTTP edge.

use axum::response::sse::Event;
use serde::Serialize;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::warn;

/// Lifecycle event sent once when a stream starts
pub const EVENT_CONNECTED: &str = "connected";
/// Lifecycle event sent when the watcher ends on its own
pub const EVENT_STREAM_CLOSED: &str = "stream_closed";
/// In-band error event
pub const EVENT_ERROR: &str = "error";

/// One Server-Sent Events record.
///
/// `data` is always written, as compact JSON. `id` and `event` are written
/// only when set.
#[derive(Debug, Clone, PartialEq)]
pub struct SseFrame {
    /// `id:` field
    pub id: Option<String>,
    /// `event:` field
    pub event: Option<String>,
    /// Payload encoded into the `data:` field
    pub data: Value,
    /// Reconnection delay hint in milliseconds; zero is omitted
    pub retry_ms: u64,
}

impl SseFrame {
    /// Build a named frame from any serializable payload.
    ///
    /// If the payload fails to serialize the frame still goes out, carrying
    /// `{"error":"failed to marshal data"}` instead.
    pub fn new(event: impl Into<String>, data: &impl Serialize) -> Self {
        let event = event.into();
        let data = serde_json::to_value(data).unwrap_or_else(|e| {
            warn!(%event, error = %e, "Failed to serialize SSE payload");
            json!({ "error": "failed to marshal data" })
        });
        Self {
            id: None,
            event: Some(event),
            data,
            retry_ms: 0,
        }
    }

    /// `error` frame carrying `{"error": message}`
    pub fn error(message: impl std::fmt::Display) -> Self {
        Self::new(EVENT_ERROR, &json!({ "error": message.to_string() }))
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn with_retry_ms(mut self, retry_ms: u64) -> Self {
        self.retry_ms = retry_ms;
        self
    }

    pub fn is_event(&self, name: &str) -> bool {
        self.event.as_deref() == Some(name)
    }
}

impl From<SseFrame> for Event {
    fn from(frame: SseFrame) -> Self {
        let mut event = Event::default();
        if let Some(id) = frame.id {
            event = event.id(id);
        }
        if let Some(name) = frame.event {
            event = event.event(name);
        }
        // Compact JSON never contains a raw newline
        event = event.data(frame.data.to_string());
        if frame.retry_ms > 0 {
            event = event.retry(Duration::from_millis(frame.retry_ms));
        }
        event
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::body::to_bytes;
    use axum::response::IntoResponse;
    use axum::response::sse::Sse;
    use std::convert::Infallible;

    /// Bytes axum writes for one frame
    async fn render(frame: SseFrame) -> String {
        let stream = futures::stream::iter([Ok::<_, Infallible>(Event::from(frame))]);
        let body = Sse::new(stream).into_response().into_body();
        let bytes = to_bytes(body, usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_render_full_frame() {
        let frame = SseFrame::new("job_event", &json!({"type": "new", "job_id": 7}))
            .with_id("job-1")
            .with_retry_ms(3000);
        let wire = render(frame).await;
        let lines: Vec<&str> = wire.lines().collect();
        assert_eq!(lines[0], "id: job-1");
        assert_eq!(lines[1], "event: job_event");
        assert_eq!(lines[2], "data: {\"job_id\":7,\"type\":\"new\"}");
        assert!(lines[3].starts_with("retry:") && lines[3].ends_with("3000"));
        assert!(wire.ends_with("\n\n"), "Frame must end with a blank line");
    }

    #[tokio::test]
    async fn test_render_omits_absent_fields() {
        let frame = SseFrame {
            id: None,
            event: None,
            data: json!("plain text"),
            retry_ms: 0,
        };
        assert_eq!(render(frame).await, "data: \"plain text\"\n\n");
    }

    #[test]
    fn test_error_frame() {
        let frame = SseFrame::error("stream parameter required");
        assert!(frame.is_event(EVENT_ERROR));
        assert_eq!(frame.data, json!({"error": "stream parameter required"}));
    }

    #[test]
    fn test_unserializable_payload_falls_back() {
        struct Broken;

        impl Serialize for Broken {
            fn serialize<S: serde::Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
                Err(serde::ser::Error::custom("boom"))
            }
        }

        let frame = SseFrame::new("job_event", &Broken);
        assert_eq!(frame.data, json!({"error": "failed to marshal data"}));
        assert!(frame.is_event("job_event"));
    }
}
