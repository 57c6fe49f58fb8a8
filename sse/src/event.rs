use serde_json::Value;

/// Event name under which transport and connection errors are dispatched.
///
/// `subscribe` never fails because a host is unreachable; callers who care
/// about stream health register a handler for this event name.
pub const ERROR_EVENT: &str = "error";

/// A named event delivered on a shared stream.
///
/// `data` is the raw payload as sent by the server. Vertex streams carry
/// JSON, but the registry does not assume that; use [`StreamEvent::json`]
/// when a structured view is wanted.
#[derive(Debug, Clone)]
pub struct StreamEvent {
    pub event_type: String,
    pub data: String,
}

impl StreamEvent {
    /// Parses the payload as JSON.
    pub fn json(&self) -> Result<Value, serde_json::Error> {
        serde_json::from_str(&self.data)
    }
}
