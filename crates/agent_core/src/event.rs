use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One structured message from the progress stream.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProgressEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
}

impl ProgressEvent {
    /// Takes each known field that holds a string; other values count as absent.
    pub fn from_object(object: &Map<String, Value>) -> Self {
        let field = |key: &str| object.get(key).and_then(Value::as_str).map(str::to_string);
        Self {
            step: field("step"),
            status: field("status"),
            msg: field("msg"),
        }
    }

    /// The `(step, status)` pair when both carry a value.
    pub fn transition(&self) -> Option<(&str, &str)> {
        let step = self.step.as_deref().filter(|s| !s.is_empty())?;
        let status = self.status.as_deref().filter(|s| !s.is_empty())?;
        Some((step, status))
    }

    pub fn log_line(&self) -> Option<&str> {
        self.msg.as_deref().filter(|m| !m.is_empty())
    }
}

/// Result of inspecting one frame of stream data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameDecode {
    /// Not structured data (keep-alives, plain text); skip silently.
    Ignored,
    Event(ProgressEvent),
    /// Looked structured but failed to parse.
    Malformed(String),
}

/// Capability check: does the frame open a JSON object?
pub fn looks_structured(data: &str) -> bool {
    data.trim_start().starts_with('{')
}

pub fn decode_frame(data: &str) -> FrameDecode {
    if !looks_structured(data) {
        return FrameDecode::Ignored;
    }
    match serde_json::from_str::<Value>(data) {
        Ok(Value::Object(object)) => FrameDecode::Event(ProgressEvent::from_object(&object)),
        Ok(_) => FrameDecode::Malformed("frame is not a JSON object".to_string()),
        Err(err) => FrameDecode::Malformed(err.to_string()),
    }
}
