use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Body of `POST /agent/invoke`: `{"input": {"input": "<query>"}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvokeRequest {
    pub input: InvokeInput,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvokeInput {
    pub input: String,
}

impl InvokeRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            input: InvokeInput {
                input: query.into(),
            },
        }
    }

    /// JSON bytes for the request body. Building through `Value` cannot fail.
    pub fn to_body(&self) -> Vec<u8> {
        serde_json::json!({ "input": { "input": self.input.input } })
            .to_string()
            .into_bytes()
    }
}

/// Query fields the agent extracted from the natural-language input.
///
/// Timestamps are kept as the backend sent them. Keys beyond the known three
/// are preserved in `extra` so the value serialises back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedQuery {
    pub tag_id: String,
    pub start_dt: String,
    pub end_dt: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Successful acknowledgment of an invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskInvocation {
    pub parsed: ParsedQuery,
    #[serde(default)]
    pub files: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
}

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

impl HealthStatus {
    pub fn is_ok(&self) -> bool {
        self.status.eq_ignore_ascii_case("ok")
    }
}
