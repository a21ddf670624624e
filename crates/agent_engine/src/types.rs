use thiserror::Error;

/// Failure of a single invocation exchange.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvocationError {
    /// The backend answered with a non-success status. Displays the body verbatim.
    #[error("{body}")]
    Rejected { status: u16, body: String },
    /// No response could be obtained.
    #[error("agent unreachable: {0}")]
    Unreachable(String),
    /// Success status, but the body is not a task acknowledgment.
    #[error("malformed agent response: {0}")]
    MalformedResponse(String),
    #[error(transparent)]
    Settings(#[from] SettingsError),
}

impl InvocationError {
    /// Whether trying again later could help (as opposed to reporting the input).
    pub fn is_retryable(&self) -> bool {
        matches!(self, InvocationError::Unreachable(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("{0} is not set")]
    MissingBaseUrl(&'static str),
    #[error("invalid agent url: {0}")]
    InvalidUrl(String),
    #[error("failed to build http client: {0}")]
    Client(String),
    #[error("no async runtime available: {0}")]
    Runtime(String),
}
