/// Failures on the progress stream. These travel as data through the view,
/// never out of the delivery path.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StreamError {
    #[error("malformed progress frame: {0}")]
    Decode(String),
    #[error("progress stream failed: {0}")]
    Transport(String),
}
