use crate::{Stage, StreamError, TrackingStatus};

/// Snapshot published to observers after every change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressView {
    pub task_id: String,
    pub stage: Stage,
    pub percent: u8,
    pub log: Vec<String>,
    pub tracking: TrackingStatus,
    pub decode_errors: usize,
    pub last_error: Option<StreamError>,
}

impl ProgressView {
    pub fn is_live(&self) -> bool {
        self.tracking.is_live()
    }
}
