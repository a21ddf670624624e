use agent_logging::{agent_debug, agent_warn};

use crate::view_model::ProgressView;
use crate::{ProgressEvent, Stage, StreamError, TransitionPolicy};

/// Whether the tracker still accepts frames.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TrackingStatus {
    #[default]
    Live,
    /// The server closed the stream after reporting `finish`.
    Completed,
    /// The owner disposed the tracker.
    Stopped,
    Failed(StreamError),
}

impl TrackingStatus {
    pub fn is_live(&self) -> bool {
        matches!(self, TrackingStatus::Live)
    }
}

/// State of one task's progress subscription.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TrackerState {
    task_id: String,
    policy: TransitionPolicy,
    current: Stage,
    log: Vec<String>,
    tracking: TrackingStatus,
    decode_errors: usize,
    last_error: Option<StreamError>,
    dirty: bool,
}

impl TrackerState {
    pub fn new(task_id: impl Into<String>, policy: TransitionPolicy) -> Self {
        Self {
            task_id: task_id.into(),
            policy,
            current: Stage::default(),
            log: Vec::new(),
            tracking: TrackingStatus::Live,
            decode_errors: 0,
            last_error: None,
            dirty: false,
        }
    }

    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    pub fn policy(&self) -> TransitionPolicy {
        self.policy
    }

    pub fn current(&self) -> Stage {
        self.current
    }

    pub fn log(&self) -> &[String] {
        &self.log
    }

    pub fn tracking(&self) -> &TrackingStatus {
        &self.tracking
    }

    pub fn is_live(&self) -> bool {
        self.tracking.is_live()
    }

    pub fn view(&self) -> ProgressView {
        ProgressView {
            task_id: self.task_id.clone(),
            stage: self.current,
            percent: self.current.percent(),
            log: self.log.clone(),
            tracking: self.tracking.clone(),
            decode_errors: self.decode_errors,
            last_error: self.last_error.clone(),
        }
    }

    /// Returns true once after any change, then resets.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn apply_event(&mut self, event: &ProgressEvent) {
        if let Some((step, status)) = event.transition() {
            match step.parse::<Stage>() {
                Ok(next) if self.policy.allows(self.current, next) => {
                    agent_debug!(
                        "task={} stage {} -> {} ({})",
                        self.task_id,
                        self.current,
                        next,
                        status
                    );
                    self.current = next;
                    self.dirty = true;
                }
                Ok(next) => {
                    agent_warn!(
                        "task={} ignoring regression {} -> {} under strict policy",
                        self.task_id,
                        self.current,
                        next
                    );
                }
                Err(err) => {
                    agent_warn!("task={} {}", self.task_id, err);
                }
            }
        }

        if let Some(line) = event.log_line() {
            self.log.push(line.to_string());
            self.dirty = true;
        }
    }

    pub(crate) fn record_decode_error(&mut self, reason: String) {
        agent_warn!("task={} dropped malformed frame: {}", self.task_id, reason);
        self.decode_errors += 1;
        self.last_error = Some(StreamError::Decode(reason));
        self.dirty = true;
    }

    /// Leaves the live state. Returns false if tracking had already ended.
    pub(crate) fn stop(&mut self, status: TrackingStatus) -> bool {
        if !self.is_live() {
            return false;
        }
        if let TrackingStatus::Failed(err) = &status {
            self.last_error = Some(err.clone());
        }
        self.tracking = status;
        self.dirty = true;
        true
    }
}
