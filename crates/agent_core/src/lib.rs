//! Agent core: pure progress state machine and wire data model.
mod effect;
mod error;
mod event;
mod invocation;
mod msg;
mod stage;
mod state;
mod update;
mod view_model;

pub use effect::{Effect, StopReason};
pub use error::StreamError;
pub use event::{decode_frame, looks_structured, FrameDecode, ProgressEvent};
pub use invocation::{HealthStatus, InvokeInput, InvokeRequest, ParsedQuery, TaskInvocation};
pub use msg::Msg;
pub use stage::{Stage, TransitionPolicy, UnknownStage};
pub use state::{TrackerState, TrackingStatus};
pub use update::update;
pub use view_model::ProgressView;
