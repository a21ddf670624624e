//! Agent engine: invocation client, progress stream transport and tracker.
mod invoke;
mod settings;
mod source;
mod sse;
mod tracker;
mod types;

pub use invoke::{AgentClient, Invoker};
pub use settings::{AgentSettings, API_URL_ENV};
pub use source::{EventSource, FrameHandler, StreamFrame, Subscription};
pub use sse::SseEventSource;
pub use tracker::ProgressTracker;
pub use types::{InvocationError, SettingsError};

pub use agent_core::{
    ParsedQuery, ProgressView, Stage, StreamError, TaskInvocation, TrackingStatus,
    TransitionPolicy,
};
