use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// What a transport delivers to a subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamFrame {
    /// Data of one message.
    Data(String),
    /// Bytes that could not be decoded. The stream stays open.
    Malformed(String),
    /// The server ended the stream.
    Closed,
    /// The connection failed or could not be opened.
    Failed(String),
}

pub trait FrameHandler: Send + Sync {
    fn on_frame(&self, frame: StreamFrame);
}

impl<F> FrameHandler for F
where
    F: Fn(StreamFrame) + Send + Sync,
{
    fn on_frame(&self, frame: StreamFrame) {
        self(frame)
    }
}

/// Push-based channel of progress frames for one task.
///
/// Implementations deliver frames for a subscription in order, one at a time,
/// and stop delivering once the returned [`Subscription`] is closed.
pub trait EventSource: Send + Sync {
    fn subscribe(&self, task_id: &str, handler: Arc<dyn FrameHandler>) -> Subscription;
}

/// Disposer for one subscription. Closing is idempotent; dropping closes.
#[derive(Debug)]
pub struct Subscription {
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl Subscription {
    pub fn new(cancel: CancellationToken, task: Option<JoinHandle<()>>) -> Self {
        Self { cancel, task }
    }

    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Returns true only for the call that actually closed the subscription.
    pub fn close(&mut self) -> bool {
        if self.cancel.is_cancelled() {
            return false;
        }
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            task.abort();
        }
        true
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.close();
    }
}
