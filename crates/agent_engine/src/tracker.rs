use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use agent_core::{update, Effect, Msg, ProgressView, Stage, TrackerState, TransitionPolicy};
use agent_logging::{agent_debug, agent_info};
use tokio::sync::{mpsc, watch};

use crate::{EventSource, FrameHandler, StreamFrame, Subscription};

/// Live progress of one task.
///
/// Owns exactly one subscription. Every applied change publishes a
/// [`ProgressView`]: [`ProgressTracker::updates`] delivers each one in order,
/// while [`ProgressTracker::watch`] only keeps the latest.
/// A tracker is bound to a single task id for its whole life.
pub struct ProgressTracker {
    shared: Arc<TrackerShared>,
    subscription: Mutex<Subscription>,
}

struct TrackerShared {
    state: Mutex<TrackerState>,
    view_tx: watch::Sender<ProgressView>,
    feeds: Mutex<Vec<mpsc::UnboundedSender<ProgressView>>>,
}

struct TrackerHandler {
    shared: Arc<TrackerShared>,
}

impl ProgressTracker {
    pub fn attach(
        source: &dyn EventSource,
        task_id: impl Into<String>,
        policy: TransitionPolicy,
    ) -> Self {
        let state = TrackerState::new(task_id, policy);
        let task_id = state.task_id().to_string();
        let (view_tx, _) = watch::channel(state.view());
        let shared = Arc::new(TrackerShared {
            state: Mutex::new(state),
            view_tx,
            feeds: Mutex::new(Vec::new()),
        });

        agent_info!("attaching tracker task={} policy={:?}", task_id, policy);
        let handler = Arc::new(TrackerHandler {
            shared: shared.clone(),
        });
        let subscription = source.subscribe(&task_id, handler);

        Self {
            shared,
            subscription: Mutex::new(subscription),
        }
    }

    pub fn task_id(&self) -> String {
        self.shared.view_tx.borrow().task_id.clone()
    }

    pub fn view(&self) -> ProgressView {
        self.shared.view_tx.borrow().clone()
    }

    pub fn stage(&self) -> Stage {
        self.shared.view_tx.borrow().stage
    }

    pub fn percent_complete(&self) -> u8 {
        self.shared.view_tx.borrow().percent
    }

    pub fn log(&self) -> Vec<String> {
        self.shared.view_tx.borrow().log.clone()
    }

    /// Latest snapshot. Changes that land between two reads are coalesced,
    /// so intermediate stages may be skipped; use [`Self::updates`] to see each one.
    pub fn watch(&self) -> watch::Receiver<ProgressView> {
        self.shared.view_tx.subscribe()
    }

    /// Ordered feed of every view published after this call.
    ///
    /// The feed ends once tracking stops, after delivering the final view.
    /// On a tracker that has already stopped it is closed immediately.
    pub fn updates(&self) -> mpsc::UnboundedReceiver<ProgressView> {
        let (tx, rx) = mpsc::unbounded_channel();
        let state = lock(&self.shared.state);
        if state.is_live() {
            lock(&self.shared.feeds).push(tx);
        }
        rx
    }

    pub fn is_live(&self) -> bool {
        self.shared.view_tx.borrow().is_live()
    }

    /// Stops tracking and releases the connection. Safe to call repeatedly.
    pub fn dispose(&self) {
        let effects = self.shared.dispatch(Msg::Disposed);
        self.apply_effects(effects);
        // Also covers trackers whose stream already ended on its own.
        lock(&self.subscription).close();
    }

    fn apply_effects(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::CloseStream { reason } => {
                    let closed = lock(&self.subscription).close();
                    agent_debug!("close stream reason={:?} closed={}", reason, closed);
                }
            }
        }
    }
}

impl Drop for ProgressTracker {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl TrackerShared {
    /// Applies one message under the lock, publishing the view if it changed.
    fn dispatch(&self, msg: Msg) -> Vec<Effect> {
        let mut guard = lock(&self.state);
        let state = std::mem::take(&mut *guard);
        let (mut state, effects) = update(state, msg);
        if state.consume_dirty() {
            let view = state.view();
            let mut feeds = lock(&self.feeds);
            feeds.retain(|feed| feed.send(view.clone()).is_ok());
            if !state.is_live() {
                feeds.clear();
            }
            self.view_tx.send_replace(view);
        }
        *guard = state;
        effects
    }
}

impl FrameHandler for TrackerHandler {
    fn on_frame(&self, frame: StreamFrame) {
        let msg = match frame {
            StreamFrame::Data(data) => Msg::FrameReceived(data),
            StreamFrame::Malformed(reason) => Msg::FrameMalformed(reason),
            StreamFrame::Closed => Msg::StreamEnded,
            StreamFrame::Failed(reason) => Msg::TransportFailed(reason),
        };
        // The transport has already finished on close/failure, so the effect needs no action here.
        for effect in self.shared.dispatch(msg) {
            agent_debug!("stream ended: {:?}", effect);
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
