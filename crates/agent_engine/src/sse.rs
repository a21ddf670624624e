use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use agent_logging::{agent_debug, agent_info, agent_trace, agent_warn};
use eventsource_stream::{EventStreamError, Eventsource};
use futures_util::StreamExt;
use reqwest::header::{ACCEPT, CACHE_CONTROL};
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::invoke::build_client;
use crate::{AgentSettings, EventSource, FrameHandler, SettingsError, StreamFrame, Subscription};

/// Server-sent events transport for `GET /agent/sse?task_id=...`.
#[derive(Debug, Clone)]
pub struct SseEventSource {
    settings: AgentSettings,
    client: reqwest::Client,
    runtime: Handle,
}

impl SseEventSource {
    /// Must be called from within a tokio runtime; readers are spawned onto it.
    pub fn new(settings: AgentSettings) -> Result<Self, SettingsError> {
        let runtime = Handle::try_current().map_err(|err| SettingsError::Runtime(err.to_string()))?;
        Self::with_runtime(settings, runtime)
    }

    pub fn with_runtime(settings: AgentSettings, runtime: Handle) -> Result<Self, SettingsError> {
        let client = build_client(&settings)?;
        Ok(Self {
            settings,
            client,
            runtime,
        })
    }
}

impl EventSource for SseEventSource {
    fn subscribe(&self, task_id: &str, handler: Arc<dyn FrameHandler>) -> Subscription {
        let cancel = CancellationToken::new();
        let url = self.settings.stream_url(task_id);
        let client = self.client.clone();
        let token = cancel.clone();

        let task = self.runtime.spawn(async move {
            match url {
                Ok(url) => read_stream(client, url, handler.as_ref(), token).await,
                Err(err) => handler.on_frame(StreamFrame::Failed(err.to_string())),
            }
        });

        Subscription::new(cancel, Some(task))
    }
}

async fn read_stream(
    client: reqwest::Client,
    url: Url,
    handler: &dyn FrameHandler,
    cancel: CancellationToken,
) {
    agent_info!("opening progress stream {}", url);
    let request = client
        .get(url.clone())
        .header(ACCEPT, "text/event-stream")
        .header(CACHE_CONTROL, "no-store")
        .send();

    let response = tokio::select! {
        _ = cancel.cancelled() => return,
        response = request => response,
    };
    let response = match response {
        Ok(response) if response.status().is_success() => response,
        Ok(response) => {
            let status = response.status();
            agent_warn!("progress stream {} refused: {}", url, status);
            if !cancel.is_cancelled() {
                handler.on_frame(StreamFrame::Failed(format!("http status {status}")));
            }
            return;
        }
        Err(err) => {
            agent_warn!("progress stream {} unreachable: {}", url, err);
            if !cancel.is_cancelled() {
                handler.on_frame(StreamFrame::Failed(err.to_string()));
            }
            return;
        }
    };

    let replaced = Arc::new(AtomicUsize::new(0));
    let events = {
        let replaced = replaced.clone();
        let mut decoder = LossyUtf8::default();
        response
            .bytes_stream()
            .map(move |chunk| {
                chunk.map(|bytes| {
                    let (text, invalid) = decoder.decode(&bytes);
                    replaced.fetch_add(invalid, Ordering::Relaxed);
                    text
                })
            })
            .eventsource()
    };
    let mut events = std::pin::pin!(events);
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                agent_debug!("progress stream {} cancelled", url);
                break;
            }
            next = events.next() => {
                report_replaced(&replaced, handler);
                match next {
                    Some(Ok(event)) => {
                        agent_trace!("frame event={:?} data_len={}", event.event, event.data.len());
                        handler.on_frame(StreamFrame::Data(event.data));
                    }
                    Some(Err(EventStreamError::Transport(err))) => {
                        agent_warn!("progress stream {} failed: {}", url, err);
                        handler.on_frame(StreamFrame::Failed(err.to_string()));
                        break;
                    }
                    Some(Err(err)) => {
                        agent_warn!("progress stream {} skipped undecodable frame: {}", url, err);
                        handler.on_frame(StreamFrame::Malformed(err.to_string()));
                    }
                    None => {
                        agent_info!("progress stream {} closed by server", url);
                        handler.on_frame(StreamFrame::Closed);
                        break;
                    }
                }
            }
        }
    }
}

/// Reports bytes the decoder replaced since the last frame, before that frame is delivered.
fn report_replaced(replaced: &AtomicUsize, handler: &dyn FrameHandler) {
    let count = replaced.swap(0, Ordering::Relaxed);
    if count > 0 {
        handler.on_frame(StreamFrame::Malformed(format!(
            "{count} invalid utf-8 bytes replaced"
        )));
    }
}

/// Incremental UTF-8 decoder that replaces invalid bytes with U+FFFD.
///
/// A sequence split across chunks is held back until its remaining bytes arrive.
#[derive(Debug, Default)]
struct LossyUtf8 {
    pending: Vec<u8>,
}

impl LossyUtf8 {
    /// Returns the decoded text and how many bytes were replaced.
    fn decode(&mut self, chunk: &[u8]) -> (String, usize) {
        self.pending.extend_from_slice(chunk);
        let mut text = String::with_capacity(self.pending.len());
        let mut invalid = 0;
        let mut rest: &[u8] = &self.pending;
        while !rest.is_empty() {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    text.push_str(valid);
                    rest = &[];
                }
                Err(err) => {
                    let (valid, after) = rest.split_at(err.valid_up_to());
                    text.push_str(&String::from_utf8_lossy(valid));
                    match err.error_len() {
                        Some(len) => {
                            text.push(char::REPLACEMENT_CHARACTER);
                            invalid += len;
                            rest = &after[len..];
                        }
                        // Incomplete sequence at the end of the chunk.
                        None => {
                            rest = after;
                            break;
                        }
                    }
                }
            }
        }
        let held = rest.len();
        let consumed = self.pending.len() - held;
        self.pending.drain(..consumed);
        (text, invalid)
    }
}
