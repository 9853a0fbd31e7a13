//! `EventStream`: the hot multicast bus carrying `AgentEvent`s for one graph
//! instance (§4.1).
//!
//! Implemented on `tokio::sync::broadcast` rather than a reactive-operator
//! library: `Sender::send` already serializes concurrent publishers behind
//! one lock, which is exactly the "single-writer queue" §5 asks threaded
//! implementations to build, and late subscribers naturally see only future
//! events (no replay), matching §4.1's "late subscribers do not receive
//! historical events".

use tokio::sync::broadcast;

use crate::event::{AgentEvent, NodeId, OutputMap, RunId};
use crate::logging;

/// Default channel capacity. Exceeding this many in-flight events without a
/// subscriber consuming them causes that subscriber's next `recv()` to
/// return `RecvError::Lagged` (dropped, not unbounded growth) — the tradeoff
/// `broadcast` makes instead of OOM.
pub const DEFAULT_CAPACITY: usize = 1024;

/// A subscription handle: events delivered in the order `next()` published
/// them, no cross-subscriber ordering guarantee beyond that (§4.1).
pub struct EventReceiver {
    inner: broadcast::Receiver<AgentEvent>,
}

impl EventReceiver {
    /// Waits for the next event on the stream. Returns `None` if the stream
    /// has been fully dropped (no senders remain); logs and retries past a
    /// lag (missed events never panic a subscriber task).
    pub async fn recv(&mut self) -> Option<AgentEvent> {
        loop {
            match self.inner.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Closed) => return None,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    logging::log_receiver_lagged(skipped);
                    continue;
                }
            }
        }
    }
}

/// The hot multicast bus for one `GraphAgent` instance (§4.1).
#[derive(Clone)]
pub struct EventStream {
    tx: broadcast::Sender<AgentEvent>,
}

impl EventStream {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publishes `event` synchronously to all current subscribers (§4.1:
    /// "`next(e)` publishes `e` synchronously to all current subscribers").
    /// A send with zero subscribers is not an error: nothing is listening
    /// yet, which is normal before the first `bind()`/`subscribe()` call.
    pub fn next(&self, event: AgentEvent) {
        let _ = self.tx.send(event);
    }

    pub fn send_output(&self, run: RunId, node: NodeId, output: OutputMap) {
        self.next(AgentEvent::Output { run, node, output });
    }

    pub fn send_render_update(&self, run: RunId, node: NodeId, step: String, data: serde_json::Value) {
        self.next(AgentEvent::Render {
            run,
            node,
            step,
            data,
        });
    }

    pub fn send_run_invoked(&self, run: RunId) {
        self.next(AgentEvent::RunInvoked { run });
    }

    pub fn send_completed(&self, run: RunId, node: NodeId) {
        self.next(AgentEvent::RunCompleted { run, node });
    }

    pub fn send_skipped(&self, run: RunId, node: NodeId) {
        self.next(AgentEvent::RunSkipped { run, node });
    }

    /// Subscribes to the stream; the returned receiver sees only events
    /// published after this call.
    pub fn subscribe(&self) -> EventReceiver {
        EventReceiver {
            inner: self.tx.subscribe(),
        }
    }
}

impl Default for EventStream {
    fn default() -> Self {
        Self::new()
    }
}
