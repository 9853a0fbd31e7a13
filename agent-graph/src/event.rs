//! Core event types carried on the `EventStream` (§3 Data Model).
//!
//! `AgentEvent` is a closed set by design (§3: "AgentEvent.Type (closed
//! set)") — adding a variant for, say, "node failed" would let ordinary
//! control flow (skip) and fatal protocol errors (abort) collide on the same
//! channel; failures instead travel through `RunError`/`ProtocolViolation`
//! (see `error.rs`) and a per-run error slot on `GraphAgent`.

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

/// Graph-local node identifier, stable for the lifetime of a `GraphAgent`.
pub type NodeId = Arc<str>;

/// A partial (or complete) output map: a subset of a node's declared output
/// schema fields (§3 invariants: "Output fields published on the stream must
/// be a subset of the keys declared in the node's output schema").
pub type OutputMap = Map<String, Value>;

/// Unique id for one logical traversal of the graph (§3: Run entity).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RunId(Arc<str>);

impl RunId {
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh run id from a monotonic counter plus a caller-
    /// supplied salt, avoiding any dependency on wall-clock time or a random
    /// source (neither of which this crate pulls in for the core routing
    /// engine — see DESIGN.md).
    pub fn generate(counter: u64) -> Self {
        Self(format!("run-{counter:x}").into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RunId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for RunId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// One event on the `EventStream` (§3: AgentEvent.Type closed set).
#[derive(Debug, Clone)]
pub enum AgentEvent {
    /// Seeds a run; every `GraphNode` bound (directly or transitively) into
    /// this run uses this as the trigger to start collecting schema/render
    /// inputs for it.
    RunInvoked { run: RunId },

    /// Carries a partial `output` map published by a node.
    Output {
        run: RunId,
        node: NodeId,
        output: OutputMap,
    },

    /// Carries a `{step, data}` UI update for a node. `step` is an opaque
    /// render id assigned by the (out-of-scope) build-time render transform.
    Render {
        run: RunId,
        node: NodeId,
        step: String,
        data: Value,
    },

    /// The node has finished its generator for this run.
    RunCompleted { run: RunId, node: NodeId },

    /// The node will not run for this run: a required producer did not
    /// emit a required field, or the node is a schema-only tool that no
    /// consumer invoked.
    RunSkipped { run: RunId, node: NodeId },
}

impl AgentEvent {
    pub fn run(&self) -> &RunId {
        match self {
            AgentEvent::RunInvoked { run }
            | AgentEvent::Output { run, .. }
            | AgentEvent::Render { run, .. }
            | AgentEvent::RunCompleted { run, .. }
            | AgentEvent::RunSkipped { run, .. } => run,
        }
    }

    pub fn node(&self) -> Option<&NodeId> {
        match self {
            AgentEvent::RunInvoked { .. } => None,
            AgentEvent::Output { node, .. }
            | AgentEvent::Render { node, .. }
            | AgentEvent::RunCompleted { node, .. }
            | AgentEvent::RunSkipped { node, .. } => Some(node),
        }
    }

    /// Whether this event is a terminal event for a (run, node) pair (§3
    /// invariant: "For any (run, node) pair, exactly one of `RunCompleted`
    /// or `RunSkipped` is emitted.").
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AgentEvent::RunCompleted { .. } | AgentEvent::RunSkipped { .. }
        )
    }
}
