//! `Context`: the per-invocation handle passed to node code (§4.3).

use std::sync::Arc;

use serde_json::Value;

use crate::event::{NodeId, OutputMap, RunId};
use crate::stream::EventStream;

/// Identifies the current run for a node invocation (§4.3: `run: {id}`).
#[derive(Debug, Clone, Copy)]
pub struct RunRef<'a> {
    pub id: &'a RunId,
}

/// Identifies the current node for an invocation (§4.3: `node: {id}`).
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    pub id: &'a NodeId,
}

/// Returned by `Context::render`; lets node code push further updates to the
/// same render step (§4.3: `render(stepId, data)` "returns `{update(newData)}`
/// for subsequent updates to the same step").
#[derive(Clone)]
pub struct RenderUpdater {
    stream: Arc<EventStream>,
    run: RunId,
    node: NodeId,
    step: String,
}

impl RenderUpdater {
    pub fn update(&self, data: Value) {
        self.stream
            .send_render_update(self.run.clone(), self.node.clone(), self.step.clone(), data);
    }

    pub fn step(&self) -> &str {
        &self.step
    }
}

/// The per-invocation handle passed to node code (§4.3).
///
/// Carries the run/node identity, the node's `config` (opaque JSON, set via
/// `GraphAgent::add_node`), and imperative `send_output`/`render` entry
/// points. `resolve`/`setGlobalState` (the wider system's DI surface for the
/// LLM executor) are intentionally not modeled here — the executor itself is
/// an out-of-scope external collaborator (§1).
#[derive(Clone)]
pub struct Context {
    stream: Arc<EventStream>,
    run: RunId,
    node: NodeId,
    config: Value,
}

impl Context {
    pub(crate) fn new(stream: Arc<EventStream>, run: RunId, node: NodeId, config: Value) -> Self {
        Self {
            stream,
            run,
            node,
            config,
        }
    }

    pub fn run(&self) -> RunRef<'_> {
        RunRef { id: &self.run }
    }

    pub fn node(&self) -> NodeRef<'_> {
        NodeRef { id: &self.node }
    }

    pub fn config(&self) -> &Value {
        &self.config
    }

    /// Publishes `output` as a partial `Output` event for this node and run.
    /// Equivalent to yielding that output from `execute` (§4.3).
    pub fn send_output(&self, output: OutputMap) {
        self.stream
            .send_output(self.run.clone(), self.node.clone(), output);
    }

    /// Publishes a `Render` event for `step` and returns an updater that can
    /// push further data to the same step (§4.3, §4.7: `step` is an opaque
    /// id assigned by the build-time render transform; this crate never
    /// interprets it).
    pub fn render(&self, step: impl Into<String>, data: Value) -> RenderUpdater {
        let step = step.into();
        self.stream.send_render_update(
            self.run.clone(),
            self.node.clone(),
            step.clone(),
            data,
        );
        RenderUpdater {
            stream: Arc::clone(&self.stream),
            run: self.run.clone(),
            node: self.node.clone(),
            step,
        }
    }
}
