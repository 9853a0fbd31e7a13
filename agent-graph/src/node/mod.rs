//! The `AgentNode` contract (§4.2) and node-author ergonomics (§4.8).

mod context;

pub use context::{Context, NodeRef, RenderUpdater, RunRef};

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::RunError;
use crate::event::OutputMap;

/// Synthetic run id `init(context)` is called with, once, at `GraphNode`
/// construction (§4.2: "called once at GraphNode construction with a
/// synthetic run id `\"__NODE_INIT__\"`; must not depend on actual run
/// inputs; may prime lazy resources").
pub const NODE_INIT_RUN_ID: &str = "__NODE_INIT__";

/// One field of a node's declared input or output schema.
///
/// `required` backs the completeness rule in §4.4: a node's `execute` fires
/// once every *required* bound field has settled (arrived, or its producer
/// reported terminal without it); optional fields never block firing (see
/// SPEC_FULL.md §3 supplement, grounding Scenario E).
#[derive(Debug, Clone, Serialize)]
pub struct FieldSpec {
    pub name: String,
    pub required: bool,
    /// UI-facing name, mirroring the `z`-style `.label(...)` annotations
    /// mentioned in §6 — kept as a plain string since schema-validation
    /// library choice is explicitly out of scope (§1).
    pub label: Option<String>,
}

impl FieldSpec {
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: true,
            label: None,
        }
    }

    pub fn optional(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: false,
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// A node's stable descriptor (§4.2: `metadata {id, version, name, input,
/// output, description?}`).
#[derive(Debug, Clone, Serialize)]
pub struct NodeMetadata {
    pub id: String,
    pub version: String,
    pub name: String,
    pub description: Option<String>,
    pub input: Vec<FieldSpec>,
    pub output: Vec<FieldSpec>,
}

impl NodeMetadata {
    pub fn input_field(&self, name: &str) -> Option<&FieldSpec> {
        self.input.iter().find(|f| f.name == name)
    }

    pub fn output_field(&self, name: &str) -> Option<&FieldSpec> {
        self.output.iter().find(|f| f.name == name)
    }
}

/// The polymorphic unit an `AgentGraph` is built from (§4.2).
///
/// `execute` is imperative rather than generator-based: a node pushes each
/// partial output via `ctx.send_output(...)` and returns `Ok(())` once done,
/// which `Context::send_output` documents as "equivalent to yielding that
/// output from `execute`" — the two are the same operation in this crate,
/// there being no native generator type to distinguish them in Rust.
#[async_trait]
pub trait AgentNode: Send + Sync {
    fn metadata(&self) -> &NodeMetadata;

    /// Called once at `GraphNode` construction with run id
    /// [`NODE_INIT_RUN_ID`]; default is a no-op.
    async fn init(&self, _ctx: &Context) {}

    /// Called once per accumulated-input delivery for a run, before
    /// `execute`. Default is a no-op, except for sink nodes such as `User`
    /// (see `agent-graph-examples`) which republish their partial input as
    /// output so downstream consumers see whatever subset arrived.
    async fn on_input_event(&self, _ctx: &Context, _partial_input: &OutputMap) {}

    /// Runs the node to completion for one `(run, input)` pair, pushing
    /// partial outputs via `ctx.send_output`. Returning `Ok(())` signals
    /// `RunCompleted`; returning `Err` surfaces via the node's `invoke()`
    /// future unless the node declares an `error` output field (§7).
    async fn execute(&self, ctx: Context, input: OutputMap) -> Result<(), RunError>;
}

/// Boxed async function signature used by [`create_agent_node`].
type RunFn = Arc<
    dyn Fn(Context, OutputMap) -> Pin<Box<dyn Future<Output = Result<(), RunError>> + Send>>
        + Send
        + Sync,
>;

/// A plain-data builder for node metadata, analogous to the teacher's
/// `createAgentNode({id, name, version, input, output, run})` factory
/// (§4.2, §6).
#[derive(Debug, Clone, Default)]
pub struct NodeSpec {
    id: String,
    version: String,
    name: String,
    description: Option<String>,
    input: Vec<FieldSpec>,
    output: Vec<FieldSpec>,
}

impl NodeSpec {
    pub fn new(id: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            version: version.into(),
            ..Default::default()
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn input_field(mut self, field: FieldSpec) -> Self {
        self.input.push(field);
        self
    }

    pub fn output_field(mut self, field: FieldSpec) -> Self {
        self.output.push(field);
        self
    }

    fn into_metadata(self) -> NodeMetadata {
        NodeMetadata {
            id: self.id,
            version: self.version,
            name: self.name,
            description: self.description,
            input: self.input,
            output: self.output,
        }
    }
}

struct FnNode {
    metadata: NodeMetadata,
    run: RunFn,
}

#[async_trait]
impl AgentNode for FnNode {
    fn metadata(&self) -> &NodeMetadata {
        &self.metadata
    }

    async fn execute(&self, ctx: Context, input: OutputMap) -> Result<(), RunError> {
        (self.run)(ctx, input).await
    }
}

/// Builds an `AgentNode` from a [`NodeSpec`] and a run closure, mirroring
/// the teacher's `createAgentNode` convenience factory (§4.2).
pub fn create_agent_node<F, Fut>(spec: NodeSpec, run: F) -> impl AgentNode
where
    F: Fn(Context, OutputMap) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), RunError>> + Send + 'static,
{
    FnNode {
        metadata: spec.into_metadata(),
        run: Arc::new(move |ctx, input| Box::pin(run(ctx, input))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::EventStream;
    use crate::event::RunId;
    use serde_json::json;

    #[tokio::test]
    async fn create_agent_node_runs_closure_and_reports_metadata() {
        let spec = NodeSpec::new("echo", "1.0.0")
            .name("Echo")
            .input_field(FieldSpec::required("text"))
            .output_field(FieldSpec::required("text"));

        let node = create_agent_node(spec, |ctx, input| async move {
            ctx.send_output(input);
            Ok(())
        });

        assert_eq!(node.metadata().id, "echo");
        assert_eq!(node.metadata().input_field("text").unwrap().required, true);

        let stream = Arc::new(EventStream::new());
        let mut rx = stream.subscribe();
        let ctx = Context::new(Arc::clone(&stream), RunId::new("r1"), "echo".into(), json!(null));
        let mut input = OutputMap::new();
        input.insert("text".into(), json!("hi"));
        node.execute(ctx, input).await.unwrap();

        let event = rx.recv().await.unwrap();
        assert!(matches!(event, crate::event::AgentEvent::Output { .. }));
    }
}
