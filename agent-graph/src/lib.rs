//! # agent-graph
//!
//! A dataflow runtime for composing LLM-augmented agent nodes into a
//! directed graph. One logical *run* threads through the graph; each node
//! declares a typed input/output schema, and downstream nodes bind their
//! input fields to an upstream node's output, schema, or render stream.
//! Everything that happens during a run — partial outputs, UI render
//! updates, completion, skips — is published on one shared [`EventStream`]
//! rather than returned from a single call, so a node can react to partial
//! upstream progress instead of waiting for an upstream node to fully
//! finish.
//!
//! ## Design principles
//!
//! - **Nodes are data, not control flow.** An [`AgentNode`] declares its
//!   input/output schema and an `execute` coroutine; it knows nothing about
//!   who it is wired to. Wiring lives entirely in [`GraphAgent`]'s field
//!   bindings (see [`provider`]).
//! - **One event bus, no per-edge channels.** [`stream::EventStream`] is the
//!   single source of truth for a running graph; [`graph::GraphAgent`]
//!   folds it into per-(run, node) accumulators rather than wiring a
//!   reactive-operator chain per edge.
//! - **Protocol violations are not control flow.** A duplicate scalar write
//!   or a run-id mismatch aborts the run via [`error::RunError`], distinct
//!   from the ordinary `RunCompleted`/`RunSkipped` pair every node emits
//!   exactly one of.
//!
//! ## Main modules
//!
//! - [`event`]: `AgentEvent`, `RunId`, the wire vocabulary of a run.
//! - [`stream`]: `EventStream`, the multicast bus events travel on.
//! - [`node`]: the `AgentNode` trait, `Context`, and node-author helpers
//!   (`NodeSpec`, `create_agent_node`).
//! - [`provider`]: binding sources (`Provider`, `Binding`) a node's input
//!   fields are wired to.
//! - [`reducer`]: the pure fold from bound-field events to an accumulated
//!   input map.
//! - [`graph`]: `GraphAgent`, the runtime that ties it all together.
//! - [`error`]: `RunError`, `ProtocolViolation`.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use agent_graph::event::OutputMap;
//! use agent_graph::graph::GraphAgentBuilder;
//! use agent_graph::node::{create_agent_node, FieldSpec, NodeSpec};
//! use agent_graph::provider::{Binding, Provider};
//! use serde_json::{json, Value};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let source = create_agent_node(
//!     NodeSpec::new("source", "1.0.0").output_field(FieldSpec::required("text")),
//!     |ctx, _input| async move {
//!         let mut out = OutputMap::new();
//!         out.insert("text".into(), json!("hello"));
//!         ctx.send_output(out);
//!         Ok(())
//!     },
//! );
//! let sink = create_agent_node(
//!     NodeSpec::new("sink", "1.0.0").input_field(FieldSpec::required("text")),
//!     |_ctx, input| async move {
//!         println!("{}", input["text"]);
//!         Ok(())
//!     },
//! );
//!
//! let agent = GraphAgentBuilder::new()
//!     .node("source", source, Value::Null)
//!     .node("sink", sink, Value::Null)
//!     .bind("sink", "text", Binding::Single(Provider::output("source", "text")))
//!     .build()
//!     .await;
//!
//! agent.invoke("source", OutputMap::new()).await.unwrap();
//! # }
//! ```

pub mod error;
pub mod event;
pub mod graph;
pub mod logging;
pub mod node;
pub mod provider;
pub mod reducer;
pub mod stream;

pub use error::{ProtocolViolation, RunError};
pub use event::{AgentEvent, NodeId, OutputMap, RunId};
pub use graph::{GraphAgent, GraphAgentBuilder};
pub use node::{create_agent_node, AgentNode, Context, FieldSpec, NodeMetadata, NodeSpec};
pub use provider::{merge_render_streams, Binding, Provider, ProviderKind};
pub use stream::{EventReceiver, EventStream};
