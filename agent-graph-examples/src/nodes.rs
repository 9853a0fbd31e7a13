//! A handful of toy nodes: a greeter (source), a mock chat node that
//! optionally calls a tool, a weather tool, and a console sink that mirrors
//! the spec's canonical `User` node.

use agent_graph::event::OutputMap;
use agent_graph::node::{create_agent_node, AgentNode, FieldSpec, NodeSpec};
use serde_json::{json, Value};

/// Emits a single constant greeting. Has no input fields, so it fires as
/// soon as the run starts regardless of which node `invoke` was called
/// against.
pub fn greeter_node() -> impl AgentNode {
    create_agent_node(
        NodeSpec::new("greeter", "1.0.0")
            .name("Greeter")
            .output_field(FieldSpec::required("text")),
        |ctx, _input| async move {
            let mut out = OutputMap::new();
            out.insert("text".into(), json!("hello from the greeter"));
            ctx.send_output(out);
            Ok(())
        },
    )
}

/// Declares a `location` input and a `result` output — a minimal stand-in
/// for a tool an LLM-augmented chat node can call. Its schema, not its
/// output, is what another node usually binds to (see `examples/tool_schema.rs`).
///
/// The `call` field is required and bound to the caller's conditional
/// `tool_call` output rather than a literal, so this node only actually
/// fires when that caller decides to invoke it (§4.4 schema-bound upstream
/// skip propagation, §8 Scenario C) — if the caller completes without ever
/// producing `tool_call`, `call` never resolves and this node is skipped
/// instead of running unconditionally.
pub fn weather_tool_node() -> impl AgentNode {
    create_agent_node(
        NodeSpec::new("weather", "1.0.0")
            .name("WeatherTool")
            .description("Looks up current conditions for a location")
            .input_field(FieldSpec::required("call"))
            .input_field(FieldSpec::required("location"))
            .output_field(FieldSpec::required("result")),
        |ctx, input| async move {
            let location = input.get("location").and_then(Value::as_str).unwrap_or("unknown");
            let mut out = OutputMap::new();
            out.insert("result".into(), json!(format!("sunny in {location}")));
            ctx.send_output(out);
            Ok(())
        },
    )
}

/// A mock "chat" node: takes a user `message` (required) and the schema of
/// whatever tool is bound to its optional `tools` field, and decides
/// whether to call that tool. Reproduces the schema-channel pattern from
/// the data model without an actual model call: any message containing
/// "weather" triggers a synthetic `tool_call`.
pub fn chat_node() -> impl AgentNode {
    create_agent_node(
        NodeSpec::new("chat", "1.0.0")
            .name("Chat")
            .input_field(FieldSpec::required("message"))
            .input_field(FieldSpec::optional("tools"))
            .output_field(FieldSpec::required("reply"))
            .output_field(FieldSpec::optional("tool_call")),
        |ctx, input| async move {
            let message = input.get("message").and_then(Value::as_str).unwrap_or("");
            let mut out = OutputMap::new();
            if message.to_lowercase().contains("weather") {
                if let Some(tools) = input.get("tools") {
                    let tool_id = tools.get("id").and_then(Value::as_str).unwrap_or("unknown");
                    out.insert(
                        "tool_call".into(),
                        json!({ "tool": tool_id, "args": { "location": "Boston" } }),
                    );
                }
            }
            out.insert("reply".into(), json!(format!("you said: {message}")));
            ctx.send_output(out);
            Ok(())
        },
    )
}

/// Mirrors the spec's canonical UI sink: republishes whatever subset of its
/// input has arrived so far via `render`, each time `on_input_event` fires,
/// then finishes once its (optional) required fields settle.
pub fn console_sink_node(id: impl Into<String>) -> impl AgentNode {
    let id = id.into();
    create_agent_node(
        NodeSpec::new(id, "1.0.0")
            .name("ConsoleSink")
            .input_field(FieldSpec::required("reply"))
            .input_field(FieldSpec::optional("tool_result")),
        |ctx, input| async move {
            println!("[sink] reply={:?} tool_result={:?}", input.get("reply"), input.get("tool_result"));
            Ok(())
        },
    )
}

/// Variant of [`console_sink_node`] whose `on_input_event` pushes a render
/// update for every partial delivery, demonstrating the render channel
/// independent of whether the node has fired yet.
pub struct StreamingSink {
    metadata: agent_graph::node::NodeMetadata,
}

impl StreamingSink {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            metadata: agent_graph::node::NodeMetadata {
                id: id.into(),
                version: "1.0.0".into(),
                name: "StreamingSink".into(),
                description: None,
                input: vec![FieldSpec::required("reply")],
                output: vec![],
            },
        }
    }
}

#[async_trait::async_trait]
impl AgentNode for StreamingSink {
    fn metadata(&self) -> &agent_graph::node::NodeMetadata {
        &self.metadata
    }

    async fn on_input_event(&self, ctx: &agent_graph::node::Context, partial_input: &OutputMap) {
        ctx.render("partial", json!(partial_input));
    }

    async fn execute(
        &self,
        ctx: agent_graph::node::Context,
        input: OutputMap,
    ) -> Result<(), agent_graph::error::RunError> {
        ctx.render("final", json!(input));
        Ok(())
    }
}
