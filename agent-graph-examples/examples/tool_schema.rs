//! A chat node bound to a tool's schema (not its output), and the tool's
//! own output wired to a reporter independently — the schema/output split
//! from §4.6. `weather`'s `call` input is bound to `chat`'s conditional
//! `tool_call` output, so `weather` only actually runs on the branch where
//! `chat`'s message mentions "weather"; otherwise `chat` completes without
//! ever producing `tool_call` and `weather` is skipped instead of running
//! unconditionally (§4.4 schema-bound upstream skip propagation, §8
//! Scenario C). `location` stays a literal binding, since nested-field
//! bindings (reaching into `chat`'s `tool_call.args.location`) are out of
//! scope (§1).
//! Run with `cargo run -p agent-graph-examples --example tool_schema`.

use std::sync::Arc;

use agent_graph::event::OutputMap;
use agent_graph::graph::GraphAgentBuilder;
use agent_graph::node::{create_agent_node, FieldSpec, NodeSpec};
use agent_graph::provider::{Binding, Provider};
use agent_graph_examples::nodes::{chat_node, weather_tool_node};
use serde_json::{json, Value};

#[tokio::main]
async fn main() {
    let reporter = create_agent_node(
        NodeSpec::new("reporter", "1.0.0")
            .input_field(FieldSpec::required("reply"))
            .input_field(FieldSpec::optional("tool_result")),
        |_ctx, input| async move {
            println!("chat replied: {}", input["reply"]);
            if let Some(result) = input.get("tool_result") {
                println!("tool result: {result}");
            }
            Ok(())
        },
    );

    let agent = GraphAgentBuilder::new()
        .node("weather", weather_tool_node(), Value::Null)
        .node("chat", chat_node(), Value::Null)
        .node("reporter", reporter, Value::Null)
        .bind("chat", "tools", Binding::Single(Provider::schema("weather")))
        .bind("weather", "call", Binding::Single(Provider::output("chat", "tool_call")))
        .bind("weather", "location", Binding::Value(Arc::new(json!("Boston"))))
        .bind("reporter", "reply", Binding::Single(Provider::output("chat", "reply")))
        .bind("reporter", "tool_result", Binding::Single(Provider::output("weather", "result")))
        .build()
        .await;

    let mut input = OutputMap::new();
    input.insert("message".into(), json!("what's the weather like?"));
    agent.invoke("chat", input).await.expect("run succeeds");
}
