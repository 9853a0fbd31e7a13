//! Scenario B: two independent chat turns feeding one array-bound field,
//! collected in publication order.
//! Run with `cargo run -p agent-graph-examples --example fan_in`.

use agent_graph::event::OutputMap;
use agent_graph::graph::GraphAgentBuilder;
use agent_graph::node::{create_agent_node, FieldSpec, NodeSpec};
use agent_graph::provider::{Binding, Provider};
use serde_json::{json, Value};

#[tokio::main]
async fn main() {
    let first = create_agent_node(
        NodeSpec::new("first", "1.0.0").output_field(FieldSpec::required("text")),
        |ctx, _input| async move {
            let mut out = OutputMap::new();
            out.insert("text".into(), json!("first reply"));
            ctx.send_output(out);
            Ok(())
        },
    );
    let second = create_agent_node(
        NodeSpec::new("second", "1.0.0").output_field(FieldSpec::required("text")),
        |ctx, _input| async move {
            let mut out = OutputMap::new();
            out.insert("text".into(), json!("second reply"));
            ctx.send_output(out);
            Ok(())
        },
    );
    let digest = create_agent_node(
        NodeSpec::new("digest", "1.0.0").input_field(FieldSpec::required("replies")),
        |_ctx, input| async move {
            println!("collected: {}", input["replies"]);
            Ok(())
        },
    );

    let agent = GraphAgentBuilder::new()
        .node("first", first, Value::Null)
        .node("second", second, Value::Null)
        .node("digest", digest, Value::Null)
        .bind(
            "digest",
            "replies",
            Binding::Array(vec![Provider::output("first", "text"), Provider::output("second", "text")]),
        )
        .build()
        .await;

    // Neither `first` nor `second` has a required field bound upstream, so
    // both fire as soon as the run starts, regardless of the named entry.
    agent.invoke("first", OutputMap::new()).await.expect("run succeeds");
}
