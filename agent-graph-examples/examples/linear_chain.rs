//! Scenario A: a source feeding a sink through one required field binding.
//! Run with `cargo run -p agent-graph-examples --example linear_chain`.

use agent_graph::event::OutputMap;
use agent_graph::graph::GraphAgentBuilder;
use agent_graph::provider::{Binding, Provider};
use agent_graph_examples::nodes::{console_sink_node, greeter_node};
use serde_json::Value;

#[tokio::main]
async fn main() {
    let agent = GraphAgentBuilder::new()
        .node("greeter", greeter_node(), Value::Null)
        .node("sink", console_sink_node("sink"), Value::Null)
        .bind("sink", "reply", Binding::Single(Provider::output("greeter", "text")))
        .build()
        .await;

    agent.invoke("greeter", OutputMap::new()).await.expect("run succeeds");
}
