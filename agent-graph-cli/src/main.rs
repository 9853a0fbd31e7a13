//! Runs one of the bundled demo graphs and prints every event published on
//! its `EventStream` as the run progresses.

use std::sync::Arc;

use agent_graph::event::{AgentEvent, OutputMap};
use agent_graph::graph::{GraphAgent, GraphAgentBuilder};
use agent_graph::provider::{Binding, Provider};
use agent_graph_examples::nodes::{chat_node, console_sink_node, greeter_node, weather_tool_node};
use clap::{Parser, ValueEnum};
use serde_json::{json, Value};

#[derive(Parser, Debug)]
#[command(name = "agent-graph")]
#[command(about = "Run a demo agent-graph and watch its event stream")]
struct Args {
    /// Which bundled graph to run
    #[arg(short, long, value_enum, default_value = "linear-chain")]
    graph: Graph,

    /// User message, only used by graphs with a `chat` node
    #[arg(short, long, default_value = "what's the weather like?")]
    message: String,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Graph {
    /// Scenario A: one source feeding one sink through a required binding.
    LinearChain,
    /// Scenario B: two independent producers feeding one array-bound field.
    FanIn,
    /// A chat node bound to a tool's schema, with the tool's output wired
    /// to the same reporter independently (§4.6).
    ToolSchema,
}

async fn build_linear_chain() -> GraphAgent {
    GraphAgentBuilder::new()
        .node("greeter", greeter_node(), Value::Null)
        .node("sink", console_sink_node("sink"), Value::Null)
        .bind("sink", "reply", Binding::Single(Provider::output("greeter", "text")))
        .build()
        .await
}

async fn build_fan_in() -> GraphAgent {
    use agent_graph::node::{create_agent_node, FieldSpec, NodeSpec};

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
            println!("[digest] collected: {}", input["replies"]);
            Ok(())
        },
    );

    GraphAgentBuilder::new()
        .node("first", first, Value::Null)
        .node("second", second, Value::Null)
        .node("digest", digest, Value::Null)
        .bind(
            "digest",
            "replies",
            Binding::Array(vec![Provider::output("first", "text"), Provider::output("second", "text")]),
        )
        .build()
        .await
}

async fn build_tool_schema() -> GraphAgent {
    use agent_graph::node::{create_agent_node, FieldSpec, NodeSpec};

    let reporter = create_agent_node(
        NodeSpec::new("reporter", "1.0.0")
            .input_field(FieldSpec::required("reply"))
            .input_field(FieldSpec::optional("tool_result")),
        |_ctx, input| async move {
            println!("[reporter] chat replied: {}", input["reply"]);
            if let Some(result) = input.get("tool_result") {
                println!("[reporter] tool result: {result}");
            }
            Ok(())
        },
    );

    GraphAgentBuilder::new()
        .node("weather", weather_tool_node(), Value::Null)
        .node("chat", chat_node(), Value::Null)
        .node("reporter", reporter, Value::Null)
        .bind("chat", "tools", Binding::Single(Provider::schema("weather")))
        .bind("weather", "call", Binding::Single(Provider::output("chat", "tool_call")))
        .bind("weather", "location", Binding::Value(Arc::new(json!("Boston"))))
        .bind("reporter", "reply", Binding::Single(Provider::output("chat", "reply")))
        .bind("reporter", "tool_result", Binding::Single(Provider::output("weather", "result")))
        .build()
        .await
}

fn print_event(event: &AgentEvent) {
    match event {
        AgentEvent::RunInvoked { run } => println!("[{run}] run invoked"),
        AgentEvent::Output { run, node, output } => println!("[{run}] {node} output {output:?}"),
        AgentEvent::Render { run, node, step, data } => println!("[{run}] {node} render[{step}] {data}"),
        AgentEvent::RunCompleted { run, node } => println!("[{run}] {node} completed"),
        AgentEvent::RunSkipped { run, node } => println!("[{run}] {node} skipped"),
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let agent = match args.graph {
        Graph::LinearChain => build_linear_chain().await,
        Graph::FanIn => build_fan_in().await,
        Graph::ToolSchema => build_tool_schema().await,
    };

    let mut events = agent.subscribe();
    let watcher = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            print_event(&event);
        }
    });

    let entry = match args.graph {
        Graph::LinearChain => "greeter",
        Graph::FanIn => "first",
        Graph::ToolSchema => "chat",
    };
    let mut input = OutputMap::new();
    if matches!(args.graph, Graph::ToolSchema) {
        input.insert("message".into(), json!(args.message));
    }

    match agent.invoke(entry, input).await {
        Ok(run) => println!("run {run} finished"),
        Err(e) => {
            eprintln!("run failed: {e}");
            std::process::exit(1);
        }
    }

    drop(agent);
    let _ = watcher.await;
}
