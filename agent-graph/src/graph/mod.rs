//! `GraphAgent`: wires `AgentNode`s into one DAG via field-level bindings
//! over a shared `EventStream`, and drives one logical run to completion
//! (§4.1, §4.4–§4.6).
//!
//! There is no reactive-operator chain here (no `filter`/`groupBy`/`zip`):
//! each node's per-run state is an explicit accumulator plus a "pending
//! providers" set per required field, folded by [`GraphAgent::dispatch`] as
//! events arrive off the bus. A node fires once every required field's
//! providers have either delivered a value or gone terminal; it skips if a
//! required field is left unsatisfied when its last provider goes terminal.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde_json::Value;

use crate::error::RunError;
use crate::event::{AgentEvent, NodeId, OutputMap, RunId};
use crate::logging;
use crate::node::{AgentNode, Context, NODE_INIT_RUN_ID};
use crate::provider::{Binding, ProviderKind};
use crate::reducer::{InputAccumulator, ReducerEntry};
use crate::stream::{EventReceiver, EventStream};

struct NodeEntry {
    id: NodeId,
    node: Arc<dyn AgentNode>,
    config: Value,
    bindings: HashMap<String, Binding>,
    required: HashSet<String>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum ConsumerKind {
    Output,
    Render,
}

#[derive(Clone)]
struct ConsumerEdge {
    target: NodeId,
    /// The target field on `target` that this edge feeds (the reducer's
    /// `target_field`, and the key into `RunState::pending`).
    field: String,
    /// For `ConsumerKind::Output`, the field name on the *upstream* node's
    /// `Output` map to read (the binding's source field, which need not
    /// match `field` — see §8 Scenario A's `a.x -> b.v`). Unused for
    /// `Render` edges, which carry their payload as `data` rather than a
    /// named field.
    source_field: Option<String>,
    is_array: bool,
    kind: ConsumerKind,
}

/// Per-run bookkeeping for one node (§4.4.1, §8).
struct RunState {
    accumulator: InputAccumulator,
    /// Required field -> the Output providers it's still waiting to hear
    /// from (value or terminal). Fields with no entry here are either not
    /// required, or fed only by literal/schema values resolved at build
    /// time — nothing to wait on.
    pending: HashMap<String, HashSet<NodeId>>,
    /// Set when a required field has no binding at all and was not seeded
    /// from a literal value — nothing will ever satisfy it, so this node is
    /// skipped immediately rather than waiting forever (§4.4, dangling
    /// required field).
    unsatisfiable: bool,
    resolved: bool,
}

impl RunState {
    fn new(entry: &NodeEntry, run: &RunId) -> Self {
        let mut seed = OutputMap::new();
        for (field, binding) in &entry.bindings {
            if let Binding::Value(v) = binding {
                seed.insert(field.clone(), (**v).clone());
            }
        }

        let mut pending = HashMap::new();
        let mut unsatisfiable = false;
        for field in &entry.required {
            let Some(binding) = entry.bindings.get(field) else {
                if !seed.contains_key(field) {
                    unsatisfiable = true;
                }
                continue;
            };
            let providers: HashSet<NodeId> = binding
                .providers()
                .iter()
                .filter(|p| p.is_output())
                .map(|p| p.node.clone())
                .collect();
            if !providers.is_empty() {
                pending.insert(field.clone(), providers);
            }
        }

        Self {
            accumulator: InputAccumulator::seeded(run.clone(), seed),
            pending,
            unsatisfiable,
            resolved: false,
        }
    }

    fn all_pending_resolved(&self) -> bool {
        self.pending.values().all(|providers| providers.is_empty())
    }

    fn can_fire(&self) -> bool {
        !self.unsatisfiable && self.pending.keys().all(|field| self.accumulator.has_field(field))
    }
}

/// Builds a [`GraphAgent`] from a set of nodes and field bindings.
pub struct GraphAgentBuilder {
    stream: Arc<EventStream>,
    nodes: HashMap<NodeId, (Arc<dyn AgentNode>, Value)>,
    bindings: HashMap<NodeId, HashMap<String, Binding>>,
    order: Vec<NodeId>,
}

impl GraphAgentBuilder {
    pub fn new() -> Self {
        Self::with_stream(Arc::new(EventStream::new()))
    }

    pub fn with_stream(stream: Arc<EventStream>) -> Self {
        Self {
            stream,
            nodes: HashMap::new(),
            bindings: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Registers a node under `id` with its `config` (opaque JSON handed to
    /// every `Context` built for it).
    pub fn node(mut self, id: impl Into<NodeId>, node: impl AgentNode + 'static, config: Value) -> Self {
        let id = id.into();
        self.order.push(id.clone());
        self.nodes.insert(id.clone(), (Arc::new(node), config));
        self.bindings.entry(id).or_default();
        self
    }

    /// Binds `field` on `node_id` to `binding` (§4.4). A field with no
    /// binding is simply never populated — fine for optional fields, fatal
    /// (permanent skip) for required ones once the node's run starts.
    pub fn bind(mut self, node_id: impl Into<NodeId>, field: impl Into<String>, binding: Binding) -> Self {
        self.bindings.entry(node_id.into()).or_default().insert(field.into(), binding);
        self
    }

    /// Resolves schema bindings against each node's declared metadata,
    /// builds the consumer reverse-index, and runs every node's `init` once
    /// with the synthetic init run id (§4.2).
    pub async fn build(self) -> GraphAgent {
        let GraphAgentBuilder {
            stream,
            mut nodes,
            mut bindings,
            order,
        } = self;

        let mut metadata_json: HashMap<NodeId, Value> = HashMap::new();
        for id in &order {
            if let Some((node, _)) = nodes.get(id) {
                metadata_json.insert(id.clone(), serde_json::to_value(node.metadata()).unwrap_or(Value::Null));
            }
        }

        let mut entries: HashMap<NodeId, Arc<NodeEntry>> = HashMap::new();
        for id in &order {
            let (node, config) = nodes.remove(id).expect("node registered in order");
            let mut node_bindings = bindings.remove(id).unwrap_or_default();

            let required: HashSet<String> = node
                .metadata()
                .input
                .iter()
                .filter(|f| f.required)
                .map(|f| f.name.clone())
                .collect();

            // Schema bindings resolve synchronously at build time: every
            // node's metadata is already known, so there is nothing to wait
            // on at run time (§4.6). Render bindings stay dynamic but never
            // gate firing (§4.4: render is auxiliary to the UI, not a data
            // dependency). The array form is the spec's canonical way to
            // offer several tools at once (§4.4 `Chat.bind({tools: [W.schema,
            // ...]})`), so it must resolve the same way a single schema
            // binding does, not just `Binding::Single`.
            for (field, binding) in node_bindings.iter_mut() {
                match binding {
                    Binding::Single(p) if p.is_schema() => {
                        let resolved = metadata_json.get(&p.node).cloned().unwrap_or(Value::Null);
                        *binding = Binding::Value(Arc::new(resolved));
                    }
                    Binding::Array(providers) => {
                        let schema_count = providers.iter().filter(|p| p.is_schema()).count();
                        assert!(
                            schema_count == 0 || schema_count == providers.len(),
                            "node {id:?} field {field:?}: array binding mixes schema providers with \
                             output/render providers, which has no defined resolution",
                        );
                        if schema_count > 0 {
                            let resolved: Vec<Value> = providers
                                .iter()
                                .map(|p| metadata_json.get(&p.node).cloned().unwrap_or(Value::Null))
                                .collect();
                            *binding = Binding::Value(Arc::new(Value::Array(resolved)));
                        }
                    }
                    _ => {}
                }
            }

            entries.insert(
                id.clone(),
                Arc::new(NodeEntry {
                    id: id.clone(),
                    node,
                    config,
                    bindings: node_bindings,
                    required,
                }),
            );
        }

        let mut consumers: HashMap<NodeId, Vec<ConsumerEdge>> = HashMap::new();
        for entry in entries.values() {
            for (field, binding) in &entry.bindings {
                for provider in binding.providers() {
                    let (kind, source_field) = match &provider.kind {
                        ProviderKind::Output { field } => (ConsumerKind::Output, Some(field.clone())),
                        ProviderKind::Render => (ConsumerKind::Render, None),
                        ProviderKind::Schema => continue,
                    };
                    // A render source is a per-run *sequence* of UI updates
                    // (§4.6: "observable of per-run inner streams"), not a
                    // single value — always accumulate it the way an array
                    // binding does, even when the field was declared with
                    // `Binding::Single`, so a second render update in the
                    // same run never trips the scalar-duplicate check meant
                    // for `Output` fields.
                    let is_array = binding.is_array() || kind == ConsumerKind::Render;
                    consumers.entry(provider.node.clone()).or_default().push(ConsumerEdge {
                        target: entry.id.clone(),
                        field: field.clone(),
                        source_field,
                        is_array,
                        kind,
                    });
                }
            }
        }

        let agent = GraphAgent {
            stream: Arc::clone(&stream),
            nodes: entries,
            consumers,
            run_counter: AtomicU64::new(0),
            errors: dashmap::DashMap::new(),
        };

        for entry in agent.nodes.values() {
            let ctx = Context::new(
                Arc::clone(&stream),
                RunId::new(NODE_INIT_RUN_ID),
                entry.id.clone(),
                entry.config.clone(),
            );
            entry.node.init(&ctx).await;
        }

        agent
    }
}

impl Default for GraphAgentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The runtime: a fixed node table plus the one `EventStream` they all share
/// (§4.1).
pub struct GraphAgent {
    stream: Arc<EventStream>,
    nodes: HashMap<NodeId, Arc<NodeEntry>>,
    consumers: HashMap<NodeId, Vec<ConsumerEdge>>,
    run_counter: AtomicU64,
    /// Per-run fatal error, for runs aborted by a protocol violation or an
    /// uncaught node failure (§7) — kept alongside the closed `AgentEvent`
    /// set rather than folded into it.
    errors: dashmap::DashMap<RunId, RunError>,
}

impl GraphAgent {
    pub fn builder() -> GraphAgentBuilder {
        GraphAgentBuilder::new()
    }

    /// Subscribes a fresh receiver to the shared stream (§4.1). Only events
    /// published after this call are visible to it.
    pub fn subscribe(&self) -> EventReceiver {
        self.stream.subscribe()
    }

    pub fn error_for(&self, run: &RunId) -> Option<RunError> {
        self.errors.get(run).map(|e| e.value().clone())
    }

    pub fn node_ids(&self) -> impl Iterator<Item = &NodeId> {
        self.nodes.keys()
    }

    /// Starts one logical run at `entry_node`, seeding its accumulated
    /// input directly with `input` (§4.5). Resolves once every node
    /// reachable in this run has emitted its terminal event, or once a
    /// protocol violation / uncaught node failure aborts the run.
    pub async fn invoke(&self, entry_node: impl Into<NodeId>, input: OutputMap) -> Result<RunId, RunError> {
        let entry_node = entry_node.into();
        let run = RunId::generate(self.run_counter.fetch_add(1, Ordering::Relaxed));

        let mut states: HashMap<NodeId, RunState> = self
            .nodes
            .iter()
            .map(|(id, entry)| (id.clone(), RunState::new(entry, &run)))
            .collect();

        let mut rx = self.stream.subscribe();
        logging::log_run_invoked(run.as_str(), &entry_node);
        self.stream.send_run_invoked(run.clone());

        if let Some(state) = states.get_mut(&entry_node) {
            for (field, value) in input {
                state.accumulator.insert_seed(field, value);
            }
            // `RunState::new` flags a required field with no binding as
            // unsatisfiable, since nothing would ever produce it — except
            // for the entry node, whose invoke-time input (just merged
            // above) is exactly how such fields are meant to be filled
            // (§4.5).
            if let Some(entry) = self.nodes.get(&entry_node) {
                state.unsatisfiable = entry
                    .required
                    .iter()
                    .any(|field| !entry.bindings.contains_key(field) && !state.accumulator.has_field(field));
            }
        }

        // `RunInvoked` seeds the whole graph, not just the named entry
        // node: any node whose required fields are already satisfiable from
        // literal/schema bindings alone (no Output provider to wait on)
        // fires right away, independent of `entry_node` (§4.4's "every
        // GraphNode bound to RunInvoked begins collecting").
        let all_ids: Vec<NodeId> = self.nodes.keys().cloned().collect();
        for id in &all_ids {
            self.evaluate(&run, id, &mut states).await?;
        }

        let total = self.nodes.len();
        while states.values().filter(|s| s.resolved).count() < total {
            let Some(event) = rx.recv().await else {
                break;
            };
            if event.run() != &run {
                continue;
            }
            self.dispatch(&run, &event, &mut states).await?;
        }

        if let Some(err) = self.errors.get(&run) {
            return Err(err.value().clone());
        }
        Ok(run)
    }

    async fn dispatch(
        &self,
        run: &RunId,
        event: &AgentEvent,
        states: &mut HashMap<NodeId, RunState>,
    ) -> Result<(), RunError> {
        match event {
            AgentEvent::Output { node: upstream, output, .. } => {
                let Some(edges) = self.consumers.get(upstream) else {
                    return Ok(());
                };
                let edges: Vec<ConsumerEdge> = edges
                    .iter()
                    .filter(|e| e.kind == ConsumerKind::Output)
                    .cloned()
                    .collect();
                for edge in &edges {
                    let source_field = edge.source_field.as_deref().unwrap_or(edge.field.as_str());
                    if let Some(value) = output.get(source_field) {
                        self.accept(run, upstream, edge, Some(value.clone()), states).await?;
                    }
                }
            }
            AgentEvent::Render { node: upstream, data, .. } => {
                let Some(edges) = self.consumers.get(upstream) else {
                    return Ok(());
                };
                let edges: Vec<ConsumerEdge> = edges
                    .iter()
                    .filter(|e| e.kind == ConsumerKind::Render)
                    .cloned()
                    .collect();
                for edge in &edges {
                    self.accept(run, upstream, edge, Some(data.clone()), states).await?;
                }
            }
            AgentEvent::RunCompleted { node: upstream, .. } | AgentEvent::RunSkipped { node: upstream, .. } => {
                let Some(edges) = self.consumers.get(upstream).cloned() else {
                    return Ok(());
                };
                for edge in &edges {
                    if let Some(state) = states.get_mut(&edge.target) {
                        if let Some(pending) = state.pending.get_mut(&edge.field) {
                            pending.remove(upstream);
                        }
                    }
                    self.evaluate(run, &edge.target, states).await?;
                }
            }
            AgentEvent::RunInvoked { .. } => {}
        }
        Ok(())
    }

    /// Folds one value into `edge.target`'s accumulator, notifies the node
    /// via `on_input_event`, then re-evaluates whether it can fire.
    async fn accept(
        &self,
        run: &RunId,
        upstream: &NodeId,
        edge: &ConsumerEdge,
        value: Option<Value>,
        states: &mut HashMap<NodeId, RunState>,
    ) -> Result<(), RunError> {
        let Some(target_entry) = self.nodes.get(&edge.target).cloned() else {
            return Ok(());
        };

        let accepted_partial: Option<OutputMap> = {
            let state = states.get_mut(&edge.target).expect("state exists for every node");
            if state.resolved {
                return Ok(());
            }
            if let Some(pending) = state.pending.get_mut(&edge.field) {
                pending.remove(upstream);
            }
            let reducer_entry = ReducerEntry {
                run: run.clone(),
                node: upstream.clone(),
                target_field: edge.field.clone(),
                is_array: edge.is_array,
                value,
            };
            let accepted = state.accumulator.accept(reducer_entry).map_err(|violation| {
                logging::log_protocol_violation(&violation);
                self.errors.insert(run.clone(), RunError::Aborted(violation.clone()));
                RunError::Aborted(violation)
            })?;
            accepted.then(|| state.accumulator.input().clone())
        };

        if let Some(partial) = accepted_partial {
            let ctx = Context::new(Arc::clone(&self.stream), run.clone(), edge.target.clone(), target_entry.config.clone());
            target_entry.node.on_input_event(&ctx, &partial).await;
        }

        self.evaluate(run, &edge.target, states).await
    }

    /// Checks whether `node_id` can now fire or must skip, and does so.
    async fn evaluate(&self, run: &RunId, node_id: &NodeId, states: &mut HashMap<NodeId, RunState>) -> Result<(), RunError> {
        let (should_fire, should_skip, input) = {
            let Some(state) = states.get(node_id) else {
                return Ok(());
            };
            if state.resolved || !state.all_pending_resolved() {
                (false, false, None)
            } else if state.can_fire() {
                (true, false, Some(state.accumulator.input().clone()))
            } else {
                (false, true, None)
            }
        };

        if should_skip {
            states.get_mut(node_id).unwrap().resolved = true;
            logging::log_node_skipped(run.as_str(), node_id, "a required field's producer(s) terminated without a value");
            self.stream.send_skipped(run.clone(), node_id.clone());
            return Ok(());
        }

        if should_fire {
            states.get_mut(node_id).unwrap().resolved = true;
            self.run_node(run, node_id, input.unwrap_or_default()).await?;
        }

        Ok(())
    }

    async fn run_node(&self, run: &RunId, node_id: &NodeId, input: OutputMap) -> Result<(), RunError> {
        let Some(entry) = self.nodes.get(node_id).cloned() else {
            return Ok(());
        };

        logging::log_node_fired(run.as_str(), node_id);
        let ctx = Context::new(Arc::clone(&self.stream), run.clone(), node_id.clone(), entry.config.clone());

        match entry.node.execute(ctx, input).await {
            Ok(()) => {
                logging::log_node_completed(run.as_str(), node_id);
                self.stream.send_completed(run.clone(), node_id.clone());
                Ok(())
            }
            Err(err) => {
                logging::log_node_failed(run.as_str(), node_id, &err.to_string());
                if entry.node.metadata().output_field("error").is_some() {
                    let mut output = OutputMap::new();
                    output.insert("error".into(), Value::String(err.to_string()));
                    self.stream.send_output(run.clone(), node_id.clone(), output);
                    logging::log_node_completed(run.as_str(), node_id);
                    self.stream.send_completed(run.clone(), node_id.clone());
                    Ok(())
                } else {
                    self.errors.insert(run.clone(), err.clone());
                    self.stream.send_skipped(run.clone(), node_id.clone());
                    Err(err)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{create_agent_node, FieldSpec, NodeSpec};
    use crate::provider::Provider;
    use serde_json::json;
    use std::sync::Mutex;

    fn source_node() -> impl AgentNode {
        let spec = NodeSpec::new("source", "1.0.0").output_field(FieldSpec::required("text"));
        create_agent_node(spec, |ctx, _input| async move {
            let mut out = OutputMap::new();
            out.insert("text".into(), json!("hi"));
            ctx.send_output(out);
            Ok(())
        })
    }

    fn echo_node(seen: Arc<Mutex<Option<Value>>>) -> impl AgentNode {
        let spec = NodeSpec::new("sink", "1.0.0")
            .input_field(FieldSpec::required("text"))
            .output_field(FieldSpec::required("echo"));
        create_agent_node(spec, move |ctx, input| {
            let seen = Arc::clone(&seen);
            async move {
                *seen.lock().unwrap() = input.get("text").cloned();
                let mut out = OutputMap::new();
                out.insert("echo".into(), input.get("text").cloned().unwrap_or(Value::Null));
                ctx.send_output(out);
                Ok(())
            }
        })
    }

    /// Scenario A: a linear source -> sink chain, sink fires once source's
    /// required output field is bound and delivered.
    #[tokio::test]
    async fn linear_chain_fires_downstream_from_upstream_output() {
        let seen = Arc::new(Mutex::new(None));
        let agent = GraphAgentBuilder::new()
            .node("source", source_node(), Value::Null)
            .node("sink", echo_node(Arc::clone(&seen)), Value::Null)
            .bind("sink", "text", Binding::Single(Provider::output("source", "text")))
            .build()
            .await;

        agent.invoke("source", OutputMap::new()).await.unwrap();
        assert_eq!(seen.lock().unwrap().clone(), Some(json!("hi")));
    }

    /// Scenario B: an array-bound field accumulates in publication order
    /// from two independent producers feeding the same sink.
    #[tokio::test]
    async fn array_binding_collects_values_from_multiple_producers_in_order() {
        let seen = Arc::new(Mutex::new(None));
        let seen2 = Arc::clone(&seen);

        let a1 = create_agent_node(
            NodeSpec::new("a1", "1.0.0").output_field(FieldSpec::required("v")),
            |ctx, _input| async move {
                let mut out = OutputMap::new();
                out.insert("v".into(), json!("p"));
                ctx.send_output(out);
                Ok(())
            },
        );
        let a2 = create_agent_node(
            NodeSpec::new("a2", "1.0.0").output_field(FieldSpec::required("v")),
            |ctx, _input| async move {
                let mut out = OutputMap::new();
                out.insert("v".into(), json!("q"));
                ctx.send_output(out);
                Ok(())
            },
        );
        let collector = create_agent_node(
            NodeSpec::new("collector", "1.0.0").input_field(FieldSpec::required("items")),
            move |_ctx, input| {
                let seen = Arc::clone(&seen2);
                async move {
                    *seen.lock().unwrap() = input.get("items").cloned();
                    Ok(())
                }
            },
        );

        let agent = GraphAgentBuilder::new()
            .node("a1", a1, Value::Null)
            .node("a2", a2, Value::Null)
            .node("collector", collector, Value::Null)
            .bind(
                "collector",
                "items",
                Binding::Array(vec![Provider::output("a1", "v"), Provider::output("a2", "v")]),
            )
            .build()
            .await;

        // Neither a1 nor a2 has any required field bound to an upstream
        // provider, so both fire as soon as the run starts (§4.4); the
        // named entry only matters for which node receives `invoke`'s
        // literal input.
        agent.invoke("a1", OutputMap::new()).await.unwrap();
        assert_eq!(seen.lock().unwrap().clone(), Some(json!(["p", "q"])));
    }

    /// Scenario D-equivalent: a required field whose sole upstream producer
    /// never emits it (but does complete) permanently skips the downstream
    /// node rather than hanging.
    #[tokio::test]
    async fn required_field_with_no_value_from_terminated_producer_skips_downstream() {
        let maybe = create_agent_node(
            NodeSpec::new("maybe", "1.0.0").output_field(FieldSpec::optional("text")),
            |_ctx, _input| async move { Ok(()) },
        );

        let fired = Arc::new(Mutex::new(false));
        let fired2 = Arc::clone(&fired);
        let needs = create_agent_node(
            NodeSpec::new("needs", "1.0.0").input_field(FieldSpec::required("text")),
            move |_ctx, _input| {
                let fired = Arc::clone(&fired2);
                async move {
                    *fired.lock().unwrap() = true;
                    Ok(())
                }
            },
        );

        let agent = GraphAgentBuilder::new()
            .node("maybe", maybe, Value::Null)
            .node("needs", needs, Value::Null)
            .bind("needs", "text", Binding::Single(Provider::output("maybe", "text")))
            .build()
            .await;

        let mut rx = agent.subscribe();
        agent.invoke("maybe", OutputMap::new()).await.unwrap();

        let mut saw_needs_skipped = false;
        for _ in 0..3 {
            if let Some(AgentEvent::RunSkipped { node, .. }) = rx.recv().await {
                if &*node == "needs" {
                    saw_needs_skipped = true;
                }
            }
        }
        assert!(saw_needs_skipped);
        assert!(!*fired.lock().unwrap());
    }

    /// §4.6: a schema-kind binding resolves to the upstream node's metadata
    /// as a plain JSON value at build time, with no runtime dependency.
    #[tokio::test]
    async fn schema_binding_resolves_to_node_metadata_at_build_time() {
        let tool = create_agent_node(
            NodeSpec::new("tool", "2.0.0").name("Weather").output_field(FieldSpec::required("result")),
            |_ctx, _input| async move { Ok(()) },
        );

        let seen = Arc::new(Mutex::new(None));
        let seen2 = Arc::clone(&seen);
        let chat = create_agent_node(
            NodeSpec::new("chat", "1.0.0").input_field(FieldSpec::optional("tools")),
            move |_ctx, input| {
                let seen = Arc::clone(&seen2);
                async move {
                    *seen.lock().unwrap() = input.get("tools").cloned();
                    Ok(())
                }
            },
        );

        let agent = GraphAgentBuilder::new()
            .node("tool", tool, Value::Null)
            .node("chat", chat, Value::Null)
            .bind("chat", "tools", Binding::Single(Provider::schema("tool")))
            .build()
            .await;

        agent.invoke("chat", OutputMap::new()).await.unwrap();
        let schema = seen.lock().unwrap().clone().expect("tools field seeded from schema");
        assert_eq!(schema["id"], json!("tool"));
        assert_eq!(schema["name"], json!("Weather"));
    }

    /// §4.4 / §8 Scenario C: `Chat.bind({tools: [W.schema, ...]})` — the
    /// spec's canonical form for offering more than one tool — resolves
    /// every schema provider in the array, not just a single-provider
    /// binding.
    #[tokio::test]
    async fn array_of_schema_providers_resolves_every_tool_metadata() {
        let weather = create_agent_node(
            NodeSpec::new("weather", "2.0.0")
                .name("Weather")
                .output_field(FieldSpec::required("result")),
            |_ctx, _input| async move { Ok(()) },
        );
        let calendar = create_agent_node(
            NodeSpec::new("calendar", "1.0.0")
                .name("Calendar")
                .output_field(FieldSpec::required("result")),
            |_ctx, _input| async move { Ok(()) },
        );

        let seen = Arc::new(Mutex::new(None));
        let seen2 = Arc::clone(&seen);
        let chat = create_agent_node(
            NodeSpec::new("chat", "1.0.0").input_field(FieldSpec::optional("tools")),
            move |_ctx, input| {
                let seen = Arc::clone(&seen2);
                async move {
                    *seen.lock().unwrap() = input.get("tools").cloned();
                    Ok(())
                }
            },
        );

        let agent = GraphAgentBuilder::new()
            .node("weather", weather, Value::Null)
            .node("calendar", calendar, Value::Null)
            .node("chat", chat, Value::Null)
            .bind(
                "chat",
                "tools",
                Binding::Array(vec![Provider::schema("weather"), Provider::schema("calendar")]),
            )
            .build()
            .await;

        agent.invoke("chat", OutputMap::new()).await.unwrap();
        let tools = seen.lock().unwrap().clone().expect("tools field seeded from schema array");
        let tools = tools.as_array().expect("tools resolves to a JSON array");
        assert_eq!(tools.len(), 2);
        assert_eq!(tools[0]["id"], json!("weather"));
        assert_eq!(tools[0]["name"], json!("Weather"));
        assert_eq!(tools[1]["id"], json!("calendar"));
        assert_eq!(tools[1]["name"], json!("Calendar"));
    }

    /// §8: a node that republishes the same scalar-bound field twice in one
    /// run trips a protocol violation that aborts the run.
    #[tokio::test]
    async fn duplicate_scalar_publish_aborts_the_run() {
        let flaky = create_agent_node(
            NodeSpec::new("flaky", "1.0.0").output_field(FieldSpec::required("v")),
            |ctx, _input| async move {
                let mut first = OutputMap::new();
                first.insert("v".into(), json!(1));
                ctx.send_output(first);

                let mut second = OutputMap::new();
                second.insert("v".into(), json!(2));
                ctx.send_output(second);
                Ok(())
            },
        );
        let sink = create_agent_node(
            NodeSpec::new("sink", "1.0.0").input_field(FieldSpec::required("v")),
            |_ctx, _input| async move { Ok(()) },
        );

        let agent = GraphAgentBuilder::new()
            .node("flaky", flaky, Value::Null)
            .node("sink", sink, Value::Null)
            .bind("sink", "v", Binding::Single(Provider::output("flaky", "v")))
            .build()
            .await;

        let err = agent.invoke("flaky", OutputMap::new()).await.unwrap_err();
        assert!(matches!(err, RunError::Aborted(_)));
    }
}
