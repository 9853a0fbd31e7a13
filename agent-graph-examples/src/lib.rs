//! Concrete [`AgentNode`] implementations used by the demo binaries under
//! `examples/`. None of these call out to a real LLM — the point of this
//! crate is to exercise `agent-graph`'s routing, not to be a chat client.

pub mod nodes;
