//! Binding sources (§4.4): what a target field on a `GraphNode` is wired to.
//!
//! A field binding is either a literal value, fixed at graph-build time, or
//! a `Provider` naming the upstream node and which of its three channels
//! (output, schema, render) to draw from. `GraphNode::bind` stores these and
//! the reducer (`reducer.rs`) folds the events they resolve to.

use std::sync::Arc;

use serde_json::Value;

use crate::event::NodeId;

/// Which channel of an upstream node a [`Provider`] draws from (§4.4: "a
/// provider is either an output-field reference, a schema reference, or a
/// render-stream reference").
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderKind {
    /// One field from the upstream node's `Output` events.
    Output { field: String },
    /// The upstream node's tool/input schema, resolved once it is known
    /// (synchronously, at bind time, in this implementation — §4.6).
    Schema,
    /// The upstream node's merged render stream (§4.6 `mergeRenderStreams`).
    Render,
}

/// A single binding source: "field `F` on node `N`" for one of `N`'s three
/// channels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provider {
    pub node: NodeId,
    pub kind: ProviderKind,
}

impl Provider {
    pub fn output(node: impl Into<NodeId>, field: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            kind: ProviderKind::Output {
                field: field.into(),
            },
        }
    }

    pub fn schema(node: impl Into<NodeId>) -> Self {
        Self {
            node: node.into(),
            kind: ProviderKind::Schema,
        }
    }

    pub fn render(node: impl Into<NodeId>) -> Self {
        Self {
            node: node.into(),
            kind: ProviderKind::Render,
        }
    }

    pub fn is_output(&self) -> bool {
        matches!(self.kind, ProviderKind::Output { .. })
    }

    pub fn is_schema(&self) -> bool {
        matches!(self.kind, ProviderKind::Schema)
    }

    pub fn is_render(&self) -> bool {
        matches!(self.kind, ProviderKind::Render)
    }
}

/// What a target field is bound to (§4.4: "a binding is a literal value, a
/// single provider (scalar target field), or a list of providers (array
/// target field)").
#[derive(Debug, Clone)]
pub enum Binding {
    /// A fixed value, resolved immediately when the run starts — never
    /// counted against the node's producer-completeness gate.
    Value(Arc<Value>),
    /// A scalar target field fed by exactly one provider.
    Single(Provider),
    /// An array target field fed by an ordered list of providers, appended
    /// in publication order (§4.4.1, Scenario B).
    Array(Vec<Provider>),
}

impl Binding {
    /// All providers this binding depends on (empty for `Value`).
    pub fn providers(&self) -> &[Provider] {
        match self {
            Binding::Value(_) => &[],
            Binding::Single(p) => std::slice::from_ref(p),
            Binding::Array(ps) => ps,
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Binding::Array(_))
    }
}

/// Binds one target field to the merged render streams of several upstream
/// nodes (§4.6: "`mergeRenderStreams(...providers)` — merges multiple
/// render providers into a single render provider by run id... Used when a
/// sink (e.g. `User`) must show UI fragments from multiple tool nodes.").
/// A thin convenience over `Binding::Array` of `Provider::render` entries —
/// render edges are always accumulated regardless of array/single binding
/// (see `graph::GraphAgentBuilder::build`), so this just saves callers from
/// spelling out the `Provider::render` list by hand.
pub fn merge_render_streams<I, N>(nodes: I) -> Binding
where
    I: IntoIterator<Item = N>,
    N: Into<NodeId>,
{
    Binding::Array(nodes.into_iter().map(Provider::render).collect())
}
