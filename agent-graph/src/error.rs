//! Run and protocol error types.
//!
//! `RunError` covers node execution/transport failures that propagate to the
//! awaiting `invoke()` future (§7 "Node execution failure" / "Transport/IO
//! failure"). `ProtocolViolation` covers conditions that are fatal to the
//! current run because the routing contract itself was broken (duplicate
//! scalar write, mismatched run ids, custom-request without a custom
//! executor) — distinct from a plain `RunError` so callers can tell "your
//! node crashed" from "the graph was wired incorrectly".

use thiserror::Error;

use crate::event::RunId;

/// Error raised while executing a node, or while transporting its output.
///
/// Returned by `AgentNode::execute` and surfaced through `GraphNode::invoke`'s
/// output future when the node does not declare a dedicated `error` output
/// field (§7: "otherwise it propagates to the `invoke()` promise").
#[derive(Debug, Error, Clone)]
pub enum RunError {
    /// A node's `execute` returned an error.
    #[error("node {node} failed: {message}")]
    NodeFailed { node: String, message: String },

    /// The upstream transport (e.g. the LLM executor, out of scope for this
    /// crate) reported a failure.
    #[error("transport failure for node {node}: {message}")]
    Transport { node: String, message: String },

    /// The run this future was waiting on was aborted by a protocol
    /// violation elsewhere in the graph.
    #[error("run aborted: {0}")]
    Aborted(ProtocolViolation),
}

/// A violation of the graph's routing protocol: fatal to the current run.
///
/// Distinguished from a generic `RunError` per §7: "Protocol violation —
/// duplicate scalar input, mismatched run ids in the reducer, use of a
/// custom-request model without a custom executor. These are fatal to the
/// current run and must surface to the caller."
#[derive(Debug, Error, Clone)]
pub enum ProtocolViolation {
    /// A second value arrived for a scalar (non-array) target field.
    #[error("run {run}: duplicate value for scalar field {field:?} on node {node:?}")]
    DuplicateScalar {
        run: RunId,
        node: String,
        field: String,
    },

    /// Two events for the same accumulator carried different run ids.
    #[error("run id mismatch in accumulator: expected {expected}, got {actual}")]
    RunIdMismatch { expected: RunId, actual: RunId },

    /// A node declared `metadata.request == "custom"` but no custom executor
    /// was configured to handle it (§6 wire protocol contract).
    #[error("node {node:?} requires a custom request executor but none was configured")]
    CustomRequestWithoutExecutor { node: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_failed_display_contains_node_and_message() {
        let err = RunError::NodeFailed {
            node: "chat".into(),
            message: "boom".into(),
        };
        let s = err.to_string();
        assert!(s.contains("chat"));
        assert!(s.contains("boom"));
    }

    #[test]
    fn duplicate_scalar_display_contains_field_and_node() {
        let err = ProtocolViolation::DuplicateScalar {
            run: RunId::new("r1"),
            node: "a".into(),
            field: "v".into(),
        };
        let s = err.to_string();
        assert!(s.contains("r1"));
        assert!(s.contains("\"v\""));
        assert!(s.contains("\"a\""));
    }
}
