//! Structured logging for graph execution events.
//!
//! Same on/off-by-feature shape as the teacher's `graph::logging`: calls
//! `tracing` macros when the `tracing` feature is enabled, otherwise falls
//! back to `eprintln!` so diagnostics are never silently dropped.

/// A run began executing from `entry_node`.
pub fn log_run_invoked(run: &str, entry_node: &str) {
    #[cfg(feature = "tracing")]
    tracing::info!(run, entry_node, "run invoked");

    #[cfg(not(feature = "tracing"))]
    eprintln!("[INFO] run invoked: run={run} entry_node={entry_node}");
}

/// A node's accumulated input satisfied its required fields and its
/// `execute` coroutine is about to run.
pub fn log_node_fired(run: &str, node: &str) {
    #[cfg(feature = "tracing")]
    tracing::debug!(run, node, "node firing execute");

    #[cfg(not(feature = "tracing"))]
    eprintln!("[DEBUG] node firing execute: run={run} node={node}");
}

/// A node will never fire this run because a required producer completed
/// (or was itself skipped) without delivering a value it depends on.
pub fn log_node_skipped(run: &str, node: &str, reason: &str) {
    #[cfg(feature = "tracing")]
    tracing::debug!(run, node, reason, "node skipped");

    #[cfg(not(feature = "tracing"))]
    eprintln!("[DEBUG] node skipped: run={run} node={node} reason={reason}");
}

/// A node's `execute` coroutine returned successfully.
pub fn log_node_completed(run: &str, node: &str) {
    #[cfg(feature = "tracing")]
    tracing::debug!(run, node, "node completed");

    #[cfg(not(feature = "tracing"))]
    eprintln!("[DEBUG] node completed: run={run} node={node}");
}

/// The accumulator detected a violation of the reducer's fold invariants
/// (duplicate scalar write, run-id mismatch) and the run is aborting.
pub fn log_protocol_violation(violation: &crate::error::ProtocolViolation) {
    #[cfg(feature = "tracing")]
    tracing::error!(?violation, "protocol violation");

    #[cfg(not(feature = "tracing"))]
    eprintln!("[ERROR] protocol violation: {violation:?}");
}

/// A node's `execute` coroutine returned an error.
pub fn log_node_failed(run: &str, node: &str, message: &str) {
    #[cfg(feature = "tracing")]
    tracing::error!(run, node, message, "node execution failed");

    #[cfg(not(feature = "tracing"))]
    eprintln!("[ERROR] node execution failed: run={run} node={node} message={message}");
}

/// A node's event receiver fell behind the broadcast bus and dropped
/// `skipped` events; the receiver resynchronizes but those events are gone.
pub fn log_receiver_lagged(skipped: u64) {
    #[cfg(feature = "tracing")]
    tracing::warn!(skipped, "event receiver lagged, events dropped");

    #[cfg(not(feature = "tracing"))]
    eprintln!("[WARN] event receiver lagged, {skipped} events dropped");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logging_functions_do_not_panic() {
        log_run_invoked("r1", "chat");
        log_node_fired("r1", "chat");
        log_node_skipped("r1", "weather", "required field missing");
        log_node_completed("r1", "chat");
        log_node_failed("r1", "chat", "boom");
        log_receiver_lagged(3);
        log_protocol_violation(&crate::error::ProtocolViolation::RunIdMismatch {
            expected: crate::event::RunId::new("r1"),
            actual: crate::event::RunId::new("r2"),
        });
    }
}
