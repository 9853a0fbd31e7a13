//! The input reducer (§4.4.1): a pure fold of per-target-field events into
//! one `{run, input, count}` accumulator.
//!
//! Kept as a standalone pure function (rather than inlined into `GraphNode`)
//! so the contract in §4.4.1 — and the invariants in §8 that are stated
//! purely in terms of it — can be unit-tested in isolation from the event
//! bus and subscription plumbing.

use serde_json::Value;

use crate::error::ProtocolViolation;
use crate::event::{NodeId, OutputMap, RunId};

/// One accepted (run, targetField, isArray, value) entry to fold into an
/// accumulator, mirroring §4.4.1's fold input.
pub struct ReducerEntry {
    pub run: RunId,
    pub node: NodeId,
    pub target_field: String,
    pub is_array: bool,
    pub value: Option<Value>,
}

/// `{run, input, count}` (§3: Input accumulator entity).
#[derive(Debug, Clone, Default)]
pub struct InputAccumulator {
    run: Option<RunId>,
    input: OutputMap,
    count: usize,
}

impl InputAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an accumulator pre-populated with `input`, used for literal
    /// (`Binding::Value`) fields and for the invoke-time input a run's entry
    /// node is seeded with directly (§4.5) — both bypass the event-folding
    /// path since there is no upstream producer to wait on.
    pub fn seeded(run: RunId, input: OutputMap) -> Self {
        let count = input.len();
        Self {
            run: Some(run),
            input,
            count,
        }
    }

    /// Inserts one more pre-resolved field, as with [`Self::seeded`] but for
    /// a field added after construction (the invoke-time input merged onto
    /// an entry node that also carries literal bindings).
    pub fn insert_seed(&mut self, field: String, value: Value) {
        self.input.insert(field, value);
        self.count += 1;
    }

    pub fn run(&self) -> Option<&RunId> {
        self.run.as_ref()
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn input(&self) -> &OutputMap {
        &self.input
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.input.contains_key(field)
    }

    /// Folds one entry into the accumulator per §4.4.1:
    /// - drop entries whose value is `undefined` (here: `None`) — §3
    ///   invariant "`undefined` values never enter the accumulator and do
    ///   not count toward input completeness".
    /// - a run-id mismatch against an already-set run is a protocol
    ///   violation.
    /// - absent field: store `value` (or `[value]` if `is_array`).
    /// - present, not array: protocol violation (duplicate scalar),
    ///   §8 invariant 2 / Scenario D.
    /// - present, array: append, bounded implicitly by the caller only
    ///   ever feeding as many entries as there are bound providers for that
    ///   field (§8 invariant 3).
    pub fn accept(&mut self, entry: ReducerEntry) -> Result<bool, ProtocolViolation> {
        let Some(value) = entry.value else {
            return Ok(false);
        };

        match &self.run {
            None => self.run = Some(entry.run.clone()),
            Some(existing) if *existing != entry.run => {
                return Err(ProtocolViolation::RunIdMismatch {
                    expected: existing.clone(),
                    actual: entry.run,
                });
            }
            Some(_) => {}
        }

        match self.input.get_mut(&entry.target_field) {
            None => {
                let stored = if entry.is_array {
                    Value::Array(vec![value])
                } else {
                    value
                };
                self.input.insert(entry.target_field, stored);
            }
            Some(existing) => {
                if !entry.is_array {
                    return Err(ProtocolViolation::DuplicateScalar {
                        run: entry.run,
                        node: entry.node.to_string(),
                        field: entry.target_field,
                    });
                }
                match existing {
                    Value::Array(arr) => arr.push(value),
                    _ => unreachable!("array target fields are always stored as Value::Array"),
                }
            }
        }

        self.count += 1;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(run: &str, node: &str, field: &str, is_array: bool, value: Option<Value>) -> ReducerEntry {
        ReducerEntry {
            run: RunId::new(run),
            node: node.into(),
            target_field: field.into(),
            is_array,
            value,
        }
    }

    /// §8 invariant 4: undefined values never increment count.
    #[test]
    fn undefined_value_does_not_count() {
        let mut acc = InputAccumulator::new();
        let accepted = acc.accept(entry("r1", "a", "v", false, None)).unwrap();
        assert!(!accepted);
        assert_eq!(acc.count(), 0);
        assert!(acc.run().is_none());
    }

    /// §8 invariant 5: accumulator's run, once set, is stable.
    #[test]
    fn run_id_mismatch_is_rejected() {
        let mut acc = InputAccumulator::new();
        acc.accept(entry("r1", "a", "v", false, Some(json!(1)))).unwrap();
        let err = acc
            .accept(entry("r2", "b", "w", false, Some(json!(2))))
            .unwrap_err();
        assert!(matches!(err, ProtocolViolation::RunIdMismatch { .. }));
        assert_eq!(acc.run().unwrap().as_str(), "r1");
    }

    /// §8 invariant 2 / Scenario D: duplicate scalar value is a protocol violation.
    #[test]
    fn duplicate_scalar_is_rejected() {
        let mut acc = InputAccumulator::new();
        acc.accept(entry("r1", "a", "v", false, Some(json!(1)))).unwrap();
        let err = acc
            .accept(entry("r1", "b", "v", false, Some(json!(2))))
            .unwrap_err();
        assert!(matches!(err, ProtocolViolation::DuplicateScalar { .. }));
        assert_eq!(acc.count(), 1);
    }

    /// Scenario B: array binding accumulates in publication order.
    #[test]
    fn array_field_appends_in_order() {
        let mut acc = InputAccumulator::new();
        acc.accept(entry("r1", "a1", "items", true, Some(json!("p")))).unwrap();
        acc.accept(entry("r1", "a2", "items", true, Some(json!("q")))).unwrap();
        assert_eq!(acc.count(), 2);
        assert_eq!(acc.input()["items"], json!(["p", "q"]));
    }

    #[test]
    fn scalar_field_stores_bare_value_not_wrapped_in_array() {
        let mut acc = InputAccumulator::new();
        acc.accept(entry("r1", "a", "v", false, Some(json!(42)))).unwrap();
        assert_eq!(acc.input()["v"], json!(42));
    }
}
