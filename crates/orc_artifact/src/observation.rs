//! `ObservationContext` (spec §3): the mutable side-channel threaded
//! through a single DAG run's `execute` calls.

use orc_core::{DropoutRegion, NodeId};
use rustc_hash::FxHashMap;

/// A value a stage may publish to the observation side-channel.
/// Deliberately a small closed set rather than an open `Any` bag —
/// the concrete stages in this repo only ever publish dropout counts,
/// burst-level statistics, and inferred parity, and the spec names
/// exactly these examples (spec §3 "ObservationContext").
#[derive(Debug, Clone, PartialEq)]
pub enum ObservationValue {
    Dropouts(Vec<DropoutRegion>),
    Scalar(f64),
    Flag(bool),
    Text(String),
}

/// Scoped to one `DAGExecutor::execute` call chain: created at the
/// start of a run, dropped at the end (spec §3). Earlier nodes'
/// published observations are visible to later nodes in the same run
/// (spec §5 "Ordering guarantees"); execution is single-threaded
/// within a run so no internal locking is needed here — a stage that
/// parallelizes internally is responsible for serializing its own
/// writes before returning from `execute`.
#[derive(Debug, Default)]
pub struct ObservationContext {
    entries: FxHashMap<(NodeId, String), Vec<ObservationValue>>,
}

impl ObservationContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&mut self, node_id: NodeId, key: impl Into<String>, value: ObservationValue) {
        self.entries
            .entry((node_id, key.into()))
            .or_default()
            .push(value);
    }

    #[must_use]
    pub fn query(&self, node_id: NodeId, key: &str) -> &[ObservationValue] {
        self.entries
            .get(&(node_id, key.to_string()))
            .map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn query_latest(&self, node_id: NodeId, key: &str) -> Option<&ObservationValue> {
        self.query(node_id, key).last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publish_then_query_sees_published_values_in_order() {
        let mut ctx = ObservationContext::new();
        let node = NodeId::new(1);
        ctx.publish(node, "dropouts", ObservationValue::Scalar(1.0));
        ctx.publish(node, "dropouts", ObservationValue::Scalar(2.0));

        let values = ctx.query(node, "dropouts");
        assert_eq!(values.len(), 2);
        assert_eq!(ctx.query_latest(node, "dropouts"), Some(&ObservationValue::Scalar(2.0)));
    }

    #[test]
    fn query_unknown_key_is_empty() {
        let ctx = ObservationContext::new();
        assert!(ctx.query(NodeId::new(0), "missing").is_empty());
    }
}
