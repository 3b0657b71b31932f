//! Integration coverage for spec §8's determinism and idempotence
//! properties that span `DAG` + `DAGExecutor` together.

use orc_artifact::{Artifact, ArtifactHandle, ObservationContext, Provenance};
use orc_core::{ArtifactId, NodeId, ParameterValue};
use orc_graph::{DAGExecutor, InputBindings, DAG, DAGNode};
use orc_stage::{NodeType, NodeTypeInfo, Stage, StageError};
use std::collections::BTreeMap;
use std::sync::Arc;

struct TestArtifact {
    id: ArtifactId,
    provenance: Provenance,
}

impl Artifact for TestArtifact {
    fn type_name(&self) -> &str {
        "TestArtifact"
    }
    fn id(&self) -> &ArtifactId {
        &self.id
    }
    fn provenance(&self) -> &Provenance {
        &self.provenance
    }
}

struct IdentityStage {
    info: NodeTypeInfo,
}

impl Stage for IdentityStage {
    fn version(&self) -> &str {
        "1.0"
    }
    fn node_type_info(&self) -> &NodeTypeInfo {
        &self.info
    }
    fn required_input_count(&self) -> usize {
        self.info.min_inputs as usize
    }
    fn output_count(&self) -> usize {
        1
    }
    fn execute(
        &self,
        inputs: &[ArtifactHandle],
        parameters: &BTreeMap<String, ParameterValue>,
        _observation_context: &mut ObservationContext,
    ) -> Result<Vec<ArtifactHandle>, StageError> {
        let provenance = Provenance::new(self.info.canonical_name.clone(), "1.0")
            .with_parameters(parameters.clone())
            .with_input_ids(inputs.iter().map(|a| a.id().clone()).collect());
        let id = provenance.compute_id();
        Ok(vec![Arc::new(TestArtifact { id, provenance })])
    }
}

fn build() -> DAG {
    let mut dag = DAG::new();
    dag.add_node(DAGNode::new(
        NodeId::new(0),
        Arc::new(IdentityStage {
            info: NodeTypeInfo::fixed_arity(NodeType::Source, "source", 0, 1),
        }),
    ));
    let mut parameters = BTreeMap::new();
    parameters.insert("gain".to_string(), ParameterValue::Double(1.5));
    dag.add_node(
        DAGNode::new(
            NodeId::new(1),
            Arc::new(IdentityStage {
                info: NodeTypeInfo::fixed_arity(NodeType::Transform, "transform", 1, 1),
            }),
        )
        .with_input_bindings(InputBindings::from_slice(&[(NodeId::new(0), 0)]))
        .with_parameters(parameters),
    );
    dag.set_output_nodes(vec![NodeId::new(1)]);
    dag
}

#[test]
fn two_cold_runs_yield_identical_artifact_ids() {
    let dag_a = build();
    let dag_b = build();

    let mut executor_a = DAGExecutor::new();
    let mut executor_b = DAGExecutor::new();

    let result_a = executor_a.execute(&dag_a).unwrap();
    let result_b = executor_b.execute(&dag_b).unwrap();

    assert_eq!(result_a.len(), 1);
    assert_eq!(result_a[0].id(), result_b[0].id());
}

#[test]
fn cache_lookup_returns_the_exact_produced_artifact() {
    let dag = build();
    let mut executor = DAGExecutor::new();
    let produced = executor.execute(&dag).unwrap();

    let looked_up = executor.cache_lookup(produced[0].id()).unwrap();
    assert_eq!(looked_up.id(), produced[0].id());
}

#[test]
fn repopulating_identical_parameters_is_a_cache_hit_not_a_new_id() {
    let mut dag = build();
    // Re-set the exact same parameters on node 1; the resulting run
    // must produce the same ArtifactID and not grow the cache.
    let mut executor = DAGExecutor::new();
    executor.execute(&dag).unwrap();
    let cache_size_before = executor.cache_size();

    dag.set_output_nodes(vec![NodeId::new(1)]);
    executor.execute(&dag).unwrap();
    assert_eq!(executor.cache_size(), cache_size_before);
}
