//! The static DAG model (spec §3 "DAG entities", §4.3 "DAG operations").

use orc_artifact::ArtifactHandle;
use orc_core::{NodeId, ParameterValue};
use orc_stage::Stage;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::collections::BTreeMap;
use std::sync::Arc;

/// A node's bindings to upstream nodes: `(upstream_node, output_index)`
/// per consumed input, in input-slot order (spec §3).
pub type InputBindings = SmallVec<[(NodeId, usize); 4]>;

/// One node in a `DAG`: a stage instance, the parameter values it
/// executes with, and its upstream bindings (spec §3 "DAGNode").
///
/// The stage is held behind a shared handle (`Arc<dyn Stage>`) per
/// spec's "stage (shared)" — a single stage instance may in principle
/// back more than one node (e.g. a stateless transform reused with
/// different parameters), though the common case is one instance per
/// node. Parameters live on the node, not the stage, so `execute` is a
/// pure function of `(inputs, parameters)` rather than requiring
/// `set_parameters` to have been called first.
pub struct DAGNode {
    pub node_id: NodeId,
    pub stage: Arc<dyn Stage>,
    pub parameters: BTreeMap<String, ParameterValue>,
    pub input_bindings: InputBindings,
}

impl DAGNode {
    #[must_use]
    pub fn new(node_id: NodeId, stage: Arc<dyn Stage>) -> Self {
        Self {
            node_id,
            stage,
            parameters: BTreeMap::new(),
            input_bindings: InputBindings::new(),
        }
    }

    #[must_use]
    pub fn with_parameters(mut self, parameters: BTreeMap<String, ParameterValue>) -> Self {
        self.parameters = parameters;
        self
    }

    #[must_use]
    pub fn with_input_bindings(mut self, bindings: InputBindings) -> Self {
        self.input_bindings = bindings;
        self
    }
}

/// A static, acyclic graph of stage nodes (spec §3 "DAG").
///
/// Move-constructible but not `Clone` — once built and validated it is
/// meant to be shared read-only behind an `Arc` (spec §3 "the DAG is
/// move-constructible but not copyable; once shared ... it is held
/// behind a shared immutable handle").
#[derive(Default)]
pub struct DAG {
    nodes: Vec<DAGNode>,
    /// Seed artifacts for source nodes that need externally supplied
    /// input, keyed by node id (spec §3 "root_inputs: Vec<Artifact>").
    root_inputs: FxHashMap<NodeId, Vec<ArtifactHandle>>,
    output_nodes: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DAGValidationError {
    DuplicateNodeId(NodeId),
    DanglingInputReference { node_id: NodeId, missing: NodeId },
    OutputIndexOutOfRange { node_id: NodeId, upstream: NodeId, index: usize },
    Cycle(Vec<NodeId>),
    ArityMismatch { node_id: NodeId, expected_min: u32, expected_max: u32, actual: u32 },
    UnknownOutputNode(NodeId),
}

impl std::fmt::Display for DAGValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DAGValidationError::DuplicateNodeId(id) => {
                write!(f, "duplicate node id {id}")
            }
            DAGValidationError::DanglingInputReference { node_id, missing } => {
                write!(f, "node {node_id} references nonexistent node {missing}")
            }
            DAGValidationError::OutputIndexOutOfRange { node_id, upstream, index } => {
                write!(
                    f,
                    "node {node_id} binds to output {index} of node {upstream}, which has fewer outputs"
                )
            }
            DAGValidationError::Cycle(path) => {
                let path: Vec<String> = path.iter().map(ToString::to_string).collect();
                write!(f, "cycle detected: {}", path.join(" -> "))
            }
            DAGValidationError::ArityMismatch { node_id, expected_min, expected_max, actual } => {
                write!(
                    f,
                    "node {node_id} has {actual} bound inputs, stage requires between {expected_min} and {expected_max}"
                )
            }
            DAGValidationError::UnknownOutputNode(id) => {
                write!(f, "declared output node {id} does not exist in the DAG")
            }
        }
    }
}

impl DAG {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, node: DAGNode) {
        self.nodes.push(node);
    }

    pub fn set_root_inputs(&mut self, node_id: NodeId, inputs: Vec<ArtifactHandle>) {
        self.root_inputs.insert(node_id, inputs);
    }

    pub fn set_output_nodes(&mut self, output_nodes: Vec<NodeId>) {
        self.output_nodes = output_nodes;
    }

    #[must_use]
    pub fn nodes(&self) -> &[DAGNode] {
        &self.nodes
    }

    #[must_use]
    pub fn output_nodes(&self) -> &[NodeId] {
        &self.output_nodes
    }

    #[must_use]
    pub fn root_inputs_for(&self, node_id: NodeId) -> &[ArtifactHandle] {
        self.root_inputs.get(&node_id).map_or(&[], Vec::as_slice)
    }

    /// `Map<NodeID, usize>` for O(1) node lookup (spec §4.3 "build_node_index").
    #[must_use]
    pub fn build_node_index(&self) -> FxHashMap<NodeId, usize> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.node_id, i))
            .collect()
    }

    #[must_use]
    pub fn node(&self, node_id: NodeId) -> Option<&DAGNode> {
        self.nodes.iter().find(|n| n.node_id == node_id)
    }

    /// Runs every check spec §4.3 names: unique node ids, every
    /// referenced input node exists (and has enough outputs), no
    /// cycles, arity matches the stage's declared bounds, every
    /// declared output node exists.
    #[must_use]
    pub fn validate(&self) -> bool {
        self.get_validation_errors().is_empty()
    }

    #[must_use]
    pub fn get_validation_errors(&self) -> Vec<DAGValidationError> {
        let mut errors = Vec::new();
        let index = self.build_node_index();

        let mut seen = rustc_hash::FxHashSet::default();
        for node in &self.nodes {
            if !seen.insert(node.node_id) {
                errors.push(DAGValidationError::DuplicateNodeId(node.node_id));
            }
        }

        for node in &self.nodes {
            for &(upstream, out_index) in &node.input_bindings {
                match index.get(&upstream) {
                    None => errors.push(DAGValidationError::DanglingInputReference {
                        node_id: node.node_id,
                        missing: upstream,
                    }),
                    Some(&pos) => {
                        let upstream_outputs = self.nodes[pos].stage.output_count();
                        if out_index >= upstream_outputs {
                            errors.push(DAGValidationError::OutputIndexOutOfRange {
                                node_id: node.node_id,
                                upstream,
                                index: out_index,
                            });
                        }
                    }
                }
            }

            let info = node.stage.node_type_info();
            let actual = node.input_bindings.len() as u32;
            if !info.accepts_input_count(actual) {
                errors.push(DAGValidationError::ArityMismatch {
                    node_id: node.node_id,
                    expected_min: info.min_inputs,
                    expected_max: info.max_inputs,
                    actual,
                });
            }
        }

        if errors.is_empty() {
            if let Some(cycle) = detect_cycle(&self.nodes, &index) {
                errors.push(DAGValidationError::Cycle(cycle));
            }
        }

        for &output in &self.output_nodes {
            if !index.contains_key(&output) {
                errors.push(DAGValidationError::UnknownOutputNode(output));
            }
        }

        errors
    }
}

/// Standard three-color DFS cycle detection over the binding graph
/// (spec §4.3 "Cycle detection"). Returns the back-edge path if a
/// cycle exists.
fn detect_cycle(nodes: &[DAGNode], index: &FxHashMap<NodeId, usize>) -> Option<Vec<NodeId>> {
    #[derive(Clone, Copy, PartialEq, Eq)]
    enum Color {
        White,
        Gray,
        Black,
    }

    let mut color = vec![Color::White; nodes.len()];
    let mut stack_path = Vec::new();

    fn visit(
        pos: usize,
        nodes: &[DAGNode],
        index: &FxHashMap<NodeId, usize>,
        color: &mut [Color],
        stack_path: &mut Vec<NodeId>,
    ) -> Option<Vec<NodeId>> {
        color[pos] = Color::Gray;
        stack_path.push(nodes[pos].node_id);

        for &(upstream, _) in &nodes[pos].input_bindings {
            let Some(&upos) = index.get(&upstream) else {
                continue;
            };
            match color[upos] {
                Color::White => {
                    if let Some(cycle) = visit(upos, nodes, index, color, stack_path) {
                        return Some(cycle);
                    }
                }
                Color::Gray => {
                    let mut cycle = stack_path.clone();
                    cycle.push(upstream);
                    return Some(cycle);
                }
                Color::Black => {}
            }
        }

        stack_path.pop();
        color[pos] = Color::Black;
        None
    }

    for start in 0..nodes.len() {
        if color[start] == Color::White {
            if let Some(cycle) = visit(start, nodes, index, &mut color, &mut stack_path) {
                return Some(cycle);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use orc_stage::{NodeType, NodeTypeInfo, Stage, StageError};
    use std::collections::BTreeMap as Map;

    struct FixedStage(NodeTypeInfo, usize);

    impl Stage for FixedStage {
        fn version(&self) -> &str {
            "1.0"
        }
        fn node_type_info(&self) -> &NodeTypeInfo {
            &self.0
        }
        fn required_input_count(&self) -> usize {
            self.0.min_inputs as usize
        }
        fn output_count(&self) -> usize {
            self.1
        }
        fn execute(
            &self,
            _inputs: &[ArtifactHandle],
            _parameters: &Map<String, ParameterValue>,
            _observation_context: &mut orc_artifact::ObservationContext,
        ) -> Result<Vec<ArtifactHandle>, StageError> {
            Ok(Vec::new())
        }
    }

    fn source() -> Arc<dyn Stage> {
        Arc::new(FixedStage(
            NodeTypeInfo::fixed_arity(NodeType::Source, "source", 0, 1),
            1,
        ))
    }

    fn transform() -> Arc<dyn Stage> {
        Arc::new(FixedStage(
            NodeTypeInfo::fixed_arity(NodeType::Transform, "transform", 1, 1),
            1,
        ))
    }

    #[test]
    fn valid_two_node_dag_passes() {
        let mut dag = DAG::new();
        dag.add_node(DAGNode::new(NodeId::new(0), source()));
        dag.add_node(
            DAGNode::new(NodeId::new(1), transform())
                .with_input_bindings(InputBindings::from_slice(&[(NodeId::new(0), 0)])),
        );
        dag.set_output_nodes(vec![NodeId::new(1)]);
        assert!(dag.validate(), "{:?}", dag.get_validation_errors());
    }

    #[test]
    fn dangling_input_reference_is_an_error() {
        let mut dag = DAG::new();
        dag.add_node(
            DAGNode::new(NodeId::new(0), transform())
                .with_input_bindings(InputBindings::from_slice(&[(NodeId::new(99), 0)])),
        );
        let errors = dag.get_validation_errors();
        assert!(errors
            .iter()
            .any(|e| matches!(e, DAGValidationError::DanglingInputReference { .. })));
    }

    #[test]
    fn duplicate_node_id_is_an_error() {
        let mut dag = DAG::new();
        dag.add_node(DAGNode::new(NodeId::new(0), source()));
        dag.add_node(DAGNode::new(NodeId::new(0), source()));
        let errors = dag.get_validation_errors();
        assert!(errors
            .iter()
            .any(|e| matches!(e, DAGValidationError::DuplicateNodeId(_))));
    }

    #[test]
    fn cycle_is_detected() {
        let mut dag = DAG::new();
        dag.add_node(
            DAGNode::new(NodeId::new(0), transform())
                .with_input_bindings(InputBindings::from_slice(&[(NodeId::new(1), 0)])),
        );
        dag.add_node(
            DAGNode::new(NodeId::new(1), transform())
                .with_input_bindings(InputBindings::from_slice(&[(NodeId::new(0), 0)])),
        );
        let errors = dag.get_validation_errors();
        assert!(errors.iter().any(|e| matches!(e, DAGValidationError::Cycle(_))));
    }

    #[test]
    fn arity_mismatch_is_an_error() {
        let mut dag = DAG::new();
        dag.add_node(DAGNode::new(NodeId::new(0), transform()));
        let errors = dag.get_validation_errors();
        assert!(errors
            .iter()
            .any(|e| matches!(e, DAGValidationError::ArityMismatch { .. })));
    }

    #[test]
    fn unknown_output_node_is_an_error() {
        let mut dag = DAG::new();
        dag.add_node(DAGNode::new(NodeId::new(0), source()));
        dag.set_output_nodes(vec![NodeId::new(42)]);
        let errors = dag.get_validation_errors();
        assert!(errors
            .iter()
            .any(|e| matches!(e, DAGValidationError::UnknownOutputNode(_))));
    }

    #[test]
    fn output_index_out_of_range_is_an_error() {
        let mut dag = DAG::new();
        dag.add_node(DAGNode::new(NodeId::new(0), source()));
        dag.add_node(
            DAGNode::new(NodeId::new(1), transform())
                .with_input_bindings(InputBindings::from_slice(&[(NodeId::new(0), 3)])),
        );
        let errors = dag.get_validation_errors();
        assert!(errors
            .iter()
            .any(|e| matches!(e, DAGValidationError::OutputIndexOutOfRange { .. })));
    }
}
