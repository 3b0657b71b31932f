//! The base `Stage` contract (spec §4.2 "Public contract of a stage").

use crate::node_type::NodeTypeInfo;
use crate::previewable::PreviewableStage;
use crate::triggerable::TriggerableStage;
use orc_artifact::{ArtifactHandle, ObservationContext};
use orc_core::ParameterValue;
use std::collections::BTreeMap;

/// Failures `execute` may return (spec §7). Never a panic — `execute`
/// always resolves to a `Result`.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum StageError {
    #[error("expected {expected} inputs, got {actual}")]
    InputCountMismatch { expected: usize, actual: usize },
    #[error("input {index} has type '{actual}', expected '{expected}'")]
    InputTypeMismatch {
        index: usize,
        expected: String,
        actual: String,
    },
    #[error("produced {actual} outputs, expected {expected}")]
    OutputCountMismatch { expected: usize, actual: usize },
    #[error("{0}")]
    Failed(String),
}

/// What a stage is: a versioned, typed-shape, pure function from
/// input artifacts and parameters to output artifacts (spec §4.2).
///
/// A stage is constructed once by the registry's factory and owned by
/// a `DAGNode`; it is mutated only through `ParameterizedStage::set_parameters`
/// before `execute` is ever called (spec §3 "Lifecycle summary").
pub trait Stage: Send + Sync {
    /// Semantic-ish version string; participates in `ArtifactID`.
    fn version(&self) -> &str;

    fn node_type_info(&self) -> &NodeTypeInfo;

    /// Runtime input shape. May differ node-to-node for
    /// variable-arity stages (splitters/mergers/complex); for those,
    /// this reflects *this instance's* configured arity, which must
    /// fall within `node_type_info().{min,max}_inputs`.
    fn required_input_count(&self) -> usize;

    fn output_count(&self) -> usize;

    /// Precondition: `inputs.len() == required_input_count()` and
    /// every input is of a type this stage expects. Postcondition: on
    /// success, returns exactly `output_count()` artifacts, each with
    /// a properly filled `Provenance` and consistent `ArtifactID`
    /// (spec §4.2).
    fn execute(
        &self,
        inputs: &[ArtifactHandle],
        parameters: &BTreeMap<String, ParameterValue>,
        observation_context: &mut ObservationContext,
    ) -> Result<Vec<ArtifactHandle>, StageError>;

    /// Trait-object fallback (spec §9) letting callers that only hold
    /// `&dyn Stage` (the DAG, the preview renderer, a GUI node
    /// inspector) query whether this particular stage additionally
    /// implements the `PreviewableStage` mixin, without knowing its
    /// concrete type.
    fn as_previewable(&self) -> Option<&dyn PreviewableStage> {
        None
    }

    /// Same fallback for `TriggerableStage` — how the preview
    /// renderer and a GUI's "trigger this sink" button reach a sink's
    /// control-plane capability through `&dyn Stage` alone.
    fn as_triggerable(&self) -> Option<&dyn TriggerableStage> {
        None
    }
}
