//! Stage wrapper for [`orc_artifact::wrappers::ParityInvertWrapper`].
//! Takes no parameters — inversion is unconditional.

use super::resolve_single_input;
use orc_artifact::wrappers::ParityInvertWrapper;
use orc_artifact::{ArtifactHandle, ObservationContext};
use orc_core::{ParameterDescriptor, ParameterError, ParameterValue, VideoSystem};
use orc_stage::node_type::{NodeType, NodeTypeInfo};
use orc_stage::parameterized::validate_against;
use orc_stage::{ParameterizedStage, Stage, StageError};
use std::collections::BTreeMap;
use std::sync::Arc;

const VERSION: &str = "1.0";

pub struct ParityInvertStage {
    node_type: NodeTypeInfo,
}

impl Default for ParityInvertStage {
    fn default() -> Self {
        Self::new()
    }
}

impl ParityInvertStage {
    #[must_use]
    pub fn new() -> Self {
        Self {
            node_type: NodeTypeInfo::fixed_arity(NodeType::Transform, "parity_invert", 1, 1),
        }
    }
}

impl ParameterizedStage for ParityInvertStage {
    fn parameter_descriptors(&self, _project_format: VideoSystem, _source_type: &str) -> Vec<ParameterDescriptor> {
        Vec::new()
    }

    fn get_parameters(&self) -> BTreeMap<String, ParameterValue> {
        BTreeMap::new()
    }

    fn set_parameters(&mut self, parameters: BTreeMap<String, ParameterValue>) -> Result<(), ParameterError> {
        validate_against(&[], parameters)?;
        Ok(())
    }
}

impl Stage for ParityInvertStage {
    fn version(&self) -> &str {
        VERSION
    }

    fn node_type_info(&self) -> &NodeTypeInfo {
        &self.node_type
    }

    fn required_input_count(&self) -> usize {
        1
    }

    fn output_count(&self) -> usize {
        1
    }

    fn execute(
        &self,
        inputs: &[ArtifactHandle],
        _parameters: &BTreeMap<String, ParameterValue>,
        _observation_context: &mut ObservationContext,
    ) -> Result<Vec<ArtifactHandle>, StageError> {
        let source = resolve_single_input(inputs)?;
        Ok(vec![Arc::new(ParityInvertWrapper::new(source, VERSION))])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orc_artifact::concrete::{FieldData, MemoryFieldRepresentation};
    use orc_artifact::{Artifact, Provenance, VideoFieldRepresentation};
    use orc_core::{FieldId, FieldParityHint};

    #[test]
    fn inverts_every_field_parity_hint() {
        let field = FieldData::new(
            1,
            1,
            vec![0],
            Some(FieldParityHint { is_first_field: true }),
            Vec::new(),
        )
        .unwrap();
        let source: ArtifactHandle = Arc::new(MemoryFieldRepresentation::new(
            Provenance::new("source", "1.0"),
            vec![field],
            None,
        ));
        let stage = ParityInvertStage::new();
        let mut obs = ObservationContext::new();
        let outputs = stage.execute(&[source], &BTreeMap::new(), &mut obs).unwrap();
        let vfr = outputs[0].as_vfr().unwrap();
        assert!(!vfr.get_field_parity_hint(FieldId::new(0)).unwrap().is_first_field);
    }
}
