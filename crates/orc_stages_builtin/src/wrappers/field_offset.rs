//! Stage wrapper for [`orc_artifact::wrappers::FieldOffsetWrapper`].

use super::resolve_single_input;
use orc_artifact::wrappers::FieldOffsetWrapper;
use orc_artifact::{ArtifactHandle, ObservationContext};
use orc_core::{ParameterDescriptor, ParameterError, ParameterType, ParameterValue, VideoSystem};
use orc_stage::node_type::{NodeType, NodeTypeInfo};
use orc_stage::parameterized::validate_against;
use orc_stage::{ParameterizedStage, Stage, StageError};
use std::collections::BTreeMap;
use std::sync::Arc;

const VERSION: &str = "1.0";

pub struct FieldOffsetStage {
    node_type: NodeTypeInfo,
    parameters: BTreeMap<String, ParameterValue>,
}

impl Default for FieldOffsetStage {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldOffsetStage {
    #[must_use]
    pub fn new() -> Self {
        Self {
            node_type: NodeTypeInfo::fixed_arity(NodeType::Transform, "field_offset", 1, 1),
            parameters: BTreeMap::new(),
        }
    }

    fn offset(&self, parameters: &BTreeMap<String, ParameterValue>) -> u64 {
        match parameters.get("offset") {
            Some(ParameterValue::UInt32(v)) => u64::from(*v),
            _ => 0,
        }
    }
}

impl ParameterizedStage for FieldOffsetStage {
    fn parameter_descriptors(&self, _project_format: VideoSystem, _source_type: &str) -> Vec<ParameterDescriptor> {
        let mut offset = ParameterDescriptor::new("offset", ParameterType::UInt32);
        offset.constraints.default_value = Some(ParameterValue::UInt32(0));
        offset.constraints.min_value = Some(ParameterValue::UInt32(0));
        vec![offset]
    }

    fn get_parameters(&self) -> BTreeMap<String, ParameterValue> {
        self.parameters.clone()
    }

    fn set_parameters(&mut self, parameters: BTreeMap<String, ParameterValue>) -> Result<(), ParameterError> {
        let descriptors = self.parameter_descriptors(VideoSystem::Unknown, "");
        self.parameters = validate_against(&descriptors, parameters)?;
        Ok(())
    }
}

impl Stage for FieldOffsetStage {
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
        parameters: &BTreeMap<String, ParameterValue>,
        _observation_context: &mut ObservationContext,
    ) -> Result<Vec<ArtifactHandle>, StageError> {
        let source = resolve_single_input(inputs)?;
        let offset = self.offset(parameters);
        Ok(vec![Arc::new(FieldOffsetWrapper::new(source, offset, VERSION))])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orc_artifact::concrete::{FieldData, MemoryFieldRepresentation};
    use orc_artifact::{Artifact, Provenance, VideoFieldRepresentation};
    use orc_core::FieldId;

    #[test]
    fn offset_zero_is_identity() {
        let source: ArtifactHandle = Arc::new(MemoryFieldRepresentation::new(
            Provenance::new("source", "1.0"),
            vec![FieldData::new(1, 1, vec![7], None, Vec::new()).unwrap()],
            None,
        ));
        let stage = FieldOffsetStage::new();
        let mut obs = ObservationContext::new();
        let outputs = stage.execute(&[source], &BTreeMap::new(), &mut obs).unwrap();
        let vfr = outputs[0].as_vfr().unwrap();
        assert_eq!(vfr.get_line(FieldId::new(0), 0).unwrap(), &[7]);
    }

    #[test]
    fn nonzero_offset_shifts_field_indices() {
        let source: ArtifactHandle = Arc::new(MemoryFieldRepresentation::new(
            Provenance::new("source", "1.0"),
            vec![
                FieldData::new(1, 1, vec![1], None, Vec::new()).unwrap(),
                FieldData::new(1, 1, vec![2], None, Vec::new()).unwrap(),
            ],
            None,
        ));
        let stage = FieldOffsetStage::new();
        let mut parameters = BTreeMap::new();
        parameters.insert("offset".to_string(), ParameterValue::UInt32(1));
        let mut obs = ObservationContext::new();
        let outputs = stage.execute(&[source], &parameters, &mut obs).unwrap();
        let vfr = outputs[0].as_vfr().unwrap();
        assert_eq!(vfr.field_count(), 1);
        assert_eq!(vfr.get_line(FieldId::new(0), 0).unwrap(), &[2]);
    }
}
