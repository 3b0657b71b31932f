//! Stage wrapper for [`orc_artifact::wrappers::line_mask::LineMaskWrapper`].
//! `line_spec` uses the wrapper's own `PARITY:LINE` grammar, e.g.
//! `"F:20,S:6-22"`.

use super::resolve_single_input;
use orc_artifact::wrappers::line_mask::{parse_line_spec, LineMaskWrapper};
use orc_artifact::{ArtifactHandle, ObservationContext};
use orc_core::{ParameterDescriptor, ParameterError, ParameterType, ParameterValue, VideoSystem};
use orc_stage::node_type::{NodeType, NodeTypeInfo};
use orc_stage::parameterized::validate_against;
use orc_stage::{ParameterizedStage, Stage, StageError};
use std::collections::BTreeMap;
use std::sync::Arc;

const VERSION: &str = "1.0";

pub struct LineMaskStage {
    node_type: NodeTypeInfo,
    parameters: BTreeMap<String, ParameterValue>,
}

impl Default for LineMaskStage {
    fn default() -> Self {
        Self::new()
    }
}

impl LineMaskStage {
    #[must_use]
    pub fn new() -> Self {
        Self {
            node_type: NodeTypeInfo::fixed_arity(NodeType::Transform, "line_mask", 1, 1),
            parameters: BTreeMap::new(),
        }
    }

    fn line_spec(&self, parameters: &BTreeMap<String, ParameterValue>) -> Result<String, StageError> {
        match parameters.get("line_spec") {
            Some(ParameterValue::String(spec)) => Ok(spec.clone()),
            Some(_) => Err(StageError::Failed("line_spec must be a string".to_string())),
            None => Ok(String::new()),
        }
    }

    fn mask_ire(&self, parameters: &BTreeMap<String, ParameterValue>) -> f64 {
        match parameters.get("mask_ire") {
            Some(ParameterValue::Double(v)) => *v,
            _ => 0.0,
        }
    }
}

impl ParameterizedStage for LineMaskStage {
    fn parameter_descriptors(&self, _project_format: VideoSystem, _source_type: &str) -> Vec<ParameterDescriptor> {
        let mut line_spec = ParameterDescriptor::new("line_spec", ParameterType::String);
        line_spec.constraints.default_value = Some(ParameterValue::String(String::new()));

        let mut mask_ire = ParameterDescriptor::new("mask_ire", ParameterType::Double);
        mask_ire.constraints.default_value = Some(ParameterValue::Double(0.0));

        vec![line_spec, mask_ire]
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

impl Stage for LineMaskStage {
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
        let spec_str = self.line_spec(parameters)?;
        let specs = parse_line_spec(&spec_str).map_err(|e| StageError::Failed(e.to_string()))?;
        let mask_ire = self.mask_ire(parameters);
        Ok(vec![Arc::new(LineMaskWrapper::new(source, specs, mask_ire, VERSION))])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orc_artifact::concrete::{FieldData, MemoryFieldRepresentation};
    use orc_artifact::{Artifact, Provenance, VideoFieldRepresentation};
    use orc_core::FieldId;

    #[test]
    fn masks_lines_matching_the_spec() {
        let field = FieldData::new(2, 3, vec![100u16; 6], None, Vec::new()).unwrap();
        let source: ArtifactHandle = Arc::new(MemoryFieldRepresentation::new(
            Provenance::new("source", "1.0"),
            vec![field],
            None,
        ));
        let stage = LineMaskStage::new();
        let mut parameters = BTreeMap::new();
        parameters.insert("line_spec".to_string(), ParameterValue::String("A:1".to_string()));
        let mut obs = ObservationContext::new();
        let outputs = stage.execute(&[source], &parameters, &mut obs).unwrap();
        let vfr = outputs[0].as_vfr().unwrap();
        assert_ne!(vfr.get_line(FieldId::new(0), 1).unwrap(), &[100, 100]);
        assert_eq!(vfr.get_line(FieldId::new(0), 0).unwrap(), &[100, 100]);
    }

    #[test]
    fn invalid_spec_fails_execute() {
        let source: ArtifactHandle = Arc::new(MemoryFieldRepresentation::new(
            Provenance::new("source", "1.0"),
            vec![FieldData::new(1, 1, vec![0], None, Vec::new()).unwrap()],
            None,
        ));
        let stage = LineMaskStage::new();
        let mut parameters = BTreeMap::new();
        parameters.insert("line_spec".to_string(), ParameterValue::String("X:1".to_string()));
        let mut obs = ObservationContext::new();
        let result = stage.execute(&[source], &parameters, &mut obs);
        assert!(matches!(result, Err(StageError::Failed(_))));
    }
}
