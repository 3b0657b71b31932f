//! Stage wrapper for [`orc_artifact::wrappers::DropoutHintWrapper`].
//! The `extra_hints` parameter is a JSON-encoded map of field index to
//! a list of dropout regions — `ParameterValue` has no native list
//! variant, so the schema's only string-shaped escape hatch is used
//! (mirrors the original's practice of JSON-blob parameters for the
//! handful of stages whose configuration isn't flat scalars).

use super::resolve_single_input;
use orc_artifact::wrappers::DropoutHintWrapper;
use orc_artifact::{ArtifactHandle, ObservationContext};
use orc_core::{DropoutRegion, ParameterDescriptor, ParameterError, ParameterType, ParameterValue, VideoSystem};
use orc_stage::node_type::{NodeType, NodeTypeInfo};
use orc_stage::parameterized::validate_against;
use orc_stage::{ParameterizedStage, Stage, StageError};
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use std::sync::Arc;

const VERSION: &str = "1.0";

pub struct DropoutHintStage {
    node_type: NodeTypeInfo,
    parameters: BTreeMap<String, ParameterValue>,
}

impl Default for DropoutHintStage {
    fn default() -> Self {
        Self::new()
    }
}

impl DropoutHintStage {
    #[must_use]
    pub fn new() -> Self {
        Self {
            node_type: NodeTypeInfo::fixed_arity(NodeType::Transform, "dropout_hint", 1, 1),
            parameters: BTreeMap::new(),
        }
    }

    fn extra_hints(&self, parameters: &BTreeMap<String, ParameterValue>) -> Result<FxHashMap<u64, Vec<DropoutRegion>>, StageError> {
        match parameters.get("extra_hints_json") {
            None => Ok(FxHashMap::default()),
            Some(ParameterValue::String(json)) if json.is_empty() => Ok(FxHashMap::default()),
            Some(ParameterValue::String(json)) => {
                let parsed: Vec<(u64, Vec<DropoutRegion>)> = serde_json::from_str(json)
                    .map_err(|e| StageError::Failed(format!("parsing extra_hints_json: {e}")))?;
                Ok(parsed.into_iter().collect())
            }
            Some(_) => Err(StageError::Failed("extra_hints_json must be a string".to_string())),
        }
    }
}

impl ParameterizedStage for DropoutHintStage {
    fn parameter_descriptors(&self, _project_format: VideoSystem, _source_type: &str) -> Vec<ParameterDescriptor> {
        let mut extra_hints = ParameterDescriptor::new("extra_hints_json", ParameterType::String);
        extra_hints.constraints.default_value = Some(ParameterValue::String(String::new()));
        vec![extra_hints]
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

impl Stage for DropoutHintStage {
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
        let extra_hints = self.extra_hints(parameters)?;
        Ok(vec![Arc::new(DropoutHintWrapper::new(source, VERSION, extra_hints))])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orc_artifact::concrete::{FieldData, MemoryFieldRepresentation};
    use orc_artifact::{Artifact, Provenance, VideoFieldRepresentation};
    use orc_core::FieldId;

    #[test]
    fn merges_json_encoded_extra_hints() {
        let field = FieldData::new(4, 2, vec![0u16; 8], None, Vec::new()).unwrap();
        let source: ArtifactHandle = Arc::new(MemoryFieldRepresentation::new(
            Provenance::new("source", "1.0"),
            vec![field],
            None,
        ));

        let stage = DropoutHintStage::new();
        let mut parameters = BTreeMap::new();
        parameters.insert(
            "extra_hints_json".to_string(),
            ParameterValue::String(
                serde_json::to_string(&vec![(0u64, vec![DropoutRegion { line: 0, start_sample: 0, end_sample: 1 }])]).unwrap(),
            ),
        );
        let mut obs = ObservationContext::new();
        let outputs = stage.execute(&[source], &parameters, &mut obs).unwrap();
        let vfr = outputs[0].as_vfr().unwrap();
        assert_eq!(vfr.get_dropout_hints(FieldId::new(0)).len(), 1);
    }

    #[test]
    fn rejects_wrong_input_count() {
        let stage = DropoutHintStage::new();
        let mut obs = ObservationContext::new();
        let result = stage.execute(&[], &BTreeMap::new(), &mut obs);
        assert!(matches!(result, Err(StageError::InputCountMismatch { expected: 1, actual: 0 })));
    }
}
