//! A concrete `Source` stage (spec §1's "small number of demonstrative
//! built-in stages needed to exercise every module"): reads a raw
//! sample file plus its JSON sidecar and publishes a
//! `MemoryFieldRepresentation`.
//!
//! The round trip partner of [`crate::raw_field_sink::RawFieldSinkStage`];
//! both speak [`crate::raw_format::RawFieldSidecar`].

use crate::raw_format::RawFieldSidecar;
use orc_artifact::concrete::{FieldData, MemoryFieldRepresentation};
use orc_artifact::{ArtifactHandle, ObservationContext, Provenance};
use orc_core::{ParameterDescriptor, ParameterError, ParameterType, ParameterValue, VideoSystem};
use orc_stage::node_type::{NodeType, NodeTypeInfo};
use orc_stage::parameterized::validate_against;
use orc_stage::{ParameterizedStage, Stage, StageError};
use std::collections::BTreeMap;
use std::sync::Arc;

const VERSION: &str = "1.0";

pub struct MemorySourceStage {
    node_type: NodeTypeInfo,
    parameters: BTreeMap<String, ParameterValue>,
}

impl Default for MemorySourceStage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySourceStage {
    #[must_use]
    pub fn new() -> Self {
        Self {
            node_type: NodeTypeInfo::fixed_arity(NodeType::Source, "memory_source", 0, 1),
            parameters: BTreeMap::new(),
        }
    }

    fn path_param(&self, parameters: &BTreeMap<String, ParameterValue>, name: &str) -> Result<String, StageError> {
        match parameters.get(name) {
            Some(ParameterValue::FilePath(path) | ParameterValue::String(path)) => Ok(path.clone()),
            Some(_) => Err(StageError::Failed(format!("parameter '{name}' is not a path"))),
            None => Err(StageError::Failed(format!("missing parameter '{name}'"))),
        }
    }
}

impl ParameterizedStage for MemorySourceStage {
    fn parameter_descriptors(&self, _project_format: VideoSystem, _source_type: &str) -> Vec<ParameterDescriptor> {
        let mut samples_path = ParameterDescriptor::new("samples_path", ParameterType::FilePath);
        samples_path.constraints.required = true;
        samples_path.file_extension_hint = Some("raw".to_string());

        let mut metadata_path = ParameterDescriptor::new("metadata_path", ParameterType::FilePath);
        metadata_path.constraints.required = true;
        metadata_path.file_extension_hint = Some("json".to_string());

        vec![samples_path, metadata_path]
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

impl Stage for MemorySourceStage {
    fn version(&self) -> &str {
        VERSION
    }

    fn node_type_info(&self) -> &NodeTypeInfo {
        &self.node_type
    }

    fn required_input_count(&self) -> usize {
        0
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
        if !inputs.is_empty() {
            return Err(StageError::InputCountMismatch {
                expected: 0,
                actual: inputs.len(),
            });
        }

        let samples_path = self.path_param(parameters, "samples_path")?;
        let metadata_path = self.path_param(parameters, "metadata_path")?;

        let metadata = std::fs::read_to_string(&metadata_path)
            .map_err(|e| StageError::Failed(format!("reading {metadata_path}: {e}")))?;
        let sidecar: RawFieldSidecar = serde_json::from_str(&metadata)
            .map_err(|e| StageError::Failed(format!("parsing {metadata_path}: {e}")))?;

        let raw = std::fs::read(&samples_path)
            .map_err(|e| StageError::Failed(format!("reading {samples_path}: {e}")))?;
        let per_field = sidecar.samples_per_field();
        let expected_bytes = per_field * sidecar.field_count as usize * 2;
        if raw.len() != expected_bytes {
            return Err(StageError::Failed(format!(
                "{samples_path} has {} bytes, expected {expected_bytes}",
                raw.len()
            )));
        }

        let mut fields = Vec::with_capacity(sidecar.field_count as usize);
        for i in 0..sidecar.field_count as usize {
            let start = i * per_field * 2;
            let samples: Vec<u16> = raw[start..start + per_field * 2]
                .chunks_exact(2)
                .map(|b| u16::from_le_bytes([b[0], b[1]]))
                .collect();
            let parity_hint = sidecar.parity_hints.get(i).copied().flatten();
            let dropout_hints = sidecar.dropout_hints.get(i).cloned().unwrap_or_default();
            let field = FieldData::new(sidecar.width, sidecar.height, samples, parity_hint, dropout_hints)
                .map_err(|e| StageError::Failed(e.to_string()))?;
            fields.push(field);
        }

        let mut params = BTreeMap::new();
        params.insert("samples_path".to_string(), ParameterValue::FilePath(samples_path));
        params.insert("metadata_path".to_string(), ParameterValue::FilePath(metadata_path));
        let provenance = Provenance::new("memory_source", VERSION).with_parameters(params);

        let vfr = MemoryFieldRepresentation::new(provenance, fields, sidecar.video_parameters);
        Ok(vec![Arc::new(vfr)])
    }
}
