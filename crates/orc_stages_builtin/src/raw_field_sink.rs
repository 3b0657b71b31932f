//! `RawFieldSinkStage` (spec §4.4, grounded in the original's
//! `ld_sink_stage.h`/`LDSinkStage`): a minimal triggerable sink that
//! writes a VFR's samples to a raw file plus a JSON sidecar, simplified
//! from the original's `.tbc`/`.db` pair purely to exercise the
//! control plane end-to-end.
//!
//! `execute` does no I/O — a sink's output-producing side effect lives
//! entirely in `trigger`, per the control plane's separation of the
//! cacheable-artifact path from the long-running-action path.

use crate::raw_format::RawFieldSidecar;
use orc_artifact::{Artifact, ArtifactHandle, ObservationContext, VideoFieldRepresentation};
use orc_core::{FieldId, ParameterDescriptor, ParameterError, ParameterType, ParameterValue, VideoSystem};
use orc_stage::node_type::{NodeType, NodeTypeInfo};
use orc_stage::parameterized::validate_against;
use orc_stage::triggerable::{ProgressCallback, SharedTriggerState, TriggerState};
use orc_stage::{ParameterizedStage, Stage, StageError, TriggerableStage};
use std::collections::BTreeMap;

const VERSION: &str = "1.0";

#[derive(Debug, thiserror::Error)]
enum SinkError {
    #[error("missing parameter '{0}'")]
    MissingParameter(String),
    #[error("input is not a VideoFieldRepresentation")]
    NotAVfr,
    #[error("field {0} has no descriptor")]
    MissingDescriptor(u64),
    #[error("cancelled by caller")]
    Cancelled,
    #[error("writing {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("encoding {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

pub struct RawFieldSinkStage {
    node_type: NodeTypeInfo,
    parameters: BTreeMap<String, ParameterValue>,
    state: SharedTriggerState,
}

impl Default for RawFieldSinkStage {
    fn default() -> Self {
        Self::new()
    }
}

impl RawFieldSinkStage {
    #[must_use]
    pub fn new() -> Self {
        Self {
            node_type: NodeTypeInfo::fixed_arity(NodeType::Sink, "raw_field_sink", 1, 0),
            parameters: BTreeMap::new(),
            state: SharedTriggerState::new(TriggerState::new()),
        }
    }

    fn path_param(&self, parameters: &BTreeMap<String, ParameterValue>, name: &str) -> Result<String, SinkError> {
        match parameters.get(name) {
            Some(ParameterValue::FilePath(path) | ParameterValue::String(path)) => Ok(path.clone()),
            _ => Err(SinkError::MissingParameter(name.to_string())),
        }
    }

    fn write_sink(
        &self,
        inputs: &[ArtifactHandle],
        parameters: &BTreeMap<String, ParameterValue>,
    ) -> Result<(), SinkError> {
        let samples_path = self.path_param(parameters, "samples_path")?;
        let metadata_path = self.path_param(parameters, "metadata_path")?;

        let vfr = inputs.first().and_then(|a| a.as_vfr()).ok_or(SinkError::NotAVfr)?;
        let field_count = vfr.field_count();

        let (width, height) = if field_count == 0 {
            (0, 0)
        } else {
            let desc = vfr
                .get_descriptor(FieldId::new(0))
                .ok_or(SinkError::MissingDescriptor(0))?;
            (desc.width, desc.height)
        };

        let mut samples = Vec::with_capacity(field_count * width as usize * height as usize * 2);
        let mut parity_hints = Vec::with_capacity(field_count);
        let mut dropout_hints = Vec::with_capacity(field_count);

        for i in 0..field_count {
            let id = FieldId::new(i as u64);
            if self.state.poll(i as u64, field_count as u64, &format!("writing field {i}")) {
                return Err(SinkError::Cancelled);
            }
            for sample in vfr.get_field(id) {
                samples.extend_from_slice(&sample.to_le_bytes());
            }
            parity_hints.push(vfr.get_field_parity_hint(id));
            dropout_hints.push(vfr.get_dropout_hints(id));
        }

        std::fs::write(&samples_path, &samples).map_err(|source| SinkError::Io {
            path: samples_path.clone(),
            source,
        })?;

        let sidecar = RawFieldSidecar {
            field_count: field_count as u32,
            width,
            height,
            video_parameters: vfr.get_video_parameters(),
            parity_hints,
            dropout_hints,
        };
        let file = std::fs::File::create(&metadata_path).map_err(|source| SinkError::Io {
            path: metadata_path.clone(),
            source,
        })?;
        serde_json::to_writer(std::io::BufWriter::new(file), &sidecar).map_err(|source| SinkError::Json {
            path: metadata_path,
            source,
        })?;

        Ok(())
    }
}

impl ParameterizedStage for RawFieldSinkStage {
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

impl Stage for RawFieldSinkStage {
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
        0
    }

    fn execute(
        &self,
        inputs: &[ArtifactHandle],
        _parameters: &BTreeMap<String, ParameterValue>,
        _observation_context: &mut ObservationContext,
    ) -> Result<Vec<ArtifactHandle>, StageError> {
        if inputs.len() != 1 {
            return Err(StageError::InputCountMismatch { expected: 1, actual: inputs.len() });
        }
        if inputs[0].as_vfr().is_none() {
            return Err(StageError::InputTypeMismatch {
                index: 0,
                expected: "VideoFieldRepresentation".to_string(),
                actual: inputs[0].type_name().to_string(),
            });
        }
        Ok(Vec::new())
    }

    fn as_triggerable(&self) -> Option<&dyn TriggerableStage> {
        Some(self)
    }
}

impl TriggerableStage for RawFieldSinkStage {
    fn trigger(
        &self,
        inputs: &[ArtifactHandle],
        parameters: &BTreeMap<String, ParameterValue>,
        _observation_context: &mut ObservationContext,
    ) -> bool {
        self.state.begin();
        let result = self.write_sink(inputs, parameters);
        let success = result.is_ok();
        if let Err(e) = &result {
            log::warn!("raw_field_sink trigger failed: {e}");
        }
        self.state.finish(success);
        success
    }

    fn trigger_status(&self) -> String {
        self.state.status()
    }

    fn set_progress_callback(&self, callback: ProgressCallback) {
        self.state.set_progress_callback(callback);
    }

    fn is_trigger_in_progress(&self) -> bool {
        self.state.is_in_progress()
    }

    fn cancel_trigger(&self) {
        self.state.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orc_artifact::concrete::{FieldData, MemoryFieldRepresentation};
    use orc_artifact::Provenance;
    use std::sync::Arc;

    fn sample_source() -> ArtifactHandle {
        let field = FieldData::new(2, 2, vec![10, 20, 30, 40], None, Vec::new()).unwrap();
        Arc::new(MemoryFieldRepresentation::new(Provenance::new("source", "1.0"), vec![field], None))
    }

    #[test]
    fn trigger_writes_samples_and_sidecar() {
        let dir = std::env::temp_dir().join(format!("orc-sink-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let samples_path = dir.join("out.raw");
        let metadata_path = dir.join("out.json");

        let stage = RawFieldSinkStage::new();
        let mut parameters = BTreeMap::new();
        parameters.insert(
            "samples_path".to_string(),
            ParameterValue::FilePath(samples_path.to_string_lossy().to_string()),
        );
        parameters.insert(
            "metadata_path".to_string(),
            ParameterValue::FilePath(metadata_path.to_string_lossy().to_string()),
        );

        let mut obs = ObservationContext::new();
        let ok = stage.trigger(&[sample_source()], &parameters, &mut obs);
        assert!(ok);
        assert!(samples_path.exists());
        assert!(metadata_path.exists());
        assert!(stage.trigger_status().contains("completed"));

        let bytes = std::fs::read(&samples_path).unwrap();
        assert_eq!(bytes.len(), 8);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn cancel_before_trigger_stops_on_first_field() {
        let dir = std::env::temp_dir().join(format!("orc-sink-cancel-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let samples_path = dir.join("out.raw");
        let metadata_path = dir.join("out.json");

        let stage = RawFieldSinkStage::new();
        // `trigger` calls `TriggerState::begin()` first, which clears any
        // cancel flag set before the call — cancelling has to happen from
        // inside the run, so the callback requests it on its first poll.
        let cancelled_state = Arc::clone(&stage.state);
        stage.set_progress_callback(Box::new(move |_current, _total, _message| {
            cancelled_state.cancel();
        }));
        let mut parameters = BTreeMap::new();
        parameters.insert(
            "samples_path".to_string(),
            ParameterValue::FilePath(samples_path.to_string_lossy().to_string()),
        );
        parameters.insert(
            "metadata_path".to_string(),
            ParameterValue::FilePath(metadata_path.to_string_lossy().to_string()),
        );

        let mut obs = ObservationContext::new();
        let ok = stage.trigger(&[sample_source()], &parameters, &mut obs);
        assert!(!ok);
        assert!(stage.trigger_status().contains("cancel"));
        assert!(!samples_path.exists(), "cancelling on field 0 must stop before any file is written");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn execute_rejects_non_vfr_input() {
        let stage = RawFieldSinkStage::new();
        struct NotAVfr {
            id: orc_core::ArtifactId,
            provenance: orc_artifact::Provenance,
        }
        impl orc_artifact::Artifact for NotAVfr {
            fn type_name(&self) -> &str {
                "NotAVfr"
            }
            fn id(&self) -> &orc_core::ArtifactId {
                &self.id
            }
            fn provenance(&self) -> &orc_artifact::Provenance {
                &self.provenance
            }
        }
        let bogus: ArtifactHandle = Arc::new(NotAVfr {
            id: orc_core::ArtifactId::new("bogus".to_string()),
            provenance: Provenance::new("bogus", "1.0"),
        });
        let mut obs = ObservationContext::new();
        let result = stage.execute(&[bogus], &BTreeMap::new(), &mut obs);
        assert!(matches!(result, Err(StageError::InputTypeMismatch { .. })));
    }
}
