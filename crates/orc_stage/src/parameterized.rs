//! `ParameterizedStage` capability mixin (spec §4.2). Modeled as its
//! own small trait rather than folded into `Stage`, per §9's explicit
//! design note that mixins stay separate capability interfaces.

use orc_core::{ParameterDescriptor, ParameterError, ParameterValue, VideoSystem};
use std::collections::BTreeMap;

/// Adds a typed parameter schema to a stage. Validation happens at
/// `set_parameters` time; `execute` may assume already-validated
/// parameters (spec §4.2).
pub trait ParameterizedStage {
    /// May vary with the project's video system and the source kind
    /// (spec §4.2: "may vary with the project's video system (NTSC/PAL)
    /// and the source kind").
    fn parameter_descriptors(
        &self,
        project_format: VideoSystem,
        source_type: &str,
    ) -> Vec<ParameterDescriptor>;

    fn get_parameters(&self) -> BTreeMap<String, ParameterValue>;

    /// Returns `Err` (and leaves the stage's parameters unchanged) if
    /// any parameter fails validation: type mismatch, constraint
    /// violation, or unknown name (spec §4.2, §7 "Propagation policy").
    fn set_parameters(
        &mut self,
        parameters: BTreeMap<String, ParameterValue>,
    ) -> Result<(), ParameterError>;
}

/// Shared validation helper every `set_parameters` implementation in
/// this workspace calls: validates `proposed` against
/// `parameter_descriptors(VideoSystem::Unknown, "")`-shaped
/// descriptors and fills in defaults for anything missing.
pub fn validate_against(
    descriptors: &[ParameterDescriptor],
    proposed: BTreeMap<String, ParameterValue>,
) -> Result<BTreeMap<String, ParameterValue>, ParameterError> {
    orc_core::parameter::validate_parameters(descriptors, &proposed)
}
