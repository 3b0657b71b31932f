//! Stage wrappers around `orc_artifact::wrappers::*` (spec §1: "the
//! four wrapper stages spec.md §3 names by name"). Each is a
//! one-input/one-output `Transform` whose `execute` resolves its
//! input to a `VfrHandle` and hands it to the matching VFR wrapper
//! constructor.

pub mod dropout_hint;
pub mod field_offset;
pub mod line_mask;
pub mod parity_invert;

pub use dropout_hint::DropoutHintStage;
pub use field_offset::FieldOffsetStage;
pub use line_mask::LineMaskStage;
pub use parity_invert::ParityInvertStage;

use orc_artifact::{Artifact, ArtifactHandle, VfrHandle};
use orc_stage::StageError;

/// Resolves a single-input stage's input to an owned `VfrHandle`,
/// shared by every wrapper stage's `execute`.
pub(crate) fn resolve_single_input(inputs: &[ArtifactHandle]) -> Result<VfrHandle, StageError> {
    if inputs.len() != 1 {
        return Err(StageError::InputCountMismatch {
            expected: 1,
            actual: inputs.len(),
        });
    }
    inputs[0].clone().as_vfr_handle().ok_or_else(|| StageError::InputTypeMismatch {
        index: 0,
        expected: "VideoFieldRepresentation".to_string(),
        actual: inputs[0].type_name().to_string(),
    })
}
