//! Foundational types shared by every crate in the workspace.
//!
//! Nothing in here knows about fields, samples, DAGs, or stages — just
//! the ids, the parameter schema, and the small wire-level structs that
//! cross the GUI boundary (`PreviewImage` and friends live in
//! `orc_preview`, but the handful of types the stage contract itself
//! needs to mention — `DropoutRegion`, `VideoParameters` — live here so
//! that `orc_artifact` and `orc_stage` can both depend on them without
//! depending on each other).

pub mod fingerprint;
mod ids;
pub mod parameter;
pub mod preview;
mod video_params;

pub use ids::{ArtifactId, FieldId, NodeId};
pub use parameter::{
    ParameterConstraints, ParameterDescriptor, ParameterError, ParameterType, ParameterValue,
};
pub use preview::{
    AspectRatioMode, FieldToImageMappingResult, FrameFieldsResult, FrameLineNavigationResult,
    ImageToFieldMappingResult, PreviewImage, PreviewItemDisplayInfo, PreviewNavigationHint,
    PreviewOption, PreviewOutputInfo, PreviewOutputType, PreviewRenderResult, SuggestedViewNode,
};
pub use video_params::{VideoParameters, VideoSystem};

/// A single observed dropout extent on a field.
///
/// Invariant (spec §3): `line < descriptor.height` and
/// `start_sample <= end_sample <= descriptor.width`. The type itself
/// does not enforce this — it is a plain data carrier — producers are
/// expected to uphold it; `DAGExecutor`/`PreviewRenderer` clip rather
/// than panic if they ever see a violation (see `orc_preview::renderer`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct DropoutRegion {
    pub line: u32,
    pub start_sample: u32,
    pub end_sample: u32,
}

/// Which of the two fields of a frame a field represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FieldParityHint {
    pub is_first_field: bool,
}
