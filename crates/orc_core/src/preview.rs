//! Wire-level preview types shared by the stage contract
//! (`PreviewableStage` in `orc_stage`) and the preview renderer
//! (`orc_preview`). Living in `orc_core` lets both depend on these
//! shapes without depending on each other (spec §4.2/§4.5, §6).

use crate::{DropoutRegion, FieldId, NodeId};

/// Which rendering the caller wants out of a node (spec §4.5 "Output
/// types the renderer exposes").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum PreviewOutputType {
    Field,
    Frame,
    FrameReversed,
    Split,
    Luma,
    Chroma,
    Composite,
}

impl PreviewOutputType {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            PreviewOutputType::Field => "Field",
            PreviewOutputType::Frame => "Frame",
            PreviewOutputType::FrameReversed => "Frame (Reversed)",
            PreviewOutputType::Split => "Split",
            PreviewOutputType::Luma => "Luma",
            PreviewOutputType::Chroma => "Chroma",
            PreviewOutputType::Composite => "Composite",
        }
    }

    /// True for the two types that weave two fields into one frame.
    #[must_use]
    pub const fn is_frame_like(self) -> bool {
        matches!(self, PreviewOutputType::Frame | PreviewOutputType::FrameReversed)
    }

    /// True for the types `DAR 4:3` mode width-scales (spec §4.5); the
    /// `Split` view keeps both fields at native width for comparison,
    /// and `Chroma`/`Composite` aren't rendered by the default VFR path.
    #[must_use]
    pub const fn is_dar_correctable(self) -> bool {
        matches!(
            self,
            PreviewOutputType::Field | PreviewOutputType::Frame | PreviewOutputType::FrameReversed | PreviewOutputType::Luma
        )
    }
}

/// `SAR 1:1` (no correction) or `DAR 4:3` (applies the roughly 0.7
/// width scale for PAL/NTSC sample aspect ratio), spec §4.5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum AspectRatioMode {
    #[default]
    Sar1x1,
    Dar4x3,
}

/// Whether the renderer promises monotonic index access (`Sequential`,
/// a stage may prefetch) or scrubs arbitrarily (`Random`, a stage
/// should avoid prefetch) — spec §4.5 "Previewable stages".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum PreviewNavigationHint {
    Sequential,
    #[default]
    Random,
}

/// The rendered RGB image handed to a GUI (spec §6 "PreviewImage").
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewImage {
    pub width: u32,
    pub height: u32,
    /// Row-major, interleaved 8-bit R, G, B: `width * height * 3` bytes.
    pub rgb_data: Vec<u8>,
    /// Dropout regions already remapped into this image's coordinate
    /// system, for overlay rendering by the GUI (or already burned in
    /// if `show_dropouts` was enabled at render time).
    pub dropout_regions: Vec<DropoutRegion>,
}

impl PreviewImage {
    #[must_use]
    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            rgb_data: vec![0u8; width as usize * height as usize * 3],
            dropout_regions: Vec::new(),
        }
    }
}

/// A named, stage-declared preview option (spec §4.5
/// "Previewable stages").
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PreviewOption {
    pub id: String,
    pub display_name: String,
    pub is_rgb: bool,
    pub width: u32,
    pub height: u32,
    pub count: u64,
    pub dar_aspect_correction: bool,
}

/// One row of `available_outputs` (spec §4.5 "Query API").
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PreviewOutputInfo {
    pub output_type: PreviewOutputType,
    pub display_name: String,
    pub count: u64,
    pub is_available: bool,
    pub dar_aspect_correction: bool,
    pub option_id: Option<String>,
    pub dropouts_available: bool,
    pub has_separate_channels: bool,
}

/// `suggested_view_node` result (spec §4.5).
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SuggestedViewNode {
    pub node_id: NodeId,
    pub has_nodes: bool,
    pub message: String,
}

/// `navigate_frame_line` result (spec §4.5 "Coordinate mapping API").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameLineNavigationResult {
    pub field: FieldId,
    pub line: u32,
    pub is_valid: bool,
}

/// `map_image_to_field` result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageToFieldMappingResult {
    pub field_index: FieldId,
    pub field_line: u32,
}

/// `map_field_to_image` result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldToImageMappingResult {
    pub image_y: u32,
}

/// `get_frame_fields` result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameFieldsResult {
    pub first_field: FieldId,
    pub second_field: FieldId,
}

/// `render_output`'s public, never-panics result shape (spec §7:
/// preview never propagates a `Result` to the GUI boundary).
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewRenderResult {
    pub success: bool,
    pub image: Option<PreviewImage>,
    pub error_message: Option<String>,
}

impl PreviewRenderResult {
    #[must_use]
    pub fn ok(image: PreviewImage) -> Self {
        Self {
            success: true,
            image: Some(image),
            error_message: None,
        }
    }

    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            image: None,
            error_message: Some(message.into()),
        }
    }
}

/// A human-readable struct backing `preview_item_display_info`
/// (spec §4.5 "Item-label helpers"), e.g. label
/// `"Frame 63 (125-126) / 250"`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PreviewItemDisplayInfo {
    pub label: String,
    pub index: u64,
    pub count: u64,
}
