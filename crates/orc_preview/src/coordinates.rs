//! Coordinate-mapping API for GUI overlays (spec §4.5 "Coordinate
//! mapping API"): `navigate_frame_line`, `map_image_to_field`,
//! `map_field_to_image`, `get_frame_fields`, `equivalent_index`.

use crate::weave::{first_frame_field_offset, weave_layout_for_frame};
use orc_artifact::vfr::VideoFieldRepresentation;
use orc_core::preview::{
    FieldToImageMappingResult, FrameFieldsResult, FrameLineNavigationResult,
    ImageToFieldMappingResult, PreviewOutputType,
};
use orc_core::FieldId;

/// Direction of a single-line step in `navigate_frame_line`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// Frame index a given field belongs to, honoring the parity-derived
/// first-frame offset (spec §4.5 step 3).
#[must_use]
pub fn frame_index_for_field(source: &dyn VideoFieldRepresentation, field: FieldId) -> u64 {
    let offset = first_frame_field_offset(source);
    field.value().saturating_sub(offset) / 2
}

/// Moves one image line up or down within the current output type,
/// crossing field boundaries as needed (spec §4.5: "must correctly
/// handle the extra line at the bottom of the longer field").
#[must_use]
pub fn navigate_frame_line(
    source: &dyn VideoFieldRepresentation,
    output_type: PreviewOutputType,
    current_field: FieldId,
    current_line: u32,
    direction: Direction,
) -> FrameLineNavigationResult {
    if !output_type.is_frame_like() {
        let delta: i64 = if direction == Direction::Up { -1 } else { 1 };
        let next_line = i64::from(current_line) + delta;
        let Some(desc) = source.get_descriptor(current_field) else {
            return FrameLineNavigationResult { field: current_field, line: current_line, is_valid: false };
        };
        if next_line < 0 || next_line >= i64::from(desc.height) {
            return FrameLineNavigationResult { field: current_field, line: current_line, is_valid: false };
        }
        return FrameLineNavigationResult {
            field: current_field,
            line: next_line as u32,
            is_valid: true,
        };
    }

    let reversed = output_type == PreviewOutputType::FrameReversed;
    let frame_index = frame_index_for_field(source, current_field);
    let Some(layout) = weave_layout_for_frame(source, frame_index, reversed) else {
        return FrameLineNavigationResult { field: current_field, line: current_line, is_valid: false };
    };
    let Some(image_y) = layout.field_to_image(current_field, current_line) else {
        return FrameLineNavigationResult { field: current_field, line: current_line, is_valid: false };
    };

    let delta: i64 = if direction == Direction::Up { -1 } else { 1 };
    let next_y = i64::from(image_y) + delta;
    if next_y < 0 || next_y >= i64::from(layout.total_height()) {
        return FrameLineNavigationResult { field: current_field, line: current_line, is_valid: false };
    }

    match layout.image_to_field(next_y as u32) {
        Some((field, line)) => FrameLineNavigationResult { field, line, is_valid: true },
        None => FrameLineNavigationResult { field: current_field, line: current_line, is_valid: false },
    }
}

/// Inverse of weaving: which field/line contributes to image row
/// `image_y` of `output_index`'s rendering (spec §4.5).
#[must_use]
pub fn map_image_to_field(
    source: &dyn VideoFieldRepresentation,
    output_type: PreviewOutputType,
    output_index: u64,
    image_y: u32,
) -> Option<ImageToFieldMappingResult> {
    match output_type {
        PreviewOutputType::Frame | PreviewOutputType::FrameReversed => {
            let reversed = output_type == PreviewOutputType::FrameReversed;
            let layout = weave_layout_for_frame(source, output_index, reversed)?;
            let (field, line) = layout.image_to_field(image_y)?;
            Some(ImageToFieldMappingResult { field_index: field, field_line: line })
        }
        PreviewOutputType::Split => {
            let field_a = FieldId::new(output_index * 2);
            let field_b = FieldId::new(field_a.value() + 1);
            let desc_a = source.get_descriptor(field_a)?;
            if image_y < desc_a.height {
                Some(ImageToFieldMappingResult { field_index: field_a, field_line: image_y })
            } else {
                Some(ImageToFieldMappingResult {
                    field_index: field_b,
                    field_line: image_y - desc_a.height,
                })
            }
        }
        _ => Some(ImageToFieldMappingResult {
            field_index: FieldId::new(output_index),
            field_line: image_y,
        }),
    }
}

/// Exact inverse of [`map_image_to_field`].
#[must_use]
pub fn map_field_to_image(
    source: &dyn VideoFieldRepresentation,
    output_type: PreviewOutputType,
    field_index: FieldId,
    field_line: u32,
) -> Option<FieldToImageMappingResult> {
    match output_type {
        PreviewOutputType::Frame | PreviewOutputType::FrameReversed => {
            let reversed = output_type == PreviewOutputType::FrameReversed;
            let frame_index = frame_index_for_field(source, field_index);
            let layout = weave_layout_for_frame(source, frame_index, reversed)?;
            let image_y = layout.field_to_image(field_index, field_line)?;
            Some(FieldToImageMappingResult { image_y })
        }
        PreviewOutputType::Split => {
            let field_a = FieldId::new((field_index.value() / 2) * 2);
            let desc_a = source.get_descriptor(field_a)?;
            if field_index == field_a {
                Some(FieldToImageMappingResult { image_y: field_line })
            } else {
                Some(FieldToImageMappingResult { image_y: desc_a.height + field_line })
            }
        }
        _ => Some(FieldToImageMappingResult { image_y: field_line }),
    }
}

/// The two field indices composing `frame_index`, honoring the
/// parity-derived offset (spec §4.5).
#[must_use]
pub fn get_frame_fields(source: &dyn VideoFieldRepresentation, frame_index: u64) -> FrameFieldsResult {
    let offset = first_frame_field_offset(source);
    let first_field = FieldId::new(offset + frame_index * 2);
    let second_field = FieldId::new(first_field.value() + 1);
    FrameFieldsResult { first_field, second_field }
}

/// Converts an index between a field-granularity output type and a
/// frame-granularity one (spec §4.5 "Equivalent-index conversion").
/// Same-category conversions are the identity.
#[must_use]
pub fn equivalent_index(from_type: PreviewOutputType, from_index: u64, to_type: PreviewOutputType) -> u64 {
    match (from_type.is_frame_like(), to_type.is_frame_like()) {
        (true, false) => from_index * 2,
        (false, true) => from_index / 2,
        _ => from_index,
    }
}
