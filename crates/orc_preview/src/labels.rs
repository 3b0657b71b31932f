//! Human-readable item-label helpers (spec §4.5 "Item-label helpers"),
//! e.g. `"Frame 63 (125-126) / 250"`.

use orc_core::preview::{PreviewItemDisplayInfo, PreviewOutputType};
use orc_core::FieldId;

/// Builds the label string for one preview item.
#[must_use]
pub fn preview_item_label(
    output_type: PreviewOutputType,
    index: u64,
    count: u64,
    first_field: FieldId,
    second_field: FieldId,
) -> String {
    match output_type {
        PreviewOutputType::Frame => {
            format!(
                "Frame {index} ({}-{}) / {count}",
                first_field.value(),
                second_field.value()
            )
        }
        PreviewOutputType::FrameReversed => {
            format!(
                "Frame (Reversed) {index} ({}-{}) / {count}",
                second_field.value(),
                first_field.value()
            )
        }
        other => format!("{} {index} / {count}", other.name()),
    }
}

/// Structured counterpart of [`preview_item_label`].
#[must_use]
pub fn preview_item_display_info(
    output_type: PreviewOutputType,
    index: u64,
    count: u64,
    first_field: FieldId,
    second_field: FieldId,
) -> PreviewItemDisplayInfo {
    PreviewItemDisplayInfo {
        label: preview_item_label(output_type, index, count, first_field, second_field),
        index,
        count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_label_matches_expected_format() {
        let label = preview_item_label(
            PreviewOutputType::Frame,
            63,
            250,
            FieldId::new(125),
            FieldId::new(126),
        );
        assert_eq!(label, "Frame 63 (125-126) / 250");
    }

    #[test]
    fn reversed_frame_label_swaps_the_pair() {
        let label = preview_item_label(
            PreviewOutputType::FrameReversed,
            63,
            250,
            FieldId::new(125),
            FieldId::new(126),
        );
        assert_eq!(label, "Frame (Reversed) 63 (126-125) / 250");
    }

    #[test]
    fn field_label_has_no_pair() {
        let label = preview_item_label(PreviewOutputType::Field, 12, 500, FieldId::new(12), FieldId::new(13));
        assert_eq!(label, "Field 12 / 500");
    }
}
