//! Field/frame weaving and IRE-to-8-bit scaling (spec §4.5 "Render
//! algorithm for the default VFR path").
//!
//! These pixel algorithms are reproduced verbatim from the original's
//! `preview_renderer.cpp` rather than reinvented (SPEC_FULL §4.5): the
//! `tbc_sample_to_8bit` scaling formula, the weave parity rule, and
//! the 75%/25% dropout blend.

use orc_artifact::vfr::VideoFieldRepresentation;
use orc_core::{DropoutRegion, FieldId, VideoParameters};

/// Width scale applied by `DAR 4:3` aspect-ratio mode, the PAL/NTSC
/// sample aspect correction (spec §4.5).
pub const DAR_WIDTH_SCALE: f64 = 0.7;

/// `sample_8bit = clamp((sample_16b - black_16b) * 255 / (white_16b -
/// black_16b), 0, 255)`, falling back to an identity 16->8 shift if
/// `params` is `None` or degenerate (spec §4.5 step 2).
#[must_use]
pub fn sample_to_8bit(sample: u16, params: Option<&VideoParameters>) -> u8 {
    match params {
        Some(p) if p.ire_range() > 0 => {
            let scaled = f64::from(i32::from(sample) - p.black_16b_ire) * 255.0
                / f64::from(p.ire_range());
            scaled.round().clamp(0.0, 255.0) as u8
        }
        _ => (sample >> 8) as u8,
    }
}

/// A rendered 8-bit RGB buffer plus the dropout regions already
/// remapped into its coordinate system, prior to the dropout overlay
/// pass (spec §4.5 steps 2-4).
pub struct RenderedBuffer {
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
    pub dropouts: Vec<DropoutRegion>,
}

impl RenderedBuffer {
    #[must_use]
    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            rgb: vec![0u8; width as usize * height as usize * 3],
            dropouts: Vec::new(),
        }
    }

    fn set_pixel(&mut self, x: u32, y: u32, value: u8) {
        let idx = (y as usize * self.width as usize + x as usize) * 3;
        if let Some(slice) = self.rgb.get_mut(idx..idx + 3) {
            slice[0] = value;
            slice[1] = value;
            slice[2] = value;
        }
    }

    /// Alpha-blends a 75% red / 25% underlying overlay onto one row
    /// span, in-place (spec §4.5 step 5).
    fn blend_dropout_row(&mut self, y: u32, start_x: u32, end_x: u32) {
        if y >= self.height {
            return;
        }
        let end_x = end_x.min(self.width);
        for x in start_x.min(end_x)..end_x {
            let idx = (y as usize * self.width as usize + x as usize) * 3;
            if let Some(px) = self.rgb.get_mut(idx..idx + 3) {
                px[0] = (f64::from(px[0]) * 0.25 + 255.0 * 0.75).round() as u8;
                px[1] = (f64::from(px[1]) * 0.25).round() as u8;
                px[2] = (f64::from(px[2]) * 0.25).round() as u8;
            }
        }
    }

    pub fn apply_dropout_overlay(&mut self) {
        let dropouts = self.dropouts.clone();
        for region in dropouts {
            self.blend_dropout_row(region.line, region.start_sample, region.end_sample);
        }
    }

    /// Nearest-neighbor width rescale for DAR 4:3 display correction
    /// (spec §4.5 "a ≈0.7 width scale for PAL/NTSC sample aspect"),
    /// remapping dropout sample columns to the new width along the way.
    #[must_use]
    pub fn scale_width(mut self, factor: f64) -> Self {
        if self.width == 0 || (factor - 1.0).abs() < f64::EPSILON {
            return self;
        }
        let new_width = ((f64::from(self.width) * factor).round() as u32).max(1);
        let mut rgb = vec![0u8; new_width as usize * self.height as usize * 3];
        for y in 0..self.height {
            for x in 0..new_width {
                let src_x = (f64::from(x) * f64::from(self.width) / f64::from(new_width)) as u32;
                let src_x = src_x.min(self.width - 1);
                let src_idx = (y as usize * self.width as usize + src_x as usize) * 3;
                let dst_idx = (y as usize * new_width as usize + x as usize) * 3;
                if let (Some(src), Some(dst)) = (self.rgb.get(src_idx..src_idx + 3), rgb.get_mut(dst_idx..dst_idx + 3)) {
                    dst.copy_from_slice(src);
                }
            }
        }

        let rescale_sample = |sample: u32| ((f64::from(sample) * factor).round() as u32).min(new_width);
        for region in &mut self.dropouts {
            region.start_sample = rescale_sample(region.start_sample);
            region.end_sample = rescale_sample(region.end_sample);
        }

        self.width = new_width;
        self.rgb = rgb;
        self
    }
}

/// Renders a single field as-is (spec §4.5 step 2, also used for the
/// `Luma` output type).
pub fn render_field(source: &dyn VideoFieldRepresentation, field: FieldId) -> Option<RenderedBuffer> {
    let desc = source.get_descriptor(field)?;
    let params = source.get_video_parameters();
    let mut buffer = RenderedBuffer::blank(desc.width, desc.height);

    for line in 0..desc.height {
        let Some(samples) = source.get_line(field, line) else {
            continue;
        };
        for (x, &sample) in samples.iter().enumerate() {
            let value = sample_to_8bit(sample, params.as_ref());
            buffer.set_pixel(x as u32, line, value);
        }
    }

    buffer.dropouts = source.get_dropout_hints(field);
    Some(buffer)
}

/// Layout computed once per weave, shared by the renderer and the
/// coordinate-mapping API so both agree on where the "extra line"
/// goes (spec §4.5 step 3, "Field heights may differ by one line").
#[derive(Debug, Clone, Copy)]
pub struct WeaveLayout {
    pub field_a: FieldId,
    pub field_b: FieldId,
    pub height_a: u32,
    pub height_b: u32,
    /// `true` when field_a occupies even image rows.
    pub a_on_even: bool,
}

impl WeaveLayout {
    #[must_use]
    pub fn min_height(&self) -> u32 {
        self.height_a.min(self.height_b)
    }

    #[must_use]
    pub fn total_height(&self) -> u32 {
        self.height_a + self.height_b
    }

    /// Which field is longer (spec: "the longer field's extra line
    /// occupies the bottom row"). `None` when both are equal height.
    #[must_use]
    pub fn longer_field(&self) -> Option<FieldId> {
        use std::cmp::Ordering;
        match self.height_a.cmp(&self.height_b) {
            Ordering::Greater => Some(self.field_a),
            Ordering::Less => Some(self.field_b),
            Ordering::Equal => None,
        }
    }

    /// Image row for `(field, line)`, or `None` if out of range for
    /// that field.
    #[must_use]
    pub fn field_to_image(&self, field: FieldId, line: u32) -> Option<u32> {
        let min_h = self.min_height();
        let is_a = field == self.field_a;
        let is_b = field == self.field_b;
        if !is_a && !is_b {
            return None;
        }
        let height = if is_a { self.height_a } else { self.height_b };
        if line >= height {
            return None;
        }

        if line < min_h {
            let on_even = if is_a { self.a_on_even } else { !self.a_on_even };
            Some(2 * line + u32::from(!on_even))
        } else {
            // Extra-line range: only the longer field has lines here.
            Some(2 * min_h + (line - min_h))
        }
    }

    /// Inverse of [`field_to_image`](Self::field_to_image).
    #[must_use]
    pub fn image_to_field(&self, image_y: u32) -> Option<(FieldId, u32)> {
        if image_y >= self.total_height() {
            return None;
        }
        let min_h = self.min_height();
        if image_y < 2 * min_h {
            let pair_index = image_y / 2;
            let even_row = image_y % 2 == 0;
            let row_is_a = even_row == self.a_on_even;
            let field = if row_is_a { self.field_a } else { self.field_b };
            Some((field, pair_index))
        } else {
            let field = self.longer_field()?;
            let line = min_h + (image_y - 2 * min_h);
            Some((field, line))
        }
    }
}

/// Computes the `WeaveLayout` for `frame_index` of a VFR, honoring
/// field 0's parity hint to decide where frame 0 begins (spec §4.5
/// step 3, "first-field-offset"). `reversed` swaps which field lands
/// on even rows (the `Frame_Reversed` output type).
#[must_use]
pub fn weave_layout_for_frame(
    source: &dyn VideoFieldRepresentation,
    frame_index: u64,
    reversed: bool,
) -> Option<WeaveLayout> {
    let offset = first_frame_field_offset(source);
    let field_a = FieldId::new(offset + frame_index * 2);
    let field_b = FieldId::new(field_a.value() + 1);

    let desc_a = source.get_descriptor(field_a)?;
    let desc_b = source.get_descriptor(field_b)?;

    let a_is_first = source
        .get_field_parity_hint(field_a)
        .map_or(true, |hint| hint.is_first_field);
    let a_on_even = a_is_first != reversed;

    Some(WeaveLayout {
        field_a,
        field_b,
        height_a: desc_a.height,
        height_b: desc_b.height,
        a_on_even,
    })
}

/// Field offset at which frame 0 begins: 0 if field 0 is the first
/// field of its frame, 1 otherwise (spec §4.5: "otherwise the
/// renderer shifts by one field so frame 0 starts on a first-field
/// boundary").
#[must_use]
pub fn first_frame_field_offset(source: &dyn VideoFieldRepresentation) -> u64 {
    match source.get_field_parity_hint(FieldId::new(0)) {
        Some(hint) if !hint.is_first_field => 1,
        _ => 0,
    }
}

/// Renders `Frame`/`Frame_Reversed` (spec §4.5 step 3).
#[must_use]
pub fn render_frame(source: &dyn VideoFieldRepresentation, layout: &WeaveLayout) -> RenderedBuffer {
    let width = source
        .get_descriptor(layout.field_a)
        .map_or(0, |d| d.width)
        .max(source.get_descriptor(layout.field_b).map_or(0, |d| d.width));
    let height = layout.total_height();
    let params = source.get_video_parameters();
    let mut buffer = RenderedBuffer::blank(width, height);

    for image_y in 0..height {
        let Some((field, line)) = layout.image_to_field(image_y) else {
            continue;
        };
        let Some(samples) = source.get_line(field, line) else {
            continue;
        };
        for (x, &sample) in samples.iter().enumerate() {
            let value = sample_to_8bit(sample, params.as_ref());
            buffer.set_pixel(x as u32, image_y, value);
        }
    }

    let mut dropouts = Vec::new();
    for region in source.get_dropout_hints(layout.field_a) {
        if let Some(y) = layout.field_to_image(layout.field_a, region.line) {
            dropouts.push(DropoutRegion { line: y, ..region });
        }
    }
    for region in source.get_dropout_hints(layout.field_b) {
        if let Some(y) = layout.field_to_image(layout.field_b, region.line) {
            dropouts.push(DropoutRegion { line: y, ..region });
        }
    }
    buffer.dropouts = dropouts;
    buffer
}

/// Renders `Split`: field_a stacked above field_b (spec §4.5 step 4).
#[must_use]
pub fn render_split(
    source: &dyn VideoFieldRepresentation,
    field_a: FieldId,
    field_b: FieldId,
) -> Option<RenderedBuffer> {
    let desc_a = source.get_descriptor(field_a)?;
    let desc_b = source.get_descriptor(field_b)?;
    let width = desc_a.width.max(desc_b.width);
    let height = desc_a.height + desc_b.height;
    let params = source.get_video_parameters();
    let mut buffer = RenderedBuffer::blank(width, height);

    for line in 0..desc_a.height {
        if let Some(samples) = source.get_line(field_a, line) {
            for (x, &sample) in samples.iter().enumerate() {
                buffer.set_pixel(x as u32, line, sample_to_8bit(sample, params.as_ref()));
            }
        }
    }
    for line in 0..desc_b.height {
        if let Some(samples) = source.get_line(field_b, line) {
            for (x, &sample) in samples.iter().enumerate() {
                buffer.set_pixel(x as u32, desc_a.height + line, sample_to_8bit(sample, params.as_ref()));
            }
        }
    }

    let mut dropouts = source.get_dropout_hints(field_a);
    for region in source.get_dropout_hints(field_b) {
        dropouts.push(DropoutRegion {
            line: region.line + desc_a.height,
            ..region
        });
    }
    buffer.dropouts = dropouts;
    Some(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use orc_artifact::concrete::{FieldData, MemoryFieldRepresentation};
    use orc_artifact::{Provenance, VideoFieldRepresentation as _};
    use orc_core::{FieldParityHint, VideoSystem};
    use std::sync::Arc;

    fn params() -> VideoParameters {
        VideoParameters {
            system: VideoSystem::Ntsc,
            is_subcarrier_locked: true,
            is_widescreen: false,
            field_width: 4,
            field_height: 2,
            number_of_sequential_fields: 4,
            is_first_field_first: true,
            colour_burst_start: 0,
            colour_burst_end: 0,
            active_video_start: 0,
            active_video_end: 4,
            first_active_field_line: 0,
            last_active_field_line: 1,
            first_active_frame_line: 0,
            last_active_frame_line: 3,
            blanking_16b_ire: 0,
            black_16b_ire: 0,
            white_16b_ire: 0xFFFF,
            sample_rate: 0.0,
            fsc: 0.0,
            is_mapped: false,
            tape_format: String::new(),
            decoder: String::new(),
            git_branch: String::new(),
            git_commit: String::new(),
            active_area_cropping_applied: false,
        }
    }

    fn four_field_source() -> Arc<MemoryFieldRepresentation> {
        let fields = (0..4u16)
            .map(|i| {
                FieldData::new(
                    4,
                    2,
                    vec![0x4000 + (i << 8); 8],
                    Some(FieldParityHint { is_first_field: i % 2 == 0 }),
                    Vec::new(),
                )
                .unwrap()
            })
            .collect();
        Arc::new(MemoryFieldRepresentation::new(
            Provenance::new("source", "1.0"),
            fields,
            Some(params()),
        ))
    }

    #[test]
    fn frame_weave_places_field_0_on_even_rows() {
        let source = four_field_source();
        let layout = weave_layout_for_frame(source.as_ref(), 0, false).unwrap();
        let rendered = render_frame(source.as_ref(), &layout);

        let row0 = rendered.rgb[0];
        let row1 = rendered.rgb[4 * 3];
        assert_eq!(row0, 0x40);
        assert_eq!(row1, 0x41);
    }

    #[test]
    fn reversed_frame_swaps_rows() {
        let source = four_field_source();
        let layout = weave_layout_for_frame(source.as_ref(), 0, true).unwrap();
        let rendered = render_frame(source.as_ref(), &layout);

        let row0 = rendered.rgb[0];
        let row1 = rendered.rgb[4 * 3];
        assert_eq!(row0, 0x41);
        assert_eq!(row1, 0x40);
    }

    #[test]
    fn extra_line_of_longer_field_lands_at_the_bottom() {
        let layout = WeaveLayout {
            field_a: FieldId::new(0),
            field_b: FieldId::new(1),
            height_a: 2,
            height_b: 3,
            a_on_even: true,
        };
        assert_eq!(layout.total_height(), 5);
        assert_eq!(layout.image_to_field(4), Some((FieldId::new(1), 2)));
        assert_eq!(layout.field_to_image(FieldId::new(1), 2), Some(4));
    }

    #[test]
    fn weave_layout_round_trips_every_row() {
        let layout = WeaveLayout {
            field_a: FieldId::new(10),
            field_b: FieldId::new(11),
            height_a: 262,
            height_b: 263,
            a_on_even: true,
        };
        for y in 0..layout.total_height() {
            let (field, line) = layout.image_to_field(y).unwrap();
            assert_eq!(layout.field_to_image(field, line), Some(y));
        }
    }

    #[test]
    fn dropout_overlay_reddens_pixels() {
        let mut buffer = RenderedBuffer::blank(4, 1);
        buffer.rgb.fill(100);
        buffer.dropouts = vec![DropoutRegion { line: 0, start_sample: 1, end_sample: 3 }];
        buffer.apply_dropout_overlay();
        let px = &buffer.rgb[3..6];
        assert!(px[0] >= 191);
    }

    #[test]
    fn scale_width_shrinks_image_and_remaps_dropouts() {
        let mut buffer = RenderedBuffer::blank(10, 2);
        buffer.dropouts = vec![DropoutRegion { line: 0, start_sample: 4, end_sample: 8 }];
        let scaled = buffer.scale_width(DAR_WIDTH_SCALE);
        assert_eq!(scaled.width, 7);
        assert_eq!(scaled.height, 2);
        assert_eq!(scaled.rgb.len(), 7 * 2 * 3);
        assert_eq!(scaled.dropouts[0].start_sample, 3);
        assert_eq!(scaled.dropouts[0].end_sample, 6);
    }

    #[test]
    fn scale_width_is_a_no_op_at_factor_one() {
        let buffer = RenderedBuffer::blank(5, 3);
        let scaled = buffer.scale_width(1.0);
        assert_eq!(scaled.width, 5);
    }
}
