//! `VideoFieldRepresentation` (spec §3/§4.1): a finite, restartable,
//! indexed collection of fields.

use crate::Artifact;
use orc_core::{DropoutRegion, FieldId, FieldParityHint, VideoParameters};
use std::sync::Arc;

/// Shared, type-erased handle to a VFR. Wrappers hold one of these as
/// their "source"; the executor's cache and every downstream
/// consumer may hold the same handle simultaneously (spec §3 "shared
/// ownership; lifetime = longest holder").
pub type VfrHandle = Arc<dyn VideoFieldRepresentation>;

/// Dimensions of a single field, in 16-bit samples (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub width: u32,
    pub height: u32,
}

/// The dominant artifact shape: a lazily-computed, indexed collection
/// of video fields plus side-channel metadata.
///
/// Concrete (source) VFRs implement every method directly. Wrapper
/// VFRs instead override [`wrapped_source`](Self::wrapped_source) to
/// point at the VFR they compose over, plus whichever methods they
/// actually change — every other method's default body forwards to
/// the wrapped source, so a wrapper that e.g. only changes
/// [`get_dropout_hints`](Self::get_dropout_hints) need write nothing
/// else (spec §3 "VFR wrapper (lazy composition)").
pub trait VideoFieldRepresentation: Artifact {
    /// `Some(source)` for a wrapper VFR forwarding to another VFR,
    /// `None` for a VFR that owns its own sample data. The default
    /// bodies below use this as their sole means of delegation, so a
    /// concrete source VFR overriding every accessor never needs to
    /// implement this at all.
    fn wrapped_source(&self) -> Option<&VfrHandle> {
        None
    }

    fn field_count(&self) -> usize {
        self.wrapped_source().map_or(0, |s| s.field_count())
    }

    fn has_field(&self, id: FieldId) -> bool {
        (id.value() as usize) < self.field_count()
    }

    fn get_descriptor(&self, id: FieldId) -> Option<FieldDescriptor> {
        self.wrapped_source().and_then(|s| s.get_descriptor(id))
    }

    fn get_line(&self, id: FieldId, line: u32) -> Option<&[u16]> {
        self.wrapped_source().and_then(|s| s.get_line(id, line))
    }

    /// Materializes a full field contiguously, row-major. The default
    /// implementation stitches it together from [`get_line`], so a
    /// wrapper overriding only `get_line` automatically gets a correct
    /// `get_field` for free.
    fn get_field(&self, id: FieldId) -> Vec<u16> {
        let Some(desc) = self.get_descriptor(id) else {
            return Vec::new();
        };
        let mut out = Vec::with_capacity(desc.width as usize * desc.height as usize);
        for line in 0..desc.height {
            if let Some(samples) = self.get_line(id, line) {
                out.extend_from_slice(samples);
            }
        }
        out
    }

    fn get_video_parameters(&self) -> Option<VideoParameters> {
        self.wrapped_source().and_then(|s| s.get_video_parameters())
    }

    fn get_field_parity_hint(&self, id: FieldId) -> Option<FieldParityHint> {
        self.wrapped_source()
            .and_then(|s| s.get_field_parity_hint(id))
    }

    fn get_dropout_hints(&self, id: FieldId) -> Vec<DropoutRegion> {
        self.wrapped_source()
            .map_or_else(Vec::new, |s| s.get_dropout_hints(id))
    }

    /// Whether luma and chroma are addressable as separate lanes. When
    /// false (the common case), `get_line_luma`/`get_line_chroma` and
    /// their field-level counterparts fall back to the unified
    /// `get_line`/`get_field` unchanged (spec §3 invariant).
    fn has_separate_channels(&self) -> bool {
        self.wrapped_source()
            .is_some_and(|s| s.has_separate_channels())
    }

    fn get_line_luma(&self, id: FieldId, line: u32) -> Option<&[u16]> {
        if self.has_separate_channels() {
            self.wrapped_source().and_then(|s| s.get_line_luma(id, line))
        } else {
            self.get_line(id, line)
        }
    }

    fn get_line_chroma(&self, id: FieldId, line: u32) -> Option<&[u16]> {
        if self.has_separate_channels() {
            self.wrapped_source()
                .and_then(|s| s.get_line_chroma(id, line))
        } else {
            self.get_line(id, line)
        }
    }

    fn get_field_luma(&self, id: FieldId) -> Vec<u16> {
        if self.has_separate_channels() {
            self.wrapped_source()
                .map_or_else(Vec::new, |s| s.get_field_luma(id))
        } else {
            self.get_field(id)
        }
    }

    fn get_field_chroma(&self, id: FieldId) -> Vec<u16> {
        if self.has_separate_channels() {
            self.wrapped_source()
                .map_or_else(Vec::new, |s| s.get_field_chroma(id))
        } else {
            self.get_field(id)
        }
    }
}
