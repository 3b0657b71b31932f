//! The raw-sample-plus-JSON-sidecar wire format shared by
//! [`crate::memory_source::MemorySourceStage`] and
//! [`crate::raw_field_sink::RawFieldSinkStage`] (spec §4.4: a
//! simplified stand-in for the original's `.tbc`/`.db` pair).
//!
//! The samples file is raw 16-bit little-endian values, field-major
//! then row-major, with every field sharing one `width`/`height`. The
//! sidecar is a JSON document describing how to slice that file back
//! into fields.

use orc_core::{DropoutRegion, FieldParityHint, VideoParameters};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RawFieldSidecar {
    pub field_count: u32,
    pub width: u32,
    pub height: u32,
    pub video_parameters: Option<VideoParameters>,
    pub parity_hints: Vec<Option<FieldParityHint>>,
    pub dropout_hints: Vec<Vec<DropoutRegion>>,
}

impl RawFieldSidecar {
    #[must_use]
    pub fn samples_per_field(&self) -> usize {
        self.width as usize * self.height as usize
    }
}
