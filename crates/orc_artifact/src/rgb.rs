//! `RGBFieldRepresentation` (spec §4.1 "RGB-valued VFRs"): a VFR whose
//! sample lanes carry packed 16-bit RGB instead of luma, produced by
//! chroma decoders. The preview renderer special-cases this exact
//! `type_name()` to skip IRE scaling and weaving (spec §4.5
//! "RGBFieldRepresentation fast path").

use crate::artifact::{Artifact, Provenance};
use crate::vfr::{FieldDescriptor, VideoFieldRepresentation};
use orc_core::{ArtifactId, DropoutRegion, FieldId};

/// The exact `type_name()` the preview renderer matches against to
/// take the RGB fast path. Not `const` on the trait because
/// `type_name` is a `&str`-returning method, not an associated
/// constant — exposed here so call sites compare against one source
/// of truth instead of a repeated string literal.
pub const TYPE_NAME: &str = "RGBFieldRepresentation";

#[derive(Debug, Clone)]
pub struct RgbField {
    /// Width in pixels (not samples — each pixel is 3 interleaved samples).
    pub pixel_width: u32,
    pub height: u32,
    /// Row-major, interleaved R, G, B: `pixel_width * height * 3` samples.
    pub samples: Vec<u16>,
    pub dropout_hints: Vec<DropoutRegion>,
}

/// A pre-decoded RGB frame/field laid out as interleaved 16-bit RGB
/// samples, addressed through the same field API as a luma VFR.
pub struct RgbFieldRepresentation {
    id: ArtifactId,
    provenance: Provenance,
    fields: Vec<RgbField>,
}

impl RgbFieldRepresentation {
    #[must_use]
    pub fn new(provenance: Provenance, fields: Vec<RgbField>) -> Self {
        let id = provenance.compute_id();
        Self {
            id,
            provenance,
            fields,
        }
    }
}

impl Artifact for RgbFieldRepresentation {
    fn type_name(&self) -> &str {
        TYPE_NAME
    }

    fn id(&self) -> &ArtifactId {
        &self.id
    }

    fn provenance(&self) -> &Provenance {
        &self.provenance
    }

    fn as_vfr(&self) -> Option<&dyn VideoFieldRepresentation> {
        Some(self)
    }

    fn as_vfr_handle(self: std::sync::Arc<Self>) -> Option<crate::vfr::VfrHandle> {
        Some(self)
    }
}

impl VideoFieldRepresentation for RgbFieldRepresentation {
    fn field_count(&self) -> usize {
        self.fields.len()
    }

    fn get_descriptor(&self, id: FieldId) -> Option<FieldDescriptor> {
        self.fields.get(id.value() as usize).map(|f| FieldDescriptor {
            width: f.pixel_width * 3,
            height: f.height,
        })
    }

    fn get_line(&self, id: FieldId, line: u32) -> Option<&[u16]> {
        let field = self.fields.get(id.value() as usize)?;
        if line >= field.height {
            return None;
        }
        let row_samples = field.pixel_width as usize * 3;
        let start = line as usize * row_samples;
        field.samples.get(start..start + row_samples)
    }

    fn get_dropout_hints(&self, id: FieldId) -> Vec<DropoutRegion> {
        self.fields
            .get(id.value() as usize)
            .map(|f| f.dropout_hints.clone())
            .unwrap_or_default()
    }
}
