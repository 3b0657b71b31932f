//! A concrete, in-memory source VFR used by `orc_stages_builtin`'s
//! source stage and by tests across the workspace. Holds its own
//! 16-bit sample data; every accessor is a direct lookup rather than
//! a forward (it has no `wrapped_source`).

use crate::artifact::{Artifact, ArtifactError, Provenance};
use crate::vfr::{FieldDescriptor, VideoFieldRepresentation};
use orc_core::{ArtifactId, DropoutRegion, FieldId, FieldParityHint, VideoParameters};

/// One field's worth of owned sample data plus its side-channel
/// metadata.
#[derive(Debug, Clone)]
pub struct FieldData {
    pub width: u32,
    pub height: u32,
    /// Row-major, `width * height` samples.
    pub samples: Vec<u16>,
    pub parity_hint: Option<FieldParityHint>,
    pub dropout_hints: Vec<DropoutRegion>,
}

impl FieldData {
    /// Validates that `samples.len() == width * height` (spec §3
    /// invariant on `get_line`/`get_descriptor` consistency).
    pub fn new(
        width: u32,
        height: u32,
        samples: Vec<u16>,
        parity_hint: Option<FieldParityHint>,
        dropout_hints: Vec<DropoutRegion>,
    ) -> Result<Self, ArtifactError> {
        let expected = width as usize * height as usize;
        if samples.len() != expected {
            return Err(ArtifactError::FieldHeightMismatch {
                field: 0,
                declared: height,
                actual: (samples.len() / width.max(1) as usize) as u32,
            });
        }
        Ok(Self {
            width,
            height,
            samples,
            parity_hint,
            dropout_hints,
        })
    }
}

/// Owns its own field sample data. The canonical example of a
/// non-wrapper VFR: every method below is a direct lookup, nothing is
/// forwarded.
pub struct MemoryFieldRepresentation {
    id: ArtifactId,
    provenance: Provenance,
    fields: Vec<FieldData>,
    video_parameters: Option<VideoParameters>,
}

impl MemoryFieldRepresentation {
    #[must_use]
    pub fn new(
        provenance: Provenance,
        fields: Vec<FieldData>,
        video_parameters: Option<VideoParameters>,
    ) -> Self {
        let id = provenance.compute_id();
        Self {
            id,
            provenance,
            fields,
            video_parameters,
        }
    }
}

impl Artifact for MemoryFieldRepresentation {
    fn type_name(&self) -> &str {
        "MemoryFieldRepresentation"
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

impl VideoFieldRepresentation for MemoryFieldRepresentation {
    fn field_count(&self) -> usize {
        self.fields.len()
    }

    fn get_descriptor(&self, id: FieldId) -> Option<FieldDescriptor> {
        self.fields.get(id.value() as usize).map(|f| FieldDescriptor {
            width: f.width,
            height: f.height,
        })
    }

    fn get_line(&self, id: FieldId, line: u32) -> Option<&[u16]> {
        let field = self.fields.get(id.value() as usize)?;
        if line >= field.height {
            return None;
        }
        let start = line as usize * field.width as usize;
        let end = start + field.width as usize;
        field.samples.get(start..end)
    }

    fn get_field(&self, id: FieldId) -> Vec<u16> {
        self.fields
            .get(id.value() as usize)
            .map(|f| f.samples.clone())
            .unwrap_or_default()
    }

    fn get_video_parameters(&self) -> Option<VideoParameters> {
        self.video_parameters.clone()
    }

    fn get_field_parity_hint(&self, id: FieldId) -> Option<FieldParityHint> {
        self.fields.get(id.value() as usize).and_then(|f| f.parity_hint)
    }

    fn get_dropout_hints(&self, id: FieldId) -> Vec<DropoutRegion> {
        self.fields
            .get(id.value() as usize)
            .map(|f| f.dropout_hints.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_field(height: u32, width: u32) -> FieldData {
        FieldData::new(width, height, vec![0u16; (width * height) as usize], None, Vec::new())
            .unwrap()
    }

    #[test]
    fn descriptor_matches_constructed_dimensions() {
        let provenance = Provenance::new("test_source", "1.0");
        let vfr = MemoryFieldRepresentation::new(provenance, vec![sample_field(4, 8)], None);
        let desc = vfr.get_descriptor(FieldId::new(0)).unwrap();
        assert_eq!((desc.width, desc.height), (8, 4));
    }

    #[test]
    fn out_of_range_field_is_none() {
        let provenance = Provenance::new("test_source", "1.0");
        let vfr = MemoryFieldRepresentation::new(provenance, vec![sample_field(4, 8)], None);
        assert!(vfr.get_descriptor(FieldId::new(1)).is_none());
        assert!(vfr.get_line(FieldId::new(1), 0).is_none());
    }

    #[test]
    fn has_field_matches_field_count_invariant() {
        let provenance = Provenance::new("test_source", "1.0");
        let vfr = MemoryFieldRepresentation::new(
            provenance,
            vec![sample_field(4, 8), sample_field(4, 8)],
            None,
        );
        assert!(vfr.has_field(FieldId::new(0)));
        assert!(vfr.has_field(FieldId::new(1)));
        assert!(!vfr.has_field(FieldId::new(2)));
    }

    #[test]
    fn get_line_has_declared_width() {
        let provenance = Provenance::new("test_source", "1.0");
        let vfr = MemoryFieldRepresentation::new(provenance, vec![sample_field(4, 8)], None);
        assert_eq!(vfr.get_line(FieldId::new(0), 0).unwrap().len(), 8);
    }
}
