//! Field-parity inverter wrapper (spec §3): flips `is_first_field` on
//! every field's parity hint, used to correct or test misdetected
//! parity without touching sample data.

use crate::artifact::{Artifact, Provenance};
use crate::vfr::{VfrHandle, VideoFieldRepresentation};
use orc_core::{ArtifactId, FieldId, FieldParityHint};

pub struct ParityInvertWrapper {
    source: VfrHandle,
    id: ArtifactId,
    provenance: Provenance,
}

impl ParityInvertWrapper {
    #[must_use]
    pub fn new(source: VfrHandle, stage_version: impl Into<String>) -> Self {
        let provenance = Provenance::new("parity_invert", stage_version)
            .with_input_ids(vec![source.id().clone()]);
        let id = provenance.compute_id();
        Self {
            source,
            id,
            provenance,
        }
    }
}

impl Artifact for ParityInvertWrapper {
    fn type_name(&self) -> &str {
        "ParityInvertWrapper"
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

impl VideoFieldRepresentation for ParityInvertWrapper {
    fn wrapped_source(&self) -> Option<&VfrHandle> {
        Some(&self.source)
    }

    fn get_field_parity_hint(&self, id: FieldId) -> Option<FieldParityHint> {
        self.source.get_field_parity_hint(id).map(|hint| FieldParityHint {
            is_first_field: !hint.is_first_field,
        })
    }
}
