//! Per-field-offset aligner wrapper (spec §3): re-indexes a source
//! VFR by a fixed field offset, used to align a capture whose first
//! usable field is not field 0 (e.g. dropping a leader field so frame
//! 0 starts on a first-field boundary).

use crate::artifact::{Artifact, Provenance};
use crate::vfr::{FieldDescriptor, VfrHandle, VideoFieldRepresentation};
use orc_core::{ArtifactId, DropoutRegion, FieldId, FieldParityHint};

pub struct FieldOffsetWrapper {
    source: VfrHandle,
    offset: u64,
    id: ArtifactId,
    provenance: Provenance,
}

impl FieldOffsetWrapper {
    #[must_use]
    pub fn new(source: VfrHandle, offset: u64, stage_version: impl Into<String>) -> Self {
        let mut parameters = std::collections::BTreeMap::new();
        parameters.insert(
            "offset".to_string(),
            orc_core::ParameterValue::UInt32(offset as u32),
        );
        let provenance = Provenance::new("field_offset", stage_version)
            .with_parameters(parameters)
            .with_input_ids(vec![source.id().clone()]);
        let id = provenance.compute_id();
        Self {
            source,
            offset,
            id,
            provenance,
        }
    }

    fn shifted(&self, id: FieldId) -> FieldId {
        FieldId::new(id.value() + self.offset)
    }
}

impl Artifact for FieldOffsetWrapper {
    fn type_name(&self) -> &str {
        "FieldOffsetWrapper"
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

impl VideoFieldRepresentation for FieldOffsetWrapper {
    fn wrapped_source(&self) -> Option<&VfrHandle> {
        Some(&self.source)
    }

    fn field_count(&self) -> usize {
        self.source.field_count().saturating_sub(self.offset as usize)
    }

    fn get_descriptor(&self, id: FieldId) -> Option<FieldDescriptor> {
        self.source.get_descriptor(self.shifted(id))
    }

    fn get_line(&self, id: FieldId, line: u32) -> Option<&[u16]> {
        self.source.get_line(self.shifted(id), line)
    }

    fn get_field(&self, id: FieldId) -> Vec<u16> {
        self.source.get_field(self.shifted(id))
    }

    fn get_field_parity_hint(&self, id: FieldId) -> Option<FieldParityHint> {
        self.source.get_field_parity_hint(self.shifted(id))
    }

    fn get_dropout_hints(&self, id: FieldId) -> Vec<DropoutRegion> {
        self.source.get_dropout_hints(self.shifted(id))
    }
}
