//! Dropout-hint modifier wrapper (spec §3's first named wrapper):
//! merges externally supplied dropout regions into a source VFR's
//! observed hints, e.g. to inject hints recovered from a side file or
//! from an `ObservationContext` published by an earlier stage.

use crate::artifact::{Artifact, Provenance};
use crate::vfr::{VfrHandle, VideoFieldRepresentation};
use orc_core::{ArtifactId, DropoutRegion, FieldId};
use rustc_hash::FxHashMap;

pub struct DropoutHintWrapper {
    source: VfrHandle,
    id: ArtifactId,
    provenance: Provenance,
    extra_hints: FxHashMap<u64, Vec<DropoutRegion>>,
}

impl DropoutHintWrapper {
    #[must_use]
    pub fn new(
        source: VfrHandle,
        stage_version: impl Into<String>,
        extra_hints: FxHashMap<u64, Vec<DropoutRegion>>,
    ) -> Self {
        let provenance = Provenance::new("dropout_hint", stage_version)
            .with_input_ids(vec![source.id().clone()]);
        let id = provenance.compute_id();
        Self {
            source,
            id,
            provenance,
            extra_hints,
        }
    }
}

impl Artifact for DropoutHintWrapper {
    fn type_name(&self) -> &str {
        "DropoutHintWrapper"
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

impl VideoFieldRepresentation for DropoutHintWrapper {
    fn wrapped_source(&self) -> Option<&VfrHandle> {
        Some(&self.source)
    }

    fn get_dropout_hints(&self, id: FieldId) -> Vec<DropoutRegion> {
        let mut hints = self.source.get_dropout_hints(id);
        if let Some(extra) = self.extra_hints.get(&id.value()) {
            hints.extend_from_slice(extra);
        }
        hints
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::concrete::{FieldData, MemoryFieldRepresentation};
    use std::sync::Arc;

    #[test]
    fn merges_extra_hints_with_source_hints() {
        let field = FieldData::new(8, 4, vec![0u16; 32], None, vec![DropoutRegion {
            line: 0,
            start_sample: 0,
            end_sample: 2,
        }])
        .unwrap();
        let source: VfrHandle = Arc::new(MemoryFieldRepresentation::new(
            Provenance::new("source", "1.0"),
            vec![field],
            None,
        ));

        let mut extra = FxHashMap::default();
        extra.insert(
            0,
            vec![DropoutRegion {
                line: 2,
                start_sample: 1,
                end_sample: 3,
            }],
        );
        let wrapper = DropoutHintWrapper::new(source, "1.0", extra);

        let hints = wrapper.get_dropout_hints(FieldId::new(0));
        assert_eq!(hints.len(), 2);
    }

    #[test]
    fn wrapper_id_differs_from_source_id() {
        let source: VfrHandle = Arc::new(MemoryFieldRepresentation::new(
            Provenance::new("source", "1.0"),
            vec![],
            None,
        ));
        let source_id = source.id().clone();
        let wrapper = DropoutHintWrapper::new(source, "1.0", FxHashMap::default());
        assert_ne!(wrapper.id(), &source_id);
    }
}
