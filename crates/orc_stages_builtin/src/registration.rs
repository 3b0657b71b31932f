//! Declarative registration of every built-in stage (spec §4.2
//! "Registry"): the one place a demo binary or test harness calls to
//! get a fully populated [`StageRegistry`].

use crate::memory_source::MemorySourceStage;
use crate::raw_field_sink::RawFieldSinkStage;
use crate::test_shapes::{Passthrough, PassthroughComplex, PassthroughMerger, PassthroughSplitter};
use crate::wrappers::{DropoutHintStage, FieldOffsetStage, LineMaskStage, ParityInvertStage};
use orc_stage::{register_stages, StageRegistry};

/// Populates `registry` with every stage this crate provides.
pub fn register_builtin_stages(registry: &mut StageRegistry) {
    register_stages!(registry, {
        "memory_source" => || Box::new(MemorySourceStage::new()),
        "dropout_hint" => || Box::new(DropoutHintStage::new()),
        "line_mask" => || Box::new(LineMaskStage::new()),
        "parity_invert" => || Box::new(ParityInvertStage::new()),
        "field_offset" => || Box::new(FieldOffsetStage::new()),
        "passthrough" => || Box::new(Passthrough::new()),
        "passthrough_splitter" => || Box::new(PassthroughSplitter::new()),
        "passthrough_merger" => || Box::new(PassthroughMerger::default()),
        "passthrough_complex" => || Box::new(PassthroughComplex::default()),
        "raw_field_sink" => || Box::new(RawFieldSinkStage::new()),
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_builtin_stage_is_registered() {
        let mut registry = StageRegistry::new();
        register_builtin_stages(&mut registry);
        assert_eq!(
            registry.canonical_names(),
            vec![
                "dropout_hint",
                "field_offset",
                "line_mask",
                "memory_source",
                "parity_invert",
                "passthrough",
                "passthrough_complex",
                "passthrough_merger",
                "passthrough_splitter",
                "raw_field_sink",
            ]
        );
    }
}
