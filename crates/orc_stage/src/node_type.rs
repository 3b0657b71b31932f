//! Node-type shape and the compile-time-shared connection-validity
//! helper (spec §4.2).
//!
//! Grounded in the original's `node_type.h`/`.cpp`: a small closed
//! `NodeType` enum, a descriptive `NodeTypeInfo` record per stage, and
//! `is_connection_valid` doing a registry lookup rather than anything
//! stage-instance-specific.

use bitflags::bitflags;

/// The connection shape a stage's node occupies in a DAG (spec §3/§4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum NodeType {
    Source,
    Sink,
    Transform,
    Splitter,
    Merger,
    Complex,
}

bitflags! {
    /// Which video systems a stage supports (spec §3 supplement: the
    /// original's `NodeTypeInfo` carries a format-compatibility flag
    /// set alongside `user_creatable`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct VideoFormatCompatibility: u8 {
        const NTSC = 0b0000_0001;
        const PAL  = 0b0000_0010;
        const ANY  = Self::NTSC.bits() | Self::PAL.bits();
    }
}

impl Default for VideoFormatCompatibility {
    fn default() -> Self {
        Self::ANY
    }
}

/// Describes a stage's connection shape for DAG validation and GUI
/// node-palette display (spec §4.2).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeTypeInfo {
    pub node_type: NodeType,
    pub canonical_name: String,
    pub display_name: String,
    pub description: String,
    pub min_inputs: u32,
    pub max_inputs: u32,
    pub min_outputs: u32,
    pub max_outputs: u32,
    /// Whether a GUI's node palette should offer this type for manual
    /// creation (the original's `user_creatable`) — the built-in test
    /// shapes and the bare `Source` are not.
    pub user_creatable: bool,
    pub format_compatibility: VideoFormatCompatibility,
}

impl NodeTypeInfo {
    #[must_use]
    pub fn fixed_arity(
        node_type: NodeType,
        canonical_name: impl Into<String>,
        inputs: u32,
        outputs: u32,
    ) -> Self {
        let canonical_name = canonical_name.into();
        Self {
            node_type,
            display_name: canonical_name.clone(),
            canonical_name,
            description: String::new(),
            min_inputs: inputs,
            max_inputs: inputs,
            min_outputs: outputs,
            max_outputs: outputs,
            user_creatable: true,
            format_compatibility: VideoFormatCompatibility::ANY,
        }
    }

    #[must_use]
    pub fn accepts_input_count(&self, count: u32) -> bool {
        count >= self.min_inputs && count <= self.max_inputs
    }

    #[must_use]
    pub fn accepts_output_count(&self, count: u32) -> bool {
        count >= self.min_outputs && count <= self.max_outputs
    }
}

/// Checks, by node-type shape alone, that connecting `source`'s output
/// to `target`'s input is structurally possible — the source must
/// have at least one output and the target at least one input. The
/// full arity (min/max in/out against the actual bindings) is checked
/// by DAG validation (spec §4.3), not here.
#[must_use]
pub fn is_connection_valid(source: &NodeTypeInfo, target: &NodeTypeInfo) -> bool {
    source.max_outputs > 0 && target.max_inputs > 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_has_no_inputs_and_sink_has_no_outputs() {
        let source = NodeTypeInfo::fixed_arity(NodeType::Source, "source", 0, 1);
        let sink = NodeTypeInfo::fixed_arity(NodeType::Sink, "sink", 1, 0);
        assert!(is_connection_valid(&source, &sink));
        assert!(!is_connection_valid(&sink, &source));
    }

    #[test]
    fn format_compatibility_any_is_both_systems() {
        let any = VideoFormatCompatibility::ANY;
        assert!(any.contains(VideoFormatCompatibility::NTSC));
        assert!(any.contains(VideoFormatCompatibility::PAL));
    }
}
