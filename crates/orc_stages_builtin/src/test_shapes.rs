//! The four connectivity-shape test stages the registry carries purely
//! to exercise DAG arity validation end-to-end (spec §3: core-owned
//! test fixtures, grounded in the original's own static
//! `NodeTypeInfo` table for a `Source`/`Passthrough`/`PassthroughSplitter`/
//! `PassthroughMerger`/`PassthroughComplex`). None perform real
//! transforms — each just re-threads its input artifacts to its
//! outputs, cycling when there are more outputs than inputs or vice
//! versa, so a DAG built purely from these stages is inspectable
//! without needing real sample data.

use orc_artifact::{ArtifactHandle, ObservationContext};
use orc_core::ParameterValue;
use orc_stage::node_type::{NodeType, NodeTypeInfo};
use orc_stage::{Stage, StageError};
use std::collections::BTreeMap;

const VERSION: &str = "1.0";

pub struct Passthrough {
    node_type: NodeTypeInfo,
}

impl Default for Passthrough {
    fn default() -> Self {
        Self::new()
    }
}

impl Passthrough {
    #[must_use]
    pub fn new() -> Self {
        Self {
            node_type: NodeTypeInfo::fixed_arity(NodeType::Transform, "passthrough", 1, 1),
        }
    }
}

impl Stage for Passthrough {
    fn version(&self) -> &str {
        VERSION
    }

    fn node_type_info(&self) -> &NodeTypeInfo {
        &self.node_type
    }

    fn required_input_count(&self) -> usize {
        1
    }

    fn output_count(&self) -> usize {
        1
    }

    fn execute(
        &self,
        inputs: &[ArtifactHandle],
        _parameters: &BTreeMap<String, ParameterValue>,
        _observation_context: &mut ObservationContext,
    ) -> Result<Vec<ArtifactHandle>, StageError> {
        if inputs.len() != 1 {
            return Err(StageError::InputCountMismatch { expected: 1, actual: inputs.len() });
        }
        Ok(vec![inputs[0].clone()])
    }
}

/// Fixed 1-in/3-out shape.
pub struct PassthroughSplitter {
    node_type: NodeTypeInfo,
}

impl Default for PassthroughSplitter {
    fn default() -> Self {
        Self::new()
    }
}

impl PassthroughSplitter {
    #[must_use]
    pub fn new() -> Self {
        Self {
            node_type: NodeTypeInfo::fixed_arity(NodeType::Splitter, "passthrough_splitter", 1, 3),
        }
    }
}

impl Stage for PassthroughSplitter {
    fn version(&self) -> &str {
        VERSION
    }

    fn node_type_info(&self) -> &NodeTypeInfo {
        &self.node_type
    }

    fn required_input_count(&self) -> usize {
        1
    }

    fn output_count(&self) -> usize {
        3
    }

    fn execute(
        &self,
        inputs: &[ArtifactHandle],
        _parameters: &BTreeMap<String, ParameterValue>,
        _observation_context: &mut ObservationContext,
    ) -> Result<Vec<ArtifactHandle>, StageError> {
        if inputs.len() != 1 {
            return Err(StageError::InputCountMismatch { expected: 1, actual: inputs.len() });
        }
        Ok(vec![inputs[0].clone(); 3])
    }
}

/// Variable 2..8-in/1-out shape; the instance's actual input count is
/// fixed at construction (spec §4.2: "reflects *this instance's*
/// configured arity").
pub struct PassthroughMerger {
    node_type: NodeTypeInfo,
    input_count: usize,
}

impl Default for PassthroughMerger {
    fn default() -> Self {
        Self::new(2)
    }
}

impl PassthroughMerger {
    /// `input_count` must fall within `2..=8`; out-of-range values are
    /// clamped rather than rejected since this is a test fixture, not
    /// user-facing configuration.
    #[must_use]
    pub fn new(input_count: usize) -> Self {
        Self {
            node_type: NodeTypeInfo {
                node_type: NodeType::Merger,
                canonical_name: "passthrough_merger".to_string(),
                display_name: "passthrough_merger".to_string(),
                description: String::new(),
                min_inputs: 2,
                max_inputs: 8,
                min_outputs: 1,
                max_outputs: 1,
                user_creatable: true,
                format_compatibility: orc_stage::VideoFormatCompatibility::ANY,
            },
            input_count: input_count.clamp(2, 8),
        }
    }
}

impl Stage for PassthroughMerger {
    fn version(&self) -> &str {
        VERSION
    }

    fn node_type_info(&self) -> &NodeTypeInfo {
        &self.node_type
    }

    fn required_input_count(&self) -> usize {
        self.input_count
    }

    fn output_count(&self) -> usize {
        1
    }

    fn execute(
        &self,
        inputs: &[ArtifactHandle],
        _parameters: &BTreeMap<String, ParameterValue>,
        _observation_context: &mut ObservationContext,
    ) -> Result<Vec<ArtifactHandle>, StageError> {
        if inputs.len() != self.input_count {
            return Err(StageError::InputCountMismatch {
                expected: self.input_count,
                actual: inputs.len(),
            });
        }
        Ok(vec![inputs[0].clone()])
    }
}

/// Variable 2..4-in/2..4-out shape.
pub struct PassthroughComplex {
    node_type: NodeTypeInfo,
    input_count: usize,
    output_count: usize,
}

impl Default for PassthroughComplex {
    fn default() -> Self {
        Self::new(2, 2)
    }
}

impl PassthroughComplex {
    #[must_use]
    pub fn new(input_count: usize, output_count: usize) -> Self {
        Self {
            node_type: NodeTypeInfo {
                node_type: NodeType::Complex,
                canonical_name: "passthrough_complex".to_string(),
                display_name: "passthrough_complex".to_string(),
                description: String::new(),
                min_inputs: 2,
                max_inputs: 4,
                min_outputs: 2,
                max_outputs: 4,
                user_creatable: true,
                format_compatibility: orc_stage::VideoFormatCompatibility::ANY,
            },
            input_count: input_count.clamp(2, 4),
            output_count: output_count.clamp(2, 4),
        }
    }
}

impl Stage for PassthroughComplex {
    fn version(&self) -> &str {
        VERSION
    }

    fn node_type_info(&self) -> &NodeTypeInfo {
        &self.node_type
    }

    fn required_input_count(&self) -> usize {
        self.input_count
    }

    fn output_count(&self) -> usize {
        self.output_count
    }

    fn execute(
        &self,
        inputs: &[ArtifactHandle],
        _parameters: &BTreeMap<String, ParameterValue>,
        _observation_context: &mut ObservationContext,
    ) -> Result<Vec<ArtifactHandle>, StageError> {
        if inputs.len() != self.input_count {
            return Err(StageError::InputCountMismatch {
                expected: self.input_count,
                actual: inputs.len(),
            });
        }
        Ok((0..self.output_count).map(|i| inputs[i % inputs.len()].clone()).collect())
    }
}
