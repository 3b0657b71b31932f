//! `PreviewRenderer` (spec §4.5): the top-level facade turning a DAG
//! node into an RGB image, plus the query and coordinate-mapping APIs.

use crate::coordinates::{self, Direction};
use crate::labels;
use crate::weave;
use orc_artifact::vfr::VideoFieldRepresentation;
use orc_artifact::ArtifactHandle;
use orc_core::preview::{
    AspectRatioMode, FieldToImageMappingResult, FrameFieldsResult, FrameLineNavigationResult,
    ImageToFieldMappingResult, PreviewImage, PreviewItemDisplayInfo, PreviewNavigationHint,
    PreviewOutputInfo, PreviewOutputType, PreviewRenderResult, SuggestedViewNode,
};
use orc_core::{FieldId, NodeId};
use orc_graph::{DAGExecutionError, DAGExecutor, DAG};
use orc_stage::NodeType;
use std::sync::Arc;

/// Non-panicking error surface used internally; never propagated past
/// `render_output`, which converts it to [`PreviewRenderResult::failed`]
/// (spec §7 "preview never propagates a Result to the GUI boundary").
#[derive(Debug, Clone, thiserror::Error)]
pub enum PreviewError {
    #[error("node {0} does not exist in the current DAG")]
    NodeNotFound(NodeId),
    #[error("node {0} produced no output artifact")]
    NoOutput(NodeId),
    #[error("artifact produced by node {0} is not a video field representation")]
    NotAVfr(NodeId),
    #[error(transparent)]
    Execution(#[from] DAGExecutionError),
}

/// Holds a shared immutable handle to the current DAG, a mutable
/// executor for on-demand partial execution, an aspect-ratio mode, and
/// a show-dropouts flag (spec §4.5 "State").
pub struct PreviewRenderer {
    dag: Arc<DAG>,
    executor: DAGExecutor,
    aspect_ratio_mode: AspectRatioMode,
    show_dropouts: bool,
}

impl PreviewRenderer {
    #[must_use]
    pub fn new(dag: Arc<DAG>) -> Self {
        Self {
            dag,
            executor: DAGExecutor::new(),
            aspect_ratio_mode: AspectRatioMode::default(),
            show_dropouts: false,
        }
    }

    /// Swaps in a new DAG. The executor's cache may still serve hits
    /// across the swap since `ArtifactID`s are content-addressed (spec
    /// §4.5 "updating the DAG ... invalidates render assumptions").
    pub fn update_dag(&mut self, dag: Arc<DAG>) {
        self.dag = dag;
    }

    pub fn set_aspect_ratio_mode(&mut self, mode: AspectRatioMode) {
        self.aspect_ratio_mode = mode;
    }

    #[must_use]
    pub fn aspect_ratio_mode(&self) -> AspectRatioMode {
        self.aspect_ratio_mode
    }

    pub fn set_show_dropouts(&mut self, show: bool) {
        self.show_dropouts = show;
    }

    #[must_use]
    pub fn show_dropouts(&self) -> bool {
        self.show_dropouts
    }

    fn resolve_artifact(&mut self, node_id: NodeId) -> Result<ArtifactHandle, PreviewError> {
        if self.dag.node(node_id).is_none() {
            return Err(PreviewError::NodeNotFound(node_id));
        }
        let dag = Arc::clone(&self.dag);
        let outputs = self.executor.execute_to_node(&dag, node_id)?;
        let node_outputs = outputs.get(&node_id).ok_or(PreviewError::NoOutput(node_id))?;
        node_outputs
            .first()
            .cloned()
            .ok_or(PreviewError::NoOutput(node_id))
    }

    /// `suggested_view_node` (spec §4.5 "Query API"): first SOURCE node,
    /// then first non-SINK node, then first previewable SINK, then the
    /// reserved "no preview" placeholder.
    #[must_use]
    pub fn suggested_view_node(&self) -> SuggestedViewNode {
        let nodes = self.dag.nodes();

        if let Some(node) = nodes.iter().find(|n| n.stage.node_type_info().node_type == NodeType::Source) {
            return SuggestedViewNode { node_id: node.node_id, has_nodes: true, message: String::new() };
        }
        if let Some(node) = nodes.iter().find(|n| n.stage.node_type_info().node_type != NodeType::Sink) {
            return SuggestedViewNode { node_id: node.node_id, has_nodes: true, message: String::new() };
        }
        if let Some(node) = nodes.iter().find(|n| {
            n.stage.node_type_info().node_type == NodeType::Sink
                && n.stage.as_previewable().is_some_and(|p| p.supports_preview())
        }) {
            return SuggestedViewNode { node_id: node.node_id, has_nodes: true, message: String::new() };
        }

        SuggestedViewNode {
            node_id: NodeId::NONE,
            has_nodes: false,
            message: "No source available".to_string(),
        }
    }

    /// `available_outputs` (spec §4.5 "Query API"). When the node's
    /// stage implements `PreviewableStage` and opts in, its declared
    /// `preview_options` are surfaced under `PreviewOutputType::Composite`
    /// (the type spec §4.5 reserves for stage-declared extensions);
    /// otherwise the standard VFR-derived types are reported.
    pub fn available_outputs(&mut self, node_id: NodeId) -> Result<Vec<PreviewOutputInfo>, PreviewError> {
        let node = self.dag.node(node_id).ok_or(PreviewError::NodeNotFound(node_id))?;

        if let Some(previewable) = node.stage.as_previewable() {
            if previewable.supports_preview() {
                return Ok(previewable
                    .preview_options()
                    .into_iter()
                    .map(|option| PreviewOutputInfo {
                        output_type: PreviewOutputType::Composite,
                        display_name: option.display_name,
                        count: option.count,
                        is_available: true,
                        dar_aspect_correction: option.dar_aspect_correction,
                        option_id: Some(option.id),
                        dropouts_available: false,
                        has_separate_channels: false,
                    })
                    .collect());
            }
        }

        let artifact = self.resolve_artifact(node_id)?;
        let Some(vfr) = artifact.as_vfr() else {
            return Err(PreviewError::NotAVfr(node_id));
        };

        let field_count = vfr.field_count() as u64;
        let offset = weave::first_frame_field_offset(vfr);
        let frame_count = field_count.saturating_sub(offset) / 2;
        let has_separate = vfr.has_separate_channels();

        let mut infos = vec![
            PreviewOutputInfo {
                output_type: PreviewOutputType::Field,
                display_name: PreviewOutputType::Field.name().to_string(),
                count: field_count,
                is_available: field_count > 0,
                dar_aspect_correction: true,
                option_id: None,
                dropouts_available: true,
                has_separate_channels: has_separate,
            },
            PreviewOutputInfo {
                output_type: PreviewOutputType::Frame,
                display_name: PreviewOutputType::Frame.name().to_string(),
                count: frame_count,
                is_available: frame_count > 0,
                dar_aspect_correction: true,
                option_id: None,
                dropouts_available: true,
                has_separate_channels: has_separate,
            },
            PreviewOutputInfo {
                output_type: PreviewOutputType::FrameReversed,
                display_name: PreviewOutputType::FrameReversed.name().to_string(),
                count: frame_count,
                is_available: frame_count > 0,
                dar_aspect_correction: true,
                option_id: None,
                dropouts_available: true,
                has_separate_channels: has_separate,
            },
            PreviewOutputInfo {
                output_type: PreviewOutputType::Split,
                display_name: PreviewOutputType::Split.name().to_string(),
                count: frame_count,
                is_available: frame_count > 0,
                dar_aspect_correction: false,
                option_id: None,
                dropouts_available: true,
                has_separate_channels: has_separate,
            },
            PreviewOutputInfo {
                output_type: PreviewOutputType::Luma,
                display_name: PreviewOutputType::Luma.name().to_string(),
                count: field_count,
                is_available: field_count > 0 && has_separate,
                dar_aspect_correction: true,
                option_id: None,
                dropouts_available: true,
                has_separate_channels: has_separate,
            },
        ];

        for reserved in [PreviewOutputType::Chroma, PreviewOutputType::Composite] {
            infos.push(PreviewOutputInfo {
                output_type: reserved,
                display_name: reserved.name().to_string(),
                count: 0,
                is_available: false,
                dar_aspect_correction: false,
                option_id: None,
                dropouts_available: false,
                has_separate_channels: has_separate,
            });
        }

        Ok(infos)
    }

    pub fn output_count(&mut self, node_id: NodeId, output_type: PreviewOutputType) -> Result<u64, PreviewError> {
        let infos = self.available_outputs(node_id)?;
        Ok(infos
            .into_iter()
            .find(|info| info.output_type == output_type)
            .map_or(0, |info| info.count))
    }

    /// Delegates to a previewable stage's own renderer (spec §4.5
    /// "Previewable stages"), bypassing the default VFR weave path.
    pub fn render_preview_option(
        &mut self,
        node_id: NodeId,
        option_id: &str,
        index: u64,
        navigation_hint: PreviewNavigationHint,
    ) -> PreviewRenderResult {
        let Some(node) = self.dag.node(node_id) else {
            return PreviewRenderResult::failed(format!("node {node_id} does not exist"));
        };
        let Some(previewable) = node.stage.as_previewable() else {
            return PreviewRenderResult::failed(format!("node {node_id} is not previewable"));
        };
        PreviewRenderResult::ok(previewable.render_preview(option_id, index, navigation_hint))
    }

    /// `render_output` (spec §4.5 "Render algorithm for the default VFR
    /// path"), never propagating a `Result` past this boundary.
    pub fn render_output(
        &mut self,
        node_id: NodeId,
        output_type: PreviewOutputType,
        index: u64,
    ) -> PreviewRenderResult {
        match self.render_output_inner(node_id, output_type, index) {
            Ok(image) => PreviewRenderResult::ok(image),
            Err(err) => PreviewRenderResult::failed(err.to_string()),
        }
    }

    fn render_output_inner(
        &mut self,
        node_id: NodeId,
        output_type: PreviewOutputType,
        index: u64,
    ) -> Result<PreviewImage, PreviewError> {
        let artifact = self.resolve_artifact(node_id)?;
        let Some(vfr) = artifact.as_vfr() else {
            return Err(PreviewError::NotAVfr(node_id));
        };

        let rendered = if vfr.type_name() == orc_artifact::rgb::TYPE_NAME {
            render_rgb_fast_path(vfr, output_type, index)
        } else {
            match output_type {
                PreviewOutputType::Field | PreviewOutputType::Luma => {
                    weave::render_field(vfr, FieldId::new(index))
                }
                PreviewOutputType::Frame | PreviewOutputType::FrameReversed => {
                    let reversed = output_type == PreviewOutputType::FrameReversed;
                    weave::weave_layout_for_frame(vfr, index, reversed)
                        .map(|layout| weave::render_frame(vfr, &layout))
                }
                PreviewOutputType::Split => {
                    let pair = coordinates::get_frame_fields(vfr, index);
                    weave::render_split(vfr, pair.first_field, pair.second_field)
                }
                PreviewOutputType::Chroma | PreviewOutputType::Composite => None,
            }
        };

        let buffer = rendered.ok_or(PreviewError::NoOutput(node_id))?;
        let mut buffer = buffer;
        if self.aspect_ratio_mode == AspectRatioMode::Dar4x3 && output_type.is_dar_correctable() {
            buffer = buffer.scale_width(weave::DAR_WIDTH_SCALE);
        }
        if self.show_dropouts {
            buffer.apply_dropout_overlay();
        }

        Ok(PreviewImage {
            width: buffer.width,
            height: buffer.height,
            rgb_data: buffer.rgb,
            dropout_regions: buffer.dropouts,
        })
    }

    pub fn navigate_frame_line(
        &mut self,
        node_id: NodeId,
        output_type: PreviewOutputType,
        current_field: FieldId,
        current_line: u32,
        direction: Direction,
    ) -> Result<FrameLineNavigationResult, PreviewError> {
        let artifact = self.resolve_artifact(node_id)?;
        let vfr = artifact.as_vfr().ok_or(PreviewError::NotAVfr(node_id))?;
        Ok(coordinates::navigate_frame_line(vfr, output_type, current_field, current_line, direction))
    }

    pub fn map_image_to_field(
        &mut self,
        node_id: NodeId,
        output_type: PreviewOutputType,
        output_index: u64,
        image_y: u32,
    ) -> Result<ImageToFieldMappingResult, PreviewError> {
        let artifact = self.resolve_artifact(node_id)?;
        let vfr = artifact.as_vfr().ok_or(PreviewError::NotAVfr(node_id))?;
        coordinates::map_image_to_field(vfr, output_type, output_index, image_y)
            .ok_or(PreviewError::NoOutput(node_id))
    }

    pub fn map_field_to_image(
        &mut self,
        node_id: NodeId,
        output_type: PreviewOutputType,
        field_index: FieldId,
        field_line: u32,
    ) -> Result<FieldToImageMappingResult, PreviewError> {
        let artifact = self.resolve_artifact(node_id)?;
        let vfr = artifact.as_vfr().ok_or(PreviewError::NotAVfr(node_id))?;
        coordinates::map_field_to_image(vfr, output_type, field_index, field_line)
            .ok_or(PreviewError::NoOutput(node_id))
    }

    pub fn get_frame_fields(&mut self, node_id: NodeId, frame_index: u64) -> Result<FrameFieldsResult, PreviewError> {
        let artifact = self.resolve_artifact(node_id)?;
        let vfr = artifact.as_vfr().ok_or(PreviewError::NotAVfr(node_id))?;
        Ok(coordinates::get_frame_fields(vfr, frame_index))
    }

    pub fn preview_item_display_info(
        &mut self,
        node_id: NodeId,
        output_type: PreviewOutputType,
        index: u64,
    ) -> Result<PreviewItemDisplayInfo, PreviewError> {
        let count = self.output_count(node_id, output_type)?;
        let pair = self.get_frame_fields(node_id, index)?;
        Ok(labels::preview_item_display_info(output_type, index, count, pair.first_field, pair.second_field))
    }
}

fn render_rgb_fast_path(
    vfr: &dyn VideoFieldRepresentation,
    output_type: PreviewOutputType,
    index: u64,
) -> Option<weave::RenderedBuffer> {
    // Already-decoded packed-RGB VFRs skip IRE scaling and weaving
    // entirely (spec §4.5 "RGBFieldRepresentation fast path"); each
    // "field" is one full pre-decoded RGB frame at 16 bits/channel.
    let field = FieldId::new(index);
    let desc = vfr.get_descriptor(field)?;
    let pixel_width = desc.width / 3;
    let mut buffer = weave::RenderedBuffer::blank(pixel_width, desc.height);
    for line in 0..desc.height {
        let samples = vfr.get_line(field, line)?;
        for (pixel, chunk) in samples.chunks_exact(3).enumerate() {
            let idx = (line as usize * pixel_width as usize + pixel) * 3;
            if let Some(slice) = buffer.rgb.get_mut(idx..idx + 3) {
                slice[0] = (chunk[0] >> 8) as u8;
                slice[1] = (chunk[1] >> 8) as u8;
                slice[2] = (chunk[2] >> 8) as u8;
            }
        }
    }
    buffer.dropouts = vfr.get_dropout_hints(field);
    let _ = output_type;
    Some(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use orc_artifact::concrete::{FieldData, MemoryFieldRepresentation};
    use orc_artifact::{ArtifactHandle as Handle, ObservationContext, Provenance};
    use orc_core::{FieldParityHint, ParameterValue};
    use orc_graph::{DAGNode, InputBindings};
    use orc_stage::{NodeTypeInfo, Stage, StageError};
    use std::collections::BTreeMap;

    struct SourceStage(NodeTypeInfo);

    impl Stage for SourceStage {
        fn version(&self) -> &str {
            "1.0"
        }
        fn node_type_info(&self) -> &NodeTypeInfo {
            &self.0
        }
        fn required_input_count(&self) -> usize {
            0
        }
        fn output_count(&self) -> usize {
            1
        }
        fn execute(
            &self,
            _inputs: &[Handle],
            _parameters: &BTreeMap<String, ParameterValue>,
            _observation_context: &mut ObservationContext,
        ) -> Result<Vec<Handle>, StageError> {
            let fields = (0..4u16)
                .map(|i| {
                    FieldData::new(
                        2,
                        2,
                        vec![0x8000u16; 4],
                        Some(FieldParityHint { is_first_field: i % 2 == 0 }),
                        Vec::new(),
                    )
                    .unwrap()
                })
                .collect();
            Ok(vec![Arc::new(MemoryFieldRepresentation::new(
                Provenance::new("source", "1.0"),
                fields,
                None,
            ))])
        }
    }

    fn single_source_dag() -> Arc<DAG> {
        let mut dag = DAG::new();
        dag.add_node(DAGNode::new(
            NodeId::new(0),
            Arc::new(SourceStage(NodeTypeInfo::fixed_arity(NodeType::Source, "source", 0, 1))),
        ));
        dag.set_output_nodes(vec![NodeId::new(0)]);
        Arc::new(dag)
    }

    #[test]
    fn suggested_view_node_picks_the_source() {
        let renderer = PreviewRenderer::new(single_source_dag());
        let suggestion = renderer.suggested_view_node();
        assert!(suggestion.has_nodes);
        assert_eq!(suggestion.node_id, NodeId::new(0));
    }

    #[test]
    fn render_output_field_produces_a_correctly_sized_image() {
        let mut renderer = PreviewRenderer::new(single_source_dag());
        let result = renderer.render_output(NodeId::new(0), PreviewOutputType::Field, 0);
        assert!(result.success);
        let image = result.image.unwrap();
        assert_eq!((image.width, image.height), (2, 2));
        assert_eq!(image.rgb_data.len(), 2 * 2 * 3);
    }

    #[test]
    fn render_output_unknown_node_fails_gracefully() {
        let mut renderer = PreviewRenderer::new(single_source_dag());
        let result = renderer.render_output(NodeId::new(99), PreviewOutputType::Field, 0);
        assert!(!result.success);
        assert!(result.error_message.is_some());
    }

    #[test]
    fn dar_mode_scales_down_rendered_width() {
        let mut renderer = PreviewRenderer::new(single_source_dag());
        let sar = renderer.render_output(NodeId::new(0), PreviewOutputType::Field, 0);
        assert_eq!(sar.image.unwrap().width, 2);

        renderer.set_aspect_ratio_mode(AspectRatioMode::Dar4x3);
        assert_eq!(renderer.aspect_ratio_mode(), AspectRatioMode::Dar4x3);
        let dar = renderer.render_output(NodeId::new(0), PreviewOutputType::Field, 0);
        assert!(dar.success);
        assert_eq!(dar.image.unwrap().width, 1);
    }

    #[test]
    fn dar_mode_does_not_scale_split_output() {
        let mut renderer = PreviewRenderer::new(single_source_dag());
        renderer.set_aspect_ratio_mode(AspectRatioMode::Dar4x3);
        let result = renderer.render_output(NodeId::new(0), PreviewOutputType::Split, 0);
        assert!(result.success);
        assert_eq!(result.image.unwrap().width, 2);
    }

    #[test]
    fn available_outputs_reports_frame_count_from_field_count() {
        let mut renderer = PreviewRenderer::new(single_source_dag());
        let infos = renderer.available_outputs(NodeId::new(0)).unwrap();
        let field_info = infos.iter().find(|i| i.output_type == PreviewOutputType::Field).unwrap();
        assert_eq!(field_info.count, 4);
        let frame_info = infos.iter().find(|i| i.output_type == PreviewOutputType::Frame).unwrap();
        assert_eq!(frame_info.count, 2);
    }
}
