//! Demonstrates the full round trip through the built-in stages: a
//! memory source reads a raw-sample fixture, a line-mask transform
//! consumes it, the preview renderer turns the transform's output into
//! a PNG, and the raw-field sink is triggered to write the result back
//! out as another raw+sidecar pair.
//!
//! Run with e.g. `cargo run -p orc-cli -- /tmp/orc-demo`, which creates
//! the working directory if missing and writes `input.raw`/`input.json`,
//! `preview.png`, and `output.raw`/`output.json` under it.

use anyhow::{Context, Result};
use orc_core::preview::PreviewOutputType;
use orc_core::ParameterValue;
use orc_graph::{DAGExecutor, InputBindings, DAG, DAGNode};
use orc_preview::{export_png, PreviewRenderer};
use orc_stage::StageRegistry;
use orc_stages_builtin::raw_format::RawFieldSidecar;
use orc_stages_builtin::register_builtin_stages;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const FIELD_WIDTH: u32 = 16;
const FIELD_HEIGHT: u32 = 8;
const FIELD_COUNT: u32 = 4;

fn main() -> Result<()> {
    env_logger::init();

    let work_dir: PathBuf = std::env::args()
        .nth(1)
        .map_or_else(|| std::env::temp_dir().join("orc-demo"), PathBuf::from);
    std::fs::create_dir_all(&work_dir).context("creating working directory")?;

    write_fixture(&work_dir).context("writing input fixture")?;

    let mut registry = StageRegistry::new();
    register_builtin_stages(&mut registry);

    let dag = build_dag(&registry, &work_dir)?;
    let dag = Arc::new(dag);

    let mut executor = DAGExecutor::new();
    let outputs = executor.execute(&dag).context("executing the dag")?;
    log::info!("dag produced {} root output artifact(s)", outputs.len());

    let transform_node = orc_core::NodeId::new(1);
    let mut renderer = PreviewRenderer::new(Arc::clone(&dag));
    let result = renderer.render_output(transform_node, PreviewOutputType::Field, 0);
    if !result.success {
        anyhow::bail!(
            "preview render failed: {}",
            result.error_message.unwrap_or_default()
        );
    }
    let image = result.image.expect("render_output reports success with an image");
    let png_path = work_dir.join("preview.png");
    export_png(&image, &png_path).context("exporting preview png")?;
    log::info!("wrote preview to {}", png_path.display());

    trigger_sink(&registry, &dag, &work_dir)?;

    Ok(())
}

/// Writes a small raw-sample file and matching JSON sidecar so
/// [`orc_stages_builtin::memory_source::MemorySourceStage`] has
/// something to read.
fn write_fixture(work_dir: &Path) -> Result<()> {
    let samples_per_field = (FIELD_WIDTH * FIELD_HEIGHT) as usize;
    let mut samples = Vec::with_capacity(samples_per_field * FIELD_COUNT as usize * 2);
    for field in 0..FIELD_COUNT {
        let base = u16::try_from(field).unwrap_or(0) * 1000;
        for i in 0..samples_per_field {
            let value = base + u16::try_from(i % 4096).unwrap_or(0);
            samples.extend_from_slice(&value.to_le_bytes());
        }
    }
    std::fs::write(work_dir.join("input.raw"), &samples)?;

    let sidecar = RawFieldSidecar {
        field_count: FIELD_COUNT,
        width: FIELD_WIDTH,
        height: FIELD_HEIGHT,
        video_parameters: None,
        parity_hints: (0..FIELD_COUNT)
            .map(|i| Some(orc_core::FieldParityHint { is_first_field: i % 2 == 0 }))
            .collect(),
        dropout_hints: vec![Vec::new(); FIELD_COUNT as usize],
    };
    let file = std::fs::File::create(work_dir.join("input.json"))?;
    serde_json::to_writer_pretty(file, &sidecar)?;
    Ok(())
}

fn build_dag(registry: &StageRegistry, work_dir: &Path) -> Result<DAG> {
    let mut dag = DAG::new();

    let source = registry.create("memory_source").context("creating memory_source")?;
    let mut source_params = BTreeMap::new();
    source_params.insert(
        "samples_path".to_string(),
        ParameterValue::FilePath(work_dir.join("input.raw").to_string_lossy().to_string()),
    );
    source_params.insert(
        "metadata_path".to_string(),
        ParameterValue::FilePath(work_dir.join("input.json").to_string_lossy().to_string()),
    );
    dag.add_node(DAGNode::new(orc_core::NodeId::new(0), Arc::from(source)).with_parameters(source_params));

    let transform = registry.create("line_mask").context("creating line_mask")?;
    let mut transform_params = BTreeMap::new();
    transform_params.insert("line_spec".to_string(), ParameterValue::String("F:1-2".to_string()));
    transform_params.insert("mask_ire".to_string(), ParameterValue::Double(0.0));
    dag.add_node(
        DAGNode::new(orc_core::NodeId::new(1), Arc::from(transform))
            .with_parameters(transform_params)
            .with_input_bindings(InputBindings::from_slice(&[(orc_core::NodeId::new(0), 0)])),
    );

    dag.set_output_nodes(vec![orc_core::NodeId::new(1)]);

    if !dag.validate() {
        anyhow::bail!("dag failed validation: {:?}", dag.get_validation_errors());
    }
    Ok(dag)
}

/// Runs the DAG a second time to get the transform's output artifact,
/// then feeds it straight into a `raw_field_sink` trigger (sinks are
/// never DAG nodes that produce cacheable outputs themselves; they're
/// triggered directly with whatever artifact the caller already has).
fn trigger_sink(registry: &StageRegistry, dag: &Arc<DAG>, work_dir: &Path) -> Result<()> {
    let mut executor = DAGExecutor::new();
    let outputs = executor.execute(dag).context("re-executing dag for sink input")?;
    let artifact = outputs.first().context("dag produced no output artifacts")?.clone();

    let sink = registry.create("raw_field_sink").context("creating raw_field_sink")?;
    let Some(triggerable) = sink.as_triggerable() else {
        anyhow::bail!("raw_field_sink did not report itself as triggerable");
    };

    let mut parameters = BTreeMap::new();
    parameters.insert(
        "samples_path".to_string(),
        ParameterValue::FilePath(work_dir.join("output.raw").to_string_lossy().to_string()),
    );
    parameters.insert(
        "metadata_path".to_string(),
        ParameterValue::FilePath(work_dir.join("output.json").to_string_lossy().to_string()),
    );

    let mut observation_context = orc_artifact::ObservationContext::new();
    let inputs = [artifact];
    let ok = triggerable.trigger(&inputs, &parameters, &mut observation_context);
    if !ok {
        anyhow::bail!("sink trigger failed: {}", triggerable.trigger_status());
    }
    log::info!(
        "sink wrote {} (status: {})",
        work_dir.join("output.raw").display(),
        triggerable.trigger_status()
    );
    Ok(())
}
