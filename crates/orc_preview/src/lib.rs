//! Preview renderer (spec §4.5): turns an arbitrary DAG node's VFR
//! output into an RGB image, and answers the coordinate-mapping
//! queries interactive GUIs need to overlay dropouts and scrub frames.
//!
//! The default render path lives in [`weave`] (IRE scaling, field/frame
//! weaving, the "extra line" layout) and [`coordinates`] (the inverse
//! mappings built on the same layout). [`renderer::PreviewRenderer`] is
//! the facade tying those to a live [`orc_graph::DAGExecutor`].

pub mod coordinates;
pub mod labels;
pub mod png_export;
pub mod renderer;
pub mod weave;

pub use coordinates::Direction;
pub use png_export::{export_png, PngExportError};
pub use renderer::{PreviewError, PreviewRenderer};
pub use weave::{RenderedBuffer, WeaveLayout};
