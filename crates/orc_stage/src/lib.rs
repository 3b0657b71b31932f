//! The stage contract and registry (spec §4.2): what a stage is, its
//! typed parameter schema, its node-type shape, its execution entry
//! point, and how stages are discovered.
//!
//! Every capability beyond the base [`Stage`] trait — parameters,
//! preview, triggering — is its own small mixin trait rather than one
//! god-interface (spec §9: "model each mixin as a small capability
//! interface and compose stages as a struct that implements a subset").

pub mod node_type;
pub mod parameterized;
pub mod previewable;
pub mod registry;
pub mod stage;
pub mod triggerable;

pub use node_type::{is_connection_valid, NodeType, NodeTypeInfo, VideoFormatCompatibility};
pub use parameterized::ParameterizedStage;
pub use previewable::PreviewableStage;
pub use registry::{RegistryError, StageFactory, StageRegistry};
pub use stage::{Stage, StageError};
pub use triggerable::{ProgressCallback, SharedTriggerState, TriggerState, TriggerableStage};
