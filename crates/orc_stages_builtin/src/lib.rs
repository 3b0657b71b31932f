//! Demonstrative built-in stages (spec §1): enough concrete stages to
//! exercise every core module end-to-end without a real EFM/chroma
//! decoder catalogue, which stays out of scope.
//!
//! - [`memory_source`]: a `Source` stage reading a raw-sample file.
//! - [`wrappers`]: the four named VFR-wrapper stages.
//! - [`test_shapes`]: the connectivity-shape fixtures.
//! - [`raw_field_sink`]: a `TriggerableStage` sink.
//! - [`registration::register_builtin_stages`] wires all of the above
//!   into a [`orc_stage::StageRegistry`].

pub mod memory_source;
pub mod raw_field_sink;
pub mod raw_format;
pub mod registration;
pub mod test_shapes;
pub mod wrappers;

pub use memory_source::MemorySourceStage;
pub use raw_field_sink::RawFieldSinkStage;
pub use registration::register_builtin_stages;
