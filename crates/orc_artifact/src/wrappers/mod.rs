//! Concrete VFR wrappers (spec §3 "VFR wrapper (lazy composition)").
//!
//! Each wrapper holds a shared handle to a source VFR (`wrapped_source`)
//! and overrides only the accessors it changes; every other
//! `VideoFieldRepresentation` method forwards through the trait's
//! default bodies.

pub mod dropout_hint;
pub mod field_offset;
pub mod line_mask;
pub mod parity_invert;

pub use dropout_hint::DropoutHintWrapper;
pub use field_offset::FieldOffsetWrapper;
pub use line_mask::{LineMaskWrapper, LineParity, LineSpec};
pub use parity_invert::ParityInvertWrapper;
