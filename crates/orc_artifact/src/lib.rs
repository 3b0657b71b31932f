//! The artifact and field-representation model (spec §4.1): the
//! immutable lazy-view abstraction every stage produces and consumes.
//!
//! `Artifact` is the base unit; `VideoFieldRepresentation` is the
//! dominant concrete shape stages actually pass around. Wrappers
//! (`wrappers::*`) compose over a source VFR by holding a shared
//! handle and overriding only the methods they change — everything
//! else falls through `VideoFieldRepresentation`'s default bodies via
//! the `wrapped_source` hook (see `vfr.rs`).

pub mod artifact;
pub mod concrete;
pub mod observation;
pub mod rgb;
pub mod vfr;
pub mod wrappers;

pub use artifact::{Artifact, ArtifactError, ArtifactHandle, Provenance};
pub use concrete::MemoryFieldRepresentation;
pub use observation::{ObservationContext, ObservationValue};
pub use rgb::RgbFieldRepresentation;
pub use vfr::{FieldDescriptor, VfrHandle, VideoFieldRepresentation};
