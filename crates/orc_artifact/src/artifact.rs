//! The `Artifact` base contract (spec §3/§4.1) and its `Provenance`
//! record.

use orc_core::{ArtifactId, ParameterValue};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Shared, type-erased handle to any artifact (not just a VFR) — what
/// flows along a `DAGNode`'s input bindings and what the executor's
/// cache stores (spec §3 "Artifacts ... may be held by many
/// downstream stages and by the executor's cache simultaneously").
pub type ArtifactHandle = Arc<dyn Artifact>;

/// Every artifact's minimal identity: a content-derived id, the
/// provenance that produced it, and a type tag used for downcasts at
/// preview-renderer fast paths.
///
/// All read methods are `&self` and never block or mutate — artifacts
/// are immutable after construction (spec §3 "Artifacts are immutable
/// after publication").
pub trait Artifact: Send + Sync {
    /// Concrete-type discriminator, e.g. `"RgbFieldRepresentation"`.
    fn type_name(&self) -> &str;
    fn id(&self) -> &ArtifactId;
    fn provenance(&self) -> &Provenance;

    /// Trait-object fallback for the common case of downcasting a
    /// type-erased artifact to the `VideoFieldRepresentation` shape
    /// the preview renderer and most stages actually want (spec §9:
    /// "a tagged-variant representation for the small set of concrete
    /// artifact types, plus a trait-object fallback for third-party
    /// extension stages"). Every VFR implementor overrides this to
    /// `Some(self)`; non-VFR artifacts (there are none built in, but
    /// the contract allows them) keep the default.
    fn as_vfr(&self) -> Option<&dyn crate::vfr::VideoFieldRepresentation> {
        None
    }

    /// Owning counterpart of [`as_vfr`](Self::as_vfr): lets a stage that
    /// only holds an `ArtifactHandle` obtain a `VfrHandle` to pass into
    /// a wrapper VFR's constructor (every wrapper holds its source by
    /// shared ownership, not by borrow). Every VFR implementor overrides
    /// this to `Some(self)`, relying on the unsized coercion from
    /// `Arc<ConcreteVfr>` to `Arc<dyn VideoFieldRepresentation>`.
    fn as_vfr_handle(self: Arc<Self>) -> Option<crate::vfr::VfrHandle> {
        None
    }
}

/// The producing stage's name, version, the parameters that produced
/// this artifact, and the ids of its input artifacts (spec §3).
#[derive(Debug, Clone, PartialEq)]
pub struct Provenance {
    pub stage_name: String,
    pub stage_version: String,
    pub parameters: BTreeMap<String, ParameterValue>,
    pub input_ids: Vec<ArtifactId>,
}

impl Provenance {
    #[must_use]
    pub fn new(stage_name: impl Into<String>, stage_version: impl Into<String>) -> Self {
        Self {
            stage_name: stage_name.into(),
            stage_version: stage_version.into(),
            parameters: BTreeMap::new(),
            input_ids: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_parameters(mut self, parameters: BTreeMap<String, ParameterValue>) -> Self {
        self.parameters = parameters;
        self
    }

    #[must_use]
    pub fn with_input_ids(mut self, input_ids: Vec<ArtifactId>) -> Self {
        self.input_ids = input_ids;
        self
    }

    /// Computes this artifact's `ArtifactID` from its own provenance,
    /// per the canonical fingerprint recipe (spec §3).
    #[must_use]
    pub fn compute_id(&self) -> ArtifactId {
        let params: Vec<_> = self
            .parameters
            .iter()
            .map(|(k, v)| (k.as_str(), v))
            .collect();
        orc_core::fingerprint::compute_artifact_id(
            &self.stage_name,
            &self.stage_version,
            params,
            &self.input_ids,
        )
    }
}

/// Errors raised at artifact-construction boundaries (spec §0.1: the
/// read API itself stays infallible — `Option`/empty-vec, never
/// `Result` — this is only for the small amount of validation a
/// concrete VFR constructor does, e.g. ragged sample buffers).
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ArtifactError {
    #[error("field {field} line {line} has {actual} samples, expected {expected}")]
    LineLengthMismatch {
        field: u64,
        line: u32,
        expected: u32,
        actual: u32,
    },
    #[error("field {field} declares height {declared} but only {actual} lines were supplied")]
    FieldHeightMismatch {
        field: u64,
        declared: u32,
        actual: u32,
    },
}
