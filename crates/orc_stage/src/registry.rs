//! Process-wide stage registry (spec §4.2 "Registry"): a read-after-
//! startup map from canonical stage name to a factory, populated by
//! declarative registration at module scope.
//!
//! Grounded in the original's static registration table: each
//! concrete stage registers itself once, by canonical name, before
//! `main` runs. Rust has no static-initialization-order guarantee
//! across translation units the way C++ does, so registration here is
//! explicit (`StageRegistry::register` calls collected by the
//! binary/test setup) rather than attribute-macro magic — matching
//! how the teacher's asset-loader registry (`myth_resources`) is wired
//! up from an explicit list rather than `inventory`/`ctor` tricks.

use crate::stage::Stage;
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Constructs a fresh, default-configured stage instance.
pub type StageFactory = Arc<dyn Fn() -> Box<dyn Stage> + Send + Sync>;

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("stage '{0}' is already registered")]
    AlreadyRegistered(String),
    #[error("no stage registered under canonical name '{0}'")]
    NotFound(String),
}

/// A process-wide (or test-scoped) map from canonical stage name to
/// factory. Read-only once populated; lookups require no
/// synchronization beyond the map's own (spec §4.2, §9 "Global state").
#[derive(Default)]
pub struct StageRegistry {
    factories: FxHashMap<String, StageFactory>,
}

impl StageRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `factory` under `canonical_name`. Declarative callers
    /// (module-scope `register_builtin_stages`-style functions) call
    /// this once per stage at program start.
    pub fn register(
        &mut self,
        canonical_name: impl Into<String>,
        factory: StageFactory,
    ) -> Result<(), RegistryError> {
        let name = canonical_name.into();
        if self.factories.contains_key(&name) {
            return Err(RegistryError::AlreadyRegistered(name));
        }
        self.factories.insert(name, factory);
        Ok(())
    }

    /// Constructs a fresh stage instance from the registered factory.
    pub fn create(&self, canonical_name: &str) -> Result<Box<dyn Stage>, RegistryError> {
        self.factories
            .get(canonical_name)
            .map(|factory| factory())
            .ok_or_else(|| RegistryError::NotFound(canonical_name.to_string()))
    }

    #[must_use]
    pub fn is_registered(&self, canonical_name: &str) -> bool {
        self.factories.contains_key(canonical_name)
    }

    #[must_use]
    pub fn canonical_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// Small registration-list macro so a crate of concrete stages can
/// declare its whole table in one place, e.g.:
///
/// ```ignore
/// register_stages!(registry, {
///     "passthrough" => || Box::new(Passthrough::new()),
///     "line_mask" => || Box::new(LineMaskStage::new()),
/// });
/// ```
#[macro_export]
macro_rules! register_stages {
    ($registry:expr, { $($name:literal => $factory:expr),* $(,)? }) => {
        $(
            $registry
                .register($name, ::std::sync::Arc::new($factory))
                .expect(concat!("duplicate stage registration: ", $name));
        )*
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node_type::{NodeType, NodeTypeInfo};
    use crate::stage::StageError;
    use orc_artifact::{ArtifactHandle, ObservationContext};
    use orc_core::ParameterValue;
    use std::collections::BTreeMap;

    struct NullStage(NodeTypeInfo);

    impl Stage for NullStage {
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
            0
        }
        fn execute(
            &self,
            _inputs: &[ArtifactHandle],
            _parameters: &BTreeMap<String, ParameterValue>,
            _observation_context: &mut ObservationContext,
        ) -> Result<Vec<ArtifactHandle>, StageError> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn register_then_create_yields_fresh_instance() {
        let mut registry = StageRegistry::new();
        register_stages!(registry, {
            "null" => || Box::new(NullStage(NodeTypeInfo::fixed_arity(NodeType::Transform, "null", 0, 0))),
        });
        assert!(registry.is_registered("null"));
        let stage = registry.create("null").unwrap();
        assert_eq!(stage.version(), "1.0");
    }

    #[test]
    fn duplicate_registration_errors() {
        let mut registry = StageRegistry::new();
        let factory: StageFactory = Arc::new(|| {
            Box::new(NullStage(NodeTypeInfo::fixed_arity(
                NodeType::Transform,
                "null",
                0,
                0,
            )))
        });
        registry.register("null", factory.clone()).unwrap();
        assert_eq!(
            registry.register("null", factory),
            Err(RegistryError::AlreadyRegistered("null".to_string()))
        );
    }

    #[test]
    fn unknown_name_is_not_found() {
        let registry = StageRegistry::new();
        assert_eq!(
            registry.create("missing"),
            Err(RegistryError::NotFound("missing".to_string()))
        );
    }
}
