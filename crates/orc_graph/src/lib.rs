//! The DAG model, its validation rules, and the topological executor
//! with content-addressed caching (spec §4.3).

pub mod dag;
pub mod executor;

pub use dag::{DAGValidationError, InputBindings, DAG, DAGNode};
pub use executor::{DAGExecutionError, DAGExecutor, ProgressCallback};
