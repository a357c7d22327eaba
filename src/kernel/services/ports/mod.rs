//! Service ports: traits + data contracts.

pub mod generation;
pub mod runtime;
pub mod settings;

pub use generation::{GeneratedProject, GenerationError, GenerationFuture, ProjectGenerator};
pub use runtime::{AsyncExecutor, BoxFuture};
pub use settings::{ExportSettings, GenerationBackend, GenerationSettings, Settings};
