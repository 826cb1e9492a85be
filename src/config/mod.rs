//! Pipeline configuration for quire.
//!
//! This module defines `PipelineConfig`, the contents of `quire.yaml` at the
//! project root. Every key is optional: missing keys take the conventional
//! layout, unknown keys are ignored for forward compatibility, and values
//! are validated at load time. The struct is immutable for a run and is
//! passed by reference to every pipeline stage.

mod model;
mod operations;
pub mod types;


// Re-export public API
pub use model::PipelineConfig;
pub use types::{CONFIG_FILE_NAME, FixedFragment, MANIFEST_FILE_NAME};
