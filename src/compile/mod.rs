//! Compilation of a resolved plan into output documents.
//!
//! The pipeline for one run:
//!
//! ```text
//! load -> resolve -> validate -> compile (in memory) -> flush
//! ```
//!
//! Nothing is written unless every earlier stage succeeded. Artifacts and
//! capabilities compile in parallel on the rayon pool; the flush stages
//! every file and swaps the output directory in one step.

pub mod document;
pub mod manifest;
mod orchestrator;
pub mod template;


pub use manifest::BuildManifest;
pub use orchestrator::{CompileOptions, Compiler, RunSummary, compile_project, flush, load_plan};

use std::path::PathBuf;

/// A compiled artifact document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledOutput {
    pub artifact_id: String,
    /// Path relative to the output root.
    pub path: PathBuf,
    pub content: String,
    /// Include warnings raised while expanding this artifact.
    pub warnings: Vec<String>,
}

/// A standalone capability document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledCapability {
    pub id: String,
    /// Path relative to the output root.
    pub path: PathBuf,
    pub content: String,
    pub warnings: Vec<String>,
}

/// Everything one compile produced, not yet written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildOutput {
    pub profile: String,
    /// In plan order.
    pub artifacts: Vec<CompiledOutput>,
    /// Distinct capabilities with stored content, in order of first appearance.
    pub capabilities: Vec<CompiledCapability>,
    pub validation_warnings: Vec<String>,
}

impl BuildOutput {
    /// All warnings of the run: validation first, then per output.
    pub fn warnings(&self) -> Vec<String> {
        self.validation_warnings
            .iter()
            .chain(self.artifacts.iter().flat_map(|a| &a.warnings))
            .chain(self.capabilities.iter().flat_map(|c| &c.warnings))
            .cloned()
            .collect()
    }
}
