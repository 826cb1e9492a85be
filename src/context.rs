//! Project context resolution for quire.
//!
//! Finds the project root (the directory holding `quire.yaml`) and turns the
//! relative layout in [`PipelineConfig`] into absolute paths. Every command
//! goes through this module, so a run from a subdirectory targets the same
//! content root as a run from the project root.

use crate::config::{CONFIG_FILE_NAME, PipelineConfig};
use crate::error::{QuireError, Result};
use crate::fragment::FsFragmentStore;
use std::env;
use std::path::{Path, PathBuf};

/// Resolved paths for one quire run. All paths are absolute.
#[derive(Debug, Clone)]
pub struct PipelineContext {
    /// Project root (holds `quire.yaml`, if any).
    pub root: PathBuf,

    /// Configuration for the run.
    pub config: PipelineConfig,

    /// Content root: `{root}/{source_dir}`.
    pub source_root: PathBuf,

    /// Output root: `{root}/{output_dir}`.
    pub output_root: PathBuf,
}

impl PipelineContext {
    /// Resolve the context from the current working directory.
    pub fn resolve() -> Result<Self> {
        let cwd = env::current_dir().map_err(|e| {
            QuireError::UserError(format!("failed to get current working directory: {}", e))
        })?;

        Self::resolve_from(&cwd)
    }

    /// Resolve the context starting at `start`.
    ///
    /// The nearest ancestor holding `quire.yaml` is the project root; when
    /// there is none, `start` itself is the root and the default layout
    /// applies.
    pub fn resolve_from<P: AsRef<Path>>(start: P) -> Result<Self> {
        let start = absolute(start.as_ref())?;

        let root = start
            .ancestors()
            .find(|dir| dir.join(CONFIG_FILE_NAME).is_file())
            .unwrap_or(start.as_path())
            .to_path_buf();

        let config = PipelineConfig::load_or_default(root.join(CONFIG_FILE_NAME))?;
        Ok(Self::with_config(root, config))
    }

    /// Build a context for `root` with an already-loaded config.
    pub fn with_config(root: PathBuf, config: PipelineConfig) -> Self {
        let source_root = root.join(&config.source_dir);
        let output_root = root.join(&config.output_dir);

        Self {
            root,
            config,
            source_root,
            output_root,
        }
    }

    /// A fragment store over the content root.
    pub fn store(&self) -> FsFragmentStore {
        FsFragmentStore::new(&self.source_root)
    }

    /// Fail with a user error when the content root does not exist.
    pub fn require_source_root(&self) -> Result<()> {
        if self.source_root.is_dir() {
            return Ok(());
        }

        Err(QuireError::UserError(format!(
            "content root '{}' not found.\n\n\
             Run `quire init` to scaffold one, or set `source_dir` in {}.",
            self.source_root.display(),
            CONFIG_FILE_NAME
        )))
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    path.canonicalize().map_err(|e| {
        QuireError::UserError(format!(
            "failed to resolve project directory '{}': {}",
            path.display(),
            e
        ))
    })
}
