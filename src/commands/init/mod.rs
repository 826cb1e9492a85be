//! Implementation of the `quire init` command.
//!
//! # What `quire init` does
//!
//! 1. Refuses to run when the target directory already has `quire.yaml`
//! 2. Writes `quire.yaml` with the default settings
//! 3. Scaffolds a sample content root under `source_dir` (existing files
//!    are kept)
//!
//! The scaffold compiles without errors or warnings, so `quire compile`
//! works immediately after `quire init`.

mod scaffolding;

#[cfg(test)]
mod tests;

use crate::config::{CONFIG_FILE_NAME, PipelineConfig};
use crate::error::{QuireError, Result};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use scaffolding::*;

/// Execute the `quire init` command in `root`, or the current directory.
pub fn cmd_init(root: Option<&Path>) -> Result<()> {
    let root = match root {
        Some(root) => root.to_path_buf(),
        None => env::current_dir().map_err(|e| {
            QuireError::UserError(format!("failed to get current working directory: {}", e))
        })?,
    };

    let written = init_project(&root)?;

    println!("Initialized quire project in {}", root.display());
    println!();
    println!("Created files:");
    println!("  {}", CONFIG_FILE_NAME);
    for path in &written {
        println!("  {}", path.display());
    }
    println!();
    println!("Compile the sample profile with `quire compile`.");

    Ok(())
}

/// Scaffold a project in `root`; returns the files written, relative to `root`.
pub(super) fn init_project(root: &Path) -> Result<Vec<PathBuf>> {
    let config_path = root.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        return Err(QuireError::UserError(format!(
            "{} already exists in '{}'; refusing to overwrite an existing project",
            CONFIG_FILE_NAME,
            root.display()
        )));
    }

    fs::create_dir_all(root).map_err(|e| {
        QuireError::UserError(format!(
            "failed to create project directory '{}': {}",
            root.display(),
            e
        ))
    })?;

    let config = PipelineConfig::default();
    write_config(&config_path, &config)?;

    let source_dir = Path::new(&config.source_dir);
    let written = write_sample_content(&root.join(source_dir), &config)?
        .into_iter()
        .map(|path| source_dir.join(path))
        .collect();

    tracing::info!(root = %root.display(), "project scaffolded");
    Ok(written)
}
