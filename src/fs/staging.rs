//! Staged replacement of an output directory.
//!
//! A [`StagedOutput`] collects files in a hidden sibling of the target
//! directory. [`StagedOutput::commit`] swaps it into place:
//!
//! 1. the existing target is renamed aside (`.{name}.previous`)
//! 2. the staging directory is renamed to the target
//! 3. the previous output is removed
//!
//! If step 2 fails, the previous output is restored. A failure in step 3
//! only logs a warning. A `.previous` directory found while the target is
//! missing is never deleted; commit fails instead. Dropping an
//! uncommitted `StagedOutput` removes the staging directory and leaves the
//! target untouched.

use super::atomic::atomic_write_file;
use crate::error::{QuireError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// A staging directory that replaces `target` on commit.
#[derive(Debug)]
pub struct StagedOutput {
    target: PathBuf,
    staging: PathBuf,
    committed: bool,
}

impl StagedOutput {
    /// Create an empty staging directory next to `target`.
    ///
    /// A staging directory left behind by an interrupted run is discarded.
    pub fn begin(target: &Path) -> Result<Self> {
        let staging = sibling(target, "staging")?;

        if staging.exists() {
            fs::remove_dir_all(&staging)
                .map_err(|e| QuireError::io("remove stale staging directory", &staging, e))?;
        }
        fs::create_dir_all(&staging)
            .map_err(|e| QuireError::io("create staging directory", &staging, e))?;

        tracing::debug!(staging = %staging.display(), "staging output");

        Ok(Self {
            target: target.to_path_buf(),
            staging,
            committed: false,
        })
    }

    /// Stage `content` at `relative` (relative to the output root).
    pub fn write(&self, relative: &Path, content: &str) -> Result<()> {
        atomic_write_file(self.staging.join(relative), content)
    }

    /// Swap the staged files into place.
    ///
    /// A `.previous` directory is only discarded while the target exists;
    /// without a target it is the last copy of an earlier output.
    pub fn commit(mut self) -> Result<()> {
        let previous = sibling(&self.target, "previous")?;
        let had_previous = self.target.exists();

        if previous.exists() {
            if !had_previous {
                return Err(QuireError::IoError(format!(
                    "'{}' holds the output of an interrupted run and '{}' is missing; \
                     restore or remove it before compiling again",
                    previous.display(),
                    self.target.display()
                )));
            }
            fs::remove_dir_all(&previous)
                .map_err(|e| QuireError::io("remove stale previous output", &previous, e))?;
        }

        if had_previous {
            fs::rename(&self.target, &previous)
                .map_err(|e| QuireError::io("move aside previous output", &self.target, e))?;
        }

        if let Err(e) = fs::rename(&self.staging, &self.target) {
            if had_previous && let Err(restore) = fs::rename(&previous, &self.target) {
                return Err(QuireError::IoError(format!(
                    "failed to move staged output into '{}': {}; restoring the previous output \
                     also failed ({}), it is kept at '{}'",
                    self.target.display(),
                    e,
                    restore,
                    previous.display()
                )));
            }
            return Err(QuireError::io("move staged output into", &self.target, e));
        }
        self.committed = true;

        if had_previous {
            discard_previous(&previous);
        }

        tracing::debug!(output = %self.target.display(), "output swapped into place");
        Ok(())
    }
}

/// Remove the moved-aside output. The new output is already in place, so
/// a failure only leaves a stale directory behind.
fn discard_previous(previous: &Path) -> bool {
    match fs::remove_dir_all(previous) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(
                path = %previous.display(),
                "failed to remove previous output: {}",
                e
            );
            false
        }
    }
}

impl Drop for StagedOutput {
    fn drop(&mut self) {
        if !self.committed {
            let _ = fs::remove_dir_all(&self.staging);
        }
    }
}

fn sibling(target: &Path, suffix: &str) -> Result<PathBuf> {
    let name = target
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| QuireError::io("stage output for", target, "invalid directory name"))?;
    let parent = target.parent().unwrap_or(Path::new("."));

    Ok(parent.join(format!(".{}.{}", name, suffix)))
}
