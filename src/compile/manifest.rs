//! Build manifest written next to the compiled outputs.
//!
//! `manifest.json` records what one compile produced:
//! - `profile`: the profile that was compiled
//! - `generated_at`: RFC3339 timestamp
//! - `generated_by`: the actor string (e.g. `user@HOST`)
//! - `artifacts` / `capabilities`: id and output path of every file written
//! - `warnings`: every non-fatal warning raised during the run

use super::BuildOutput;
use crate::error::{QuireError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One written file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub id: String,
    /// Path relative to the output root, `/`-separated.
    pub path: String,
}

/// The manifest document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildManifest {
    pub profile: String,
    pub generated_at: DateTime<Utc>,
    pub generated_by: String,
    pub artifacts: Vec<ManifestEntry>,
    pub capabilities: Vec<ManifestEntry>,
    pub warnings: Vec<String>,
}

impl BuildManifest {
    /// Describe `build`, stamped with the current time and actor.
    pub fn for_build(build: &BuildOutput) -> Self {
        Self {
            profile: build.profile.clone(),
            generated_at: Utc::now(),
            generated_by: actor_string(),
            artifacts: build
                .artifacts
                .iter()
                .map(|output| ManifestEntry {
                    id: output.artifact_id.clone(),
                    path: slash_path(&output.path),
                })
                .collect(),
            capabilities: build
                .capabilities
                .iter()
                .map(|output| ManifestEntry {
                    id: output.id.clone(),
                    path: slash_path(&output.path),
                })
                .collect(),
            warnings: build.warnings(),
        }
    }

    /// Pretty JSON with a trailing newline.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map(|json| json + "\n")
            .map_err(|e| QuireError::IoError(format!("failed to serialize build manifest: {}", e)))
    }
}

/// `user@host` for the manifest.
fn actor_string() -> String {
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string());

    let host = hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    format!("{}@{}", user, host)
}

pub(crate) fn slash_path(path: &std::path::Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
