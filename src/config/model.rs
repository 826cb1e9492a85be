//! PipelineConfig struct definition and default implementation.

use super::types::*;
use serde::{Deserialize, Serialize};

/// Configuration for a quire project.
///
/// This struct represents the contents of `quire.yaml`. All paths are
/// relative: content paths to the project root's `source_dir`, output paths
/// to `output_dir`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    // =========================================================================
    // Content layout
    // =========================================================================
    /// Content root holding registries, profiles and fragments.
    #[serde(default = "default_source_dir")]
    pub source_dir: String,

    /// Artifact registry file, relative to `source_dir`.
    #[serde(default = "default_artifact_registry")]
    pub artifact_registry: String,

    /// Capability registry file, relative to `source_dir`.
    #[serde(default = "default_capability_registry")]
    pub capability_registry: String,

    /// Directory of profile documents, relative to `source_dir`.
    #[serde(default = "default_profiles_dir")]
    pub profiles_dir: String,

    /// Profile used when `--profile` is not given.
    #[serde(default = "default_profile")]
    pub default_profile: String,

    /// Directory of per-artifact fixed fragments (`<dir>/<id>/intro.md`, ...).
    #[serde(default = "default_artifacts_dir")]
    pub artifacts_dir: String,

    /// Directory of fragment groups (`<dir>/<group>/*.md`).
    #[serde(default = "default_fragments_dir")]
    pub fragments_dir: String,

    /// Glob selecting the members of a fragment group directory.
    #[serde(default = "default_fragment_glob")]
    pub fragment_glob: String,

    /// Optional custom document template, relative to `source_dir`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_template: Option<String>,

    // =========================================================================
    // Output layout
    // =========================================================================
    /// Output root, relative to the project root. Replaced wholesale per run.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Directory for compiled artifact documents, relative to `output_dir`.
    #[serde(default = "default_artifact_output_dir")]
    pub artifact_output_dir: String,

    /// Directory for standalone capability documents, relative to `output_dir`.
    #[serde(default = "default_capability_output_dir")]
    pub capability_output_dir: String,

    /// File name of each standalone capability document.
    #[serde(default = "default_capability_file_name")]
    pub capability_file_name: String,

    /// Whether to write `manifest.json` next to the outputs.
    #[serde(default = "default_true")]
    pub write_manifest: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            source_dir: default_source_dir(),
            artifact_registry: default_artifact_registry(),
            capability_registry: default_capability_registry(),
            profiles_dir: default_profiles_dir(),
            default_profile: default_profile(),
            artifacts_dir: default_artifacts_dir(),
            fragments_dir: default_fragments_dir(),
            fragment_glob: default_fragment_glob(),
            document_template: None,
            output_dir: default_output_dir(),
            artifact_output_dir: default_artifact_output_dir(),
            capability_output_dir: default_capability_output_dir(),
            capability_file_name: default_capability_file_name(),
            write_manifest: default_true(),
        }
    }
}
