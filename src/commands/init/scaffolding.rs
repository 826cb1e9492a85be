//! File scaffolding for the init command.
//!
//! Writes `quire.yaml` and a small content root that compiles cleanly: one
//! artifact with every fixed fragment, one fragment group that uses an
//! include, and one stored capability.

use crate::config::{FixedFragment, PipelineConfig};
use crate::error::Result;
use crate::fs::atomic_write_file;
use std::path::{Path, PathBuf};

/// Id of the sample artifact.
pub(super) const SAMPLE_ARTIFACT: &str = "assistant";

const ARTIFACT_REGISTRY: &str = "\
artifacts:
  assistant:
    title: Project Assistant
    description: Answers questions about this project
    runtime_hints:
      model: sonnet
";

const CAPABILITY_REGISTRY: &str = "\
capabilities:
  summarize:
    path: capabilities/summarize.md
    name: Summarize
    description: Condense long material into key points
";

const DEFAULT_PROFILE: &str = "\
artifacts:
  assistant:
    top: principles
    inlined:
      - id: summarize
        usage: the user shares a long document
";

const CONFIG_HEADER: &str = "\
# quire project configuration.
# Every key is optional; the values below are the defaults.
";

/// Write `quire.yaml` with the default settings.
pub(super) fn write_config(path: &Path, config: &PipelineConfig) -> Result<()> {
    let yaml = config.to_yaml()?;
    atomic_write_file(path, &format!("{}{}", CONFIG_HEADER, yaml))
}

/// Sample content files, as logical paths under the content root.
pub(super) fn sample_files(config: &PipelineConfig) -> Vec<(PathBuf, &'static str)> {
    let fixed = |fragment| config.fixed_fragment_path(SAMPLE_ARTIFACT, fragment);
    let principles = config.fragment_group_dir("principles");

    vec![
        (config.artifact_registry_path(), ARTIFACT_REGISTRY),
        (config.capability_registry_path(), CAPABILITY_REGISTRY),
        (config.profile_path(&config.default_profile), DEFAULT_PROFILE),
        (
            fixed(FixedFragment::Intro),
            "You are the assistant for this project.\n",
        ),
        (
            fixed(FixedFragment::Workflow),
            "1. Restate the question.\n2. Look up the relevant files.\n3. Answer with references.\n",
        ),
        (
            fixed(FixedFragment::Examples),
            "Question: where is the build configured?\nAnswer: in `quire.yaml`.\n",
        ),
        (
            fixed(FixedFragment::CriticalRequirements),
            "Never invent file names.\n",
        ),
        (
            fixed(FixedFragment::CriticalReminders),
            "Cite the files you used.\n",
        ),
        (
            principles.join("01-core.md"),
            "Be precise and brief.\n\n@include(/fragments/shared/tone.md)\n",
        ),
        (
            Path::new(&config.fragments_dir).join("shared").join("tone.md"),
            "Keep a neutral, friendly tone.\n",
        ),
        (
            PathBuf::from("capabilities").join("summarize.md"),
            "List the key points first, then the open questions.\n",
        ),
    ]
}

/// Write every sample file that does not exist yet.
///
/// Returns the logical paths that were written; existing files are kept.
pub(super) fn write_sample_content(
    source_root: &Path,
    config: &PipelineConfig,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    for (logical, content) in sample_files(config) {
        let path = source_root.join(&logical);
        if path.exists() {
            tracing::debug!(path = %path.display(), "keeping existing file");
            continue;
        }

        atomic_write_file(&path, content)?;
        written.push(logical);
    }

    Ok(written)
}
