//! Profile documents.
//!
//! A profile (`profiles/<name>.yaml`) says which artifacts to build and,
//! per artifact, which fragment groups sit at the top and bottom and which
//! capabilities are bound inlined or invokable:
//!
//! ```yaml
//! artifacts:
//!   reviewer:
//!     top: principles            # one group name or a list
//!     bottom: [output-format]
//!     inlined:
//!       - linting                # bare id
//!     invokable:
//!       - id: security-scan      # id with a usage note
//!         usage: run before merge
//! ```
//!
//! Artifacts keep their declared order; it is the compile order.


use crate::config::PipelineConfig;
use crate::error::{QuireError, Result};
use crate::registry::{load_document, validate_id};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};
use std::collections::HashSet;
use std::path::Path;

/// A capability bound to an artifact, with an optional usage note.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "CapabilityRefRepr")]
pub struct CapabilityRef {
    pub id: String,
    pub usage: Option<String>,
}

impl CapabilityRef {
    #[cfg(test)]
    pub fn new(id: impl Into<String>, usage: Option<&str>) -> Self {
        Self {
            id: id.into(),
            usage: usage.map(str::to_string),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CapabilityRefRepr {
    Id(String),
    Record(CapabilityRefRecord),
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct CapabilityRefRecord {
    id: String,
    #[serde(default)]
    usage: Option<String>,
}

impl From<CapabilityRefRepr> for CapabilityRef {
    fn from(repr: CapabilityRefRepr) -> Self {
        match repr {
            CapabilityRefRepr::Id(id) => Self { id, usage: None },
            CapabilityRefRepr::Record(record) => Self {
                id: record.id,
                usage: record.usage,
            },
        }
    }
}

/// One artifact's bindings within a profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileArtifactBinding {
    /// Profile key; filled in after decoding.
    #[serde(skip)]
    pub artifact_id: String,

    /// Fragment groups rendered after the intro.
    #[serde(default, deserialize_with = "group_names")]
    pub top: Vec<String>,

    /// Fragment groups rendered before the closing reminders.
    #[serde(default, deserialize_with = "group_names")]
    pub bottom: Vec<String>,

    /// Capabilities whose content is inlined into the document.
    #[serde(default)]
    pub inlined: Vec<CapabilityRef>,

    /// Capabilities referenced by metadata only.
    #[serde(default)]
    pub invokable: Vec<CapabilityRef>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn group_names<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(name)) => vec![name],
        Some(OneOrMany::Many(names)) => names,
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProfileFile {
    artifacts: IndexMap<String, ProfileArtifactBinding>,
}

/// A loaded profile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileConfig {
    pub name: String,
    /// Bindings keyed by artifact id, in declaration order.
    pub artifacts: IndexMap<String, ProfileArtifactBinding>,
}

impl ProfileConfig {
    /// Load the profile `name` from the content root.
    ///
    /// A missing profile file is a load error that lists the profiles
    /// that do exist.
    pub fn load(source_root: &Path, config: &PipelineConfig, name: &str) -> Result<Self> {
        validate_id("profile", name, Path::new(&config.profiles_dir))
            .map_err(|_| QuireError::UserError(format!("invalid profile name '{}'", name)))?;

        let path = source_root.join(config.profile_path(name));
        if !path.is_file() {
            let available = list_profiles(source_root, config).unwrap_or_default();
            return Err(QuireError::load(
                &path,
                format!(
                    "profile '{}' not found (available: {})",
                    name,
                    format_available(&available)
                ),
            ));
        }

        let profile = Self::build(name, load_document(&path)?, &path)?;
        tracing::debug!(profile = name, artifacts = profile.artifacts.len(), "profile loaded");
        Ok(profile)
    }

    /// Parse profile YAML; `path` labels errors.
    #[cfg(test)]
    pub fn from_yaml(name: &str, yaml: &str, path: &Path) -> Result<Self> {
        Self::build(name, crate::registry::parse_document(yaml, path)?, path)
    }

    fn build(name: &str, file: ProfileFile, path: &Path) -> Result<Self> {
        let mut artifacts = IndexMap::with_capacity(file.artifacts.len());

        for (artifact_id, mut binding) in file.artifacts {
            validate_id("artifact", &artifact_id, path)?;

            for group in binding.top.iter().chain(&binding.bottom) {
                validate_id("fragment group", group, path)?;
            }

            check_unique(&artifact_id, "inlined", &binding.inlined, path)?;
            check_unique(&artifact_id, "invokable", &binding.invokable, path)?;

            binding.artifact_id = artifact_id.clone();
            artifacts.insert(artifact_id, binding);
        }

        Ok(Self {
            name: name.to_string(),
            artifacts,
        })
    }
}

fn check_unique(artifact_id: &str, list: &str, refs: &[CapabilityRef], path: &Path) -> Result<()> {
    let mut seen = HashSet::new();

    for capability in refs {
        validate_id("capability", &capability.id, path)?;
        if !seen.insert(capability.id.as_str()) {
            return Err(QuireError::load(
                path,
                format!(
                    "artifact '{}' binds capability '{}' twice in its {} list",
                    artifact_id, capability.id, list
                ),
            ));
        }
    }

    Ok(())
}

/// Names of the profiles under the profiles directory, sorted.
pub fn list_profiles(source_root: &Path, config: &PipelineConfig) -> Result<Vec<String>> {
    let dir = source_root.join(&config.profiles_dir);
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let entries = std::fs::read_dir(&dir).map_err(|e| QuireError::io("read directory", &dir, e))?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| QuireError::io("read directory entry in", &dir, e))?;
        let path = entry.path();

        if path.extension().and_then(|e| e.to_str()) != Some("yaml") || !path.is_file() {
            continue;
        }

        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            names.push(stem.to_string());
        }
    }

    names.sort();
    Ok(names)
}

pub(crate) fn format_available<S: AsRef<str>>(ids: &[S]) -> String {
    if ids.is_empty() {
        "none".to_string()
    } else {
        ids.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(", ")
    }
}
