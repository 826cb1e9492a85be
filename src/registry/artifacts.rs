//! Artifact definitions.

use super::{load_document, validate_id};
use crate::error::Result;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How the header of a compiled document is rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputShape {
    /// `# title` heading followed by the description.
    #[default]
    Markdown,
    /// YAML frontmatter carrying name, description and runtime hints.
    Frontmatter,
}

/// Static metadata of one compiled document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArtifactDefinition {
    /// Registry key; filled in after decoding.
    #[serde(skip)]
    pub id: String,

    pub title: String,

    pub description: String,

    /// Hints for the consuming runtime (e.g. `model`, `tools`), in
    /// declaration order.
    #[serde(default)]
    pub runtime_hints: IndexMap<String, String>,

    #[serde(default)]
    pub output_shape: OutputShape,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ArtifactRegistryFile {
    artifacts: IndexMap<String, ArtifactDefinition>,
}

/// The artifact catalog, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct ArtifactRegistry {
    definitions: IndexMap<String, ArtifactDefinition>,
}

impl ArtifactRegistry {
    /// Load the registry file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        Self::build(load_document(path)?, path)
    }

    /// Parse registry YAML; `path` labels errors.
    #[cfg(test)]
    pub fn from_yaml(yaml: &str, path: &Path) -> Result<Self> {
        Self::build(super::parse_document(yaml, path)?, path)
    }

    fn build(file: ArtifactRegistryFile, path: &Path) -> Result<Self> {
        let mut definitions = IndexMap::with_capacity(file.artifacts.len());

        for (id, mut definition) in file.artifacts {
            validate_id("artifact", &id, path)?;
            definition.id = id.clone();
            definitions.insert(id, definition);
        }

        Ok(Self { definitions })
    }

    pub fn get(&self, id: &str) -> Option<&ArtifactDefinition> {
        self.definitions.get(id)
    }

    /// Registered ids, in declaration order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.definitions.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }
}
