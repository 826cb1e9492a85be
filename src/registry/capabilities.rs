//! Capability definitions.

use super::{load_document, validate_id};
use crate::error::{QuireError, Result};
use crate::fragment::normalize_logical;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A reusable fragment in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CapabilityDefinition {
    /// Registry key; filled in after decoding.
    #[serde(skip)]
    pub id: String,

    /// Logical path of the stored content. Absent for dynamic capabilities.
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Display name.
    pub name: String,

    pub description: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CapabilityRegistryFile {
    capabilities: IndexMap<String, CapabilityDefinition>,
}

/// The capability catalog, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct CapabilityRegistry {
    definitions: IndexMap<String, CapabilityDefinition>,
}

impl CapabilityRegistry {
    /// Load the registry file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        Self::build(load_document(path)?, path)
    }

    /// Parse registry YAML; `path` labels errors.
    #[cfg(test)]
    pub fn from_yaml(yaml: &str, path: &Path) -> Result<Self> {
        Self::build(super::parse_document(yaml, path)?, path)
    }

    fn build(file: CapabilityRegistryFile, path: &Path) -> Result<Self> {
        let mut definitions = IndexMap::with_capacity(file.capabilities.len());

        for (id, mut definition) in file.capabilities {
            validate_id("capability", &id, path)?;

            if let Some(storage) = &definition.path {
                let normalized = normalize_logical(storage)
                    .filter(|p| !p.as_os_str().is_empty())
                    .ok_or_else(|| {
                        QuireError::load(
                            path,
                            format!(
                                "capability '{}' has path '{}' outside the content root",
                                id,
                                storage.display()
                            ),
                        )
                    })?;
                definition.path = Some(normalized);
            }

            definition.id = id.clone();
            definitions.insert(id, definition);
        }

        Ok(Self { definitions })
    }

    pub fn get(&self, id: &str) -> Option<&CapabilityDefinition> {
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
