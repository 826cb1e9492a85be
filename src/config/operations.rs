//! Config loading, validation, and layout helpers.

use super::model::PipelineConfig;
use super::types::FixedFragment;
use crate::error::{QuireError, Result};
use globset::{Glob, GlobMatcher};
use std::path::{Component, Path, PathBuf};

impl PipelineConfig {
    /// Load config from a YAML file.
    ///
    /// Unknown fields in the YAML are silently ignored for forward compatibility.
    ///
    /// # Returns
    ///
    /// * `Ok(PipelineConfig)` - Successfully loaded and validated config
    /// * `Err(QuireError::UserError)` - Read error, parse error or validation failure
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            QuireError::UserError(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Load `path` if it exists, otherwise fall back to the default layout.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse config from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // An empty document deserializes as unit, not as an empty mapping.
        let config: PipelineConfig = if yaml.trim().is_empty() {
            PipelineConfig::default()
        } else {
            serde_yaml::from_str(yaml).map_err(|e| {
                QuireError::UserError(format!("failed to parse quire.yaml: {}", e))
            })?
        };

        config.validate()?;
        Ok(config)
    }

    /// Serialize config to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| {
            QuireError::UserError(format!("failed to serialize config to YAML: {}", e))
        })
    }

    /// Validate config values and return error on invalid values.
    ///
    /// Validation rules:
    /// - every directory and file name must be non-empty and relative
    /// - no path may climb out of its root with `..`
    /// - `output_dir` must be a directory of its own, apart from `source_dir`
    /// - `capability_file_name` must be a bare file name
    /// - `fragment_glob` must compile
    pub fn validate(&self) -> Result<()> {
        let relative_fields = [
            ("source_dir", self.source_dir.as_str()),
            ("artifact_registry", self.artifact_registry.as_str()),
            ("capability_registry", self.capability_registry.as_str()),
            ("profiles_dir", self.profiles_dir.as_str()),
            ("artifacts_dir", self.artifacts_dir.as_str()),
            ("fragments_dir", self.fragments_dir.as_str()),
            ("output_dir", self.output_dir.as_str()),
            ("artifact_output_dir", self.artifact_output_dir.as_str()),
            ("capability_output_dir", self.capability_output_dir.as_str()),
        ];

        for (field, value) in relative_fields {
            ensure_relative(field, value)?;
        }

        if let Some(template) = &self.document_template {
            ensure_relative("document_template", template)?;
        }

        if self.default_profile.trim().is_empty() {
            return Err(QuireError::UserError(
                "config validation failed: default_profile must be non-empty".to_string(),
            ));
        }

        self.validate_output_layout()?;

        if self.capability_file_name.is_empty()
            || self.capability_file_name.contains(['/', '\\'])
        {
            return Err(QuireError::UserError(format!(
                "config validation failed: capability_file_name must be a bare file name (found '{}')",
                self.capability_file_name
            )));
        }

        self.fragment_glob_matcher()?;

        Ok(())
    }

    /// The output directory is replaced wholesale on every compile, so it
    /// must be a directory of its own: not the project root, and neither
    /// inside nor around the content root.
    fn validate_output_layout(&self) -> Result<()> {
        let output = normalize(&self.output_dir);
        let source = normalize(&self.source_dir);

        if output.as_os_str().is_empty() {
            return Err(QuireError::UserError(format!(
                "config validation failed: output_dir '{}' must name a directory below the project root; \
                 the output directory is replaced on every compile",
                self.output_dir
            )));
        }

        let conflict = if output == source {
            Some("must differ from source_dir")
        } else if source.starts_with(&output) {
            Some("must not contain source_dir")
        } else if output.starts_with(&source) {
            Some("must not be inside source_dir")
        } else {
            None
        };

        match conflict {
            Some(reason) => Err(QuireError::UserError(format!(
                "config validation failed: output_dir '{}' {} '{}'; \
                 the output directory is replaced on every compile",
                self.output_dir, reason, self.source_dir
            ))),
            None => Ok(()),
        }
    }

    /// Compile `fragment_glob` into a matcher for group member file names.
    pub fn fragment_glob_matcher(&self) -> Result<GlobMatcher> {
        Glob::new(self.fragment_glob.trim())
            .map(|glob| glob.compile_matcher())
            .map_err(|e| {
                QuireError::UserError(format!(
                    "config validation failed: invalid glob in fragment_glob: '{}' - {}",
                    self.fragment_glob, e
                ))
            })
    }

    // =========================================================================
    // Logical paths (relative to source_dir)
    // =========================================================================

    /// Path of the artifact registry.
    pub fn artifact_registry_path(&self) -> PathBuf {
        PathBuf::from(&self.artifact_registry)
    }

    /// Path of the capability registry.
    pub fn capability_registry_path(&self) -> PathBuf {
        PathBuf::from(&self.capability_registry)
    }

    /// Path of the profile document named `profile`.
    pub fn profile_path(&self, profile: &str) -> PathBuf {
        Path::new(&self.profiles_dir).join(format!("{}.yaml", profile))
    }

    /// Path of a fixed fragment for an artifact.
    pub fn fixed_fragment_path(&self, artifact_id: &str, fragment: FixedFragment) -> PathBuf {
        Path::new(&self.artifacts_dir)
            .join(artifact_id)
            .join(fragment.file_name())
    }

    /// Directory holding the members of a fragment group.
    pub fn fragment_group_dir(&self, group: &str) -> PathBuf {
        Path::new(&self.fragments_dir).join(group)
    }

    // =========================================================================
    // Output paths (relative to output_dir)
    // =========================================================================

    /// Output path of a compiled artifact document.
    pub fn artifact_output_path(&self, artifact_id: &str) -> PathBuf {
        Path::new(&self.artifact_output_dir).join(format!("{}.md", artifact_id))
    }

    /// Output path of a standalone capability document.
    pub fn capability_output_path(&self, capability_id: &str) -> PathBuf {
        Path::new(&self.capability_output_dir)
            .join(capability_id)
            .join(&self.capability_file_name)
    }
}

fn ensure_relative(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(QuireError::UserError(format!(
            "config validation failed: {} must be non-empty",
            field
        )));
    }

    let path = Path::new(value);
    if path.is_absolute() || value.starts_with('/') {
        return Err(QuireError::UserError(format!(
            "config validation failed: {} must be a relative path (found '{}')",
            field, value
        )));
    }

    if path.components().any(|c| matches!(c, Component::ParentDir)) {
        return Err(QuireError::UserError(format!(
            "config validation failed: {} must not contain '..' (found '{}')",
            field, value
        )));
    }

    Ok(())
}

fn normalize(value: &str) -> PathBuf {
    Path::new(value)
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}
