//! Configuration constants, fixed fragment kinds, and serde defaults.

/// Project configuration file name at the project root.
pub const CONFIG_FILE_NAME: &str = "quire.yaml";

/// Build manifest file name at the output root.
pub const MANIFEST_FILE_NAME: &str = "manifest.json";

/// Extension of fixed per-artifact fragments.
pub const FRAGMENT_EXTENSION: &str = "md";

/// The fixed fragments every artifact directory may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FixedFragment {
    /// Opening prose of the artifact (required).
    Intro,
    /// Main workflow / self-correction body (required).
    Workflow,
    /// Worked examples (optional).
    Examples,
    /// Requirement block rendered at the top (optional).
    CriticalRequirements,
    /// Reminder block rendered at the bottom (optional).
    CriticalReminders,
}

impl FixedFragment {
    /// All fixed fragments in validation order.
    pub const ALL: [FixedFragment; 5] = [
        FixedFragment::Intro,
        FixedFragment::Workflow,
        FixedFragment::Examples,
        FixedFragment::CriticalRequirements,
        FixedFragment::CriticalReminders,
    ];

    /// File stem under `<artifacts_dir>/<artifact-id>/`.
    pub fn stem(self) -> &'static str {
        match self {
            FixedFragment::Intro => "intro",
            FixedFragment::Workflow => "workflow",
            FixedFragment::Examples => "examples",
            FixedFragment::CriticalRequirements => "critical-requirements",
            FixedFragment::CriticalReminders => "critical-reminders",
        }
    }

    /// File name including the fragment extension.
    pub fn file_name(self) -> String {
        format!("{}.{}", self.stem(), FRAGMENT_EXTENSION)
    }

    /// Whether a missing fragment is a validation error rather than a warning.
    pub fn is_required(self) -> bool {
        matches!(self, FixedFragment::Intro | FixedFragment::Workflow)
    }
}

impl std::fmt::Display for FixedFragment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.stem())
    }
}

// Default value functions for serde
pub(crate) fn default_source_dir() -> String {
    "src".to_string()
}
pub(crate) fn default_artifact_registry() -> String {
    "artifacts.yaml".to_string()
}
pub(crate) fn default_capability_registry() -> String {
    "capabilities.yaml".to_string()
}
pub(crate) fn default_profiles_dir() -> String {
    "profiles".to_string()
}
pub(crate) fn default_profile() -> String {
    "default".to_string()
}
pub(crate) fn default_artifacts_dir() -> String {
    "artifacts".to_string()
}
pub(crate) fn default_fragments_dir() -> String {
    "fragments".to_string()
}
pub(crate) fn default_fragment_glob() -> String {
    "*.md".to_string()
}
pub(crate) fn default_output_dir() -> String {
    "dist".to_string()
}
pub(crate) fn default_artifact_output_dir() -> String {
    "agents".to_string()
}
pub(crate) fn default_capability_output_dir() -> String {
    "capabilities".to_string()
}
pub(crate) fn default_capability_file_name() -> String {
    "capability.md".to_string()
}
pub(crate) fn default_true() -> bool {
    true
}
