//! Validation of a resolved build plan.
//!
//! Validation walks every artifact in the plan and queries the content root
//! through a [`FragmentStore`]. It never stops at the first problem: every
//! issue is collected so a single `quire check` surfaces all of them.
//!
//! Errors block compilation; warnings are logged and the compile proceeds.

mod checks;


use crate::config::PipelineConfig;
use crate::error::Result;
use crate::fragment::FragmentStore;
use crate::resolve::ResolvedPlan;

/// Severity level for issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueSeverity {
    /// Non-fatal: reported, compilation proceeds.
    Warning,
    /// Fatal: compilation is refused.
    Error,
}

impl std::fmt::Display for IssueSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IssueSeverity::Warning => write!(f, "WARNING"),
            IssueSeverity::Error => write!(f, "ERROR"),
        }
    }
}

/// A single problem found in the plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub severity: IssueSeverity,
    /// Artifact the issue belongs to, if any.
    pub artifact: Option<String>,
    pub description: String,
}

impl Issue {
    pub fn error(artifact: Option<&str>, description: impl Into<String>) -> Self {
        Self::new(IssueSeverity::Error, artifact, description)
    }

    pub fn warning(artifact: Option<&str>, description: impl Into<String>) -> Self {
        Self::new(IssueSeverity::Warning, artifact, description)
    }

    fn new(severity: IssueSeverity, artifact: Option<&str>, description: impl Into<String>) -> Self {
        Self {
            severity,
            artifact: artifact.map(str::to_string),
            description: description.into(),
        }
    }
}

impl std::fmt::Display for Issue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.artifact {
            Some(artifact) => write!(f, "artifact '{}': {}", artifact, self.description),
            None => write!(f, "{}", self.description),
        }
    }
}

/// Outcome of validating a plan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    /// True when `errors` is empty.
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub(crate) fn from_issues(issues: &[Issue]) -> Self {
        let (errors, warnings): (Vec<&Issue>, Vec<&Issue>) = issues
            .iter()
            .partition(|issue| issue.severity == IssueSeverity::Error);

        Self {
            valid: errors.is_empty(),
            errors: errors.iter().map(ToString::to_string).collect(),
            warnings: warnings.iter().map(ToString::to_string).collect(),
        }
    }

    /// One-line summary, e.g. `2 error(s), 1 warning(s)`.
    pub fn summary(&self) -> String {
        format!(
            "{} error(s), {} warning(s)",
            self.errors.len(),
            self.warnings.len()
        )
    }
}

/// Validate every artifact of `plan` against the content in `store`.
///
/// Only fails when the configured fragment glob cannot compile; every
/// content problem is reported in the returned [`ValidationResult`].
pub fn validate(
    plan: &ResolvedPlan,
    store: &dyn FragmentStore,
    config: &PipelineConfig,
) -> Result<ValidationResult> {
    let issues = collect_issues(plan, store, config)?;

    for issue in &issues {
        match issue.severity {
            IssueSeverity::Error => tracing::error!("{}", issue),
            IssueSeverity::Warning => tracing::warn!("{}", issue),
        }
    }

    let result = ValidationResult::from_issues(&issues);
    tracing::debug!(profile = %plan.profile, summary = %result.summary(), "plan validated");
    Ok(result)
}

/// Collect every issue in plan order.
pub fn collect_issues(
    plan: &ResolvedPlan,
    store: &dyn FragmentStore,
    config: &PipelineConfig,
) -> Result<Vec<Issue>> {
    let matcher = config.fragment_glob_matcher()?;
    let mut issues = Vec::new();

    checks::check_document_template(store, config, &mut issues);

    for artifact in plan.artifacts.values() {
        checks::check_fixed_fragments(artifact, store, config, &mut issues);
        checks::check_fragment_groups(artifact, store, config, &matcher, &mut issues);
        checks::check_capabilities(artifact, store, &mut issues);
    }

    Ok(issues)
}
