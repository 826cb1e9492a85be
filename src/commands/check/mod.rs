//! Implementation of the `quire check` command.
//!
//! Loads, resolves and validates a profile without writing anything, then
//! prints every issue found. The exit code reflects the outcome:
//! - 0 when the profile has no errors (warnings are allowed)
//! - 2 when validation found errors
//! - the load/reference exit codes when the plan cannot be built

mod display;


use crate::cli::CheckArgs;
use crate::compile::load_plan;
use crate::context::PipelineContext;
use crate::error::{QuireError, Result};
use crate::validate::{Issue, IssueSeverity, ValidationResult, collect_issues};

pub(super) use display::format_report;

/// Result of checking one profile.
#[derive(Debug)]
pub(super) struct CheckReport {
    pub profile: String,
    pub artifacts: usize,
    pub issues: Vec<Issue>,
}

impl CheckReport {
    pub fn count(&self, severity: IssueSeverity) -> usize {
        self.issues
            .iter()
            .filter(|issue| issue.severity == severity)
            .count()
    }
}

/// Execute the `quire check` command.
pub fn cmd_check(ctx: &PipelineContext, args: CheckArgs) -> Result<()> {
    let report = build_report(ctx, args.profile.as_deref())?;
    print!("{}", format_report(&report));

    let result = ValidationResult::from_issues(&report.issues);
    if !result.valid {
        return Err(QuireError::ValidationError(format!(
            "profile '{}' has {} error(s)",
            report.profile,
            result.errors.len()
        )));
    }

    Ok(())
}

pub(super) fn build_report(ctx: &PipelineContext, profile: Option<&str>) -> Result<CheckReport> {
    let profile = profile.unwrap_or(&ctx.config.default_profile);

    let plan = load_plan(ctx, profile)?;
    tracing::info!(profile, artifacts = plan.artifacts.len(), "resolved build plan");

    let issues = collect_issues(&plan, &ctx.store(), &ctx.config)?;
    tracing::info!(issues = issues.len(), "validated build plan");

    Ok(CheckReport {
        profile: plan.profile,
        artifacts: plan.artifacts.len(),
        issues,
    })
}
