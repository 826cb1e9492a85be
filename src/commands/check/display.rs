//! Display and reporting functions for the check command.

use super::CheckReport;
use crate::validate::IssueSeverity;

/// Render the check report.
pub fn format_report(report: &CheckReport) -> String {
    let mut text = String::new();

    if report.issues.is_empty() {
        text.push_str(&format!(
            "Profile '{}' is valid ({} artifact(s)). No issues detected.\n",
            report.profile, report.artifacts
        ));
        return text;
    }

    text.push_str(&format!(
        "Issues in profile '{}' ({}):\n\n",
        report.profile,
        report.issues.len()
    ));

    for (i, issue) in report.issues.iter().enumerate() {
        text.push_str(&format!("  {}. [{}] {}\n", i + 1, issue.severity, issue));
    }

    let errors = report.count(IssueSeverity::Error);
    let warnings = report.count(IssueSeverity::Warning);

    text.push('\n');
    text.push_str(&format!(
        "Summary: {} errors, {} warnings.\n",
        errors, warnings
    ));

    if errors > 0 {
        text.push_str("Fix the errors above; `quire compile` refuses to write output until then.\n");
    }

    text
}
