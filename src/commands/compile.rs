//! Implementation of the `quire compile` command.

use crate::cli::CompileArgs;
use crate::compile::{CompileOptions, RunSummary, compile_project};
use crate::context::PipelineContext;
use crate::error::Result;
use std::path::Path;

/// Execute the `quire compile` command.
pub fn cmd_compile(ctx: &PipelineContext, args: CompileArgs) -> Result<()> {
    let options = CompileOptions {
        profile: args.profile,
        jobs: args.jobs,
    };

    let summary = compile_project(ctx, &options)?;
    print!("{}", format_summary(&summary, &ctx.root));
    Ok(())
}

/// Human-readable run summary; paths are shown relative to `root`.
pub(super) fn format_summary(summary: &RunSummary, root: &Path) -> String {
    let output = summary
        .output_root
        .strip_prefix(root)
        .unwrap_or(&summary.output_root);

    let mut text = format!(
        "Compiled profile '{}' into {}\n",
        summary.profile,
        output.display()
    );
    text.push_str(&format!("  Artifacts:    {}\n", summary.artifacts));
    text.push_str(&format!("  Capabilities: {}\n", summary.capabilities));
    text.push_str(&format!("  Warnings:     {}\n", summary.warnings.len()));
    text
}
