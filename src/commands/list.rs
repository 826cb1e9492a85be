//! Implementation of the `quire list` command.
//!
//! Without `--profile`, lists the available profiles. With it, resolves
//! the profile and lists its artifacts with their bindings.

use crate::cli::ListArgs;
use crate::compile::load_plan;
use crate::context::PipelineContext;
use crate::error::Result;
use crate::profile::list_profiles;
use crate::registry::OutputShape;
use crate::resolve::{Capability, ResolvedPlan};

/// Execute the `quire list` command.
pub fn cmd_list(ctx: &PipelineContext, args: ListArgs) -> Result<()> {
    ctx.require_source_root()?;

    let text = match args.profile.as_deref() {
        Some(profile) => format_plan(&load_plan(ctx, profile)?),
        None => {
            let profiles = list_profiles(&ctx.source_root, &ctx.config)?;
            format_profiles(&profiles, &ctx.config.default_profile)
        }
    };

    print!("{}", text);
    Ok(())
}

fn format_profiles(profiles: &[String], default_profile: &str) -> String {
    if profiles.is_empty() {
        return "No profiles found.\n".to_string();
    }

    let mut text = format!("Profiles ({}):\n", profiles.len());
    for profile in profiles {
        if profile == default_profile {
            text.push_str(&format!("  {} (default)\n", profile));
        } else {
            text.push_str(&format!("  {}\n", profile));
        }
    }
    text
}

fn format_plan(plan: &ResolvedPlan) -> String {
    let mut text = format!(
        "Profile '{}' ({} artifact(s)):\n",
        plan.profile,
        plan.artifacts.len()
    );

    for artifact in plan.artifacts.values() {
        let shape = match artifact.output_shape {
            OutputShape::Markdown => "markdown",
            OutputShape::Frontmatter => "frontmatter",
        };
        text.push_str(&format!(
            "\n  {} - {} [{}]\n",
            artifact.id, artifact.title, shape
        ));

        push_line(&mut text, "top", &artifact.top_fragments.join(", "));
        push_line(&mut text, "bottom", &artifact.bottom_fragments.join(", "));
        push_line(&mut text, "inlined", &capability_list(&artifact.inlined_capabilities));
        push_line(
            &mut text,
            "invokable",
            &capability_list(&artifact.invokable_capabilities),
        );
    }

    text
}

fn push_line(text: &mut String, label: &str, value: &str) {
    if !value.is_empty() {
        text.push_str(&format!("    {:<10} {}\n", format!("{}:", label), value));
    }
}

fn capability_list(capabilities: &[Capability]) -> String {
    capabilities
        .iter()
        .map(|capability| {
            let mut entry = capability.id.clone();
            if capability.is_dynamic() {
                entry.push_str(" [dynamic]");
            }
            if let Some(usage) = capability.usage_note() {
                entry.push_str(&format!(" ({})", usage));
            }
            entry
        })
        .collect::<Vec<_>>()
        .join(", ")
}
