//! Individual validation checks.

use super::Issue;
use crate::config::{FixedFragment, PipelineConfig};
use crate::fragment::{FragmentStore, group_members};
use crate::resolve::ResolvedArtifact;
use globset::GlobMatcher;
use std::collections::HashSet;
use std::path::Path;

/// A configured custom template must exist.
pub fn check_document_template(
    store: &dyn FragmentStore,
    config: &PipelineConfig,
    issues: &mut Vec<Issue>,
) {
    if let Some(template) = &config.document_template
        && !store.exists(Path::new(template))
    {
        issues.push(Issue::error(
            None,
            format!("document template '{}' does not exist", template),
        ));
    }
}

/// Required fixed fragments must exist; optional ones only warn.
pub fn check_fixed_fragments(
    artifact: &ResolvedArtifact,
    store: &dyn FragmentStore,
    config: &PipelineConfig,
    issues: &mut Vec<Issue>,
) {
    for fragment in FixedFragment::ALL {
        let path = config.fixed_fragment_path(&artifact.id, fragment);
        if store.exists(&path) {
            continue;
        }

        if fragment.is_required() {
            issues.push(Issue::error(
                Some(&artifact.id),
                format!(
                    "required fragment '{}' is missing ({})",
                    fragment,
                    path.display()
                ),
            ));
        } else {
            issues.push(Issue::warning(
                Some(&artifact.id),
                format!(
                    "optional fragment '{}' is missing ({}); section omitted",
                    fragment,
                    path.display()
                ),
            ));
        }
    }
}

/// Every fragment group must be a directory with at least one member.
pub fn check_fragment_groups(
    artifact: &ResolvedArtifact,
    store: &dyn FragmentStore,
    config: &PipelineConfig,
    matcher: &GlobMatcher,
    issues: &mut Vec<Issue>,
) {
    for group in artifact.fragment_groups() {
        let dir = config.fragment_group_dir(group);

        if !store.is_dir(&dir) {
            issues.push(Issue::error(
                Some(&artifact.id),
                format!(
                    "fragment group '{}' does not exist ({})",
                    group,
                    dir.display()
                ),
            ));
            continue;
        }

        let members = match group_members(store, &dir, matcher) {
            Ok(members) => members,
            Err(e) => {
                issues.push(Issue::error(
                    Some(&artifact.id),
                    format!(
                        "failed to list fragment group '{}' ({}): {}",
                        group,
                        dir.display(),
                        e
                    ),
                ));
                continue;
            }
        };

        if members.is_empty() {
            issues.push(Issue::warning(
                Some(&artifact.id),
                format!(
                    "fragment group '{}' has no files matching '{}' ({})",
                    group,
                    config.fragment_glob,
                    dir.display()
                ),
            ));
        }
    }
}

/// Usage notes, storage paths and double bindings.
pub fn check_capabilities(
    artifact: &ResolvedArtifact,
    store: &dyn FragmentStore,
    issues: &mut Vec<Issue>,
) {
    for capability in &artifact.invokable_capabilities {
        if capability.usage_note().is_none() {
            issues.push(Issue::error(
                Some(&artifact.id),
                format!(
                    "invokable capability '{}' has no usage note",
                    capability.id
                ),
            ));
        }
    }

    let mut seen = HashSet::new();
    for capability in artifact.capabilities() {
        if !seen.insert(capability.id.as_str()) {
            continue;
        }

        match &capability.path {
            Some(path) if !store.exists(path) => issues.push(Issue::error(
                Some(&artifact.id),
                format!(
                    "capability '{}' content file does not exist ({})",
                    capability.id,
                    path.display()
                ),
            )),
            Some(_) => {}
            None => issues.push(Issue::warning(
                Some(&artifact.id),
                format!(
                    "capability '{}' has no storage path; treated as dynamic",
                    capability.id
                ),
            )),
        }
    }

    let inlined: HashSet<&str> = artifact
        .inlined_capabilities
        .iter()
        .map(|c| c.id.as_str())
        .collect();

    for capability in &artifact.invokable_capabilities {
        if inlined.contains(capability.id.as_str()) {
            issues.push(Issue::warning(
                Some(&artifact.id),
                format!(
                    "capability '{}' is bound both inlined and invokable",
                    capability.id
                ),
            ));
        }
    }
}
