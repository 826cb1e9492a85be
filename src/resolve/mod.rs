//! Merge the registries with a profile into a resolved build plan.
//!
//! Resolution is pure and all-or-nothing: every artifact and capability id
//! a profile names must exist in the registries, or no plan is returned.


use crate::error::{QuireError, Result};
use crate::profile::{CapabilityRef, ProfileConfig, format_available};
use crate::registry::{ArtifactDefinition, CapabilityDefinition, OutputShape, Registry};
use indexmap::IndexMap;
use std::collections::HashSet;
use std::path::PathBuf;

/// A capability definition merged with the usage note of one binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capability {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Logical path of the stored content; `None` for dynamic capabilities.
    pub path: Option<PathBuf>,
    pub usage: Option<String>,
}

impl Capability {
    fn merge(definition: &CapabilityDefinition, binding: &CapabilityRef) -> Self {
        Self {
            id: definition.id.clone(),
            name: definition.name.clone(),
            description: definition.description.clone(),
            path: definition.path.clone(),
            usage: binding.usage.clone(),
        }
    }

    pub fn is_dynamic(&self) -> bool {
        self.path.is_none()
    }

    /// The usage note, if it has any non-whitespace content.
    pub fn usage_note(&self) -> Option<&str> {
        self.usage.as_deref().map(str::trim).filter(|u| !u.is_empty())
    }
}

/// Everything needed to compile one artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedArtifact {
    pub id: String,
    pub title: String,
    pub description: String,
    pub runtime_hints: IndexMap<String, String>,
    pub output_shape: OutputShape,
    pub top_fragments: Vec<String>,
    pub bottom_fragments: Vec<String>,
    pub inlined_capabilities: Vec<Capability>,
    pub invokable_capabilities: Vec<Capability>,
}

impl ResolvedArtifact {
    /// Inlined capabilities, then invokable ones.
    pub fn capabilities(&self) -> impl Iterator<Item = &Capability> {
        self.inlined_capabilities
            .iter()
            .chain(&self.invokable_capabilities)
    }

    /// Fragment groups, top then bottom.
    pub fn fragment_groups(&self) -> impl Iterator<Item = &str> {
        self.top_fragments
            .iter()
            .chain(&self.bottom_fragments)
            .map(String::as_str)
    }
}

/// The resolved build plan for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedPlan {
    pub profile: String,
    /// Artifacts in the profile's declared order.
    pub artifacts: IndexMap<String, ResolvedArtifact>,
}

impl ResolvedPlan {
    /// Every distinct capability bound anywhere in the plan.
    ///
    /// Ordered by first appearance: artifacts in plan order, inlined before
    /// invokable within an artifact. The first binding's record is kept.
    pub fn distinct_capabilities(&self) -> Vec<&Capability> {
        let mut seen = HashSet::new();
        let mut distinct = Vec::new();

        for capability in self.artifacts.values().flat_map(ResolvedArtifact::capabilities) {
            if seen.insert(capability.id.as_str()) {
                distinct.push(capability);
            }
        }

        distinct
    }
}

/// Resolve `profile` against `registry`.
///
/// # Errors
///
/// `ReferenceError` naming the profile and artifact when the profile binds
/// an unregistered artifact, or naming the capability and its owning
/// artifact when a binding references an unregistered capability.
pub fn resolve(registry: &Registry, profile: &ProfileConfig) -> Result<ResolvedPlan> {
    let mut artifacts = IndexMap::with_capacity(profile.artifacts.len());

    for (artifact_id, binding) in &profile.artifacts {
        let definition = registry.artifacts.get(artifact_id).ok_or_else(|| {
            let available: Vec<&str> = registry.artifacts.ids().collect();
            QuireError::ReferenceError(format!(
                "profile '{}' binds artifact '{}' which is not in the artifact registry (available: {})",
                profile.name,
                artifact_id,
                format_available(&available)
            ))
        })?;

        let inlined = resolve_capabilities(registry, artifact_id, &binding.inlined)?;
        let invokable = resolve_capabilities(registry, artifact_id, &binding.invokable)?;

        artifacts.insert(
            artifact_id.clone(),
            assemble(definition, &binding.top, &binding.bottom, inlined, invokable),
        );
    }

    tracing::debug!(profile = %profile.name, artifacts = artifacts.len(), "plan resolved");

    Ok(ResolvedPlan {
        profile: profile.name.clone(),
        artifacts,
    })
}

fn resolve_capabilities(
    registry: &Registry,
    artifact_id: &str,
    refs: &[CapabilityRef],
) -> Result<Vec<Capability>> {
    refs.iter()
        .map(|binding| {
            registry
                .capabilities
                .get(&binding.id)
                .map(|definition| Capability::merge(definition, binding))
                .ok_or_else(|| {
                    let available: Vec<&str> = registry.capabilities.ids().collect();
                    QuireError::ReferenceError(format!(
                        "artifact '{}' references capability '{}' which is not in the capability registry (available: {})",
                        artifact_id,
                        binding.id,
                        format_available(&available)
                    ))
                })
        })
        .collect()
}

fn assemble(
    definition: &ArtifactDefinition,
    top: &[String],
    bottom: &[String],
    inlined: Vec<Capability>,
    invokable: Vec<Capability>,
) -> ResolvedArtifact {
    ResolvedArtifact {
        id: definition.id.clone(),
        title: definition.title.clone(),
        description: definition.description.clone(),
        runtime_hints: definition.runtime_hints.clone(),
        output_shape: definition.output_shape,
        top_fragments: top.to_vec(),
        bottom_fragments: bottom.to_vec(),
        inlined_capabilities: inlined,
        invokable_capabilities: invokable,
    }
}
