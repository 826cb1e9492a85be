//! Run orchestration: plan loading, parallel compilation, and flushing.

use super::document::{self, BUILTIN_TEMPLATE, DocumentParts};
use super::template::Template;
use super::{BuildManifest, BuildOutput, CompiledCapability, CompiledOutput};
use crate::config::{FixedFragment, MANIFEST_FILE_NAME, PipelineConfig};
use crate::context::PipelineContext;
use crate::error::{QuireError, Result};
use crate::fragment::{FragmentStore, IncludeResolver, IncludeWarning, group_members};
use crate::fs::StagedOutput;
use crate::profile::ProfileConfig;
use crate::registry::Registry;
use crate::resolve::{Capability, ResolvedArtifact, ResolvedPlan, resolve};
use crate::validate::{ValidationResult, validate};
use globset::GlobMatcher;
use rayon::prelude::*;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Name reported for template errors when no custom template is configured.
const BUILTIN_TEMPLATE_NAME: &str = "<built-in document template>";

/// Options for one compile run.
#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    /// Profile to compile; the configured default when `None`.
    pub profile: Option<String>,
    /// Worker threads; rayon's default when `None`.
    pub jobs: Option<usize>,
}

/// What a successful compile wrote.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub profile: String,
    pub output_root: PathBuf,
    pub artifacts: usize,
    pub capabilities: usize,
    pub warnings: Vec<String>,
}

/// Compiles artifacts and capabilities from a fragment store.
///
/// Holds only shared references and immutable state, so one compiler is
/// used from every worker thread.
pub struct Compiler<'a> {
    store: &'a dyn FragmentStore,
    config: &'a PipelineConfig,
    template: Template,
    matcher: GlobMatcher,
}

impl<'a> Compiler<'a> {
    /// Prepare a compiler, parsing the document template once.
    pub fn new(store: &'a dyn FragmentStore, config: &'a PipelineConfig) -> Result<Self> {
        let (name, source) = match &config.document_template {
            Some(path) => {
                let source = store
                    .read(Path::new(path))
                    .map_err(|e| QuireError::io("read document template", Path::new(path), e))?;
                (path.as_str(), source)
            }
            None => (BUILTIN_TEMPLATE_NAME, BUILTIN_TEMPLATE.to_string()),
        };

        let template = Template::parse(&source)
            .and_then(|template| {
                template.check_placeholders(&document::known_placeholders())?;
                Ok(template)
            })
            .map_err(|source| QuireError::TemplateError {
                template: name.to_string(),
                source,
            })?;

        Ok(Self {
            store,
            config,
            template,
            matcher: config.fragment_glob_matcher()?,
        })
    }

    /// Compile every artifact and every distinct stored capability.
    pub fn compile_plan(&self, plan: &ResolvedPlan) -> Result<BuildOutput> {
        let artifacts: Vec<&ResolvedArtifact> = plan.artifacts.values().collect();
        let capabilities: Vec<&Capability> = plan
            .distinct_capabilities()
            .into_iter()
            .filter(|capability| !capability.is_dynamic())
            .collect();

        let (artifacts, capabilities) = rayon::join(
            || {
                artifacts
                    .par_iter()
                    .map(|artifact| self.compile_artifact(artifact))
                    .collect::<Result<Vec<_>>>()
            },
            || {
                capabilities
                    .par_iter()
                    .map(|capability| self.compile_capability(capability))
                    .collect::<Result<Vec<_>>>()
            },
        );

        Ok(BuildOutput {
            profile: plan.profile.clone(),
            artifacts: artifacts?,
            capabilities: capabilities?.into_iter().flatten().collect(),
            validation_warnings: Vec::new(),
        })
    }

    /// Compile one artifact document.
    pub fn compile_artifact(&self, artifact: &ResolvedArtifact) -> Result<CompiledOutput> {
        let mut warnings = Vec::new();
        let id = artifact.id.as_str();

        let mut parts = DocumentParts {
            intro: self.fixed_fragment(id, FixedFragment::Intro, &mut warnings)?,
            workflow: self.fixed_fragment(id, FixedFragment::Workflow, &mut warnings)?,
            examples: self.fixed_fragment(id, FixedFragment::Examples, &mut warnings)?,
            critical_requirements: self.fixed_fragment(
                id,
                FixedFragment::CriticalRequirements,
                &mut warnings,
            )?,
            critical_reminders: self.fixed_fragment(
                id,
                FixedFragment::CriticalReminders,
                &mut warnings,
            )?,
            ..DocumentParts::default()
        };

        for group in &artifact.top_fragments {
            parts.top_fragments.push(self.fragment_group(group, &mut warnings)?);
        }
        for group in &artifact.bottom_fragments {
            parts.bottom_fragments.push(self.fragment_group(group, &mut warnings)?);
        }
        for capability in &artifact.inlined_capabilities {
            let body = match &capability.path {
                Some(path) => Some(self.expand_file(path, &mut warnings)?),
                None => None,
            };
            parts.inlined_bodies.push(body);
        }

        let values = document::section_values(artifact, &parts, self.config)?;
        let rendered = self
            .template
            .render(&values)
            .map_err(|source| QuireError::TemplateError {
                template: self.template_name(),
                source,
            })?;

        tracing::debug!(artifact = id, "artifact compiled");

        Ok(CompiledOutput {
            artifact_id: artifact.id.clone(),
            path: self.config.artifact_output_path(id),
            content: document::finish(&rendered),
            warnings: label(&format!("artifact '{}'", id), warnings),
        })
    }

    /// Compile the standalone document of a capability.
    ///
    /// Dynamic capabilities have no stored content and produce nothing.
    pub fn compile_capability(&self, capability: &Capability) -> Result<Option<CompiledCapability>> {
        let Some(path) = &capability.path else {
            return Ok(None);
        };

        let mut warnings = Vec::new();
        let content = self.expand_file(path, &mut warnings)?;

        tracing::debug!(capability = %capability.id, "capability compiled");

        Ok(Some(CompiledCapability {
            id: capability.id.clone(),
            path: self.config.capability_output_path(&capability.id),
            content,
            warnings: label(&format!("capability '{}'", capability.id), warnings),
        }))
    }

    fn template_name(&self) -> String {
        self.config
            .document_template
            .clone()
            .unwrap_or_else(|| BUILTIN_TEMPLATE_NAME.to_string())
    }

    fn fixed_fragment(
        &self,
        artifact_id: &str,
        fragment: FixedFragment,
        warnings: &mut Vec<IncludeWarning>,
    ) -> Result<String> {
        let path = self.config.fixed_fragment_path(artifact_id, fragment);

        if !fragment.is_required() && !self.store.exists(&path) {
            return Ok(String::new());
        }

        self.expand_file(&path, warnings)
    }

    /// Concatenate a group's members in name order, then expand the result.
    fn fragment_group(&self, group: &str, warnings: &mut Vec<IncludeWarning>) -> Result<String> {
        let dir = self.config.fragment_group_dir(group);
        let members = group_members(self.store, &dir, &self.matcher)
            .map_err(|e| QuireError::io("list fragment group", &dir, e))?;

        let mut texts = Vec::with_capacity(members.len());
        for member in &members {
            let text = self
                .store
                .read(member)
                .map_err(|e| QuireError::io("read fragment", member, e))?;
            texts.push(text.trim_end().to_string());
        }

        let visited: BTreeSet<PathBuf> = members.into_iter().collect();
        let expansion = IncludeResolver::new(self.store).expand(&texts.join("\n\n"), &dir, &visited);
        warnings.extend(expansion.warnings);
        Ok(expansion.text)
    }

    fn expand_file(&self, path: &Path, warnings: &mut Vec<IncludeWarning>) -> Result<String> {
        let expansion = IncludeResolver::new(self.store)
            .expand_file(path)
            .map_err(|e| QuireError::io("read fragment", path, e))?;
        warnings.extend(expansion.warnings);
        Ok(expansion.text)
    }
}

fn label(owner: &str, warnings: Vec<IncludeWarning>) -> Vec<String> {
    warnings
        .into_iter()
        .map(|warning| format!("{}: {}", owner, warning))
        .collect()
}

/// Load the registries and `profile`, and resolve them into a plan.
pub fn load_plan(ctx: &PipelineContext, profile: &str) -> Result<ResolvedPlan> {
    ctx.require_source_root()?;

    let registry = Registry::load(&ctx.source_root, &ctx.config)?;
    let profile = ProfileConfig::load(&ctx.source_root, &ctx.config, profile)?;
    resolve(&registry, &profile)
}

/// Run the full pipeline: load, resolve, validate, compile, flush.
///
/// The output directory is only touched once everything compiled.
pub fn compile_project(ctx: &PipelineContext, options: &CompileOptions) -> Result<RunSummary> {
    let profile = options
        .profile
        .as_deref()
        .unwrap_or(&ctx.config.default_profile);

    let plan = load_plan(ctx, profile)?;
    tracing::info!(profile, artifacts = plan.artifacts.len(), "resolved build plan");

    let store = ctx.store();
    let validation = validate(&plan, &store, &ctx.config)?;
    if !validation.valid {
        return Err(QuireError::ValidationError(describe_failures(profile, &validation)));
    }
    tracing::info!(summary = %validation.summary(), "validated build plan");

    let compiler = Compiler::new(&store, &ctx.config)?;
    let mut build = match options.jobs {
        Some(jobs) => worker_pool(jobs)?.install(|| compiler.compile_plan(&plan))?,
        None => compiler.compile_plan(&plan)?,
    };
    for warning in build
        .artifacts
        .iter()
        .flat_map(|a| &a.warnings)
        .chain(build.capabilities.iter().flat_map(|c| &c.warnings))
    {
        tracing::warn!("{}", warning);
    }
    build.validation_warnings = validation.warnings;
    tracing::info!(
        artifacts = build.artifacts.len(),
        capabilities = build.capabilities.len(),
        "compiled in memory"
    );

    flush(ctx, &build)?;
    tracing::info!(output = %ctx.output_root.display(), "output written");

    Ok(RunSummary {
        profile: build.profile.clone(),
        output_root: ctx.output_root.clone(),
        artifacts: build.artifacts.len(),
        capabilities: build.capabilities.len(),
        warnings: build.warnings(),
    })
}

/// Stage every output file and swap the output directory into place.
pub fn flush(ctx: &PipelineContext, build: &BuildOutput) -> Result<()> {
    let staged = StagedOutput::begin(&ctx.output_root)?;

    for artifact in &build.artifacts {
        staged.write(&artifact.path, &artifact.content)?;
    }
    for capability in &build.capabilities {
        staged.write(&capability.path, &capability.content)?;
    }
    if ctx.config.write_manifest {
        let manifest = BuildManifest::for_build(build).to_json()?;
        staged.write(Path::new(MANIFEST_FILE_NAME), &manifest)?;
    }

    staged.commit()
}

/// Format validation errors for a `ValidationError`.
pub(crate) fn describe_failures(profile: &str, validation: &ValidationResult) -> String {
    let mut message = format!(
        "{} error(s) in profile '{}'; no output was written",
        validation.errors.len(),
        profile
    );
    for error in &validation.errors {
        message.push_str("\n  - ");
        message.push_str(error);
    }
    message
}

fn worker_pool(jobs: usize) -> Result<rayon::ThreadPool> {
    if jobs == 0 {
        return Err(QuireError::UserError(
            "--jobs must be at least 1".to_string(),
        ));
    }

    rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .build()
        .map_err(|e| QuireError::UserError(format!("failed to start {} compile workers: {}", jobs, e)))
}
