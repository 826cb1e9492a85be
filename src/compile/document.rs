//! Artifact document layout.
//!
//! A document is assembled from named sections. Each section renders to
//! either an empty string (omitted) or its trimmed content followed by a
//! blank line, so the built-in template can simply concatenate them in
//! order:
//!
//! | placeholder              | content                                   |
//! |--------------------------|-------------------------------------------|
//! | `header`                 | frontmatter or `# title` + description    |
//! | `critical_requirements`  | `<critical_requirements>` block           |
//! | `intro`                  | intro fragment                            |
//! | `top_fragments`          | top fragment groups                       |
//! | `workflow`               | workflow fragment                         |
//! | `examples`               | examples fragment                         |
//! | `inlined_capabilities`   | `<capability>` blocks with full content   |
//! | `invokable_capabilities` | metadata list, never the content          |
//! | `bottom_fragments`       | bottom fragment groups                    |
//! | `critical_reminders`     | `<critical_reminders>` block              |
//!
//! Custom templates may also use `id`, `title` and `description`.

use super::manifest::slash_path;
use super::template::TemplateError;
use crate::config::PipelineConfig;
use crate::error::{QuireError, Result};
use crate::registry::OutputShape;
use crate::resolve::{Capability, ResolvedArtifact};
use indexmap::IndexMap;
use std::collections::HashMap;

/// Section placeholders in document order.
pub const SECTION_PLACEHOLDERS: [&str; 10] = [
    "header",
    "critical_requirements",
    "intro",
    "top_fragments",
    "workflow",
    "examples",
    "inlined_capabilities",
    "invokable_capabilities",
    "bottom_fragments",
    "critical_reminders",
];

/// Scalar placeholders available to custom templates.
pub const FIELD_PLACEHOLDERS: [&str; 3] = ["id", "title", "description"];

/// The template used when `document_template` is not configured.
pub const BUILTIN_TEMPLATE: &str = "{header}{critical_requirements}{intro}{top_fragments}\
{workflow}{examples}{inlined_capabilities}{invokable_capabilities}{bottom_fragments}\
{critical_reminders}";

/// Every placeholder a document template may reference.
pub fn known_placeholders() -> Vec<&'static str> {
    SECTION_PLACEHOLDERS
        .iter()
        .chain(FIELD_PLACEHOLDERS.iter())
        .copied()
        .collect()
}

/// Expanded content of one artifact, before layout.
#[derive(Debug, Clone, Default)]
pub struct DocumentParts {
    pub intro: String,
    pub workflow: String,
    pub examples: String,
    pub critical_requirements: String,
    pub critical_reminders: String,
    /// Expanded content per top group, in binding order.
    pub top_fragments: Vec<String>,
    pub bottom_fragments: Vec<String>,
    /// Expanded content per inlined capability; `None` for dynamic ones.
    pub inlined_bodies: Vec<Option<String>>,
}

/// Lay out `parts` into the placeholder values for `artifact`.
pub fn section_values(
    artifact: &ResolvedArtifact,
    parts: &DocumentParts,
    config: &PipelineConfig,
) -> Result<HashMap<&'static str, String>> {
    let mut values = HashMap::new();

    values.insert("id", artifact.id.clone());
    values.insert("title", artifact.title.clone());
    values.insert("description", artifact.description.clone());

    values.insert("header", block(&header(artifact)?));
    values.insert(
        "critical_requirements",
        tagged_block("critical_requirements", &parts.critical_requirements),
    );
    values.insert("intro", block(&parts.intro));
    values.insert("top_fragments", joined_blocks(&parts.top_fragments));
    values.insert("workflow", block(&parts.workflow));
    values.insert("examples", block(&parts.examples));
    values.insert(
        "inlined_capabilities",
        joined_blocks(
            &artifact
                .inlined_capabilities
                .iter()
                .zip(&parts.inlined_bodies)
                .map(|(capability, body)| inlined_capability(capability, body.as_deref()))
                .collect::<Vec<_>>(),
        ),
    );
    values.insert(
        "invokable_capabilities",
        block(&invokable_listing(&artifact.invokable_capabilities, config)),
    );
    values.insert("bottom_fragments", joined_blocks(&parts.bottom_fragments));
    values.insert(
        "critical_reminders",
        tagged_block("critical_reminders", &parts.critical_reminders),
    );

    Ok(values)
}

/// Normalize a rendered document to end with exactly one newline.
pub fn finish(rendered: &str) -> String {
    let mut document = rendered.trim_end().to_string();
    document.push('\n');
    document
}

fn header(artifact: &ResolvedArtifact) -> Result<String> {
    match artifact.output_shape {
        OutputShape::Markdown => Ok(format!("# {}\n\n{}", artifact.title, artifact.description)),
        OutputShape::Frontmatter => {
            let mut fields: IndexMap<&str, &str> = IndexMap::new();
            fields.insert("name", &artifact.id);
            fields.insert("description", &artifact.description);
            for (key, value) in &artifact.runtime_hints {
                fields.entry(key.as_str()).or_insert(value.as_str());
            }

            let yaml =
                serde_yaml::to_string(&fields).map_err(|e| frontmatter_error(&artifact.id, e))?;

            Ok(format!("---\n{}---", yaml))
        }
    }
}

fn frontmatter_error(artifact_id: &str, e: serde_yaml::Error) -> QuireError {
    QuireError::TemplateError {
        template: format!("frontmatter of artifact '{}'", artifact_id),
        source: TemplateError::Frontmatter {
            reason: e.to_string(),
        },
    }
}

/// Trimmed content plus a blank line, or nothing.
fn block(content: &str) -> String {
    let content = content.trim_end();
    if content.trim().is_empty() {
        String::new()
    } else {
        format!("{}\n\n", content)
    }
}

fn joined_blocks(contents: &[String]) -> String {
    contents.iter().map(|content| block(content)).collect()
}

fn tagged_block(tag: &str, content: &str) -> String {
    if content.trim().is_empty() {
        return String::new();
    }
    block(&format!("<{tag}>\n{}\n</{tag}>", content.trim_end()))
}

fn inlined_capability(capability: &Capability, body: Option<&str>) -> String {
    let mut text = format!(
        "<capability id=\"{}\" name=\"{}\">\n",
        capability.id, capability.name
    );

    if let Some(usage) = capability.usage_note() {
        text.push_str(&format!("Use when: {}\n\n", usage));
    }

    match body {
        Some(body) => text.push_str(body.trim_end()),
        None => text.push_str(&format!(
            "{}\n\nThis capability is provided by the runtime; no stored content.",
            capability.description
        )),
    }

    text.push_str("\n</capability>");
    text
}

fn invokable_listing(capabilities: &[Capability], config: &PipelineConfig) -> String {
    if capabilities.is_empty() {
        return String::new();
    }

    let mut text = String::from("## Invokable capabilities\n");

    for capability in capabilities {
        text.push_str(&format!(
            "\n- **{}** (`{}`): {}\n",
            capability.name, capability.id, capability.description
        ));

        if let Some(usage) = capability.usage_note() {
            text.push_str(&format!("  - Use when: {}\n", usage));
        }

        if capability.is_dynamic() {
            text.push_str("  - Reference: provided by the runtime\n");
        } else {
            text.push_str(&format!(
                "  - Reference: `{}`\n",
                slash_path(&config.capability_output_path(&capability.id))
            ));
        }
    }

    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::template::Template;
    use crate::test_support::{artifact, capability};

    fn render(artifact: &ResolvedArtifact, parts: &DocumentParts) -> String {
        let values = section_values(artifact, parts, &PipelineConfig::default()).unwrap();
        let rendered = Template::parse(BUILTIN_TEMPLATE)
            .unwrap()
            .render(&values)
            .unwrap();
        finish(&rendered)
    }

    fn parts() -> DocumentParts {
        DocumentParts {
            intro: "You review code.\n".to_string(),
            workflow: "1. Read the diff.\n".to_string(),
            ..DocumentParts::default()
        }
    }

    #[test]
    fn test_minimal_markdown_document() {
        let document = render(&artifact("reviewer"), &parts());

        assert_eq!(
            document,
            "# reviewer title\n\nreviewer description\n\nYou review code.\n\n1. Read the diff.\n"
        );
    }

    #[test]
    fn test_frontmatter_header_carries_hints() {
        let mut reviewer = artifact("reviewer");
        reviewer.output_shape = OutputShape::Frontmatter;
        reviewer.runtime_hints.insert("model".to_string(), "opus".to_string());
        reviewer.runtime_hints.insert("name".to_string(), "ignored".to_string());

        let document = render(&reviewer, &parts());

        assert!(document.starts_with(
            "---\nname: reviewer\ndescription: reviewer description\nmodel: opus\n---\n\n"
        ));
        assert!(!document.contains("# reviewer title"));
    }

    #[test]
    fn test_sections_follow_document_order() {
        let mut reviewer = artifact("reviewer");
        reviewer.inlined_capabilities = vec![capability("linting", true, None)];
        reviewer.invokable_capabilities =
            vec![capability("security-scan", true, Some("run before merge"))];

        let parts = DocumentParts {
            intro: "INTRO".to_string(),
            workflow: "WORKFLOW".to_string(),
            examples: "EXAMPLES".to_string(),
            critical_requirements: "REQUIREMENTS".to_string(),
            critical_reminders: "REMINDERS".to_string(),
            top_fragments: vec!["TOP".to_string()],
            bottom_fragments: vec!["BOTTOM".to_string()],
            inlined_bodies: vec![Some("LINT BODY".to_string())],
        };

        let document = render(&reviewer, &parts);
        let order = [
            "# reviewer title",
            "<critical_requirements>\nREQUIREMENTS\n</critical_requirements>",
            "INTRO",
            "TOP",
            "WORKFLOW",
            "EXAMPLES",
            "<capability id=\"linting\" name=\"linting name\">\nLINT BODY\n</capability>",
            "## Invokable capabilities",
            "BOTTOM",
            "<critical_reminders>\nREMINDERS\n</critical_reminders>",
        ];

        let positions: Vec<usize> = order
            .iter()
            .map(|needle| document.find(needle).unwrap())
            .collect();
        assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
        assert!(document.ends_with("</critical_reminders>\n"));
    }

    #[test]
    fn test_invokable_listing_has_metadata_only() {
        let mut reviewer = artifact("reviewer");
        reviewer.invokable_capabilities = vec![
            capability("security-scan", true, Some("run before merge")),
            capability("web-search", false, Some("facts are stale")),
        ];

        let document = render(&reviewer, &parts());

        assert!(document.contains(
            "- **security-scan name** (`security-scan`): security-scan description\n  \
             - Use when: run before merge\n  \
             - Reference: `capabilities/security-scan/capability.md`\n"
        ));
        assert!(document.contains("  - Reference: provided by the runtime\n"));
        assert!(!document.contains("<capability"));
    }

    #[test]
    fn test_inlined_usage_and_dynamic_note() {
        let mut tester = artifact("tester");
        tester.inlined_capabilities = vec![
            capability("linting", true, Some("after writing tests")),
            capability("web-search", false, None),
        ];
        let parts = DocumentParts {
            inlined_bodies: vec![Some("lint\n".to_string()), None],
            ..parts()
        };

        let document = render(&tester, &parts);

        assert!(document.contains(
            "<capability id=\"linting\" name=\"linting name\">\nUse when: after writing tests\n\nlint\n</capability>"
        ));
        assert!(document.contains("web-search description\n\nThis capability is provided by the runtime"));
    }

    #[test]
    fn test_blank_sections_are_omitted() {
        let parts = DocumentParts {
            examples: "   \n\n".to_string(),
            critical_requirements: "\n".to_string(),
            top_fragments: vec![String::new()],
            ..parts()
        };

        let document = render(&artifact("a"), &parts);

        assert!(!document.contains("critical_requirements"));
        assert!(!document.contains("\n\n\n"));
    }

    #[test]
    fn test_known_placeholders_cover_builtin_template() {
        let template = Template::parse(BUILTIN_TEMPLATE).unwrap();
        assert!(template.check_placeholders(&known_placeholders()).is_ok());
        assert_eq!(template.placeholders().count(), SECTION_PLACEHOLDERS.len());
    }

    #[test]
    fn test_frontmatter_failure_is_a_render_error() {
        let yaml_error = serde_yaml::from_str::<serde_yaml::Value>("a: [").unwrap_err();

        let err = frontmatter_error("reviewer", yaml_error);

        assert_eq!(err.exit_code(), crate::exit_codes::TEMPLATE_FAILURE);
        assert!(matches!(
            err,
            QuireError::TemplateError {
                source: TemplateError::Frontmatter { .. },
                ..
            }
        ));
        assert!(err.to_string().contains("frontmatter of artifact 'reviewer'"));
    }
}
