//! Document template engine.
//!
//! A document template is plain text with `{placeholder}` slots. It is
//! parsed once per run and rendered once per artifact.
//!
//! # Syntax
//!
//! - `{name}` - Substitutes the value of placeholder `name`
//! - `{{` - Renders as literal `{`
//! - `}}` - Renders as literal `}`
//!
//! There are no loops or conditionals. Substituted values are inserted
//! verbatim and never scanned again, so fragment text containing braces is
//! safe.
//!
//! # Error Handling
//!
//! Undefined placeholders are errors rather than silent empty strings, so a
//! typo in a custom template fails the compile instead of dropping a
//! section.

use std::collections::HashMap;
use std::fmt;

/// Error type for template parsing and rendering failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// A placeholder was referenced but no value was provided.
    UndefinedPlaceholder {
        name: String,
        /// Byte offset of the opening `{`.
        position: usize,
    },
    /// A `{` was found without a matching `}`.
    UnmatchedBrace { position: usize },
    /// An empty placeholder (`{}` or `{  }`).
    EmptyPlaceholder { position: usize },
    /// Artifact frontmatter could not be serialized.
    Frontmatter { reason: String },
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateError::UndefinedPlaceholder { name, position } => {
                write!(
                    f,
                    "undefined placeholder '{}' at position {}",
                    name, position
                )
            }
            TemplateError::UnmatchedBrace { position } => {
                write!(f, "unmatched '{{' at position {}", position)
            }
            TemplateError::EmptyPlaceholder { position } => {
                write!(f, "empty placeholder '{{}}' at position {}", position)
            }
            TemplateError::Frontmatter { reason } => {
                write!(f, "failed to serialize frontmatter: {}", reason)
            }
        }
    }
}

impl std::error::Error for TemplateError {}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder { name: String, position: usize },
}

/// A parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    /// Parse `source`, resolving escapes and locating placeholders.
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = source.char_indices().peekable();

        while let Some((pos, ch)) = chars.next() {
            match ch {
                '{' if matches!(chars.peek(), Some((_, '{'))) => {
                    chars.next();
                    literal.push('{');
                }
                '{' => {
                    let mut name = String::new();
                    loop {
                        match chars.next() {
                            Some((_, '}')) => break,
                            Some((_, c)) => name.push(c),
                            None => return Err(TemplateError::UnmatchedBrace { position: pos }),
                        }
                    }

                    let name = name.trim();
                    if name.is_empty() {
                        return Err(TemplateError::EmptyPlaceholder { position: pos });
                    }

                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Placeholder {
                        name: name.to_string(),
                        position: pos,
                    });
                }
                '}' => {
                    // `}}` is an escape; a lone `}` is literal too.
                    if matches!(chars.peek(), Some((_, '}'))) {
                        chars.next();
                    }
                    literal.push('}');
                }
                _ => literal.push(ch),
            }
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self { segments })
    }

    /// Placeholder names in order of appearance (repeats included).
    #[cfg(test)]
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Placeholder { name, .. } => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Check that every placeholder is one of `known`.
    pub fn check_placeholders(&self, known: &[&str]) -> Result<(), TemplateError> {
        for segment in &self.segments {
            if let Segment::Placeholder { name, position } = segment
                && !known.contains(&name.as_str())
            {
                return Err(TemplateError::UndefinedPlaceholder {
                    name: name.clone(),
                    position: *position,
                });
            }
        }
        Ok(())
    }

    /// Render with `values`.
    pub fn render(&self, values: &HashMap<&str, String>) -> Result<String, TemplateError> {
        let mut result = String::new();

        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => result.push_str(text),
                Segment::Placeholder { name, position } => match values.get(name.as_str()) {
                    Some(value) => result.push_str(value),
                    None => {
                        return Err(TemplateError::UndefinedPlaceholder {
                            name: name.clone(),
                            position: *position,
                        });
                    }
                },
            }
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(template: &str, values: &HashMap<&str, String>) -> Result<String, TemplateError> {
        Template::parse(template)?.render(values)
    }

    fn values<'a>(pairs: &[(&'a str, &str)]) -> HashMap<&'a str, String> {
        pairs
            .iter()
            .map(|(name, value)| (*name, value.to_string()))
            .collect()
    }

    #[test]
    fn test_simple_substitution() {
        let values = values(&[("title", "Reviewer"), ("intro", "You review.")]);
        let result = render("# {title}\n\n{intro}", &values).unwrap();
        assert_eq!(result, "# Reviewer\n\nYou review.");
    }

    #[test]
    fn test_plain_text_is_unchanged() {
        let result = render("Just plain text", &HashMap::new()).unwrap();
        assert_eq!(result, "Just plain text");
        assert_eq!(render("", &HashMap::new()).unwrap(), "");
    }

    #[test]
    fn test_escape_braces() {
        let result = render("Use {{name}} and a }} b", &HashMap::new()).unwrap();
        assert_eq!(result, "Use {name} and a } b");
    }

    #[test]
    fn test_lone_closing_brace() {
        let result = render("a } b", &HashMap::new()).unwrap();
        assert_eq!(result, "a } b");
    }

    #[test]
    fn test_undefined_placeholder_error() {
        let err = render("Hello {name}", &HashMap::new()).unwrap_err();
        assert_eq!(
            err,
            TemplateError::UndefinedPlaceholder {
                name: "name".to_string(),
                position: 6
            }
        );
    }

    #[test]
    fn test_unmatched_brace_error() {
        let err = Template::parse("Hello {name").unwrap_err();
        assert_eq!(err, TemplateError::UnmatchedBrace { position: 6 });
    }

    #[test]
    fn test_empty_placeholder_error() {
        assert_eq!(
            Template::parse("Hello {}").unwrap_err(),
            TemplateError::EmptyPlaceholder { position: 6 }
        );
        assert_eq!(
            Template::parse("Hello {  }").unwrap_err(),
            TemplateError::EmptyPlaceholder { position: 6 }
        );
    }

    #[test]
    fn test_whitespace_in_placeholder_is_trimmed() {
        let values = values(&[("name", "Alice")]);
        assert_eq!(render("Hi { name }!", &values).unwrap(), "Hi Alice!");
    }

    #[test]
    fn test_values_are_not_rescanned() {
        let values = values(&[("body", "{intro} and {{braces}}")]);
        let result = render("[{body}]", &values).unwrap();
        assert_eq!(result, "[{intro} and {{braces}}]");
    }

    #[test]
    fn test_parse_once_render_many() {
        let template = Template::parse("{a}-{b}-{a}").unwrap();

        let first = template.render(&values(&[("a", "1"), ("b", "2")])).unwrap();
        let second = template.render(&values(&[("a", "x"), ("b", "")])).unwrap();

        assert_eq!(first, "1-2-1");
        assert_eq!(second, "x--x");
    }

    #[test]
    fn test_placeholders_in_order() {
        let template = Template::parse("{header}\n{{not}}\n{intro}{header}").unwrap();
        assert_eq!(
            template.placeholders().collect::<Vec<_>>(),
            vec!["header", "intro", "header"]
        );
    }

    #[test]
    fn test_check_placeholders() {
        let template = Template::parse("{intro}\n{outro}").unwrap();

        assert!(template.check_placeholders(&["intro", "outro"]).is_ok());
        assert_eq!(
            template.check_placeholders(&["intro"]).unwrap_err(),
            TemplateError::UndefinedPlaceholder {
                name: "outro".to_string(),
                position: 8
            }
        );
    }

    #[test]
    fn test_unicode_positions_are_byte_offsets() {
        let err = render("日本 {x}", &HashMap::new()).unwrap_err();
        assert_eq!(
            err,
            TemplateError::UndefinedPlaceholder {
                name: "x".to_string(),
                position: 7
            }
        );
    }

    #[test]
    fn test_error_display() {
        let err = TemplateError::UndefinedPlaceholder {
            name: "foo".to_string(),
            position: 10,
        };
        assert_eq!(err.to_string(), "undefined placeholder 'foo' at position 10");
        assert_eq!(
            TemplateError::UnmatchedBrace { position: 5 }.to_string(),
            "unmatched '{' at position 5"
        );
        assert_eq!(
            TemplateError::EmptyPlaceholder { position: 3 }.to_string(),
            "empty placeholder '{}' at position 3"
        );
    }
}
