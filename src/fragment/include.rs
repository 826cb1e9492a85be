//! Recursive `@include(path)` expansion.
//!
//! # Syntax
//!
//! - `@include(path)` - replaced by the expanded content of `path`
//! - `@include(/path)` - `path` is resolved against the content root instead
//!   of the including fragment's directory
//! - `\@include(path)` - escaped; left verbatim
//!
//! Directives inside inline code spans or fenced code blocks are quoted
//! documentation, not live directives, and are never expanded.
//!
//! # Failure Semantics
//!
//! Expansion never fails. Cycles, missing targets and paths escaping the
//! content root leave the directive verbatim and record an
//! [`IncludeWarning`], so one compile surfaces every problem.

use super::normalize_logical;
use super::store::FragmentStore;
use regex::Regex;
use std::collections::BTreeSet;
use std::fmt;
use std::io;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static INCLUDE_DIRECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"@include\(\s*([^()\s]+)\s*\)").expect("Invalid include directive regex")
});

const FENCE_MARKERS: [&str; 2] = ["```", "~~~"];

/// Why a directive was left unexpanded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IncludeWarningKind {
    /// The target is already being expanded higher up the include chain.
    Cycle,
    /// The target could not be read.
    Missing { reason: String },
    /// The target path climbs above the content root.
    OutsideRoot,
}

/// A non-fatal problem found while expanding directives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeWarning {
    pub kind: IncludeWarningKind,
    /// The include target (normalized when resolvable, verbatim otherwise).
    pub target: String,
    /// Directory the directive was resolved from.
    pub origin: PathBuf,
}

impl fmt::Display for IncludeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let origin = display_dir(&self.origin);
        match &self.kind {
            IncludeWarningKind::Cycle => write!(
                f,
                "circular include of '{}' from '{}'; directive left unexpanded",
                self.target, origin
            ),
            IncludeWarningKind::Missing { reason } => write!(
                f,
                "include target '{}' referenced from '{}' could not be read ({}); directive left unexpanded",
                self.target, origin, reason
            ),
            IncludeWarningKind::OutsideRoot => write!(
                f,
                "include target '{}' referenced from '{}' escapes the content root; directive left unexpanded",
                self.target, origin
            ),
        }
    }
}

/// Result of expanding a fragment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Expansion {
    /// The fully expanded text.
    pub text: String,
    /// Problems encountered, in document order.
    pub warnings: Vec<IncludeWarning>,
}

/// A live directive found in a text.
struct Directive<'t> {
    /// Byte span of the whole `@include(...)` match.
    span: Range<usize>,
    /// The path as written.
    target: &'t str,
}

/// Expands include directives against a [`FragmentStore`].
#[derive(Clone, Copy)]
pub struct IncludeResolver<'a> {
    store: &'a dyn FragmentStore,
}

impl<'a> IncludeResolver<'a> {
    /// Create a resolver reading from `store`.
    pub fn new(store: &'a dyn FragmentStore) -> Self {
        Self { store }
    }

    /// Expand every live directive in `text`.
    ///
    /// Relative targets resolve against `base_dir`. `visited` holds the
    /// logical paths already on the include chain; a directive naming one of
    /// them is a cycle and stays verbatim. Text with no live directive is
    /// returned unchanged.
    pub fn expand(&self, text: &str, base_dir: &Path, visited: &BTreeSet<PathBuf>) -> Expansion {
        let mut warnings = Vec::new();
        let text = self.expand_text(text, base_dir, visited, &mut warnings);
        Expansion { text, warnings }
    }

    /// Read the fragment at `path` and expand it.
    ///
    /// The fragment itself seeds the visited set, so a fragment including
    /// itself is reported as a cycle.
    pub fn expand_file(&self, path: &Path) -> io::Result<Expansion> {
        let path = normalize_logical(path).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("'{}' escapes the content root", path.display()),
            )
        })?;

        let text = self.store.read(&path)?;
        let visited = BTreeSet::from([path.clone()]);
        Ok(self.expand(&text, parent_dir(&path), &visited))
    }

    fn expand_text(
        &self,
        text: &str,
        base_dir: &Path,
        visited: &BTreeSet<PathBuf>,
        warnings: &mut Vec<IncludeWarning>,
    ) -> String {
        let directives = live_directives(text);
        if directives.is_empty() {
            return text.to_string();
        }

        let replacements: Vec<Option<String>> = directives
            .iter()
            .map(|directive| self.resolve_directive(directive.target, base_dir, visited, warnings))
            .collect();

        // Rebuild from the last span to the first so every splice lands on
        // the offsets recorded during the scan.
        let mut pieces: Vec<&str> = Vec::with_capacity(directives.len() * 2 + 1);
        let mut tail_end = text.len();
        for (directive, replacement) in directives.iter().zip(&replacements).rev() {
            pieces.push(&text[directive.span.end..tail_end]);
            pieces.push(match replacement {
                Some(expanded) => expanded.as_str(),
                None => &text[directive.span.clone()],
            });
            tail_end = directive.span.start;
        }
        pieces.push(&text[..tail_end]);
        pieces.reverse();
        pieces.concat()
    }

    fn resolve_directive(
        &self,
        target: &str,
        base_dir: &Path,
        visited: &BTreeSet<PathBuf>,
        warnings: &mut Vec<IncludeWarning>,
    ) -> Option<String> {
        let joined = match target.strip_prefix('/') {
            Some(rooted) => PathBuf::from(rooted),
            None => base_dir.join(target),
        };

        let Some(path) = normalize_logical(&joined) else {
            record(warnings, IncludeWarningKind::OutsideRoot, target, base_dir);
            return None;
        };
        let shown = path.display().to_string();

        if visited.contains(&path) {
            record(warnings, IncludeWarningKind::Cycle, &shown, base_dir);
            return None;
        }

        let content = match self.store.read(&path) {
            Ok(content) => content,
            Err(e) => {
                let kind = IncludeWarningKind::Missing {
                    reason: e.to_string(),
                };
                record(warnings, kind, &shown, base_dir);
                return None;
            }
        };

        tracing::debug!(include = %shown, origin = %display_dir(base_dir), "expanding include");

        let mut chain = visited.clone();
        chain.insert(path.clone());
        Some(self.expand_text(&content, parent_dir(&path), &chain, warnings))
    }
}

fn record(
    warnings: &mut Vec<IncludeWarning>,
    kind: IncludeWarningKind,
    target: &str,
    origin: &Path,
) {
    let warning = IncludeWarning {
        kind,
        target: target.to_string(),
        origin: origin.to_path_buf(),
    };
    tracing::warn!("{}", warning);
    warnings.push(warning);
}

/// Scan `text` for directives that are neither escaped nor quoted.
fn live_directives(text: &str) -> Vec<Directive<'_>> {
    let quoted = quoted_spans(text);

    INCLUDE_DIRECTIVE
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let target = caps.get(1)?;
            let start = whole.start();

            let escaped = start > 0 && text.as_bytes()[start - 1] == b'\\';
            let in_code = quoted.iter().any(|span| span.contains(&start));
            if escaped || in_code {
                return None;
            }

            Some(Directive {
                span: whole.range(),
                target: target.as_str(),
            })
        })
        .collect()
}

/// Byte spans of fenced code blocks and inline code spans.
///
/// An unterminated fence runs to the end of the text. An unmatched backtick
/// run is literal text.
fn quoted_spans(text: &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut open_fence: Option<(usize, &str)> = None;
    let mut offset = 0;

    for line in text.split_inclusive('\n') {
        let line_start = offset;
        offset += line.len();
        let trimmed = line.trim_start();

        match open_fence {
            Some((fence_start, marker)) => {
                if trimmed.starts_with(marker) {
                    spans.push(fence_start..offset);
                    open_fence = None;
                }
            }
            None => match FENCE_MARKERS.iter().find(|m| trimmed.starts_with(**m)) {
                Some(marker) => open_fence = Some((line_start, *marker)),
                None => inline_code_spans(line, line_start, &mut spans),
            },
        }
    }

    if let Some((fence_start, _)) = open_fence {
        spans.push(fence_start..text.len());
    }

    spans
}

fn inline_code_spans(line: &str, line_start: usize, spans: &mut Vec<Range<usize>>) {
    let bytes = line.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'`' {
            i += 1;
            continue;
        }

        let open = i;
        i = backtick_run_end(bytes, i);
        let run = i - open;

        // A code span closes on the next run of exactly the same length.
        let mut j = i;
        while j < bytes.len() {
            if bytes[j] != b'`' {
                j += 1;
                continue;
            }
            let close = j;
            j = backtick_run_end(bytes, j);
            if j - close == run {
                spans.push(line_start + open..line_start + j);
                i = j;
                break;
            }
        }
    }
}

fn backtick_run_end(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && bytes[i] == b'`' {
        i += 1;
    }
    i
}

fn parent_dir(path: &Path) -> &Path {
    path.parent().unwrap_or(Path::new(""))
}

fn display_dir(dir: &Path) -> String {
    if dir.as_os_str().is_empty() {
        ".".to_string()
    } else {
        dir.display().to_string()
    }
}
