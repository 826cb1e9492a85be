//! Tests for fragment stores and include expansion.

use super::*;
use crate::test_support::{MemoryFragmentStore, ProjectFixture};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

fn expand(store: &MemoryFragmentStore, path: &str) -> Expansion {
    IncludeResolver::new(store)
        .expand_file(Path::new(path))
        .unwrap()
}

#[test]
fn test_normalize_logical() {
    assert_eq!(
        normalize_logical(Path::new("a/./b/../c.md")),
        Some(PathBuf::from("a/c.md"))
    );
    assert_eq!(
        normalize_logical(Path::new("/a/b.md")),
        Some(PathBuf::from("a/b.md"))
    );
    assert_eq!(normalize_logical(Path::new("a/../../b.md")), None);
}

#[test]
fn test_text_without_directives_is_unchanged() {
    let store = MemoryFragmentStore::new();
    let resolver = IncludeResolver::new(&store);

    for text in [
        "",
        "plain text",
        "include(a.md) without the at sign",
        "@include without parentheses",
        "multi\nline\n\ntext with { braces }\n",
    ] {
        let expansion = resolver.expand(text, Path::new(""), &BTreeSet::new());
        assert_eq!(expansion.text, text);
        assert!(expansion.warnings.is_empty());
    }
}

#[test]
fn test_expands_relative_include() {
    let store = MemoryFragmentStore::new()
        .with("shared/main.md", "before\n@include(part.md)\nafter\n")
        .with("shared/part.md", "PART");

    let expansion = expand(&store, "shared/main.md");

    assert_eq!(expansion.text, "before\nPART\nafter\n");
    assert!(expansion.warnings.is_empty());
}

#[test]
fn test_expands_root_relative_include() {
    let store = MemoryFragmentStore::new()
        .with("artifacts/a/intro.md", "@include(/fragments/common.md)")
        .with("fragments/common.md", "COMMON");

    assert_eq!(expand(&store, "artifacts/a/intro.md").text, "COMMON");
}

#[test]
fn test_expands_parent_relative_include() {
    let store = MemoryFragmentStore::new()
        .with("a/b/main.md", "[@include(../x.md)]")
        .with("a/x.md", "X");

    assert_eq!(expand(&store, "a/b/main.md").text, "[X]");
}

#[test]
fn test_nested_includes_resolve_from_their_own_directory() {
    let store = MemoryFragmentStore::new()
        .with("top.md", "<@include(one/mid.md)>")
        .with("one/mid.md", "(@include(leaf.md))")
        .with("one/leaf.md", "LEAF");

    assert_eq!(expand(&store, "top.md").text, "<(LEAF)>");
}

#[test]
fn test_same_include_twice_expands_at_both_positions() {
    let store = MemoryFragmentStore::new()
        .with("main.md", "a @include(x.md) b @include(x.md) c")
        .with("x.md", "XX");

    let expansion = expand(&store, "main.md");

    assert_eq!(expansion.text, "a XX b XX c");
    assert!(expansion.warnings.is_empty());
}

#[test]
fn test_replacement_lengths_do_not_shift_later_splices() {
    let store = MemoryFragmentStore::new()
        .with("main.md", "@include(long.md)|@include(s.md)|@include(long.md)")
        .with("long.md", "a much longer replacement than the directive itself")
        .with("s.md", "");

    assert_eq!(
        expand(&store, "main.md").text,
        "a much longer replacement than the directive itself||a much longer replacement than the directive itself"
    );
}

#[test]
fn test_direct_cycle_terminates_with_warning() {
    let store = MemoryFragmentStore::new()
        .with("a.md", "A1 @include(b.md) A2")
        .with("b.md", "B1 @include(a.md) B2");

    let expansion = expand(&store, "a.md");

    assert_eq!(expansion.text, "A1 B1 @include(a.md) B2 A2");
    assert_eq!(expansion.warnings.len(), 1);
    assert_eq!(expansion.warnings[0].kind, IncludeWarningKind::Cycle);
    assert_eq!(expansion.warnings[0].target, "a.md");
    assert!(expansion.warnings[0].to_string().contains("circular include"));
}

#[test]
fn test_self_include_is_a_cycle() {
    let store = MemoryFragmentStore::new().with("self.md", "x @include(self.md) y");

    let expansion = expand(&store, "self.md");

    assert_eq!(expansion.text, "x @include(self.md) y");
    assert_eq!(expansion.warnings[0].kind, IncludeWarningKind::Cycle);
}

#[test]
fn test_longer_cycle_terminates() {
    let store = MemoryFragmentStore::new()
        .with("a.md", "a[@include(b.md)]")
        .with("b.md", "b[@include(c.md)]")
        .with("c.md", "c[@include(a.md)]");

    let expansion = expand(&store, "a.md");

    assert_eq!(expansion.text, "a[b[c[@include(a.md)]]]");
    assert_eq!(expansion.warnings.len(), 1);
}

#[test]
fn test_diamond_is_not_a_cycle() {
    let store = MemoryFragmentStore::new()
        .with("top.md", "@include(left.md)+@include(right.md)")
        .with("left.md", "L(@include(base.md))")
        .with("right.md", "R(@include(base.md))")
        .with("base.md", "base");

    let expansion = expand(&store, "top.md");

    assert_eq!(expansion.text, "L(base)+R(base)");
    assert!(expansion.warnings.is_empty());
}

#[test]
fn test_missing_target_is_left_verbatim_and_reported() {
    let store = MemoryFragmentStore::new()
        .with("main.md", "x @include(gone.md) y @include(also-gone.md)");

    let expansion = expand(&store, "main.md");

    assert_eq!(expansion.text, "x @include(gone.md) y @include(also-gone.md)");
    assert_eq!(expansion.warnings.len(), 2);
    assert!(matches!(
        expansion.warnings[0].kind,
        IncludeWarningKind::Missing { .. }
    ));
    assert_eq!(expansion.warnings[0].target, "gone.md");
    assert_eq!(expansion.warnings[1].target, "also-gone.md");
}

#[test]
fn test_target_escaping_root_is_left_verbatim() {
    let store = MemoryFragmentStore::new().with("main.md", "@include(../../secret.md)");

    let expansion = expand(&store, "main.md");

    assert_eq!(expansion.text, "@include(../../secret.md)");
    assert_eq!(expansion.warnings[0].kind, IncludeWarningKind::OutsideRoot);
}

#[test]
fn test_quoted_directives_are_documentation() {
    let text = "Write `@include(path)` to inline a fragment.\n\
                ```\n@include(example.md)\n```\n\
                Escaped: \\@include(x.md)\n";
    let store = MemoryFragmentStore::new()
        .with("doc.md", text)
        .with("example.md", "SHOULD NOT APPEAR")
        .with("x.md", "SHOULD NOT APPEAR");

    let expansion = expand(&store, "doc.md");

    assert_eq!(expansion.text, text);
    assert!(expansion.warnings.is_empty());
}

#[test]
fn test_included_content_is_spliced_verbatim() {
    let body = "  indented\n\n\n{braces} and `code` and trailing spaces   \n";
    let store = MemoryFragmentStore::new()
        .with("main.md", "<<@include(body.md)>>")
        .with("body.md", body);

    assert_eq!(expand(&store, "main.md").text, format!("<<{}>>", body));
}

#[test]
fn test_expand_respects_caller_visited_set() {
    let store = MemoryFragmentStore::new().with("group/a.md", "A");
    let resolver = IncludeResolver::new(&store);
    let visited = BTreeSet::from([PathBuf::from("group/a.md")]);

    let expansion = resolver.expand("@include(a.md)", Path::new("group"), &visited);

    assert_eq!(expansion.text, "@include(a.md)");
    assert_eq!(expansion.warnings[0].kind, IncludeWarningKind::Cycle);
}

#[test]
fn test_expand_file_missing_is_an_error() {
    let store = MemoryFragmentStore::new();
    let resolver = IncludeResolver::new(&store);

    assert!(resolver.expand_file(Path::new("missing.md")).is_err());
    assert!(resolver.expand_file(Path::new("../outside.md")).is_err());
}

#[test]
fn test_fs_store_reads_and_lists() {
    let project = ProjectFixture::new();
    project
        .write("content/group/02-b.md", "B")
        .write("content/group/01-a.md", "A")
        .write("content/group/nested/ignored.md", "N");
    let store = FsFragmentStore::new(project.root().join("content"));

    assert_eq!(store.read(Path::new("group/01-a.md")).unwrap(), "A");
    assert!(store.exists(Path::new("group/02-b.md")));
    assert!(!store.exists(Path::new("group")));
    assert!(store.is_dir(Path::new("group")));
    assert_eq!(
        store.list_dir(Path::new("group")).unwrap(),
        vec![PathBuf::from("group/01-a.md"), PathBuf::from("group/02-b.md")]
    );
    assert!(store.list_dir(Path::new("nope")).is_err());
}

#[test]
fn test_fs_store_drives_resolver() {
    let project = ProjectFixture::new();
    project
        .write("content/main.md", "start @include(parts/p.md) end")
        .write("content/parts/p.md", "middle");
    let store = FsFragmentStore::new(project.root().join("content"));

    let expansion = IncludeResolver::new(&store)
        .expand_file(Path::new("main.md"))
        .unwrap();

    assert_eq!(expansion.text, "start middle end");
}
