//! Fragment storage and include expansion.
//!
//! - **Store**: reads fragments by logical path (relative to the content root)
//!   and doubles as the file-system lookup for validation
//! - **Include**: expands `@include(path)` directives recursively, in place,
//!   with cycle detection
//!
//! Logical paths are always relative, `/`-separated, and normalized; a path
//! that would climb above the content root is rejected by
//! [`normalize_logical`].

mod include;
mod store;

#[cfg(test)]
mod tests;

pub use include::{Expansion, IncludeResolver, IncludeWarning, IncludeWarningKind};
pub use store::{FragmentStore, FsFragmentStore};

use globset::GlobMatcher;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Members of a fragment group: files directly in `dir` whose name matches
/// `matcher`, sorted by name.
pub fn group_members(
    store: &dyn FragmentStore,
    dir: &Path,
    matcher: &GlobMatcher,
) -> io::Result<Vec<PathBuf>> {
    let mut members = store.list_dir(dir)?;
    members.retain(|file| {
        file.file_name()
            .is_some_and(|name| matcher.is_match(Path::new(name)))
    });
    Ok(members)
}

/// Lexically normalize a logical path.
///
/// `.` components are dropped and `..` pops the previous component. Root and
/// prefix components are ignored, so `/a/b` and `a/b` normalize alike.
/// Returns `None` when the path climbs above the content root.
pub fn normalize_logical(path: &Path) -> Option<PathBuf> {
    let mut parts: Vec<&std::ffi::OsStr> = Vec::new();

    for component in path.components() {
        match component {
            Component::Normal(part) => parts.push(part),
            Component::ParentDir => {
                parts.pop()?;
            }
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
        }
    }

    Some(parts.iter().collect())
}
