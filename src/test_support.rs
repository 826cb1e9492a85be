use crate::fragment::{FragmentStore, normalize_logical};
use crate::registry::OutputShape;
use crate::resolve::{Capability, ResolvedArtifact, ResolvedPlan};
use indexmap::IndexMap;
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, Mutex, MutexGuard};
use tempfile::TempDir;

static CWD_LOCK: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

pub(crate) struct DirGuard {
    original: PathBuf,
    _lock: MutexGuard<'static, ()>,
}

impl DirGuard {
    pub(crate) fn new(new_dir: &Path) -> Self {
        // Changing the process current working directory is global and not thread-safe.
        // Lock it so tests don't race even if a #[serial] annotation is missed.
        let lock = CWD_LOCK.lock().unwrap_or_else(|poison| poison.into_inner());
        let original = std::env::current_dir().unwrap();
        std::env::set_current_dir(new_dir).unwrap();
        Self {
            original,
            _lock: lock,
        }
    }
}

impl Drop for DirGuard {
    fn drop(&mut self) {
        let _ = std::env::set_current_dir(&self.original);
    }
}

/// In-memory fragment store keyed by normalized logical path.
#[derive(Debug, Default)]
pub(crate) struct MemoryFragmentStore {
    files: BTreeMap<PathBuf, String>,
}

impl MemoryFragmentStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with(mut self, path: &str, content: &str) -> Self {
        self.insert(path, content);
        self
    }

    pub(crate) fn insert(&mut self, path: &str, content: &str) {
        let key = normalize_logical(Path::new(path)).unwrap();
        self.files.insert(key, content.to_string());
    }
}

impl FragmentStore for MemoryFragmentStore {
    fn read(&self, path: &Path) -> io::Result<String> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "fragment not found"))
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.files
            .keys()
            .any(|key| key != path && key.starts_with(path))
    }

    fn list_dir(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        if !self.is_dir(dir) {
            return Err(io::Error::new(io::ErrorKind::NotFound, "directory not found"));
        }
        Ok(self
            .files
            .keys()
            .filter(|key| key.parent() == Some(dir))
            .cloned()
            .collect())
    }
}

/// A throwaway project root on disk.
pub(crate) struct ProjectFixture {
    dir: TempDir,
}

impl ProjectFixture {
    pub(crate) fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub(crate) fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Write a file relative to the project root.
    pub(crate) fn write(&self, relative: &str, content: &str) -> &Self {
        let path = self.root().join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
        self
    }

    /// Write a file relative to the default content root (`src/`).
    pub(crate) fn source(&self, relative: &str, content: &str) -> &Self {
        self.write(&format!("src/{}", relative), content)
    }

    pub(crate) fn read(&self, relative: &str) -> String {
        std::fs::read_to_string(self.root().join(relative)).unwrap()
    }

    pub(crate) fn exists(&self, relative: &str) -> bool {
        self.root().join(relative).exists()
    }
}

pub(crate) const LINTING_BODY: &str = "Run the linter on every changed file.\n";
pub(crate) const SECURITY_SCAN_BODY: &str = "Scan dependencies for known advisories.\n";

/// A project with `reviewer` and `tester` artifacts sharing the `linting`
/// capability, plus an invokable `security-scan` on the reviewer.
pub(crate) fn reviewer_project() -> ProjectFixture {
    let project = ProjectFixture::new();

    project
        .source(
            "artifacts.yaml",
            r#"
artifacts:
  reviewer:
    title: Code Reviewer
    description: Reviews pull requests before merge
    output_shape: frontmatter
    runtime_hints:
      model: opus
      tools: Read, Grep
  tester:
    title: Test Writer
    description: Writes missing tests
"#,
        )
        .source(
            "capabilities.yaml",
            r#"
capabilities:
  linting:
    path: capabilities/linting.md
    name: Linting
    description: Static checks for style and correctness
  security-scan:
    path: capabilities/security-scan.md
    name: Security Scan
    description: Dependency advisory scan
"#,
        )
        .source(
            "profiles/default.yaml",
            r#"
artifacts:
  reviewer:
    top: principles
    bottom: [output-format]
    inlined:
      - linting
    invokable:
      - id: security-scan
        usage: run before merge
  tester:
    top: [principles]
    inlined:
      - id: linting
        usage: after writing tests
"#,
        )
        .source("artifacts/reviewer/intro.md", "You review code.\n")
        .source("artifacts/reviewer/workflow.md", "1. Read the diff.\n")
        .source("artifacts/tester/intro.md", "You write tests.\n")
        .source("artifacts/tester/workflow.md", "1. Find untested code.\n")
        .source("fragments/principles/01-core.md", "Be precise.\n")
        .source("fragments/output-format/01-format.md", "Answer in markdown.\n")
        .source("capabilities/linting.md", LINTING_BODY)
        .source("capabilities/security-scan.md", SECURITY_SCAN_BODY);

    project
}

/// A resolved artifact with no bindings.
pub(crate) fn artifact(id: &str) -> ResolvedArtifact {
    ResolvedArtifact {
        id: id.to_string(),
        title: format!("{} title", id),
        description: format!("{} description", id),
        runtime_hints: IndexMap::new(),
        output_shape: OutputShape::Markdown,
        top_fragments: Vec::new(),
        bottom_fragments: Vec::new(),
        inlined_capabilities: Vec::new(),
        invokable_capabilities: Vec::new(),
    }
}

/// A resolved capability stored at `capabilities/<id>.md`, or dynamic.
pub(crate) fn capability(id: &str, stored: bool, usage: Option<&str>) -> Capability {
    Capability {
        id: id.to_string(),
        name: format!("{} name", id),
        description: format!("{} description", id),
        path: stored.then(|| PathBuf::from(format!("capabilities/{}.md", id))),
        usage: usage.map(str::to_string),
    }
}

pub(crate) fn plan(artifacts: Vec<ResolvedArtifact>) -> ResolvedPlan {
    ResolvedPlan {
        profile: "default".to_string(),
        artifacts: artifacts
            .into_iter()
            .map(|artifact| (artifact.id.clone(), artifact))
            .collect(),
    }
}
