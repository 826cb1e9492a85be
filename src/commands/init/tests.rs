//! Tests for the init command.

use super::*;
use crate::compile::{CompileOptions, compile_project};
use crate::context::PipelineContext;
use crate::exit_codes;
use crate::test_support::{DirGuard, ProjectFixture};
use serial_test::serial;

use super::scaffolding::*;

#[test]
fn test_init_writes_config_and_sample_content() {
    let project = ProjectFixture::new();

    let written = init_project(project.root()).unwrap();

    assert!(project.exists("quire.yaml"));
    assert!(project.exists("src/artifacts.yaml"));
    assert!(project.exists("src/profiles/default.yaml"));
    assert!(project.exists("src/artifacts/assistant/intro.md"));
    assert!(project.exists("src/fragments/principles/01-core.md"));
    assert_eq!(written.len(), sample_files(&PipelineConfig::default()).len());
    assert!(written.iter().all(|path| path.starts_with("src")));
}

#[test]
fn test_init_config_loads_as_defaults() {
    let project = ProjectFixture::new();
    init_project(project.root()).unwrap();

    let config = PipelineConfig::load(project.root().join(CONFIG_FILE_NAME)).unwrap();

    assert_eq!(config, PipelineConfig::default());
    assert!(project.read("quire.yaml").starts_with("# quire project configuration."));
}

#[test]
fn test_init_refuses_existing_config() {
    let project = ProjectFixture::new();
    project.write("quire.yaml", "source_dir: content\n");

    let err = init_project(project.root()).unwrap_err();

    assert_eq!(err.exit_code(), exit_codes::USER_ERROR);
    assert!(err.to_string().contains("already exists"));
    assert_eq!(project.read("quire.yaml"), "source_dir: content\n");
    assert!(!project.exists("src"));
}

#[test]
fn test_init_twice_fails_second_time() {
    let project = ProjectFixture::new();

    init_project(project.root()).unwrap();
    assert!(init_project(project.root()).is_err());
}

#[test]
fn test_init_keeps_existing_content() {
    let project = ProjectFixture::new();
    project.source("artifacts/assistant/intro.md", "My own intro.\n");

    let written = init_project(project.root()).unwrap();

    assert_eq!(project.read("src/artifacts/assistant/intro.md"), "My own intro.\n");
    assert!(!written.contains(&PathBuf::from("src/artifacts/assistant/intro.md")));
}

#[test]
fn test_init_creates_missing_root() {
    let project = ProjectFixture::new();
    let root = project.root().join("nested").join("site");

    cmd_init(Some(&root)).unwrap();

    assert!(root.join("quire.yaml").is_file());
}

#[test]
fn test_scaffold_compiles_without_warnings() {
    let project = ProjectFixture::new();
    init_project(project.root()).unwrap();

    let ctx = PipelineContext::resolve_from(project.root()).unwrap();
    let summary = compile_project(&ctx, &CompileOptions::default()).unwrap();

    assert_eq!(summary.artifacts, 1);
    assert_eq!(summary.capabilities, 1);
    assert!(summary.warnings.is_empty(), "{:?}", summary.warnings);

    let document = project.read("dist/agents/assistant.md");
    assert!(document.starts_with("# Project Assistant\n"));
    assert!(document.contains("Be precise and brief.\n\nKeep a neutral, friendly tone."));
    assert!(document.contains("<capability id=\"summarize\" name=\"Summarize\">"));
    assert!(project.exists("dist/capabilities/summarize/capability.md"));
}

#[test]
#[serial]
fn test_init_defaults_to_current_directory() {
    let project = ProjectFixture::new();
    let _guard = DirGuard::new(project.root());

    cmd_init(None).unwrap();

    assert!(project.exists("quire.yaml"));
    assert!(project.exists("src/capabilities.yaml"));
}
