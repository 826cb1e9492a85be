//! CLI argument parsing for quire.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Quire: compile reusable text fragments into agent documents.
///
/// A content root holds:
/// - an artifact registry and a capability registry
/// - profiles binding fragment groups and capabilities to artifacts
/// - the fragments themselves, which may `@include(...)` each other
#[derive(Parser, Debug)]
#[command(name = "quire")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Project directory (default: the current directory).
    ///
    /// The nearest ancestor holding `quire.yaml` is used as the root.
    #[arg(long, global = true, value_name = "DIR")]
    pub root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for quire.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compile a profile into the output directory.
    ///
    /// Loads, resolves and validates the profile, compiles every artifact
    /// and capability in memory, then replaces the output directory.
    Compile(CompileArgs),

    /// Validate a profile without writing anything.
    ///
    /// Reports every error and warning found in one pass.
    Check(CheckArgs),

    /// List profiles, or the artifacts of one profile.
    List(ListArgs),

    /// Scaffold `quire.yaml` and a minimal content root.
    ///
    /// Refuses to run when `quire.yaml` already exists.
    Init,
}

/// Arguments for `quire compile`.
#[derive(Args, Debug)]
pub struct CompileArgs {
    /// Profile to compile (default: `default_profile` from quire.yaml).
    #[arg(short, long)]
    pub profile: Option<String>,

    /// Print progress for every pipeline step.
    #[arg(short, long)]
    pub verbose: bool,

    /// Number of compile worker threads.
    #[arg(short, long, value_name = "N")]
    pub jobs: Option<usize>,
}

/// Arguments for `quire check`.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Profile to validate (default: `default_profile` from quire.yaml).
    #[arg(short, long)]
    pub profile: Option<String>,

    /// Print progress for every pipeline step.
    #[arg(short, long)]
    pub verbose: bool,
}

/// Arguments for `quire list`.
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Show the artifacts and bindings of this profile.
    #[arg(short, long)]
    pub profile: Option<String>,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// Whether the selected command asked for verbose output.
    pub fn verbose(&self) -> bool {
        match &self.command {
            Command::Compile(args) => args.verbose,
            Command::Check(args) => args.verbose,
            Command::List(_) | Command::Init => false,
        }
    }
}
