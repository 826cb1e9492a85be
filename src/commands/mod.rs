//! Command implementations for quire.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations. Every command except `init` runs against a resolved
//! [`PipelineContext`].

mod check;
mod compile;
mod init;
mod list;

use crate::cli::{Cli, Command};
use crate::context::PipelineContext;
use crate::error::Result;
use std::path::Path;

/// Dispatch a command to its implementation.
///
/// This is the main entry point for command execution. `--root` selects the
/// project directory; otherwise the current directory is used.
pub fn dispatch(cli: Cli) -> Result<()> {
    let Cli { root, command } = cli;
    let root = root.as_deref();

    match command {
        Command::Init => init::cmd_init(root),
        Command::Compile(args) => compile::cmd_compile(&resolve_context(root)?, args),
        Command::Check(args) => check::cmd_check(&resolve_context(root)?, args),
        Command::List(args) => list::cmd_list(&resolve_context(root)?, args),
    }
}

fn resolve_context(root: Option<&Path>) -> Result<PipelineContext> {
    let ctx = match root {
        Some(root) => PipelineContext::resolve_from(root)?,
        None => PipelineContext::resolve()?,
    };

    tracing::debug!(root = %ctx.root.display(), "project resolved");
    Ok(ctx)
}
