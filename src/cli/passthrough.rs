//! Everything that is not sync or submit: usage, version and pass-through

use crate::cli::style::Stylize;
use crate::cli::Session;
use anstream::{eprintln, println};
use gt_stack::error::Result;
use gt_stack::router::{pass_through, USAGE};
use std::ffi::OsString;

/// Print wrapper usage followed by the stacking tool's help
pub async fn run_usage(session: &Session) {
    println!("{USAGE}");
    match session.workspace.tool.help().await {
        Ok(help) => {
            println!("{}", format!("{} help:", session.workspace.tool.program()).emphasis());
            println!("{help}");
        }
        Err(e) => eprintln!("{}: {e}", "warning".warn()),
    }
}

/// Print wrapper and stacking tool versions
pub async fn run_version(session: &Session) {
    println!("gts {}", env!("CARGO_PKG_VERSION"));
    match session.workspace.tool.version().await {
        Ok(version) => println!("{} {version}", session.workspace.tool.program()),
        Err(e) => eprintln!("{}: {e}", "warning".warn()),
    }
}

/// Forward the command line, returning the child's exit code
pub async fn run_pass_through(session: &Session, args: &[OsString]) -> Result<i32> {
    pass_through(
        session.runner.as_ref(),
        &session.workspace.git,
        session.workspace.tool.program(),
        args,
    )
    .await
}
