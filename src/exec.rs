//! Subprocess execution
//!
//! Every external program (git, the stacking tool, gh) is invoked through
//! [`CommandRunner`] so that orchestration logic can be exercised against a
//! recording stand-in. Arguments are always passed as separate argv entries;
//! nothing is interpreted by a shell.

use crate::error::{Error, Result};
use async_trait::async_trait;
use std::ffi::OsString;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Captured output of a finished command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code (-1 if terminated by a signal)
    pub status: i32,
    /// Captured stdout
    pub stdout: String,
    /// Captured stderr
    pub stderr: String,
}

impl CommandOutput {
    /// Successful output with the given stdout
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            status: 0,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Failed output with the given stderr
    pub fn failed(status: i32, stderr: impl Into<String>) -> Self {
        Self {
            status,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// Whether the command exited with status 0
    pub const fn success(&self) -> bool {
        self.status == 0
    }

    /// Most useful diagnostic text for a failure
    pub fn diagnostic(&self) -> String {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            self.stdout.trim().to_string()
        } else {
            stderr.to_string()
        }
    }
}

/// Runs external programs
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run a program to completion, capturing its output
    async fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput>;

    /// Run a program with inherited stdio, returning its exit code
    ///
    /// Arguments are forwarded byte for byte, so they need not be UTF-8.
    async fn run_inherited(&self, program: &str, args: &[OsString]) -> Result<i32>;
}

/// Run a command and return its trimmed stdout, failing on non-zero exit
pub async fn run_checked(
    runner: &dyn CommandRunner,
    program: &str,
    args: &[&str],
) -> Result<String> {
    let output = runner.run(program, args).await?;
    if output.success() {
        Ok(output.stdout.trim().to_string())
    } else {
        Err(Error::Command {
            command: command_line(program, args),
            diagnostic: output.diagnostic(),
        })
    }
}

/// Human-readable command line for diagnostics
pub fn command_line(program: &str, args: &[&str]) -> String {
    std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Like [`command_line`] for arguments that may not be UTF-8
pub fn lossy_command_line(program: &str, args: &[OsString]) -> String {
    let args: Vec<String> = args
        .iter()
        .map(|a| a.to_string_lossy().into_owned())
        .collect();
    std::iter::once(program.to_string())
        .chain(args)
        .collect::<Vec<_>>()
        .join(" ")
}

/// [`CommandRunner`] backed by real processes
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner;

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput> {
        debug!("exec: {}", command_line(program, args));

        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .await?;

        let result = CommandOutput {
            status: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        debug!("exit {}: {}", result.status, program);
        Ok(result)
    }

    async fn run_inherited(&self, program: &str, args: &[OsString]) -> Result<i32> {
        debug!("exec (inherited): {}", lossy_command_line(program, args));

        let status = Command::new(program).args(args).status().await?;
        Ok(status.code().unwrap_or(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_prefers_stderr() {
        let out = CommandOutput {
            status: 1,
            stdout: "partial".into(),
            stderr: "  fatal: nope \n".into(),
        };
        assert_eq!(out.diagnostic(), "fatal: nope");
        assert_eq!(CommandOutput::failed(1, "").diagnostic(), "");
    }

    #[tokio::test]
    async fn test_multiline_argument_is_one_argv_entry() {
        let body = "line one\nline \"two\"\n";
        let out = ProcessRunner
            .run("printf", &["%s|", body, "tail"])
            .await
            .unwrap();
        assert!(out.success());
        assert_eq!(out.stdout, format!("{body}|tail|"));
    }

    #[tokio::test]
    async fn test_run_checked_reports_command() {
        let err = run_checked(&ProcessRunner, "sh", &["-c", "echo boom >&2; exit 3"])
            .await
            .unwrap_err();
        match err {
            Error::Command { command, diagnostic } => {
                assert!(command.starts_with("sh -c"));
                assert_eq!(diagnostic, "boom");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
