//! Process execution seam for the external ROM tool.

use std::path::Path;
use std::process::Command;

use serde::Serialize;

use crate::tool::Invocation;
use crate::SineTableError;

/// Outcome of one finished external process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExitReport {
    /// Exit code, `None` when the process was killed by a signal
    pub code: Option<i32>,
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl ExitReport {
    pub fn ok() -> Self {
        Self {
            code: Some(0),
            success: true,
            stdout: String::new(),
            stderr: String::new(),
        }
    }

    pub fn failed(code: i32) -> Self {
        Self {
            code: Some(code),
            success: false,
            stdout: String::new(),
            stderr: String::new(),
        }
    }
}

/// Runs an [`Invocation`] to completion inside `cwd`.
///
/// Implementations block until the process has exited. A non-zero exit is
/// reported through [`ExitReport::success`], not as an `Err`; errors are for
/// invocations that could not be run at all.
pub trait CommandExecutor {
    fn execute(&mut self, invocation: &Invocation, cwd: &Path)
        -> Result<ExitReport, SineTableError>;

    /// Whether executing invocations changes files on disk. The driver only
    /// removes intermediate tables for executors that do.
    fn mutates_filesystem(&self) -> bool {
        true
    }
}

/// Spawns the real tool with [`std::process::Command`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemExecutor;

impl CommandExecutor for SystemExecutor {
    fn execute(
        &mut self,
        invocation: &Invocation,
        cwd: &Path,
    ) -> Result<ExitReport, SineTableError> {
        let output = Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(cwd)
            .output()
            .map_err(|source| SineTableError::Spawn {
                program: invocation.program.clone(),
                source,
            })?;

        Ok(ExitReport {
            code: output.status.code(),
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Prints each invocation instead of running it.
#[derive(Debug, Default, Clone)]
pub struct DryRunExecutor {
    pub invocations: Vec<Invocation>,
}

impl CommandExecutor for DryRunExecutor {
    fn execute(
        &mut self,
        invocation: &Invocation,
        _cwd: &Path,
    ) -> Result<ExitReport, SineTableError> {
        println!("{invocation}");
        self.invocations.push(invocation.clone());
        Ok(ExitReport::ok())
    }

    fn mutates_filesystem(&self) -> bool {
        false
    }
}
