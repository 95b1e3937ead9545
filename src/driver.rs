//! Sequential table generation: one sine invocation per step, one merge, then
//! cleanup of the per-step tables.

use std::fs;
use std::io;
use std::path::PathBuf;

use log::{debug, info, warn};
use serde::Serialize;

use crate::config::{FailurePolicy, TableConfig};
use crate::executor::{CommandExecutor, ExitReport};
use crate::schedule::{amplitude_schedule, amplitude_schedule_from_full};
use crate::tool::{data_invocation, sine_invocation, Invocation};
use crate::SineTableError;

/// Parameters of a single generation step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepPlan {
    /// 1-based step index, also used in the file name
    pub index: usize,
    pub amplitude: i64,
    pub file: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct InvocationRecord {
    pub invocation: Invocation,
    /// `None` when the process could not be started
    pub exit: Option<ExitReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub steps: Vec<StepPlan>,
    pub invocations: Vec<InvocationRecord>,
    pub output: PathBuf,
    pub removed: Vec<PathBuf>,
    /// Failures tolerated under [`FailurePolicy::Continue`]
    pub failures: Vec<String>,
}

impl RunReport {
    pub fn amplitudes(&self) -> Vec<i64> {
        self.steps.iter().map(|s| s.amplitude).collect()
    }
}

pub fn plan_steps(config: &TableConfig) -> Vec<StepPlan> {
    let amplitudes = if config.start_at_full_amplitude {
        amplitude_schedule_from_full(config.amplitude, config.steps)
    } else {
        amplitude_schedule(config.amplitude, config.steps)
    };

    amplitudes
        .into_iter()
        .enumerate()
        .map(|(i, amplitude)| StepPlan {
            index: i + 1,
            amplitude,
            file: config.step_file_name(i + 1),
        })
        .collect()
}

/// Generate every step table, merge them into the MIF output and remove the
/// intermediates.
///
/// Intermediates are removed even when a step fails, unless the executor
/// reports that it leaves the filesystem alone (dry runs). Under
/// [`FailurePolicy::Abort`] the first failure is returned after cleanup.
pub fn generate<E>(config: &TableConfig, executor: &mut E) -> Result<RunReport, SineTableError>
where
    E: CommandExecutor + ?Sized,
{
    config.validate()?;

    let steps = plan_steps(config);
    let mut report = RunReport {
        steps,
        invocations: Vec::new(),
        output: config.output_path(),
        removed: Vec::new(),
        failures: Vec::new(),
    };

    let outcome = run_tool(config, executor, &mut report);

    let cleanup = if config.keep_intermediates {
        debug!("keeping {} intermediate tables", report.steps.len());
        Ok(())
    } else if !executor.mutates_filesystem() {
        debug!("executor wrote nothing, skipping cleanup");
        Ok(())
    } else {
        remove_intermediates(config, &mut report)
    };

    outcome?;
    cleanup?;
    Ok(report)
}

fn run_tool<E>(
    config: &TableConfig,
    executor: &mut E,
    report: &mut RunReport,
) -> Result<(), SineTableError>
where
    E: CommandExecutor + ?Sized,
{
    let sine_calls: Vec<Invocation> = report
        .steps
        .iter()
        .map(|step| {
            sine_invocation(
                &config.tool,
                config.width,
                config.length,
                step.amplitude,
                &step.file,
            )
        })
        .collect();

    for invocation in sine_calls {
        execute_checked(config, executor, invocation, report)?;
    }

    if report.steps.is_empty() {
        warn!("no steps configured, merging an empty table list");
    }

    let files: Vec<&str> = report.steps.iter().map(|s| s.file.as_str()).collect();
    let merge = data_invocation(&config.tool, &files, &config.output, config.width);
    execute_checked(config, executor, merge, report)
}

fn execute_checked<E>(
    config: &TableConfig,
    executor: &mut E,
    invocation: Invocation,
    report: &mut RunReport,
) -> Result<(), SineTableError>
where
    E: CommandExecutor + ?Sized,
{
    info!("{invocation}");

    let failure = match executor.execute(&invocation, &config.work_dir) {
        Ok(exit) => {
            if !exit.stdout.is_empty() {
                debug!("{}: {}", invocation.program, exit.stdout.trim_end());
            }
            if !exit.stderr.is_empty() {
                debug!("{} stderr: {}", invocation.program, exit.stderr.trim_end());
            }

            let failure = (!exit.success).then(|| SineTableError::ToolFailed {
                invocation: invocation.to_string(),
                code: exit.code,
            });
            report.invocations.push(InvocationRecord {
                invocation,
                exit: Some(exit),
            });
            failure
        }
        Err(err) => {
            report.invocations.push(InvocationRecord {
                invocation,
                exit: None,
            });
            Some(err)
        }
    };

    match (failure, config.on_failure) {
        (None, _) => Ok(()),
        (Some(err), FailurePolicy::Abort) => Err(err),
        (Some(err), FailurePolicy::Continue) => {
            warn!("{err}; continuing");
            report.failures.push(err.to_string());
            Ok(())
        }
    }
}

fn remove_intermediates(
    config: &TableConfig,
    report: &mut RunReport,
) -> Result<(), SineTableError> {
    for step in &report.steps {
        let path = config.work_dir.join(&step.file);
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!("removed {}", path.display());
                report.removed.push(path);
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!("{} was never written", path.display());
            }
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}
