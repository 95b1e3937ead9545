//! Sine lookup-table generation driver.
//!
//! Builds a set of amplitude-stepped sine tables by invoking an external ROM
//! tool once per step, merges them into a single MIF file and removes the
//! intermediate tables. The tool itself is an opaque collaborator reached
//! through [`CommandExecutor`].

pub mod config;
pub mod driver;
pub mod executor;
pub mod report;
pub mod schedule;
pub mod tool;

use thiserror::Error;

pub use config::{FailurePolicy, TableConfig};
pub use driver::{generate, plan_steps, RunReport, StepPlan};
pub use executor::{CommandExecutor, DryRunExecutor, ExitReport, SystemExecutor};
pub use report::write_report_json;
pub use schedule::{amplitude_schedule, amplitude_schedule_from_full};
pub use tool::Invocation;

#[derive(Debug, Error)]
pub enum SineTableError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("'{invocation}' exited with {}", fmt_code(.code))]
    ToolFailed {
        invocation: String,
        code: Option<i32>,
    },
}

fn fmt_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "no status (terminated by signal)".to_string(),
    }
}
