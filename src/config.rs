use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::schedule::MAX_EXACT_AMPLITUDE;
use crate::SineTableError;

/// What to do when the external tool exits unsuccessfully.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Stop at the first failing invocation, clean up, and report the error.
    #[default]
    Abort,
    /// Log the failure and carry on with the remaining invocations.
    Continue,
}

/// Parameters for one table generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// External ROM tool executable
    pub tool: String,
    /// Initial amplitude, decremented linearly across steps
    pub amplitude: i64,
    /// Samples per table
    pub length: u32,
    /// Bits per sample
    pub width: u32,
    /// Number of tables to generate
    pub steps: usize,
    /// Intermediate files are named `{file_prefix}{index}.{file_extension}`
    pub file_prefix: String,
    pub file_extension: String,
    /// Merged MIF output file, relative to `work_dir`
    pub output: String,
    /// Directory the tool runs in and where intermediates are written
    pub work_dir: PathBuf,
    pub on_failure: FailurePolicy,
    /// Use the full amplitude for the first table instead of decrementing first
    pub start_at_full_amplitude: bool,
    /// Leave the per-step tables on disk after merging
    pub keep_intermediates: bool,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            tool: "romswak".to_string(),
            amplitude: 150,
            length: 256,
            width: 9,
            steps: 7,
            file_prefix: "sine".to_string(),
            file_extension: "bin".to_string(),
            output: "color_carrier_sine.mif".to_string(),
            work_dir: PathBuf::from("."),
            on_failure: FailurePolicy::Abort,
            start_at_full_amplitude: false,
            keep_intermediates: false,
        }
    }
}

impl TableConfig {
    pub fn from_toml_file(path: &Path) -> Result<Self, SineTableError> {
        let raw = fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, SineTableError> {
        let config: TableConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SineTableError> {
        if self.tool.trim().is_empty() {
            return Err(SineTableError::InvalidConfig(
                "tool must not be empty".to_string(),
            ));
        }

        if self.width == 0 || self.width > 64 {
            return Err(SineTableError::InvalidConfig(format!(
                "width must be in 1..=64, got {}",
                self.width
            )));
        }

        if self.length == 0 {
            return Err(SineTableError::InvalidConfig(
                "length must be greater than zero".to_string(),
            ));
        }

        if !(0..=MAX_EXACT_AMPLITUDE).contains(&self.amplitude) {
            return Err(SineTableError::InvalidConfig(format!(
                "amplitude must be in 0..={MAX_EXACT_AMPLITUDE}, got {}",
                self.amplitude
            )));
        }

        if self.file_prefix.is_empty() || self.file_extension.is_empty() {
            return Err(SineTableError::InvalidConfig(
                "file_prefix and file_extension must be non-empty".to_string(),
            ));
        }

        if self.output.is_empty() {
            return Err(SineTableError::InvalidConfig(
                "output must not be empty".to_string(),
            ));
        }

        if let Some(index) = (1..=self.steps).find(|&i| self.step_file_name(i) == self.output) {
            return Err(SineTableError::InvalidConfig(format!(
                "output '{}' collides with the intermediate table of step {index}",
                self.output
            )));
        }

        Ok(())
    }

    pub fn step_file_name(&self, index: usize) -> String {
        format!("{}{index}.{}", self.file_prefix, self.file_extension)
    }

    pub fn output_path(&self) -> PathBuf {
        self.work_dir.join(&self.output)
    }
}
