use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::driver::RunReport;
use crate::SineTableError;

pub const REPORT_SCHEMA_VERSION: &str = "1.0.0";

#[derive(Debug, Serialize)]
struct ReportFile<'a> {
    schema_version: &'static str,
    amplitudes: Vec<i64>,
    #[serde(flatten)]
    run: &'a RunReport,
}

/// Write the run manifest as pretty-printed JSON.
pub fn write_report_json(path: &Path, report: &RunReport) -> Result<(), SineTableError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let payload = serde_json::to_string_pretty(&ReportFile {
        schema_version: REPORT_SCHEMA_VERSION,
        amplitudes: report.amplitudes(),
        run: report,
    })?;
    fs::write(path, payload)?;
    Ok(())
}
