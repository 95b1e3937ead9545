use std::fs;
use std::path::Path;

use carrier_sinetable::{
    generate, CommandExecutor, ExitReport, FailurePolicy, Invocation, SineTableError, TableConfig,
};
use tempfile::TempDir;

/// Stands in for the ROM tool: records every call and writes the `-o` target.
#[derive(Default)]
struct FakeTool {
    calls: Vec<Invocation>,
    fail_on_call: Option<usize>,
}

impl FakeTool {
    fn failing_at(call: usize) -> Self {
        Self {
            fail_on_call: Some(call),
            ..Self::default()
        }
    }

    fn subcommands(&self) -> Vec<&str> {
        self.calls.iter().filter_map(|c| c.subcommand()).collect()
    }
}

impl CommandExecutor for FakeTool {
    fn execute(
        &mut self,
        invocation: &Invocation,
        cwd: &Path,
    ) -> Result<ExitReport, SineTableError> {
        let call = self.calls.len();
        self.calls.push(invocation.clone());

        if self.fail_on_call == Some(call) {
            return Ok(ExitReport::failed(2));
        }

        let out = invocation
            .args
            .iter()
            .position(|a| a == "-o")
            .and_then(|i| invocation.args.get(i + 1))
            .expect("invocation without -o");
        fs::write(cwd.join(out), invocation.to_string())?;
        Ok(ExitReport::ok())
    }
}

fn config_in(dir: &TempDir) -> TableConfig {
    TableConfig {
        work_dir: dir.path().to_path_buf(),
        ..TableConfig::default()
    }
}

fn leftover_tables(dir: &Path) -> Vec<String> {
    fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".bin"))
        .collect()
}

#[test]
fn generates_merges_and_cleans_up() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir);
    let mut tool = FakeTool::default();

    let report = generate(&config, &mut tool).unwrap();

    assert_eq!(tool.calls.len(), 8);
    assert_eq!(
        tool.subcommands(),
        ["sine", "sine", "sine", "sine", "sine", "sine", "sine", "data"]
    );
    assert_eq!(report.amplitudes(), vec![128, 106, 84, 62, 40, 18, -3]);
    assert!(dir.path().join("color_carrier_sine.mif").exists());
    assert!(leftover_tables(dir.path()).is_empty());
    assert_eq!(report.removed.len(), 7);
    assert!(report.failures.is_empty());
}

#[test]
fn sine_calls_carry_step_parameters() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir);
    let mut tool = FakeTool::default();

    generate(&config, &mut tool).unwrap();

    assert_eq!(
        tool.calls[0].to_string(),
        "romswak sine -width 9 -length 256 -amplitude 128 -o sine1.bin -signed"
    );
    assert_eq!(
        tool.calls[6].to_string(),
        "romswak sine -width 9 -length 256 -amplitude -3 -o sine7.bin -signed"
    );
}

#[test]
fn merge_lists_every_table_in_step_order() {
    let dir = tempfile::tempdir().unwrap();
    let config = TableConfig {
        steps: 12,
        ..config_in(&dir)
    };
    let mut tool = FakeTool::default();

    generate(&config, &mut tool).unwrap();

    let merge = tool.calls.last().unwrap();
    assert_eq!(merge.subcommand(), Some("data"));
    let inputs: Vec<&str> = merge.args[1..]
        .iter()
        .take_while(|a| a.as_str() != "-o")
        .map(String::as_str)
        .collect();
    let expected: Vec<String> = (1..=12).map(|i| format!("sine{i}.bin")).collect();
    assert_eq!(inputs, expected);
    assert_eq!(merge.args[merge.args.len() - 3..], ["-mif", "-width", "9"]);
}

#[test]
fn merge_runs_once_after_all_generation() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir);
    let mut tool = FakeTool::default();

    generate(&config, &mut tool).unwrap();

    let subcommands = tool.subcommands();
    let merges: Vec<usize> = subcommands
        .iter()
        .enumerate()
        .filter(|(_, s)| **s == "data")
        .map(|(i, _)| i)
        .collect();
    assert_eq!(merges, vec![subcommands.len() - 1]);
}

#[test]
fn zero_steps_merges_empty_list() {
    let dir = tempfile::tempdir().unwrap();
    let config = TableConfig {
        steps: 0,
        ..config_in(&dir)
    };
    let mut tool = FakeTool::default();

    let report = generate(&config, &mut tool).unwrap();

    assert_eq!(tool.calls.len(), 1);
    assert_eq!(
        tool.calls[0].args,
        ["data", "-o", "color_carrier_sine.mif", "-mif", "-width", "9"]
    );
    assert!(report.steps.is_empty());
    assert!(report.removed.is_empty());
}

#[test]
fn abort_stops_at_first_failure_and_cleans_up() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir);
    let mut tool = FakeTool::failing_at(2);

    let err = generate(&config, &mut tool).unwrap_err();

    assert!(matches!(
        err,
        SineTableError::ToolFailed { code: Some(2), .. }
    ));
    assert_eq!(tool.calls.len(), 3);
    assert!(!tool.subcommands().contains(&"data"));
    assert!(leftover_tables(dir.path()).is_empty());
}

#[test]
fn continue_runs_everything_and_records_failure() {
    let dir = tempfile::tempdir().unwrap();
    let config = TableConfig {
        on_failure: FailurePolicy::Continue,
        ..config_in(&dir)
    };
    let mut tool = FakeTool::failing_at(2);

    let report = generate(&config, &mut tool).unwrap();

    assert_eq!(tool.calls.len(), 8);
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].contains("sine3.bin"));
    // sine3.bin was never written, so only six tables were removed.
    assert_eq!(report.removed.len(), 6);
    assert!(leftover_tables(dir.path()).is_empty());
}

#[test]
fn continue_tolerates_missing_tool() {
    let dir = tempfile::tempdir().unwrap();
    let config = TableConfig {
        tool: "carrier-sinetable-no-such-tool-4c1f".to_string(),
        on_failure: FailurePolicy::Continue,
        steps: 2,
        ..config_in(&dir)
    };

    let report = generate(&config, &mut carrier_sinetable::SystemExecutor).unwrap();

    assert_eq!(report.failures.len(), 3);
    assert!(report.invocations.iter().all(|r| r.exit.is_none()));
}

#[test]
fn abort_surfaces_missing_tool() {
    let dir = tempfile::tempdir().unwrap();
    let config = TableConfig {
        tool: "carrier-sinetable-no-such-tool-4c1f".to_string(),
        ..config_in(&dir)
    };

    let err = generate(&config, &mut carrier_sinetable::SystemExecutor).unwrap_err();
    assert!(matches!(err, SineTableError::Spawn { .. }));
}

#[test]
fn keep_intermediates_leaves_tables() {
    let dir = tempfile::tempdir().unwrap();
    let config = TableConfig {
        keep_intermediates: true,
        steps: 3,
        ..config_in(&dir)
    };
    let mut tool = FakeTool::default();

    let report = generate(&config, &mut tool).unwrap();

    assert!(report.removed.is_empty());
    let mut left = leftover_tables(dir.path());
    left.sort();
    assert_eq!(left, ["sine1.bin", "sine2.bin", "sine3.bin"]);
}

#[test]
fn invalid_config_runs_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let config = TableConfig {
        width: 0,
        ..config_in(&dir)
    };
    let mut tool = FakeTool::default();

    let err = generate(&config, &mut tool).unwrap_err();

    assert!(matches!(err, SineTableError::InvalidConfig(_)));
    assert!(tool.calls.is_empty());
}

#[test]
fn dry_run_leaves_existing_tables_alone() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir);
    let existing = dir.path().join("sine1.bin");
    fs::write(&existing, "hand-made table").unwrap();
    let mut dry = carrier_sinetable::DryRunExecutor::default();

    let report = generate(&config, &mut dry).unwrap();

    assert_eq!(dry.invocations.len(), 8);
    assert!(report.removed.is_empty());
    assert_eq!(fs::read_to_string(&existing).unwrap(), "hand-made table");
}

#[test]
fn full_amplitude_start_follows_integer_steps() {
    let dir = tempfile::tempdir().unwrap();
    let config = TableConfig {
        start_at_full_amplitude: true,
        ..config_in(&dir)
    };
    let mut tool = FakeTool::default();

    let report = generate(&config, &mut tool).unwrap();

    assert_eq!(report.amplitudes(), vec![150, 129, 108, 87, 66, 45, 24]);
    assert_eq!(
        tool.calls[0].to_string(),
        "romswak sine -width 9 -length 256 -amplitude 150 -o sine1.bin -signed"
    );
}
