use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use log::LevelFilter;

use carrier_sinetable::{
    generate, write_report_json, CommandExecutor, DryRunExecutor, FailurePolicy, RunReport,
    SystemExecutor, TableConfig,
};

const DEFAULT_CONFIG_FILE: &str = "sinetable.toml";

#[derive(Debug, Parser)]
#[command(name = "carrier-sinetable", author, version)]
#[command(about = "Generate amplitude-stepped sine tables and merge them into a MIF file")]
struct Cli {
    /// TOML configuration file (defaults to ./sinetable.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// External ROM tool executable
    #[arg(long)]
    tool: Option<String>,

    /// Initial amplitude
    #[arg(long)]
    amplitude: Option<i64>,

    /// Samples per table
    #[arg(long)]
    length: Option<u32>,

    /// Bits per sample
    #[arg(long)]
    width: Option<u32>,

    /// Number of amplitude steps
    #[arg(long)]
    steps: Option<usize>,

    /// Merged MIF output file
    #[arg(long, short)]
    output: Option<String>,

    /// Directory to run the tool in
    #[arg(long)]
    work_dir: Option<PathBuf>,

    /// Keep going when the tool reports a failure
    #[arg(long, default_value_t = false)]
    continue_on_error: bool,

    /// Use the full amplitude for the first table
    #[arg(long, default_value_t = false)]
    start_at_full_amplitude: bool,

    /// Leave the per-step tables on disk
    #[arg(long, default_value_t = false)]
    keep_intermediates: bool,

    /// Print the tool invocations without running them
    #[arg(long, default_value_t = false)]
    dry_run: bool,

    /// Write a JSON run report to this path
    #[arg(long)]
    report: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

fn resolve_config_path(explicit: Option<&Path>, cwd: &Path) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    let cwd_config = cwd.join(DEFAULT_CONFIG_FILE);
    cwd_config.exists().then_some(cwd_config)
}

fn load_config(explicit: Option<&Path>, cwd: &Path) -> Result<TableConfig> {
    match resolve_config_path(explicit, cwd) {
        Some(path) => TableConfig::from_toml_file(&path)
            .with_context(|| format!("failed to load config: {}", path.display())),
        None => Ok(TableConfig::default()),
    }
}

fn apply_overrides(cfg: &mut TableConfig, cli: &Cli) {
    if let Some(v) = &cli.tool {
        cfg.tool = v.clone();
    }
    if let Some(v) = cli.amplitude {
        cfg.amplitude = v;
    }
    if let Some(v) = cli.length {
        cfg.length = v;
    }
    if let Some(v) = cli.width {
        cfg.width = v;
    }
    if let Some(v) = cli.steps {
        cfg.steps = v;
    }
    if let Some(v) = &cli.output {
        cfg.output = v.clone();
    }
    if let Some(v) = &cli.work_dir {
        cfg.work_dir = v.clone();
    }
    if cli.continue_on_error {
        cfg.on_failure = FailurePolicy::Continue;
    }
    if cli.start_at_full_amplitude {
        cfg.start_at_full_amplitude = true;
    }
    if cli.keep_intermediates {
        cfg.keep_intermediates = true;
    }
}

fn build_executor(dry_run: bool) -> Box<dyn CommandExecutor> {
    if dry_run {
        Box::new(DryRunExecutor::default())
    } else {
        Box::new(SystemExecutor)
    }
}

fn summary_line(report: &RunReport, dry_run: bool) -> String {
    if dry_run {
        format!("Dry run: {} not written", report.output.display())
    } else {
        format!("Output: {}", report.output.display())
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut cfg = load_config(cli.config.as_deref(), Path::new("."))?;
    apply_overrides(&mut cfg, &cli);
    cfg.validate().context("invalid configuration")?;

    let mut executor = build_executor(cli.dry_run);
    let report = generate(&cfg, executor.as_mut())
        .with_context(|| format!("failed to generate {}", cfg.output_path().display()))?;

    if let Some(path) = &cli.report {
        write_report_json(path, &report)
            .with_context(|| format!("failed to write report: {}", path.display()))?;
    }

    if !report.failures.is_empty() {
        log::warn!("{} tool invocation(s) failed", report.failures.len());
    }

    println!("{}", summary_line(&report, cli.dry_run));
    Ok(())
}
