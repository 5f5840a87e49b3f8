//! cmdharness CLI - run one command under the harness
//! Exit code follows the LTP convention: 0 (TPASS) or 2 (TBROK)

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cmdharness_core::application::constants::TPASS;
use cmdharness_core::{CommandRunner, RunError, RunnerConfig};
use cmdharness_infra_system::{StdProcessSpawner, TracingReporter};

const LOG_FORMAT_ENV: &str = "CMDHARNESS_LOG_FORMAT";
const DEFAULT_LOG_FILTER: &str = "cmdharness=info";

#[derive(Parser)]
#[command(name = "cmdharness")]
#[command(about = "Run a command, fail with TBROK unless it exits 0", long_about = None)]
#[command(version)]
struct Cli {
    /// Append the command's stdout to this file
    #[arg(long, env = "CMDHARNESS_STDOUT")]
    stdout: Option<PathBuf>,

    /// Append the command's stderr to this file
    #[arg(long, env = "CMDHARNESS_STDERR")]
    stderr: Option<PathBuf>,

    /// Result line format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Program followed by its arguments
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    command: Vec<OsString>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Outcome of one run, printed on stdout
#[derive(Debug, Serialize)]
struct RunSummary {
    status: &'static str,
    code: i32,
    command: String,
    error: Option<String>,
    warnings: usize,
}

impl RunSummary {
    fn new(command: &[OsString], result: &Result<(), RunError>, warnings: usize) -> Self {
        let command = command
            .iter()
            .map(|arg| arg.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ");

        match result {
            Ok(()) => Self {
                status: "TPASS",
                code: TPASS,
                command,
                error: None,
                warnings,
            },
            Err(e) => Self {
                status: "TBROK",
                code: e.result_code(),
                command,
                error: Some(e.to_string()),
                warnings,
            },
        }
    }

    fn exit_code(&self) -> ExitCode {
        ExitCode::from(u8::try_from(self.code).unwrap_or(u8::MAX))
    }
}

fn init_logging() -> Result<()> {
    // Pretty by default; JSON for machine consumption
    let log_format = std::env::var(LOG_FORMAT_ENV).unwrap_or_else(|_| "pretty".to_string());

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(DEFAULT_LOG_FILTER))
        .context("Failed to create env filter")?;

    // Logs go to stderr; stdout carries the result line (and inherited child output)
    match log_format.as_str() {
        "json" => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
        _ => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().pretty().with_writer(std::io::stderr))
            .try_init(),
    }
    .context("Failed to install tracing subscriber")
}

fn print_summary(summary: &RunSummary, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let line = serde_json::to_string(summary).context("Failed to encode summary")?;
            println!("{}", line);
        }
        OutputFormat::Text => {
            let status = if summary.code == TPASS {
                summary.status.green().bold()
            } else {
                summary.status.red().bold()
            };
            match &summary.error {
                Some(error) => println!("{} {}: {}", status, summary.command, error),
                None => println!("{} {}", status, summary.command),
            }
        }
    }
    Ok(())
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging()?;

    info!("cmdharness v{} starting", cmdharness_core::VERSION);

    let config = RunnerConfig::from_env();
    let reporter = Arc::new(TracingReporter::new());
    let runner = CommandRunner::with_config(
        Arc::new(StdProcessSpawner::new()),
        reporter.clone(),
        config,
    );

    let result = runner.run_cmd(
        None,
        &cli.command,
        cli.stdout.as_deref(),
        cli.stderr.as_deref(),
    );

    let summary = RunSummary::new(&cli.command, &result, reporter.warning_count());
    print_summary(&summary, cli.format)?;

    Ok(summary.exit_code())
}
