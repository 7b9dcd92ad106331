//! CLI entry point (C10): argument parsing, logging setup, process exit
//! codes. The library itself never calls `process::exit`; this binary is
//! the only place `OdeError` is translated into process exit codes.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use odecoeff::{OdeError, Request};

/// `ode [--threads N] [--seed N] [--help] <request-file> [trace-file]`
#[derive(Parser, Debug)]
#[command(name = "ode", about = "Search for Runge-Kutta/linear multi-step integration coefficients")]
struct Cli {
    /// Override thread count per rank (defaults to logical CPU count).
    #[arg(long, value_name = "N")]
    threads: Option<u32>,

    /// PRNG master seed.
    #[arg(long, value_name = "N", default_value_t = 7)]
    seed: u64,

    /// Path to the request document (TOML).
    request_file: PathBuf,

    /// Optional path for a newline-delimited `(iteration, J*)` trace.
    trace_file: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => return handle_clap_error(err),
    };

    let threads = cli.threads.unwrap_or_else(|| {
        std::thread::available_parallelism()
            .map(|n| n.get() as u32)
            .unwrap_or(1)
    });

    let request = match Request::load(&cli.request_file) {
        Ok(r) => r,
        Err(err) => return report_error(&err),
    };

    let output_dir = cli
        .request_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."));

    match odecoeff::run(
        &request,
        &output_dir,
        cli.seed,
        threads,
        cli.trace_file.as_deref(),
    ) {
        Ok(report) => {
            tracing::info!(
                family = report.family,
                steps = report.steps,
                order = report.order,
                j_star = report.j_star,
                wall_clock_secs = report.wall_clock.as_secs_f64(),
                path = %report.artifact_path.display(),
                "search complete"
            );
            ExitCode::from(0)
        }
        Err(err) => report_error(&err),
    }
}

fn handle_clap_error(err: clap::Error) -> ExitCode {
    use clap::error::ErrorKind;
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            print!("{err}");
            ExitCode::from(0)
        }
        ErrorKind::UnknownArgument | ErrorKind::InvalidSubcommand | ErrorKind::NoEquals => {
            eprintln!("{err}");
            ExitCode::from(7)
        }
        _ => {
            eprintln!("{err}");
            ExitCode::from(1)
        }
    }
}

/// Maps `OdeError` onto the documented process exit codes. `OdeError`'s flatter
/// taxonomy does not distinguish "bad RK spec" (4) from "bad multi-step
/// spec" (5); both collapse onto `ConfigBadValue` and are reported as 4
/// (see DESIGN.md).
fn report_error(err: &OdeError) -> ExitCode {
    let code = match err {
        OdeError::RequestParse { .. } => 2,
        OdeError::ConfigMissing { .. } => 3,
        OdeError::ConfigBadValue { .. } => 4,
        OdeError::UnknownMethod { .. } => 6,
        OdeError::IoOpenFail { .. } => 1,
    };
    eprintln!("ode: {err}");
    ExitCode::from(code)
}
