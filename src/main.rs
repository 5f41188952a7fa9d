use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use listing_core::{CancelToken, RunReport, RunTimestamp};
use listing_flow::{serve, App, AppConfig, AppError};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "listing-flow", version, about = "Runs the listings extract/load pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Ejecuta un run (por defecto, el tick más reciente del calendario).
    ///
    /// El payload del origen se carga sin transformar: debe ser texto
    /// delimitado según las opciones de carga.
    Run {
        /// Timestamp lógico, `YYYY-MM-DD-HH:MM:SS`.
        #[arg(long)]
        at: Option<String>,
    },
    /// Daemon: ejecuta cada tick del calendario hasta Ctrl-C. Mismas
    /// condiciones de payload que `run`.
    Serve,
    /// Un run por tick en `[from, to]`, en paralelo.
    Backfill {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
    },
    /// Muestra la configuración efectiva (sin secretos).
    Config,
}

fn print_report(report: &RunReport) {
    println!("{}", report.summary());
    for slot in report.failed_steps() {
        if let Some(err) = &slot.last_error {
            println!("  {} failed after {} attempt(s): {err}", slot.step_id, slot.attempts);
        }
    }
}

fn dispatch(cli: Cli) -> Result<bool, AppError> {
    let config = AppConfig::from_env()?;
    if let Command::Config = cli.command {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(true);
    }
    let app = App::from_config(config)?;

    match cli.command {
        Command::Run { at } => {
            let ts = match at {
                Some(raw) => RunTimestamp::parse(&raw)?,
                None => app.latest_tick()?,
            };
            let report = app.trigger(ts, &CancelToken::new());
            print_report(&report);
            Ok(report.is_success())
        }
        Command::Backfill { from, to } => {
            let reports = app.backfill(RunTimestamp::parse(&from)?, RunTimestamp::parse(&to)?)?;
            reports.iter().for_each(print_report);
            Ok(reports.iter().all(RunReport::is_success))
        }
        Command::Serve => {
            let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;
            runtime.block_on(serve(Arc::new(app)))?;
            Ok(true)
        }
        Command::Config => Ok(true),
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
                             .init();

    match dispatch(Cli::parse()) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
