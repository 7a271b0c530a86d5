use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use call_schedule_lib::commands::schedule::{load_request, schedule_generate};
use call_schedule_lib::commands::CommandResult;
use call_schedule_lib::error::AppError;
use call_schedule_lib::services::schedule_utils;
use call_schedule_lib::services::settings_service::load_settings;
use call_schedule_lib::utils::logger::init_logging;

#[derive(Debug, Parser)]
#[command(name = "call-schedule", version, about = "Generate an outbound call schedule")]
struct Cli {
    /// JSON request holding params, contacts, tasks, userId and goalId
    #[arg(short, long)]
    request: PathBuf,

    /// Scheduler settings file (.yaml/.yml or .json)
    #[arg(short, long, env = "CALL_SCHEDULE_CONFIG")]
    config: Option<PathBuf>,

    /// Reference instant in RFC 3339, overrides the request's `now`
    #[arg(long)]
    now: Option<String>,

    /// Directory for daily rolling log files
    #[arg(long, env = "CALL_SCHEDULE_LOG_DIR")]
    log_dir: Option<PathBuf>,

    #[arg(long)]
    pretty: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match try_run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            match serde_json::to_string(&error) {
                Ok(payload) => eprintln!("{payload}"),
                Err(_) => eprintln!("{error}"),
            }
            ExitCode::FAILURE
        }
    }
}

fn try_run(cli: Cli) -> CommandResult<()> {
    init_logging(cli.log_dir.as_deref())?;

    let settings = load_settings(cli.config.as_deref())?;
    let mut request = load_request(&cli.request)?;
    if let Some(raw) = cli.now.as_deref() {
        request.now = Some(schedule_utils::parse_datetime(raw)?);
    }

    let schedule = schedule_generate(request, settings)?;
    let output = if cli.pretty {
        serde_json::to_string_pretty(&schedule)
    } else {
        serde_json::to_string(&schedule)
    }
    .map_err(AppError::from)?;

    println!("{output}");
    Ok(())
}
