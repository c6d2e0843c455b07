//! Bypassed pull request audit entry point.
//!
//! This binary is the composition root. Responsibilities, in order:
//!
//! 1. **Parse flags** — `--debug` selects `debug_config.json` and enables the
//!    debug log file.
//! 2. **Wire logging** — build the [`logging::LoggingContext`] and hold it for
//!    the whole run.
//! 3. **Load configuration** — [`config::load_or_create`], creating the file
//!    interactively when it is missing.
//! 4. **Connect** — [`azure_devops::AzureDevOpsClient::connect`].
//! 5. **Resolve and scan** — [`audit::resolve_repository`] then
//!    [`audit::scan_bypassed`].
//! 6. **Report** — [`report::emit`] writes `bypassed_prs.csv`.
//!
//! Every step returns [`audit::AuditError`]; this is the only place that turns
//! one into an exit status. The run is single-threaded and every request is
//! awaited before the next one is sent.

mod config;
mod logging;
mod report;

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, error, info};

use audit::{resolve_repository, scan_bypassed, AuditError};
use azure_devops::AzureDevOpsClient;

/// List pull requests that were completed by bypassing branch policies.
#[derive(Parser)]
#[command(name = "bypassed-prs")]
#[command(version)]
struct Cli {
    /// Read debug_config.json and write a DEBUG-level log to bypassed_prs.log
    #[arg(long)]
    debug: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let logging = match logging::init(&logging::LogSettings::for_mode(cli.debug)) {
        Ok(context) => context,
        Err(err) => {
            eprintln!("Failed to create {}: {}", logging::LOG_FILE, err);
            return ExitCode::FAILURE;
        }
    };
    info!("Azure DevOps Bypassed PRs.");

    let status = match run(cli.debug).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::from(err.exit_status())
        }
    };

    if let Some(path) = logging.log_file() {
        debug!(path = %path.display(), "Debug log complete");
    }
    status
}

async fn run(debug_mode: bool) -> Result<(), AuditError> {
    let config = config::load_or_create(
        config::config_path(debug_mode),
        &mut config::TerminalPrompt,
    )?;
    debug!(?config, "Config file");

    let session =
        AzureDevOpsClient::connect(config.organization_url.clone(), config.access_token.clone())
            .await?;
    info!("Connected!");

    let repository = resolve_repository(&session, &config.repository_name).await?;
    info!("Repo obtained!");
    debug!(id = %repository.id, name = %repository.name, "Repository");

    let bypassed = scan_bypassed(&session, &repository, config.pull_quantity).await?;

    report::emit(Path::new(report::REPORT_FILE), &bypassed)
}
