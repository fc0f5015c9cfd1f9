mod commands;
mod error;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;

use crate::commands::{completions, create, list, show, tui, upload, Context};
use crate::error::{exit_code_for, report_error};
use workbench_client::{HttpTransport, InteractionsClient};
use workbench_config as config;

#[derive(Debug, Parser)]
#[command(name = "workbench", version, about = "customer interactions workbench")]
struct Cli {
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Backend API root, e.g. http://localhost:8080/api
    #[arg(long, global = true)]
    base_url: Option<String>,
    #[arg(long, global = true)]
    json: bool,
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List interactions, one page at a time
    List(list::ListArgs),
    Show(show::ShowArgs),
    /// Record a new interaction
    Create(create::CreateArgs),
    /// Send a CSV file to the backend for bulk ingestion
    #[command(name = "upload-csv")]
    UploadCsv(upload::UploadCsvArgs),
    /// Create interactions from a JSON object or array
    #[command(name = "import-json")]
    ImportJson(upload::ImportJsonArgs),
    Tui(tui::TuiArgs),
    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let verbose = cli.verbose;
    init_logging(verbose);
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err, verbose);
            exit_code_for(&err)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let Cli {
        config: config_path,
        base_url,
        json,
        verbose,
        command,
    } = cli;

    match command {
        Command::Tui(args) => tui::launch(config_path, base_url, args, verbose),
        Command::Completions(args) => completions::emit(args),
        command => {
            let app_config = config::load(config_path.clone())
                .with_context(|| "load config")?
                .with_base_url(base_url.as_deref())?;
            if verbose {
                match config::resolve_config_path(config_path) {
                    Ok(path) if path.exists() => debug!(path = %path.display(), "config resolved"),
                    Ok(path) => debug!(path = %path.display(), "config missing, using defaults"),
                    Err(err) => debug!(error = %err, "config unavailable"),
                }
                debug!(base_url = %app_config.api.base_url, "api endpoint");
            }

            let transport = HttpTransport::new(
                app_config.api.base_url.clone(),
                app_config.api.timeout,
                &app_config.api.user_agent,
            )
            .with_context(|| "build http client")?;
            let client = InteractionsClient::new(transport);

            let ctx = Context {
                client: &client,
                json,
                config: &app_config,
            };

            match command {
                Command::List(args) => list::list_interactions(&ctx, args),
                Command::Show(args) => show::show_interaction(&ctx, args),
                Command::Create(args) => create::create_interaction(&ctx, args),
                Command::UploadCsv(args) => upload::upload_csv(&ctx, args),
                Command::ImportJson(args) => upload::import_json(&ctx, args),
                Command::Tui(_) => unreachable!("tui command handled before client setup"),
                Command::Completions(_) => {
                    unreachable!("completions command handled before client setup")
                }
            }
        }
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}
