//! yt-dash - single-channel YouTube analytics in your terminal
//!
//! Asks for an API key and a channel id, validates both, fetches the
//! channel and every upload with its statistics, then renders the table.

use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use yt_dash::core::{fetcher, validator};
use yt_dash::error::ValidationError;
use yt_dash::storage::config;
use yt_dash::types::CredentialKind;
use yt_dash::ui::prompt::{RawCredentials, prompt_credentials};
use yt_dash::ui::render;
use yt_dash::utils::logging::init_logging;

/// Single-channel YouTube analytics in your terminal.
#[derive(Parser, Debug)]
#[command(name = "yt-dash")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Print the result as JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Number of table rows to show
    #[arg(short, long)]
    rows: Option<usize>,

    /// Edit the configuration file
    #[arg(short, long)]
    edit: bool,
}

/// Validate both form fields, API key first
fn validate_credentials(raw: RawCredentials) -> Result<(String, String), ValidationError> {
    let api_key = validator::validate(&raw.api_key, CredentialKind::ApiKey)?;
    let channel_id = validator::validate(&raw.channel_id, CredentialKind::ChannelId)?;
    Ok((api_key, channel_id))
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let cfg = config::load_config().await?;
    init_logging(&cfg.log_level)?;

    // Handle --edit flag
    if cli.edit {
        config::edit_config(&cfg.editor).await?;
        return Ok(ExitCode::SUCCESS);
    }

    let raw = prompt_credentials()?;
    let (api_key, channel_id) = match validate_credentials(raw) {
        Ok(creds) => creds,
        Err(e) => {
            eprintln!("{} {}", "Error:".red(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{}", hint.dimmed());
            }
            return Ok(ExitCode::from(2));
        }
    };

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    spinner.set_message("Fetching channel data...");
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));

    let outcome = fetcher::fetch(&cfg, api_key, &channel_id).await;
    spinner.finish_and_clear();

    match outcome {
        Ok(session) => {
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&session)?);
            } else {
                render::render(&session, cli.rows.unwrap_or(cfg.rows));
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!("{} {}", "Error:".red(), e);
            Ok(ExitCode::FAILURE)
        }
    }
}
