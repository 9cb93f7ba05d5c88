//! seraface CLI — inspect and validate server configuration.

use clap::{Parser, Subcommand};
use seraface_rs::config::{LoadOptions, Settings, keys};
use seraface_rs::error::Error;
use seraface_rs::telemetry::{TelemetryConfig, init_telemetry};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "seraface", about = "Seraface AI server configuration")]
struct Cli {
    /// Env file to read (defaults to ./.env when present)
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,
    /// Require GEMINI_API_KEY and SERPAPI_KEY at load time
    #[arg(long, global = true)]
    strict: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load and validate configuration, reporting every problem
    Check,
    /// Print the resolved configuration with secrets redacted
    Show {
        /// Emit JSON instead of aligned text
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let options = LoadOptions {
        env_file: cli.env_file,
        strict: cli.strict,
    };

    let settings = match Settings::load(&options) {
        Ok(settings) => Arc::new(settings),
        Err(Error::Config(errors)) => {
            eprintln!("{errors}");
            return Ok(ExitCode::FAILURE);
        }
        Err(e) => return Err(e.into()),
    };

    let _guard = init_telemetry(TelemetryConfig::from_settings(&settings))?;

    match cli.command {
        Command::Check => cmd_check(&settings),
        Command::Show { json } => cmd_show(&settings, json)?,
    }

    Ok(ExitCode::SUCCESS)
}

fn cmd_check(settings: &Settings) {
    println!(
        "ok: {} v{} on {}",
        settings.app_title(),
        settings.app_version(),
        settings.bind_addr()
    );
    for (key, missing) in [
        (keys::GEMINI_API_KEY, settings.gemini_api_key().is_err()),
        (keys::SERPAPI_KEY, settings.serp_api_key().is_err()),
    ] {
        if missing {
            tracing::warn!(key, "secret not set; features that need it will fail");
        }
    }
}

fn cmd_show(settings: &Settings, json: bool) -> anyhow::Result<()> {
    let summary = settings.summary();

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    let rows = summary.rows();
    let width = rows.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
    for (key, value) in rows {
        println!("{key:<width$}  {value}");
    }
    Ok(())
}
