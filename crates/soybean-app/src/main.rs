#![warn(missing_docs)]
//! # soybean-client binary
//!
//! Terminal entry point: resolves configuration, then either checks the API or
//! runs the interactive shell.

use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use soybean_api::ApiClient;
use soybean_app::shell::{Flow, HELP, execute, parse_command};
use soybean_app::{AppConfig, ViewController, app_version, redact_sensitive};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "soybean-client",
    version = soybean_app::APP_VERSION,
    about = "Soybean disease prediction client"
)]
struct Cli {
    /// API base URL (overrides SOYBEAN_API_BASE_URL)
    #[arg(long, global = true)]
    api_base_url: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the interactive shell (default)
    Shell,
    /// Ask the API whether it is up and exit
    Check,
}

/// CLI entry point.
fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match AppConfig::resolve(cli.api_base_url.as_deref()) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("failed to start soybean-client: {error}");
            return ExitCode::FAILURE;
        }
    };
    info!(
        stage = "bootstrap",
        action = "startup",
        version = app_version(),
        api_base_url = %config.api_base_url,
        source = ?config.source
    );

    let api = match ApiClient::http(&config.api_base_url) {
        Ok(api) => api,
        Err(error) => {
            eprintln!("failed to start soybean-client: {error}");
            return ExitCode::FAILURE;
        }
    };
    let mut controller = ViewController::new(api);

    match cli.command.unwrap_or(Command::Shell) {
        Command::Check => match controller.health() {
            Ok(status) if status.is_ok() => {
                println!("API is up at {}", config.api_base_url);
                ExitCode::SUCCESS
            }
            Ok(status) => {
                println!("API reported status '{}'", status.status);
                ExitCode::FAILURE
            }
            Err(error) => {
                error!(stage = "bootstrap", action = "health_failed", %error);
                eprintln!("API check failed: {error}");
                ExitCode::FAILURE
            }
        },
        Command::Shell => match run_shell(&mut controller) {
            Ok(()) => ExitCode::SUCCESS,
            Err(error) => {
                eprintln!("shell terminated: {error}");
                ExitCode::FAILURE
            }
        },
    }
}

fn run_shell(controller: &mut ViewController) -> io::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    writeln!(stdout, "soybean-client {}", app_version())?;
    writeln!(stdout, "{HELP}\n")?;
    write!(stdout, "{}", controller.render())?;

    for line in stdin.lock().lines() {
        let line = line?;
        debug!(stage = "shell", action = "input", line = %redact_sensitive(&line));

        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(error) => {
                writeln!(stdout, "{error}")?;
                continue;
            }
        };

        let (flow, failure) = execute(controller, command);
        if let Some(failure) = failure {
            let detail = redact_sensitive(&failure.to_string());
            warn!(stage = "shell", action = "command_failed", error = %detail);
        }

        match flow {
            Flow::Continue(text) => {
                writeln!(stdout)?;
                write!(stdout, "{text}")?;
                stdout.flush()?;
            }
            Flow::Quit => break,
        }
    }

    info!(stage = "shell", action = "end");
    Ok(())
}
