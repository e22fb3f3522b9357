//! ZenTasks - Jira sync for the terminal.
//!
//! Runs the indicator against a terminal shell: configure credentials, count
//! assigned issues, or drive the interactive menu.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};

use zentasks::config::{ConfigStore, Credentials};
use zentasks::shell::TerminalShell;
use zentasks::{logging, Indicator};

#[derive(Debug, Parser)]
#[command(name = "zentasks", version, about = "Jira assigned-issue counter")]
struct Cli {
    /// Use this credentials file instead of the default location.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Request timeout in seconds.
    #[arg(long, global = true, value_name = "SECS", default_value_t = 10)]
    timeout: u64,

    /// Write debug-level logs, ignoring RUST_LOG.
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Save Jira credentials. Prompts for anything not given as a flag.
    Configure {
        /// Jira instance URL, e.g. https://company.atlassian.net
        #[arg(long)]
        url: Option<String>,
        /// Account email.
        #[arg(long)]
        email: Option<String>,
        /// API token.
        #[arg(long)]
        token: Option<String>,
    },
    /// Count the issues assigned to you.
    Sync,
    /// Interactive indicator menu.
    Menu,
    /// Print the config and log locations.
    Path,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.debug) {
        eprintln!("warning: logging disabled: {}", e);
    }

    let store = match cli.config {
        Some(path) => ConfigStore::at(path),
        None => ConfigStore::new()?,
    };

    let code = run(cli.command, store, Duration::from_secs(cli.timeout)).await?;
    logging::shutdown();
    Ok(code)
}

async fn run(command: Command, store: ConfigStore, timeout: Duration) -> anyhow::Result<ExitCode> {
    let mut indicator = Indicator::new(store, TerminalShell::stdio()).with_timeout(timeout);

    let ok = match command {
        Command::Configure { url, email, token }
            if url.is_some() || email.is_some() || token.is_some() =>
        {
            let current = indicator.store().load().unwrap_or_default();
            let creds = Credentials::new(
                url.unwrap_or(current.base_url),
                email.unwrap_or(current.email),
                token.unwrap_or(current.api_token),
            );
            indicator.save_credentials(&creds).is_ok()
        }
        Command::Configure { .. } => indicator.configure().is_ok(),
        Command::Sync => indicator.sync().await.is_ok(),
        Command::Menu => {
            while let Some(action) = indicator.shell_mut().next_action()? {
                // Failures are shown by the indicator; the menu keeps running.
                let _ = indicator.activate(action).await;
            }
            true
        }
        Command::Path => {
            println!("config: {}", indicator.store().path().display());
            if let Some(dir) = logging::log_directory() {
                println!("logs:   {}", dir.display());
            }
            true
        }
    };

    indicator.shutdown();
    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_configure_flags() {
        let cli = Cli::try_parse_from([
            "zentasks",
            "configure",
            "--url",
            "https://x.atlassian.net",
            "--token",
            "tok",
        ])
        .unwrap();

        match cli.command {
            Command::Configure { url, email, token } => {
                assert_eq!(url.as_deref(), Some("https://x.atlassian.net"));
                assert!(email.is_none());
                assert_eq!(token.as_deref(), Some("tok"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["zentasks", "sync", "--timeout", "3", "--config", "/tmp/c.json"])
                .unwrap();
        assert_eq!(cli.timeout, 3);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.json")));
        assert!(matches!(cli.command, Command::Sync));
    }
}
