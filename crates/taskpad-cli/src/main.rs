//! Taskpad CLI
//!
//! Command-line interface and terminal UI for a remote task list.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use taskpad_core::{Config, HttpTaskApi, TaskSynchronizer};

mod commands;
mod output;
mod tui;

use commands::Synchronizer;
use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "taskpad")]
#[command(about = "Taskpad - view, add and complete tasks on a task server")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Task API base URL (overrides config and TASKPAD_API_URL)
    #[arg(long, global = true, value_name = "URL")]
    api_url: Option<String>,

    /// Path to the config file
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the TUI interface
    Tui,
    /// List all tasks
    #[command(alias = "ls")]
    List,
    /// Add a new task
    #[command(alias = "create")]
    Add {
        /// Task title
        title: String,
    },
    /// Toggle a task between done and pending
    Toggle {
        /// Task ID
        id: String,
    },
    /// Show task counts
    Stats,
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (api_url, log_file)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    // Config commands don't talk to the server
    if let Some(Commands::Config { command }) = &cli.command {
        return handle_config_command(command.clone(), cli.config.as_ref(), &output);
    }

    let mut config = Config::load_with_cli_override(cli.config.as_ref())
        .context("Failed to load configuration")?;
    if let Some(url) = &cli.api_url {
        config.api_url = url.trim_end_matches('/').to_string();
    }

    let api = HttpTaskApi::new(&config.api_url)
        .with_context(|| format!("Failed to create HTTP client for {}", config.api_url))?;
    let sync: Synchronizer = TaskSynchronizer::new(api);

    let command = match cli.command {
        // TUI is the default when no command is given
        None | Some(Commands::Tui) => return tui::run(sync, &config).await,
        Some(command) => command,
    };

    init_cli_logging();

    match command {
        Commands::List => commands::task::list(&sync, &output).await,
        Commands::Add { title } => commands::task::add(&sync, title, &output).await,
        Commands::Toggle { id } => commands::task::toggle(&sync, id, &output).await,
        Commands::Stats => commands::task::stats(&sync, &output).await,
        Commands::Tui | Commands::Config { .. } => unreachable!(), // Handled above
    }
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}

/// Log to stderr for one-shot commands
///
/// Level comes from TASKPAD_LOG, defaulting to warn.
fn init_cli_logging() {
    let level = std::env::var("TASKPAD_LOG").unwrap_or_else(|_| "warn".to_string());
    let env_filter = EnvFilter::new(format!("taskpad_core={},taskpad_cli={}", level, level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
