mod config;
mod demo;
mod inspect;
mod simulate;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info};

use stepflow_channels::{ChannelAdapter, ConsoleTransport, TelegramAdapter, TelegramTransport};
use stepflow_commands::{CommandDispatcher, CommandGraph, InMemorySessionStore};
use stepflow_config::StepflowConfig;

#[derive(Parser)]
#[command(name = "stepflow")]
#[command(about = "Stepflow: menu-driven guided command chains for chat bots")]
#[command(version)]
struct Cli {
    /// Path to config.yaml (default: $STEPFLOW_CONFIG_DIR/config.yaml or ~/.stepflow/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the Telegram bot
    Serve,
    /// Validate the config and print it with secrets masked
    Check,
    /// Print the command graph and the menu it produces
    Menu,
    /// Chat with the dispatcher on stdin/stdout
    Simulate {
        /// User id to act as
        #[arg(short, long, default_value_t = 1)]
        user: i64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let path = config::resolve_path(cli.config);

    match cli.command {
        Commands::Serve => {
            let loaded = config::load(&path, true).await?;
            run_server(&loaded.config).await?;
        }
        Commands::Check => {
            let loaded = config::load(&path, false).await?;
            run_check(&path, &loaded.config)?;
        }
        Commands::Menu => {
            let _loaded = config::load(&path, false).await?;
            let graph = CommandGraph::build(demo::demo_commands())?;
            print!("{}", inspect::render_graph(&graph));
        }
        Commands::Simulate { user } => {
            let loaded = config::load(&path, false).await?;
            let sessions = config::session_store(&loaded.config);
            let dispatcher = CommandDispatcher::with_settings(
                Arc::new(CommandGraph::build(demo::demo_commands())?),
                sessions,
                Arc::new(ConsoleTransport::new()),
                config::menu_settings(&loaded.config),
            );
            simulate::run(&dispatcher, user).await?;
        }
    }

    Ok(())
}

async fn run_server(config: &StepflowConfig) -> Result<()> {
    let token = config.bot_token().context("telegram.botToken is not set")?;
    let graph = Arc::new(CommandGraph::build(demo::demo_commands())?);
    info!(commands = graph.len(), heads = graph.heads().count(), "Command graph built");

    let sessions = config::session_store(config);
    if config.idle_timeout().is_some() {
        spawn_sweeper(sessions.clone(), config.sweep_interval());
    }

    let transport = TelegramTransport::from_token(token);
    let bot = transport.bot().clone();
    let dispatcher = Arc::new(CommandDispatcher::with_settings(
        graph,
        sessions,
        Arc::new(transport),
        config::menu_settings(config),
    ));

    let adapter = TelegramAdapter::new(bot, dispatcher);
    info!(adapter = adapter.name(), "Starting Stepflow");
    adapter.start().await
}

fn spawn_sweeper(sessions: Arc<InMemorySessionStore>, every: std::time::Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            let removed = sessions.sweep_expired().await;
            if removed > 0 {
                debug!(removed, "Swept idle sessions");
            }
        }
    });
}

fn run_check(path: &std::path::Path, config: &StepflowConfig) -> Result<()> {
    println!("Config: {}", path.display());

    let report = stepflow_config::validate_for_serving(config);
    for warning in &report.warnings {
        println!("  warning  {}: {}", warning.path, warning.message);
    }
    for error in &report.errors {
        println!("  error    {}: {}", error.path, error.message);
    }

    let graph = CommandGraph::build(demo::demo_commands());
    match &graph {
        Ok(graph) => println!("  ok       {} commands registered", graph.len()),
        Err(e) => println!("  error    commands: {e}"),
    }

    println!("\n{}", serde_yaml::to_string(&stepflow_config::redact(config))?);

    if report.is_valid() && graph.is_ok() {
        println!("Ready to serve.");
        Ok(())
    } else {
        anyhow::bail!("config check failed")
    }
}
