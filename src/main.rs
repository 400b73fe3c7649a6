use clap::{Parser, Subcommand};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::io::AsyncBufReadExt;

use echo_bot::application::errors::BotError;
use echo_bot::application::services::{EchoBot, TurnService};
use echo_bot::infrastructure::adapters::{BotFrameworkAdapter, ConsoleAdapter};
use echo_bot::infrastructure::config::Config;
use echo_bot::infrastructure::server;

#[derive(Parser)]
#[command(name = "echo-bot")]
#[command(about = "A Bot Framework echo bot", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Listening port (overrides config)
    #[arg(short, long)]
    port: Option<u16>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP messaging endpoint
    Run,
    /// Chat with the bot in the terminal
    Chat,
    /// Show version
    Version,
    /// Generate default config
    InitConfig,
}

fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run => load_config(&cli.config, cli.port).and_then(run_server),
        Commands::Chat => load_config(&cli.config, cli.port).and_then(run_chat),
        Commands::Version => {
            println!("echo-bot v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::InitConfig => init_config(&cli.config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_config(config_path: &str, port_override: Option<u16>) -> Result<Config, BotError> {
    let mut config = if Path::new(config_path).exists() {
        Config::load(config_path)?
    } else {
        tracing::info!("No config at {}, using defaults", config_path);
        Config::default()
    };
    config.apply_env()?;

    if let Some(port) = port_override {
        config.server.port = port;
    }

    config.validate()?;
    Ok(config)
}

fn runtime() -> Result<tokio::runtime::Runtime, BotError> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| BotError::Internal(format!("Failed to start runtime: {}", e)))
}

fn run_server(config: Config) -> Result<(), BotError> {
    tracing::info!("Starting {}", config.bot.name);

    let adapter = BotFrameworkAdapter::new(config.credentials.clone());
    if adapter.is_anonymous() {
        tracing::warn!("No app id configured, running without authentication (emulator mode)");
    }
    let turns = Arc::new(TurnService::new(Arc::new(adapter), Arc::new(EchoBot::new())));

    runtime()?.block_on(async {
        let addr = config.bind_addr();
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| BotError::Network(format!("Failed to bind {}: {}", addr, e)))?;
        server::serve(listener, turns).await
    })
}

fn run_chat(config: Config) -> Result<(), BotError> {
    runtime()?.block_on(async {
        let adapter = Arc::new(ConsoleAdapter::new(config.bot.name.clone()));
        let turns = TurnService::new(adapter.clone(), Arc::new(EchoBot::new()));

        println!("{} console. Type 'exit' to quit.", config.bot.name);
        turns.process_activity(None, adapter.join_activity()).await?;

        let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines
            .next_line()
            .await
            .map_err(|e| BotError::Internal(e.to_string()))?
        {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if line == "exit" || line == "quit" {
                break;
            }
            turns.process_activity(None, adapter.message_activity(line)).await?;
        }

        Ok(())
    })
}

fn init_config(config_path: &str) -> Result<(), BotError> {
    if Path::new(config_path).exists() {
        return Err(BotError::Internal(format!("{} already exists", config_path)));
    }

    let yaml = Config::default().to_yaml()?;
    std::fs::write(config_path, yaml)
        .map_err(|e| BotError::Internal(format!("Failed to write {}: {}", config_path, e)))?;

    println!("Wrote default config to {}", config_path);
    Ok(())
}
