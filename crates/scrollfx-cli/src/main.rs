use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use scrollfx_core::AppConfig;

mod commands;

#[derive(Parser)]
#[command(name = "scrollfx")]
#[command(author, version, about = "Scroll-driven animation engine and scenario runner")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Use this config file instead of the default location
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a scenario's scripted offsets and print every frame
    Simulate {
        /// Scenario file (TOML)
        scenario: PathBuf,
        /// Comma-separated offsets replacing the scenario script
        #[arg(short, long, value_delimiter = ',')]
        offsets: Option<Vec<f64>>,
        /// Emit one JSON object per frame
        #[arg(long)]
        json: bool,
    },
    /// Run a scenario in real time with a smooth scroll through the page
    Play {
        /// Scenario file (TOML)
        scenario: PathBuf,
        /// Scroll destination; defaults to the bottom of the document
        #[arg(long)]
        to: Option<f64>,
        /// Scroll duration in milliseconds
        #[arg(short, long, default_value_t = 2000.0)]
        duration_ms: f64,
        /// Frames per second; defaults to the configured frame rate
        #[arg(long)]
        fps: Option<u32>,
    },
    /// Explore a scenario interactively in the terminal
    View {
        /// Scenario file (TOML)
        scenario: PathBuf,
    },
    /// Tabulate the built-in easing curves
    Easings {
        /// Number of samples across [0, 1]
        #[arg(short, long, default_value_t = 5)]
        samples: usize,
    },
    /// Interpolate between two values
    Interpolate {
        /// Start value: number, color, unit string or JSON
        from: String,
        /// End value
        to: String,
        /// Progress in [0, 1]
        #[arg(short, long, default_value_t = 0.5)]
        at: f64,
        /// Easing applied to progress first
        #[arg(short, long)]
        easing: Option<String>,
    },
    /// Inspect or create the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the config file location
    Path,
    /// Print the effective configuration
    Show,
    /// Write the default configuration if none exists
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Arc::new(match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    });

    // Initialize logging; the viewer owns the terminal so it only logs warnings
    let default_level = match cli.command {
        Commands::View { .. } => "warn".to_string(),
        _ => config.general.log_level.clone(),
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or(default_level),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match cli.command {
        Commands::Simulate {
            scenario,
            offsets,
            json,
        } => commands::simulate::run(&config, &scenario, offsets, json),
        Commands::Play {
            scenario,
            to,
            duration_ms,
            fps,
        } => commands::play::run(&config, &scenario, to, duration_ms, fps).await,
        Commands::View { scenario } => commands::view::run(config, &scenario),
        Commands::Easings { samples } => commands::easings::run(samples),
        Commands::Interpolate {
            from,
            to,
            at,
            easing,
        } => commands::interpolate::run(&from, &to, at, easing.as_deref()),
        Commands::Config { action } => match action {
            ConfigAction::Path => commands::config::path(cli.config.as_deref()),
            ConfigAction::Show => commands::config::show(&config),
            ConfigAction::Init { force } => commands::config::init(cli.config.as_deref(), force),
        },
    }
}
