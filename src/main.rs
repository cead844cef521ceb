use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stat_grabber::config::{AppConfig, ConfigOverrides, Region};
use stat_grabber::fetch::ApiClient;
use stat_grabber::pipeline::Pipeline;

#[derive(Parser)]
#[command(name = "stat-grabber")]
#[command(about = "Retrieve World of Tanks player statistics and emit a CSV report")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: PathBuf,

    /// Credential token sent on every request
    #[arg(long)]
    token: Option<String>,

    /// API region endpoint
    #[arg(long, value_enum)]
    region: Option<Region>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch stats for a list of players and write the report
    Report {
        /// File with one player name per line
        input: PathBuf,

        /// Output CSV path (overwritten if it exists)
        output: PathBuf,

        /// Emit per-window, per-tier and per-vehicle breakdown columns
        #[arg(long, action = ArgAction::SetTrue)]
        extended: Option<bool>,

        /// Low-tier window sizes, comma-separated (extended mode only;
        /// default 3,5)
        #[arg(long, value_delimiter = ',')]
        windows: Option<Vec<usize>>,

        /// Record per-player failures and continue instead of aborting
        #[arg(long, action = ArgAction::SetTrue)]
        skip_failures: Option<bool>,
    },

    /// Fetch the vehicle catalog and emit the id → name mapping
    Catalog {
        /// Output CSV path (overwritten if it exists)
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting stat-grabber v{}", env!("CARGO_PKG_VERSION"));

    let mut config = if cli.config.exists() {
        AppConfig::from_file(&cli.config)?
    } else {
        AppConfig::default()
    };

    match cli.command {
        Commands::Report {
            input,
            output,
            extended,
            windows,
            skip_failures,
        } => {
            config.apply(ConfigOverrides {
                token: cli.token,
                region: cli.region,
                extended,
                windows,
                skip_failures,
            });
            config.validate()?;

            let client = ApiClient::new(&config)?;
            let pipeline = Pipeline::new(client, config);
            let summary = pipeline.run(&input, &output).await?;

            println!("\n=== Report Results ===");
            println!("Players:      {}", summary.players);
            println!("Rows written: {}", summary.rows_written);
            println!("Duration:     {:?}", summary.duration);
            if !summary.skipped.is_empty() {
                println!("\nSkipped:");
                for s in &summary.skipped {
                    println!("  - {}", s);
                }
            }
        }
        Commands::Catalog { output } => {
            config.apply(ConfigOverrides {
                token: cli.token,
                region: cli.region,
                ..Default::default()
            });
            config.validate()?;

            let client = ApiClient::new(&config)?;
            let pipeline = Pipeline::new(client, config);
            let summary = pipeline.run_catalog(&output).await?;

            println!("\n=== Catalog Results ===");
            println!("Duration: {:?}", summary.duration);
        }
    }

    Ok(())
}
