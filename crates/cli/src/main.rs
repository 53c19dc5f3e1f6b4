use anyhow::Result;
use clap::{Parser, Subcommand};
use positioning_core::{AppConfig, ConfigLoader};

mod commands;

use commands::{AlertsArgs, EvaluateArgs, IngestCotArgs, IngestPricesArgs, SeriesArgs};

#[derive(Parser)]
#[command(name = "positioning")]
#[command(about = "Commitments-of-Traders positioning monitor", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long, global = true, default_value = "config/Config.toml")]
    config: String,

    /// Profile overlay (loads Config.{profile}.toml next to the config file)
    #[arg(long, global = true, env = "POSITIONING_PROFILE")]
    profile: Option<String>,

    /// Optional log file path (logs to file instead of stderr)
    #[arg(long, global = true)]
    log_file: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch daily closes from the price vendor
    IngestPrices(IngestPricesArgs),
    /// Fetch yearly COT archives
    IngestCot(IngestCotArgs),
    /// Evaluate positioning alerts
    Evaluate(EvaluateArgs),
    /// Ingest prices and COT reports, then evaluate alerts
    Run,
    /// List canonical markets
    Markets,
    /// Print prices and positioning joined by date
    Series(SeriesArgs),
    /// Print alert history, newest first
    Alerts(AlertsArgs),
}

fn init_logging(log_file: Option<&str>) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::sync::Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
        }
    }
    Ok(())
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    match &cli.profile {
        Some(profile) => ConfigLoader::load_with_profile(&cli.config, profile),
        None => ConfigLoader::load(&cli.config),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_deref())?;

    let config = load_config(&cli)?;
    tracing::debug!("Loaded config from {}", cli.config);

    match cli.command {
        Commands::IngestPrices(args) => commands::run_ingest_prices(&config, args).await?,
        Commands::IngestCot(args) => commands::run_ingest_cot(&config, args).await?,
        Commands::Evaluate(args) => commands::run_evaluate(&config, args).await?,
        Commands::Run => commands::run_full(&config).await?,
        Commands::Markets => commands::run_markets(&config).await?,
        Commands::Series(args) => commands::run_series(&config, args).await?,
        Commands::Alerts(args) => commands::run_alerts(&config, args).await?,
    }

    Ok(())
}
