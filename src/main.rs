use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use poolbook::config::Config;
use poolbook::models::Credentials;
use poolbook::parser::ScheduleParser;
use poolbook::portal::PortalClient;
use poolbook::scheduler::BookingRunner;

#[derive(Parser)]
#[command(
    name = "poolbook",
    version,
    about = "Automated pool-slot booking for the NTU sports facility portal",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a TOML configuration file (environment variables otherwise)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json)
    #[arg(long, global = true, default_value = "text")]
    log_format: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the booking loop until interrupted
    Run {
        /// Path to the CSV file of desired booking times
        #[arg(short, long)]
        preferences: Option<PathBuf>,
    },

    /// Log in, fetch the current week's schedule and print availability
    Schedule,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_tracing(&cli.log_format, cli.verbose)?;

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };
    config.validate()?;

    let credentials = Credentials::from_env()?;

    match cli.command {
        Commands::Run { preferences } => {
            if let Some(path) = preferences {
                config.booking.preferences_path = path;
            }
            run(config, credentials).await?;
        }

        Commands::Schedule => {
            show_schedule(config, credentials).await?;
        }
    }

    Ok(())
}

fn setup_tracing(format: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("poolbook=debug,info")
    } else {
        tracing_subscriber::EnvFilter::new("poolbook=info,warn")
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    Ok(())
}

async fn run(config: Config, credentials: Credentials) -> Result<()> {
    let client = PortalClient::new(config.portal, credentials)?;
    let runner = BookingRunner::new(client, config.booking);

    tracing::info!("poolbook starting");
    tokio::select! {
        () = runner.run() => {}
        result = tokio::signal::ctrl_c() => {
            result?;
            tracing::info!("interrupt received, shutting down");
        }
    }

    Ok(())
}

async fn show_schedule(config: Config, credentials: Credentials) -> Result<()> {
    let client = PortalClient::new(config.portal, credentials)?;

    let session = client.authenticate().await?;
    let page = client.fetch_schedule(&session).await?;
    let schedule = ScheduleParser::new().parse(&page)?;

    println!("Availability for the coming week:");
    for (instant, token) in schedule.iter() {
        match token {
            Some(_) => println!("  {}  free lane", instant.format("%a %d-%b-%Y %H:%M")),
            None => println!("  {}  full", instant.format("%a %d-%b-%Y %H:%M")),
        }
    }

    Ok(())
}
