use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use jemallocator::Jemalloc;
use log::{error, info, LevelFilter};
use simple_logger::SimpleLogger;
use tokio_util::sync::CancellationToken;

#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use petrolens::{
    etl, run_server, AppState, CronScheduler, CronSettings, PostgresClient, PriceFeed,
    ProductionStore, Settings,
};

#[derive(Parser)]
#[command(name = "petrolens", version, about = "Well production analytics service")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Apply the schema and serve the HTTP API
    Serve,
    /// Apply the schema and exit
    Migrate,
    /// Load monthly well production from a CSV file
    LoadProduction {
        #[arg(long)]
        input: PathBuf,
    },
    /// Load the drilling inventory from a CSV file
    LoadWells {
        #[arg(long)]
        input: PathBuf,
    },
    /// Download the published well production CSV
    DownloadProduction {
        #[arg(long, default_value = "produccion.csv")]
        output: PathBuf,
        /// Source url; defaults to `etl.production_csv_url`
        #[arg(long)]
        url: Option<String>,
        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },
    /// Load monthly reference prices from a CSV file, or from the price feed
    LoadPrices {
        #[arg(long)]
        input: Option<PathBuf>,
    },
}

#[tokio::main()]
async fn main() -> anyhow::Result<()> {
    SimpleLogger::new()
        .with_level(LevelFilter::Info)
        .env()
        .init()
        .context("Failed to initialise logger")?;

    let cli = Cli::parse();

    let settings = Arc::new(
        Settings::new().context("Failed to load configuration (config.yaml / environment)")?,
    );

    match cli.command {
        Command::Serve => {
            let db = connect(&settings).await?;
            serve(settings, Arc::new(db)).await
        },
        Command::Migrate => connect(&settings).await.map(|_| ()),
        Command::DownloadProduction { output, url, force } => {
            let url = url.unwrap_or_else(|| settings.etl.production_csv_url.clone());
            etl::download_production(&url, &output, force).await?;
            Ok(())
        },
        Command::LoadProduction { input } => {
            let db = connect(&settings).await?;
            etl::load_production(&db, &input, settings.etl.batch_size).await?;
            Ok(())
        },
        Command::LoadWells { input } => {
            let db = connect(&settings).await?;
            etl::load_wells(&db, &input, settings.etl.batch_size).await?;
            Ok(())
        },
        Command::LoadPrices { input } => {
            let db = connect(&settings).await?;
            let feed = PriceFeed::new(&settings.prices)?;
            etl::load_prices(&db, input.as_deref(), &feed, settings.etl.batch_size).await?;
            Ok(())
        },
    }
}

/// Connect and bring the schema up to date.
async fn connect(settings: &Settings) -> anyhow::Result<PostgresClient> {
    let db = PostgresClient::new(settings.postgres.clone())
        .await
        .context("Failed to initialize database connection")?;
    db.migrate().await?;
    Ok(db)
}

async fn serve(settings: Arc<Settings>, db: Arc<PostgresClient>) -> anyhow::Result<()> {
    let cancellation_token = CancellationToken::new();

    let cron_settings = CronSettings::from(&settings.prices);
    let cron_handle = if cron_settings.has_jobs() {
        let feed = Arc::new(PriceFeed::new(&settings.prices)?);
        let cron_scheduler = CronScheduler::new(db.clone(), feed, cron_settings);
        let cron_token = cancellation_token.child_token();
        Some(tokio::spawn(async move {
            if let Err(e) = cron_scheduler.run(cron_token).await {
                error!("Cron scheduler failed: {:#}", e);
            }
        }))
    } else {
        None
    };

    let signal_token = cancellation_token.clone();
    tokio::spawn(async move {
        if let Err(e) = wait_for_shutdown_signal().await {
            error!("Signal handler failed: {:#}", e);
        }
        signal_token.cancel();
    });

    let store: Arc<dyn ProductionStore> = db;
    let state = AppState::new(store, settings.server.max_forecast_horizon);
    let result = run_server(&settings.server, state, cancellation_token.clone()).await;

    info!("Finishing all tasks...");
    cancellation_token.cancel();

    if let Some(handle) = cron_handle {
        info!("Waiting for cron scheduler to stop...");
        let _ = handle.await;
    }

    result
}

async fn wait_for_shutdown_signal() -> anyhow::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm_stream =
            signal(SignalKind::terminate()).context("Failed to install SIGTERM handler")?;

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Received shutdown signal (Ctrl+C), exiting gracefully...");
            },
            _ = sigterm_stream.recv() => {
                info!("Received SIGTERM, exiting gracefully...");
            },
        };
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c()
            .await
            .context("Failed to listen for Ctrl+C")?;
        info!("Received shutdown signal (Ctrl+C), exiting gracefully...");
    }

    Ok(())
}
