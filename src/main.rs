use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use mountain_forecast::error::user_facing_message;
use mountain_forecast::models::load_locations;
use mountain_forecast::report::render_wind_analysis;
use mountain_forecast::storage::archive_old_data;
use mountain_forecast::{
    ForecastConfig, LocalStore, OpenMeteoClient, Pipeline, PipelineSettings, RunOptions,
    StorageLayout, logging,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(author, version, about = "Mountain weather forecasts for ski touring")]
struct Cli {
    /// Configuration file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging for this crate
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Generate forecasts for the coming days and archive old data.
    Run {
        /// Reuse cached provider data when it is current
        #[arg(long)]
        use_cache: bool,
        #[arg(long)]
        skip_archive: bool,
        /// Number of days ahead to forecast
        #[arg(long)]
        days: Option<u32>,
    },
    /// Move date partitions past retention under the archive prefix.
    Archive {
        #[arg(long)]
        retention_days: Option<u32>,
        /// Report what would move without moving it
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the historical wind analysis for one location.
    Wind {
        #[arg(long)]
        location: String,
        /// Analysis date, YYYY-MM-DD (defaults to tomorrow)
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Fetch history from the provider instead of stored records
        #[arg(long)]
        live: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match ForecastConfig::load_from_path(cli.config.clone()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e:#}");
            return ExitCode::FAILURE;
        }
    };
    logging::init(&config.logging, cli.verbose);

    match execute(cli.command, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            eprintln!("Error: {}", user_facing_message(&e));
            ExitCode::FAILURE
        }
    }
}

fn build_pipeline(config: &ForecastConfig, settings: PipelineSettings) -> Result<Pipeline> {
    let locations_path = PathBuf::from(&config.data.locations_file);
    let locations = load_locations(&locations_path)
        .with_context(|| format!("Failed to load locations from {}", locations_path.display()))?;
    info!(count = locations.len(), "Loaded mountain locations");

    let client = OpenMeteoClient::new(&config.weather).context("Failed to create weather client")?;
    let store = LocalStore::new(&config.storage.root);

    Ok(Pipeline::new(
        Arc::new(client),
        Arc::new(store),
        StorageLayout::new(&config.storage),
        settings,
        locations,
    ))
}

async fn execute(command: Commands, config: ForecastConfig) -> Result<()> {
    let today = Local::now().date_naive();

    match command {
        Commands::Run {
            use_cache,
            skip_archive,
            days,
        } => {
            let mut settings = PipelineSettings::from_config(&config);
            if let Some(days) = days {
                settings.forecast_days = days;
            }
            let pipeline = build_pipeline(&config, settings)?;
            let summary = pipeline
                .run(today, RunOptions { use_cache, skip_archive })
                .await
                .context("Forecast run failed")?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Commands::Archive {
            retention_days,
            dry_run,
        } => {
            let store = LocalStore::new(&config.storage.root);
            let layout = StorageLayout::new(&config.storage);
            let retention = retention_days.unwrap_or(config.analysis.retention_days);
            let report = archive_old_data(&store, &layout, today, retention, dry_run).await;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Wind {
            location,
            date,
            live,
        } => {
            let pipeline = build_pipeline(&config, PipelineSettings::from_config(&config))?;
            let location = pipeline.find_location(&location)?.clone();
            let date = match date {
                Some(date) => date,
                None => today.succ_opt().context("Date out of range")?,
            };
            let analysis = pipeline
                .analyze_wind(&location, date, live)
                .await
                .with_context(|| format!("Wind analysis failed for {}", location.name))?;

            println!("{}\n", location.describe());
            println!("{}", render_wind_analysis(analysis.as_ref()));
            if let Some(analysis) = analysis {
                info!(
                    dominant = %analysis.dominant_direction,
                    hours = analysis.total_hours,
                    "Wind analysis done"
                );
            }
        }
    }
    Ok(())
}
