mod cli;

use clap::Parser;
use cli::{Cli, Commands};
use eyre::Result;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracker_sync::data_sync::SyncConfig;
use tracker_sync::etl::{SyncReport, Synchronizer, SynchronizerBuilder};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let mut config = SyncConfig::from_env()?;
    if let Some(database_url) = cli.database_url {
        config.database_url = database_url;
    }
    if let Some(crosswalk) = cli.crosswalk {
        config.team_crosswalk_file = Some(crosswalk);
    }

    let sync = SynchronizerBuilder::new().with_config(config).build().await?;
    let outcome = run(&sync, cli.command).await;
    sync.close().await;
    outcome
}

async fn run(sync: &Synchronizer, command: Commands) -> Result<()> {
    let report = match command {
        Commands::Countries => sync.sync_countries().await?,
        Commands::Seasons => sync.sync_seasons().await?,
        Commands::Statuses => sync.sync_statuses().await?,
        Commands::Tracks => sync.sync_tracks().await?,
        Commands::Teams { year } => sync.sync_teams(year).await?,
        Commands::Drivers => sync.sync_drivers().await?,
        Commands::Races { year } => sync.sync_races(year).await?,
        Commands::Standings { year } => sync.sync_standings(year).await?,
        Commands::Pitstops { year } => sync.sync_pit_stops(year).await?,
        Commands::All => {
            let mut total = SyncReport::default();
            for (table, report) in sync.run_all().await? {
                info!("{}: {}", table, report);
                total.merge(report);
            }
            total
        }
    };

    if report.failed_batches > 0 {
        warn!("{} season batches were rolled back", report.failed_batches);
    }
    info!("Done: {}", report);
    Ok(())
}
