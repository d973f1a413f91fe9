use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "tracker-sync")]
#[command(about = "Synchronize motorsport reference data into the tracker database")]
#[command(version)]
pub struct Cli {
    /// Overrides DATABASE_URL
    #[arg(long, global = true)]
    pub database_url: Option<String>,

    /// Overrides TEAM_CROSSWALK_FILE
    #[arg(long, global = true)]
    pub crosswalk: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Countries from the country reference API
    Countries,
    /// Championship seasons
    Seasons,
    /// Seed the race and driver status labels
    Statuses,
    /// Circuits, without layout data
    Tracks,
    /// Constructors and their branding
    Teams {
        /// Only this season; every stored season otherwise
        #[arg(short, long)]
        year: Option<i64>,
    },
    /// Drivers
    Drivers,
    /// Calendar and results, enriched with telemetry
    Races {
        #[arg(short, long)]
        year: Option<i64>,
    },
    /// Driver and constructor standings
    Standings {
        #[arg(short, long)]
        year: Option<i64>,
    },
    /// Pit stops, from 2011 on
    Pitstops {
        #[arg(short, long)]
        year: Option<i64>,
    },
    /// Every stage in dependency order
    All,
}
