pub mod constants;
pub mod data_sync; // Remote APIs: results, countries, telemetry
pub mod enrich; // Telemetry lookups: layouts, branding
pub mod error;
pub mod etl; // One routine per entity, plus the full pipeline
pub mod store; // Schema, natural-key resolution, upserts
pub mod utils;

#[cfg(test)]
mod test_support;

pub use data_sync::SyncConfig;
pub use error::{Result, SyncError};
pub use etl::{SyncReport, Synchronizer, SynchronizerBuilder};
pub use store::{Database, Table};
