/// Relational storage of the tracker
///
/// - `database`: connection handle, schema and batch transactions
/// - `resolver`: natural-key lookups returning surrogate ids
/// - `upsert`: lookup-before-insert executor
/// - `records`: insertable records of every entity
/// - `models`: rows as read back from the tables
pub mod database;
pub mod models;
pub mod records;
pub mod resolver;
pub mod schema;
pub mod upsert;

pub use database::Database;
pub use upsert::{Upsert, UpsertOutcome, upsert};

use strum_macros::{Display, EnumIter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum Table {
    Country,
    Season,
    Status,
    Track,
    Team,
    Driver,
    Race,
    Result,
    Standing,
    #[strum(serialize = "pitstop")]
    PitStop,
}
