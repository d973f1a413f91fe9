/// Remote data sources
///
/// - `source`: raw JSON transport, with request pacing and an optional on-disk cache
/// - `paginator`: offset pagination over the results API
/// - `ergast`: typed tables of the historical results API
/// - `rest_countries`: the country reference API
/// - `telemetry`: session telemetry and circuit layouts
/// - `crosswalk`: hand-maintained mapping between team names of the two APIs
pub mod config;
pub mod crosswalk;
pub mod ergast;
pub mod paginator;
pub mod rest_countries;
pub mod source;
pub mod telemetry;

pub use config::SyncConfig;
pub use source::{CachedSource, HttpSource, JsonSource, ThrottledSource};
pub use telemetry::{HttpTelemetry, TelemetrySource};
