pub const ERGAST_BASE_URL: &str = "https://api.jolpi.ca/ergast/f1";
pub const REST_COUNTRIES_URL: &str = "https://restcountries.com/v3.1";
pub const OPENF1_BASE_URL: &str = "https://api.openf1.org/v1";
pub const CIRCUIT_INFO_BASE_URL: &str = "https://api.multiviewer.app/api/v1";

pub const DEFAULT_DATABASE_URL: &str = "sqlite://tracker.db";

/// The results API caps pages at this size unless `limit` is raised.
pub const DEFAULT_PAGE_SIZE: u32 = 30;
pub const DEFAULT_REQUEST_DELAY_MS: u64 = 500;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

pub const USER_AGENT: &str = concat!("tracker-sync/", env!("CARGO_PKG_VERSION"));

/// Placeholder brand color for teams without telemetry data.
pub const DEFAULT_TEAM_COLOR: &str = "#FFFFFF";

/// First season with pit stop data in the results API.
pub const FIRST_PIT_STOP_SEASON: i64 = 2011;

#[non_exhaustive]
pub struct StatusLabel;

impl StatusLabel {
    // Race
    pub const SCHEDULED: &'static str = "Scheduled";
    pub const COMPLETED: &'static str = "Completed";
    pub const CANCELLED: &'static str = "Cancelled";

    // Driver
    pub const RETIRED: &'static str = "Retired";
    pub const LAPPED: &'static str = "Lapped";
    pub const FINISHED: &'static str = "Finished";
}
