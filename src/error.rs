use crate::utils::config_loader::LoadConfigError;

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    // Remote APIs
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },
    #[error("unexpected payload from {url}: {reason}")]
    Payload { url: String, reason: String },

    // Storage
    #[error(transparent)]
    Database(#[from] sqlx::Error),

    // Setup
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error(transparent)]
    LoadConfig(#[from] LoadConfigError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SyncError {
    pub fn http(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Http { url: url.into(), source }
    }

    pub fn payload(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::Payload { url: url.into(), reason: reason.to_string() }
    }

    /// Network and API failures abort the whole run; everything else only aborts the current batch.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Http { .. } | Self::Status { .. })
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_classification() {
        let status = SyncError::Status { url: "http://x".to_string(), status: 503 };
        assert!(status.is_network());

        let payload = SyncError::payload("http://x", "missing MRData");
        assert!(!payload.is_network());

        let db = SyncError::Database(sqlx::Error::RowNotFound);
        assert!(!db.is_network());
    }

    #[test]
    fn test_display_mentions_url() {
        let err = SyncError::Status { url: "https://api.test/seasons".to_string(), status: 429 };
        assert_eq!(err.to_string(), "https://api.test/seasons answered with status 429");
    }
}
