use crate::error::Result;
use async_trait::async_trait;
use sqlx::SqliteConnection;

/// A record that knows how to find, insert and refresh its own row.
///
/// All three run on the batch connection, so rows staged earlier in the batch are visible.
#[async_trait]
pub trait Upsert: Send + Sync {
    type Key: Send;

    async fn find_existing(&self, conn: &mut SqliteConnection) -> Result<Option<Self::Key>>;

    async fn insert(&self, conn: &mut SqliteConnection) -> Result<Self::Key>;

    /// Overwrite mutable fields only; the natural key is never touched.
    async fn update(&self, conn: &mut SqliteConnection, key: &Self::Key) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome<K> {
    Inserted(K),
    Updated(K),
}

impl<K> UpsertOutcome<K> {
    pub fn key(&self) -> &K {
        match self {
            Self::Inserted(key) | Self::Updated(key) => key,
        }
    }

    pub fn into_key(self) -> K {
        match self {
            Self::Inserted(key) | Self::Updated(key) => key,
        }
    }

    pub fn was_inserted(&self) -> bool {
        matches!(self, Self::Inserted(_))
    }
}

pub async fn upsert<U: Upsert>(conn: &mut SqliteConnection, record: &U) -> Result<UpsertOutcome<U::Key>> {
    match record.find_existing(&mut *conn).await? {
        Some(key) => {
            record.update(&mut *conn, &key).await?;
            Ok(UpsertOutcome::Updated(key))
        }
        None => Ok(UpsertOutcome::Inserted(record.insert(conn).await?)),
    }
}
