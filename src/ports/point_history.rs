use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{PointHistory, TransactionKind};

/// Append-only log of committed transactions
#[mockall::automock]
#[async_trait::async_trait]
pub trait PointHistoryPort {
    /// Record a committed transaction and assign it the next sequence id
    async fn append(
        &self,
        user_id: Uuid,
        amount: i64,
        kind: TransactionKind,
        at: DateTime<Utc>,
    ) -> Result<PointHistory, Error>;
    /// All entries of a user, oldest first
    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<PointHistory>, Error>;
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Concrete adapter errors
    ///
    /// See [`crate::ports::user_point::Error::Adapter`].
    #[error("adapter error: {0:?}")]
    Adapter(Box<dyn std::error::Error + Send + Sync>),
}
