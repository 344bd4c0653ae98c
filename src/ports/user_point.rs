use uuid::Uuid;

use crate::domain::UserPoint;

/// Store holding the current balance of every user
///
/// A `put` must replace the stored value in a single step: concurrent `get` calls observe either
/// the previous or the new balance, never a mix of both.
#[mockall::automock]
#[async_trait::async_trait]
pub trait UserPointPort {
    /// Current balance of a user, or `None` if the user was never written
    async fn get(&self, user_id: Uuid) -> Result<Option<UserPoint>, Error>;
    /// Insert or replace the balance of a user
    ///
    /// Returns the stored value, stamped with the time of the write.
    async fn put(&self, user_id: Uuid, points: i64) -> Result<UserPoint, Error>;
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Concrete adapter errors
    ///
    /// This could represent any errors from a concrete adapter that is not part of the domain
    /// model, such as connectivity, configuration, or permission errors.
    #[error("adapter error: {0:?}")]
    Adapter(Box<dyn std::error::Error + Send + Sync>),
}
