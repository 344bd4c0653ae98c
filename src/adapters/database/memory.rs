use crate::{
    domain::{PointHistory, TransactionKind, UserPoint},
    ports::{
        point_history::{self, PointHistoryPort},
        user_point::{self, UserPointPort},
    },
};
use chrono::{DateTime, Utc};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};
use uuid::Uuid;

/// In-memory balance table
///
/// Each `put` replaces the whole `UserPoint` under the mutex, so readers never see a partial write.
#[derive(Clone, Debug, Default)]
pub struct MemoryUserPointTable {
    points: Arc<Mutex<HashMap<Uuid, UserPoint>>>,
}

#[async_trait::async_trait]
impl UserPointPort for MemoryUserPointTable {
    async fn get(&self, user_id: Uuid) -> Result<Option<UserPoint>, user_point::Error> {
        Ok(self.points.lock()?.get(&user_id).cloned())
    }

    async fn put(&self, user_id: Uuid, points: i64) -> Result<UserPoint, user_point::Error> {
        let point = UserPoint::new(user_id, points, Utc::now());
        self.points.lock()?.insert(user_id, point.clone());

        Ok(point)
    }
}

/// In-memory history log
///
/// Entries are kept in a single vector in append order; ids are `1..` in that same order.
#[derive(Clone, Debug, Default)]
pub struct MemoryPointHistoryTable {
    history: Arc<Mutex<Vec<PointHistory>>>,
}

#[async_trait::async_trait]
impl PointHistoryPort for MemoryPointHistoryTable {
    async fn append(
        &self,
        user_id: Uuid,
        amount: i64,
        kind: TransactionKind,
        at: DateTime<Utc>,
    ) -> Result<PointHistory, point_history::Error> {
        let mut history = self.history.lock()?;
        let record = PointHistory {
            id: history.len() as u64 + 1,
            user_id,
            amount,
            kind,
            at,
        };
        history.push(record.clone());

        Ok(record)
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<PointHistory>, point_history::Error> {
        let history = self
            .history
            .lock()?
            .iter()
            .filter(|record| record.user_id == user_id)
            .cloned()
            .collect();

        Ok(history)
    }
}

/// Erased [`PoisonError`]
///
/// `PoisonError` keeps the `MutexGuard` internally, which is not send. Thus we erase the error
/// and only keep the string representation instead.
#[derive(Debug, thiserror::Error)]
#[error("poison error: {0}")]
pub struct ErasedPoisonError(String);

impl<T> From<PoisonError<T>> for user_point::Error {
    fn from(err: PoisonError<T>) -> Self {
        Self::Adapter(Box::new(ErasedPoisonError(err.to_string())))
    }
}

impl<T> From<PoisonError<T>> for point_history::Error {
    fn from(err: PoisonError<T>) -> Self {
        Self::Adapter(Box::new(ErasedPoisonError(err.to_string())))
    }
}
