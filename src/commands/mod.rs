use std::{future::Future, pin::Pin, sync::Arc};

use uuid::Uuid;

use crate::{
    config::PointServiceConfig,
    domain::{TransactionKind, UserPoint},
    gate::MutationGate,
    ports::{point_history::PointHistoryPort, user_point::UserPointPort},
};

pub mod charge_points;
pub mod get_history;
pub mod get_point;
pub mod use_points;

pub type BoxFuture<T> = Pin<Box<dyn Future<Output = Result<T, Error>> + Send>>;

/// Entry point for every point operation
///
/// Each operation is a [`tower::Service`] implementation for its request type. Cloning the service
/// is cheap and every clone shares the same ports and the same mutation gate.
pub struct PointService<U, H> {
    user_points: Arc<U>,
    history: Arc<H>,
    gate: Arc<MutationGate>,
}

impl<U, H> PointService<U, H> {
    pub fn new(user_points: U, history: H, config: &PointServiceConfig) -> Self {
        Self::from_parts(
            Arc::new(user_points),
            Arc::new(history),
            Arc::new(MutationGate::new(config.gate, config.acquire_timeout)),
        )
    }

    pub fn from_parts(user_points: Arc<U>, history: Arc<H>, gate: Arc<MutationGate>) -> Self {
        Self {
            user_points,
            history,
            gate,
        }
    }
}

impl<U, H> Clone for PointService<U, H> {
    fn clone(&self) -> Self {
        Self {
            user_points: self.user_points.clone(),
            history: self.history.clone(),
            gate: self.gate.clone(),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("user {0} does not exist")]
    UserNotFound(Uuid),
    #[error(transparent)]
    Domain(#[from] crate::domain::Error),
    #[error(transparent)]
    Busy(#[from] crate::gate::Busy),

    #[error("user point port error: {0:?}")]
    UserPoint(#[from] crate::ports::user_point::Error),
    #[error("point history port error: {0:?}")]
    PointHistory(#[from] crate::ports::point_history::Error),
}

/// Validate and commit one mutation while holding the gate
///
/// Either both the history entry and the new balance are written, or neither is.
#[tracing::instrument(level = "debug", skip(user_points, history, gate))]
async fn commit<U, H>(
    user_points: &U,
    history: &H,
    gate: &MutationGate,
    user_id: Uuid,
    amount: i64,
    kind: TransactionKind,
) -> Result<UserPoint, Error>
where
    U: UserPointPort + ?Sized,
    H: PointHistoryPort + ?Sized,
{
    let _permit = gate.acquire(user_id).await.map_err(|busy| {
        tracing::warn!(error = %busy, "mutation not admitted");
        busy
    })?;

    let current = user_points
        .get(user_id)
        .await?
        .unwrap_or_else(|| UserPoint::empty(user_id));

    let updated = current.apply(kind, amount).map_err(|err| {
        tracing::warn!(error = %err, current = current.points, "mutation rejected");
        err
    })?;

    let record = history
        .append(user_id, amount, kind, updated.updated_at)
        .await?;
    let stored = user_points.put(user_id, updated.points).await?;

    tracing::info!(
        history_id = record.id,
        points = stored.points,
        "mutation committed"
    );
    Ok(stored)
}
