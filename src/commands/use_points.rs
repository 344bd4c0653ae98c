use std::task::{Context, Poll};

use tower::Service;
use uuid::Uuid;

use crate::{
    domain::{TransactionKind, UserPoint},
    ports::{point_history::PointHistoryPort, user_point::UserPointPort},
};

use super::{commit, BoxFuture, Error, PointService};

#[derive(Clone, Debug)]
pub struct UsePointsRequest {
    pub user_id: Uuid,
    pub amount: i64,
}

impl<U, H> Service<UsePointsRequest> for PointService<U, H>
where
    U: UserPointPort + Send + Sync + 'static,
    H: PointHistoryPort + Send + Sync + 'static,
{
    type Response = UserPoint;
    type Error = Error;
    type Future = BoxFuture<UserPoint>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: UsePointsRequest) -> Self::Future {
        let user_points = self.user_points.clone();
        let history = self.history.clone();
        let gate = self.gate.clone();
        Box::pin(async move {
            commit(
                user_points.as_ref(),
                history.as_ref(),
                gate.as_ref(),
                req.user_id,
                req.amount,
                TransactionKind::Use,
            )
            .await
        })
    }
}
