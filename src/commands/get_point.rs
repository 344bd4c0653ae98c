use std::task::{Context, Poll};

use tower::Service;
use uuid::Uuid;

use crate::{
    domain::UserPoint,
    ports::{point_history::PointHistoryPort, user_point::UserPointPort},
};

use super::{BoxFuture, Error, PointService};

#[derive(Clone, Debug)]
pub struct GetPointRequest {
    pub user_id: Uuid,
}

/// Read the current balance of a user
///
/// This never waits on the mutation gate. A user that was never charged is reported as missing
/// rather than given an empty balance.
impl<U, H> Service<GetPointRequest> for PointService<U, H>
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

    fn call(&mut self, req: GetPointRequest) -> Self::Future {
        let user_points = self.user_points.clone();
        Box::pin(async move {
            user_points
                .get(req.user_id)
                .await?
                .ok_or(Error::UserNotFound(req.user_id))
        })
    }
}
