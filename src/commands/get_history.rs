use std::task::{Context, Poll};

use tower::Service;
use uuid::Uuid;

use crate::{
    domain::PointHistory,
    ports::{point_history::PointHistoryPort, user_point::UserPointPort},
};

use super::{BoxFuture, Error, PointService};

#[derive(Clone, Debug)]
pub struct GetHistoryRequest {
    pub user_id: Uuid,
}

impl<U, H> Service<GetHistoryRequest> for PointService<U, H>
where
    U: UserPointPort + Send + Sync + 'static,
    H: PointHistoryPort + Send + Sync + 'static,
{
    type Response = Vec<PointHistory>;
    type Error = Error;
    type Future = BoxFuture<Vec<PointHistory>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: GetHistoryRequest) -> Self::Future {
        let user_points = self.user_points.clone();
        let history = self.history.clone();
        Box::pin(async move {
            // Only known users have a history, even an empty one
            if user_points.get(req.user_id).await?.is_none() {
                return Err(Error::UserNotFound(req.user_id));
            }

            Ok(history.list_by_user(req.user_id).await?)
        })
    }
}
