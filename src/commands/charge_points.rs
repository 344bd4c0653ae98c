use std::task::{Context, Poll};

use tower::Service;
use uuid::Uuid;

use crate::{
    domain::{TransactionKind, UserPoint},
    ports::{point_history::PointHistoryPort, user_point::UserPointPort},
};

use super::{commit, BoxFuture, Error, PointService};

#[derive(Clone, Debug)]
pub struct ChargePointsRequest {
    pub user_id: Uuid,
    pub amount: i64,
}

impl<U, H> Service<ChargePointsRequest> for PointService<U, H>
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

    fn call(&mut self, req: ChargePointsRequest) -> Self::Future {
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
                TransactionKind::Charge,
            )
            .await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        adapters::database::memory::{MemoryPointHistoryTable, MemoryUserPointTable},
        config::PointServiceConfig,
        domain::{self, MAX_CHARGE_AMOUNT},
        ports::{point_history::MockPointHistoryPort, user_point::MockUserPointPort},
    };
    use chrono::Utc;
    use mockall::predicate::*;
    use rstest::*;
    use speculoos::prelude::*;
    use std::sync::Arc;
    use tower::{BoxError, ServiceExt};

    #[fixture]
    fn user_id() -> Uuid {
        Uuid::new_v4()
    }

    #[rstest]
    #[tokio::test]
    async fn test_call(user_id: Uuid) -> Result<(), BoxError> {
        // GIVEN a user with 1000 points
        let user_points = MemoryUserPointTable::default();
        let history = MemoryPointHistoryTable::default();
        user_points.put(user_id, 1000).await?;
        let mut service = PointService::new(
            user_points.clone(),
            history.clone(),
            &PointServiceConfig::default(),
        );

        // WHEN charging 500 points
        let req = ChargePointsRequest {
            user_id,
            amount: 500,
        };
        let res = ServiceExt::<ChargePointsRequest>::ready(&mut service)
            .await?
            .call(req)
            .await;

        // THEN
        // * the new balance is returned and stored
        // * a single charge entry is logged
        assert_that!(res).is_ok().matches(|point| point.points == 1500);
        assert_that!(user_points.get(user_id).await?)
            .is_some()
            .matches(|point| point.points == 1500);
        let entries = history.list_by_user(user_id).await?;
        assert_that!(entries).has_length(1);
        assert_that!(entries[0].kind).is_equal_to(TransactionKind::Charge);
        assert_that!(entries[0].amount).is_equal_to(500);

        Ok(())
    }

    #[rstest]
    #[tokio::test]
    async fn test_call_new_user(user_id: Uuid) -> Result<(), BoxError> {
        // GIVEN a user that was never seen
        let user_points = MemoryUserPointTable::default();
        let service = PointService::new(
            user_points.clone(),
            MemoryPointHistoryTable::default(),
            &PointServiceConfig::default(),
        );

        // WHEN charging points
        let res = service
            .oneshot(ChargePointsRequest {
                user_id,
                amount: 300,
            })
            .await;

        // THEN the balance starts from zero
        assert_that!(res).is_ok().matches(|point| point.points == 300);
        assert_that!(user_points.get(user_id).await?).is_some();

        Ok(())
    }

    /// Rejected charges never reach the history log nor the balance store
    #[rstest]
    #[case(0, domain::Error::InvalidAmount(0))]
    #[case(-5, domain::Error::InvalidAmount(-5))]
    #[case(MAX_CHARGE_AMOUNT + 1, domain::Error::LimitExceeded(MAX_CHARGE_AMOUNT + 1))]
    #[tokio::test]
    async fn test_call_rejected(
        user_id: Uuid,
        #[case] amount: i64,
        #[case] expected: domain::Error,
    ) {
        // GIVEN
        // * a user with 1000 points
        // * a history log that must not be written to
        let mut user_points = MockUserPointPort::new();
        user_points
            .expect_get()
            .times(1)
            .with(eq(user_id))
            .returning(move |_| Ok(Some(UserPoint::new(user_id, 1000, Utc::now()))));
        user_points.expect_put().never();
        let mut history = MockPointHistoryPort::new();
        history.expect_append().never();

        let service = PointService::new(user_points, history, &PointServiceConfig::default());

        // WHEN charging an invalid amount
        let res = service
            .clone()
            .oneshot(ChargePointsRequest { user_id, amount })
            .await;

        // THEN the domain error is returned unchanged
        assert_that!(res)
            .is_err()
            .matches(|err| matches!(err, Error::Domain(inner) if *inner == expected));
        Arc::into_inner(service.user_points).unwrap().checkpoint();
        Arc::into_inner(service.history).unwrap().checkpoint();
    }

    #[rstest]
    #[tokio::test]
    async fn test_call_ports(user_id: Uuid) -> Result<(), BoxError> {
        // GIVEN ports expecting exactly one append then one put
        let mut user_points = MockUserPointPort::new();
        let mut history = MockPointHistoryPort::new();
        let mut seq = mockall::Sequence::new();
        user_points
            .expect_get()
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |_| Ok(Some(UserPoint::new(user_id, 10, Utc::now()))));
        history
            .expect_append()
            .times(1)
            .in_sequence(&mut seq)
            .with(eq(user_id), eq(20), eq(TransactionKind::Charge), always())
            .returning(|user_id, amount, kind, at| {
                Ok(domain::PointHistory {
                    id: 1,
                    user_id,
                    amount,
                    kind,
                    at,
                })
            });
        user_points
            .expect_put()
            .times(1)
            .in_sequence(&mut seq)
            .with(eq(user_id), eq(30))
            .returning(|user_id, points| Ok(UserPoint::new(user_id, points, Utc::now())));

        let mut service = PointService::new(user_points, history, &PointServiceConfig::default());

        // WHEN charging points
        let res = ServiceExt::<ChargePointsRequest>::ready(&mut service)
            .await?
            .call(ChargePointsRequest {
                user_id,
                amount: 20,
            })
            .await;

        // THEN every port is called in order
        assert_that!(res).is_ok().matches(|point| point.points == 30);
        Arc::into_inner(service.user_points).unwrap().checkpoint();
        Arc::into_inner(service.history).unwrap().checkpoint();

        Ok(())
    }
}
