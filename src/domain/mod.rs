use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Largest amount accepted by a single charge
pub const MAX_CHARGE_AMOUNT: i64 = 99_999;

/// Point balance of a user
///
/// Values are never mutated in place: `charge` and `use_points` build a new `UserPoint` and leave
/// `self` untouched, whether they succeed or not.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserPoint {
    pub user_id: Uuid,
    /// Current number of points
    ///
    /// Never negative.
    pub points: i64,
    pub updated_at: DateTime<Utc>,
}

impl UserPoint {
    pub fn new(user_id: Uuid, points: i64, updated_at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            points,
            updated_at,
        }
    }

    /// Zero balance used when a user is seen for the first time
    pub fn empty(user_id: Uuid) -> Self {
        Self::new(user_id, 0, Utc::now())
    }

    /// Add `amount` points
    pub fn charge(&self, amount: i64) -> Result<Self, Error> {
        if amount <= 0 {
            return Err(Error::InvalidAmount(amount));
        }
        if amount > MAX_CHARGE_AMOUNT {
            return Err(Error::LimitExceeded(amount));
        }
        let points = self.points.checked_add(amount).ok_or(Error::Overflow {
            current: self.points,
            amount,
        })?;

        Ok(Self::new(self.user_id, points, Utc::now()))
    }

    /// Remove `amount` points
    pub fn use_points(&self, amount: i64) -> Result<Self, Error> {
        if amount <= 0 {
            return Err(Error::InvalidAmount(amount));
        }
        if amount > self.points {
            return Err(Error::InsufficientFunds {
                current: self.points,
                amount,
            });
        }

        Ok(Self::new(self.user_id, self.points - amount, Utc::now()))
    }

    /// Apply a transaction of the given kind
    pub fn apply(&self, kind: TransactionKind, amount: i64) -> Result<Self, Error> {
        match kind {
            TransactionKind::Charge => self.charge(amount),
            TransactionKind::Use => self.use_points(amount),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransactionKind {
    /// Points were added
    Charge,
    /// Points were spent
    Use,
}

/// Entry of the point history
///
/// One entry exists per committed charge or use. Rejected operations never produce one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PointHistory {
    /// Sequence number assigned by the history log
    ///
    /// Strictly increasing in append order, which is also the order in which mutations committed.
    pub id: u64,
    pub user_id: Uuid,
    /// Always positive. The direction comes from `kind`.
    pub amount: i64,
    pub kind: TransactionKind,
    pub at: DateTime<Utc>,
}

/// Rebuild a balance from zero by applying `history` in order
pub fn replay(history: &[PointHistory]) -> Result<i64, Error> {
    let Some(first) = history.first() else {
        return Ok(0);
    };

    history
        .iter()
        .try_fold(UserPoint::new(first.user_id, 0, first.at), |point, record| {
            point.apply(record.kind, record.amount)
        })
        .map(|point| point.points)
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("amount must be positive, got {0}")]
    InvalidAmount(i64),
    #[error("a single charge is limited to {MAX_CHARGE_AMOUNT} points, got {0}")]
    LimitExceeded(i64),
    /// The resulting total would not fit in the balance
    #[error("charging {amount} points to {current} would overflow")]
    Overflow { current: i64, amount: i64 },
    #[error("insufficient points: trying to use {amount} out of {current}")]
    InsufficientFunds { current: i64, amount: i64 },
}
