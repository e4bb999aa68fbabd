use std::str::FromStr;

use crate::{
  entity::{CommissionStatus, WithdrawStatus, commission, withdraw_request},
  prelude::*,
  sv::{clean, money},
};

const MAX_REASON_LEN: usize = 255;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewAction {
  Pay,
  Reject,
}

impl FromStr for ReviewAction {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "pay" | "paid" | "approve" => Ok(ReviewAction::Pay),
      "reject" | "rejected" => Ok(ReviewAction::Reject),
      other => Err(Error::InvalidArgs(format!("Unknown review action `{other}`"))),
    }
  }
}

/// Admin decision on withdraw requests.
pub struct Review<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Review<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  pub async fn review(
    &self,
    admin_id: i64,
    withdraw_id: i64,
    action: ReviewAction,
    reject_reason: Option<&str>,
  ) -> Result<withdraw_request::Model> {
    let txn = self.db.begin().await?;

    let request = withdraw_request::Entity::find_by_id(withdraw_id)
      .lock_exclusive()
      .one(&txn)
      .await?
      .ok_or(Error::WithdrawNotFound)?;

    if request.status != WithdrawStatus::PendingReview {
      return Err(Error::StatusConflict(format!(
        "withdraw request {} is already {:?}",
        request.id, request.status
      )));
    }

    let now = now();
    let attached = commission::Entity::find()
      .filter(commission::Column::WithdrawRequestId.eq(request.id))
      .lock_exclusive()
      .all(&txn)
      .await?;

    let (status, reject_reason) = match action {
      ReviewAction::Reject => {
        // Rows keep their status and become spendable again
        commission::Entity::update_many()
          .set(commission::ActiveModel {
            withdraw_request_id: Set(None),
            updated_at: Set(now),
            ..Default::default()
          })
          .filter(commission::Column::WithdrawRequestId.eq(request.id))
          .exec(&txn)
          .await?;

        (WithdrawStatus::Rejected, clean(reject_reason, MAX_REASON_LEN))
      }
      ReviewAction::Pay => {
        let sum: i64 = attached.iter().map(|row| row.commission_amount).sum();
        if sum != request.amount {
          error!(
            "Withdraw request {} has {} attached, expected {}",
            request.id,
            money::format(sum),
            money::format(request.amount)
          );
          return Err(Error::AllocationMismatch {
            id: request.id,
            attached: sum,
            requested: request.amount,
          });
        }

        commission::Entity::update_many()
          .set(commission::ActiveModel {
            status: Set(CommissionStatus::Withdrawn),
            updated_at: Set(now),
            ..Default::default()
          })
          .filter(commission::Column::WithdrawRequestId.eq(request.id))
          .exec(&txn)
          .await?;

        (WithdrawStatus::Paid, None)
      }
    };

    let updated = withdraw_request::ActiveModel {
      status: Set(status),
      reject_reason: Set(reject_reason),
      processed_by: Set(Some(admin_id)),
      processed_at: Set(Some(now)),
      updated_at: Set(now),
      ..request.into()
    }
    .update(&txn)
    .await?;

    txn.commit().await?;

    info!(
      "Withdraw request {} {:?} by admin {} ({} rows)",
      updated.id,
      updated.status,
      admin_id,
      attached.len()
    );
    Ok(updated)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::sv::{Dashboard, Withdraw, test_utils::fakes::Fixture};

  async fn funded(fx: &Fixture) -> (i64, withdraw_request::Model) {
    let profile = fx.profile(1, "AAAAAAAA").await;
    fx.commission(profile.id, 100, 1000, CommissionStatus::Available).await;
    fx.commission(profile.id, 101, 1000, CommissionStatus::Available).await;
    let request = Withdraw::new(&fx.db, &fx.ports)
      .apply(1, 1500, "usdt", "T-addr")
      .await
      .unwrap();
    (profile.id, request)
  }

  #[test]
  fn test_parse_action() {
    assert_eq!("approve".parse::<ReviewAction>().unwrap(), ReviewAction::Pay);
    assert_eq!(" PAY ".parse::<ReviewAction>().unwrap(), ReviewAction::Pay);
    assert_eq!("reject".parse::<ReviewAction>().unwrap(), ReviewAction::Reject);
    assert!(matches!(
      "delete".parse::<ReviewAction>(),
      Err(Error::InvalidArgs(_))
    ));
  }

  #[tokio::test]
  async fn test_reject_detaches_rows() {
    let fx = Fixture::new().await;
    let (profile_id, request) = funded(&fx).await;

    let reviewed = Review::new(&fx.db)
      .review(42, request.id, ReviewAction::Reject, Some("  wrong address "))
      .await
      .unwrap();

    assert_eq!(reviewed.status, WithdrawStatus::Rejected);
    assert_eq!(reviewed.reject_reason.as_deref(), Some("wrong address"));
    assert_eq!(reviewed.processed_by, Some(42));
    assert!(reviewed.processed_at.is_some());

    let rows = commission::Entity::find().all(&fx.db).await.unwrap();
    assert!(rows.iter().all(|r| r.withdraw_request_id.is_none()));
    assert!(rows.iter().all(|r| r.status == CommissionStatus::Available));

    // funds are spendable again
    let balance =
      Dashboard::new(&fx.db).withdrawable_balance(profile_id).await.unwrap();
    assert_eq!(balance, 2000);
    Withdraw::new(&fx.db, &fx.ports)
      .apply(1, 2000, "usdt", "T-addr")
      .await
      .unwrap();
  }

  #[tokio::test]
  async fn test_reject_keeps_row_status() {
    let fx = Fixture::new().await;
    let (_, request) = funded(&fx).await;
    // a row attached while pending review stays as it is
    let attached = commission::Entity::find()
      .filter(commission::Column::WithdrawRequestId.eq(request.id))
      .one(&fx.db)
      .await
      .unwrap()
      .unwrap();
    commission::ActiveModel {
      status: Set(CommissionStatus::Rejected),
      ..attached.clone().into()
    }
    .update(&fx.db)
    .await
    .unwrap();

    Review::new(&fx.db)
      .review(42, request.id, ReviewAction::Reject, None)
      .await
      .unwrap();

    let row = fx.reload(attached.id).await;
    assert_eq!(row.withdraw_request_id, None);
    assert_eq!(row.status, CommissionStatus::Rejected);
  }

  #[tokio::test]
  async fn test_pay_settles_rows() {
    let fx = Fixture::new().await;
    let (profile_id, request) = funded(&fx).await;

    let reviewed = Review::new(&fx.db)
      .review(42, request.id, ReviewAction::Pay, Some("ignored"))
      .await
      .unwrap();

    assert_eq!(reviewed.status, WithdrawStatus::Paid);
    assert_eq!(reviewed.reject_reason, None);

    let withdrawn = commission::Entity::find()
      .filter(commission::Column::Status.eq(CommissionStatus::Withdrawn))
      .all(&fx.db)
      .await
      .unwrap();
    assert_eq!(withdrawn.iter().map(|r| r.commission_amount).sum::<i64>(), 1500);

    let balance =
      Dashboard::new(&fx.db).withdrawable_balance(profile_id).await.unwrap();
    assert_eq!(balance, 500);
  }

  #[tokio::test]
  async fn test_terminal_requests_cannot_be_reviewed_again() {
    let fx = Fixture::new().await;
    let (_, request) = funded(&fx).await;
    let sv = Review::new(&fx.db);

    sv.review(42, request.id, ReviewAction::Pay, None).await.unwrap();

    assert!(matches!(
      sv.review(42, request.id, ReviewAction::Reject, None).await,
      Err(Error::StatusConflict(_))
    ));
    assert!(matches!(
      sv.review(42, request.id, ReviewAction::Pay, None).await,
      Err(Error::StatusConflict(_))
    ));
    assert!(matches!(
      sv.review(42, 999, ReviewAction::Pay, None).await,
      Err(Error::WithdrawNotFound)
    ));

    // settled rows never come back
    let rows = commission::Entity::find()
      .filter(commission::Column::Status.eq(CommissionStatus::Withdrawn))
      .count(&fx.db)
      .await
      .unwrap();
    assert_eq!(rows, 2);
  }

  #[tokio::test]
  async fn test_pay_refuses_mismatched_allocation() {
    let fx = Fixture::new().await;
    let (_, request) = funded(&fx).await;
    withdraw_request::ActiveModel {
      amount: Set(1600),
      ..request.clone().into()
    }
    .update(&fx.db)
    .await
    .unwrap();

    let result =
      Review::new(&fx.db).review(42, request.id, ReviewAction::Pay, None).await;

    assert!(matches!(result, Err(Error::AllocationMismatch { .. })));
    let request = withdraw_request::Entity::find_by_id(request.id)
      .one(&fx.db)
      .await
      .unwrap()
      .unwrap();
    assert_eq!(request.status, WithdrawStatus::PendingReview);
  }
}
