use uuid::Uuid;

use crate::{
  entity::{CommissionStatus, WithdrawStatus, commission, profile, withdraw_request},
  ports::Ports,
  prelude::*,
  sv::{Sweep, accrual::COMMISSION_TYPE_MAX_LEN, money, truncate},
};

const MAX_ACCOUNT_LEN: usize = 255;

/// Rows chosen to fund a withdrawal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Allocation {
  /// Rows attached with their whole amount.
  pub whole: Vec<i64>,
  /// The last row touched, when it holds more than what was still needed.
  pub split: Option<Split>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Split {
  pub id: i64,
  /// Stays on the original row, attached to the withdrawal.
  pub attached: i64,
  /// Moves to a fresh available row.
  pub leftover: i64,
}

impl Allocation {
  pub fn attached_ids(&self) -> Vec<i64> {
    self.whole.iter().copied().chain(self.split.map(|s| s.id)).collect()
  }
}

/// Greedily consume `rows` in order until `amount` is covered. Only the
/// last row touched may be split.
pub fn plan_allocation(
  rows: &[commission::Model],
  amount: i64,
) -> Result<Allocation> {
  let mut need = amount;
  let mut plan = Allocation::default();

  for row in rows.iter().filter(|row| row.commission_amount > 0) {
    if need == 0 {
      break;
    }

    if row.commission_amount <= need {
      plan.whole.push(row.id);
      need -= row.commission_amount;
    } else {
      plan.split = Some(Split {
        id: row.id,
        attached: need,
        leftover: row.commission_amount - need,
      });
      need = 0;
    }
  }

  if need > 0 {
    return Err(Error::InsufficientFunds {
      requested: amount,
      available: rows.iter().map(|row| row.commission_amount.max(0)).sum(),
    });
  }

  Ok(plan)
}

/// Distinct commission type for the remainder of a split row, so it never
/// collides with the accrual key of the original.
pub fn split_tag() -> String {
  truncate(&format!("split:{}", Uuid::new_v4().simple()), COMMISSION_TYPE_MAX_LEN)
}

pub struct Withdraw<'a> {
  db: &'a DatabaseConnection,
  ports: &'a Ports,
}

impl<'a> Withdraw<'a> {
  pub fn new(db: &'a DatabaseConnection, ports: &'a Ports) -> Self {
    Self { db, ports }
  }

  /// Request a payout of `amount` cents funded by the user's available
  /// commissions. Either the full amount is reserved or nothing is.
  pub async fn apply(
    &self,
    user_id: i64,
    amount: i64,
    channel: &str,
    account: &str,
  ) -> Result<withdraw_request::Model> {
    let settings = self.ports.settings.affiliate().await?;
    if !settings.enabled {
      return Err(Error::ProgramDisabled);
    }

    if amount <= 0 {
      return Err(Error::InvalidAmount);
    }

    if amount < settings.min_withdraw {
      return Err(Error::BelowMinimum { min: settings.min_withdraw });
    }

    let channel = channel.trim();
    if !settings.channel_allowed(channel) {
      return Err(Error::InvalidChannel(channel.to_string()));
    }

    let account = account.trim();
    if account.is_empty() {
      return Err(Error::InvalidArgs("Payout account is required".into()));
    }

    if !self.ports.users.is_active(user_id).await? {
      return Err(Error::UserDisabled);
    }

    let now = now();
    Sweep::new(self.db).run(now).await?;

    let txn = self.db.begin().await?;

    let profile = profile::Entity::find()
      .filter(profile::Column::UserId.eq(user_id))
      .lock_exclusive()
      .one(&txn)
      .await?
      .ok_or(Error::ProfileNotFound)?;

    if !profile.is_active() {
      return Err(Error::ProfileDisabled);
    }

    let rows = commission::Entity::find()
      .filter(commission::Column::ProfileId.eq(profile.id))
      .filter(commission::Column::Status.eq(CommissionStatus::Available))
      .filter(commission::Column::WithdrawRequestId.is_null())
      .order_by_asc(commission::Column::CreatedAt)
      .order_by_asc(commission::Column::Id)
      .lock_exclusive()
      .all(&txn)
      .await?;

    // Dropping `txn` on error rolls back, nothing is reserved
    let plan = plan_allocation(&rows, amount)?;

    let request = withdraw_request::ActiveModel {
      id: NotSet,
      profile_id: Set(profile.id),
      amount: Set(amount),
      channel: Set(channel.to_string()),
      account: Set(truncate(account, MAX_ACCOUNT_LEN)),
      status: Set(WithdrawStatus::PendingReview),
      processed_by: Set(None),
      processed_at: Set(None),
      reject_reason: Set(None),
      created_at: Set(now),
      updated_at: Set(now),
    }
    .insert(&txn)
    .await?;

    if let Some(split) = plan.split
      && let Some(row) = rows.iter().find(|row| row.id == split.id)
    {
      let attached_base =
        money::prorate(row.base_amount, split.attached, row.commission_amount);

      commission::ActiveModel {
        id: NotSet,
        profile_id: Set(row.profile_id),
        order_id: Set(row.order_id),
        commission_type: Set(split_tag()),
        base_amount: Set(row.base_amount - attached_base),
        rate_bps: Set(row.rate_bps),
        commission_amount: Set(split.leftover),
        status: Set(CommissionStatus::Available),
        confirm_at: Set(row.confirm_at),
        available_at: Set(row.available_at),
        withdraw_request_id: Set(None),
        invalid_reason: Set(None),
        // keeps the remainder first in line for the next withdrawal
        created_at: Set(row.created_at),
        updated_at: Set(now),
      }
      .insert(&txn)
      .await?;

      commission::ActiveModel {
        base_amount: Set(attached_base),
        commission_amount: Set(split.attached),
        updated_at: Set(now),
        ..row.clone().into()
      }
      .update(&txn)
      .await?;

      debug!(
        "Split commission {}: {} attached, {} left",
        row.id,
        money::format(split.attached),
        money::format(split.leftover)
      );
    }

    let ids = plan.attached_ids();
    commission::Entity::update_many()
      .set(commission::ActiveModel {
        withdraw_request_id: Set(Some(request.id)),
        updated_at: Set(now),
        ..Default::default()
      })
      .filter(commission::Column::Id.is_in(ids.iter().copied()))
      .exec(&txn)
      .await?;

    txn.commit().await?;

    info!(
      "Withdraw request {} of {} by {} ({} rows)",
      request.id,
      money::format(amount),
      profile.code,
      ids.len()
    );
    Ok(request)
  }
}
