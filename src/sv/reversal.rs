use crate::{
  entity::{CommissionStatus, commission},
  ports::Order,
  prelude::*,
  sv::{money, truncate},
};

const MAX_REASON_LEN: usize = 255;

/// Reversal guard, checked before every reversal mutation. Rows promised
/// to a withdrawal are immune until the withdrawal detaches them.
pub fn is_reversible(row: &commission::Model) -> bool {
  row.withdraw_request_id.is_none()
    && matches!(
      row.status,
      CommissionStatus::PendingConfirm | CommissionStatus::Available
    )
}

/// Refund increment clamped to what was still unrefunded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefundSlice {
  pub delta: i64,
  pub remaining: i64,
}

impl RefundSlice {
  /// `None` when the increment refunds nothing new.
  pub fn new(total: i64, refund_delta: i64, refunded_before: i64) -> Option<Self> {
    let total = total.max(0);
    let before = refunded_before.clamp(0, total);
    let remaining = total - before;
    let delta = refund_delta.min(remaining);

    (delta > 0).then_some(Self { delta, remaining })
  }

  /// Shrink `(commission, base)` by `delta / remaining`. Proration is
  /// against what was left before this refund, so a series of partial
  /// refunds never deducts the same money twice.
  pub fn apply(&self, amount: i64, base: i64) -> (i64, i64) {
    let deduct = money::prorate(amount, self.delta, self.remaining);
    let base_deduct = money::prorate(base, self.delta, self.remaining);
    ((amount - deduct).max(0), (base - base_deduct).max(0))
  }
}

pub struct Reversal<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Reversal<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  /// Reject every unsettled commission of a canceled order. Returns the
  /// number of rows rejected.
  pub async fn handle_order_canceled(
    &self,
    order_id: i64,
    reason: &str,
  ) -> Result<u64> {
    let txn = self.db.begin().await?;

    let rows = locked_rows(&txn, order_id).await?;
    let reason = truncate(reason.trim(), MAX_REASON_LEN);
    let now = now();
    let mut rejected = 0;

    for row in rows {
      if !is_reversible(&row) {
        debug!("Commission {} is attached to a withdrawal, kept", row.id);
        continue;
      }

      commission::ActiveModel {
        status: Set(CommissionStatus::Rejected),
        invalid_reason: Set(Some(reason.clone())),
        updated_at: Set(now),
        ..row.into()
      }
      .update(&txn)
      .await?;
      rejected += 1;
    }

    txn.commit().await?;

    if rejected > 0 {
      info!("Rejected {} commissions of canceled order {}", rejected, order_id);
    }
    Ok(rejected)
  }

  /// Same as [`Reversal::handle_order_refunded_tx`] in a transaction of its
  /// own.
  pub async fn handle_order_refunded(
    &self,
    order: &Order,
    refund_delta: i64,
    refunded_before: i64,
    reason: &str,
  ) -> Result<u64> {
    let txn = self.db.begin().await?;
    let touched = Self::handle_order_refunded_tx(
      &txn,
      order,
      refund_delta,
      refunded_before,
      reason,
    )
    .await?;
    txn.commit().await?;
    Ok(touched)
  }

  /// Prorate the order's commissions for a partial refund. Runs inside the
  /// caller's refund transaction so both commit or roll back together.
  pub async fn handle_order_refunded_tx<C: ConnectionTrait>(
    txn: &C,
    order: &Order,
    refund_delta: i64,
    refunded_before: i64,
    reason: &str,
  ) -> Result<u64> {
    let Some(slice) = RefundSlice::new(order.total, refund_delta, refunded_before)
    else {
      return Ok(0);
    };

    let rows = locked_rows(txn, order.id).await?;
    let reason = truncate(reason.trim(), MAX_REASON_LEN);
    let now = now();
    let mut touched = 0;

    for row in rows {
      if !is_reversible(&row) {
        debug!("Commission {} is attached to a withdrawal, kept", row.id);
        continue;
      }

      let (amount, base) = slice.apply(row.commission_amount, row.base_amount);
      let id = row.id;

      let mut active: commission::ActiveModel = row.into();
      active.base_amount = Set(base);
      active.updated_at = Set(now);

      if amount <= 0 {
        active.commission_amount = Set(0);
        active.status = Set(CommissionStatus::Rejected);
        active.confirm_at = Set(None);
        active.available_at = Set(None);
        active.invalid_reason = Set(Some(reason.clone()));
        debug!("Commission {} fully refunded", id);
      } else {
        active.commission_amount = Set(amount);
      }

      active.update(txn).await?;
      touched += 1;
    }

    if touched > 0 {
      info!(
        "Prorated {} commissions of order {} by {}/{}",
        touched,
        order.id,
        money::format(slice.delta),
        money::format(slice.remaining)
      );
    }
    Ok(touched)
  }
}

async fn locked_rows<C: ConnectionTrait>(
  conn: &C,
  order_id: i64,
) -> Result<Vec<commission::Model>> {
  Ok(
    commission::Entity::find()
      .filter(commission::Column::OrderId.eq(order_id))
      .filter(commission::Column::Status.is_in([
        CommissionStatus::PendingConfirm,
        CommissionStatus::Available,
      ]))
      .order_by_asc(commission::Column::Id)
      .lock_exclusive()
      .all(conn)
      .await?,
  )
}
