//! Read-only views for the affiliate dashboard and the admin panel.
//! Nothing here locks, aggregates may lag behind in-flight writes.

use sea_orm::sea_query::Expr;
use serde::Serialize;

use crate::{
  entity::{
    CommissionStatus, WithdrawStatus, click, commission, profile,
    withdraw_request,
  },
  prelude::*,
};

pub const MAX_PER_PAGE: u64 = 100;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Bucket {
  pub count: u64,
  pub amount: i64,
}

impl Bucket {
  fn add(&mut self, amount: i64) {
    self.count += 1;
    self.amount += amount;
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProfileStats {
  pub clicks: u64,
  pub pending: Bucket,
  /// Available and not reserved by a withdraw request.
  pub available: Bucket,
  /// Reserved by a withdraw request awaiting review.
  pub in_review: Bucket,
  pub withdrawn: Bucket,
  pub rejected: Bucket,
}

#[derive(Debug, Clone, Default)]
pub struct CommissionFilter {
  pub profile_id: Option<i64>,
  pub order_id: Option<i64>,
  pub status: Option<CommissionStatus>,
}

#[derive(Debug, Clone, Default)]
pub struct WithdrawFilter {
  pub profile_id: Option<i64>,
  pub status: Option<WithdrawStatus>,
}

/// Zero-based page.
#[derive(Debug, Clone, Copy)]
pub struct Page {
  pub page: u64,
  pub per_page: u64,
}

impl Page {
  fn size(&self) -> u64 {
    self.per_page.clamp(1, MAX_PER_PAGE)
  }
}

impl Default for Page {
  fn default() -> Self {
    Self { page: 0, per_page: 20 }
  }
}

#[derive(Debug, Clone, Serialize)]
pub struct Listing<T> {
  pub items: Vec<T>,
  pub total: u64,
}

pub struct Dashboard<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Dashboard<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  pub async fn stats(&self, profile_id: i64) -> Result<ProfileStats> {
    profile::Entity::find_by_id(profile_id)
      .one(self.db)
      .await?
      .ok_or(Error::ProfileNotFound)?;

    let clicks = click::Entity::find()
      .filter(click::Column::ProfileId.eq(profile_id))
      .count(self.db)
      .await?;

    let rows = commission::Entity::find()
      .filter(commission::Column::ProfileId.eq(profile_id))
      .all(self.db)
      .await?;

    let mut stats = ProfileStats { clicks, ..Default::default() };
    for row in rows {
      let bucket = match row.status {
        CommissionStatus::PendingConfirm => &mut stats.pending,
        CommissionStatus::Available if row.withdraw_request_id.is_some() => {
          &mut stats.in_review
        }
        CommissionStatus::Available => &mut stats.available,
        CommissionStatus::Withdrawn => &mut stats.withdrawn,
        CommissionStatus::Rejected => &mut stats.rejected,
      };
      bucket.add(row.commission_amount);
    }

    Ok(stats)
  }

  /// Sum a new withdraw request could draw on right now.
  pub async fn withdrawable_balance(&self, profile_id: i64) -> Result<i64> {
    let sum: Option<Option<i64>> = commission::Entity::find()
      .select_only()
      .column_as(Expr::col(commission::Column::CommissionAmount).sum(), "sum")
      .filter(commission::Column::ProfileId.eq(profile_id))
      .filter(commission::Column::Status.eq(CommissionStatus::Available))
      .filter(commission::Column::WithdrawRequestId.is_null())
      .into_tuple()
      .one(self.db)
      .await?;

    Ok(sum.flatten().unwrap_or(0))
  }

  /// Newest first.
  pub async fn commissions(
    &self,
    filter: CommissionFilter,
    page: Page,
  ) -> Result<Listing<commission::Model>> {
    let mut query = commission::Entity::find();
    if let Some(profile_id) = filter.profile_id {
      query = query.filter(commission::Column::ProfileId.eq(profile_id));
    }
    if let Some(order_id) = filter.order_id {
      query = query.filter(commission::Column::OrderId.eq(order_id));
    }
    if let Some(status) = filter.status {
      query = query.filter(commission::Column::Status.eq(status));
    }

    let paginator = query
      .order_by_desc(commission::Column::CreatedAt)
      .order_by_desc(commission::Column::Id)
      .paginate(self.db, page.size());
    let total = paginator.num_items().await?;
    let items = paginator.fetch_page(page.page).await?;

    Ok(Listing { items, total })
  }

  /// Newest first.
  pub async fn withdrawals(
    &self,
    filter: WithdrawFilter,
    page: Page,
  ) -> Result<Listing<withdraw_request::Model>> {
    let mut query = withdraw_request::Entity::find();
    if let Some(profile_id) = filter.profile_id {
      query = query.filter(withdraw_request::Column::ProfileId.eq(profile_id));
    }
    if let Some(status) = filter.status {
      query = query.filter(withdraw_request::Column::Status.eq(status));
    }

    let paginator = query
      .order_by_desc(withdraw_request::Column::CreatedAt)
      .order_by_desc(withdraw_request::Column::Id)
      .paginate(self.db, page.size());
    let total = paginator.num_items().await?;
    let items = paginator.fetch_page(page.page).await?;

    Ok(Listing { items, total })
  }
}
