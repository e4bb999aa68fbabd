use crate::{
  entity::{CommissionStatus, commission, profile},
  ports::{Order, Ports},
  prelude::*,
  settings::AffiliateSettings,
  sv::{Profile, is_unique_violation, money, truncate},
};

pub const COMMISSION_TYPE_MAX_LEN: usize = 32;
pub const DEFAULT_COMMISSION_TYPE: &str = "order";

/// Commission tag for an order type, bounded to the column width.
pub fn commission_type(order_type: &str) -> String {
  let tag = order_type.trim();
  if tag.is_empty() {
    DEFAULT_COMMISSION_TYPE.to_string()
  } else {
    truncate(tag, COMMISSION_TYPE_MAX_LEN)
  }
}

/// Σ max(item total − coupon, 0) over eligible items of the order and
/// all of its child orders.
pub fn eligible_base(order: &Order, eligible: &HashMap<i64, bool>) -> i64 {
  order
    .flatten()
    .into_iter()
    .flat_map(|o| o.items.iter())
    .filter(|item| eligible.get(&item.product_id).copied().unwrap_or(false))
    .map(|item| (item.total - item.coupon_discount).max(0))
    .sum()
}

pub struct Accrual<'a> {
  db: &'a DatabaseConnection,
  ports: &'a Ports,
}

impl<'a> Accrual<'a> {
  pub fn new(db: &'a DatabaseConnection, ports: &'a Ports) -> Self {
    Self { db, ports }
  }

  /// Accrue the commission of a paid order. Safe to call any number of
  /// times for the same order: only the first call writes.
  pub async fn handle_order_paid(
    &self,
    order_id: i64,
  ) -> Result<Option<commission::Model>> {
    let settings = self.ports.settings.affiliate().await?;
    if !settings.enabled {
      debug!("Affiliate program disabled, skipping order {}", order_id);
      return Ok(None);
    }

    let order = self
      .ports
      .orders
      .order(order_id)
      .await?
      .ok_or(Error::OrderNotFound(order_id))?;

    let Some(profile) = self.order_profile(&order).await? else {
      return Ok(None);
    };

    if !profile.is_active() || profile.user_id == order.user_id {
      debug!("Order {} is not creditable to {}", order_id, profile.code);
      return Ok(None);
    }

    let commission_type = commission_type(&order.order_type);

    let existing = commission::Entity::find()
      .filter(commission::Column::OrderId.eq(order.id))
      .filter(commission::Column::ProfileId.eq(profile.id))
      .filter(commission::Column::CommissionType.eq(commission_type.as_str()))
      .one(self.db)
      .await?;

    if existing.is_some() {
      debug!("Commission for order {} already accrued", order_id);
      return Ok(None);
    }

    let base = self.base_amount(&order).await?;
    let amount = money::percent_of(base, settings.commission_rate_bps);
    if amount <= 0 {
      debug!("Order {} yields no commission (base {})", order_id, base);
      return Ok(None);
    }

    let now = now();
    let paid_at = order.paid_at.unwrap_or(now);
    let (status, confirm_at, available_at) = schedule(&settings, paid_at);

    let inserted = commission::ActiveModel {
      id: NotSet,
      profile_id: Set(profile.id),
      order_id: Set(order.id),
      commission_type: Set(commission_type),
      base_amount: Set(base),
      rate_bps: Set(settings.commission_rate_bps),
      commission_amount: Set(amount),
      status: Set(status),
      confirm_at: Set(confirm_at),
      available_at: Set(available_at),
      withdraw_request_id: Set(None),
      invalid_reason: Set(None),
      created_at: Set(now),
      updated_at: Set(now),
    }
    .insert(self.db)
    .await;

    match inserted {
      Ok(row) => {
        info!(
          "Accrued {} for {} on order {} ({:?})",
          money::format(amount),
          profile.code,
          order.id,
          status
        );
        Ok(Some(row))
      }
      // Lost the race against a duplicate delivery of the same event
      Err(err) if is_unique_violation(&err) => Ok(None),
      Err(err) => Err(err.into()),
    }
  }

  async fn order_profile(&self, order: &Order) -> Result<Option<profile::Model>> {
    let profiles = Profile::new(self.db, self.ports);

    if let Some(id) = order.affiliate_profile_id {
      return profiles.by_id(id).await;
    }

    match order.affiliate_code.as_deref() {
      Some(code) => profiles.by_code(code).await,
      None => Ok(None),
    }
  }

  async fn base_amount(&self, order: &Order) -> Result<i64> {
    let ids: Vec<i64> = order
      .flatten()
      .into_iter()
      .flat_map(|o| o.items.iter().map(|item| item.product_id))
      .collect::<HashSet<_>>()
      .into_iter()
      .collect();

    if ids.is_empty() {
      return Ok(0);
    }

    let eligible = self.ports.products.affiliate_eligibility(&ids).await?;
    Ok(eligible_base(order, &eligible))
  }
}

fn schedule(
  settings: &AffiliateSettings,
  paid_at: DateTime,
) -> (CommissionStatus, Option<DateTime>, Option<DateTime>) {
  match settings.confirm_window() {
    Some(window) => {
      (CommissionStatus::PendingConfirm, Some(paid_at + window), None)
    }
    None => (CommissionStatus::Available, None, Some(paid_at)),
  }
}

#[cfg(test)]
mod tests {
  use std::sync::atomic::Ordering;

  use super::*;
  use crate::{
    entity::ProfileStatus,
    ports::OrderItem,
    sv::test_utils::fakes::{Fixture, simple_order},
  };

  #[test]
  fn test_eligible_base_spans_children_and_clamps() {
    let order = Order {
      items: vec![
        OrderItem { product_id: 1, total: 5000, coupon_discount: 1000 },
        OrderItem { product_id: 2, total: 3000, coupon_discount: 0 },
      ],
      children: vec![Order {
        items: vec![
          OrderItem { product_id: 1, total: 2000, coupon_discount: 0 },
          OrderItem { product_id: 3, total: 500, coupon_discount: 900 },
        ],
        ..Default::default()
      }],
      ..Default::default()
    };
    let eligible = HashMap::from([(1, true), (2, false), (3, true)]);

    // 4000 + 2000 + 0
    assert_eq!(eligible_base(&order, &eligible), 6000);
  }

  #[test]
  fn test_commission_type_is_bounded() {
    assert_eq!(commission_type("  "), DEFAULT_COMMISSION_TYPE);
    assert_eq!(commission_type("gift_card"), "gift_card");
    assert_eq!(commission_type(&"x".repeat(40)).len(), COMMISSION_TYPE_MAX_LEN);
  }

  #[tokio::test]
  async fn test_immediately_available_commission() {
    let fx = Fixture::new().await;
    fx.product(1, true);
    let profile = fx.profile(1, "AAAAAAAA").await;
    let mut order = simple_order(100, 2, 10_000);
    order.affiliate_profile_id = Some(profile.id);
    let paid_at = order.paid_at.unwrap();
    fx.order(order);

    let row = Accrual::new(&fx.db, &fx.ports)
      .handle_order_paid(100)
      .await
      .unwrap()
      .unwrap();

    assert_eq!(row.status, CommissionStatus::Available);
    assert_eq!(row.commission_amount, 1000);
    assert_eq!(row.base_amount, 10_000);
    assert_eq!(row.rate_bps, 1000);
    assert_eq!(row.available_at, Some(paid_at));
    assert_eq!(row.confirm_at, None);
  }

  #[tokio::test]
  async fn test_pending_commission_with_confirm_window() {
    let fx = Fixture::new().await;
    fx.settings(|s| s.confirm_days = 3);
    fx.product(1, true);
    fx.profile(1, "AAAAAAAA").await;
    let mut order = simple_order(100, 2, 10_000);
    order.affiliate_code = Some("aaaaaaaa".into());
    let paid_at = order.paid_at.unwrap();
    fx.order(order);

    let row = Accrual::new(&fx.db, &fx.ports)
      .handle_order_paid(100)
      .await
      .unwrap()
      .unwrap();

    assert_eq!(row.status, CommissionStatus::PendingConfirm);
    assert_eq!(row.confirm_at, Some(paid_at + TimeDelta::days(3)));
    assert_eq!(row.available_at, None);
  }

  #[tokio::test]
  async fn test_duplicate_delivery_accrues_once() {
    let fx = Fixture::new().await;
    fx.product(1, true);
    let profile = fx.profile(1, "AAAAAAAA").await;
    let mut order = simple_order(100, 2, 10_000);
    order.affiliate_profile_id = Some(profile.id);
    fx.order(order);
    let sv = Accrual::new(&fx.db, &fx.ports);

    assert!(sv.handle_order_paid(100).await.unwrap().is_some());
    assert!(sv.handle_order_paid(100).await.unwrap().is_none());

    let rows = commission::Entity::find()
      .filter(commission::Column::OrderId.eq(100))
      .count(&fx.db)
      .await
      .unwrap();
    assert_eq!(rows, 1);
  }

  #[tokio::test]
  async fn test_self_purchase_earns_nothing() {
    let fx = Fixture::new().await;
    fx.product(1, true);
    let profile = fx.profile(1, "AAAAAAAA").await;
    let mut order = simple_order(100, 1, 10_000);
    order.affiliate_profile_id = Some(profile.id);
    fx.order(order);

    let row = Accrual::new(&fx.db, &fx.ports).handle_order_paid(100).await;
    assert!(row.unwrap().is_none());
  }

  #[tokio::test]
  async fn test_products_are_resolved_in_one_batch() {
    let fx = Fixture::new().await;
    fx.product(1, true);
    fx.product(2, false);
    let profile = fx.profile(1, "AAAAAAAA").await;
    let mut order = simple_order(100, 2, 10_000);
    order.affiliate_profile_id = Some(profile.id);
    order.items.push(OrderItem { product_id: 2, total: 5000, coupon_discount: 0 });
    let mut child = simple_order(101, 2, 2000);
    child.items[0].coupon_discount = 500;
    order.children.push(child);
    fx.order(order);

    let row = Accrual::new(&fx.db, &fx.ports)
      .handle_order_paid(100)
      .await
      .unwrap()
      .unwrap();

    assert_eq!(fx.store.eligibility_calls.load(Ordering::SeqCst), 1);
    // (10000 + 1500) × 10%
    assert_eq!(row.base_amount, 11_500);
    assert_eq!(row.commission_amount, 1150);
  }

  #[tokio::test]
  async fn test_zero_commission_is_not_persisted() {
    let fx = Fixture::new().await;
    fx.product(1, false);
    let profile = fx.profile(1, "AAAAAAAA").await;
    let mut order = simple_order(100, 2, 10_000);
    order.affiliate_profile_id = Some(profile.id);
    fx.order(order);

    let row = Accrual::new(&fx.db, &fx.ports).handle_order_paid(100).await;
    assert!(row.unwrap().is_none());
  }

  #[tokio::test]
  async fn test_disabled_profile_and_missing_order() {
    let fx = Fixture::new().await;
    fx.product(1, true);
    let profile = fx.profile(1, "AAAAAAAA").await;
    Profile::new(&fx.db, &fx.ports)
      .set_status(profile.id, ProfileStatus::Disabled)
      .await
      .unwrap();
    let mut order = simple_order(100, 2, 10_000);
    order.affiliate_profile_id = Some(profile.id);
    fx.order(order);
    let sv = Accrual::new(&fx.db, &fx.ports);

    assert!(sv.handle_order_paid(100).await.unwrap().is_none());
    assert!(matches!(
      sv.handle_order_paid(404).await,
      Err(Error::OrderNotFound(404))
    ));
  }
}
