//! Collaborators owned by the surrounding storefront.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{prelude::*, settings::SettingsStore};

/// A storefront order as seen by the affiliate engine. Amounts in cents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Order {
  pub id: i64,
  pub user_id: i64,
  /// Tag of the accrued commission, e.g. `"order"`.
  pub order_type: String,
  pub total: i64,
  pub affiliate_profile_id: Option<i64>,
  pub affiliate_code: Option<String>,
  pub paid_at: Option<DateTime>,
  pub items: Vec<OrderItem>,
  /// Split orders created from this one.
  pub children: Vec<Order>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
  pub product_id: i64,
  pub total: i64,
  pub coupon_discount: i64,
}

impl Order {
  /// This order followed by all of its descendants.
  pub fn flatten(&self) -> Vec<&Order> {
    let mut out = vec![self];
    let mut i = 0;
    while i < out.len() {
      let order = out[i];
      out.extend(order.children.iter());
      i += 1;
    }
    out
  }
}

#[async_trait]
pub trait UserDirectory: Send + Sync {
  /// Unknown users are reported as inactive.
  async fn is_active(&self, user_id: i64) -> Result<bool>;
}

#[async_trait]
pub trait OrderSource: Send + Sync {
  /// Load an order with its items and child orders.
  async fn order(&self, order_id: i64) -> Result<Option<Order>>;
}

#[async_trait]
pub trait ProductCatalog: Send + Sync {
  /// Affiliate eligibility for a batch of products. Missing ids are
  /// treated as not eligible.
  async fn affiliate_eligibility(
    &self,
    product_ids: &[i64],
  ) -> Result<HashMap<i64, bool>>;
}

#[derive(Clone)]
pub struct Ports {
  pub settings: Arc<dyn SettingsStore>,
  pub users: Arc<dyn UserDirectory>,
  pub orders: Arc<dyn OrderSource>,
  pub products: Arc<dyn ProductCatalog>,
}
