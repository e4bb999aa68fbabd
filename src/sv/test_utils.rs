//! Shared test utilities for database setup and fake collaborators

#[cfg(test)]
pub mod test_db {
  use crate::prelude::*;

  /// Creates an in-memory SQLite database with the full schema applied
  pub async fn setup() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    db
  }
}

#[cfg(test)]
pub mod fakes {
  use std::sync::{
    RwLock,
    atomic::{AtomicUsize, Ordering},
  };

  use async_trait::async_trait;
  use dashmap::DashMap;

  use crate::{
    entity::{CommissionStatus, ProfileStatus, commission, profile},
    ports::{Order, OrderItem, OrderSource, Ports, ProductCatalog, UserDirectory},
    prelude::*,
    settings::{AffiliateSettings, SettingsStore},
  };

  pub fn enabled_settings() -> AffiliateSettings {
    AffiliateSettings {
      enabled: true,
      commission_rate_bps: 1000,
      confirm_days: 0,
      min_withdraw: 0,
      withdraw_channels: Vec::new(),
    }
  }

  #[derive(Default)]
  pub struct Store {
    pub settings: RwLock<AffiliateSettings>,
    pub users: DashMap<i64, bool>,
    pub orders: DashMap<i64, Order>,
    pub products: DashMap<i64, bool>,
    pub eligibility_calls: AtomicUsize,
  }

  #[async_trait]
  impl SettingsStore for Store {
    async fn affiliate(&self) -> Result<AffiliateSettings> {
      Ok(self.settings.read().unwrap().clone())
    }
  }

  #[async_trait]
  impl UserDirectory for Store {
    async fn is_active(&self, user_id: i64) -> Result<bool> {
      Ok(self.users.get(&user_id).map(|u| *u).unwrap_or(false))
    }
  }

  #[async_trait]
  impl OrderSource for Store {
    async fn order(&self, order_id: i64) -> Result<Option<Order>> {
      Ok(self.orders.get(&order_id).map(|o| o.clone()))
    }
  }

  #[async_trait]
  impl ProductCatalog for Store {
    async fn affiliate_eligibility(
      &self,
      product_ids: &[i64],
    ) -> Result<HashMap<i64, bool>> {
      self.eligibility_calls.fetch_add(1, Ordering::SeqCst);
      Ok(
        product_ids
          .iter()
          .filter_map(|id| self.products.get(id).map(|e| (*id, *e)))
          .collect(),
      )
    }
  }

  pub struct Fixture {
    pub db: DatabaseConnection,
    pub store: Arc<Store>,
    pub ports: Ports,
  }

  impl Fixture {
    pub async fn new() -> Self {
      Self::with_settings(enabled_settings()).await
    }

    pub async fn with_settings(settings: AffiliateSettings) -> Self {
      let db = super::test_db::setup().await;
      let store = Arc::new(Store::default());
      *store.settings.write().unwrap() = settings;

      let ports = Ports {
        settings: store.clone(),
        users: store.clone(),
        orders: store.clone(),
        products: store.clone(),
      };

      Self { db, store, ports }
    }

    pub fn settings(&self, f: impl FnOnce(&mut AffiliateSettings)) {
      f(&mut self.store.settings.write().unwrap());
    }

    pub fn user(&self, user_id: i64) {
      self.store.users.insert(user_id, true);
    }

    pub fn product(&self, product_id: i64, eligible: bool) {
      self.store.products.insert(product_id, eligible);
    }

    pub fn order(&self, order: Order) {
      self.store.orders.insert(order.id, order);
    }

    /// Insert a profile directly, bypassing code generation.
    pub async fn profile(&self, user_id: i64, code: &str) -> profile::Model {
      self.user(user_id);
      let now = now();
      profile::ActiveModel {
        id: NotSet,
        user_id: Set(user_id),
        code: Set(code.to_string()),
        status: Set(ProfileStatus::Active),
        created_at: Set(now),
        updated_at: Set(now),
      }
      .insert(&self.db)
      .await
      .unwrap()
    }

    /// Insert an unattached commission row directly.
    pub async fn commission(
      &self,
      profile_id: i64,
      order_id: i64,
      amount: i64,
      status: CommissionStatus,
    ) -> commission::Model {
      let now = now();
      commission::ActiveModel {
        id: NotSet,
        profile_id: Set(profile_id),
        order_id: Set(order_id),
        commission_type: Set("order".into()),
        base_amount: Set(amount * 10),
        rate_bps: Set(1000),
        commission_amount: Set(amount),
        status: Set(status),
        confirm_at: Set(None),
        available_at: Set(Some(now)),
        withdraw_request_id: Set(None),
        invalid_reason: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
      }
      .insert(&self.db)
      .await
      .unwrap()
    }

    pub async fn reload(&self, id: i64) -> commission::Model {
      commission::Entity::find_by_id(id).one(&self.db).await.unwrap().unwrap()
    }
  }

  /// Single-item order of `total` cents for product 1.
  pub fn simple_order(id: i64, user_id: i64, total: i64) -> Order {
    Order {
      id,
      user_id,
      order_type: "order".into(),
      total,
      affiliate_profile_id: None,
      affiliate_code: None,
      paid_at: Some(now()),
      items: vec![OrderItem { product_id: 1, total, coupon_discount: 0 }],
      children: Vec::new(),
    }
  }
}
