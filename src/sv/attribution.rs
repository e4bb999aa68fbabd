use crate::{
  entity::{click, profile},
  ports::Ports,
  prelude::*,
  sv::{MAX_VISITOR_KEY_LEN, Profile, clean},
};

pub const LAST_TOUCH_WINDOW_DAYS: i64 = 30;

/// Referrer chosen for a new order. The order workflow stores both fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
  pub profile_id: Option<i64>,
  pub code: String,
}

impl Snapshot {
  fn of(profile: &profile::Model) -> Self {
    Self { profile_id: Some(profile.id), code: profile.code.clone() }
  }
}

pub struct Attribution<'a> {
  db: &'a DatabaseConnection,
  ports: &'a Ports,
}

impl<'a> Attribution<'a> {
  pub fn new(db: &'a DatabaseConnection, ports: &'a Ports) -> Self {
    Self { db, ports }
  }

  pub async fn resolve(
    &self,
    user_id: i64,
    raw_code: Option<&str>,
    raw_visitor_key: Option<&str>,
  ) -> Result<Snapshot> {
    self.resolve_at(user_id, raw_code, raw_visitor_key, now()).await
  }

  /// Last touch wins: the newest click of the visitor beats the code the
  /// buyer carries. Self-referral never attributes.
  pub async fn resolve_at(
    &self,
    user_id: i64,
    raw_code: Option<&str>,
    raw_visitor_key: Option<&str>,
    now: DateTime,
  ) -> Result<Snapshot> {
    if !self.ports.settings.affiliate().await?.enabled {
      return Ok(Snapshot::default());
    }

    if let Some(key) = clean(raw_visitor_key, MAX_VISITOR_KEY_LEN)
      && let Some(profile) = self.last_touch(&key, now).await?
      && is_creditable(&profile, user_id)
    {
      debug!("Order of user {} attributed to {} by click", user_id, profile.code);
      return Ok(Snapshot::of(&profile));
    }

    if let Some(code) = raw_code
      && let Some(profile) =
        Profile::new(self.db, self.ports).by_code(code).await?
      && is_creditable(&profile, user_id)
    {
      debug!("Order of user {} attributed to {} by code", user_id, profile.code);
      return Ok(Snapshot::of(&profile));
    }

    Ok(Snapshot::default())
  }

  async fn last_touch(
    &self,
    visitor_key: &str,
    now: DateTime,
  ) -> Result<Option<profile::Model>> {
    let since = now - TimeDelta::days(LAST_TOUCH_WINDOW_DAYS);

    let Some(click) = click::Entity::find()
      .filter(click::Column::VisitorKey.eq(visitor_key))
      .filter(click::Column::CreatedAt.gte(since))
      .filter(click::Column::CreatedAt.lte(now))
      .order_by_desc(click::Column::CreatedAt)
      .order_by_desc(click::Column::Id)
      .one(self.db)
      .await?
    else {
      return Ok(None);
    };

    Ok(profile::Entity::find_by_id(click.profile_id).one(self.db).await?)
  }
}

fn is_creditable(profile: &profile::Model, buyer_id: i64) -> bool {
  profile.is_active() && profile.user_id != buyer_id
}
