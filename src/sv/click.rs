use crate::{
  entity::click,
  ports::Ports,
  prelude::*,
  sv::{MAX_VISITOR_KEY_LEN, Profile, clean, truncate},
};

pub const DEDUPE_WINDOW_MINUTES: i64 = 10;
const MAX_IP_LEN: usize = 64;
const MAX_PATH_LEN: usize = 512;
const MAX_HEADER_LEN: usize = 512;

#[derive(Debug, Clone, Default)]
pub struct NewClick {
  pub code: String,
  pub visitor_key: Option<String>,
  pub landing_path: String,
  pub referrer: Option<String>,
  pub ip: Option<String>,
  pub user_agent: Option<String>,
}

pub struct Click<'a> {
  db: &'a DatabaseConnection,
  ports: &'a Ports,
}

impl<'a> Click<'a> {
  pub fn new(db: &'a DatabaseConnection, ports: &'a Ports) -> Self {
    Self { db, ports }
  }

  pub async fn track(&self, click: NewClick) -> Result<bool> {
    self.track_at(click, now()).await
  }

  /// Record a referral visit. Returns `false` when nothing was written:
  /// unknown or disabled code, disabled program, or a repeat visit of the
  /// same page within the dedupe window.
  pub async fn track_at(&self, click: NewClick, now: DateTime) -> Result<bool> {
    if !self.ports.settings.affiliate().await?.enabled {
      return Ok(false);
    }

    let Some(profile) =
      Profile::new(self.db, self.ports).by_code(&click.code).await?
    else {
      return Ok(false);
    };

    if !profile.is_active() {
      return Ok(false);
    }

    let visitor_key =
      clean(click.visitor_key.as_deref(), MAX_VISITOR_KEY_LEN);
    let landing_path = truncate(click.landing_path.trim(), MAX_PATH_LEN);

    if let Some(key) = &visitor_key {
      let since = now - TimeDelta::minutes(DEDUPE_WINDOW_MINUTES);
      let recent = click::Entity::find()
        .filter(click::Column::ProfileId.eq(profile.id))
        .filter(click::Column::VisitorKey.eq(key.as_str()))
        .filter(click::Column::LandingPath.eq(landing_path.as_str()))
        .filter(click::Column::CreatedAt.gte(since))
        .count(self.db)
        .await?;

      if recent > 0 {
        trace!("Duplicate click for {} from {}", profile.code, key);
        return Ok(false);
      }
    }

    click::ActiveModel {
      id: NotSet,
      profile_id: Set(profile.id),
      visitor_key: Set(visitor_key),
      landing_path: Set(landing_path),
      referrer: Set(clean(click.referrer.as_deref(), MAX_HEADER_LEN)),
      ip: Set(clean(click.ip.as_deref(), MAX_IP_LEN)),
      user_agent: Set(clean(click.user_agent.as_deref(), MAX_HEADER_LEN)),
      created_at: Set(now),
    }
    .insert(self.db)
    .await?;

    Ok(true)
  }

  pub async fn count(&self, profile_id: i64) -> Result<u64> {
    Ok(
      click::Entity::find()
        .filter(click::Column::ProfileId.eq(profile_id))
        .count(self.db)
        .await?,
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{entity::ProfileStatus, sv::test_utils::fakes::Fixture};

  fn visit(code: &str, visitor: Option<&str>, path: &str) -> NewClick {
    NewClick {
      code: code.into(),
      visitor_key: visitor.map(Into::into),
      landing_path: path.into(),
      referrer: Some("https://example.com".into()),
      ip: Some("127.0.0.1".into()),
      user_agent: Some("test".into()),
    }
  }

  #[tokio::test]
  async fn test_duplicate_within_window_is_suppressed() {
    let fx = Fixture::new().await;
    let profile = fx.profile(1, "AAAAAAAA").await;
    let sv = Click::new(&fx.db, &fx.ports);

    assert!(sv.track(visit("AAAAAAAA", Some("v1"), "/p/1")).await.unwrap());
    assert!(!sv.track(visit("aaaaaaaa", Some("v1"), "/p/1")).await.unwrap());
    assert_eq!(sv.count(profile.id).await.unwrap(), 1);

    // other page or other visitor is a new click
    assert!(sv.track(visit("AAAAAAAA", Some("v1"), "/p/2")).await.unwrap());
    assert!(sv.track(visit("AAAAAAAA", Some("v2"), "/p/1")).await.unwrap());
    assert_eq!(sv.count(profile.id).await.unwrap(), 3);
  }

  #[tokio::test]
  async fn test_click_after_window_is_recorded() {
    let fx = Fixture::new().await;
    let profile = fx.profile(1, "AAAAAAAA").await;
    let sv = Click::new(&fx.db, &fx.ports);

    let start = now();
    assert!(
      sv.track_at(visit("AAAAAAAA", Some("v1"), "/"), start).await.unwrap()
    );
    let later = start + TimeDelta::minutes(DEDUPE_WINDOW_MINUTES + 1);
    assert!(
      sv.track_at(visit("AAAAAAAA", Some("v1"), "/"), later).await.unwrap()
    );
    assert_eq!(sv.count(profile.id).await.unwrap(), 2);
  }

  #[tokio::test]
  async fn test_anonymous_clicks_are_not_deduplicated() {
    let fx = Fixture::new().await;
    let profile = fx.profile(1, "AAAAAAAA").await;
    let sv = Click::new(&fx.db, &fx.ports);

    assert!(sv.track(visit("AAAAAAAA", None, "/")).await.unwrap());
    assert!(sv.track(visit("AAAAAAAA", Some("  "), "/")).await.unwrap());
    assert_eq!(sv.count(profile.id).await.unwrap(), 2);
  }

  #[tokio::test]
  async fn test_non_referral_visits_are_ignored() {
    let fx = Fixture::new().await;
    let profile = fx.profile(1, "AAAAAAAA").await;
    let sv = Click::new(&fx.db, &fx.ports);

    assert!(!sv.track(visit("UNKNOWN1", Some("v1"), "/")).await.unwrap());
    assert!(!sv.track(visit("", Some("v1"), "/")).await.unwrap());

    Profile::new(&fx.db, &fx.ports)
      .set_status(profile.id, ProfileStatus::Disabled)
      .await
      .unwrap();
    assert!(!sv.track(visit("AAAAAAAA", Some("v1"), "/")).await.unwrap());

    fx.settings(|s| s.enabled = false);
    let other = fx.profile(2, "BBBBBBBB").await;
    assert!(!sv.track(visit("BBBBBBBB", Some("v1"), "/")).await.unwrap());

    assert_eq!(sv.count(profile.id).await.unwrap(), 0);
    assert_eq!(sv.count(other.id).await.unwrap(), 0);
  }
}
