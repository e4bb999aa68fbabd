use rand::{Rng, rngs::OsRng};

use crate::{
  entity::{ProfileStatus, profile},
  ports::Ports,
  prelude::*,
  sv::is_unique_violation,
};

pub const CODE_LEN: usize = 8;
/// No 0/O, 1/I/L.
pub const CODE_ALPHABET: &[u8] = b"23456789ABCDEFGHJKMNPQRSTUVWXYZ";
pub const CODE_ATTEMPTS: usize = 8;

pub fn generate_code() -> String {
  let mut rng = OsRng;
  (0..CODE_LEN)
    .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
    .collect()
}

pub fn normalize_code(raw: &str) -> Option<String> {
  let code = raw.trim().to_ascii_uppercase();
  (!code.is_empty()).then_some(code)
}

pub struct Profile<'a> {
  db: &'a DatabaseConnection,
  ports: &'a Ports,
}

impl<'a> Profile<'a> {
  pub fn new(db: &'a DatabaseConnection, ports: &'a Ports) -> Self {
    Self { db, ports }
  }

  /// Open the affiliate profile of a user. Calling it again returns the
  /// existing profile.
  pub async fn open(&self, user_id: i64) -> Result<profile::Model> {
    if !self.ports.settings.affiliate().await?.enabled {
      return Err(Error::ProgramDisabled);
    }

    if !self.ports.users.is_active(user_id).await? {
      return Err(Error::UserDisabled);
    }

    if let Some(profile) = self.by_user(user_id).await? {
      return Ok(profile);
    }

    self.create_with(user_id, generate_code).await
  }

  async fn create_with(
    &self,
    user_id: i64,
    mut next_code: impl FnMut() -> String,
  ) -> Result<profile::Model> {
    for attempt in 1..=CODE_ATTEMPTS {
      let code = next_code();
      let now = now();

      let inserted = profile::ActiveModel {
        id: NotSet,
        user_id: Set(user_id),
        code: Set(code.clone()),
        status: Set(ProfileStatus::Active),
        created_at: Set(now),
        updated_at: Set(now),
      }
      .insert(self.db)
      .await;

      match inserted {
        Ok(profile) => {
          info!("Opened affiliate profile {} for user {}", code, user_id);
          return Ok(profile);
        }
        Err(err) if is_unique_violation(&err) => {
          // Either a concurrent open for the same user or a code collision
          if let Some(profile) = self.by_user(user_id).await? {
            return Ok(profile);
          }
          debug!("Referral code collision on attempt {}", attempt);
        }
        Err(err) => return Err(err.into()),
      }
    }

    warn!("Gave up generating a referral code for user {}", user_id);
    Err(Error::CodeGeneration)
  }

  pub async fn by_id(&self, id: i64) -> Result<Option<profile::Model>> {
    Ok(profile::Entity::find_by_id(id).one(self.db).await?)
  }

  pub async fn by_user(&self, user_id: i64) -> Result<Option<profile::Model>> {
    Ok(
      profile::Entity::find()
        .filter(profile::Column::UserId.eq(user_id))
        .one(self.db)
        .await?,
    )
  }

  pub async fn by_code(&self, raw: &str) -> Result<Option<profile::Model>> {
    let Some(code) = normalize_code(raw) else {
      return Ok(None);
    };

    Ok(
      profile::Entity::find()
        .filter(profile::Column::Code.eq(code))
        .one(self.db)
        .await?,
    )
  }

  /// Enable or disable a profile (admin only)
  pub async fn set_status(
    &self,
    id: i64,
    status: ProfileStatus,
  ) -> Result<profile::Model> {
    let profile = profile::Entity::find_by_id(id)
      .one(self.db)
      .await?
      .ok_or(Error::ProfileNotFound)?;

    let updated = profile::ActiveModel {
      status: Set(status),
      updated_at: Set(now()),
      ..profile.into()
    }
    .update(self.db)
    .await?;

    info!("Affiliate profile {} set to {:?}", id, status);
    Ok(updated)
  }

  /// Batch variant of [`Profile::set_status`]; returns rows changed.
  pub async fn set_status_many(
    &self,
    ids: &[i64],
    status: ProfileStatus,
  ) -> Result<u64> {
    if ids.is_empty() {
      return Ok(0);
    }

    let result = profile::Entity::update_many()
      .set(profile::ActiveModel {
        status: Set(status),
        updated_at: Set(now()),
        ..Default::default()
      })
      .filter(profile::Column::Id.is_in(ids.iter().copied()))
      .exec(self.db)
      .await?;

    info!(
      "{} affiliate profiles set to {:?}",
      result.rows_affected, status
    );
    Ok(result.rows_affected)
  }
}
