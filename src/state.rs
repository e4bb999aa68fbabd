use std::env;

use anyhow::Context;

use crate::{
  ports::Ports,
  prelude::*,
  sv::{
    Accrual, Attribution, Click, Dashboard, Profile, Reversal, Review, Sweep,
    Withdraw,
  },
};

#[derive(Debug, Clone)]
pub struct Config {
  pub database_url: String,
  /// Zero disables the confirmation sweep.
  pub sweep_interval_secs: u64,
}

impl Config {
  pub fn from_env() -> Self {
    Self {
      database_url: env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite:affiliate.db?mode=rwc".into()),
      sweep_interval_secs: env::var("SWEEP_INTERVAL_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(300),
    }
  }
}

pub struct AppState {
  pub db: DatabaseConnection,
  pub config: Config,
}

impl AppState {
  pub async fn new(config: Config) -> anyhow::Result<Self> {
    let db = Database::connect(&config.database_url)
      .await
      .context("Failed to connect to database")?;

    Migrator::up(&db, None).await.context("Failed to run migrations")?;

    Ok(Self { db, config })
  }
}

/// Entry point for the storefront: every affiliate operation, bound to a
/// connection and the storefront's collaborators.
pub struct Services<'a> {
  db: &'a DatabaseConnection,
  ports: &'a Ports,
}

impl<'a> Services<'a> {
  pub fn new(db: &'a DatabaseConnection, ports: &'a Ports) -> Self {
    Self { db, ports }
  }

  pub fn profiles(&self) -> Profile<'a> {
    Profile::new(self.db, self.ports)
  }

  pub fn clicks(&self) -> Click<'a> {
    Click::new(self.db, self.ports)
  }

  pub fn attribution(&self) -> Attribution<'a> {
    Attribution::new(self.db, self.ports)
  }

  pub fn accrual(&self) -> Accrual<'a> {
    Accrual::new(self.db, self.ports)
  }

  pub fn sweep(&self) -> Sweep<'a> {
    Sweep::new(self.db)
  }

  pub fn reversal(&self) -> Reversal<'a> {
    Reversal::new(self.db)
  }

  pub fn withdraw(&self) -> Withdraw<'a> {
    Withdraw::new(self.db, self.ports)
  }

  pub fn review(&self) -> Review<'a> {
    Review::new(self.db)
  }

  pub fn dashboard(&self) -> Dashboard<'a> {
    Dashboard::new(self.db)
  }
}
