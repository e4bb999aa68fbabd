use std::sync::Arc;

use async_trait::async_trait;
use tokio::time;

use crate::{plugins::Plugin, prelude::*, state::AppState, sv};

/// Periodic confirmation sweep.
pub struct Sweep;

#[async_trait]
impl Plugin for Sweep {
  async fn start(&self, app: Arc<AppState>) -> anyhow::Result<()> {
    let interval_secs = app.config.sweep_interval_secs;
    if interval_secs == 0 {
      info!("Confirmation sweep disabled via config (0 secs)");
      return Ok(());
    }

    info!("Confirmation sweep started (Interval: {}s)", interval_secs);

    let mut interval = time::interval(Duration::from_secs(interval_secs));
    loop {
      interval.tick().await;

      if let Err(err) = sv::Sweep::new(&app.db).run(now()).await {
        error!("Confirmation sweep failed: {}", err);
      }
    }
  }
}
