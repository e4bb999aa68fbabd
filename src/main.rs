use affiliate::{
  plugins::{App, cron},
  prelude::*,
  state::{AppState, Config},
};
use tracing_subscriber::{
  EnvFilter, layer::SubscriberExt, util::SubscriberInitExt,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  dotenvy::dotenv().ok();

  tracing_subscriber::registry()
    .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
      "affiliate=debug,sea_orm=warn,sqlx=warn".into()
    }))
    .with(tracing_subscriber::fmt::layer())
    .init();

  info!("Starting affiliate worker v{}", env!("CARGO_PKG_VERSION"));

  let app = Arc::new(AppState::new(Config::from_env()).await?);

  App::new().register(cron::Sweep).run(app);

  tokio::signal::ctrl_c().await?;
  info!("Shutting down");

  Ok(())
}
