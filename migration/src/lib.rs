pub use sea_orm_migration::prelude::*;

mod m20261019_000001_create_affiliate_profiles;
mod m20261019_000002_create_affiliate_clicks;
mod m20261019_000003_create_affiliate_withdraw_requests;
mod m20261019_000004_create_affiliate_commissions;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
  fn migrations() -> Vec<Box<dyn MigrationTrait>> {
    vec![
      Box::new(m20261019_000001_create_affiliate_profiles::Migration),
      Box::new(m20261019_000002_create_affiliate_clicks::Migration),
      Box::new(m20261019_000003_create_affiliate_withdraw_requests::Migration),
      Box::new(m20261019_000004_create_affiliate_commissions::Migration),
    ]
  }
}
