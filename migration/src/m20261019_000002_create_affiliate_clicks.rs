use sea_orm_migration::prelude::*;

use super::m20261019_000001_create_affiliate_profiles::AffiliateProfiles;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(AffiliateClicks::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(AffiliateClicks::Id)
              .big_integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(
            ColumnDef::new(AffiliateClicks::ProfileId).big_integer().not_null(),
          )
          .col(ColumnDef::new(AffiliateClicks::VisitorKey).string().null())
          .col(
            ColumnDef::new(AffiliateClicks::LandingPath)
              .string()
              .not_null()
              .default(""),
          )
          .col(ColumnDef::new(AffiliateClicks::Referrer).string().null())
          .col(ColumnDef::new(AffiliateClicks::Ip).string().null())
          .col(ColumnDef::new(AffiliateClicks::UserAgent).string().null())
          .col(ColumnDef::new(AffiliateClicks::CreatedAt).date_time().not_null())
          .foreign_key(
            ForeignKey::create()
              .name("fk_affiliate_clicks_profile")
              .from(AffiliateClicks::Table, AffiliateClicks::ProfileId)
              .to(AffiliateProfiles::Table, AffiliateProfiles::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .to_owned(),
      )
      .await?;

    // Dedupe probe: (profile, visitor, path) within a window
    manager
      .create_index(
        Index::create()
          .name("idx_affiliate_clicks_dedupe")
          .table(AffiliateClicks::Table)
          .col(AffiliateClicks::ProfileId)
          .col(AffiliateClicks::VisitorKey)
          .col(AffiliateClicks::LandingPath)
          .col(AffiliateClicks::CreatedAt)
          .to_owned(),
      )
      .await?;

    // Last-touch lookup by visitor across all profiles
    manager
      .create_index(
        Index::create()
          .name("idx_affiliate_clicks_visitor")
          .table(AffiliateClicks::Table)
          .col(AffiliateClicks::VisitorKey)
          .col(AffiliateClicks::CreatedAt)
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(AffiliateClicks::Table).to_owned())
      .await
  }
}

#[derive(DeriveIden)]
pub enum AffiliateClicks {
  Table,
  Id,
  ProfileId,
  VisitorKey,
  LandingPath,
  Referrer,
  Ip,
  UserAgent,
  CreatedAt,
}
