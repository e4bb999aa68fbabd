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
          .table(AffiliateWithdrawRequests::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(AffiliateWithdrawRequests::Id)
              .big_integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(
            ColumnDef::new(AffiliateWithdrawRequests::ProfileId)
              .big_integer()
              .not_null(),
          )
          .col(
            ColumnDef::new(AffiliateWithdrawRequests::Amount)
              .big_integer()
              .not_null(),
          )
          .col(
            ColumnDef::new(AffiliateWithdrawRequests::Channel)
              .string()
              .not_null(),
          )
          .col(
            ColumnDef::new(AffiliateWithdrawRequests::Account)
              .string()
              .not_null(),
          )
          .col(
            ColumnDef::new(AffiliateWithdrawRequests::Status)
              .string()
              .not_null()
              .default("pending_review"),
          )
          .col(
            ColumnDef::new(AffiliateWithdrawRequests::ProcessedBy)
              .big_integer()
              .null(),
          )
          .col(
            ColumnDef::new(AffiliateWithdrawRequests::ProcessedAt)
              .date_time()
              .null(),
          )
          .col(
            ColumnDef::new(AffiliateWithdrawRequests::RejectReason)
              .string()
              .null(),
          )
          .col(
            ColumnDef::new(AffiliateWithdrawRequests::CreatedAt)
              .date_time()
              .not_null(),
          )
          .col(
            ColumnDef::new(AffiliateWithdrawRequests::UpdatedAt)
              .date_time()
              .not_null(),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_affiliate_withdraw_requests_profile")
              .from(
                AffiliateWithdrawRequests::Table,
                AffiliateWithdrawRequests::ProfileId,
              )
              .to(AffiliateProfiles::Table, AffiliateProfiles::Id)
              .on_delete(ForeignKeyAction::Restrict),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_affiliate_withdraw_requests_profile")
          .table(AffiliateWithdrawRequests::Table)
          .col(AffiliateWithdrawRequests::ProfileId)
          .col(AffiliateWithdrawRequests::Status)
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(
        Table::drop().table(AffiliateWithdrawRequests::Table).to_owned(),
      )
      .await
  }
}

#[derive(DeriveIden)]
pub enum AffiliateWithdrawRequests {
  Table,
  Id,
  ProfileId,
  Amount,
  Channel,
  Account,
  Status,
  ProcessedBy,
  ProcessedAt,
  RejectReason,
  CreatedAt,
  UpdatedAt,
}
