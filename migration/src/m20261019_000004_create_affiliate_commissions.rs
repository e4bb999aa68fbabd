use sea_orm_migration::prelude::*;

use super::{
  m20261019_000001_create_affiliate_profiles::AffiliateProfiles,
  m20261019_000003_create_affiliate_withdraw_requests::AffiliateWithdrawRequests,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(AffiliateCommissions::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(AffiliateCommissions::Id)
              .big_integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(
            ColumnDef::new(AffiliateCommissions::ProfileId)
              .big_integer()
              .not_null(),
          )
          .col(
            ColumnDef::new(AffiliateCommissions::OrderId)
              .big_integer()
              .not_null(),
          )
          .col(
            ColumnDef::new(AffiliateCommissions::CommissionType)
              .string_len(32)
              .not_null(),
          )
          .col(
            ColumnDef::new(AffiliateCommissions::BaseAmount)
              .big_integer()
              .not_null()
              .default(0),
          )
          .col(
            ColumnDef::new(AffiliateCommissions::RateBps)
              .big_integer()
              .not_null()
              .default(0),
          )
          .col(
            ColumnDef::new(AffiliateCommissions::CommissionAmount)
              .big_integer()
              .not_null()
              .default(0),
          )
          .col(
            ColumnDef::new(AffiliateCommissions::Status)
              .string()
              .not_null()
              .default("pending_confirm"),
          )
          .col(ColumnDef::new(AffiliateCommissions::ConfirmAt).date_time().null())
          .col(
            ColumnDef::new(AffiliateCommissions::AvailableAt).date_time().null(),
          )
          .col(
            ColumnDef::new(AffiliateCommissions::WithdrawRequestId)
              .big_integer()
              .null(),
          )
          .col(
            ColumnDef::new(AffiliateCommissions::InvalidReason).string().null(),
          )
          .col(
            ColumnDef::new(AffiliateCommissions::CreatedAt)
              .date_time()
              .not_null(),
          )
          .col(
            ColumnDef::new(AffiliateCommissions::UpdatedAt)
              .date_time()
              .not_null(),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_affiliate_commissions_profile")
              .from(AffiliateCommissions::Table, AffiliateCommissions::ProfileId)
              .to(AffiliateProfiles::Table, AffiliateProfiles::Id)
              .on_delete(ForeignKeyAction::Restrict),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_affiliate_commissions_withdraw_request")
              .from(
                AffiliateCommissions::Table,
                AffiliateCommissions::WithdrawRequestId,
              )
              .to(
                AffiliateWithdrawRequests::Table,
                AffiliateWithdrawRequests::Id,
              )
              .on_delete(ForeignKeyAction::SetNull),
          )
          .to_owned(),
      )
      .await?;

    // Accrual idempotency key
    manager
      .create_index(
        Index::create()
          .name("idx_affiliate_commissions_order_profile_type")
          .table(AffiliateCommissions::Table)
          .col(AffiliateCommissions::OrderId)
          .col(AffiliateCommissions::ProfileId)
          .col(AffiliateCommissions::CommissionType)
          .unique()
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_affiliate_commissions_profile_status")
          .table(AffiliateCommissions::Table)
          .col(AffiliateCommissions::ProfileId)
          .col(AffiliateCommissions::Status)
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_affiliate_commissions_withdraw_request")
          .table(AffiliateCommissions::Table)
          .col(AffiliateCommissions::WithdrawRequestId)
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_affiliate_commissions_confirm_at")
          .table(AffiliateCommissions::Table)
          .col(AffiliateCommissions::Status)
          .col(AffiliateCommissions::ConfirmAt)
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(AffiliateCommissions::Table).to_owned())
      .await
  }
}

#[derive(DeriveIden)]
pub enum AffiliateCommissions {
  Table,
  Id,
  ProfileId,
  OrderId,
  CommissionType,
  BaseAmount,
  RateBps,
  CommissionAmount,
  Status,
  ConfirmAt,
  AvailableAt,
  WithdrawRequestId,
  InvalidReason,
  CreatedAt,
  UpdatedAt,
}
