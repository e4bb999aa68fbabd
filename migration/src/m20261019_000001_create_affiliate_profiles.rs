use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(AffiliateProfiles::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(AffiliateProfiles::Id)
              .big_integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(
            ColumnDef::new(AffiliateProfiles::UserId)
              .big_integer()
              .not_null()
              .unique_key(),
          )
          .col(
            ColumnDef::new(AffiliateProfiles::Code)
              .string_len(16)
              .not_null()
              .unique_key(),
          )
          .col(
            ColumnDef::new(AffiliateProfiles::Status)
              .string()
              .not_null()
              .default("active"),
          )
          .col(
            ColumnDef::new(AffiliateProfiles::CreatedAt).date_time().not_null(),
          )
          .col(
            ColumnDef::new(AffiliateProfiles::UpdatedAt).date_time().not_null(),
          )
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(AffiliateProfiles::Table).to_owned())
      .await
  }
}

#[derive(DeriveIden)]
pub enum AffiliateProfiles {
  Table,
  Id,
  UserId,
  Code,
  Status,
  CreatedAt,
  UpdatedAt,
}
