use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::{affiliate_profile, affiliate_withdraw_request};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum CommissionStatus {
  #[sea_orm(string_value = "pending_confirm")]
  #[default]
  PendingConfirm,
  #[sea_orm(string_value = "available")]
  Available,
  #[sea_orm(string_value = "rejected")]
  Rejected,
  #[sea_orm(string_value = "withdrawn")]
  Withdrawn,
}

/// Amounts are in cents, `rate_bps` is hundredths of a percent.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "affiliate_commissions")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i64,
  pub profile_id: i64,
  pub order_id: i64,
  pub commission_type: String,
  pub base_amount: i64,
  pub rate_bps: i64,
  pub commission_amount: i64,
  pub status: CommissionStatus,
  pub confirm_at: Option<DateTime>,
  pub available_at: Option<DateTime>,
  pub withdraw_request_id: Option<i64>,
  pub invalid_reason: Option<String>,
  pub created_at: DateTime,
  pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(
    belongs_to = "affiliate_profile::Entity",
    from = "Column::ProfileId",
    to = "affiliate_profile::Column::Id"
  )]
  Profile,
  #[sea_orm(
    belongs_to = "affiliate_withdraw_request::Entity",
    from = "Column::WithdrawRequestId",
    to = "affiliate_withdraw_request::Column::Id"
  )]
  WithdrawRequest,
}

impl Related<affiliate_profile::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Profile.def()
  }
}

impl Related<affiliate_withdraw_request::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::WithdrawRequest.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
