use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::{affiliate_commission, affiliate_profile};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum WithdrawStatus {
  #[sea_orm(string_value = "pending_review")]
  #[default]
  PendingReview,
  #[sea_orm(string_value = "paid")]
  Paid,
  #[sea_orm(string_value = "rejected")]
  Rejected,
}

impl WithdrawStatus {
  pub fn is_terminal(self) -> bool {
    !matches!(self, WithdrawStatus::PendingReview)
  }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "affiliate_withdraw_requests")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i64,
  pub profile_id: i64,
  pub amount: i64,
  pub channel: String,
  pub account: String,
  pub status: WithdrawStatus,
  pub processed_by: Option<i64>,
  pub processed_at: Option<DateTime>,
  pub reject_reason: Option<String>,
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
  #[sea_orm(has_many = "affiliate_commission::Entity")]
  Commissions,
}

impl Related<affiliate_profile::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Profile.def()
  }
}

impl Related<affiliate_commission::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Commissions.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
