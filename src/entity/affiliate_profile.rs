use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::{affiliate_click, affiliate_commission, affiliate_withdraw_request};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum ProfileStatus {
  #[sea_orm(string_value = "active")]
  #[default]
  Active,
  #[sea_orm(string_value = "disabled")]
  Disabled,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "affiliate_profiles")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i64,
  #[sea_orm(unique)]
  pub user_id: i64,
  #[sea_orm(unique)]
  pub code: String,
  pub status: ProfileStatus,
  pub created_at: DateTime,
  pub updated_at: DateTime,
}

impl Model {
  pub fn is_active(&self) -> bool {
    self.status == ProfileStatus::Active
  }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(has_many = "affiliate_click::Entity")]
  Clicks,
  #[sea_orm(has_many = "affiliate_commission::Entity")]
  Commissions,
  #[sea_orm(has_many = "affiliate_withdraw_request::Entity")]
  WithdrawRequests,
}

impl Related<affiliate_click::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Clicks.def()
  }
}

impl Related<affiliate_commission::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Commissions.def()
  }
}

impl Related<affiliate_withdraw_request::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::WithdrawRequests.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
