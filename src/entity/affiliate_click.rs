use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::affiliate_profile;

/// Append-only record of a visit through a referral link.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "affiliate_clicks")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i64,
  pub profile_id: i64,
  pub visitor_key: Option<String>,
  pub landing_path: String,
  pub referrer: Option<String>,
  pub ip: Option<String>,
  pub user_agent: Option<String>,
  pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(
    belongs_to = "affiliate_profile::Entity",
    from = "Column::ProfileId",
    to = "affiliate_profile::Column::Id"
  )]
  Profile,
}

impl Related<affiliate_profile::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Profile.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
