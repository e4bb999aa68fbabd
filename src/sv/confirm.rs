use sea_orm::sea_query::Expr;

use crate::{
  entity::{CommissionStatus, commission},
  prelude::*,
};

/// Promotes pending commissions once their confirm window has passed.
pub struct Sweep<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Sweep<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  /// Single predicate-guarded update: rows already promoted no longer
  /// match, so concurrent or repeated runs are no-ops.
  pub async fn run(&self, now: DateTime) -> Result<u64> {
    let result = commission::Entity::update_many()
      .col_expr(
        commission::Column::Status,
        Expr::value(CommissionStatus::Available),
      )
      .col_expr(commission::Column::AvailableAt, Expr::value(Some(now)))
      .col_expr(commission::Column::UpdatedAt, Expr::value(now))
      .filter(commission::Column::Status.eq(CommissionStatus::PendingConfirm))
      .filter(commission::Column::ConfirmAt.lte(now))
      .exec(self.db)
      .await?;

    if result.rows_affected > 0 {
      info!("Confirmed {} due commissions", result.rows_affected);
    }

    Ok(result.rows_affected)
  }
}
