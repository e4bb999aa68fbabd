pub mod accrual;
pub mod attribution;
pub mod click;
pub mod confirm;
pub mod dashboard;
pub mod money;
pub mod profile;
pub mod reversal;
pub mod review;
#[cfg(test)]
pub mod test_utils;
pub mod withdraw;

pub use accrual::Accrual;
pub use attribution::Attribution;
pub use click::Click;
pub use confirm::Sweep;
pub use dashboard::Dashboard;
pub use profile::Profile;
pub use reversal::Reversal;
pub use review::Review;
pub use withdraw::Withdraw;

use sea_orm::{DbErr, SqlErr};

pub(crate) const MAX_VISITOR_KEY_LEN: usize = 128;

pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
  matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

pub(crate) fn truncate(value: &str, max_chars: usize) -> String {
  value.chars().take(max_chars).collect()
}

/// Trim, drop empties and cap the length of an optional input.
pub(crate) fn clean(value: Option<&str>, max_chars: usize) -> Option<String> {
  value.map(str::trim).filter(|v| !v.is_empty()).map(|v| truncate(v, max_chars))
}
