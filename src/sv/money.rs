//! Cent arithmetic.
//!
//! Amounts are integer cents. Anything that divides goes through
//! [`Decimal`] and is rounded half-up, never through binary floats.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};

use crate::prelude::*;

pub const CENTS: i64 = 100;
const BPS_SCALE: i64 = 100 * 100;

/// Round to a whole number, halves away from zero.
pub fn round_half_up(value: Decimal) -> i64 {
  value
    .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
    .to_i64()
    .unwrap_or(if value.is_sign_negative() { i64::MIN } else { i64::MAX })
}

/// `amount × rate_bps / 10000`, rounded to cents.
pub fn percent_of(amount: i64, rate_bps: i64) -> i64 {
  scale(amount, rate_bps, BPS_SCALE)
}

/// `amount × part / whole`, rounded to cents. Zero when `whole` is not
/// positive.
pub fn prorate(amount: i64, part: i64, whole: i64) -> i64 {
  if whole <= 0 {
    return 0;
  }
  scale(amount, part, whole)
}

/// `amount × part / whole` for a positive `whole`. Divides first when the
/// product leaves the decimal range and saturates when even that does.
fn scale(amount: i64, part: i64, whole: i64) -> i64 {
  let (amount_d, part_d, whole_d) =
    (Decimal::from(amount), Decimal::from(part), Decimal::from(whole));

  let value = amount_d
    .checked_mul(part_d)
    .and_then(|v| v.checked_div(whole_d))
    .or_else(|| amount_d.checked_div(whole_d)?.checked_mul(part_d));

  match value {
    Some(value) => round_half_up(value),
    None if (amount < 0) != (part < 0) => i64::MIN,
    None => i64::MAX,
  }
}

/// Parse a non-negative currency string with at most two decimals.
pub fn parse(input: &str) -> Result<i64> {
  let value = Decimal::from_str(input.trim()).map_err(|_| Error::InvalidAmount)?;
  if value.is_sign_negative() || value.normalize().scale() > 2 {
    return Err(Error::InvalidAmount);
  }
  (value * Decimal::from(CENTS)).to_i64().ok_or(Error::InvalidAmount)
}

pub fn format(cents: i64) -> String {
  Decimal::new(cents, 2).to_string()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_percent_of_rounds_half_up() {
    assert_eq!(percent_of(10_000, 1000), 1000);
    // 0.05 × 10% = 0.005 -> 0.01
    assert_eq!(percent_of(5, 1000), 1);
    // 0.04 × 10% = 0.004 -> 0.00
    assert_eq!(percent_of(4, 1000), 0);
    assert_eq!(percent_of(333, 1250), 42);
  }

  #[test]
  fn test_prorate() {
    assert_eq!(prorate(1000, 5000, 10_000), 500);
    assert_eq!(prorate(1000, 1, 3), 333);
    assert_eq!(prorate(1000, 2, 3), 667);
    assert_eq!(prorate(1000, 10, 0), 0);
  }

  #[test]
  fn test_huge_amounts_do_not_overflow() {
    assert_eq!(prorate(i64::MAX, i64::MAX - 1, i64::MAX), i64::MAX - 1);
    assert_eq!(prorate(i64::MAX, i64::MAX, i64::MAX), i64::MAX);
    assert_eq!(prorate(i64::MAX, 1, i64::MAX), 1);
    assert_eq!(percent_of(i64::MAX, 10_000), i64::MAX);
    assert_eq!(percent_of(i64::MAX, i64::MAX), i64::MAX);
    assert_eq!(percent_of(i64::MIN, i64::MAX), i64::MIN);
  }

  #[test]
  fn test_parse_and_format() {
    assert_eq!(parse("15").unwrap(), 1500);
    assert_eq!(parse(" 15.5 ").unwrap(), 1550);
    assert_eq!(parse("0.01").unwrap(), 1);
    assert_eq!(parse("1.230").unwrap(), 123);
    assert!(matches!(parse("1.234"), Err(Error::InvalidAmount)));
    assert!(matches!(parse("-1"), Err(Error::InvalidAmount)));
    assert!(matches!(parse("abc"), Err(Error::InvalidAmount)));

    assert_eq!(format(1550), "15.50");
    assert_eq!(format(5), "0.05");
  }
}
