//! Typed affiliate configuration.
//!
//! The storefront keeps settings as a loosely typed key/value document.
//! Everything is decoded once into [`AffiliateSettings`], with every field
//! defaulted and clamped, so business logic never touches raw values.

use std::str::FromStr;

use async_trait::async_trait;
use json::Value;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{prelude::*, sv::money};

pub const MAX_RATE_BPS: i64 = 100 * 100;
pub const MAX_CONFIRM_DAYS: i64 = 3650;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AffiliateSettings {
  pub enabled: bool,
  /// Commission rate in hundredths of a percent (10% = 1000).
  pub commission_rate_bps: i64,
  /// Zero means commissions are withdrawable right after payment.
  pub confirm_days: i64,
  /// Minimum withdrawal, in cents.
  pub min_withdraw: i64,
  /// Empty list allows any non-empty channel.
  pub withdraw_channels: Vec<String>,
}

impl Default for AffiliateSettings {
  fn default() -> Self {
    Self {
      enabled: false,
      commission_rate_bps: 1000,
      confirm_days: 7,
      min_withdraw: 0,
      withdraw_channels: Vec::new(),
    }
  }
}

impl AffiliateSettings {
  /// Decode a settings document. Unknown keys are ignored, malformed
  /// values fall back to defaults, numbers are clamped into range.
  pub fn from_document(doc: &Value) -> Self {
    let default = Self::default();

    let enabled = doc.get("enabled").and_then(as_bool).unwrap_or(default.enabled);

    let commission_rate_bps = doc
      .get("commission_rate")
      .and_then(as_decimal)
      .map(|rate| money::round_half_up(rate * Decimal::ONE_HUNDRED))
      .unwrap_or(default.commission_rate_bps)
      .clamp(0, MAX_RATE_BPS);

    let confirm_days = doc
      .get("confirm_days")
      .and_then(as_decimal)
      .map(money::round_half_up)
      .unwrap_or(default.confirm_days)
      .clamp(0, MAX_CONFIRM_DAYS);

    let min_withdraw = doc
      .get("min_withdraw_amount")
      .and_then(as_decimal)
      .map(|amount| money::round_half_up(amount * Decimal::ONE_HUNDRED))
      .unwrap_or(default.min_withdraw)
      .max(0);

    let withdraw_channels = doc
      .get("withdraw_channels")
      .map(as_channels)
      .unwrap_or(default.withdraw_channels);

    Self {
      enabled,
      commission_rate_bps,
      confirm_days,
      min_withdraw,
      withdraw_channels,
    }
  }

  /// Read `AFFILIATE_*` environment variables through the same decoder.
  pub fn from_env() -> Self {
    let keys = [
      ("AFFILIATE_ENABLED", "enabled"),
      ("AFFILIATE_COMMISSION_RATE", "commission_rate"),
      ("AFFILIATE_CONFIRM_DAYS", "confirm_days"),
      ("AFFILIATE_MIN_WITHDRAW", "min_withdraw_amount"),
      ("AFFILIATE_WITHDRAW_CHANNELS", "withdraw_channels"),
    ];

    let doc: json::Map<String, Value> = keys
      .into_iter()
      .filter_map(|(var, key)| {
        std::env::var(var).ok().map(|v| (key.to_string(), Value::String(v)))
      })
      .collect();

    Self::from_document(&Value::Object(doc))
  }

  pub fn channel_allowed(&self, channel: &str) -> bool {
    !channel.is_empty()
      && (self.withdraw_channels.is_empty()
        || self.withdraw_channels.iter().any(|c| c == channel))
  }

  /// `None` when commissions skip the pending stage.
  pub fn confirm_window(&self) -> Option<TimeDelta> {
    (self.confirm_days > 0).then(|| TimeDelta::days(self.confirm_days))
  }
}

fn as_bool(value: &Value) -> Option<bool> {
  match value {
    Value::Bool(b) => Some(*b),
    Value::Number(n) => n.as_i64().map(|n| n != 0),
    Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
      "1" | "true" | "yes" | "on" => Some(true),
      "0" | "false" | "no" | "off" | "" => Some(false),
      _ => None,
    },
    _ => None,
  }
}

fn as_decimal(value: &Value) -> Option<Decimal> {
  match value {
    // Go through the textual form to stay clear of binary floats
    Value::Number(n) => Decimal::from_str(&n.to_string())
      .or_else(|_| Decimal::from_scientific(&n.to_string()))
      .ok(),
    Value::String(s) => Decimal::from_str(s.trim()).ok(),
    _ => None,
  }
}

fn as_channels(value: &Value) -> Vec<String> {
  let raw: Vec<&str> = match value {
    Value::Array(items) => items.iter().filter_map(Value::as_str).collect(),
    Value::String(s) => s.split(',').collect(),
    _ => Vec::new(),
  };

  let mut channels: Vec<String> = Vec::new();
  for channel in raw.into_iter().map(str::trim).filter(|c| !c.is_empty()) {
    if !channels.iter().any(|c| c == channel) {
      channels.push(channel.to_string());
    }
  }
  channels
}

#[async_trait]
pub trait SettingsStore: Send + Sync {
  async fn affiliate(&self) -> Result<AffiliateSettings>;
}

/// Settings fixed at startup, e.g. from [`AffiliateSettings::from_env`].
#[derive(Debug, Clone, Default)]
pub struct StaticSettings(pub AffiliateSettings);

#[async_trait]
impl SettingsStore for StaticSettings {
  async fn affiliate(&self) -> Result<AffiliateSettings> {
    Ok(self.0.clone())
  }
}
