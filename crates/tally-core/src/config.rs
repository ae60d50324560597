//! # Fee & Commission Configuration
//!
//! Typed configuration snapshots and the one place raw settings strings are
//! normalized.
//!
//! ## Normalize Once, Then Trust
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  settings table (string key → string value)                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  from_settings()  ← THE ONLY NORMALIZATION POINT                        │
//! │       │                                                                 │
//! │       ├── absent key        → 0 / unset (silent, that's normal)        │
//! │       ├── unparseable value → 0 / unset + warning                      │
//! │       ├── negative rate     → 0 / unset + warning                      │
//! │       └── valid zero        → ZERO, kept as configured                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  FeeConfig / CommissionConfig (plain numbers, no Options for rates)    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  calculators never re-check "falsy but valid zero" again               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Why This Shape
//! Earlier generations of this system substituted hardcoded fallbacks for
//! missing values (a flat 15, a per-unit 5, a default 5% commission), which
//! turned a deliberately configured 0 into a surprise charge. An unset rate
//! is 0. A configured 0 is 0. Nothing else.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use thiserror::Error;
use ts_rs::TS;

use crate::money::Money;
use crate::types::{Percent, ShippingPolicy};

// =============================================================================
// Settings Keys
// =============================================================================

/// Keys under which the settings table stores fee and commission values.
///
/// Both the loader here and the settings screens in the desk layer speak
/// these exact strings.
pub mod keys {
    /// Shipping policy selector: "per_product" | "per_order" | "per_quantity".
    pub const SHIPPING_POLICY: &str = "shipping_policy";

    /// Default flat rate in dollars, e.g. "15" or "15.50".
    pub const SHIPPING_FLAT_RATE: &str = "shipping_flat_rate";

    /// Per-unit rate in dollars, e.g. "5".
    pub const SHIPPING_PER_UNIT_RATE: &str = "shipping_per_unit_rate";

    /// System default commission percentage, e.g. "5" or "2.5".
    pub const COMMISSION_DEFAULT_PERCENT: &str = "commission_default_percent";

    /// System custom commission percentage; absent means "not in use".
    pub const COMMISSION_CUSTOM_PERCENT: &str = "commission_custom_percent";

    /// Every key the calculation pipeline reads, for a single batched fetch.
    pub const ALL: [&str; 5] = [
        SHIPPING_POLICY,
        SHIPPING_FLAT_RATE,
        SHIPPING_PER_UNIT_RATE,
        COMMISSION_DEFAULT_PERCENT,
        COMMISSION_CUSTOM_PERCENT,
    ];
}

// =============================================================================
// Config Warnings
// =============================================================================

/// A non-fatal problem found while normalizing stored settings.
///
/// Warnings never abort a calculation; the offending value is normalized to
/// its absent-equivalent and the sale proceeds. The desk layer shows these
/// so an admin can fix the settings screen.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigWarning {
    /// A stored rate was negative and was treated as unset.
    #[error("setting '{key}' is negative ({value}); treated as unset")]
    NegativeRate { key: String, value: String },

    /// A stored value did not parse as a number and was treated as unset.
    #[error("setting '{key}' is not numeric ({value}); treated as unset")]
    NotNumeric { key: String, value: String },

    /// A stored percentage exceeded 100% and was clamped.
    #[error("setting '{key}' exceeds 100% ({value}); clamped to 100%")]
    RateTooHigh { key: String, value: String },

    /// The stored policy string is not one of the known policies; shipping
    /// is disabled until an admin picks a real one.
    #[error("setting '{key}' holds unknown policy '{value}'; shipping disabled")]
    UnknownPolicy { key: String, value: String },
}

// =============================================================================
// Fee Config
// =============================================================================

/// Snapshot of the shipping fee settings, read once per calculation.
///
/// Rates are plain cents, not Options: normalization already collapsed
/// "absent" to 0. The policy stays optional because "nothing configured yet"
/// must surface as the `unconfigured` tag, never as a guessed policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FeeConfig {
    /// Which policy the settings screen selected, if any.
    pub policy: Option<ShippingPolicy>,

    /// Default flat rate in cents (per unit under `per_product`, per order
    /// under `per_order`).
    pub default_flat_rate_cents: i64,

    /// Per-unit rate in cents under `per_quantity`.
    pub per_unit_rate_cents: i64,
}

impl FeeConfig {
    /// Returns the default flat rate as Money.
    #[inline]
    pub fn default_flat_rate(&self) -> Money {
        Money::from_cents(self.default_flat_rate_cents)
    }

    /// Returns the per-unit rate as Money.
    #[inline]
    pub fn per_unit_rate(&self) -> Money {
        Money::from_cents(self.per_unit_rate_cents)
    }

    /// Normalizes raw settings rows into a typed snapshot.
    ///
    /// ## Rules
    /// - Absent key: unset (rate 0, policy None), no warning
    /// - Unparseable value: unset, with a [`ConfigWarning::NotNumeric`]
    /// - Negative rate: unset, with a [`ConfigWarning::NegativeRate`]
    /// - A stored "0": a real zero rate, kept exactly as configured
    pub fn from_settings(settings: &HashMap<String, String>) -> (Self, Vec<ConfigWarning>) {
        let mut warnings = Vec::new();

        let policy = match settings.get(keys::SHIPPING_POLICY) {
            None => None,
            Some(raw) => match ShippingPolicy::from_str(raw) {
                Ok(policy) => Some(policy),
                Err(_) => {
                    warnings.push(ConfigWarning::UnknownPolicy {
                        key: keys::SHIPPING_POLICY.to_string(),
                        value: raw.clone(),
                    });
                    None
                }
            },
        };

        let default_flat_rate_cents =
            normalize_rate(settings, keys::SHIPPING_FLAT_RATE, &mut warnings);
        let per_unit_rate_cents =
            normalize_rate(settings, keys::SHIPPING_PER_UNIT_RATE, &mut warnings);

        (
            FeeConfig {
                policy,
                default_flat_rate_cents,
                per_unit_rate_cents,
            },
            warnings,
        )
    }
}

// =============================================================================
// Commission Config
// =============================================================================

/// Snapshot of the commission settings, read once per calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CommissionConfig {
    /// System default rate in basis points. Absent normalizes to 0, never
    /// to a hardcoded house rate.
    pub default_bps: u32,

    /// System "custom" rate in basis points. `Some(0)` is a configured
    /// zero-commission rate and WINS over the default; `None` falls
    /// through the chain.
    pub custom_bps: Option<u32>,
}

impl CommissionConfig {
    /// Returns the system default rate.
    #[inline]
    pub fn default_percent(&self) -> Percent {
        Percent::from_bps(self.default_bps)
    }

    /// Returns the system custom rate, if configured.
    #[inline]
    pub fn custom_percent(&self) -> Option<Percent> {
        self.custom_bps.map(Percent::from_bps)
    }

    /// Normalizes raw settings rows into a typed snapshot.
    ///
    /// Same rules as [`FeeConfig::from_settings`], plus percentages above
    /// 100% clamp to 100% with a warning.
    pub fn from_settings(settings: &HashMap<String, String>) -> (Self, Vec<ConfigWarning>) {
        let mut warnings = Vec::new();

        let default_bps =
            normalize_percent(settings, keys::COMMISSION_DEFAULT_PERCENT, &mut warnings)
                .unwrap_or(0);
        let custom_bps =
            normalize_percent(settings, keys::COMMISSION_CUSTOM_PERCENT, &mut warnings);

        (
            CommissionConfig {
                default_bps,
                custom_bps,
            },
            warnings,
        )
    }
}

// =============================================================================
// Normalization Helpers
// =============================================================================

/// Reads a monetary rate key, collapsing absent/invalid/negative to 0 cents.
fn normalize_rate(
    settings: &HashMap<String, String>,
    key: &str,
    warnings: &mut Vec<ConfigWarning>,
) -> i64 {
    let Some(raw) = settings.get(key) else {
        return 0;
    };

    match Money::from_str(raw) {
        Ok(rate) if rate.is_negative() => {
            warnings.push(ConfigWarning::NegativeRate {
                key: key.to_string(),
                value: raw.clone(),
            });
            0
        }
        Ok(rate) => rate.cents(),
        Err(_) => {
            warnings.push(ConfigWarning::NotNumeric {
                key: key.to_string(),
                value: raw.clone(),
            });
            0
        }
    }
}

/// Reads a percentage key, collapsing absent/invalid/negative to None and
/// clamping values above 100%.
fn normalize_percent(
    settings: &HashMap<String, String>,
    key: &str,
    warnings: &mut Vec<ConfigWarning>,
) -> Option<u32> {
    let raw = settings.get(key)?;

    match Percent::from_str(raw) {
        Ok(rate) if rate.bps() > Percent::MAX_BPS => {
            warnings.push(ConfigWarning::RateTooHigh {
                key: key.to_string(),
                value: raw.clone(),
            });
            Some(Percent::MAX_BPS)
        }
        Ok(rate) => Some(rate.bps()),
        Err(err) => {
            // Negative percentages get the rate warning, other junk the
            // numeric one; both normalize to unset
            let warning = match err {
                crate::types::ParsePercentError::Negative(_) => ConfigWarning::NegativeRate {
                    key: key.to_string(),
                    value: raw.clone(),
                },
                _ => ConfigWarning::NotNumeric {
                    key: key.to_string(),
                    value: raw.clone(),
                },
            };
            warnings.push(warning);
            None
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_fee_config_defaults_to_unset() {
        let (config, warnings) = FeeConfig::from_settings(&HashMap::new());
        assert_eq!(config.policy, None);
        assert_eq!(config.default_flat_rate_cents, 0);
        assert_eq!(config.per_unit_rate_cents, 0);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_fee_config_full_load() {
        let (config, warnings) = FeeConfig::from_settings(&settings(&[
            (keys::SHIPPING_POLICY, "per_quantity"),
            (keys::SHIPPING_FLAT_RATE, "15"),
            (keys::SHIPPING_PER_UNIT_RATE, "5"),
        ]));
        assert_eq!(config.policy, Some(ShippingPolicy::PerQuantity));
        assert_eq!(config.default_flat_rate_cents, 1500);
        assert_eq!(config.per_unit_rate_cents, 500);
        assert!(warnings.is_empty());
    }

    /// A stored "0" is a configuration, not an absence. No fallback constant
    /// may resurrect a nonzero rate.
    #[test]
    fn test_fee_config_zero_is_kept() {
        let (config, warnings) = FeeConfig::from_settings(&settings(&[
            (keys::SHIPPING_POLICY, "per_order"),
            (keys::SHIPPING_FLAT_RATE, "0"),
        ]));
        assert_eq!(config.default_flat_rate_cents, 0);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_fee_config_negative_rate_warns_and_zeroes() {
        let (config, warnings) =
            FeeConfig::from_settings(&settings(&[(keys::SHIPPING_FLAT_RATE, "-3")]));
        assert_eq!(config.default_flat_rate_cents, 0);
        assert_eq!(warnings.len(), 1);
        assert!(matches!(warnings[0], ConfigWarning::NegativeRate { .. }));
    }

    #[test]
    fn test_fee_config_garbage_rate_warns_and_zeroes() {
        let (config, warnings) =
            FeeConfig::from_settings(&settings(&[(keys::SHIPPING_PER_UNIT_RATE, "cheap")]));
        assert_eq!(config.per_unit_rate_cents, 0);
        assert_eq!(warnings.len(), 1);
        assert!(matches!(warnings[0], ConfigWarning::NotNumeric { .. }));
    }

    #[test]
    fn test_fee_config_unknown_policy_warns_and_unsets() {
        let (config, warnings) =
            FeeConfig::from_settings(&settings(&[(keys::SHIPPING_POLICY, "flat_rate")]));
        assert_eq!(config.policy, None);
        assert_eq!(warnings.len(), 1);
        assert!(matches!(warnings[0], ConfigWarning::UnknownPolicy { .. }));
    }

    #[test]
    fn test_commission_config_defaults_to_zero() {
        let (config, warnings) = CommissionConfig::from_settings(&HashMap::new());
        assert_eq!(config.default_bps, 0);
        assert_eq!(config.custom_bps, None);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_commission_config_full_load() {
        let (config, warnings) = CommissionConfig::from_settings(&settings(&[
            (keys::COMMISSION_DEFAULT_PERCENT, "5"),
            (keys::COMMISSION_CUSTOM_PERCENT, "2.5"),
        ]));
        assert_eq!(config.default_bps, 500);
        assert_eq!(config.custom_bps, Some(250));
        assert!(warnings.is_empty());
    }

    /// A configured custom rate of 0% is a deliberate zero-commission
    /// arrangement and stays Some(0), never collapsing to "unset".
    #[test]
    fn test_commission_config_custom_zero_is_configured() {
        let (config, warnings) =
            CommissionConfig::from_settings(&settings(&[(keys::COMMISSION_CUSTOM_PERCENT, "0")]));
        assert_eq!(config.custom_bps, Some(0));
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_commission_config_negative_custom_unsets() {
        let (config, warnings) =
            CommissionConfig::from_settings(&settings(&[(keys::COMMISSION_CUSTOM_PERCENT, "-2")]));
        assert_eq!(config.custom_bps, None);
        assert_eq!(warnings.len(), 1);
        assert!(matches!(warnings[0], ConfigWarning::NegativeRate { .. }));
    }

    #[test]
    fn test_commission_config_over_100_clamps() {
        let (config, warnings) =
            CommissionConfig::from_settings(&settings(&[(keys::COMMISSION_DEFAULT_PERCENT, "150")]));
        assert_eq!(config.default_bps, Percent::MAX_BPS);
        assert_eq!(warnings.len(), 1);
        assert!(matches!(warnings[0], ConfigWarning::RateTooHigh { .. }));
    }

    #[test]
    fn test_commission_config_garbage_default_warns() {
        let (config, warnings) =
            CommissionConfig::from_settings(&settings(&[(keys::COMMISSION_DEFAULT_PERCENT, "five")]));
        assert_eq!(config.default_bps, 0);
        assert_eq!(warnings.len(), 1);
        assert!(matches!(warnings[0], ConfigWarning::NotNumeric { .. }));
    }
}
