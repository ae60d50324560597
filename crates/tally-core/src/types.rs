//! # Domain Types
//!
//! Core domain types used throughout Tally Sales.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │    Customer     │   │      Sale       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  name           │   │  name           │   │  items          │       │
//! │  │  unit_price     │   │  commission     │   │  shipping_cents │       │
//! │  │  ship override  │   │  override (bps) │   │  payable_cents  │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Percent      │   │ ShippingPolicy  │   │CommissionSource │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  bps (u32)      │   │  PerProduct     │   │  Sale           │       │
//! │  │  500 = 5%       │   │  PerOrder       │   │  Customer       │       │
//! │  └─────────────────┘   │  PerQuantity    │   │  SystemCustom   │       │
//! │                        └─────────────────┘   │  SystemDefault  │       │
//! │                                              └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! A `LineItem` freezes the product's name, price, and shipping override at
//! the moment it is added. Editing the catalog later never rewrites history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use ts_rs::TS;

use crate::money::{parse_decimal_hundredths, Money};

// =============================================================================
// Percent
// =============================================================================

/// A percentage represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 500 bps = 5% (the shop's usual reseller commission)
///
/// Storing hundredths of a percent as an integer means "2.5%" is exact,
/// which a float never guarantees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Percent(u32);

impl Percent {
    /// The largest meaningful rate: 100% (10,000 bps).
    pub const MAX_BPS: u32 = 10_000;

    /// Creates a percentage from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Percent(bps)
    }

    /// Creates a percentage from a float (for convenience in tests/seeds).
    pub fn from_percentage(pct: f64) -> Self {
        Percent((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a float percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero percent.
    #[inline]
    pub const fn zero() -> Self {
        Percent(0)
    }

    /// Checks if the rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for Percent {
    fn default() -> Self {
        Percent::zero()
    }
}

/// Renders without trailing zeros: 500 → "5%", 250 → "2.5%", 825 → "8.25%".
impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / 100;
        let frac = self.0 % 100;
        if frac == 0 {
            write!(f, "{}%", whole)
        } else if frac % 10 == 0 {
            write!(f, "{}.{}%", whole, frac / 10)
        } else {
            write!(f, "{}.{:02}%", whole, frac)
        }
    }
}

/// Error produced when a decimal string cannot become a percentage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParsePercentError {
    /// Input was empty or contained non-numeric characters.
    #[error("'{0}' is not a valid percentage")]
    Invalid(String),

    /// Percentages in settings and forms are never negative.
    #[error("percentage '{0}' cannot be negative")]
    Negative(String),

    /// Input had more than two decimal places (sub-bps precision).
    #[error("'{0}' has more than two decimal places")]
    TooPrecise(String),
}

/// Parses a decimal percentage string ("5", "2.5", "8.25") into basis points.
///
/// Range against [`Percent::MAX_BPS`] is NOT enforced here; configuration
/// loading clamps out-of-range values with a warning, while form validation
/// rejects them outright.
impl FromStr for Percent {
    type Err = ParsePercentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match parse_decimal_hundredths(s) {
            // Hundredths of a percent are exactly basis points
            Ok(Some(bps)) if bps >= 0 => {
                let bps = u32::try_from(bps)
                    .map_err(|_| ParsePercentError::Invalid(s.trim().to_string()))?;
                Ok(Percent(bps))
            }
            Ok(Some(_)) => Err(ParsePercentError::Negative(s.trim().to_string())),
            Ok(None) => Err(ParsePercentError::TooPrecise(s.trim().to_string())),
            Err(()) => Err(ParsePercentError::Invalid(s.trim().to_string())),
        }
    }
}

// =============================================================================
// Shipping Policy
// =============================================================================

/// How shipping cost is derived from a sale's line items.
///
/// The three policies the settings screen can pick between. A sale records
/// which one was actually applied as an [`AppliedPolicy`], which also covers
/// the degenerate outcomes (no items, nothing configured, manual amount).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ShippingPolicy {
    /// Each line charges its product's override rate, or the default flat
    /// rate, times quantity.
    PerProduct,
    /// One flat charge for the whole order.
    PerOrder,
    /// Total units across all lines times the per-unit rate.
    PerQuantity,
}

impl ShippingPolicy {
    /// Stable string form used in the settings table and audit strings.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ShippingPolicy::PerProduct => "per_product",
            ShippingPolicy::PerOrder => "per_order",
            ShippingPolicy::PerQuantity => "per_quantity",
        }
    }
}

impl fmt::Display for ShippingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for unrecognized policy strings coming out of the settings table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown shipping policy '{0}'")]
pub struct ParsePolicyError(pub String);

impl FromStr for ShippingPolicy {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "per_product" => Ok(ShippingPolicy::PerProduct),
            "per_order" => Ok(ShippingPolicy::PerOrder),
            "per_quantity" => Ok(ShippingPolicy::PerQuantity),
            other => Err(ParsePolicyError(other.to_string())),
        }
    }
}

// =============================================================================
// Applied Policy
// =============================================================================

/// The policy tag recorded on a quote or a finished sale.
///
/// Wider than [`ShippingPolicy`]: a calculation can conclude without any
/// policy doing arithmetic (empty sale, unconfigured settings) or with the
/// operator typing the amount in by hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum AppliedPolicy {
    /// Per-line rates were summed.
    PerProduct,
    /// Single flat order charge.
    PerOrder,
    /// Units times per-unit rate.
    PerQuantity,
    /// The sale had no line items; shipping is zero.
    NoItems,
    /// No recognizable policy is configured; shipping is zero until an
    /// admin fixes the settings.
    Unconfigured,
    /// Operator entered the shipping amount manually.
    Manual,
}

impl AppliedPolicy {
    /// Stable string form used in audit strings and exports.
    pub const fn as_str(&self) -> &'static str {
        match self {
            AppliedPolicy::PerProduct => "per_product",
            AppliedPolicy::PerOrder => "per_order",
            AppliedPolicy::PerQuantity => "per_quantity",
            AppliedPolicy::NoItems => "no_items",
            AppliedPolicy::Unconfigured => "unconfigured",
            AppliedPolicy::Manual => "manual",
        }
    }
}

impl fmt::Display for AppliedPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<ShippingPolicy> for AppliedPolicy {
    fn from(policy: ShippingPolicy) -> Self {
        match policy {
            ShippingPolicy::PerProduct => AppliedPolicy::PerProduct,
            ShippingPolicy::PerOrder => AppliedPolicy::PerOrder,
            ShippingPolicy::PerQuantity => AppliedPolicy::PerQuantity,
        }
    }
}

// =============================================================================
// Commission Source
// =============================================================================

/// Which link of the override chain supplied the commission percentage.
///
/// ## Rules
/// Strict priority, first present wins, no blending:
/// sale override → customer override → system custom → system default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CommissionSource {
    /// The operator typed a rate on this specific sale.
    Sale,
    /// The selected customer carries a personalized rate.
    Customer,
    /// The settings screen has a "custom" rate configured.
    SystemCustom,
    /// Fallback to the system default rate.
    SystemDefault,
}

impl CommissionSource {
    /// Stable string form used in audit strings and exports.
    pub const fn as_str(&self) -> &'static str {
        match self {
            CommissionSource::Sale => "sale",
            CommissionSource::Customer => "customer",
            CommissionSource::SystemCustom => "system_custom",
            CommissionSource::SystemDefault => "system_default",
        }
    }
}

impl fmt::Display for CommissionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown in the sale form and on documents.
    pub name: String,

    /// Optional description for product details.
    pub description: Option<String>,

    /// Optional category for catalog filtering.
    pub category: Option<String>,

    /// Unit price in cents (smallest currency unit).
    pub unit_price_cents: i64,

    /// Per-unit shipping override in cents. `Some(0)` is a real override
    /// meaning "ships free", distinct from `None` meaning "use the default
    /// flat rate".
    pub shipping_override_cents: Option<i64>,

    /// Units currently on hand.
    pub stock_on_hand: i64,

    /// Whether product is active (soft delete).
    pub is_active: bool,

    /// When the product was created.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the unit price as a Money type.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Returns the shipping override as Money, if one is set.
    #[inline]
    pub fn shipping_override(&self) -> Option<Money> {
        self.shipping_override_cents.map(Money::from_cents)
    }

    /// Checks whether on-hand stock covers a requested quantity.
    ///
    /// Sales are not blocked on stock; the desk warns and lets the operator
    /// decide, since small shops often sell from the back room before the
    /// count is updated.
    #[inline]
    pub fn has_stock(&self, quantity: i64) -> bool {
        self.stock_on_hand >= quantity
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A customer (typically a reseller) the shop sells to.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Customer {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name.
    pub name: String,

    /// Contact email.
    pub email: Option<String>,

    /// Contact phone.
    pub phone: Option<String>,

    /// Tax/registration number.
    pub tax_id: Option<String>,

    /// Street address.
    pub address: Option<String>,

    /// City.
    pub city: Option<String>,

    /// State or region code.
    pub region: Option<String>,

    /// Postal code.
    pub postal_code: Option<String>,

    /// Personalized commission rate in basis points. Overrides the system
    /// rates whenever this customer is selected on a sale; `Some(0)` is a
    /// deliberate zero-commission arrangement, not "unset".
    pub commission_override_bps: Option<u32>,

    /// Whether customer is active (soft delete).
    pub is_active: bool,

    /// When the customer was created.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    /// When the customer was last updated.
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    /// Returns the personalized commission rate, if one is set.
    #[inline]
    pub fn commission_override(&self) -> Option<Percent> {
        self.commission_override_bps.map(Percent::from_bps)
    }
}

// =============================================================================
// Line Item
// =============================================================================

/// A line item in a sale.
/// Uses snapshot pattern to freeze product data at time of entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineItem {
    /// Product this line refers to.
    pub product_id: String,

    /// Product name at time of entry (frozen).
    pub name_snapshot: String,

    /// Unit price in cents at time of entry (frozen).
    pub unit_price_cents: i64,

    /// Quantity sold. Normally positive; a negative value slips in only
    /// through imported data and is treated as zero contribution and
    /// flagged, never silently corrected.
    pub quantity: i64,

    /// Per-unit shipping override in cents at time of entry (frozen).
    pub shipping_override_cents: Option<i64>,
}

impl LineItem {
    /// Builds a line by snapshotting a catalog product.
    pub fn from_product(product: &Product, quantity: i64) -> Self {
        LineItem {
            product_id: product.id.clone(),
            name_snapshot: product.name.clone(),
            unit_price_cents: product.unit_price_cents,
            quantity,
            shipping_override_cents: product.shipping_override_cents,
        }
    }

    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Returns the frozen shipping override as Money, if present.
    #[inline]
    pub fn shipping_override(&self) -> Option<Money> {
        self.shipping_override_cents.map(Money::from_cents)
    }

    /// Quantity used in all arithmetic: negative quantities count as zero.
    #[inline]
    pub fn effective_quantity(&self) -> i64 {
        self.quantity.max(0)
    }

    /// Line total: unit price times effective quantity.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price() * self.effective_quantity()
    }

    /// A line needs review when its recorded quantity is negative.
    #[inline]
    pub fn needs_review(&self) -> bool {
        self.quantity < 0
    }
}

// =============================================================================
// Flagged Line
// =============================================================================

/// A line item the calculators excluded from arithmetic and marked for
/// operator review.
///
/// ## When This Occurs
/// Imported spreadsheets occasionally carry negative quantities (returns
/// keyed into the wrong column). The calculation keeps going with that line
/// contributing zero, and this record tells the UI which row to highlight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FlaggedLine {
    /// Zero-based position in the sale's item list.
    pub line_index: usize,

    /// Product of the offending line.
    pub product_id: String,

    /// The quantity as recorded, for the review message.
    pub quantity: i64,
}

/// Collects review flags for every invalid line, preserving order.
pub fn flag_invalid_lines(items: &[LineItem]) -> Vec<FlaggedLine> {
    items
        .iter()
        .enumerate()
        .filter(|(_, item)| item.needs_review())
        .map(|(line_index, item)| FlaggedLine {
            line_index,
            product_id: item.product_id.clone(),
            quantity: item.quantity,
        })
        .collect()
}

// =============================================================================
// Sale
// =============================================================================

/// A finalized sale with every derived figure frozen at checkout.
///
/// Derived fields are computed by the pricing pipeline and never hand-edited;
/// re-running the pipeline on the same inputs reproduces them bit for bit.
/// Line items live and die with their sale: whatever store persists this
/// record must delete them together.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Sale {
    pub id: String,
    pub customer_id: Option<String>,
    /// Customer name at time of sale (frozen).
    pub customer_name: Option<String>,
    pub items: Vec<LineItem>,
    /// Discount granted on this sale.
    pub discount_cents: i64,
    /// Sum of line totals before shipping, commission, or discount.
    pub subtotal_cents: i64,
    /// Shipping amount actually charged.
    pub shipping_cents: i64,
    /// How the shipping amount was derived.
    pub shipping_policy: AppliedPolicy,
    /// Human-readable audit string listing the shipping arithmetic.
    pub shipping_detail: String,
    /// Resolved commission rate in basis points.
    pub commission_bps: u32,
    /// Which link of the override chain supplied the rate.
    pub commission_source: CommissionSource,
    /// Commission amount, always a percentage of the subtotal alone.
    pub commission_cents: i64,
    /// What the business nets after shipping and commission, credited with
    /// the discount per the settlement convention.
    pub payable_cents: i64,
    /// Lines excluded from arithmetic and needing operator review.
    pub flagged_lines: Vec<FlaggedLine>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Sale {
    /// Returns the subtotal as Money.
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }

    /// Returns the shipping amount as Money.
    #[inline]
    pub fn shipping_amount(&self) -> Money {
        Money::from_cents(self.shipping_cents)
    }

    /// Returns the commission amount as Money.
    #[inline]
    pub fn commission_amount(&self) -> Money {
        Money::from_cents(self.commission_cents)
    }

    /// Returns the discount as Money.
    #[inline]
    pub fn discount(&self) -> Money {
        Money::from_cents(self.discount_cents)
    }

    /// Returns the payable total as Money.
    #[inline]
    pub fn payable_total(&self) -> Money {
        Money::from_cents(self.payable_cents)
    }

    /// Returns the resolved commission rate.
    #[inline]
    pub fn commission_rate(&self) -> Percent {
        Percent::from_bps(self.commission_bps)
    }

    /// A negative payable total signals misconfigured rates, never clamped.
    #[inline]
    pub fn is_shortfall(&self) -> bool {
        self.payable_cents < 0
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_from_bps() {
        let rate = Percent::from_bps(500);
        assert_eq!(rate.bps(), 500);
        assert!((rate.percentage() - 5.0).abs() < 0.001);
    }

    #[test]
    fn test_percent_from_percentage() {
        assert_eq!(Percent::from_percentage(5.0).bps(), 500);
        assert_eq!(Percent::from_percentage(8.25).bps(), 825);
    }

    #[test]
    fn test_percent_display() {
        assert_eq!(Percent::from_bps(500).to_string(), "5%");
        assert_eq!(Percent::from_bps(250).to_string(), "2.5%");
        assert_eq!(Percent::from_bps(825).to_string(), "8.25%");
        assert_eq!(Percent::from_bps(0).to_string(), "0%");
    }

    #[test]
    fn test_percent_parse() {
        assert_eq!("5".parse::<Percent>().unwrap().bps(), 500);
        assert_eq!("2.5".parse::<Percent>().unwrap().bps(), 250);
        assert_eq!("8.25".parse::<Percent>().unwrap().bps(), 825);
        assert_eq!("0".parse::<Percent>().unwrap().bps(), 0);
    }

    #[test]
    fn test_percent_parse_rejects_bad_input() {
        assert!(matches!(
            "-5".parse::<Percent>(),
            Err(ParsePercentError::Negative(_))
        ));
        assert!(matches!(
            "5.125".parse::<Percent>(),
            Err(ParsePercentError::TooPrecise(_))
        ));
        assert!(matches!(
            "five".parse::<Percent>(),
            Err(ParsePercentError::Invalid(_))
        ));
    }

    #[test]
    fn test_shipping_policy_round_trip() {
        for policy in [
            ShippingPolicy::PerProduct,
            ShippingPolicy::PerOrder,
            ShippingPolicy::PerQuantity,
        ] {
            assert_eq!(policy.as_str().parse::<ShippingPolicy>().unwrap(), policy);
        }
        assert!("flat_rate".parse::<ShippingPolicy>().is_err());
    }

    #[test]
    fn test_line_item_negative_quantity_contributes_nothing() {
        let item = LineItem {
            product_id: "p1".to_string(),
            name_snapshot: "Widget".to_string(),
            unit_price_cents: 5000,
            quantity: -3,
            shipping_override_cents: None,
        };
        assert_eq!(item.effective_quantity(), 0);
        assert!(item.line_total().is_zero());
        assert!(item.needs_review());
    }

    #[test]
    fn test_line_item_zero_quantity_is_valid() {
        let item = LineItem {
            product_id: "p1".to_string(),
            name_snapshot: "Widget".to_string(),
            unit_price_cents: 5000,
            quantity: 0,
            shipping_override_cents: None,
        };
        assert!(item.line_total().is_zero());
        assert!(!item.needs_review());
    }

    #[test]
    fn test_flag_invalid_lines_preserves_positions() {
        let good = LineItem {
            product_id: "p1".to_string(),
            name_snapshot: "Widget".to_string(),
            unit_price_cents: 5000,
            quantity: 2,
            shipping_override_cents: None,
        };
        let bad = LineItem {
            product_id: "p2".to_string(),
            name_snapshot: "Gadget".to_string(),
            unit_price_cents: 3500,
            quantity: -1,
            shipping_override_cents: None,
        };
        let flags = flag_invalid_lines(&[good, bad]);
        assert_eq!(flags.len(), 1);
        assert_eq!(flags[0].line_index, 1);
        assert_eq!(flags[0].product_id, "p2");
        assert_eq!(flags[0].quantity, -1);
    }
}
