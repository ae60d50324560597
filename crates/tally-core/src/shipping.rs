//! # Shipping Calculator
//!
//! Pure shipping-fee calculation over a sale's line items.
//!
//! ## Policy Dispatch
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  calculate_shipping(items, config)                                      │
//! │       │                                                                 │
//! │       ├── items empty ────────────► $0, tag: no_items                  │
//! │       │                                                                 │
//! │       ├── per_product ──► Σ line: (override | default rate) × qty      │
//! │       │                   override of $0 is a REAL rate, not absence   │
//! │       │                                                                 │
//! │       ├── per_order ────► default flat rate, once, regardless of items │
//! │       │                                                                 │
//! │       ├── per_quantity ─► (Σ quantities) × per-unit rate               │
//! │       │                                                                 │
//! │       └── no policy ────► $0, tag: unconfigured                        │
//! │                                                                         │
//! │  Always returns a quote. Never errors, never guesses a policy.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The explanation string on every quote spells out the arithmetic so the
//! operator can see exactly where a number came from, and so tests can pin
//! the output byte for byte.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::config::FeeConfig;
use crate::money::Money;
use crate::types::{flag_invalid_lines, AppliedPolicy, FlaggedLine, LineItem, ShippingPolicy};

// =============================================================================
// Shipping Quote
// =============================================================================

/// The outcome of a shipping calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ShippingQuote {
    /// The shipping amount to charge.
    pub amount: Money,

    /// Which policy actually produced the amount.
    pub policy: AppliedPolicy,

    /// Human-readable audit string listing the arithmetic performed.
    pub explanation: String,

    /// Lines excluded from the arithmetic (negative quantity) for review.
    pub flagged: Vec<FlaggedLine>,
}

// =============================================================================
// Calculator
// =============================================================================

/// Computes the shipping amount for a set of line items under a fee config.
///
/// Pure and deterministic: same inputs, same quote, bit for bit. Expected
/// business oddities (no items, unset rates, junk policy) come back as a
/// zero amount with an honest tag instead of an error, because shipping
/// settings must never be able to block a sale.
///
/// ## Example
/// ```rust
/// use tally_core::config::FeeConfig;
/// use tally_core::shipping::calculate_shipping;
/// use tally_core::types::{AppliedPolicy, LineItem, ShippingPolicy};
///
/// let items = vec![LineItem {
///     product_id: "p1".into(),
///     name_snapshot: "Mug".into(),
///     unit_price_cents: 5000,
///     quantity: 69,
///     shipping_override_cents: None,
/// }];
/// let config = FeeConfig {
///     policy: Some(ShippingPolicy::PerQuantity),
///     default_flat_rate_cents: 0,
///     per_unit_rate_cents: 500,
/// };
///
/// let quote = calculate_shipping(&items, &config);
/// assert_eq!(quote.amount.cents(), 34_500); // 69 × $5.00
/// assert_eq!(quote.policy, AppliedPolicy::PerQuantity);
/// ```
pub fn calculate_shipping(items: &[LineItem], config: &FeeConfig) -> ShippingQuote {
    // An empty sale ships nothing; not an error
    if items.is_empty() {
        return ShippingQuote {
            amount: Money::zero(),
            policy: AppliedPolicy::NoItems,
            explanation: "No line items to ship".to_string(),
            flagged: Vec::new(),
        };
    }

    let flagged = flag_invalid_lines(items);

    match config.policy {
        Some(ShippingPolicy::PerProduct) => per_product(items, config, flagged),
        Some(ShippingPolicy::PerOrder) => per_order(config, flagged),
        Some(ShippingPolicy::PerQuantity) => per_quantity(items, config, flagged),
        None => ShippingQuote {
            amount: Money::zero(),
            policy: AppliedPolicy::Unconfigured,
            explanation: "Shipping not configured".to_string(),
            flagged,
        },
    }
}

/// Sums each line's own rate: the product's frozen override when present
/// (a $0 override really means "ships free"), the default flat rate
/// otherwise. Unset default contributes 0, never a substitute constant.
fn per_product(items: &[LineItem], config: &FeeConfig, flagged: Vec<FlaggedLine>) -> ShippingQuote {
    let mut total = Money::zero();
    let mut details: Vec<String> = Vec::with_capacity(items.len());

    for item in items {
        let quantity = item.effective_quantity();
        match item.shipping_override() {
            Some(rate) => {
                let line = rate * quantity;
                total += line;
                details.push(format!(
                    "{}: {} × {} = {}",
                    item.name_snapshot, quantity, rate, line
                ));
            }
            None => {
                let rate = config.default_flat_rate();
                let line = rate * quantity;
                total += line;
                details.push(format!(
                    "{}: {} × {} (default) = {}",
                    item.name_snapshot, quantity, rate, line
                ));
            }
        }
    }

    ShippingQuote {
        amount: total,
        policy: AppliedPolicy::PerProduct,
        explanation: format!("Per-product shipping: {}", details.join(", ")),
        flagged,
    }
}

/// One flat charge for the whole order, whatever the items look like.
fn per_order(config: &FeeConfig, flagged: Vec<FlaggedLine>) -> ShippingQuote {
    let rate = config.default_flat_rate();
    ShippingQuote {
        amount: rate,
        policy: AppliedPolicy::PerOrder,
        explanation: format!("Flat rate of {} per order", rate),
        flagged,
    }
}

/// Total units across all lines times the per-unit rate.
fn per_quantity(items: &[LineItem], config: &FeeConfig, flagged: Vec<FlaggedLine>) -> ShippingQuote {
    let total_quantity: i64 = items.iter().map(LineItem::effective_quantity).sum();
    let rate = config.per_unit_rate();
    let amount = rate * total_quantity;

    ShippingQuote {
        amount,
        policy: AppliedPolicy::PerQuantity,
        explanation: format!(
            "Per-quantity shipping: {} units × {} = {}",
            total_quantity, rate, amount
        ),
        flagged,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, name: &str, price_cents: i64, qty: i64) -> LineItem {
        LineItem {
            product_id: id.to_string(),
            name_snapshot: name.to_string(),
            unit_price_cents: price_cents,
            quantity: qty,
            shipping_override_cents: None,
        }
    }

    fn item_with_override(
        id: &str,
        name: &str,
        price_cents: i64,
        qty: i64,
        override_cents: i64,
    ) -> LineItem {
        LineItem {
            shipping_override_cents: Some(override_cents),
            ..item(id, name, price_cents, qty)
        }
    }

    fn config(policy: Option<ShippingPolicy>, flat: i64, per_unit: i64) -> FeeConfig {
        FeeConfig {
            policy,
            default_flat_rate_cents: flat,
            per_unit_rate_cents: per_unit,
        }
    }

    #[test]
    fn test_empty_items_ship_nothing() {
        let quote = calculate_shipping(&[], &config(Some(ShippingPolicy::PerOrder), 1500, 0));
        assert!(quote.amount.is_zero());
        assert_eq!(quote.policy, AppliedPolicy::NoItems);
        assert_eq!(quote.explanation, "No line items to ship");
        assert!(quote.flagged.is_empty());
    }

    #[test]
    fn test_unconfigured_policy_ships_nothing() {
        let items = vec![item("p1", "Mug", 5000, 3)];
        let quote = calculate_shipping(&items, &config(None, 1500, 500));
        assert!(quote.amount.is_zero());
        assert_eq!(quote.policy, AppliedPolicy::Unconfigured);
        assert_eq!(quote.explanation, "Shipping not configured");
    }

    #[test]
    fn test_per_product_mixes_overrides_and_default() {
        let items = vec![
            item_with_override("p1", "Mug", 5000, 3, 200), // 3 × $2.00 = $6.00
            item("p2", "Shirt", 3500, 2),                  // 2 × $15.00 = $30.00
        ];
        let quote = calculate_shipping(&items, &config(Some(ShippingPolicy::PerProduct), 1500, 0));
        assert_eq!(quote.amount.cents(), 600 + 3000);
        assert_eq!(quote.policy, AppliedPolicy::PerProduct);
        assert_eq!(
            quote.explanation,
            "Per-product shipping: Mug: 3 × $2.00 = $6.00, Shirt: 2 × $15.00 (default) = $30.00"
        );
    }

    /// An explicit override of $0 means "ships free" and must not fall back
    /// to the default flat rate.
    #[test]
    fn test_per_product_zero_override_precedence() {
        let items = vec![item_with_override("p1", "Sticker", 300, 10, 0)];
        let quote = calculate_shipping(&items, &config(Some(ShippingPolicy::PerProduct), 1500, 0));
        assert!(quote.amount.is_zero());
        assert_eq!(quote.policy, AppliedPolicy::PerProduct);
    }

    /// An unset default rate contributes zero; no constant is substituted.
    #[test]
    fn test_per_product_unset_default_contributes_zero() {
        let items = vec![item("p1", "Mug", 5000, 4)];
        let quote = calculate_shipping(&items, &config(Some(ShippingPolicy::PerProduct), 0, 0));
        assert!(quote.amount.is_zero());
    }

    /// Per-order shipping depends only on the flat rate, never the items.
    #[test]
    fn test_per_order_invariance() {
        let cfg = config(Some(ShippingPolicy::PerOrder), 1500, 0);
        let small = vec![item("p1", "Mug", 5000, 1)];
        let large = vec![
            item("p1", "Mug", 5000, 60),
            item("p2", "Shirt", 3500, 40),
            item("p3", "Hat", 2500, 7),
        ];

        let quote_small = calculate_shipping(&small, &cfg);
        let quote_large = calculate_shipping(&large, &cfg);

        assert_eq!(quote_small.amount.cents(), 1500);
        assert_eq!(quote_large.amount.cents(), 1500);
        assert_eq!(quote_small.explanation, "Flat rate of $15.00 per order");
    }

    /// Doubling every quantity doubles the per-quantity amount.
    #[test]
    fn test_per_quantity_linearity() {
        let cfg = config(Some(ShippingPolicy::PerQuantity), 0, 500);
        let base = vec![item("p1", "Mug", 5000, 10), item("p2", "Shirt", 3500, 5)];
        let doubled = vec![item("p1", "Mug", 5000, 20), item("p2", "Shirt", 3500, 10)];

        let quote_base = calculate_shipping(&base, &cfg);
        let quote_doubled = calculate_shipping(&doubled, &cfg);

        assert_eq!(quote_doubled.amount.cents(), quote_base.amount.cents() * 2);
    }

    /// The September incident numbers: 69 units at $5.00 each is $345.00.
    #[test]
    fn test_per_quantity_regression_scenario() {
        let items = vec![
            item("p1", "Canvas Tote", 5000, 60),
            item("p2", "Canvas Tote XL", 5000, 5),
            item("p3", "Enamel Pin", 3500, 4),
        ];
        let quote = calculate_shipping(&items, &config(Some(ShippingPolicy::PerQuantity), 0, 500));

        assert_eq!(quote.amount.cents(), 34_500);
        assert_eq!(quote.policy, AppliedPolicy::PerQuantity);
        assert_eq!(
            quote.explanation,
            "Per-quantity shipping: 69 units × $5.00 = $345.00"
        );
    }

    /// An unset per-unit rate means zero shipping, not a magic fallback.
    #[test]
    fn test_per_quantity_unset_rate_is_zero() {
        let items = vec![item("p1", "Mug", 5000, 69)];
        let quote = calculate_shipping(&items, &config(Some(ShippingPolicy::PerQuantity), 0, 0));
        assert!(quote.amount.is_zero());
    }

    #[test]
    fn test_negative_quantity_contributes_zero_and_flags() {
        let items = vec![
            item("p1", "Mug", 5000, 10),
            item("p2", "Shirt", 3500, -4),
        ];
        let cfg = config(Some(ShippingPolicy::PerQuantity), 0, 500);
        let quote = calculate_shipping(&items, &cfg);

        // Only the 10 valid units are charged
        assert_eq!(quote.amount.cents(), 5000);
        assert_eq!(quote.flagged.len(), 1);
        assert_eq!(quote.flagged[0].line_index, 1);
        assert_eq!(quote.flagged[0].quantity, -4);
    }

    /// Same inputs, same quote, bit for bit.
    #[test]
    fn test_idempotence() {
        let items = vec![
            item_with_override("p1", "Mug", 5000, 3, 200),
            item("p2", "Shirt", 3500, 2),
        ];
        let cfg = config(Some(ShippingPolicy::PerProduct), 1500, 0);

        let first = calculate_shipping(&items, &cfg);
        let second = calculate_shipping(&items, &cfg);
        assert_eq!(first, second);
    }
}
