//! # Sale Total Composer
//!
//! The subtotal and the settlement formula, stated exactly once.
//!
//! ## The Settlement Formula
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  payable = subtotal − shipping − commission + discount                  │
//! │                                                                         │
//! │  subtotal    Σ unit price × quantity, product revenue                  │
//! │  shipping    business expense, withheld from revenue                   │
//! │  commission  business expense, withheld from revenue                   │
//! │  discount    granted on the sale, credited back in the settlement      │
//! │                                                                         │
//! │  A NEGATIVE result is returned as-is. It means the configured rates    │
//! │  eat more than the sale brings in, and somebody needs to see that.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Why One Function
//! This formula used to live inline in three different form components, and
//! they drifted: one added shipping to the customer total, another computed
//! commission after shipping. Every caller now goes through
//! [`compose_total`]; nothing else in the codebase may restate the formula.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::LineItem;

// =============================================================================
// Subtotal
// =============================================================================

/// Sums line totals across all items.
///
/// Negative quantities contribute nothing, matching the calculators; the
/// flagging of those lines is handled alongside the shipping quote.
///
/// ## Example
/// ```rust
/// use tally_core::totals::subtotal;
/// use tally_core::types::LineItem;
///
/// let items = vec![
///     LineItem {
///         product_id: "p1".into(),
///         name_snapshot: "Tote".into(),
///         unit_price_cents: 5000,
///         quantity: 60,
///         shipping_override_cents: None,
///     },
/// ];
/// assert_eq!(subtotal(&items).cents(), 300_000); // $3,000.00
/// ```
pub fn subtotal(items: &[LineItem]) -> Money {
    items
        .iter()
        .fold(Money::zero(), |acc, item| acc + item.line_total())
}

// =============================================================================
// Composer
// =============================================================================

/// Combines the four figures into the customer payable total.
///
/// `payable = subtotal − shipping − commission + discount`
///
/// Shipping and commission are business expenses subtracted from what the
/// business nets on the sale; the discount is credited back into the
/// settlement chain. This convention is authoritative for the whole system
/// and must not be restated inline anywhere else.
///
/// ## Negative Totals
/// No clamping. A negative payable total is a data-quality signal (rates
/// configured higher than the sale's revenue) and the caller decides
/// whether to warn or to block.
#[inline]
pub fn compose_total(
    subtotal: Money,
    shipping_amount: Money,
    commission_amount: Money,
    discount: Money,
) -> Money {
    subtotal - shipping_amount - commission_amount + discount
}

// =============================================================================
// Sale Totals
// =============================================================================

/// The computed money tuple for one sale, as handed to reporting/export.
///
/// Formatting (currency locale, separators) belongs to the consumer; these
/// are plain cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleTotals {
    /// Product revenue before anything else.
    pub subtotal: Money,

    /// Shipping amount charged on the sale.
    pub shipping_amount: Money,

    /// Commission amount, always derived from the subtotal alone.
    pub commission_amount: Money,

    /// The settlement result per [`compose_total`].
    pub customer_payable_total: Money,
}

impl SaleTotals {
    /// True when the payable total went negative (misconfiguration signal).
    #[inline]
    pub fn is_shortfall(&self) -> bool {
        self.customer_payable_total.is_negative()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn item(price_cents: i64, qty: i64) -> LineItem {
        LineItem {
            product_id: "p".to_string(),
            name_snapshot: "Item".to_string(),
            unit_price_cents: price_cents,
            quantity: qty,
            shipping_override_cents: None,
        }
    }

    /// The September incident subtotal: (60×$50) + (5×$50) + (4×$35).
    #[test]
    fn test_subtotal_regression_scenario() {
        let items = vec![item(5000, 60), item(5000, 5), item(3500, 4)];
        assert_eq!(subtotal(&items).cents(), 339_000);
    }

    #[test]
    fn test_subtotal_skips_negative_quantities() {
        let items = vec![item(5000, 10), item(3500, -4)];
        assert_eq!(subtotal(&items).cents(), 50_000);
    }

    #[test]
    fn test_subtotal_empty_is_zero() {
        assert!(subtotal(&[]).is_zero());
    }

    /// Full settlement on the incident sale: $3,390.00 revenue, $345.00
    /// shipping, $169.50 commission, no discount.
    #[test]
    fn test_compose_total_regression_scenario() {
        let payable = compose_total(
            Money::from_cents(339_000),
            Money::from_cents(34_500),
            Money::from_cents(16_950),
            Money::zero(),
        );
        assert_eq!(payable.cents(), 287_550); // $2,875.50
    }

    #[test]
    fn test_compose_total_credits_discount() {
        let payable = compose_total(
            Money::from_cents(10_000),
            Money::from_cents(1_000),
            Money::from_cents(500),
            Money::from_cents(200),
        );
        assert_eq!(payable.cents(), 8_700);
    }

    /// Rates bigger than the sale produce a visible negative, never a
    /// silent zero.
    #[test]
    fn test_compose_total_surfaces_negative() {
        let payable = compose_total(
            Money::from_cents(1_000),
            Money::from_cents(1_500),
            Money::from_cents(200),
            Money::zero(),
        );
        assert_eq!(payable.cents(), -700);

        let totals = SaleTotals {
            subtotal: Money::from_cents(1_000),
            shipping_amount: Money::from_cents(1_500),
            commission_amount: Money::from_cents(200),
            customer_payable_total: payable,
        };
        assert!(totals.is_shortfall());
    }
}
