//! # Sale Draft & Pricing Pipeline
//!
//! The in-progress sale a session mutates, and the pipeline that turns it
//! into priced figures.
//!
//! ## Draft Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Sale Draft Operations                                │
//! │                                                                         │
//! │  Frontend Action          Desk Service            Draft State Change    │
//! │  ───────────────          ────────────            ──────────────────    │
//! │                                                                         │
//! │  Pick Product ───────────► add_item() ──────────► items.push / merge   │
//! │                                                                         │
//! │  Change Quantity ────────► update_item() ───────► items[i].qty = n     │
//! │                                                                         │
//! │  Pick Customer ──────────► select_customer() ───► override snapshot    │
//! │                                                                         │
//! │  Type Discount ──────────► set_discount() ──────► discount_cents = n   │
//! │                                                                         │
//! │  Submit ─────────────────► checkout() ──────────► price_draft() + Sale │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## The Pipeline
//! `price_draft` is stateless and idempotent: it reads the draft and the two
//! config snapshots, runs shipping, commission, and the settlement formula,
//! and returns every derived figure. Calling it twice on the same inputs
//! returns bit-identical results, so the live preview and the final
//! checkout can never disagree.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::commission::{commission_amount, resolve_commission, CommissionResolution};
use crate::config::{CommissionConfig, FeeConfig};
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::shipping::calculate_shipping;
use crate::totals::{compose_total, subtotal, SaleTotals};
use crate::types::{AppliedPolicy, Customer, FlaggedLine, LineItem, Percent, Product, Sale};
use crate::{MAX_LINE_QUANTITY, MAX_SALE_ITEMS};

// =============================================================================
// Sale Draft
// =============================================================================

/// An in-progress sale being assembled by the operator.
///
/// ## Invariants
/// - Items are unique by `product_id` (adding the same product merges
///   quantities)
/// - Updating a quantity to 0 removes the line
/// - Maximum distinct lines: 100; maximum quantity per line: 9999
/// - Customer data is snapshotted at selection time so a directory edit
///   mid-sale cannot change the commission under the operator
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleDraft {
    /// Lines in entry order.
    pub items: Vec<LineItem>,

    /// Selected customer, if any.
    pub customer_id: Option<String>,

    /// Customer name at selection time (frozen).
    pub customer_name: Option<String>,

    /// Customer's personalized commission at selection time (frozen).
    pub customer_commission_bps: Option<u32>,

    /// Discount granted on this sale.
    pub discount_cents: i64,

    /// Operator-entered shipping amount; replaces the calculated quote.
    pub manual_shipping_cents: Option<i64>,

    /// Per-sale commission override; top of the resolution chain.
    pub sale_commission_bps: Option<u32>,

    /// When the draft was started or last cleared.
    #[ts(as = "String")]
    pub started_at: DateTime<Utc>,
}

impl SaleDraft {
    /// Creates a new empty draft.
    pub fn new() -> Self {
        SaleDraft {
            items: Vec::new(),
            customer_id: None,
            customer_name: None,
            customer_commission_bps: None,
            discount_cents: 0,
            manual_shipping_cents: None,
            sale_commission_bps: None,
            started_at: Utc::now(),
        }
    }

    /// Adds a product to the draft or merges into its existing line.
    ///
    /// ## Behavior
    /// - Inactive products are refused
    /// - If the product already has a line: quantities merge
    /// - Otherwise a new line snapshots the product
    pub fn add_product(&mut self, product: &Product, quantity: i64) -> CoreResult<()> {
        if !product.is_active {
            return Err(CoreError::ProductInactive {
                name: product.name.clone(),
            });
        }

        crate::validation::validate_quantity(quantity)?;

        // Merge into an existing line for the same product
        if let Some(line) = self.items.iter_mut().find(|i| i.product_id == product.id) {
            let new_qty = line.quantity + quantity;
            if new_qty > MAX_LINE_QUANTITY {
                return Err(CoreError::QuantityTooLarge {
                    requested: new_qty,
                    max: MAX_LINE_QUANTITY,
                });
            }
            line.quantity = new_qty;
            return Ok(());
        }

        if self.items.len() >= MAX_SALE_ITEMS {
            return Err(CoreError::SaleTooLarge {
                max: MAX_SALE_ITEMS,
            });
        }

        self.items.push(LineItem::from_product(product, quantity));
        Ok(())
    }

    /// Updates the quantity of a line.
    ///
    /// ## Behavior
    /// - Quantity 0 removes the line
    /// - Negative quantities are a form mistake and are rejected
    /// - Missing product returns an error
    pub fn update_quantity(&mut self, product_id: &str, quantity: i64) -> CoreResult<()> {
        if quantity == 0 {
            return self.remove_line(product_id);
        }

        if quantity < 0 {
            return Err(ValidationError::MustBePositive {
                field: "quantity".to_string(),
            }
            .into());
        }

        if quantity > MAX_LINE_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: quantity,
                max: MAX_LINE_QUANTITY,
            });
        }

        if let Some(line) = self.items.iter_mut().find(|i| i.product_id == product_id) {
            line.quantity = quantity;
            Ok(())
        } else {
            Err(CoreError::LineNotFound {
                product_id: product_id.to_string(),
            })
        }
    }

    /// Removes a line by product ID.
    pub fn remove_line(&mut self, product_id: &str) -> CoreResult<()> {
        let initial_len = self.items.len();
        self.items.retain(|i| i.product_id != product_id);

        if self.items.len() == initial_len {
            Err(CoreError::LineNotFound {
                product_id: product_id.to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Clears the draft back to an empty sale.
    pub fn clear(&mut self) {
        self.items.clear();
        self.customer_id = None;
        self.customer_name = None;
        self.customer_commission_bps = None;
        self.discount_cents = 0;
        self.manual_shipping_cents = None;
        self.sale_commission_bps = None;
        self.started_at = Utc::now();
    }

    /// Selects a customer, snapshotting name and commission override, or
    /// clears the selection with `None`.
    pub fn set_customer(&mut self, customer: Option<&Customer>) {
        match customer {
            Some(c) => {
                self.customer_id = Some(c.id.clone());
                self.customer_name = Some(c.name.clone());
                self.customer_commission_bps = c.commission_override_bps;
            }
            None => {
                self.customer_id = None;
                self.customer_name = None;
                self.customer_commission_bps = None;
            }
        }
    }

    /// Sets the discount granted on this sale.
    pub fn set_discount(&mut self, discount: Money) -> CoreResult<()> {
        crate::validation::validate_discount_cents(discount.cents())?;
        self.discount_cents = discount.cents();
        Ok(())
    }

    /// Sets or clears the manual shipping amount.
    pub fn set_manual_shipping(&mut self, amount: Option<Money>) -> CoreResult<()> {
        if let Some(amount) = amount {
            crate::validation::validate_shipping_rate_cents(amount.cents())?;
            self.manual_shipping_cents = Some(amount.cents());
        } else {
            self.manual_shipping_cents = None;
        }
        Ok(())
    }

    /// Sets or clears the per-sale commission override.
    pub fn set_sale_commission(&mut self, rate: Option<Percent>) -> CoreResult<()> {
        if let Some(rate) = rate {
            crate::validation::validate_commission_bps(rate.bps())?;
            self.sale_commission_bps = Some(rate.bps());
        } else {
            self.sale_commission_bps = None;
        }
        Ok(())
    }

    /// Checks if the draft has no lines.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the number of distinct lines.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Returns the total effective quantity across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(LineItem::effective_quantity).sum()
    }

    /// Returns the draft's subtotal.
    pub fn subtotal(&self) -> Money {
        subtotal(&self.items)
    }

    /// Returns the discount as Money.
    pub fn discount(&self) -> Money {
        Money::from_cents(self.discount_cents)
    }

    /// The sale-level commission override, if set.
    pub fn sale_commission(&self) -> Option<Percent> {
        self.sale_commission_bps.map(Percent::from_bps)
    }

    /// The snapshotted customer commission override, if any.
    pub fn customer_commission(&self) -> Option<Percent> {
        self.customer_commission_bps.map(Percent::from_bps)
    }
}

impl Default for SaleDraft {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Sale Pricing
// =============================================================================

/// Every derived figure for a draft, produced by [`price_draft`].
///
/// Used twice: as the live preview while the operator edits, and as the
/// frozen figures at checkout. Both calls run the same pipeline, so they
/// cannot diverge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SalePricing {
    /// The reporting tuple: subtotal, shipping, commission, payable.
    pub totals: SaleTotals,

    /// How the shipping amount was derived.
    pub shipping_policy: AppliedPolicy,

    /// Audit string for the shipping amount.
    pub shipping_explanation: String,

    /// The winning commission rate and its source.
    pub commission: CommissionResolution,

    /// Discount credited in the settlement.
    pub discount: Money,

    /// Lines excluded from arithmetic, for review.
    pub flagged: Vec<FlaggedLine>,
}

impl SalePricing {
    /// True when the payable total went negative.
    #[inline]
    pub fn is_shortfall(&self) -> bool {
        self.totals.is_shortfall()
    }

    /// Freezes this pricing into a finished [`Sale`] record.
    pub fn into_sale(self, id: String, draft: &SaleDraft, created_at: DateTime<Utc>) -> Sale {
        Sale {
            id,
            customer_id: draft.customer_id.clone(),
            customer_name: draft.customer_name.clone(),
            items: draft.items.clone(),
            discount_cents: self.discount.cents(),
            subtotal_cents: self.totals.subtotal.cents(),
            shipping_cents: self.totals.shipping_amount.cents(),
            shipping_policy: self.shipping_policy,
            shipping_detail: self.shipping_explanation,
            commission_bps: self.commission.rate.bps(),
            commission_source: self.commission.source,
            commission_cents: self.totals.commission_amount.cents(),
            payable_cents: self.totals.customer_payable_total.cents(),
            flagged_lines: self.flagged,
            created_at,
        }
    }
}

/// Runs the full pricing pipeline over a draft.
///
/// ## Steps
/// 1. Shipping quote from the fee config (or the operator's manual amount,
///    which replaces the quote and is tagged `manual`)
/// 2. Subtotal over effective quantities
/// 3. Commission rate through the override chain, amount on the subtotal
///    ALONE
/// 4. Settlement formula for the payable total
///
/// Pure function of its arguments; the configs are read-only snapshots the
/// caller fetched at calculation time.
pub fn price_draft(
    draft: &SaleDraft,
    fee_config: &FeeConfig,
    commission_config: &CommissionConfig,
) -> SalePricing {
    let quote = calculate_shipping(&draft.items, fee_config);

    // A manual amount replaces whatever the policy computed
    let (shipping_amount, shipping_policy, shipping_explanation) =
        match draft.manual_shipping_cents {
            Some(cents) => {
                let amount = Money::from_cents(cents);
                (
                    amount,
                    AppliedPolicy::Manual,
                    format!("Manual shipping of {} set by operator", amount),
                )
            }
            None => (quote.amount, quote.policy, quote.explanation),
        };

    let sub = subtotal(&draft.items);

    let commission = resolve_commission(
        draft.sale_commission(),
        draft.customer_commission(),
        commission_config,
    );
    let commission_value = commission_amount(sub, commission.rate);

    let discount = draft.discount();
    let payable = compose_total(sub, shipping_amount, commission_value, discount);

    SalePricing {
        totals: SaleTotals {
            subtotal: sub,
            shipping_amount,
            commission_amount: commission_value,
            customer_payable_total: payable,
        },
        shipping_policy,
        shipping_explanation,
        commission,
        discount,
        flagged: quote.flagged,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ShippingPolicy;

    fn test_product(id: &str, price_cents: i64) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {}", id),
            description: None,
            category: None,
            unit_price_cents: price_cents,
            shipping_override_cents: None,
            stock_on_hand: 100,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn test_customer(id: &str, commission_bps: Option<u32>) -> Customer {
        Customer {
            id: id.to_string(),
            name: format!("Customer {}", id),
            email: None,
            phone: None,
            tax_id: None,
            address: None,
            city: None,
            region: None,
            postal_code: None,
            commission_override_bps: commission_bps,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn fee(policy: Option<ShippingPolicy>, flat: i64, per_unit: i64) -> FeeConfig {
        FeeConfig {
            policy,
            default_flat_rate_cents: flat,
            per_unit_rate_cents: per_unit,
        }
    }

    fn commission_cfg(default_bps: u32, custom_bps: Option<u32>) -> CommissionConfig {
        CommissionConfig {
            default_bps,
            custom_bps,
        }
    }

    #[test]
    fn test_draft_add_product() {
        let mut draft = SaleDraft::new();
        let product = test_product("p1", 999);

        draft.add_product(&product, 2).unwrap();

        assert_eq!(draft.item_count(), 1);
        assert_eq!(draft.total_quantity(), 2);
        assert_eq!(draft.subtotal().cents(), 1998);
    }

    #[test]
    fn test_draft_add_same_product_merges() {
        let mut draft = SaleDraft::new();
        let product = test_product("p1", 999);

        draft.add_product(&product, 2).unwrap();
        draft.add_product(&product, 3).unwrap();

        assert_eq!(draft.item_count(), 1);
        assert_eq!(draft.total_quantity(), 5);
    }

    #[test]
    fn test_draft_rejects_inactive_product() {
        let mut draft = SaleDraft::new();
        let mut product = test_product("p1", 999);
        product.is_active = false;

        let err = draft.add_product(&product, 1).unwrap_err();
        assert!(matches!(err, CoreError::ProductInactive { .. }));
    }

    #[test]
    fn test_draft_merge_respects_quantity_cap() {
        let mut draft = SaleDraft::new();
        let product = test_product("p1", 999);

        draft.add_product(&product, 9000).unwrap();
        let err = draft.add_product(&product, 1500).unwrap_err();
        assert!(matches!(err, CoreError::QuantityTooLarge { .. }));
    }

    #[test]
    fn test_draft_update_quantity_zero_removes() {
        let mut draft = SaleDraft::new();
        draft.add_product(&test_product("p1", 999), 2).unwrap();

        draft.update_quantity("p1", 0).unwrap();
        assert!(draft.is_empty());
    }

    #[test]
    fn test_draft_update_quantity_negative_rejected() {
        let mut draft = SaleDraft::new();
        draft.add_product(&test_product("p1", 999), 2).unwrap();

        let err = draft.update_quantity("p1", -3).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn test_draft_update_missing_line_errors() {
        let mut draft = SaleDraft::new();
        let err = draft.update_quantity("ghost", 2).unwrap_err();
        assert!(matches!(err, CoreError::LineNotFound { .. }));
    }

    #[test]
    fn test_draft_customer_snapshot() {
        let mut draft = SaleDraft::new();
        let customer = test_customer("c1", Some(750));

        draft.set_customer(Some(&customer));
        assert_eq!(draft.customer_id.as_deref(), Some("c1"));
        assert_eq!(draft.customer_commission(), Some(Percent::from_bps(750)));

        draft.set_customer(None);
        assert_eq!(draft.customer_id, None);
        assert_eq!(draft.customer_commission(), None);
    }

    #[test]
    fn test_draft_clear_resets_everything() {
        let mut draft = SaleDraft::new();
        draft.add_product(&test_product("p1", 999), 2).unwrap();
        draft.set_customer(Some(&test_customer("c1", Some(750))));
        draft.set_discount(Money::from_cents(500)).unwrap();
        draft
            .set_manual_shipping(Some(Money::from_cents(1000)))
            .unwrap();
        draft
            .set_sale_commission(Some(Percent::from_bps(1000)))
            .unwrap();

        draft.clear();

        assert!(draft.is_empty());
        assert_eq!(draft.customer_id, None);
        assert_eq!(draft.discount_cents, 0);
        assert_eq!(draft.manual_shipping_cents, None);
        assert_eq!(draft.sale_commission_bps, None);
    }

    /// The full September incident sale: 60 and 5 totes at $50, 4 pins at
    /// $35, per-quantity shipping at $5.00, 5% default commission.
    #[test]
    fn test_price_draft_regression_scenario() {
        let mut draft = SaleDraft::new();
        draft.add_product(&test_product("p1", 5000), 60).unwrap();
        draft.add_product(&test_product("p2", 5000), 5).unwrap();
        draft.add_product(&test_product("p3", 3500), 4).unwrap();

        let pricing = price_draft(
            &draft,
            &fee(Some(ShippingPolicy::PerQuantity), 0, 500),
            &commission_cfg(500, None),
        );

        assert_eq!(pricing.totals.subtotal.cents(), 339_000);
        assert_eq!(pricing.totals.shipping_amount.cents(), 34_500);
        assert_eq!(pricing.totals.commission_amount.cents(), 16_950);
        assert_eq!(pricing.totals.customer_payable_total.cents(), 287_550);
        assert_eq!(pricing.shipping_policy, AppliedPolicy::PerQuantity);
        assert_eq!(pricing.commission.source, crate::types::CommissionSource::SystemDefault);
        assert!(!pricing.is_shortfall());

        // The legacy formula (commission on subtotal + shipping) would have
        // paid $186.75; make sure it stays dead
        assert_ne!(pricing.totals.commission_amount.cents(), 18_675);
    }

    #[test]
    fn test_price_draft_manual_shipping_replaces_quote() {
        let mut draft = SaleDraft::new();
        draft.add_product(&test_product("p1", 5000), 10).unwrap();
        draft
            .set_manual_shipping(Some(Money::from_cents(2_500)))
            .unwrap();

        let pricing = price_draft(
            &draft,
            &fee(Some(ShippingPolicy::PerQuantity), 0, 500),
            &commission_cfg(500, None),
        );

        assert_eq!(pricing.totals.shipping_amount.cents(), 2_500);
        assert_eq!(pricing.shipping_policy, AppliedPolicy::Manual);
        assert_eq!(
            pricing.shipping_explanation,
            "Manual shipping of $25.00 set by operator"
        );
        // 50000 − 2500 − 2500 + 0
        assert_eq!(pricing.totals.customer_payable_total.cents(), 45_000);
    }

    #[test]
    fn test_price_draft_sale_override_beats_customer() {
        let mut draft = SaleDraft::new();
        draft.add_product(&test_product("p1", 10_000), 1).unwrap();
        draft.set_customer(Some(&test_customer("c1", Some(750))));
        draft
            .set_sale_commission(Some(Percent::from_bps(1000)))
            .unwrap();

        let pricing = price_draft(
            &draft,
            &fee(None, 0, 0),
            &commission_cfg(500, Some(250)),
        );

        assert_eq!(pricing.commission.rate, Percent::from_bps(1000));
        assert_eq!(
            pricing.commission.source,
            crate::types::CommissionSource::Sale
        );
        assert_eq!(pricing.totals.commission_amount.cents(), 1_000);
    }

    #[test]
    fn test_price_draft_customer_snapshot_feeds_chain() {
        let mut draft = SaleDraft::new();
        draft.add_product(&test_product("p1", 10_000), 1).unwrap();
        draft.set_customer(Some(&test_customer("c1", Some(750))));

        let pricing = price_draft(&draft, &fee(None, 0, 0), &commission_cfg(500, Some(250)));

        assert_eq!(pricing.commission.rate, Percent::from_bps(750));
        assert_eq!(
            pricing.commission.source,
            crate::types::CommissionSource::Customer
        );
    }

    #[test]
    fn test_price_draft_empty_is_all_zero() {
        let draft = SaleDraft::new();
        let pricing = price_draft(
            &draft,
            &fee(Some(ShippingPolicy::PerOrder), 1500, 0),
            &commission_cfg(500, None),
        );

        assert!(pricing.totals.subtotal.is_zero());
        assert!(pricing.totals.shipping_amount.is_zero());
        assert!(pricing.totals.commission_amount.is_zero());
        assert!(pricing.totals.customer_payable_total.is_zero());
        assert_eq!(pricing.shipping_policy, AppliedPolicy::NoItems);
    }

    #[test]
    fn test_price_draft_surfaces_shortfall() {
        let mut draft = SaleDraft::new();
        draft.add_product(&test_product("p1", 100), 1).unwrap();

        let pricing = price_draft(
            &draft,
            &fee(Some(ShippingPolicy::PerOrder), 1500, 0),
            &commission_cfg(500, None),
        );

        // $1.00 − $15.00 − $0.05 = −$14.05
        assert_eq!(pricing.totals.customer_payable_total.cents(), -1_405);
        assert!(pricing.is_shortfall());
    }

    #[test]
    fn test_price_draft_is_idempotent() {
        let mut draft = SaleDraft::new();
        draft.add_product(&test_product("p1", 5000), 60).unwrap();
        draft.set_discount(Money::from_cents(1000)).unwrap();

        let fee_cfg = fee(Some(ShippingPolicy::PerQuantity), 0, 500);
        let comm_cfg = commission_cfg(500, Some(250));

        let first = price_draft(&draft, &fee_cfg, &comm_cfg);
        let second = price_draft(&draft, &fee_cfg, &comm_cfg);
        assert_eq!(first, second);
    }

    #[test]
    fn test_into_sale_freezes_everything() {
        let mut draft = SaleDraft::new();
        draft.add_product(&test_product("p1", 5000), 60).unwrap();
        draft.add_product(&test_product("p2", 5000), 5).unwrap();
        draft.add_product(&test_product("p3", 3500), 4).unwrap();
        draft.set_customer(Some(&test_customer("c1", None)));

        let pricing = price_draft(
            &draft,
            &fee(Some(ShippingPolicy::PerQuantity), 0, 500),
            &commission_cfg(500, None),
        );
        let created_at = Utc::now();
        let sale = pricing.into_sale("sale-1".to_string(), &draft, created_at);

        assert_eq!(sale.id, "sale-1");
        assert_eq!(sale.customer_id.as_deref(), Some("c1"));
        assert_eq!(sale.items.len(), 3);
        assert_eq!(sale.subtotal_cents, 339_000);
        assert_eq!(sale.shipping_cents, 34_500);
        assert_eq!(sale.commission_cents, 16_950);
        assert_eq!(sale.payable_cents, 287_550);
        assert_eq!(sale.commission_bps, 500);
        assert_eq!(sale.shipping_policy, AppliedPolicy::PerQuantity);
        assert_eq!(sale.created_at, created_at);
        assert!(!sale.is_shortfall());
    }
}
