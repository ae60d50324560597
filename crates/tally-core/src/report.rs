//! # Report Aggregation
//!
//! Pure aggregation over completed sales for the reporting screen.
//!
//! ## Two Different Nets
//! A sale record carries two derived figures that are easy to confuse:
//!
//! - `payable_cents` is the settlement line: what changes hands with the
//!   customer after shipping and commission are withheld and the discount
//!   is credited.
//! - `net_result` (computed here) is the shop's outcome: product revenue
//!   minus shipping, commission, and the discount given away.
//!
//! ## Reconciliation Invariant
//! The report totals use one formula end to end:
//!
//! ```text
//! net_result = revenue − shipping_total − commission_total − discount_total
//! ```
//!
//! applied per sale and across the period, so the grand total always equals
//! the sum of the row nets. Currency formatting and CSV/PDF layout belong
//! to the reporting frontend, not here.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::Sale;

// =============================================================================
// Per-Sale Summary
// =============================================================================

/// One row of the report: a sale's money figures plus its net result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleSummary {
    pub sale_id: String,
    pub customer_name: Option<String>,

    /// Sale timestamp, RFC 3339.
    pub created_at: String,

    pub subtotal: Money,
    pub shipping_amount: Money,
    pub commission_amount: Money,
    pub discount: Money,
    pub customer_payable_total: Money,

    /// What the shop kept: subtotal − shipping − commission − discount.
    pub net_result: Money,
}

impl From<&Sale> for SaleSummary {
    fn from(sale: &Sale) -> Self {
        let net_result =
            sale.subtotal() - sale.shipping_amount() - sale.commission_amount() - sale.discount();

        SaleSummary {
            sale_id: sale.id.clone(),
            customer_name: sale.customer_name.clone(),
            created_at: sale.created_at.to_rfc3339(),
            subtotal: sale.subtotal(),
            shipping_amount: sale.shipping_amount(),
            commission_amount: sale.commission_amount(),
            discount: sale.discount(),
            customer_payable_total: sale.payable_total(),
            net_result,
        }
    }
}

// =============================================================================
// Period Totals
// =============================================================================

/// Aggregate figures across every sale in the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReportTotals {
    pub sale_count: usize,

    /// Gross product revenue: sum of subtotals, before any discount.
    pub revenue: Money,

    pub shipping_total: Money,
    pub commission_total: Money,
    pub discount_total: Money,

    /// revenue − shipping_total − commission_total − discount_total.
    pub net_result: Money,
}

impl ReportTotals {
    /// Folds the totals over a set of sales.
    pub fn from_sales(sales: &[Sale]) -> Self {
        let mut totals = ReportTotals {
            sale_count: sales.len(),
            ..ReportTotals::default()
        };

        for sale in sales {
            totals.revenue += sale.subtotal();
            totals.shipping_total += sale.shipping_amount();
            totals.commission_total += sale.commission_amount();
            totals.discount_total += sale.discount();
        }

        totals.net_result = totals.revenue
            - totals.shipping_total
            - totals.commission_total
            - totals.discount_total;
        totals
    }
}

// =============================================================================
// Full Report
// =============================================================================

/// The complete report payload: one row per sale plus the period totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SalesReport {
    pub rows: Vec<SaleSummary>,
    pub totals: ReportTotals,
}

/// Builds the report over completed sales, preserving input order.
pub fn build_report(sales: &[Sale]) -> SalesReport {
    SalesReport {
        rows: sales.iter().map(SaleSummary::from).collect(),
        totals: ReportTotals::from_sales(sales),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AppliedPolicy, CommissionSource};
    use chrono::Utc;

    fn test_sale(id: &str, subtotal: i64, shipping: i64, commission: i64, discount: i64) -> Sale {
        Sale {
            id: id.to_string(),
            customer_id: None,
            customer_name: Some("Ana".to_string()),
            items: Vec::new(),
            discount_cents: discount,
            subtotal_cents: subtotal,
            shipping_cents: shipping,
            shipping_policy: AppliedPolicy::PerQuantity,
            shipping_detail: String::new(),
            commission_bps: 500,
            commission_source: CommissionSource::SystemDefault,
            commission_cents: commission,
            payable_cents: subtotal - shipping - commission + discount,
            flagged_lines: Vec::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_summary_net_subtracts_discount() {
        // $100 sale, $10 shipping, $5 commission, $8 discount
        let sale = test_sale("s1", 10_000, 1_000, 500, 800);
        let summary = SaleSummary::from(&sale);

        // Settlement credits the discount back
        assert_eq!(summary.customer_payable_total.cents(), 9_300);
        // The shop's net treats it as money given away
        assert_eq!(summary.net_result.cents(), 7_700);
    }

    #[test]
    fn test_summary_from_regression_sale() {
        let sale = test_sale("s1", 339_000, 34_500, 16_950, 0);
        let summary = SaleSummary::from(&sale);

        assert_eq!(summary.subtotal.cents(), 339_000);
        assert_eq!(summary.shipping_amount.cents(), 34_500);
        assert_eq!(summary.commission_amount.cents(), 16_950);
        assert_eq!(summary.customer_payable_total.cents(), 287_550);
        assert_eq!(summary.net_result.cents(), 287_550);
    }

    #[test]
    fn test_totals_fold_over_sales() {
        let sales = vec![
            test_sale("s1", 10_000, 1_000, 500, 0),
            test_sale("s2", 20_000, 2_000, 1_000, 500),
            test_sale("s3", 5_000, 0, 250, 0),
        ];

        let totals = ReportTotals::from_sales(&sales);

        assert_eq!(totals.sale_count, 3);
        assert_eq!(totals.revenue.cents(), 35_000);
        assert_eq!(totals.shipping_total.cents(), 3_000);
        assert_eq!(totals.commission_total.cents(), 1_750);
        assert_eq!(totals.discount_total.cents(), 500);
        assert_eq!(totals.net_result.cents(), 29_750);
    }

    #[test]
    fn test_totals_reconcile_with_row_nets() {
        let sales = vec![
            test_sale("s1", 10_000, 1_000, 500, 800),
            test_sale("s2", 20_000, 2_000, 1_000, 0),
            test_sale("s3", 100, 1_500, 5, 0),
        ];

        let report = build_report(&sales);
        let row_net_sum: Money = report.rows.iter().map(|r| r.net_result).sum();
        assert_eq!(report.totals.net_result, row_net_sum);
    }

    #[test]
    fn test_empty_report_is_zero() {
        let report = build_report(&[]);
        assert!(report.rows.is_empty());
        assert_eq!(report.totals.sale_count, 0);
        assert!(report.totals.revenue.is_zero());
        assert!(report.totals.net_result.is_zero());
    }

    #[test]
    fn test_report_rows_preserve_order() {
        let sales = vec![
            test_sale("first", 1_000, 0, 0, 0),
            test_sale("second", 2_000, 0, 0, 0),
        ];
        let report = build_report(&sales);
        assert_eq!(report.rows[0].sale_id, "first");
        assert_eq!(report.rows[1].sale_id, "second");
    }
}
