//! # Commission Resolver
//!
//! Resolves which commission percentage applies to a sale and turns it into
//! a monetary amount.
//!
//! ## The Override Chain
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  resolve_commission(sale_override, customer_override, config)           │
//! │                                                                         │
//! │   1. sale override present?      ──► use it   (source: sale)           │
//! │   2. customer override present?  ──► use it   (source: customer)       │
//! │   3. system custom configured?   ──► use it   (source: system_custom)  │
//! │   4. otherwise                   ──► default  (source: system_default) │
//! │                                                                         │
//! │  First present value wins outright. No averaging, no stacking, and a   │
//! │  present 0% is a winner like any other rate.                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## The Base Rule
//! Commission is a cost on PRODUCT REVENUE. The amount is always
//! `subtotal × rate`, never `(subtotal + shipping) × rate`. An earlier
//! generation of this system computed commission after shipping was added
//! and quietly overpaid resellers on every shipped order; keeping the
//! multiplication in one function is what stops that from coming back.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::config::CommissionConfig;
use crate::money::Money;
use crate::types::{CommissionSource, Percent};

// =============================================================================
// Commission Resolution
// =============================================================================

/// The rate a sale will pay commission at, and where it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CommissionResolution {
    /// The winning percentage.
    pub rate: Percent,

    /// Which link of the chain supplied it.
    pub source: CommissionSource,
}

// =============================================================================
// Resolver
// =============================================================================

/// Walks the override chain and returns the first present rate.
///
/// `Some(Percent::zero())` anywhere in the chain is a deliberate 0% and
/// wins its slot; only `None` falls through. The chain never blends two
/// sources.
///
/// ## Example
/// ```rust
/// use tally_core::commission::resolve_commission;
/// use tally_core::config::CommissionConfig;
/// use tally_core::types::{CommissionSource, Percent};
///
/// let config = CommissionConfig { default_bps: 500, custom_bps: Some(250) };
///
/// // No overrides: the system custom rate beats the default
/// let resolved = resolve_commission(None, None, &config);
/// assert_eq!(resolved.rate, Percent::from_bps(250));
/// assert_eq!(resolved.source, CommissionSource::SystemCustom);
///
/// // A sale override trumps everything
/// let resolved = resolve_commission(Some(Percent::from_bps(1000)), None, &config);
/// assert_eq!(resolved.source, CommissionSource::Sale);
/// ```
pub fn resolve_commission(
    sale_override: Option<Percent>,
    customer_override: Option<Percent>,
    config: &CommissionConfig,
) -> CommissionResolution {
    if let Some(rate) = sale_override {
        return CommissionResolution {
            rate,
            source: CommissionSource::Sale,
        };
    }

    if let Some(rate) = customer_override {
        return CommissionResolution {
            rate,
            source: CommissionSource::Customer,
        };
    }

    if let Some(rate) = config.custom_percent() {
        return CommissionResolution {
            rate,
            source: CommissionSource::SystemCustom,
        };
    }

    CommissionResolution {
        rate: config.default_percent(),
        source: CommissionSource::SystemDefault,
    }
}

/// Computes the commission amount on a sale's subtotal.
///
/// This is the single source of truth for the commission base: the subtotal
/// ALONE. Callers must never pre-add shipping, discounts, or anything else
/// into the amount passed here.
///
/// ## Example
/// ```rust
/// use tally_core::commission::commission_amount;
/// use tally_core::money::Money;
/// use tally_core::types::Percent;
///
/// let subtotal = Money::from_cents(339_000); // $3,390.00
/// let amount = commission_amount(subtotal, Percent::from_bps(500));
/// assert_eq!(amount.cents(), 16_950); // $169.50, 5% of the subtotal only
/// ```
#[inline]
pub fn commission_amount(subtotal: Money, rate: Percent) -> Money {
    subtotal.apply_percent(rate)
}

// =============================================================================
// Unit Tests
// =============================================================================
