//! # tally-core: Pure Business Logic for Tally Sales
//!
//! This crate is the **heart** of Tally Sales. It contains all business logic
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Tally Sales Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     Frontend (Web UI)                           │   │
//! │  │    Sale Form ──► Live Preview ──► Checkout ──► Reports         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ serialized DTOs                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 Desk Service (tally-desk)                       │   │
//! │  │    add_item, preview, checkout, update_fee_config, report      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ tally-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │  shipping │  │commission │  │   sale    │  │  config   │  │   │
//! │  │   │  3 modes  │  │  4-level  │  │   draft   │  │ normalize │  │   │
//! │  │   │  + audit  │  │   chain   │  │ pipeline  │  │   once    │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  tally-store (Storage Seams)                    │   │
//! │  │         settings, product catalog, customer directory           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Customer, LineItem, Sale, Percent)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`error`] - Domain error types
//! - [`validation`] - Form input validation
//! - [`config`] - One-time normalization of raw settings into typed configs
//! - [`shipping`] - The three shipping policies plus the audit explanation
//! - [`commission`] - The four-level commission override chain
//! - [`totals`] - Subtotal and the settlement formula
//! - [`sale`] - The sale draft and the pricing pipeline
//! - [`report`] - Aggregation over completed sales
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system, and clock access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//! 5. **Set Zero Wins**: An explicitly configured zero rate is a real value,
//!    never a fall-through to some default
//!
//! ## Example Usage
//!
//! ```rust
//! use tally_core::money::Money;
//! use tally_core::types::Percent;
//!
//! // Create money from cents (never from floats!)
//! let subtotal = Money::from_cents(339_000); // $3390.00
//!
//! // Commission applies to the subtotal alone, rounding exactly once
//! let rate = Percent::from_bps(500); // 5%
//! let commission = subtotal.apply_percent(rate);
//!
//! assert_eq!(commission.cents(), 16_950); // $169.50
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod commission;
pub mod config;
pub mod error;
pub mod money;
pub mod report;
pub mod sale;
pub mod shipping;
pub mod totals;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use tally_core::Money` instead of
// `use tally_core::money::Money`

pub use config::{CommissionConfig, FeeConfig};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use sale::{price_draft, SaleDraft, SalePricing};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct line items allowed in a single sale
///
/// ## Business Reason
/// Prevents runaway drafts and keeps the sale form usable. Can be made
/// configurable per shop in future versions.
pub const MAX_SALE_ITEMS: usize = 100;

/// Maximum quantity of a single line item
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 10000 instead of 100).
/// Configurable per shop in future versions.
pub const MAX_LINE_QUANTITY: i64 = 9999;
