//! # Tally Desk
//!
//! The service layer a UI shell talks to. One [`Desk`] per sale counter:
//! it owns the in-progress draft, reaches the catalog, directory, and
//! settings through the store seams, and runs every figure through
//! tally-core.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         tally-desk                                      │
//! │                                                                         │
//! │  ┌───────────────────────────────────────────────────────────────────┐ │
//! │  │                        Desk (service.rs)                          │ │
//! │  │                                                                   │ │
//! │  │   add_item · update_item · select_customer · set_discount         │ │
//! │  │   preview · checkout · fee_config · commission_config             │ │
//! │  │   save_product · save_customer · report                           │ │
//! │  └───────┬──────────────────────┬───────────────────────┬────────────┘ │
//! │          │                      │                       │              │
//! │          ▼                      ▼                       ▼              │
//! │  ┌──────────────┐      ┌──────────────┐       ┌──────────────┐        │
//! │  │ SessionState │      │  tally-core  │       │  tally-store │        │
//! │  │  (state/)    │      │   pricing    │       │    seams     │        │
//! │  └──────────────┘      └──────────────┘       └──────────────┘        │
//! │                                                                         │
//! │  Errors cross the boundary as DeskError { code, message } (error.rs)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. **No arithmetic here.** Every cent and every rate comes out of
//!    tally-core; the desk only moves data between the session and the
//!    stores.
//! 2. **Fetch config late.** Pricing operations re-read settings on each
//!    call so an admin edit lands on the very next preview.
//! 3. **Validate at the door.** Form input is parsed and rejected in the
//!    desk; stored values are normalized leniently in core.

pub mod error;
pub mod service;
pub mod state;

pub use error::{DeskError, DeskResult, ErrorCode};
pub use service::{CommissionConfigResponse, Desk, FeeConfigResponse, SalePreview, SessionView};
pub use state::SessionState;

use tracing_subscriber::EnvFilter;

/// Initializes the tracing subscriber for binaries embedding the desk.
///
/// Respects `RUST_LOG` when set; defaults to info with debug-level desk
/// and core events otherwise.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tally_desk=debug,tally_core=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}
