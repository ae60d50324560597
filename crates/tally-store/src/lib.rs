//! # tally-store: Storage Seams for Tally Sales
//!
//! This crate provides record access for the Tally Sales system through
//! narrow async traits, with in-memory implementations for tests and the
//! demo binary. Production deployments put the hosted table store behind
//! the same traits.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tally Sales Data Flow                            │
//! │                                                                         │
//! │  Desk service (preview, checkout, config screens)                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    tally-store (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │ SettingsStore │    │ProductCatalog │    │   Customer   │  │   │
//! │  │   │               │    │               │    │  Directory   │  │   │
//! │  │   │ fetch/upsert  │    │ get/list/save │    │ get/list/save│  │   │
//! │  │   │ key-value     │    │ stock deltas  │    │  overrides   │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Hosted table store (external collaborator) or in-memory maps          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`error`] - Store error types
//! - [`settings`] - Key-value settings access
//! - [`products`] - Product catalog access
//! - [`customers`] - Customer directory access
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tally_store::{MemorySettingsStore, SettingsStore};
//!
//! let store = MemorySettingsStore::new();
//! store.upsert(&[("shipping_policy".into(), "per_order".into())]).await?;
//! let records = store.fetch(&["shipping_policy"]).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod customers;
pub mod error;
pub mod products;
pub mod settings;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{StoreError, StoreResult};

pub use customers::{CustomerDirectory, MemoryDirectory};
pub use products::{MemoryCatalog, ProductCatalog};
pub use settings::{settings_map, MemorySettingsStore, SettingRecord, SettingsStore};
