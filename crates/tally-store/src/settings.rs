//! # Settings Store
//!
//! Key-value access to the shop's configuration records.
//!
//! ## How Settings Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Settings Lifecycle                                   │
//! │                                                                         │
//! │  Admin saves config screen                                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  upsert([("shipping_policy", "per_quantity"), ...])                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────┐                           │
//! │  │ settings (key-value table)              │                           │
//! │  │                                         │                           │
//! │  │ shipping_policy         | per_quantity  │                           │
//! │  │ shipping_per_unit_rate  | 5.00          │                           │
//! │  │ commission_default_pct  | 5             │                           │
//! │  └─────────────────────────────────────────┘                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  fetch(keys::ALL) at calculation time ──► raw strings ──► normalize    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Absence Contract
//! A key that was never saved has NO record. `fetch` never synthesizes
//! defaults; "what does absent mean" is answered exactly once, in
//! tally-core's config normalization.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::StoreResult;

// =============================================================================
// Record Type
// =============================================================================

/// One stored configuration entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingRecord {
    pub key: String,
    pub value: String,
    pub updated_at: DateTime<Utc>,
}

/// Collapses fetched records into a key → value map for normalization.
pub fn settings_map(records: Vec<SettingRecord>) -> HashMap<String, String> {
    records.into_iter().map(|r| (r.key, r.value)).collect()
}

// =============================================================================
// Store Trait
// =============================================================================

/// Access to the shop's key-value settings.
///
/// ## Usage
/// ```rust,ignore
/// let records = store.fetch(&keys::ALL).await?;
/// let (config, warnings) = FeeConfig::from_settings(&settings_map(records));
/// ```
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Fetches the records for the requested keys.
    ///
    /// ## Returns
    /// One record per key that exists; absent keys produce no record.
    async fn fetch(&self, keys: &[&str]) -> StoreResult<Vec<SettingRecord>>;

    /// Inserts or replaces settings values (upsert on key conflict).
    async fn upsert(&self, entries: &[(String, String)]) -> StoreResult<()>;
}

// =============================================================================
// In-Memory Implementation
// =============================================================================

/// In-memory settings store for tests and the demo binary.
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    records: RwLock<HashMap<String, SettingRecord>>,
}

impl MemorySettingsStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn fetch(&self, keys: &[&str]) -> StoreResult<Vec<SettingRecord>> {
        let records = self.records.read().expect("settings lock poisoned");

        let found: Vec<SettingRecord> = keys
            .iter()
            .filter_map(|key| records.get(*key).cloned())
            .collect();

        debug!(requested = keys.len(), found = found.len(), "Fetched settings");
        Ok(found)
    }

    async fn upsert(&self, entries: &[(String, String)]) -> StoreResult<()> {
        let mut records = self.records.write().expect("settings lock poisoned");
        let now = Utc::now();

        for (key, value) in entries {
            records.insert(
                key.clone(),
                SettingRecord {
                    key: key.clone(),
                    value: value.clone(),
                    updated_at: now,
                },
            );
        }

        debug!(count = entries.len(), "Upserted settings");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
