//! # Store Error Types
//!
//! Error types for storage operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  Backend failure (hosted table store, lock, transport)                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StoreError (this module) ← Adds entity context                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DeskError (in tally-desk) ← Serialized for the frontend               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Frontend displays user-friendly message                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Absent settings keys are NOT errors: `fetch` simply returns no record
//! for them, and normalization downstream decides what absence means.

use thiserror::Error;

/// Storage operation errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Entity not found.
    ///
    /// ## When This Occurs
    /// - Deactivating or adjusting a record whose ID doesn't exist
    /// - A stale reference from another screen
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Backend failure (connection, transport, or implementation fault).
    #[error("Store backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a Backend error.
    pub fn backend(message: impl Into<String>) -> Self {
        StoreError::Backend(message.into())
    }
}

/// Result type for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = StoreError::not_found("Product", "p-404");
        assert_eq!(err.to_string(), "Product not found: p-404");
    }
}
