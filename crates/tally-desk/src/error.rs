//! # Desk Error Type
//!
//! Unified error type for desk operations.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Tally Sales                            │
//! │                                                                         │
//! │  Frontend                    Rust Backend                               │
//! │  ────────                    ────────────                               │
//! │                                                                         │
//! │  invoke('add_item')                                                     │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Desk Method                                                     │  │
//! │  │  Result<T, DeskError>                                            │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Store Error? ──── StoreError::NotFound ──────────┐             │  │
//! │  │         │                                          │             │  │
//! │  │         ▼                                          ▼             │  │
//! │  │  Domain Error? ─── CoreError::ProductInactive ── DeskError ────► │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────► │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  try {                                                                  │
//! │    await invoke('add_item')                                             │
//! │  } catch (e) {                                                          │
//! │    // e.message = "Product not found: abc-123"                          │
//! │    // e.code = "NOT_FOUND"                                              │
//! │  }                                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The UI shell requires errors to be serializable. We implement `Serialize`
//! and include both a machine-readable `code` and human-readable `message`.

use serde::Serialize;
use tally_core::{CoreError, ValidationError};
use tally_store::StoreError;

/// Error returned from desk operations.
///
/// ## Serialization
/// This is what the frontend receives when an operation fails:
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Product not found: abc-123"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeskError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for desk responses.
///
/// ## Usage in Frontend
/// ```typescript
/// try {
///   await invoke('add_item', { productId, quantity });
/// } catch (e) {
///   switch (e.code) {
///     case 'NOT_FOUND':
///       showNotification('Product not found');
///       break;
///     case 'VALIDATION_ERROR':
///       showForm(e.message);
///       break;
///     default:
///       showError('An error occurred');
///   }
/// }
/// ```
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,

    /// Input validation failed (400)
    ValidationError,

    /// Storage operation failed (500)
    StoreError,

    /// Business rule violation (422)
    BusinessLogic,

    /// Sale session operation failed
    SessionError,

    /// Internal error (500)
    Internal,
}

impl DeskError {
    /// Creates a new desk error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        DeskError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        DeskError::new(
            ErrorCode::NotFound,
            format!("{} not found: {}", resource, id),
        )
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        DeskError::new(ErrorCode::ValidationError, message)
    }

    /// Creates a session error.
    pub fn session(message: impl Into<String>) -> Self {
        DeskError::new(ErrorCode::SessionError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        DeskError::new(ErrorCode::Internal, message)
    }
}

/// Converts core errors to desk errors.
impl From<CoreError> for DeskError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::LineNotFound { product_id } => {
                DeskError::not_found("Line item", &product_id)
            }
            CoreError::ProductInactive { name } => DeskError::new(
                ErrorCode::BusinessLogic,
                format!("Product '{}' is inactive", name),
            ),
            CoreError::SaleTooLarge { max } => DeskError::session(format!(
                "A sale cannot have more than {} line items",
                max
            )),
            CoreError::QuantityTooLarge { requested, max } => DeskError::validation(format!(
                "Quantity {} exceeds maximum allowed ({})",
                requested, max
            )),
            CoreError::EmptySale => {
                DeskError::validation("Cannot finalize a sale with no line items")
            }
            CoreError::Validation(e) => DeskError::validation(e.to_string()),
        }
    }
}

/// Converts validation errors to desk errors.
impl From<ValidationError> for DeskError {
    fn from(err: ValidationError) -> Self {
        DeskError::validation(err.to_string())
    }
}

/// Converts store errors to desk errors.
impl From<StoreError> for DeskError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } => DeskError::not_found(&entity, &id),
            StoreError::Backend(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Store backend error: {}", e);
                DeskError::new(ErrorCode::StoreError, "Store operation failed")
            }
        }
    }
}

impl std::fmt::Display for DeskError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for DeskError {}

/// Result type for desk operations.
pub type DeskResult<T> = Result<T, DeskError>;

// =============================================================================
// Unit Tests
// =============================================================================
