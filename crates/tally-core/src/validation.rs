//! # Validation Module
//!
//! Input validation utilities for Tally Sales.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Frontend (TypeScript)                                        │
//! │  ├── Basic format checks (empty, length)                               │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Desk Service (Rust)                                          │
//! │  ├── Type validation (deserialization)                                 │
//! │  └── THIS MODULE: Business rule validation                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Hosted Table Store                                           │
//! │  ├── NOT NULL constraints                                              │
//! │  └── Foreign key constraints                                           │
//! │                                                                         │
//! │  Defense in depth: Multiple layers catch different errors              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Bad FORM input fails fast here, before any calculator runs. Bad STORED
//! config never fails at all: loading normalizes it to zero with a warning,
//! because a settings typo must not block the sale counter.
//!
//! ## Usage
//! ```rust,no_run
//! use tally_core::validation::{validate_product_name, validate_quantity};
//!
//! // Validate product name before a catalog save
//! validate_product_name("Resin Keychain").unwrap();
//!
//! // Validate quantity before adding a sale line
//! validate_quantity(5).unwrap();
//! ```

use std::str::FromStr;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{Percent, ShippingPolicy};
use crate::MAX_LINE_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty
/// - Must be between 1 and 200 characters
///
/// ## Example
/// ```rust
/// use tally_core::validation::validate_product_name;
///
/// assert!(validate_product_name("Resin Keychain").is_ok());
/// assert!(validate_product_name("").is_err());
/// ```
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a customer name. Same rules as product names.
pub fn validate_customer_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "customer name".to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "customer name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quantity entered on the sale form.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_LINE_QUANTITY (9999)
///
/// Zero and negative quantities can still EXIST on imported lines; the
/// calculators handle those by flagging. This guard is for the form path,
/// where typing 0 or -3 is always a mistake worth stopping.
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price in cents.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (free items)
///
/// ## Example
/// ```rust
/// use tally_core::validation::validate_price_cents;
///
/// assert!(validate_price_cents(1099).is_ok());  // $10.99
/// assert!(validate_price_cents(0).is_ok());     // Free item
/// assert!(validate_price_cents(-100).is_err()); // Invalid
/// ```
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a shipping rate in cents.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed and meaningful ("ships free")
pub fn validate_shipping_rate_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "shipping rate".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a discount in cents.
///
/// ## Rules
/// - Must be non-negative (>= 0)
pub fn validate_discount_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "discount".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a commission rate in basis points.
///
/// ## Rules
/// - Must be between 0 and 10000 (0% to 100%)
/// - Zero is allowed and meaningful (a no-commission arrangement)
pub fn validate_commission_bps(bps: u32) -> ValidationResult<()> {
    if bps > Percent::MAX_BPS {
        return Err(ValidationError::OutOfRange {
            field: "commission rate".to_string(),
            min: 0,
            max: Percent::MAX_BPS as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Form Field Parsers
// =============================================================================

/// Parses a monetary form field, failing fast on non-numeric input.
///
/// ## Example
/// ```rust
/// use tally_core::validation::parse_money_field;
///
/// assert_eq!(parse_money_field("flat rate", "15.50").unwrap().cents(), 1550);
/// assert!(parse_money_field("flat rate", "abc").is_err());
/// ```
pub fn parse_money_field(field: &str, raw: &str) -> ValidationResult<Money> {
    Money::from_str(raw).map_err(|err| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: err.to_string(),
    })
}

/// Parses a percentage form field, failing fast on non-numeric input.
pub fn parse_percent_field(field: &str, raw: &str) -> ValidationResult<Percent> {
    let rate = Percent::from_str(raw).map_err(|err| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: err.to_string(),
    })?;
    validate_commission_bps(rate.bps())?;
    Ok(rate)
}

/// Parses the shipping policy selector from the settings form.
///
/// Forms must submit a known policy; only the LOADER tolerates junk strings
/// (by disabling shipping with a warning), because stored junk predates the
/// form validation.
pub fn parse_policy_field(raw: &str) -> ValidationResult<ShippingPolicy> {
    ShippingPolicy::from_str(raw).map_err(|_| ValidationError::NotAllowed {
        field: "shipping policy".to_string(),
        allowed: vec![
            ShippingPolicy::PerProduct.as_str().to_string(),
            ShippingPolicy::PerOrder.as_str().to_string(),
            ShippingPolicy::PerQuantity.as_str().to_string(),
        ],
    })
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string format.
///
/// ## Rules
/// - Must be a valid UUID v4 format
/// - 36 characters with hyphens: xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx
///
/// ## Example
/// ```rust
/// use tally_core::validation::validate_uuid;
///
/// assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("not-a-uuid").is_err());
/// ```
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    // Try to parse as UUID
    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_product_name() {
        assert!(validate_product_name("Resin Keychain").is_ok());
        assert!(validate_product_name("").is_err());
        assert!(validate_product_name("   ").is_err());
        assert!(validate_product_name(&"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(69).is_ok());
        assert!(validate_quantity(9999).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(10000).is_err());
    }

    #[test]
    fn test_validate_price_cents() {
        assert!(validate_price_cents(0).is_ok());
        assert!(validate_price_cents(1099).is_ok());
        assert!(validate_price_cents(-100).is_err());
    }

    #[test]
    fn test_validate_shipping_rate_allows_zero() {
        assert!(validate_shipping_rate_cents(0).is_ok());
        assert!(validate_shipping_rate_cents(500).is_ok());
        assert!(validate_shipping_rate_cents(-1).is_err());
    }

    #[test]
    fn test_validate_commission_bps() {
        assert!(validate_commission_bps(0).is_ok());
        assert!(validate_commission_bps(500).is_ok());
        assert!(validate_commission_bps(10000).is_ok());
        assert!(validate_commission_bps(10001).is_err());
    }

    #[test]
    fn test_parse_money_field() {
        assert_eq!(parse_money_field("flat rate", "15").unwrap().cents(), 1500);
        assert!(parse_money_field("flat rate", "abc").is_err());
        assert!(parse_money_field("flat rate", "").is_err());
    }

    #[test]
    fn test_parse_percent_field_enforces_range() {
        assert_eq!(parse_percent_field("rate", "5").unwrap().bps(), 500);
        assert!(parse_percent_field("rate", "150").is_err());
        assert!(parse_percent_field("rate", "-5").is_err());
    }

    #[test]
    fn test_parse_policy_field() {
        assert!(parse_policy_field("per_quantity").is_ok());
        let err = parse_policy_field("flat").unwrap_err();
        assert!(matches!(err, ValidationError::NotAllowed { .. }));
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_uuid("").is_err());
        assert!(validate_uuid("not-a-uuid").is_err());
        assert!(validate_uuid("123").is_err());
    }
}
