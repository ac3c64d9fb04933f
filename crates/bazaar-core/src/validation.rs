//! # Validation Module
//!
//! Input validation for Bazaar POS.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP boundary (apps/server)                                  │
//! │  ├── Type validation (serde deserialization)                           │
//! │  └── THIS MODULE: field and whole-request validation → 400 responses   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Checkout coordinator (bazaar-db)                             │
//! │  ├── Referential checks (product/customer exist)                       │
//! │  └── Stock guard (no oversell)                                         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL constraints                                              │
//! │  ├── UNIQUE constraints (barcode, email, bill_number)                  │
//! │  └── Foreign key constraints                                           │
//! │                                                                         │
//! │  Defense in depth: validation failures never reach the coordinator     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::billing::NewBill;
use crate::error::ValidationError;
use crate::money::Money;
use crate::{MAX_BILL_ITEMS, MAX_ITEM_QUANTITY};

/// Result type for single-field validation.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product barcode.
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 64 characters
/// - Digits, letters, and hyphens only (covers EAN/UPC plus internal codes)
///
/// ## Example
/// ```rust
/// use bazaar_core::validation::validate_barcode;
///
/// assert!(validate_barcode("5449000000996").is_ok());
/// assert!(validate_barcode("").is_err());
/// ```
pub fn validate_barcode(barcode: &str) -> ValidationResult<()> {
    let barcode = barcode.trim();

    if barcode.is_empty() {
        return Err(ValidationError::Required {
            field: "barcode".to_string(),
        });
    }

    if barcode.len() > 64 {
        return Err(ValidationError::TooLong {
            field: "barcode".to_string(),
            max: 64,
        });
    }

    if !barcode.chars().all(|c| c.is_alphanumeric() || c == '-') {
        return Err(ValidationError::InvalidFormat {
            field: "barcode".to_string(),
            reason: "must contain only letters, numbers, and hyphens".to_string(),
        });
    }

    Ok(())
}

/// Validates a display name (product or customer).
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 200 characters
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates an email address.
///
/// ## Rules
/// Lightweight shape check: one `@` with non-empty local part and a domain
/// containing a dot. Deliverability is not our problem; uniqueness is the
/// database's.
///
/// ## Example
/// ```rust
/// use bazaar_core::validation::validate_email;
///
/// assert!(validate_email("jo@example.com").is_ok());
/// assert!(validate_email("not-an-email").is_err());
/// ```
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::Required {
            field: "email".to_string(),
        });
    }

    let invalid = || ValidationError::InvalidFormat {
        field: "email".to_string(),
        reason: "must look like name@domain.tld".to_string(),
    };

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty()
        || domain.is_empty()
        || !domain.contains('.')
        || domain.starts_with('.')
        || domain.ends_with('.')
        || email.chars().any(char::is_whitespace)
        || domain.contains('@')
    {
        return Err(invalid());
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line-item quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates that a monetary amount is zero or greater.
///
/// ## Example
/// ```rust
/// use bazaar_core::money::Money;
/// use bazaar_core::validation::validate_non_negative;
///
/// assert!(validate_non_negative("price", Money::from_cents(0)).is_ok());
/// assert!(validate_non_negative("price", Money::from_cents(-1)).is_err());
/// ```
pub fn validate_non_negative(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::MustBeNonNegative {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates a stock or threshold count.
pub fn validate_stock(field: &str, count: i64) -> ValidationResult<()> {
    if count < 0 {
        return Err(ValidationError::MustBeNonNegative {
            field: field.to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Whole-Request Validators
// =============================================================================

/// Validates a checkout request, collecting every field error.
///
/// ## What Gets Checked
/// - items non-empty and within MAX_BILL_ITEMS
/// - each item: product reference present, snapshot fields present,
///   positive quantity, non-negative price
/// - subtotal/tax/total non-negative
/// - payment method non-empty
///
/// This runs at the HTTP boundary; the checkout coordinator can assume a
/// well-formed cart and only worries about consistency.
pub fn validate_new_bill(bill: &NewBill) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if bill.items.is_empty() {
        errors.push(ValidationError::Required {
            field: "items".to_string(),
        });
    }

    if bill.items.len() > MAX_BILL_ITEMS {
        errors.push(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 1,
            max: MAX_BILL_ITEMS as i64,
        });
    }

    for (index, item) in bill.items.iter().enumerate() {
        let field = |name: &str| format!("items[{index}].{name}");

        if item.product_id.trim().is_empty() {
            errors.push(ValidationError::Required {
                field: field("productId"),
            });
        }
        if item.name.trim().is_empty() {
            errors.push(ValidationError::Required {
                field: field("name"),
            });
        }
        if let Err(err) = validate_quantity(item.quantity) {
            errors.push(rename_field(err, field("quantity")));
        }
        if let Err(err) = validate_non_negative(&field("price"), item.price) {
            errors.push(err);
        }
    }

    for (field, amount) in [
        ("subtotal", bill.subtotal),
        ("tax", bill.tax),
        ("total", bill.total),
    ] {
        if let Err(err) = validate_non_negative(field, amount) {
            errors.push(err);
        }
    }

    if bill.payment_method.trim().is_empty() {
        errors.push(ValidationError::Required {
            field: "paymentMethod".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Rewrites a validator's generic field name to its indexed position.
fn rename_field(err: ValidationError, field: String) -> ValidationError {
    match err {
        ValidationError::Required { .. } => ValidationError::Required { field },
        ValidationError::TooLong { max, .. } => ValidationError::TooLong { field, max },
        ValidationError::OutOfRange { min, max, .. } => {
            ValidationError::OutOfRange { field, min, max }
        }
        ValidationError::MustBePositive { .. } => ValidationError::MustBePositive { field },
        ValidationError::MustBeNonNegative { .. } => ValidationError::MustBeNonNegative { field },
        ValidationError::InvalidFormat { reason, .. } => {
            ValidationError::InvalidFormat { field, reason }
        }
        ValidationError::NotAllowed { allowed, .. } => {
            ValidationError::NotAllowed { field, allowed }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
