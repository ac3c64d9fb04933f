//! # Domain Types
//!
//! Core domain types used throughout Bazaar POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │    Customer     │   │      Bill       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  barcode (biz)  │   │  email (unique) │   │  bill_number    │       │
//! │  │  price (Money)  │   │  total_spent    │   │  items []       │       │
//! │  │  stock          │   │  last_purchase  │   │  totals, status │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business ID: (barcode, email, bill_number) - human-readable, unique

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Barcode (EAN-13, UPC-A, etc.) - business identifier, unique.
    pub barcode: String,

    /// Display name shown at checkout and on receipts.
    pub name: String,

    /// Free-form category for catalog grouping.
    pub category: String,

    /// Unit price.
    pub price: Money,

    /// Current stock level. Mutated absolutely by catalog edits and
    /// decremented (never below zero) by checkout.
    pub stock: i64,

    /// Threshold at or below which the product is flagged as low stock.
    pub min_stock: i64,

    /// When the product was created.
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Checks whether this product is at or below its low-stock threshold.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.stock <= self.min_stock
    }

    /// Checks whether `quantity` units can be sold without overselling.
    #[inline]
    pub fn can_sell(&self, quantity: i64) -> bool {
        self.stock >= quantity
    }
}

// =============================================================================
// Customer
// =============================================================================

/// Customer account status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum CustomerStatus {
    Active,
    Inactive,
}

impl Default for CustomerStatus {
    fn default() -> Self {
        CustomerStatus::Active
    }
}

/// A customer in the store directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    /// Unique identifier (UUID v4).
    pub id: String,

    pub name: String,

    /// Email address - business identifier, unique across all customers.
    pub email: String,

    pub phone: String,

    pub address: String,

    /// Cumulative spend. Grows only via checkout; the reconcile operation
    /// can recompute it from bill history.
    pub total_spent: Money,

    /// Timestamp of the most recent purchase, if any.
    pub last_purchase: Option<DateTime<Utc>>,

    pub status: CustomerStatus,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Bill Status
// =============================================================================

/// The status of a bill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum BillStatus {
    /// Paid and finalized. Checkout always creates bills in this state.
    Completed,
    /// Awaiting settlement (set via status update only).
    Pending,
    /// Cancelled after the fact. Stock is NOT restored automatically.
    Cancelled,
}

impl BillStatus {
    /// Parses a wire-format status string (`completed|pending|cancelled`).
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "completed" => Some(BillStatus::Completed),
            "pending" => Some(BillStatus::Pending),
            "cancelled" => Some(BillStatus::Cancelled),
            _ => None,
        }
    }
}

impl Default for BillStatus {
    fn default() -> Self {
        BillStatus::Completed
    }
}

// =============================================================================
// Bill Item
// =============================================================================

/// A line item in a bill.
///
/// Uses the snapshot pattern: barcode, name, and price are frozen copies of
/// the product at sale time, so later catalog edits never alter history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct BillItem {
    /// Product this line refers to.
    pub product_id: String,
    /// Barcode at time of sale (frozen).
    pub barcode: String,
    /// Product name at time of sale (frozen).
    pub name: String,
    /// Unit price at time of sale (frozen).
    pub price: Money,
    /// Quantity sold (always positive).
    pub quantity: i64,
}

impl BillItem {
    /// Returns the line total (unit price × quantity).
    #[inline]
    pub fn line_total(&self) -> Money {
        self.price.multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Bill
// =============================================================================

/// A persisted sale transaction with its line items.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    pub id: String,

    /// Human-facing number in the format `BILL-YYYYMMDD-NNN`, unique.
    pub bill_number: String,

    /// Customer reference, if the sale was attributed to one.
    pub customer_id: Option<String>,

    /// Customer name snapshot at sale time.
    pub customer_name: Option<String>,

    /// Ordered line items, never empty. Loaded from the bill_items table,
    /// not from the bills row itself.
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    pub items: Vec<BillItem>,

    /// Sum of line totals, as supplied by the caller.
    pub subtotal: Money,

    /// Tax amount, as supplied by the caller.
    pub tax: Money,

    /// Grand total (subtotal + tax), as supplied by the caller.
    pub total: Money,

    /// Payment method (`cash`, `card`, `mobile`, or a custom label).
    pub payment_method: String,

    pub status: BillStatus,

    /// Set at insertion.
    pub created_at: DateTime<Utc>,

    /// Set on insertion and on every status change.
    pub updated_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_low_stock_flag() {
        let now = Utc::now();
        let mut product = Product {
            id: "p1".to_string(),
            barcode: "111".to_string(),
            name: "Milk".to_string(),
            category: "Dairy".to_string(),
            price: Money::from_cents(250),
            stock: 5,
            min_stock: 5,
            created_at: now,
            updated_at: now,
        };

        assert!(product.is_low_stock());
        product.stock = 6;
        assert!(!product.is_low_stock());
    }

    #[test]
    fn test_can_sell() {
        let now = Utc::now();
        let product = Product {
            id: "p1".to_string(),
            barcode: "111".to_string(),
            name: "Milk".to_string(),
            category: "Dairy".to_string(),
            price: Money::from_cents(250),
            stock: 3,
            min_stock: 0,
            created_at: now,
            updated_at: now,
        };

        assert!(product.can_sell(3));
        assert!(!product.can_sell(4));
    }

    #[test]
    fn test_bill_status_parse() {
        assert_eq!(BillStatus::parse("completed"), Some(BillStatus::Completed));
        assert_eq!(BillStatus::parse("pending"), Some(BillStatus::Pending));
        assert_eq!(BillStatus::parse("cancelled"), Some(BillStatus::Cancelled));
        assert_eq!(BillStatus::parse("refunded"), None);
    }

    #[test]
    fn test_bill_item_line_total() {
        let item = BillItem {
            product_id: "p1".to_string(),
            barcode: "111".to_string(),
            name: "Milk".to_string(),
            price: Money::from_cents(250),
            quantity: 2,
        };
        assert_eq!(item.line_total().cents(), 500);
    }

    #[test]
    fn test_status_wire_format() {
        let json = serde_json::to_string(&BillStatus::Cancelled).unwrap();
        assert_eq!(json, "\"cancelled\"");

        let status: CustomerStatus = serde_json::from_str("\"inactive\"").unwrap();
        assert_eq!(status, CustomerStatus::Inactive);
    }
}
