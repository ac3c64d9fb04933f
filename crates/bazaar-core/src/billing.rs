//! # Billing Module
//!
//! Pure pieces of the checkout flow: bill-number formatting and the
//! calendar-day window used to derive the per-day sequence.
//!
//! ## Bill Number Format
//! ```text
//! BILL-20260829-003
//! │    │        │
//! │    │        └── per-day sequence, zero-padded to 3 digits, starts at 1
//! │    └─────────── local calendar date, YYYYMMDD
//! └──────────────── fixed prefix
//! ```
//!
//! The sequence is derived, not stored: the coordinator counts the bills
//! created inside the day window and adds one. Uniqueness is ultimately
//! enforced by the database constraint on `bill_number`; the coordinator
//! retries when two checkouts race to the same number.

use chrono::{DateTime, Local, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::BillItem;

// =============================================================================
// Bill Number
// =============================================================================

/// Formats a bill number for the given local date and per-day sequence.
///
/// ## Example
/// ```rust
/// use bazaar_core::billing::format_bill_number;
/// use chrono::NaiveDate;
///
/// let date = NaiveDate::from_ymd_opt(2026, 8, 29).unwrap();
/// assert_eq!(format_bill_number(date, 1), "BILL-20260829-001");
/// assert_eq!(format_bill_number(date, 42), "BILL-20260829-042");
/// ```
pub fn format_bill_number(date: NaiveDate, sequence: u32) -> String {
    format!("BILL-{}-{:03}", date.format("%Y%m%d"), sequence)
}

// =============================================================================
// Day Window
// =============================================================================

/// A half-open calendar-day window `[start, end)` in the server's local
/// time zone, expressed as UTC instants for storage comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    /// Local midnight at the start of the day.
    pub start: DateTime<Utc>,
    /// Local midnight at the start of the NEXT day (exclusive bound).
    pub end: DateTime<Utc>,
    /// The local calendar date the window covers.
    pub date: NaiveDate,
}

impl DayWindow {
    /// Checks whether an instant falls inside the window.
    #[inline]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant < self.end
    }
}

/// Computes the calendar-day window containing `now`.
///
/// ## Why half-open?
/// `[00:00, 24:00)` has no gap at `23:59:59.999...`; a bill created in the
/// last millisecond of the day still lands in today's window.
pub fn day_window(now: DateTime<Local>) -> DayWindow {
    let date = now.date_naive();
    let next = date.succ_opt().unwrap_or(date);

    DayWindow {
        start: local_midnight(date),
        end: local_midnight(next),
        date,
    }
}

/// Resolves local midnight of `date` to a UTC instant.
///
/// DST transitions can make local midnight ambiguous or nonexistent; the
/// earliest valid interpretation wins, falling back to UTC midnight when
/// the local time zone skips it entirely.
fn local_midnight(date: NaiveDate) -> DateTime<Utc> {
    let naive = date.and_time(NaiveTime::MIN);
    match Local.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt.with_timezone(&Utc),
        LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
        LocalResult::None => Utc.from_utc_datetime(&naive),
    }
}

// =============================================================================
// Checkout Input
// =============================================================================

/// The input to checkout: a cart plus caller-computed totals.
///
/// ## Contract
/// Totals are supplied by the caller and persisted verbatim; they are
/// validated for sign at the boundary but never recomputed server-side.
/// `items` must be non-empty with positive quantities.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBill {
    /// Customer to attribute the sale to, if any.
    #[serde(default)]
    pub customer_id: Option<String>,

    /// Customer name snapshot, if any.
    #[serde(default)]
    pub customer_name: Option<String>,

    /// Ordered line items (snapshots of the products being sold).
    pub items: Vec<BillItem>,

    pub subtotal: Money,

    pub tax: Money,

    pub total: Money,

    /// Defaults to `cash` when omitted, matching walk-in checkout.
    #[serde(default = "default_payment_method")]
    pub payment_method: String,
}

fn default_payment_method() -> String {
    crate::DEFAULT_PAYMENT_METHOD.to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bill_number() {
        let date = NaiveDate::from_ymd_opt(2023, 6, 1).unwrap();
        assert_eq!(format_bill_number(date, 1), "BILL-20230601-001");
        assert_eq!(format_bill_number(date, 99), "BILL-20230601-099");
        assert_eq!(format_bill_number(date, 100), "BILL-20230601-100");
    }

    #[test]
    fn test_format_bill_number_wide_sequence() {
        // Busy day past 999 bills: the number grows instead of wrapping
        let date = NaiveDate::from_ymd_opt(2023, 6, 1).unwrap();
        assert_eq!(format_bill_number(date, 1000), "BILL-20230601-1000");
    }

    #[test]
    fn test_day_window_contains_now() {
        let now = Local::now();
        let window = day_window(now);

        assert!(window.contains(now.with_timezone(&Utc)));
        assert!(window.start < window.end);
        assert_eq!(window.date, now.date_naive());
    }

    #[test]
    fn test_day_window_excludes_neighbors() {
        let now = Local::now();
        let window = day_window(now);

        assert!(!window.contains(window.end));
        assert!(!window.contains(window.start - chrono::Duration::milliseconds(1)));
        assert!(window.contains(window.start));
    }

    #[test]
    fn test_new_bill_defaults() {
        let json = r#"{
            "items": [
                {"productId": "p1", "barcode": "111", "name": "Milk", "price": 2.5, "quantity": 2}
            ],
            "subtotal": 5.0,
            "tax": 0.5,
            "total": 5.5
        }"#;

        let bill: NewBill = serde_json::from_str(json).unwrap();
        assert_eq!(bill.payment_method, "cash");
        assert!(bill.customer_id.is_none());
        assert_eq!(bill.items[0].price.cents(), 250);
        assert_eq!(bill.total.cents(), 550);
    }
}
