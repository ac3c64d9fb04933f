//! # Bill Repository
//!
//! Read and status-update operations for bills.
//!
//! ## Split of Responsibilities
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Bill Write Paths                                  │
//! │                                                                         │
//! │  CREATE ──────► crate::checkout (one transaction: bill + items +       │
//! │                 stock decrements + customer spend)                      │
//! │                                                                         │
//! │  STATUS CHANGE ► update_status() here (completed|pending|cancelled)    │
//! │                                                                         │
//! │  Everything else is read-only. Bills are never edited or deleted;      │
//! │  a mistake becomes a cancelled bill, not a rewritten one.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use bazaar_core::{Bill, BillItem, BillStatus};

/// Column list shared by every bill SELECT; aliases the cents columns onto
/// the Money-typed fields. `items` is absent on purpose and loaded from
/// bill_items afterwards.
const BILL_COLUMNS: &str = "id, bill_number, customer_id, customer_name, \
     subtotal_cents AS subtotal, tax_cents AS tax, total_cents AS total, \
     payment_method, status, created_at, updated_at";

/// Repository for bill database operations.
#[derive(Debug, Clone)]
pub struct BillRepository {
    pool: SqlitePool,
}

impl BillRepository {
    /// Creates a new BillRepository.
    pub fn new(pool: SqlitePool) -> Self {
        BillRepository { pool }
    }

    /// Lists all bills, most recent first, with items attached.
    pub async fn list_recent(&self) -> DbResult<Vec<Bill>> {
        let query = format!("SELECT {BILL_COLUMNS} FROM bills ORDER BY created_at DESC");
        let bills = sqlx::query_as::<_, Bill>(&query)
            .fetch_all(&self.pool)
            .await?;

        self.attach_items(bills).await
    }

    /// Lists one customer's bills, most recent first, with items attached.
    pub async fn list_for_customer(&self, customer_id: &str) -> DbResult<Vec<Bill>> {
        let query = format!(
            "SELECT {BILL_COLUMNS} FROM bills WHERE customer_id = ?1 ORDER BY created_at DESC"
        );
        let bills = sqlx::query_as::<_, Bill>(&query)
            .bind(customer_id)
            .fetch_all(&self.pool)
            .await?;

        self.attach_items(bills).await
    }

    /// Gets a bill by ID, with items attached.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Bill>> {
        let query = format!("SELECT {BILL_COLUMNS} FROM bills WHERE id = ?1");
        let bill = sqlx::query_as::<_, Bill>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match bill {
            Some(mut bill) => {
                bill.items = self.get_items(&bill.id).await?;
                Ok(Some(bill))
            }
            None => Ok(None),
        }
    }

    /// Counts bills created inside `[start, end)`.
    ///
    /// Checkout runs this same count inside its transaction; this public
    /// variant serves reporting and tests.
    pub async fn count_created_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM bills WHERE created_at >= ?1 AND created_at < ?2",
        )
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Updates a bill's status and bumps updated_at.
    ///
    /// ## Note
    /// Cancelling does NOT restore stock or claw back customer spend; see
    /// the repository docs above.
    ///
    /// ## Returns
    /// The updated bill with items attached.
    pub async fn update_status(&self, id: &str, status: BillStatus) -> DbResult<Bill> {
        debug!(id = %id, ?status, "Updating bill status");

        let now = Utc::now();

        let result = sqlx::query("UPDATE bills SET status = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(id)
            .bind(status)
            .bind(now)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Bill", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Bill", id))
    }

    /// Gets the ordered line items for a bill.
    pub async fn get_items(&self, bill_id: &str) -> DbResult<Vec<BillItem>> {
        let items = sqlx::query_as::<_, BillItem>(
            r#"
            SELECT product_id, barcode, name, price_cents AS price, quantity
            FROM bill_items
            WHERE bill_id = ?1
            ORDER BY position
            "#,
        )
        .bind(bill_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Loads items for a batch of bills (listing path).
    async fn attach_items(&self, mut bills: Vec<Bill>) -> DbResult<Vec<Bill>> {
        for bill in &mut bills {
            bill.items = self.get_items(&bill.id).await?;
        }
        Ok(bills)
    }
}
