//! # Checkout Coordinator
//!
//! The one write path with multi-entity consistency requirements: turning a
//! cart into a persisted bill while decrementing stock and crediting the
//! customer's cumulative spend.
//!
//! ## The Checkout Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  createBill, one SQLite transaction                     │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │   1. COUNT bills inside today's local-day window                        │
//! │   2. bill_number = BILL-YYYYMMDD-<count+1, zero-padded>                  │
//! │   3. INSERT bill row (status = completed)                               │
//! │   4. INSERT one bill_items row per line, position-ordered               │
//! │   5. Per item: UPDATE products                                          │
//! │        SET stock = stock - qty WHERE id = ? AND stock >= qty            │
//! │        0 rows → missing product or oversell → ROLLBACK                  │
//! │   6. If customer attached: UPDATE customers                             │
//! │        SET total_spent += total, last_purchase = now                    │
//! │        0 rows → unknown customer → ROLLBACK                             │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  All four effects land together or not at all.                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## The Bill-Number Race
//! Two checkouts in the same day window can both observe count N and mint
//! number N+1. The UNIQUE index on bills.bill_number makes exactly one of
//! them commit; the loser's transaction is rolled back and retried from the
//! count, picking up the winner's bill. Bounded attempts, then surface the
//! conflict.
//!
//! ## Deliberately NOT Idempotent
//! Two identical carts are two sales. Retrying a createBill call after a
//! reported success double-sells; clients must not do that.

use chrono::{Local, Utc};
use sqlx::{Sqlite, SqlitePool, Transaction};
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::DbError;
use bazaar_core::billing::{day_window, format_bill_number, NewBill};
use bazaar_core::{Bill, BillStatus, CoreError};

/// Attempts before a persistent bill-number conflict is surfaced.
const MAX_SEQUENCE_ATTEMPTS: u32 = 3;

// =============================================================================
// Errors
// =============================================================================

/// Checkout failures, split by who is at fault.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Business rule violation: unknown product/customer, oversell.
    /// The transaction was rolled back; nothing was persisted.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Persistence failure (including a bill-number conflict that survived
    /// every retry). The transaction was rolled back.
    #[error(transparent)]
    Db(#[from] DbError),
}

/// Result type for checkout operations.
pub type CheckoutResult<T> = Result<T, CheckoutError>;

// =============================================================================
// Coordinator
// =============================================================================

/// Coordinates the bill-creation transaction.
///
/// Holds its own pool handle; obtain one from [`crate::Database::checkout`].
#[derive(Debug, Clone)]
pub struct Checkout {
    pool: SqlitePool,
}

impl Checkout {
    /// Creates a new checkout coordinator.
    pub fn new(pool: SqlitePool) -> Self {
        Checkout { pool }
    }

    /// Creates a bill from a validated cart.
    ///
    /// ## Preconditions
    /// The input has passed [`bazaar_core::validation::validate_new_bill`]:
    /// items are non-empty with positive quantities and non-negative
    /// amounts. Totals are persisted verbatim, never recomputed.
    ///
    /// ## Returns
    /// The persisted bill, items in input order, with its assigned id and
    /// bill number.
    pub async fn create_bill(&self, input: NewBill) -> CheckoutResult<Bill> {
        let mut attempt = 1;

        loop {
            match self.try_create(&input).await {
                Ok(bill) => {
                    info!(
                        bill_number = %bill.bill_number,
                        total = %bill.total,
                        items = bill.items.len(),
                        "Bill created"
                    );
                    return Ok(bill);
                }
                Err(CheckoutError::Db(err))
                    if err.is_unique_violation_on("bill_number")
                        && attempt < MAX_SEQUENCE_ATTEMPTS =>
                {
                    // Lost the per-day sequence race; the winner's bill is
                    // now visible to the recount
                    warn!(attempt, "Bill number conflict, retrying checkout");
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// One attempt at the checkout transaction.
    ///
    /// Returning `Err` drops the transaction, which rolls it back.
    async fn try_create(&self, input: &NewBill) -> CheckoutResult<Bill> {
        let mut tx = self.pool.begin().await.map_err(DbError::from)?;

        let now_local = Local::now();
        let now = now_local.with_timezone(&Utc);
        let window = day_window(now_local);

        // Derived sequence: bills already created today, plus one
        let today_count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM bills WHERE created_at >= ?1 AND created_at < ?2",
        )
        .bind(window.start)
        .bind(window.end)
        .fetch_one(&mut *tx)
        .await
        .map_err(DbError::from)?;

        let bill_number = format_bill_number(window.date, today_count as u32 + 1);
        let bill_id = Uuid::new_v4().to_string();

        debug!(bill_id = %bill_id, bill_number = %bill_number, "Inserting bill");

        sqlx::query(
            r#"
            INSERT INTO bills (
                id, bill_number, customer_id, customer_name,
                subtotal_cents, tax_cents, total_cents,
                payment_method, status, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&bill_id)
        .bind(&bill_number)
        .bind(&input.customer_id)
        .bind(&input.customer_name)
        .bind(input.subtotal)
        .bind(input.tax)
        .bind(input.total)
        .bind(&input.payment_method)
        .bind(BillStatus::Completed)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(DbError::from)?;

        for (position, item) in input.items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO bill_items (
                    id, bill_id, product_id, barcode, name,
                    price_cents, quantity, position
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&bill_id)
            .bind(&item.product_id)
            .bind(&item.barcode)
            .bind(&item.name)
            .bind(item.price)
            .bind(item.quantity)
            .bind(position as i64)
            .execute(&mut *tx)
            .await
            .map_err(DbError::from)?;

            decrement_stock(&mut tx, &item.product_id, &item.name, item.quantity).await?;
        }

        if let Some(customer_id) = &input.customer_id {
            apply_customer_spend(&mut tx, customer_id, input).await?;
        }

        tx.commit().await.map_err(DbError::from)?;

        Ok(Bill {
            id: bill_id,
            bill_number,
            customer_id: input.customer_id.clone(),
            customer_name: input.customer_name.clone(),
            items: input.items.clone(),
            subtotal: input.subtotal,
            tax: input.tax,
            total: input.total,
            payment_method: input.payment_method.clone(),
            status: BillStatus::Completed,
            created_at: now,
            updated_at: Some(now),
        })
    }
}

// =============================================================================
// Side Effects (transaction-scoped)
// =============================================================================

/// Decrements one product's stock, refusing to oversell.
///
/// The `stock >= quantity` guard makes the decrement and the availability
/// check a single atomic statement; there is no read-modify-write window.
async fn decrement_stock(
    tx: &mut Transaction<'_, Sqlite>,
    product_id: &str,
    name: &str,
    quantity: i64,
) -> CheckoutResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE products
        SET stock = stock - ?2, updated_at = ?3
        WHERE id = ?1 AND stock >= ?2
        "#,
    )
    .bind(product_id)
    .bind(quantity)
    .bind(Utc::now())
    .execute(&mut **tx)
    .await
    .map_err(DbError::from)?;

    if result.rows_affected() == 0 {
        // Zero rows is either a missing product or an oversell; look once
        // more to tell the caller which
        let available: Option<i64> = sqlx::query_scalar("SELECT stock FROM products WHERE id = ?1")
            .bind(product_id)
            .fetch_optional(&mut **tx)
            .await
            .map_err(DbError::from)?;

        return Err(match available {
            None => CoreError::ProductNotFound(product_id.to_string()).into(),
            Some(available) => CoreError::InsufficientStock {
                product_id: product_id.to_string(),
                name: name.to_string(),
                available,
                requested: quantity,
            }
            .into(),
        });
    }

    debug!(product_id = %product_id, quantity, "Stock decremented");
    Ok(())
}

/// Credits the bill's total to the customer and stamps last_purchase.
///
/// Expressed as an in-database increment so concurrent checkouts for the
/// same customer never clobber each other.
async fn apply_customer_spend(
    tx: &mut Transaction<'_, Sqlite>,
    customer_id: &str,
    input: &NewBill,
) -> CheckoutResult<()> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        UPDATE customers
        SET total_spent_cents = total_spent_cents + ?2,
            last_purchase = ?3,
            updated_at = ?3
        WHERE id = ?1
        "#,
    )
    .bind(customer_id)
    .bind(input.total)
    .bind(now)
    .execute(&mut **tx)
    .await
    .map_err(DbError::from)?;

    if result.rows_affected() == 0 {
        return Err(CoreError::CustomerNotFound(customer_id.to_string()).into());
    }

    debug!(customer_id = %customer_id, total = %input.total, "Customer spend credited");
    Ok(())
}

// Transaction behavior is exercised end-to-end in tests/checkout.rs.
