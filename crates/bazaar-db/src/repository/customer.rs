//! # Customer Repository
//!
//! Database operations for the customer directory.
//!
//! ## Spend Tracking
//! `total_spent_cents` and `last_purchase` are written by the checkout
//! transaction (see [`crate::checkout`]), never by the CRUD methods here.
//! The one exception is [`CustomerRepository::reconcile_total_spent`], the
//! manual repair path that recomputes spend from bill history.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use bazaar_core::Customer;

/// Column list shared by every customer SELECT.
const CUSTOMER_COLUMNS: &str = "id, name, email, phone, address, \
     total_spent_cents AS total_spent, last_purchase, status, created_at, updated_at";

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Lists all customers ordered by name.
    pub async fn list(&self) -> DbResult<Vec<Customer>> {
        let query = format!("SELECT {CUSTOMER_COLUMNS} FROM customers ORDER BY name");
        let customers = sqlx::query_as::<_, Customer>(&query)
            .fetch_all(&self.pool)
            .await?;

        Ok(customers)
    }

    /// Gets a customer by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Customer>> {
        let query = format!("SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = ?1");
        let customer = sqlx::query_as::<_, Customer>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(customer)
    }

    /// Gets a customer by email (the uniqueness key).
    pub async fn get_by_email(&self, email: &str) -> DbResult<Option<Customer>> {
        let query = format!("SELECT {CUSTOMER_COLUMNS} FROM customers WHERE email = ?1");
        let customer = sqlx::query_as::<_, Customer>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(customer)
    }

    /// Inserts a new customer.
    ///
    /// ## Returns
    /// * `Ok(Customer)` - Inserted customer
    /// * `Err(DbError::UniqueViolation)` - Email already registered
    pub async fn insert(&self, customer: &Customer) -> DbResult<Customer> {
        debug!(email = %customer.email, "Inserting customer");

        // Friendlier duplicate message than the raw constraint; the UNIQUE
        // index still backstops the race between check and insert
        if self.get_by_email(&customer.email).await?.is_some() {
            return Err(DbError::duplicate("email", &customer.email));
        }

        sqlx::query(
            r#"
            INSERT INTO customers (
                id, name, email, phone, address,
                total_spent_cents, last_purchase, status,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(&customer.phone)
        .bind(&customer.address)
        .bind(customer.total_spent)
        .bind(customer.last_purchase)
        .bind(customer.status)
        .bind(customer.created_at)
        .bind(customer.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|err| {
            let err = DbError::from(err);
            if err.is_unique_violation_on("email") {
                DbError::duplicate("email", &customer.email)
            } else {
                err
            }
        })?;

        Ok(customer.clone())
    }

    /// Updates an existing customer's directory fields.
    ///
    /// Spend fields are NOT writable here; checkout and reconciliation own
    /// them.
    pub async fn update(&self, customer: &Customer) -> DbResult<Customer> {
        debug!(id = %customer.id, "Updating customer");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE customers SET
                name = ?2,
                email = ?3,
                phone = ?4,
                address = ?5,
                status = ?6,
                updated_at = ?7
            WHERE id = ?1
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(&customer.phone)
        .bind(&customer.address)
        .bind(customer.status)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|err| {
            let err = DbError::from(err);
            if err.is_unique_violation_on("email") {
                DbError::duplicate("email", &customer.email)
            } else {
                err
            }
        })?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", &customer.id));
        }

        // Re-read so the caller sees the spend fields we refused to touch
        self.get_by_id(&customer.id)
            .await?
            .ok_or_else(|| DbError::not_found("Customer", &customer.id))
    }

    /// Deletes a customer. Their bills remain, with the customer_name
    /// snapshot still intact.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting customer");

        let result = sqlx::query("DELETE FROM customers WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }

        Ok(())
    }

    /// Recomputes a customer's cumulative spend from their completed bills.
    ///
    /// ## Why This Exists
    /// total_spent normally only grows through checkout increments. If an
    /// increment is ever lost (crash between deploys, manual data surgery),
    /// this is the repair path: sum the completed bills and overwrite.
    ///
    /// ## Returns
    /// The customer with the freshly recomputed total.
    pub async fn reconcile_total_spent(&self, id: &str) -> DbResult<Customer> {
        info!(id = %id, "Reconciling customer total_spent from bill history");

        let result = sqlx::query(
            r#"
            UPDATE customers SET
                total_spent_cents = (
                    SELECT COALESCE(SUM(total_cents), 0)
                    FROM bills
                    WHERE customer_id = ?1 AND status = 'completed'
                ),
                updated_at = ?2
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Customer", id))
    }
}
