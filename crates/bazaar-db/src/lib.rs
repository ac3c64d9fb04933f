//! # Bazaar DB
//!
//! SQLite persistence layer for the Bazaar POS backend.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          bazaar-db                                      │
//! │                                                                         │
//! │  ┌──────────┐  ┌──────────────┐  ┌─────────────────────────────────┐   │
//! │  │   pool   │  │  migrations  │  │          repository             │   │
//! │  │ Database │  │   MIGRATOR   │  │  ProductRepository              │   │
//! │  │ DbConfig │  │              │  │  CustomerRepository             │   │
//! │  └────┬─────┘  └──────────────┘  │  BillRepository                 │   │
//! │       │                          └─────────────────────────────────┘   │
//! │       │         ┌──────────────┐                                       │
//! │       └────────▶│   checkout   │  the bill-creation transaction        │
//! │                 │   Checkout   │  (bill + items + stock + spend)       │
//! │                 └──────────────┘                                       │
//! │                                                                         │
//! │  Repositories handle single-entity CRUD; the checkout coordinator      │
//! │  owns the one multi-entity write path.                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,no_run
//! use bazaar_db::{Database, DbConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::new(DbConfig::new("bazaar.db")).await?;
//!
//! let products = db.products().list().await?;
//! println!("{} products", products.len());
//! # Ok(())
//! # }
//! ```

pub mod checkout;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// Re-export main types at crate root
pub use checkout::{Checkout, CheckoutError, CheckoutResult};
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use repository::bill::BillRepository;
pub use repository::customer::CustomerRepository;
pub use repository::product::ProductRepository;
