//! # Repository Module
//!
//! Repository implementations for database entities.
//!
//! ## Repository Pattern
//! Each entity gets a repository struct owning a pool handle:
//! - [`product::ProductRepository`] - Catalog CRUD and low-stock queries
//! - [`customer::CustomerRepository`] - Directory CRUD and spend reconciliation
//! - [`bill::BillRepository`] - Bill reads and status updates
//!
//! Repositories are cheap to construct (pool clone is an Arc bump); get a
//! fresh one from [`crate::Database`] wherever needed.
//!
//! The multi-entity checkout write path deliberately does NOT live here -
//! see [`crate::checkout`] for the transaction that spans all three tables.

pub mod bill;
pub mod customer;
pub mod product;
