//! # HTTP Routes
//!
//! ## API Surface
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Bills                                                                  │
//! │    POST   /bills                    create bill (the checkout)          │
//! │    GET    /bills?customerId=..      list, newest first                  │
//! │    GET    /bills/{id}               fetch with items                    │
//! │    PATCH  /bills/{id}               update status                       │
//! │                                                                         │
//! │  Products                                                               │
//! │    GET    /products?barcode=..      list / barcode lookup               │
//! │    GET    /products/low-stock       stock <= minStock                   │
//! │    POST   /products                 create                              │
//! │    GET    /products/{id}            fetch                               │
//! │    PUT    /products/{id}            update                              │
//! │    DELETE /products/{id}            delete                              │
//! │                                                                         │
//! │  Customers                                                              │
//! │    GET    /customers                list                                │
//! │    POST   /customers                create                              │
//! │    GET    /customers/{id}           fetch                               │
//! │    PUT    /customers/{id}           update directory fields             │
//! │    DELETE /customers/{id}           delete                              │
//! │    POST   /customers/{id}/reconcile recompute totalSpent from bills     │
//! │                                                                         │
//! │  GET /health                        liveness + db ping                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod bills;
pub mod customers;
pub mod health;
pub mod products;

use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/bills", post(bills::create_bill).get(bills::list_bills))
        .route(
            "/bills/{id}",
            get(bills::get_bill).patch(bills::update_bill),
        )
        .route(
            "/products",
            get(products::list_products).post(products::create_product),
        )
        .route("/products/low-stock", get(products::list_low_stock))
        .route(
            "/products/{id}",
            get(products::get_product)
                .put(products::update_product)
                .delete(products::delete_product),
        )
        .route(
            "/customers",
            get(customers::list_customers).post(customers::create_customer),
        )
        .route(
            "/customers/{id}",
            get(customers::get_customer)
                .put(customers::update_customer)
                .delete(customers::delete_customer),
        )
        .route(
            "/customers/{id}/reconcile",
            post(customers::reconcile_customer),
        )
        .with_state(state)
}
