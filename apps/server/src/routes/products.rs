//! Product catalog endpoints.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use bazaar_core::validation::{validate_barcode, validate_name, validate_non_negative, validate_stock};
use bazaar_core::{Money, Product, ValidationError};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

// =============================================================================
// Request Types
// =============================================================================

/// Body for both create and update; the catalog fields are all required.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRequest {
    pub barcode: String,
    pub name: String,
    pub category: String,
    pub price: Money,
    pub stock: i64,
    pub min_stock: i64,
}

impl ProductRequest {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = validate_barcode(&self.barcode) {
            errors.push(e);
        }
        if let Err(e) = validate_name("name", &self.name) {
            errors.push(e);
        }
        if let Err(e) = validate_name("category", &self.category) {
            errors.push(e);
        }
        if let Err(e) = validate_non_negative("price", self.price) {
            errors.push(e);
        }
        if let Err(e) = validate_stock("stock", self.stock) {
            errors.push(e);
        }
        if let Err(e) = validate_stock("minStock", self.min_stock) {
            errors.push(e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListProductsQuery {
    pub barcode: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

/// `GET /products` - lists the catalog, or looks up one product by
/// `?barcode=..` (the scanner path at the register).
///
/// The barcode lookup returns the single product object, not a
/// one-element list.
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ListProductsQuery>,
) -> ApiResult<Response> {
    match query.barcode {
        Some(barcode) => {
            let product = state
                .db
                .products()
                .get_by_barcode(&barcode)
                .await?
                .ok_or_else(|| ApiError::not_found(format!("Product not found: {barcode}")))?;
            Ok(Json(product).into_response())
        }
        None => {
            let products = state.db.products().list().await?;
            Ok(Json(products).into_response())
        }
    }
}

/// `GET /products/low-stock` - products at or below their reorder threshold.
pub async fn list_low_stock(State(state): State<AppState>) -> ApiResult<Json<Vec<Product>>> {
    let products = state.db.products().list_low_stock().await?;
    Ok(Json(products))
}

/// `GET /products/{id}`
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Product>> {
    let product = state
        .db
        .products()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Product not found: {id}")))?;
    Ok(Json(product))
}

/// `POST /products` - creates a catalog entry. Duplicate barcodes are 409.
pub async fn create_product(
    State(state): State<AppState>,
    Json(body): Json<ProductRequest>,
) -> ApiResult<(StatusCode, Json<Product>)> {
    body.validate().map_err(ApiError::validation)?;

    let now = Utc::now();
    let product = Product {
        id: Uuid::new_v4().to_string(),
        barcode: body.barcode.trim().to_string(),
        name: body.name.trim().to_string(),
        category: body.category.trim().to_string(),
        price: body.price,
        stock: body.stock,
        min_stock: body.min_stock,
        created_at: now,
        updated_at: now,
    };

    let created = state.db.products().insert(&product).await?;
    info!(barcode = %created.barcode, name = %created.name, "Product created");
    Ok((StatusCode::CREATED, Json(created)))
}

/// `PUT /products/{id}` - replaces the catalog fields, including an absolute
/// stock level (a stocktake correction, not a sale).
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<ProductRequest>,
) -> ApiResult<Json<Product>> {
    body.validate().map_err(ApiError::validation)?;

    let existing = state
        .db
        .products()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Product not found: {id}")))?;

    let product = Product {
        barcode: body.barcode.trim().to_string(),
        name: body.name.trim().to_string(),
        category: body.category.trim().to_string(),
        price: body.price,
        stock: body.stock,
        min_stock: body.min_stock,
        ..existing
    };

    let updated = state.db.products().update(&product).await?;
    info!(id = %id, "Product updated");
    Ok(Json(updated))
}

/// `DELETE /products/{id}`
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.db.products().delete(&id).await?;
    info!(id = %id, "Product deleted");
    Ok(StatusCode::NO_CONTENT)
}
