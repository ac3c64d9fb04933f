//! Customer directory endpoints.
//!
//! Directory fields (name, contact details, status) are edited here; the
//! spend fields (`totalSpent`, `lastPurchase`) are owned by checkout and can
//! only be touched through the reconcile endpoint.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use bazaar_core::validation::{validate_email, validate_name};
use bazaar_core::{Customer, CustomerStatus, Money, ValidationError};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

// =============================================================================
// Request Types
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub status: Option<CustomerStatus>,
}

impl CustomerRequest {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = validate_name("name", &self.name) {
            errors.push(e);
        }
        if let Err(e) = validate_email(&self.email) {
            errors.push(e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// `GET /customers`
pub async fn list_customers(State(state): State<AppState>) -> ApiResult<Json<Vec<Customer>>> {
    let customers = state.db.customers().list().await?;
    Ok(Json(customers))
}

/// `GET /customers/{id}`
pub async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Customer>> {
    let customer = state
        .db
        .customers()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Customer not found: {id}")))?;
    Ok(Json(customer))
}

/// `POST /customers` - registers a customer. Duplicate emails are 409.
///
/// New customers start with zero spend and no purchase history.
pub async fn create_customer(
    State(state): State<AppState>,
    Json(body): Json<CustomerRequest>,
) -> ApiResult<(StatusCode, Json<Customer>)> {
    body.validate().map_err(ApiError::validation)?;

    let now = Utc::now();
    let customer = Customer {
        id: Uuid::new_v4().to_string(),
        name: body.name.trim().to_string(),
        email: body.email.trim().to_lowercase(),
        phone: body.phone.trim().to_string(),
        address: body.address.trim().to_string(),
        total_spent: Money::zero(),
        last_purchase: None,
        status: body.status.unwrap_or(CustomerStatus::Active),
        created_at: now,
        updated_at: now,
    };

    let created = state.db.customers().insert(&customer).await?;
    info!(email = %created.email, "Customer created");
    Ok((StatusCode::CREATED, Json(created)))
}

/// `PUT /customers/{id}` - updates directory fields only.
pub async fn update_customer(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<CustomerRequest>,
) -> ApiResult<Json<Customer>> {
    body.validate().map_err(ApiError::validation)?;

    let existing = state
        .db
        .customers()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Customer not found: {id}")))?;

    let customer = Customer {
        name: body.name.trim().to_string(),
        email: body.email.trim().to_lowercase(),
        phone: body.phone.trim().to_string(),
        address: body.address.trim().to_string(),
        status: body.status.unwrap_or(existing.status),
        ..existing
    };

    let updated = state.db.customers().update(&customer).await?;
    info!(id = %id, "Customer updated");
    Ok(Json(updated))
}

/// `DELETE /customers/{id}`
pub async fn delete_customer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.db.customers().delete(&id).await?;
    info!(id = %id, "Customer deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /customers/{id}/reconcile` - recomputes `totalSpent` from the
/// customer's completed bills.
///
/// The stored counter can drift from history after manual bill
/// cancellations; this brings it back to the sum the bills actually show.
pub async fn reconcile_customer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Customer>> {
    let customer = state.db.customers().reconcile_total_spent(&id).await?;
    info!(id = %id, total_spent = %customer.total_spent, "Customer spend reconciled");
    Ok(Json(customer))
}
