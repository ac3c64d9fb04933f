//! Bill endpoints.
//!
//! `POST /bills` is the checkout: the request body is the cart plus
//! caller-computed totals, and a successful response is the persisted bill
//! with its assigned number. Every call creates a new bill; the endpoint is
//! deliberately not idempotent.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use tracing::info;

use bazaar_core::billing::NewBill;
use bazaar_core::validation::validate_new_bill;
use bazaar_core::{Bill, BillStatus};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

// =============================================================================
// Request Types
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListBillsQuery {
    pub customer_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateBillRequest {
    pub status: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// `POST /bills` - creates a bill from a cart.
///
/// Validation runs before any persistence; a 400 response means nothing was
/// written. Stock or customer failures abort the whole transaction with 409
/// or 404 and likewise leave no trace.
pub async fn create_bill(
    State(state): State<AppState>,
    Json(input): Json<NewBill>,
) -> ApiResult<(StatusCode, Json<Bill>)> {
    if let Err(errors) = validate_new_bill(&input) {
        return Err(ApiError::validation(errors));
    }

    let bill = state.db.checkout().create_bill(input).await?;
    info!(bill_number = %bill.bill_number, "Checkout complete");

    Ok((StatusCode::CREATED, Json(bill)))
}

/// `GET /bills` - lists bills, newest first.
///
/// `?customerId=..` narrows to one customer's purchase history.
pub async fn list_bills(
    State(state): State<AppState>,
    Query(query): Query<ListBillsQuery>,
) -> ApiResult<Json<Vec<Bill>>> {
    let bills = match query.customer_id {
        Some(customer_id) => state.db.bills().list_for_customer(&customer_id).await?,
        None => state.db.bills().list_recent().await?,
    };
    Ok(Json(bills))
}

/// `GET /bills/{id}` - fetches one bill with its items.
pub async fn get_bill(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Bill>> {
    let bill = state
        .db
        .bills()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Bill not found: {id}")))?;
    Ok(Json(bill))
}

/// `PATCH /bills/{id}` - updates a bill's status.
///
/// Only the status is mutable after creation. Cancelling a bill does NOT
/// restore stock or roll back customer spend; use the reconcile endpoint to
/// bring `totalSpent` back in line afterwards.
pub async fn update_bill(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateBillRequest>,
) -> ApiResult<Json<Bill>> {
    let status = BillStatus::parse(&body.status).ok_or_else(|| {
        ApiError::bad_request(format!(
            "status must be one of: completed, pending, cancelled (got '{}')",
            body.status
        ))
    })?;

    let bill = state.db.bills().update_status(&id, status).await?;
    info!(bill_number = %bill.bill_number, status = body.status, "Bill status updated");
    Ok(Json(bill))
}
