//! Integration tests for the HTTP API.
//!
//! Drives the router directly with `tower::ServiceExt::oneshot` against an
//! in-memory database; no sockets involved.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use bazaar_db::{Database, DbConfig};
use bazaar_server::{routes, AppState};

// =============================================================================
// Helpers
// =============================================================================

async fn test_app() -> Router {
    let db = Database::new(DbConfig::in_memory())
        .await
        .expect("in-memory database");
    routes::router(AppState::new(db))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = match body {
        Some(json) => Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn seed_product(app: &Router, barcode: &str, name: &str, price: f64, stock: i64) -> Value {
    let (status, body) = send(
        app,
        "POST",
        "/products",
        Some(json!({
            "barcode": barcode,
            "name": name,
            "category": "Grocery",
            "price": price,
            "stock": stock,
            "minStock": 5
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "seed product: {body}");
    body
}

async fn seed_customer(app: &Router, name: &str, email: &str) -> Value {
    let (status, body) = send(
        app,
        "POST",
        "/customers",
        Some(json!({
            "name": name,
            "email": email,
            "phone": "0300-1234567",
            "address": "Main Bazaar"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "seed customer: {body}");
    body
}

fn cart_body(product: &Value, quantity: i64) -> Value {
    let price = product["price"].as_f64().unwrap();
    let subtotal = price * quantity as f64;
    let tax = (subtotal * 10.0).round() / 100.0;
    json!({
        "items": [{
            "productId": product["id"],
            "barcode": product["barcode"],
            "name": product["name"],
            "price": price,
            "quantity": quantity
        }],
        "subtotal": subtotal,
        "tax": tax,
        "total": subtotal + tax
    })
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health() {
    let app = test_app().await;
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "up");
}

// =============================================================================
// Checkout
// =============================================================================

#[tokio::test]
async fn test_checkout_happy_path() {
    let app = test_app().await;
    let milk = seed_product(&app, "111", "Milk", 2.5, 10).await;

    let (status, bill) = send(&app, "POST", "/bills", Some(cart_body(&milk, 2))).await;
    assert_eq!(status, StatusCode::CREATED, "{bill}");

    let bill_number = bill["billNumber"].as_str().unwrap();
    assert!(bill_number.starts_with("BILL-"));
    assert!(bill_number.ends_with("-001"));
    assert_eq!(bill["status"], "completed");
    assert_eq!(bill["paymentMethod"], "cash");
    assert_eq!(bill["total"], 5.5);
    assert_eq!(bill["items"][0]["quantity"], 2);

    // GET round-trips the same bill
    let id = bill["id"].as_str().unwrap();
    let (status, fetched) = send(&app, "GET", &format!("/bills/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["billNumber"], bill["billNumber"]);
    assert_eq!(fetched["items"], bill["items"]);

    // Stock went down
    let milk_id = milk["id"].as_str().unwrap();
    let (_, milk_after) = send(&app, "GET", &format!("/products/{milk_id}"), None).await;
    assert_eq!(milk_after["stock"], 8);
}

#[tokio::test]
async fn test_checkout_empty_cart_is_400() {
    let app = test_app().await;
    let (status, body) = send(
        &app,
        "POST",
        "/bills",
        Some(json!({
            "items": [],
            "subtotal": 0.0,
            "tax": 0.0,
            "total": 0.0
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["details"].as_array().unwrap().iter().any(|d| d
        .as_str()
        .unwrap()
        .contains("items")));
}

#[tokio::test]
async fn test_checkout_oversell_is_409() {
    let app = test_app().await;
    let milk = seed_product(&app, "111", "Milk", 2.5, 1).await;

    let (status, body) = send(&app, "POST", "/bills", Some(cart_body(&milk, 5))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "INSUFFICIENT_STOCK");
    assert!(body["message"].as_str().unwrap().contains("Milk"));

    // Nothing was sold
    let milk_id = milk["id"].as_str().unwrap();
    let (_, milk_after) = send(&app, "GET", &format!("/products/{milk_id}"), None).await;
    assert_eq!(milk_after["stock"], 1);
    let (_, bills) = send(&app, "GET", "/bills", None).await;
    assert!(bills.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_checkout_unknown_customer_is_404() {
    let app = test_app().await;
    let milk = seed_product(&app, "111", "Milk", 2.5, 10).await;

    let mut body = cart_body(&milk, 1);
    body["customerId"] = json!("no-such-customer");
    let (status, response) = send(&app, "POST", "/bills", Some(body)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(response["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_checkout_credits_customer() {
    let app = test_app().await;
    let milk = seed_product(&app, "111", "Milk", 2.5, 10).await;
    let ali = seed_customer(&app, "Ali", "ali@example.com").await;
    let ali_id = ali["id"].as_str().unwrap();

    let mut body = cart_body(&milk, 4);
    body["customerId"] = json!(ali_id);
    body["customerName"] = json!("Ali");
    let (status, bill) = send(&app, "POST", "/bills", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, ali_after) = send(&app, "GET", &format!("/customers/{ali_id}"), None).await;
    assert_eq!(ali_after["totalSpent"], bill["total"]);
    assert!(!ali_after["lastPurchase"].is_null());

    // Customer filter on the bill listing
    let (_, filtered) = send(&app, "GET", &format!("/bills?customerId={ali_id}"), None).await;
    assert_eq!(filtered.as_array().unwrap().len(), 1);
    let (_, unfiltered) = send(&app, "GET", "/bills?customerId=someone-else", None).await;
    assert!(unfiltered.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_checkout_is_not_idempotent() {
    let app = test_app().await;
    let milk = seed_product(&app, "111", "Milk", 2.5, 10).await;

    let body = cart_body(&milk, 2);
    let (_, first) = send(&app, "POST", "/bills", Some(body.clone())).await;
    let (_, second) = send(&app, "POST", "/bills", Some(body)).await;

    assert_ne!(first["id"], second["id"]);
    assert_ne!(first["billNumber"], second["billNumber"]);

    let (_, bills) = send(&app, "GET", "/bills", None).await;
    assert_eq!(bills.as_array().unwrap().len(), 2);
}

// =============================================================================
// Bill Status
// =============================================================================

#[tokio::test]
async fn test_bill_status_update() {
    let app = test_app().await;
    let milk = seed_product(&app, "111", "Milk", 2.5, 10).await;
    let (_, bill) = send(&app, "POST", "/bills", Some(cart_body(&milk, 1))).await;
    let id = bill["id"].as_str().unwrap();

    let (status, updated) = send(
        &app,
        "PATCH",
        &format!("/bills/{id}"),
        Some(json!({"status": "cancelled"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "cancelled");
    assert!(!updated["updatedAt"].is_null());

    // Cancelling does not restore stock
    let milk_id = milk["id"].as_str().unwrap();
    let (_, milk_after) = send(&app, "GET", &format!("/products/{milk_id}"), None).await;
    assert_eq!(milk_after["stock"], 9);
}

#[tokio::test]
async fn test_bill_status_rejects_unknown_value() {
    let app = test_app().await;
    let milk = seed_product(&app, "111", "Milk", 2.5, 10).await;
    let (_, bill) = send(&app, "POST", "/bills", Some(cart_body(&milk, 1))).await;
    let id = bill["id"].as_str().unwrap();

    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/bills/{id}"),
        Some(json!({"status": "refunded"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_missing_bill_is_404() {
    let app = test_app().await;
    let (status, body) = send(&app, "GET", "/bills/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

// =============================================================================
// Products
// =============================================================================

#[tokio::test]
async fn test_product_crud_and_lookup() {
    let app = test_app().await;
    let milk = seed_product(&app, "111", "Milk", 2.5, 10).await;
    let id = milk["id"].as_str().unwrap();

    // Barcode lookup (scanner path) returns the bare product, not a list
    let (status, found) = send(&app, "GET", "/products?barcode=111", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(found.is_object());
    assert_eq!(found["name"], "Milk");
    assert_eq!(found["id"], milk["id"]);

    let (status, _) = send(&app, "GET", "/products?barcode=999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Duplicate barcode
    let (status, body) = send(
        &app,
        "POST",
        "/products",
        Some(json!({
            "barcode": "111",
            "name": "Other Milk",
            "category": "Grocery",
            "price": 3.0,
            "stock": 5,
            "minStock": 2
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");
    assert_eq!(body["code"], "DUPLICATE");

    // Update with an absolute stock correction
    let (status, updated) = send(
        &app,
        "PUT",
        &format!("/products/{id}"),
        Some(json!({
            "barcode": "111",
            "name": "Whole Milk",
            "category": "Dairy",
            "price": 2.75,
            "stock": 40,
            "minStock": 5
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Whole Milk");
    assert_eq!(updated["stock"], 40);

    // Delete
    let (status, _) = send(&app, "DELETE", &format!("/products/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "GET", &format!("/products/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_low_stock_listing() {
    let app = test_app().await;
    seed_product(&app, "111", "Milk", 2.5, 3).await; // at/below minStock 5
    seed_product(&app, "222", "Bread", 1.5, 50).await;

    let (status, body) = send(&app, "GET", "/products/low-stock", None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Milk"]);
}

#[tokio::test]
async fn test_product_validation() {
    let app = test_app().await;
    let (status, body) = send(
        &app,
        "POST",
        "/products",
        Some(json!({
            "barcode": "",
            "name": "",
            "category": "Grocery",
            "price": -1.0,
            "stock": -3,
            "minStock": 0
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["details"].as_array().unwrap().len() >= 3);
}

// =============================================================================
// Customers
// =============================================================================

#[tokio::test]
async fn test_customer_crud_and_reconcile() {
    let app = test_app().await;
    let ali = seed_customer(&app, "Ali", "ali@example.com").await;
    let id = ali["id"].as_str().unwrap();
    assert_eq!(ali["totalSpent"], 0.0);
    assert_eq!(ali["status"], "active");

    // Duplicate email
    let (status, body) = send(
        &app,
        "POST",
        "/customers",
        Some(json!({"name": "Other Ali", "email": "ali@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");

    // Directory update leaves spend fields alone
    let milk = seed_product(&app, "111", "Milk", 2.5, 10).await;
    let mut cart = cart_body(&milk, 2);
    cart["customerId"] = json!(id);
    let (_, bill) = send(&app, "POST", "/bills", Some(cart)).await;

    let (status, updated) = send(
        &app,
        "PUT",
        &format!("/customers/{id}"),
        Some(json!({
            "name": "Ali Khan",
            "email": "ali@example.com",
            "phone": "0300-7654321",
            "address": "New Address",
            "status": "inactive"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Ali Khan");
    assert_eq!(updated["status"], "inactive");
    assert_eq!(updated["totalSpent"], bill["total"]);

    // Cancel the bill, then reconcile the counter back to history
    let bill_id = bill["id"].as_str().unwrap();
    send(
        &app,
        "PATCH",
        &format!("/bills/{bill_id}"),
        Some(json!({"status": "cancelled"})),
    )
    .await;

    let (status, reconciled) =
        send(&app, "POST", &format!("/customers/{id}/reconcile"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reconciled["totalSpent"], 0.0);
}

#[tokio::test]
async fn test_customer_validation() {
    let app = test_app().await;
    let (status, body) = send(
        &app,
        "POST",
        "/customers",
        Some(json!({"name": "Ali", "email": "not-an-email"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}
