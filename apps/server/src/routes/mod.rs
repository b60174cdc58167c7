//! # HTTP Routes
//!
//! All routes live under `/api`. Catalog mutations require a bearer
//! token; everything else is open (the POS terminal itself is trusted).
//!
//! ```text
//! POST   /api/auth/login
//! GET    /api/auth/verify
//! GET    /api/health
//! GET    /api/products                ?category&search&sort&order
//! GET    /api/products/categories
//! GET    /api/products/{id}
//! POST   /api/products                (auth)
//! PUT    /api/products/{id}           (auth)
//! DELETE /api/products/{id}           (auth, soft delete)
//! GET    /api/transactions            ?status&paymentMethod&startDate&endDate&sort&order
//! GET    /api/transactions/sales/today
//! GET    /api/transactions/summary/report
//! GET    /api/transactions/receipt/{receiptNumber}
//! GET    /api/transactions/{id}
//! POST   /api/transactions            → 201
//! DELETE /api/transactions/{id}       (cancel)
//! ```

pub mod auth;
pub mod health;
pub mod products;
pub mod transactions;

use axum::middleware;
use axum::routing::{delete, get, post, put};
use axum::Router;
use serde::Serialize;
use serde_json::{json, Value};

use crate::auth::require_auth;
use crate::extract::Json;
use crate::state::AppState;

/// Success envelope: `{"success": true, "data": ...}`.
pub fn success<T: Serialize>(data: T) -> Json<Value> {
    Json(json!({ "success": true, "data": data }))
}

/// Success envelope for collections, with a `count` field.
pub fn success_list<T: Serialize>(data: Vec<T>) -> Json<Value> {
    Json(json!({ "success": true, "count": data.len(), "data": data }))
}

/// Builds the `/api` router.
pub fn api_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/products", post(products::create))
        .route("/products/{id}", put(products::update))
        .route("/products/{id}", delete(products::remove))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        // Auth
        .route("/auth/login", post(auth::login))
        .route("/auth/verify", get(auth::verify))
        // Health
        .route("/health", get(health::health))
        // Catalog (reads are open)
        .route("/products", get(products::list))
        .route("/products/categories", get(products::categories))
        .route("/products/{id}", get(products::get_one))
        // Transactions
        .route(
            "/transactions",
            get(transactions::list).post(transactions::create),
        )
        .route("/transactions/sales/today", get(transactions::sales_today))
        .route(
            "/transactions/summary/report",
            get(transactions::summary_report),
        )
        .route(
            "/transactions/receipt/{receipt_number}",
            get(transactions::get_by_receipt),
        )
        .route(
            "/transactions/{id}",
            get(transactions::get_one).delete(transactions::cancel),
        )
        .merge(protected)
        .with_state(state)
}
