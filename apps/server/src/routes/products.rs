//! Catalog CRUD handlers.
//!
//! Stock levels on this surface are catalog maintenance (restock, manual
//! correction). Sales never pass through here; they adjust stock only via
//! the ledger's conditional updates.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use kasir_core::validation::{
    validate_price, validate_product_name, validate_sku, validate_stock, validate_uuid,
};
use kasir_core::{Money, Product, UnitType};
use kasir_db::{ProductFilter, SortOrder};

use crate::error::ApiError;
use crate::extract::Json;
use crate::routes::{success, success_list};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ProductQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
}

impl ProductQuery {
    fn into_filter(self) -> ProductFilter {
        ProductFilter {
            category: self.category,
            search: self.search,
            include_inactive: false,
            sort: self.sort,
            // Catalog default is ascending by name
            order: self
                .order
                .as_deref()
                .map(SortOrder::parse)
                .unwrap_or(SortOrder::Asc),
        }
    }
}

/// `GET /api/products`
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<Value>, ApiError> {
    let products = state.db.products().list(&query.into_filter()).await?;
    Ok(success_list(products))
}

/// `GET /api/products/categories`
pub async fn categories(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let categories = state.db.products().categories().await?;
    Ok(success_list(categories))
}

/// `GET /api/products/{id}`
pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    validate_uuid(&id)?;

    let product = state
        .db
        .products()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Product with ID {id} not found")))?;

    Ok(success(product))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub name: String,
    pub price: Money,
    pub category: String,
    #[serde(default)]
    pub stock: f64,
    #[serde(default)]
    pub unit_type: UnitType,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub description: String,
    pub sku: Option<String>,
}

/// `POST /api/products` (auth)
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    validate_product_name(&body.name)?;
    validate_price(body.price)?;
    validate_stock(body.stock)?;
    if let Some(sku) = &body.sku {
        validate_sku(sku)?;
    }

    let now = Utc::now();
    let product = Product {
        id: Uuid::new_v4().to_string(),
        name: body.name.trim().to_string(),
        price: body.price,
        category: body.category.trim().to_string(),
        stock: body.stock,
        unit_type: body.unit_type,
        image: body.image,
        description: body.description,
        sku: body.sku.map(|s| s.trim().to_string()),
        is_active: true,
        created_at: now,
        updated_at: now,
    };

    state.db.products().insert(&product).await?;
    info!(id = %product.id, name = %product.name, "Product created");

    Ok((StatusCode::CREATED, success(product)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub price: Option<Money>,
    pub category: Option<String>,
    pub stock: Option<f64>,
    pub unit_type: Option<UnitType>,
    pub image: Option<String>,
    pub description: Option<String>,
    pub sku: Option<String>,
    pub is_active: Option<bool>,
}

/// `PUT /api/products/{id}` (auth)
///
/// Partial update: absent fields keep their current value. A provided
/// `stock` is an absolute restock/correction and is written through the
/// repository's direct setter, separate from the catalog fields.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateProductRequest>,
) -> Result<Json<Value>, ApiError> {
    validate_uuid(&id)?;

    let repo = state.db.products();
    let mut product = repo
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Product with ID {id} not found")))?;

    if let Some(name) = body.name {
        validate_product_name(&name)?;
        product.name = name.trim().to_string();
    }
    if let Some(price) = body.price {
        validate_price(price)?;
        product.price = price;
    }
    if let Some(category) = body.category {
        product.category = category.trim().to_string();
    }
    if let Some(unit_type) = body.unit_type {
        product.unit_type = unit_type;
    }
    if let Some(image) = body.image {
        product.image = image;
    }
    if let Some(description) = body.description {
        product.description = description;
    }
    if let Some(sku) = body.sku {
        validate_sku(&sku)?;
        product.sku = Some(sku.trim().to_string());
    }
    if let Some(is_active) = body.is_active {
        product.is_active = is_active;
    }

    repo.update(&product).await?;

    if let Some(stock) = body.stock {
        validate_stock(stock)?;
        repo.set_stock(&id, stock).await?;
        product.stock = stock;
    }

    info!(id = %id, "Product updated");
    Ok(success(product))
}

/// `DELETE /api/products/{id}` (auth, soft delete)
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    validate_uuid(&id)?;

    state.db.products().soft_delete(&id).await?;
    info!(id = %id, "Product deactivated");

    Ok(success(json!({ "id": id, "deleted": true })))
}
