//! # Product Repository
//!
//! Database operations for the product catalog.
//!
//! ## Key Operations
//! - Filtered catalog listing (category, name search, sort)
//! - CRUD with soft delete
//! - Conditional stock adjustment (the ledger primitive)
//!
//! ## Conditional Stock Adjustment
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │              Why a Single Conditional UPDATE                            │
//! │                                                                         │
//! │  ❌ WRONG: read stock, check in Rust, write new value                   │
//! │     Two requests can both read stock=1 and both "succeed".             │
//! │                                                                         │
//! │  ✅ CORRECT: one statement, guard inside the WHERE clause               │
//! │     UPDATE products SET stock = max(stock + ?, 0)                      │
//! │     WHERE id = ? AND stock + ? >= -ε                                   │
//! │                                                                         │
//! │  SQLite serializes writers, so only one of two racing decrements       │
//! │  passes the guard; the loser sees rows_affected = 0.                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::SortOrder;
use kasir_core::{Money, Product, UnitType};

/// Tolerance when checking the stock guard. Weighed stock accumulates
/// binary-float dust (0.1 is not exact in an f64); a nanogram of slack
/// keeps "sell the last 0.3 kg of 0.1+0.1+0.1" from failing spuriously.
const STOCK_EPSILON: f64 = 1e-9;

const PRODUCT_COLUMNS: &str = "id, name, price, category, stock, unit_type, image, \
     description, sku, is_active, created_at, updated_at";

/// Catalog listing filters. All fields optional; the default lists every
/// active product sorted by name.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    /// Exact category match.
    pub category: Option<String>,

    /// Case-insensitive substring match on the product name.
    pub search: Option<String>,

    /// Include soft-deleted products.
    pub include_inactive: bool,

    /// Client-facing sort key; unrecognized values fall back to `name`.
    pub sort: Option<String>,

    pub order: SortOrder,
}

/// Maps client sort keys to real column names. Anything not in this
/// whitelist sorts by name - sort keys are never interpolated raw.
fn product_sort_column(key: Option<&str>) -> &'static str {
    match key {
        Some("price") => "price",
        Some("stock") => "stock",
        Some("createdAt") => "created_at",
        _ => "name",
    }
}

/// Database row for a product. Mirrors the `products` table; converted to
/// the domain [`Product`] on the way out.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: String,
    name: String,
    price: i64,
    category: String,
    stock: f64,
    unit_type: String,
    image: String,
    description: String,
    sku: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = DbError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let unit_type = UnitType::parse(&row.unit_type).ok_or_else(|| {
            DbError::Internal(format!(
                "invalid unit_type '{}' for product {}",
                row.unit_type, row.id
            ))
        })?;

        Ok(Product {
            id: row.id,
            name: row.name,
            price: Money::from_minor(row.price),
            category: row.category,
            stock: row.stock,
            unit_type,
            image: row.image,
            description: row.description,
            sku: row.sku,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// let catalog = repo.list(&ProductFilter::default()).await?;
/// let product = repo.get_by_id("uuid-here").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists products matching the filter.
    pub async fn list(&self, filter: &ProductFilter) -> DbResult<Vec<Product>> {
        debug!(?filter, "Listing products");

        let mut qb: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE 1 = 1"));

        if !filter.include_inactive {
            qb.push(" AND is_active = 1");
        }

        if let Some(category) = &filter.category {
            qb.push(" AND category = ").push_bind(category.clone());
        }

        if let Some(search) = &filter.search {
            let pattern = format!("%{}%", search.trim());
            qb.push(" AND name LIKE ").push_bind(pattern);
        }

        qb.push(" ORDER BY ")
            .push(product_sort_column(filter.sort.as_deref()))
            .push(filter.order.sql());

        let rows: Vec<ProductRow> = qb.build_query_as().fetch_all(&self.pool).await?;

        rows.into_iter().map(Product::try_from).collect()
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Product::try_from).transpose()
    }

    /// Gets a product by its SKU.
    pub async fn get_by_sku(&self, sku: &str) -> DbResult<Option<Product>> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE sku = ?"
        ))
        .bind(sku)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Product::try_from).transpose()
    }

    /// Inserts a new product.
    ///
    /// ## Returns
    /// * `Ok(())` - Inserted
    /// * `Err(DbError::UniqueViolation)` - SKU already exists
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, name = %product.name, "Inserting product");

        sqlx::query(
            "INSERT INTO products (
                id, name, price, category, stock, unit_type,
                image, description, sku, is_active, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(product.price.minor())
        .bind(&product.category)
        .bind(product.stock)
        .bind(product.unit_type.as_str())
        .bind(&product.image)
        .bind(&product.description)
        .bind(&product.sku)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Updates an existing product (full row; callers merge partial edits
    /// into a fetched product first).
    ///
    /// Stock is deliberately NOT written here - it only moves through
    /// [`Self::try_adjust_stock`] so catalog edits can't clobber
    /// concurrent sales.
    ///
    /// ## Returns
    /// * `Ok(())` - Update successful
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    pub async fn update(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, "Updating product");

        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE products SET
                name = ?, price = ?, category = ?, unit_type = ?,
                image = ?, description = ?, sku = ?, is_active = ?,
                updated_at = ?
            WHERE id = ?",
        )
        .bind(&product.name)
        .bind(product.price.minor())
        .bind(&product.category)
        .bind(product.unit_type.as_str())
        .bind(&product.image)
        .bind(&product.description)
        .bind(&product.sku)
        .bind(product.is_active)
        .bind(now)
        .bind(&product.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", &product.id));
        }

        Ok(())
    }

    /// Overwrites the stock level directly (restock / manual correction,
    /// not sales - sales go through [`Self::try_adjust_stock`]).
    pub async fn set_stock(&self, id: &str, stock: f64) -> DbResult<()> {
        debug!(id = %id, stock = %stock, "Setting stock level");

        let now = Utc::now();

        let result = sqlx::query("UPDATE products SET stock = ?, updated_at = ? WHERE id = ?")
            .bind(stock.max(0.0))
            .bind(now)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Atomically adjusts stock by `delta` (negative for sales, positive
    /// for restoration), refusing adjustments that would drive stock
    /// negative.
    ///
    /// ## Returns
    /// * `Ok(true)` - Adjustment applied
    /// * `Ok(false)` - Guard rejected it: product missing OR insufficient
    ///   stock. Callers that need to tell the two apart follow up with
    ///   [`Self::get_by_id`].
    pub async fn try_adjust_stock(&self, id: &str, delta: f64) -> DbResult<bool> {
        debug!(id = %id, delta = %delta, "Adjusting stock");

        let now = Utc::now();

        // max(..., 0) clamps float dust so stored stock never goes
        // negative even when the guard passed on the epsilon.
        let result = sqlx::query(
            "UPDATE products
             SET stock = max(stock + ?, 0), updated_at = ?
             WHERE id = ? AND stock + ? >= ?",
        )
        .bind(delta)
        .bind(now)
        .bind(id)
        .bind(delta)
        .bind(-STOCK_EPSILON)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Soft-deletes a product by setting is_active = false.
    ///
    /// Historical transactions keep their snapshots of this product, and
    /// it can be reactivated via update.
    pub async fn soft_delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Soft-deleting product");

        let now = Utc::now();

        let result = sqlx::query("UPDATE products SET is_active = 0, updated_at = ? WHERE id = ?")
            .bind(now)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Distinct categories of active products, sorted.
    pub async fn categories(&self) -> DbResult<Vec<String>> {
        let categories: Vec<String> = sqlx::query_scalar(
            "SELECT DISTINCT category FROM products WHERE is_active = 1 ORDER BY category",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    /// Counts active products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Helper to generate a new product ID.
pub fn generate_product_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================
