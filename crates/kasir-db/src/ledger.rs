//! # Stock Ledger
//!
//! Applies batches of stock deltas with all-or-nothing semantics.
//!
//! ## Batch Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  apply_batch([d1, d2, d3])                              │
//! │                                                                         │
//! │  d1: conditional UPDATE ── applied ✓                                   │
//! │  d2: conditional UPDATE ── applied ✓                                   │
//! │  d3: conditional UPDATE ── guard rejected ✗                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  compensate: re-apply -d2, then -d1 (reverse order)                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Err(InsufficientStock { d3's product }) - net stock change is zero    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each delta is its own atomic conditional UPDATE rather than one SQL
//! transaction over the whole batch: the guard lives in the statement's
//! WHERE clause, so concurrent batches interleave safely per item and a
//! failed item never leaves a partial batch behind.

use tracing::{error, info};

use crate::error::{ProcessError, ProcessResult};
use crate::repository::product::ProductRepository;
use kasir_core::CoreError;

/// One stock movement: negative for a sale, positive for a restoration.
#[derive(Debug, Clone, PartialEq)]
pub struct StockDelta {
    pub product_id: String,
    pub delta: f64,
}

impl StockDelta {
    pub fn new(product_id: impl Into<String>, delta: f64) -> Self {
        StockDelta {
            product_id: product_id.into(),
            delta,
        }
    }

    /// The delta that undoes this one.
    pub fn reversed(&self) -> StockDelta {
        StockDelta {
            product_id: self.product_id.clone(),
            delta: -self.delta,
        }
    }
}

/// Applies stock delta batches against the product table.
#[derive(Debug, Clone)]
pub struct StockLedger {
    products: ProductRepository,
}

impl StockLedger {
    pub fn new(products: ProductRepository) -> Self {
        StockLedger { products }
    }

    /// Applies every delta in the batch, or none of them.
    ///
    /// Deltas are applied in order via the repository's conditional
    /// update. On the first rejection or storage error, every delta
    /// already applied is compensated (reversed, newest first) before the
    /// error is returned, so total stock across the batch is conserved.
    ///
    /// ## Errors
    /// * [`CoreError::InsufficientStock`] - a guard rejected the delta and
    ///   the product exists
    /// * [`CoreError::ProductNotFound`] - a guard rejected the delta and
    ///   the product does not exist
    /// * [`crate::DbError`] - storage failure
    pub async fn apply_batch(&self, deltas: &[StockDelta]) -> ProcessResult<()> {
        let mut applied: Vec<&StockDelta> = Vec::with_capacity(deltas.len());

        for delta in deltas {
            match self
                .products
                .try_adjust_stock(&delta.product_id, delta.delta)
                .await
            {
                Ok(true) => applied.push(delta),

                Ok(false) => {
                    let failure = self.classify_rejection(delta).await;
                    self.compensate(&applied).await;
                    return Err(failure);
                }

                Err(err) => {
                    self.compensate(&applied).await;
                    return Err(err.into());
                }
            }
        }

        info!(count = deltas.len(), "Stock delta batch applied");
        Ok(())
    }

    /// Translates a guard rejection into the right business error by
    /// looking at the product after the fact.
    async fn classify_rejection(&self, delta: &StockDelta) -> ProcessError {
        match self.products.get_by_id(&delta.product_id).await {
            Ok(Some(product)) => ProcessError::Core(CoreError::InsufficientStock {
                name: product.name,
                available: product.stock,
                requested: delta.delta.abs(),
            }),
            Ok(None) => {
                ProcessError::Core(CoreError::ProductNotFound(delta.product_id.clone()))
            }
            Err(err) => ProcessError::Db(err),
        }
    }

    /// Reverses already-applied deltas, newest first. Failures here are
    /// logged rather than propagated: the caller is already unwinding an
    /// error, and a half-compensated batch with a loud log line beats a
    /// swallowed original failure.
    async fn compensate(&self, applied: &[&StockDelta]) {
        for delta in applied.iter().rev() {
            let reversed = delta.reversed();
            match self
                .products
                .try_adjust_stock(&reversed.product_id, reversed.delta)
                .await
            {
                Ok(true) => {}
                Ok(false) => error!(
                    product_id = %reversed.product_id,
                    delta = %reversed.delta,
                    "Stock compensation rejected by guard"
                ),
                Err(err) => error!(
                    product_id = %reversed.product_id,
                    delta = %reversed.delta,
                    error = %err,
                    "Stock compensation failed"
                ),
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::Utc;
    use kasir_core::{Money, Product, UnitType};
    use uuid::Uuid;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn seed_product(db: &Database, name: &str, stock: f64) -> Product {
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            price: Money::from_minor(10_000),
            category: "Sembako".to_string(),
            stock,
            unit_type: UnitType::Discrete,
            image: String::new(),
            description: String::new(),
            sku: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        db.products().insert(&product).await.unwrap();
        product
    }

    #[tokio::test]
    async fn batch_applies_all_deltas() {
        let db = test_db().await;
        let a = seed_product(&db, "Beras", 10.0).await;
        let b = seed_product(&db, "Gula", 5.0).await;

        let ledger = StockLedger::new(db.products());
        ledger
            .apply_batch(&[StockDelta::new(&a.id, -3.0), StockDelta::new(&b.id, -2.0)])
            .await
            .unwrap();

        assert_eq!(db.products().get_by_id(&a.id).await.unwrap().unwrap().stock, 7.0);
        assert_eq!(db.products().get_by_id(&b.id).await.unwrap().unwrap().stock, 3.0);
    }

    #[tokio::test]
    async fn failed_delta_compensates_earlier_ones() {
        let db = test_db().await;
        let a = seed_product(&db, "Beras", 10.0).await;
        let b = seed_product(&db, "Gula", 1.0).await;

        let ledger = StockLedger::new(db.products());
        let err = ledger
            .apply_batch(&[StockDelta::new(&a.id, -3.0), StockDelta::new(&b.id, -2.0)])
            .await
            .unwrap_err();

        match err {
            ProcessError::Core(CoreError::InsufficientStock { name, available, .. }) => {
                assert_eq!(name, "Gula");
                assert_eq!(available, 1.0);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }

        // First delta was rolled back: net stock change is zero
        assert_eq!(db.products().get_by_id(&a.id).await.unwrap().unwrap().stock, 10.0);
        assert_eq!(db.products().get_by_id(&b.id).await.unwrap().unwrap().stock, 1.0);
    }

    #[tokio::test]
    async fn unknown_product_reported_as_not_found() {
        let db = test_db().await;
        let a = seed_product(&db, "Beras", 10.0).await;

        let ledger = StockLedger::new(db.products());
        let err = ledger
            .apply_batch(&[
                StockDelta::new(&a.id, -1.0),
                StockDelta::new("ghost-id", -1.0),
            ])
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ProcessError::Core(CoreError::ProductNotFound(ref id)) if id == "ghost-id"
        ));
        assert_eq!(db.products().get_by_id(&a.id).await.unwrap().unwrap().stock, 10.0);
    }

    #[tokio::test]
    async fn restoration_batch_adds_stock() {
        let db = test_db().await;
        let a = seed_product(&db, "Beras", 2.0).await;

        let ledger = StockLedger::new(db.products());
        ledger
            .apply_batch(&[StockDelta::new(&a.id, 3.0)])
            .await
            .unwrap();

        assert_eq!(db.products().get_by_id(&a.id).await.unwrap().unwrap().stock, 5.0);
    }
}
