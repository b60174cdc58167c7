//! # Transaction Processor
//!
//! Orchestrates sale creation and cancellation end-to-end.
//!
//! ## Sale Creation Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         create(request)                                 │
//! │                                                                         │
//! │  1. Validate request shape          (fail fast, zero side effects)     │
//! │  2. Resolve line items              (catalog lookup + snapshot)        │
//! │  3. Apply negative stock batch      (ledger; all-or-nothing)           │
//! │  4. Insert transaction row          (retry receipt suffix on clash)    │
//! │       │                                                                 │
//! │       ├── insert ok ──► Ok(Transaction)                                │
//! │       │                                                                 │
//! │       └── insert failed for good ──► reverse the stock batch,          │
//! │                                       then Err(...)                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Steps 1-2 never touch stock, so any rejection there leaves the system
//! untouched. After step 3 the processor owns a stock debt; every exit
//! path from step 4 either keeps it (sale persisted) or repays it.
//!
//! ## Cancellation
//! Cancellation claims the row first (conditional status flip), restores
//! stock second. The claim is what makes concurrent double-cancel safe:
//! only the claim winner restores, so stock can never be restored twice.

use std::fmt;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::{DbError, ProcessResult};
use crate::ledger::{StockDelta, StockLedger};
use crate::pool::Database;
use kasir_core::receipt::{self, MAX_RECEIPT_ATTEMPTS};
use kasir_core::validation::{resolve_line_item, validate_transaction_request};
use kasir_core::{
    CoreError, LineItem, Money, PaymentMethod, Transaction, TransactionRequest,
    TransactionStatus, DEFAULT_CUSTOMER_NAME,
};

/// Produces a receipt-number candidate for a sale date.
pub type ReceiptSource = Arc<dyn Fn(NaiveDate) -> String + Send + Sync>;

/// Generates a receipt candidate without holding the thread-local RNG
/// across an await point.
fn next_receipt(date: NaiveDate) -> String {
    let mut rng = rand::thread_rng();
    receipt::generate_candidate(date, &mut rng)
}

/// Orchestrates sales against the catalog, the stock ledger and the
/// transaction table.
#[derive(Clone)]
pub struct TransactionProcessor {
    db: Database,
    receipt_source: ReceiptSource,
}

impl fmt::Debug for TransactionProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransactionProcessor")
            .field("db", &self.db)
            .finish_non_exhaustive()
    }
}

impl TransactionProcessor {
    pub fn new(db: Database) -> Self {
        TransactionProcessor {
            db,
            receipt_source: Arc::new(next_receipt),
        }
    }

    /// Replaces the random suffix generator. Deterministic sources let a
    /// caller drive the collision-retry loop directly.
    pub fn with_receipt_source<F>(mut self, source: F) -> Self
    where
        F: Fn(NaiveDate) -> String + Send + Sync + 'static,
    {
        self.receipt_source = Arc::new(source);
        self
    }

    fn ledger(&self) -> StockLedger {
        StockLedger::new(self.db.products())
    }

    /// Processes a cart submission into a completed, persisted sale.
    ///
    /// See the module docs for the pipeline. On success the returned
    /// transaction is already persisted with a unique receipt number and
    /// stock has been decremented for every line.
    pub async fn create(&self, request: &TransactionRequest) -> ProcessResult<Transaction> {
        validate_transaction_request(request)?;

        let products = self.db.products();
        let mut lines: Vec<LineItem> = Vec::with_capacity(request.items.len());
        let mut deltas: Vec<StockDelta> = Vec::with_capacity(request.items.len());

        for item in &request.items {
            let product = products
                .get_by_id(&item.product_id)
                .await?
                .ok_or_else(|| CoreError::ProductNotFound(item.product_id.clone()))?;

            let line = resolve_line_item(&product, item)?;
            deltas.push(StockDelta::new(&product.id, -line.quantity.magnitude()));
            lines.push(line);
        }

        // The authoritative stock check. Everything before this point had
        // zero side effects.
        self.ledger().apply_batch(&deltas).await?;

        let now = Utc::now();
        let change = request.change.unwrap_or_else(|| {
            if request.payment_method == PaymentMethod::Cash {
                request.cash_received - request.total
            } else {
                Money::zero()
            }
        });
        let customer_name = request
            .customer_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| DEFAULT_CUSTOMER_NAME.to_string());

        let mut tx = Transaction {
            id: Uuid::new_v4().to_string(),
            receipt_number: String::new(),
            items: lines,
            subtotal: request.subtotal,
            discount: request.discount.unwrap_or_else(Money::zero),
            total: request.total,
            payment_method: request.payment_method,
            cash_received: request.cash_received,
            change,
            customer_name,
            note: request.note.clone().unwrap_or_default(),
            status: TransactionStatus::Completed,
            created_at: now,
            updated_at: now,
        };

        let transactions = self.db.transactions();
        let mut attempts = 0u32;

        let failure = loop {
            attempts += 1;
            tx.receipt_number = (self.receipt_source)(now.date_naive());

            match transactions.insert(&tx).await {
                Ok(()) => {
                    info!(
                        id = %tx.id,
                        receipt = %tx.receipt_number,
                        total = %tx.total,
                        items = tx.items.len(),
                        "Transaction created"
                    );
                    return Ok(tx);
                }

                Err(err) if err.is_unique_violation_on("receipt_number") => {
                    if attempts >= MAX_RECEIPT_ATTEMPTS {
                        break CoreError::ReceiptGenerationFailed { attempts }.into();
                    }
                    warn!(
                        receipt = %tx.receipt_number,
                        attempt = attempts,
                        "Receipt number collision, retrying with a new suffix"
                    );
                }

                Err(err) => break err.into(),
            }
        };

        // Persistence failed for good: repay the stock debt so the failed
        // sale leaves no trace in inventory.
        let restoration: Vec<StockDelta> = deltas.iter().map(StockDelta::reversed).collect();
        if let Err(err) = self.ledger().apply_batch(&restoration).await {
            error!(error = %err, "Failed to restore stock after persistence failure");
        }

        Err(failure)
    }

    /// Cancels a completed sale and restores its stock.
    ///
    /// ## Errors
    /// * [`CoreError::TransactionNotFound`] - unknown ID
    /// * [`CoreError::AlreadyCancelled`] - cancellation is terminal; the
    ///   claim also loses when a concurrent cancel got there first
    pub async fn cancel(&self, id: &str) -> ProcessResult<Transaction> {
        let transactions = self.db.transactions();

        let tx = transactions
            .get_by_id(id)
            .await
            .map_err(not_found_as_core(id))?
            .ok_or_else(|| CoreError::TransactionNotFound(id.to_string()))?;

        if tx.status == TransactionStatus::Cancelled {
            return Err(CoreError::AlreadyCancelled(id.to_string()).into());
        }
        let prior_status = tx.status;

        let claimed = transactions
            .claim_cancelled(id)
            .await
            .map_err(not_found_as_core(id))?;
        if !claimed {
            return Err(CoreError::AlreadyCancelled(id.to_string()).into());
        }

        let deltas: Vec<StockDelta> = tx
            .restoration_deltas()
            .into_iter()
            .map(|(product_id, magnitude)| StockDelta::new(product_id, magnitude))
            .collect();

        if let Err(err) = self.ledger().apply_batch(&deltas).await {
            // The claim must not stand if stock was not restored,
            // otherwise a retry would be rejected as already cancelled.
            if let Err(revert_err) = transactions.set_status(id, prior_status).await {
                error!(
                    id = %id,
                    error = %revert_err,
                    "Failed to revert cancellation claim after restore failure"
                );
            }
            return Err(err);
        }

        info!(
            id = %id,
            receipt = %tx.receipt_number,
            items = tx.items.len(),
            "Transaction cancelled, stock restored"
        );

        transactions
            .get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Transaction", id).into())
    }
}

/// Maps a repository NotFound onto the domain's TransactionNotFound so
/// callers see one error shape for "no such sale".
fn not_found_as_core(id: &str) -> impl FnOnce(DbError) -> crate::error::ProcessError + '_ {
    move |err| match err {
        DbError::NotFound { .. } => {
            CoreError::TransactionNotFound(id.to_string()).into()
        }
        other => other.into(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProcessError;
    use crate::pool::DbConfig;
    use kasir_core::{Product, Quantity, RequestedItem, UnitType};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn seed_product(
        db: &Database,
        name: &str,
        price: i64,
        stock: f64,
        unit_type: UnitType,
    ) -> Product {
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            price: Money::from_minor(price),
            category: "Sembako".to_string(),
            stock,
            unit_type,
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

    fn discrete_item(product: &Product, quantity: i64) -> RequestedItem {
        RequestedItem {
            product_id: product.id.clone(),
            quantity: Some(quantity),
            weight: None,
            price: None,
            unit_type: None,
        }
    }

    fn cash_request(items: Vec<RequestedItem>, total: i64, cash_received: i64) -> TransactionRequest {
        TransactionRequest {
            items,
            subtotal: Money::from_minor(total),
            discount: None,
            total: Money::from_minor(total),
            payment_method: PaymentMethod::Cash,
            cash_received: Money::from_minor(cash_received),
            change: None,
            customer_name: None,
            note: None,
        }
    }

    #[tokio::test]
    async fn cash_sale_decrements_stock_and_computes_change() {
        let db = test_db().await;
        let beras = seed_product(&db, "Beras Premium 5kg", 15_000, 40.0, UnitType::Discrete).await;

        let processor = TransactionProcessor::new(db.clone());
        let tx = processor
            .create(&cash_request(vec![discrete_item(&beras, 2)], 30_000, 50_000))
            .await
            .unwrap();

        assert_eq!(tx.status, TransactionStatus::Completed);
        assert_eq!(tx.change, Money::from_minor(20_000));
        assert_eq!(tx.customer_name, "Customer");
        assert!(tx.receipt_number.starts_with("INV/"));
        assert_eq!(tx.items[0].subtotal, Money::from_minor(30_000));

        let stock = db.products().get_by_id(&beras.id).await.unwrap().unwrap().stock;
        assert_eq!(stock, 38.0);

        // Persisted and fetchable by receipt
        let fetched = db
            .transactions()
            .get_by_receipt(&tx.receipt_number)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fetched.id, tx.id);
    }

    #[tokio::test]
    async fn weighed_sale_decrements_stock_by_weight() {
        let db = test_db().await;
        let bawang = seed_product(&db, "Bawang Merah", 20_000, 5.0, UnitType::Weighed).await;

        let processor = TransactionProcessor::new(db.clone());
        let tx = processor
            .create(&cash_request(
                vec![RequestedItem {
                    product_id: bawang.id.clone(),
                    quantity: None,
                    weight: Some(1.5),
                    price: None,
                    unit_type: None,
                }],
                30_000,
                30_000,
            ))
            .await
            .unwrap();

        assert_eq!(tx.items[0].quantity, Quantity::Weighed { weight: 1.5 });
        assert_eq!(tx.items[0].subtotal, Money::from_minor(30_000));

        let stock = db.products().get_by_id(&bawang.id).await.unwrap().unwrap().stock;
        assert!((stock - 3.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn insufficient_stock_persists_nothing() {
        let db = test_db().await;
        let telur = seed_product(&db, "Telur Ayam", 2_000, 3.0, UnitType::Discrete).await;

        let processor = TransactionProcessor::new(db.clone());
        let err = processor
            .create(&cash_request(vec![discrete_item(&telur, 5)], 10_000, 10_000))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ProcessError::Core(CoreError::InsufficientStock { .. })
        ));

        let stock = db.products().get_by_id(&telur.id).await.unwrap().unwrap().stock;
        assert_eq!(stock, 3.0);
        assert_eq!(db.transactions().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn insufficient_cash_rejected_before_any_side_effect() {
        let db = test_db().await;
        let beras = seed_product(&db, "Beras Premium 5kg", 35_000, 10.0, UnitType::Discrete).await;

        let processor = TransactionProcessor::new(db.clone());
        let err = processor
            .create(&cash_request(vec![discrete_item(&beras, 2)], 70_000, 50_000))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ProcessError::Core(CoreError::InsufficientPayment {
                received: 50_000,
                total: 70_000,
            })
        ));

        let stock = db.products().get_by_id(&beras.id).await.unwrap().unwrap().stock;
        assert_eq!(stock, 10.0);
        assert_eq!(db.transactions().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn unknown_product_rejected() {
        let db = test_db().await;
        let processor = TransactionProcessor::new(db.clone());

        let err = processor
            .create(&cash_request(
                vec![RequestedItem {
                    product_id: "ghost-id".to_string(),
                    quantity: Some(1),
                    weight: None,
                    price: None,
                    unit_type: None,
                }],
                1_000,
                1_000,
            ))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ProcessError::Core(CoreError::ProductNotFound(ref id)) if id == "ghost-id"
        ));
    }

    #[tokio::test]
    async fn concurrent_sales_cannot_oversell_last_item() {
        let db = test_db().await;
        let last = seed_product(&db, "Minyak Goreng 1L", 18_000, 1.0, UnitType::Discrete).await;

        let processor = TransactionProcessor::new(db.clone());
        let request_a = cash_request(vec![discrete_item(&last, 1)], 18_000, 18_000);
        let request_b = cash_request(vec![discrete_item(&last, 1)], 18_000, 18_000);

        let (ra, rb) = tokio::join!(processor.create(&request_a), processor.create(&request_b));
        let successes = [ra.is_ok(), rb.is_ok()].iter().filter(|ok| **ok).count();
        assert_eq!(successes, 1);

        let stock = db.products().get_by_id(&last.id).await.unwrap().unwrap().stock;
        assert_eq!(stock, 0.0);
        assert_eq!(db.transactions().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn cancel_restores_stock_exactly_once() {
        let db = test_db().await;
        let beras = seed_product(&db, "Beras Premium 5kg", 15_000, 40.0, UnitType::Discrete).await;

        let processor = TransactionProcessor::new(db.clone());
        let tx = processor
            .create(&cash_request(vec![discrete_item(&beras, 3)], 45_000, 45_000))
            .await
            .unwrap();

        let stock = db.products().get_by_id(&beras.id).await.unwrap().unwrap().stock;
        assert_eq!(stock, 37.0);

        let cancelled = processor.cancel(&tx.id).await.unwrap();
        assert_eq!(cancelled.status, TransactionStatus::Cancelled);

        let stock = db.products().get_by_id(&beras.id).await.unwrap().unwrap().stock;
        assert_eq!(stock, 40.0);

        // Second cancel must not restore again
        let err = processor.cancel(&tx.id).await.unwrap_err();
        assert!(matches!(
            err,
            ProcessError::Core(CoreError::AlreadyCancelled(_))
        ));

        let stock = db.products().get_by_id(&beras.id).await.unwrap().unwrap().stock;
        assert_eq!(stock, 40.0);
    }

    #[tokio::test]
    async fn receipt_collision_retries_with_fresh_suffix() {
        use std::sync::atomic::{AtomicU32, Ordering};

        let db = test_db().await;
        let beras = seed_product(&db, "Beras Premium 5kg", 15_000, 40.0, UnitType::Discrete).await;

        // First sale pins a known receipt number.
        let taken = "INV/260830/AAAA".to_string();
        let occupied = taken.clone();
        let first = TransactionProcessor::new(db.clone())
            .with_receipt_source(move |_| occupied.clone());
        first
            .create(&cash_request(vec![discrete_item(&beras, 1)], 15_000, 15_000))
            .await
            .unwrap();

        // Second sale collides once, then moves on to a free suffix.
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let second = TransactionProcessor::new(db.clone()).with_receipt_source(move |_| {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                taken.clone()
            } else {
                "INV/260830/BBBB".to_string()
            }
        });
        let tx = second
            .create(&cash_request(vec![discrete_item(&beras, 1)], 15_000, 15_000))
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(tx.receipt_number, "INV/260830/BBBB");
        assert_eq!(db.transactions().count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn exhausted_receipt_attempts_fail_and_restore_stock() {
        let db = test_db().await;
        let beras = seed_product(&db, "Beras Premium 5kg", 15_000, 40.0, UnitType::Discrete).await;

        let stuck = TransactionProcessor::new(db.clone())
            .with_receipt_source(|_| "INV/260830/CCCC".to_string());
        stuck
            .create(&cash_request(vec![discrete_item(&beras, 1)], 15_000, 15_000))
            .await
            .unwrap();

        // Every candidate now collides with the first sale.
        let err = stuck
            .create(&cash_request(vec![discrete_item(&beras, 2)], 30_000, 30_000))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ProcessError::Core(CoreError::ReceiptGenerationFailed {
                attempts: MAX_RECEIPT_ATTEMPTS,
            })
        ));

        // The failed sale repaid its stock debt; only the first sale stuck.
        let stock = db.products().get_by_id(&beras.id).await.unwrap().unwrap().stock;
        assert_eq!(stock, 39.0);
        assert_eq!(db.transactions().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn cancel_unknown_transaction_is_not_found() {
        let db = test_db().await;
        let processor = TransactionProcessor::new(db);

        let err = processor.cancel("no-such-id").await.unwrap_err();
        assert!(matches!(
            err,
            ProcessError::Core(CoreError::TransactionNotFound(_))
        ));
    }

    #[tokio::test]
    async fn snapshot_survives_catalog_edits() {
        let db = test_db().await;
        let mut kopi = seed_product(&db, "Kopi Bubuk", 12_000, 10.0, UnitType::Discrete).await;

        let processor = TransactionProcessor::new(db.clone());
        let tx = processor
            .create(&cash_request(vec![discrete_item(&kopi, 1)], 12_000, 12_000))
            .await
            .unwrap();

        // Rename and reprice the product after the sale
        kopi.name = "Kopi Bubuk Spesial".to_string();
        kopi.price = Money::from_minor(99_000);
        db.products().update(&kopi).await.unwrap();

        let fetched = db.transactions().get_by_id(&tx.id).await.unwrap().unwrap();
        assert_eq!(fetched.items[0].name, "Kopi Bubuk");
        assert_eq!(fetched.items[0].price, Money::from_minor(12_000));
    }
}
