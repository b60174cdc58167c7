//! # Transaction Repository
//!
//! Database operations for sale transactions.
//!
//! ## Snapshot Storage
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │              Why Line Items Live Inside the Row                         │
//! │                                                                         │
//! │  transactions.items is a JSON column holding the full line-item        │
//! │  snapshots (name, price, quantity/weight, subtotal) taken at sale      │
//! │  time. There is no separate line-item table:                           │
//! │                                                                         │
//! │  • Receipts must survive later catalog edits - a price change or       │
//! │    product rename must never alter a past receipt.                     │
//! │  • Reads are whole-receipt: fetch by id and you have everything.       │
//! │  • Writes are single-row INSERTs, so receipt insertion is atomic       │
//! │    without a multi-statement transaction.                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Status Transitions
//! The only mutation after insert is `status`, and the only reachable
//! terminal state is `cancelled`. [`TransactionRepository::claim_cancelled`]
//! flips it with a conditional UPDATE so two racing cancellations cannot
//! both win (and therefore cannot both restore stock).

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::SortOrder;
use kasir_core::{Money, PaymentMethod, Transaction, TransactionStatus};

const TRANSACTION_COLUMNS: &str = "id, receipt_number, items, subtotal, discount, total, \
     payment_method, cash_received, change, customer_name, note, status, \
     created_at, updated_at";

/// History listing filters. All optional; default is everything, newest
/// first.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub status: Option<TransactionStatus>,
    pub payment_method: Option<PaymentMethod>,

    /// Inclusive lower bound on `created_at`.
    pub start: Option<DateTime<Utc>>,

    /// Exclusive upper bound on `created_at`.
    pub end: Option<DateTime<Utc>>,

    /// Client-facing sort key; unrecognized values fall back to `createdAt`.
    pub sort: Option<String>,

    pub order: SortOrder,

    pub limit: Option<u32>,
}

/// Maps client sort keys to column names (whitelist, never interpolated raw).
fn transaction_sort_column(key: Option<&str>) -> &'static str {
    match key {
        Some("total") => "total",
        Some("paymentMethod") => "payment_method",
        Some("receiptNumber") => "receipt_number",
        _ => "created_at",
    }
}

/// Database row for a transaction; `items` is the raw JSON snapshot text.
#[derive(Debug, sqlx::FromRow)]
struct TransactionRow {
    id: String,
    receipt_number: String,
    items: String,
    subtotal: i64,
    discount: i64,
    total: i64,
    payment_method: String,
    cash_received: i64,
    change: i64,
    customer_name: String,
    note: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = DbError;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        let items = serde_json::from_str(&row.items).map_err(|e| {
            DbError::Internal(format!(
                "corrupt line-item snapshot for transaction {}: {e}",
                row.id
            ))
        })?;

        let payment_method = PaymentMethod::parse(&row.payment_method).ok_or_else(|| {
            DbError::Internal(format!(
                "invalid payment_method '{}' for transaction {}",
                row.payment_method, row.id
            ))
        })?;

        let status = TransactionStatus::parse(&row.status).ok_or_else(|| {
            DbError::Internal(format!(
                "invalid status '{}' for transaction {}",
                row.status, row.id
            ))
        })?;

        Ok(Transaction {
            id: row.id,
            receipt_number: row.receipt_number,
            items,
            subtotal: Money::from_minor(row.subtotal),
            discount: Money::from_minor(row.discount),
            total: Money::from_minor(row.total),
            payment_method,
            cash_received: Money::from_minor(row.cash_received),
            change: Money::from_minor(row.change),
            customer_name: row.customer_name,
            note: row.note,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for transaction database operations.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    pool: SqlitePool,
}

impl TransactionRepository {
    /// Creates a new TransactionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TransactionRepository { pool }
    }

    /// Inserts a new transaction with its line-item snapshots.
    ///
    /// ## Returns
    /// * `Ok(())` - Inserted
    /// * `Err(DbError::UniqueViolation)` - Receipt number collision; the
    ///   processor retries with a fresh suffix
    pub async fn insert(&self, tx: &Transaction) -> DbResult<()> {
        debug!(id = %tx.id, receipt = %tx.receipt_number, "Inserting transaction");

        let items = serde_json::to_string(&tx.items)
            .map_err(|e| DbError::Internal(format!("failed to serialize line items: {e}")))?;

        sqlx::query(
            "INSERT INTO transactions (
                id, receipt_number, items, subtotal, discount, total,
                payment_method, cash_received, change, customer_name,
                note, status, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&tx.id)
        .bind(&tx.receipt_number)
        .bind(items)
        .bind(tx.subtotal.minor())
        .bind(tx.discount.minor())
        .bind(tx.total.minor())
        .bind(tx.payment_method.as_str())
        .bind(tx.cash_received.minor())
        .bind(tx.change.minor())
        .bind(&tx.customer_name)
        .bind(&tx.note)
        .bind(tx.status.as_str())
        .bind(tx.created_at)
        .bind(tx.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a transaction by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Transaction>> {
        let row = sqlx::query_as::<_, TransactionRow>(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Transaction::try_from).transpose()
    }

    /// Gets a transaction by its receipt number.
    pub async fn get_by_receipt(&self, receipt_number: &str) -> DbResult<Option<Transaction>> {
        let row = sqlx::query_as::<_, TransactionRow>(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE receipt_number = ?"
        ))
        .bind(receipt_number)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Transaction::try_from).transpose()
    }

    /// Lists transactions matching the filter.
    pub async fn list(&self, filter: &TransactionFilter) -> DbResult<Vec<Transaction>> {
        debug!(?filter, "Listing transactions");

        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE 1 = 1"
        ));

        if let Some(status) = filter.status {
            qb.push(" AND status = ").push_bind(status.as_str());
        }

        if let Some(method) = filter.payment_method {
            qb.push(" AND payment_method = ").push_bind(method.as_str());
        }

        if let Some(start) = filter.start {
            qb.push(" AND created_at >= ").push_bind(start);
        }

        if let Some(end) = filter.end {
            qb.push(" AND created_at < ").push_bind(end);
        }

        qb.push(" ORDER BY ")
            .push(transaction_sort_column(filter.sort.as_deref()))
            .push(filter.order.sql());

        if let Some(limit) = filter.limit {
            qb.push(" LIMIT ").push_bind(limit);
        }

        let rows: Vec<TransactionRow> = qb.build_query_as().fetch_all(&self.pool).await?;

        rows.into_iter().map(Transaction::try_from).collect()
    }

    /// Lists completed transactions in a time range, optionally narrowed to
    /// one payment method. This is the input to the summary aggregator;
    /// cancelled and pending sales never count toward revenue.
    pub async fn list_completed(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
        payment_method: Option<PaymentMethod>,
    ) -> DbResult<Vec<Transaction>> {
        self.list(&TransactionFilter {
            status: Some(TransactionStatus::Completed),
            payment_method,
            start,
            end,
            sort: None,
            order: SortOrder::Asc,
            limit: None,
        })
        .await
    }

    /// Atomically claims a transaction for cancellation.
    ///
    /// The WHERE clause excludes already-cancelled rows, so of two racing
    /// cancellations exactly one observes `rows_affected = 1` and proceeds
    /// to restore stock; the other gets `Ok(false)`.
    ///
    /// ## Returns
    /// * `Ok(true)` - This caller won the claim; stock restoration may run
    /// * `Ok(false)` - Already cancelled (or claimed by a racing caller)
    /// * `Err(DbError::NotFound)` - No such transaction
    pub async fn claim_cancelled(&self, id: &str) -> DbResult<bool> {
        debug!(id = %id, "Claiming transaction for cancellation");

        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE transactions
             SET status = 'cancelled', updated_at = ?
             WHERE id = ? AND status != 'cancelled'",
        )
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() > 0 {
            return Ok(true);
        }

        // Distinguish "already cancelled" from "does not exist"
        let exists: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM transactions WHERE id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        if exists == 0 {
            return Err(DbError::not_found("Transaction", id));
        }

        Ok(false)
    }

    /// Sets the status directly. Used to revert a cancellation claim when
    /// stock restoration fails after the claim succeeded.
    pub async fn set_status(&self, id: &str, status: TransactionStatus) -> DbResult<()> {
        debug!(id = %id, status = %status.as_str(), "Setting transaction status");

        let now = Utc::now();

        let result = sqlx::query("UPDATE transactions SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(now)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Transaction", id));
        }

        Ok(())
    }

    /// Counts all transactions (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM transactions")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Helper to generate a new transaction ID.
pub fn generate_transaction_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use kasir_core::{LineItem, Quantity, UnitType};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn sample_transaction(receipt: &str) -> Transaction {
        let now = Utc::now();
        Transaction {
            id: generate_transaction_id(),
            receipt_number: receipt.to_string(),
            items: vec![LineItem {
                product_id: "p-1".to_string(),
                name: "Beras Premium 5kg".to_string(),
                price: Money::from_minor(15_000),
                unit_type: UnitType::Discrete,
                quantity: Quantity::Discrete { quantity: 2 },
                subtotal: Money::from_minor(30_000),
            }],
            subtotal: Money::from_minor(30_000),
            discount: Money::zero(),
            total: Money::from_minor(30_000),
            payment_method: PaymentMethod::Cash,
            cash_received: Money::from_minor(50_000),
            change: Money::from_minor(20_000),
            customer_name: "Customer".to_string(),
            note: String::new(),
            status: TransactionStatus::Completed,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn insert_and_fetch_preserves_snapshot() {
        let db = test_db().await;
        let repo = db.transactions();

        let tx = sample_transaction("INV/260830/AB12");
        repo.insert(&tx).await.unwrap();

        let fetched = repo.get_by_id(&tx.id).await.unwrap().unwrap();
        assert_eq!(fetched.receipt_number, "INV/260830/AB12");
        assert_eq!(fetched.items.len(), 1);
        assert_eq!(fetched.items[0].name, "Beras Premium 5kg");
        assert_eq!(fetched.items[0].subtotal, Money::from_minor(30_000));
        assert_eq!(
            fetched.items[0].quantity,
            Quantity::Discrete { quantity: 2 }
        );

        let by_receipt = repo
            .get_by_receipt("INV/260830/AB12")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_receipt.id, tx.id);
    }

    #[tokio::test]
    async fn duplicate_receipt_number_rejected() {
        let db = test_db().await;
        let repo = db.transactions();

        repo.insert(&sample_transaction("INV/260830/SAME"))
            .await
            .unwrap();
        let err = repo
            .insert(&sample_transaction("INV/260830/SAME"))
            .await
            .unwrap_err();
        assert!(err.is_unique_violation_on("receipt_number"));
    }

    #[tokio::test]
    async fn claim_cancelled_wins_exactly_once() {
        let db = test_db().await;
        let repo = db.transactions();

        let tx = sample_transaction("INV/260830/CC01");
        repo.insert(&tx).await.unwrap();

        assert!(repo.claim_cancelled(&tx.id).await.unwrap());
        // Second attempt loses the claim
        assert!(!repo.claim_cancelled(&tx.id).await.unwrap());

        let fetched = repo.get_by_id(&tx.id).await.unwrap().unwrap();
        assert_eq!(fetched.status, TransactionStatus::Cancelled);
    }

    #[tokio::test]
    async fn claim_cancelled_missing_transaction_is_not_found() {
        let db = test_db().await;
        let repo = db.transactions();

        let err = repo.claim_cancelled("no-such-id").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn list_filters_by_status_and_method() {
        let db = test_db().await;
        let repo = db.transactions();

        let mut cash = sample_transaction("INV/260830/F001");
        cash.payment_method = PaymentMethod::Cash;
        let mut qris = sample_transaction("INV/260830/F002");
        qris.payment_method = PaymentMethod::Qris;
        let mut cancelled = sample_transaction("INV/260830/F003");
        cancelled.status = TransactionStatus::Cancelled;

        repo.insert(&cash).await.unwrap();
        repo.insert(&qris).await.unwrap();
        repo.insert(&cancelled).await.unwrap();

        let completed = repo.list_completed(None, None, None).await.unwrap();
        assert_eq!(completed.len(), 2);

        let qris_only = repo
            .list_completed(None, None, Some(PaymentMethod::Qris))
            .await
            .unwrap();
        assert_eq!(qris_only.len(), 1);
        assert_eq!(qris_only[0].receipt_number, "INV/260830/F002");

        let all = repo.list(&TransactionFilter::default()).await.unwrap();
        assert_eq!(all.len(), 3);
    }
}
