//! # kasir-db: Database Layer for Kasir POS
//!
//! This crate provides database access for the Kasir POS backend.
//! It uses SQLite for storage with sqlx for async operations, and hosts
//! the two stateful engines of the system: the stock ledger and the
//! transaction processor.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Kasir POS Data Flow                              │
//! │                                                                         │
//! │  HTTP handler (POST /api/transactions)                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     kasir-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │  Processor    │    │  StockLedger  │    │ Repositories │  │   │
//! │  │   │ (processor.rs)│───►│  (ledger.rs)  │───►│ (repository/)│  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────┬───────┘  │   │
//! │  │                                                     │          │   │
//! │  │   ┌───────────────┐    ┌───────────────┐           │          │   │
//! │  │   │   Database    │    │  Migrations   │           │          │   │
//! │  │   │   (pool.rs)   │    │  (embedded)   │◄──────────┘          │   │
//! │  │   └───────────────┘    └───────────────┘                      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database (kasir.db)                  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database and orchestration error types
//! - [`repository`] - Repository implementations (product, transaction)
//! - [`ledger`] - All-or-nothing stock delta batches
//! - [`processor`] - Sale creation / cancellation orchestration
//!
//! ## Usage
//!
//! ```rust,ignore
//! use kasir_db::{Database, DbConfig, TransactionProcessor};
//!
//! let db = Database::new(DbConfig::new("path/to/kasir.db")).await?;
//! let processor = TransactionProcessor::new(db.clone());
//! let sale = processor.create(&request).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod ledger;
pub mod migrations;
pub mod pool;
pub mod processor;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult, ProcessError, ProcessResult};
pub use ledger::{StockDelta, StockLedger};
pub use pool::{Database, DbConfig};
pub use processor::{ReceiptSource, TransactionProcessor};

// Repository re-exports for convenience
pub use repository::product::{ProductFilter, ProductRepository};
pub use repository::transaction::{TransactionFilter, TransactionRepository};
pub use repository::SortOrder;
