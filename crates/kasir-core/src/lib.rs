//! # kasir-core: Pure Business Logic for Kasir POS
//!
//! This crate is the **heart** of the Kasir POS backend. It contains all
//! business logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                       Kasir POS Architecture                        │
//! │                                                                     │
//! │  ┌─────────────────────────────────────────────────────────────┐   │
//! │  │                  HTTP API (apps/server)                     │   │
//! │  │    /api/transactions, /api/products, /api/auth              │   │
//! │  └─────────────────────────────┬───────────────────────────────┘   │
//! │                                │                                    │
//! │  ┌─────────────────────────────▼───────────────────────────────┐   │
//! │  │           kasir-db (ledger + processor + repos)             │   │
//! │  └─────────────────────────────┬───────────────────────────────┘   │
//! │                                │                                    │
//! │  ┌─────────────────────────────▼───────────────────────────────┐   │
//! │  │               ★ kasir-core (THIS CRATE) ★                   │   │
//! │  │                                                             │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌───────────┐ ┌─────────┐        │   │
//! │  │   │  types  │ │  money  │ │validation │ │ receipt │        │   │
//! │  │   │ Product │ │  Money  │ │   rules   │ │ INV/... │        │   │
//! │  │   │   Tx    │ │         │ │           │ │         │        │   │
//! │  │   └─────────┘ └─────────┘ └───────────┘ └─────────┘        │   │
//! │  │                                                             │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS        │   │
//! │  └─────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Transaction, LineItem, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`error`] - Domain error types
//! - [`validation`] - Catalog validation and business rules
//! - [`receipt`] - Receipt number formatting and generation
//! - [`summary`] - Read-side sales rollups
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic given its inputs
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: Monetary values are i64 minor units, never floats
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//! 5. **Illegal states unrepresentable**: a line item is either
//!    `Discrete { quantity }` or `Weighed { weight }`, never both

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod receipt;
pub mod summary;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Minimum weight for a weighed line item, in kilograms.
///
/// The scale at the counter cannot reliably measure below this, and the
/// catalog prices weighed goods per whole kilogram.
pub const MIN_WEIGHT_KG: f64 = 0.1;

/// Customer name recorded when the cashier does not enter one.
pub const DEFAULT_CUSTOMER_NAME: &str = "Customer";

/// Maximum line items allowed in a single transaction.
///
/// ## Business Reason
/// Prevents runaway carts and keeps a single ledger batch bounded.
pub const MAX_TRANSACTION_ITEMS: usize = 100;

/// Maximum quantity of a single discrete item.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g. typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;
