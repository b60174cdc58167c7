//! # Error Types
//!
//! Domain-specific error types for kasir-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                 │
//! │                                                                     │
//! │  kasir-core errors (this file)                                      │
//! │  ├── CoreError        - Business rule violations                    │
//! │  └── ValidationError  - Input validation failures                   │
//! │                                                                     │
//! │  kasir-db errors (separate crate)                                   │
//! │  └── DbError          - Database operation failures                 │
//! │                                                                     │
//! │  HTTP errors (apps/server)                                          │
//! │  └── ApiError         - What the client sees (status + JSON body)   │
//! │                                                                     │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Client    │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product name, amounts, etc.)
//! 3. Errors are enum variants, never String
//! 4. Each variant maps to exactly one HTTP status in the server

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These represent business rule violations detected while validating or
/// processing a sale. Every failure here happens before, or instead of,
/// any persisted side effect.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product cannot be found in the catalog.
    #[error("Product with ID {0} not found")]
    ProductNotFound(String),

    /// Insufficient stock to complete the sale.
    ///
    /// Raised either by the advisory check during validation or,
    /// authoritatively, by the stock ledger's conditional update.
    #[error("Insufficient stock for product {name}. Available: {available}")]
    InsufficientStock {
        name: String,
        available: f64,
        requested: f64,
    },

    /// A discrete line item is missing a quantity, or a weighed line item
    /// is missing a weight, or the value is out of range.
    #[error("{0}")]
    InvalidQuantity(String),

    /// Cash received is below the transaction total.
    #[error("Cash received must be at least equal to total (received {received}, total {total})")]
    InsufficientPayment { received: i64, total: i64 },

    /// Transaction not found.
    #[error("Transaction with ID {0} not found")]
    TransactionNotFound(String),

    /// Transaction is already cancelled; cancellation is terminal and
    /// stock must never be restored twice.
    #[error("Transaction {0} is already cancelled")]
    AlreadyCancelled(String),

    /// Receipt number generation exhausted its retry budget without
    /// finding an unused suffix.
    #[error("Failed to generate a unique receipt number after {attempts} attempts")]
    ReceiptGenerationFailed { attempts: u32 },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when a request doesn't meet field-level requirements.
/// Detected before any business logic runs, with zero side effects.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value must be non-negative.
    #[error("{field} is required and must be non-negative")]
    MustBeNonNegative { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (e.g. malformed UUID).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in the allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
