//! # Repository Layer
//!
//! One repository per aggregate. Repositories own the SQL; callers deal in
//! `kasir-core` domain types only. Each repository holds a cheap clone of
//! the connection pool, so they are created per call site via
//! [`crate::Database`] accessors.

pub mod product;
pub mod transaction;

pub use product::{ProductFilter, ProductRepository};
pub use transaction::{TransactionFilter, TransactionRepository};

/// Sort direction for list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub(crate) fn sql(self) -> &'static str {
        match self {
            SortOrder::Asc => " ASC",
            SortOrder::Desc => " DESC",
        }
    }

    /// Parses `"asc"` / `"desc"` (query-string convention); anything else
    /// falls back to descending.
    pub fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("asc") {
            SortOrder::Asc
        } else {
            SortOrder::Desc
        }
    }
}
