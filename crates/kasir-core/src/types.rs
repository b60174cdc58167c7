//! # Domain Types
//!
//! Core domain types used throughout Kasir POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                │
//! │                                                                     │
//! │  ┌────────────────┐   ┌──────────────────┐   ┌──────────────────┐  │
//! │  │    Product     │   │   Transaction    │   │    LineItem      │  │
//! │  │  ────────────  │   │  ──────────────  │   │  ──────────────  │  │
//! │  │  id (UUID)     │   │  id (UUID)       │   │  product_id      │  │
//! │  │  name, price   │   │  receipt_number  │   │  name snapshot   │  │
//! │  │  stock (f64)   │   │  status, totals  │   │  price snapshot  │  │
//! │  │  unit_type     │   │  items (inline)  │   │  Quantity        │  │
//! │  └────────────────┘   └──────────────────┘   └──────────────────┘  │
//! │                                                                     │
//! │  ┌────────────────┐   ┌──────────────────┐   ┌──────────────────┐  │
//! │  │   UnitType     │   │  PaymentMethod   │   │TransactionStatus │  │
//! │  │  Discrete      │   │  Cash            │   │  Pending         │  │
//! │  │  Weighed       │   │  Qris (e-wallet) │   │  Completed       │  │
//! │  └────────────────┘   │  Card            │   │  Cancelled       │  │
//! │                       └──────────────────┘   └──────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! A [`LineItem`] freezes the product name and unit price at sale time.
//! Later catalog edits must never alter historical transactions, so
//! transactions embed their items inline rather than joining back to the
//! catalog on read.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Unit Type
// =============================================================================

/// How a product is measured at the counter.
///
/// Wire names are `"unit"` and `"kg"`, the vocabulary the catalog and the
/// frontend already speak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitType {
    /// Sold by integer count (packaged goods).
    #[serde(rename = "unit")]
    Discrete,
    /// Sold by fractional weight in kilograms (produce), minimum 0.1 kg.
    #[serde(rename = "kg")]
    Weighed,
}

impl UnitType {
    /// Stable string form, used for persistence and wire payloads.
    pub const fn as_str(&self) -> &'static str {
        match self {
            UnitType::Discrete => "unit",
            UnitType::Weighed => "kg",
        }
    }

    /// Parses the stable string form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "unit" => Some(UnitType::Discrete),
            "kg" => Some(UnitType::Weighed),
            _ => None,
        }
    }
}

impl Default for UnitType {
    fn default() -> Self {
        UnitType::Discrete
    }
}

// =============================================================================
// Quantity
// =============================================================================

/// How much of a product a line item covers.
///
/// A tagged variant rather than optional `quantity`/`weight` fields on one
/// struct: a line item is exactly one of the two, and the type system
/// enforces it. On the wire this flattens to the original `quantity` or
/// `weight` field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Quantity {
    /// Integer count of a discrete-unit product.
    Discrete { quantity: i64 },
    /// Fractional weight of a weighed product, in kilograms.
    Weighed { weight: f64 },
}

impl Quantity {
    /// The unit type this quantity implies.
    pub const fn unit_type(&self) -> UnitType {
        match self {
            Quantity::Discrete { .. } => UnitType::Discrete,
            Quantity::Weighed { .. } => UnitType::Weighed,
        }
    }

    /// The magnitude as a stock delta: count for discrete, kg for weighed.
    pub fn magnitude(&self) -> f64 {
        match self {
            Quantity::Discrete { quantity } => *quantity as f64,
            Quantity::Weighed { weight } => *weight,
        }
    }
}

// =============================================================================
// Payment Method
// =============================================================================

/// Accepted tender types. `Qris` is the electronic-wallet method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Qris,
    Card,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 3] =
        [PaymentMethod::Cash, PaymentMethod::Qris, PaymentMethod::Card];

    /// Stable string form, used for persistence and wire payloads.
    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Qris => "qris",
            PaymentMethod::Card => "card",
        }
    }

    /// Parses the stable string form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "cash" => Some(PaymentMethod::Cash),
            "qris" => Some(PaymentMethod::Qris),
            "card" => Some(PaymentMethod::Card),
            _ => None,
        }
    }
}

// =============================================================================
// Transaction Status
// =============================================================================

/// The status of a sale transaction.
///
/// ## State Machine
/// ```text
/// pending (reserved, unused) ──► completed ──► cancelled (terminal)
/// ```
/// `completed` is assigned at creation; the only transition afterwards is
/// to `cancelled`, exactly once. Price fields never change after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    /// Reserved initial state; no current flow produces it.
    Pending,
    /// Sale has been paid and stock adjusted.
    Completed,
    /// Sale was cancelled and stock restored. Terminal.
    Cancelled,
}

impl TransactionStatus {
    /// Stable string form, used for persistence and wire payloads.
    pub const fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Completed => "completed",
            TransactionStatus::Cancelled => "cancelled",
        }
    }

    /// Parses the stable string form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(TransactionStatus::Pending),
            "completed" => Some(TransactionStatus::Completed),
            "cancelled" => Some(TransactionStatus::Cancelled),
            _ => None,
        }
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
///
/// Stock is an f64 because weighed goods hold fractional kilograms; for
/// discrete products it always holds an integral value. Stock is mutated
/// only through the stock ledger's conditional adjustment, never by a
/// direct field overwrite from a sale. Products are never deleted, only
/// deactivated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown to the cashier and on receipts.
    pub name: String,

    /// Unit price in minor currency units. Per kilogram for weighed goods.
    pub price: Money,

    /// Free-form category used for catalog filtering.
    pub category: String,

    /// Current stock level: count for discrete, kilograms for weighed.
    pub stock: f64,

    /// How this product is measured.
    pub unit_type: UnitType,

    /// Image URL for the catalog UI.
    pub image: String,

    /// Optional description.
    #[serde(default)]
    pub description: String,

    /// Stock Keeping Unit - optional unique business identifier.
    pub sku: Option<String>,

    /// Whether the product is active (soft delete).
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Line Item
// =============================================================================

/// A line item in a transaction.
///
/// Point-in-time snapshot: name and price are copied from the product at
/// sale time, and `subtotal` is computed once and never recomputed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// The catalog product this line refers to.
    pub product_id: String,

    /// Product name at time of sale (frozen).
    pub name: String,

    /// Effective unit price at time of sale (frozen). Either the request's
    /// explicit override or the catalog price.
    pub price: Money,

    /// How the product was measured at sale time.
    pub unit_type: UnitType,

    /// Count or weight; flattens to `quantity` or `weight` on the wire.
    #[serde(flatten)]
    pub quantity: Quantity,

    /// price x (quantity or weight), computed once at sale time.
    pub subtotal: Money,
}

// =============================================================================
// Transaction
// =============================================================================

/// An immutable sale record.
///
/// Once created, only `status` may change, and only to `Cancelled`.
/// Line-item snapshots are embedded inline; there is no separate line-item
/// collection to join against.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Human-readable unique reference, `INV/YYMMDD/XXXX`.
    pub receipt_number: String,

    /// Ordered line-item snapshots.
    pub items: Vec<LineItem>,

    pub subtotal: Money,

    /// Informational discount; not folded into `total` by the processor.
    pub discount: Money,

    pub total: Money,
    pub payment_method: PaymentMethod,
    pub cash_received: Money,
    pub change: Money,

    pub customer_name: String,

    #[serde(default)]
    pub note: String,

    pub status: TransactionStatus,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    /// Stock deltas that reverse this transaction's effect: positive
    /// quantity for discrete lines, positive weight for weighed lines.
    pub fn restoration_deltas(&self) -> Vec<(String, f64)> {
        self.items
            .iter()
            .map(|item| (item.product_id.clone(), item.quantity.magnitude()))
            .collect()
    }
}

// =============================================================================
// Request DTOs
// =============================================================================

/// One requested cart line, as submitted by the client.
///
/// `quantity` and `weight` stay optional here - which one is required
/// depends on the resolved unit type, and the catalog validator turns this
/// into a well-formed [`LineItem`] or rejects it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestedItem {
    pub product_id: String,

    pub quantity: Option<i64>,
    pub weight: Option<f64>,

    /// Explicit unit-price override; defaults to the catalog price.
    pub price: Option<Money>,

    /// Explicit unit-type override; defaults to the product's unit type.
    pub unit_type: Option<UnitType>,
}

/// A cart submission: the body of `POST /api/transactions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    pub items: Vec<RequestedItem>,

    pub subtotal: Money,

    #[serde(default)]
    pub discount: Option<Money>,

    pub total: Money,
    pub payment_method: PaymentMethod,
    pub cash_received: Money,

    #[serde(default)]
    pub change: Option<Money>,

    #[serde(default)]
    pub customer_name: Option<String>,

    #[serde(default)]
    pub note: Option<String>,
}

// =============================================================================
// Unit Tests
// =============================================================================
