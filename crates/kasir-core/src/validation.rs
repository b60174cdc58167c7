//! # Validation Module
//!
//! The catalog validator and request-level business rules.
//!
//! ## Validation Layers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                              │
//! │                                                                     │
//! │  Layer 1: HTTP handler (deserialization)                            │
//! │  ├── Type validation (serde rejects malformed payloads)             │
//! │  └── UUID format checks                                             │
//! │           │                                                         │
//! │           ▼                                                         │
//! │  Layer 2: THIS MODULE - business rule validation                    │
//! │  ├── Cart-level rules (non-empty, amounts, payment sufficiency)     │
//! │  ├── Line-item rules (quantity >= 1, weight >= 0.1)                 │
//! │  └── Advisory stock check for discrete items                        │
//! │           │                                                         │
//! │           ▼                                                         │
//! │  Layer 3: Stock ledger (SQLite conditional update)                  │
//! │  └── Authoritative stock check at mutation time                     │
//! │                                                                     │
//! │  The layer-2 stock check reads a possibly stale value; only the     │
//! │  ledger's conditional update decides whether a sale goes through.   │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{LineItem, Product, Quantity, RequestedItem, TransactionRequest, UnitType};
use crate::{MAX_ITEM_QUANTITY, MAX_TRANSACTION_ITEMS, MIN_WEIGHT_KG};
use crate::types::PaymentMethod;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Catalog Validator
// =============================================================================

/// Resolves a requested cart line against its catalog product.
///
/// ## What This Does
/// 1. Resolves the effective unit type: explicit request value, else the
///    product's stored unit type (defaulting to discrete).
/// 2. Enforces quantity/weight legality for that unit type.
/// 3. For discrete items, checks stock advisorily; the ledger re-checks
///    authoritatively inside the conditional update.
/// 4. Produces the frozen snapshot: name, effective unit price (explicit
///    override, else the catalog price), and the line subtotal computed
///    exactly once.
///
/// ## Errors
/// - [`CoreError::InvalidQuantity`] - missing/illegal quantity or weight
/// - [`CoreError::InsufficientStock`] - advisory discrete stock failure
pub fn resolve_line_item(product: &Product, item: &RequestedItem) -> CoreResult<LineItem> {
    let unit_type = item.unit_type.unwrap_or(product.unit_type);
    let price = item.price.unwrap_or(product.price);

    let (quantity, subtotal) = match unit_type {
        UnitType::Weighed => {
            let weight = item.weight.ok_or_else(|| {
                CoreError::InvalidQuantity(format!(
                    "Each kg-based item must have weight >= {MIN_WEIGHT_KG}"
                ))
            })?;
            if !weight.is_finite() || weight < MIN_WEIGHT_KG {
                return Err(CoreError::InvalidQuantity(format!(
                    "Each kg-based item must have weight >= {MIN_WEIGHT_KG}"
                )));
            }
            (Quantity::Weighed { weight }, price.multiply_weight(weight))
        }
        UnitType::Discrete => {
            let quantity = item.quantity.ok_or_else(|| {
                CoreError::InvalidQuantity(
                    "Each unit-based item must have quantity >= 1".to_string(),
                )
            })?;
            if quantity < 1 {
                return Err(CoreError::InvalidQuantity(
                    "Each unit-based item must have quantity >= 1".to_string(),
                ));
            }
            if quantity > MAX_ITEM_QUANTITY {
                return Err(CoreError::InvalidQuantity(format!(
                    "Quantity cannot exceed {MAX_ITEM_QUANTITY}"
                )));
            }

            // Advisory only. The race window between this read and the
            // stock mutation is closed by the ledger's conditional update.
            if product.stock < quantity as f64 {
                return Err(CoreError::InsufficientStock {
                    name: product.name.clone(),
                    available: product.stock,
                    requested: quantity as f64,
                });
            }

            (
                Quantity::Discrete { quantity },
                price.multiply_quantity(quantity),
            )
        }
    };

    Ok(LineItem {
        product_id: product.id.clone(),
        name: product.name.clone(),
        price,
        unit_type,
        quantity,
        subtotal,
    })
}

// =============================================================================
// Cart-Level Rules
// =============================================================================

/// Validates the cart-level fields of a transaction request.
///
/// Runs before any product lookup or stock mutation; a failure here aborts
/// the whole request with zero side effects.
pub fn validate_transaction_request(req: &TransactionRequest) -> CoreResult<()> {
    if req.items.is_empty() {
        return Err(ValidationError::Required {
            field: "items".to_string(),
        }
        .into());
    }

    if req.items.len() > MAX_TRANSACTION_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 1,
            max: MAX_TRANSACTION_ITEMS as i64,
        }
        .into());
    }

    validate_non_negative("subtotal", req.subtotal)?;
    validate_non_negative("total", req.total)?;
    validate_non_negative("cashReceived", req.cash_received)?;
    if let Some(discount) = req.discount {
        validate_non_negative("discount", discount)?;
    }

    if req.payment_method == PaymentMethod::Cash && req.cash_received < req.total {
        return Err(CoreError::InsufficientPayment {
            received: req.cash_received.minor(),
            total: req.total.minor(),
        });
    }

    Ok(())
}

fn validate_non_negative(field: &str, amount: Money) -> Result<(), ValidationError> {
    if amount.is_negative() {
        return Err(ValidationError::MustBeNonNegative {
            field: field.to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Field Validators (catalog CRUD)
// =============================================================================

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty
/// - Must be between 3 and 200 characters
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.len() < 3 {
        return Err(ValidationError::TooShort {
            field: "name".to_string(),
            min: 3,
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a SKU (Stock Keeping Unit).
///
/// ## Rules
/// - Must not be empty
/// - At most 50 characters
/// - Only alphanumeric characters, hyphens, underscores
pub fn validate_sku(sku: &str) -> ValidationResult<()> {
    let sku = sku.trim();

    if sku.is_empty() {
        return Err(ValidationError::Required {
            field: "sku".to_string(),
        });
    }

    if sku.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "sku".to_string(),
            max: 50,
        });
    }

    if !sku
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "sku".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a price in minor currency units.
///
/// Zero is allowed (free items); negative is not.
pub fn validate_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::MustBeNonNegative {
            field: "price".to_string(),
        });
    }
    Ok(())
}

/// Validates a stock level.
///
/// Catalog entry and edits may never set negative stock.
pub fn validate_stock(stock: f64) -> ValidationResult<()> {
    if !stock.is_finite() || stock < 0.0 {
        return Err(ValidationError::MustBeNonNegative {
            field: "stock".to_string(),
        });
    }
    Ok(())
}

/// Validates a UUID string format.
///
/// Malformed identifiers are a 400, not a 404: the resource space simply
/// does not contain them.
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn product(stock: f64, unit_type: UnitType) -> Product {
        Product {
            id: "550e8400-e29b-41d4-a716-446655440000".to_string(),
            name: "Telur Ayam".to_string(),
            price: Money::from_minor(2_500),
            category: "telur".to_string(),
            stock,
            unit_type,
            image: "https://example.com/telur.jpg".to_string(),
            description: String::new(),
            sku: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn requested(quantity: Option<i64>, weight: Option<f64>) -> RequestedItem {
        RequestedItem {
            product_id: "550e8400-e29b-41d4-a716-446655440000".to_string(),
            quantity,
            weight,
            price: None,
            unit_type: None,
        }
    }

    #[test]
    fn test_resolve_discrete_snapshot() {
        let p = product(10.0, UnitType::Discrete);
        let line = resolve_line_item(&p, &requested(Some(3), None)).unwrap();

        assert_eq!(line.name, "Telur Ayam");
        assert_eq!(line.price, Money::from_minor(2_500));
        assert_eq!(line.quantity, Quantity::Discrete { quantity: 3 });
        assert_eq!(line.subtotal, Money::from_minor(7_500));
    }

    #[test]
    fn test_resolve_weighed_snapshot() {
        let mut p = product(5.0, UnitType::Weighed);
        p.price = Money::from_minor(20_000);
        let line = resolve_line_item(&p, &requested(None, Some(1.5))).unwrap();

        assert_eq!(line.unit_type, UnitType::Weighed);
        assert_eq!(line.quantity, Quantity::Weighed { weight: 1.5 });
        assert_eq!(line.subtotal, Money::from_minor(30_000));
    }

    #[test]
    fn test_price_override_wins_over_catalog_price() {
        let p = product(10.0, UnitType::Discrete);
        let mut item = requested(Some(2), None);
        item.price = Some(Money::from_minor(2_000));

        let line = resolve_line_item(&p, &item).unwrap();
        assert_eq!(line.price, Money::from_minor(2_000));
        assert_eq!(line.subtotal, Money::from_minor(4_000));
    }

    #[test]
    fn test_unit_type_override_wins_over_product() {
        // Product is discrete but the request sells it by weight.
        let p = product(10.0, UnitType::Discrete);
        let mut item = requested(None, Some(0.5));
        item.unit_type = Some(UnitType::Weighed);

        let line = resolve_line_item(&p, &item).unwrap();
        assert_eq!(line.unit_type, UnitType::Weighed);
    }

    #[test]
    fn test_discrete_requires_quantity() {
        let p = product(10.0, UnitType::Discrete);
        assert!(matches!(
            resolve_line_item(&p, &requested(None, None)),
            Err(CoreError::InvalidQuantity(_))
        ));
        assert!(matches!(
            resolve_line_item(&p, &requested(Some(0), None)),
            Err(CoreError::InvalidQuantity(_))
        ));
    }

    #[test]
    fn test_weighed_requires_minimum_weight() {
        let p = product(5.0, UnitType::Weighed);
        assert!(matches!(
            resolve_line_item(&p, &requested(None, None)),
            Err(CoreError::InvalidQuantity(_))
        ));
        assert!(matches!(
            resolve_line_item(&p, &requested(None, Some(0.05))),
            Err(CoreError::InvalidQuantity(_))
        ));
        assert!(resolve_line_item(&p, &requested(None, Some(0.1))).is_ok());
    }

    #[test]
    fn test_advisory_stock_check_for_discrete() {
        let p = product(2.0, UnitType::Discrete);
        let err = resolve_line_item(&p, &requested(Some(3), None)).unwrap_err();
        match err {
            CoreError::InsufficientStock { name, available, requested } => {
                assert_eq!(name, "Telur Ayam");
                assert_eq!(available, 2.0);
                assert_eq!(requested, 3.0);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }
    }

    #[test]
    fn test_weighed_has_no_advisory_stock_check() {
        // Only the ledger enforces weighed stock; validation passes.
        let p = product(1.0, UnitType::Weighed);
        assert!(resolve_line_item(&p, &requested(None, Some(2.0))).is_ok());
    }

    fn request(payment_method: PaymentMethod, cash_received: i64, total: i64) -> TransactionRequest {
        TransactionRequest {
            items: vec![requested(Some(1), None)],
            subtotal: Money::from_minor(total),
            discount: None,
            total: Money::from_minor(total),
            payment_method,
            cash_received: Money::from_minor(cash_received),
            change: None,
            customer_name: None,
            note: None,
        }
    }

    #[test]
    fn test_cash_payment_must_cover_total() {
        let req = request(PaymentMethod::Cash, 50_000, 70_000);
        assert!(matches!(
            validate_transaction_request(&req),
            Err(CoreError::InsufficientPayment { received: 50_000, total: 70_000 })
        ));
    }

    #[test]
    fn test_non_cash_payment_skips_sufficiency_check() {
        let req = request(PaymentMethod::Qris, 0, 70_000);
        assert!(validate_transaction_request(&req).is_ok());
    }

    #[test]
    fn test_empty_items_rejected() {
        let mut req = request(PaymentMethod::Cash, 10_000, 10_000);
        req.items.clear();
        assert!(matches!(
            validate_transaction_request(&req),
            Err(CoreError::Validation(ValidationError::Required { .. }))
        ));
    }

    #[test]
    fn test_negative_amounts_rejected() {
        let mut req = request(PaymentMethod::Card, 0, 10_000);
        req.subtotal = Money::from_minor(-1);
        assert!(validate_transaction_request(&req).is_err());
    }

    #[test]
    fn test_validate_product_name() {
        assert!(validate_product_name("Telur Ayam Kampung").is_ok());
        assert!(validate_product_name("").is_err());
        assert!(validate_product_name("ab").is_err());
        assert!(validate_product_name(&"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_sku() {
        assert!(validate_sku("TELUR-001").is_ok());
        assert!(validate_sku("has space").is_err());
        assert!(validate_sku(&"A".repeat(100)).is_err());
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_uuid("not-a-uuid").is_err());
        assert!(validate_uuid("").is_err());
    }
}
