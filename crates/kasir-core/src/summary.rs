//! # Sales Summaries
//!
//! Read-side rollups over persisted transactions.
//!
//! Pure arithmetic: the caller fetches the (already filtered) transaction
//! set and these functions fold it. No side effects, so any summary is
//! recomputable idempotently from persisted state alone.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::{PaymentMethod, Transaction};

// =============================================================================
// Summary Report
// =============================================================================

/// Per-payment-method revenue breakdown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentBreakdown {
    pub cash: Money,
    pub qris: Money,
    pub card: Money,
}

impl PaymentBreakdown {
    fn add(&mut self, method: PaymentMethod, amount: Money) {
        match method {
            PaymentMethod::Cash => self.cash += amount,
            PaymentMethod::Qris => self.qris += amount,
            PaymentMethod::Card => self.card += amount,
        }
    }
}

/// Aggregate report over a set of completed transactions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesSummary {
    pub total_transactions: usize,
    pub total_amount: Money,
    pub total_discount: Money,

    /// Sum of line quantities. Weighed-item weights are summed under the
    /// same field, so this can be fractional.
    pub total_items: f64,

    pub by_payment_method: PaymentBreakdown,
}

/// Folds a transaction set into a [`SalesSummary`].
///
/// The caller is responsible for restricting the input to `completed`
/// transactions (financial summaries never count cancelled sales).
pub fn compute_summary(transactions: &[Transaction]) -> SalesSummary {
    let mut summary = SalesSummary {
        total_transactions: transactions.len(),
        total_amount: Money::zero(),
        total_discount: Money::zero(),
        total_items: 0.0,
        by_payment_method: PaymentBreakdown::default(),
    };

    for tx in transactions {
        summary.total_amount += tx.total;
        summary.total_discount += tx.discount;
        summary.total_items += tx
            .items
            .iter()
            .map(|item| item.quantity.magnitude())
            .sum::<f64>();
        summary.by_payment_method.add(tx.payment_method, tx.total);
    }

    summary
}

// =============================================================================
// Daily Sales
// =============================================================================

/// Today's-sales rollup for the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySales {
    /// The UTC day this rollup covers, `YYYY-MM-DD`.
    pub date: String,
    pub total_sales: Money,
    pub total_transactions: usize,
    pub total_discount: Money,

    /// Mean completed-transaction value; 0 when there were no sales.
    pub average_transaction: f64,
}

/// Folds one UTC day's completed transactions into a [`DailySales`].
pub fn compute_daily_sales(date: NaiveDate, transactions: &[Transaction]) -> DailySales {
    let total_sales: Money = transactions
        .iter()
        .fold(Money::zero(), |acc, tx| acc + tx.total);
    let total_discount: Money = transactions
        .iter()
        .fold(Money::zero(), |acc, tx| acc + tx.discount);
    let count = transactions.len();

    DailySales {
        date: date.format("%Y-%m-%d").to_string(),
        total_sales,
        total_transactions: count,
        total_discount,
        average_transaction: if count > 0 {
            total_sales.minor() as f64 / count as f64
        } else {
            0.0
        },
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{LineItem, Quantity, TransactionStatus, UnitType};
    use chrono::Utc;

    fn tx(method: PaymentMethod, total: i64, discount: i64, items: Vec<LineItem>) -> Transaction {
        Transaction {
            id: uuid::Uuid::new_v4().to_string(),
            receipt_number: format!("INV/260830/{:04}", total % 10_000),
            items,
            subtotal: Money::from_minor(total),
            discount: Money::from_minor(discount),
            total: Money::from_minor(total),
            payment_method: method,
            cash_received: Money::from_minor(total),
            change: Money::zero(),
            customer_name: "Customer".to_string(),
            note: String::new(),
            status: TransactionStatus::Completed,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn discrete_line(quantity: i64) -> LineItem {
        LineItem {
            product_id: "p1".to_string(),
            name: "Telur Ayam".to_string(),
            price: Money::from_minor(2_500),
            unit_type: UnitType::Discrete,
            quantity: Quantity::Discrete { quantity },
            subtotal: Money::from_minor(2_500 * quantity),
        }
    }

    fn weighed_line(weight: f64) -> LineItem {
        LineItem {
            product_id: "p2".to_string(),
            name: "Bawang Merah".to_string(),
            price: Money::from_minor(20_000),
            unit_type: UnitType::Weighed,
            quantity: Quantity::Weighed { weight },
            subtotal: Money::from_minor(20_000).multiply_weight(weight),
        }
    }

    #[test]
    fn test_summary_totals_and_breakdown() {
        let txs = vec![
            tx(PaymentMethod::Cash, 30_000, 1_000, vec![discrete_line(3)]),
            tx(PaymentMethod::Qris, 20_000, 0, vec![discrete_line(2)]),
            tx(PaymentMethod::Cash, 10_000, 500, vec![discrete_line(1)]),
        ];

        let summary = compute_summary(&txs);
        assert_eq!(summary.total_transactions, 3);
        assert_eq!(summary.total_amount, Money::from_minor(60_000));
        assert_eq!(summary.total_discount, Money::from_minor(1_500));
        assert_eq!(summary.total_items, 6.0);
        assert_eq!(summary.by_payment_method.cash, Money::from_minor(40_000));
        assert_eq!(summary.by_payment_method.qris, Money::from_minor(20_000));
        assert_eq!(summary.by_payment_method.card, Money::zero());
    }

    #[test]
    fn test_weighed_items_count_by_weight() {
        let txs = vec![tx(
            PaymentMethod::Card,
            37_500,
            0,
            vec![discrete_line(3), weighed_line(1.5)],
        )];

        let summary = compute_summary(&txs);
        assert_eq!(summary.total_items, 4.5);
    }

    #[test]
    fn test_empty_summary() {
        let summary = compute_summary(&[]);
        assert_eq!(summary.total_transactions, 0);
        assert_eq!(summary.total_amount, Money::zero());
        assert_eq!(summary.total_items, 0.0);
    }

    #[test]
    fn test_daily_sales_average() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 30).unwrap();
        let txs = vec![
            tx(PaymentMethod::Cash, 30_000, 0, vec![discrete_line(1)]),
            tx(PaymentMethod::Cash, 10_000, 0, vec![discrete_line(1)]),
        ];

        let daily = compute_daily_sales(date, &txs);
        assert_eq!(daily.date, "2026-08-30");
        assert_eq!(daily.total_sales, Money::from_minor(40_000));
        assert_eq!(daily.total_transactions, 2);
        assert_eq!(daily.average_transaction, 20_000.0);
    }

    #[test]
    fn test_daily_sales_empty_day() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 30).unwrap();
        let daily = compute_daily_sales(date, &[]);
        assert_eq!(daily.total_transactions, 0);
        assert_eq!(daily.average_transaction, 0.0);
    }
}
