//! Sale processing and history handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use kasir_core::summary::{compute_daily_sales, compute_summary};
use kasir_core::validation::validate_uuid;
use kasir_core::{PaymentMethod, TransactionRequest, TransactionStatus};
use kasir_db::{SortOrder, TransactionFilter};

use crate::error::ApiError;
use crate::extract::Json;
use crate::routes::{success, success_list};
use crate::state::AppState;

/// Parses a date query parameter: either `YYYY-MM-DD` or full RFC 3339.
/// A plain date means midnight UTC of that day.
fn parse_date_param(name: &str, raw: &str) -> Result<DateTime<Utc>, ApiError> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    if let Ok(date) = raw.parse::<NaiveDate>() {
        return Ok(date.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc());
    }
    Err(ApiError::BadRequest(format!(
        "Invalid {name}: expected YYYY-MM-DD or an RFC 3339 timestamp"
    )))
}

/// End bound for a plain-date parameter: start of the following day, used
/// as an exclusive upper bound so the whole named day is included.
fn parse_end_date_param(name: &str, raw: &str) -> Result<DateTime<Utc>, ApiError> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    if let Ok(date) = raw.parse::<NaiveDate>() {
        let next = date + Duration::days(1);
        return Ok(next.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc());
    }
    Err(ApiError::BadRequest(format!(
        "Invalid {name}: expected YYYY-MM-DD or an RFC 3339 timestamp"
    )))
}

fn parse_status(raw: &str) -> Result<TransactionStatus, ApiError> {
    TransactionStatus::parse(raw)
        .ok_or_else(|| ApiError::BadRequest(format!("Invalid status: {raw}")))
}

fn parse_payment_method(raw: &str) -> Result<PaymentMethod, ApiError> {
    PaymentMethod::parse(raw)
        .ok_or_else(|| ApiError::BadRequest(format!("Invalid paymentMethod: {raw}")))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionQuery {
    pub status: Option<String>,
    pub payment_method: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
    pub limit: Option<u32>,
}

impl TransactionQuery {
    fn into_filter(self) -> Result<TransactionFilter, ApiError> {
        Ok(TransactionFilter {
            status: self.status.as_deref().map(parse_status).transpose()?,
            payment_method: self
                .payment_method
                .as_deref()
                .map(parse_payment_method)
                .transpose()?,
            start: self
                .start_date
                .as_deref()
                .map(|raw| parse_date_param("startDate", raw))
                .transpose()?,
            end: self
                .end_date
                .as_deref()
                .map(|raw| parse_end_date_param("endDate", raw))
                .transpose()?,
            sort: self.sort,
            order: self
                .order
                .as_deref()
                .map(SortOrder::parse)
                .unwrap_or_default(),
            limit: self.limit,
        })
    }
}

/// `POST /api/transactions`
///
/// The whole sale pipeline: validation, catalog resolution, atomic stock
/// batch, receipt generation, persistence. Responds 201 with the
/// persisted record.
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<TransactionRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let tx = state.processor.create(&body).await?;
    Ok((StatusCode::CREATED, success(tx)))
}

/// `GET /api/transactions`
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<TransactionQuery>,
) -> Result<Json<Value>, ApiError> {
    let filter = query.into_filter()?;
    let transactions = state.db.transactions().list(&filter).await?;
    Ok(success_list(transactions))
}

/// `GET /api/transactions/{id}`
pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    validate_uuid(&id)?;

    let tx = state
        .db
        .transactions()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Transaction with ID {id} not found")))?;

    Ok(success(tx))
}

/// `GET /api/transactions/receipt/{receipt_number}`
///
/// Receipt numbers contain slashes, so clients URL-encode them
/// (`INV%2F260830%2FA1B2`).
pub async fn get_by_receipt(
    State(state): State<AppState>,
    Path(receipt_number): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let tx = state
        .db
        .transactions()
        .get_by_receipt(&receipt_number)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound(format!("Transaction with receipt {receipt_number} not found"))
        })?;

    Ok(success(tx))
}

/// `DELETE /api/transactions/{id}`
///
/// Cancels the sale and restores stock. Cancellation is terminal; a
/// second call answers 400.
pub async fn cancel(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    validate_uuid(&id)?;

    let tx = state.processor.cancel(&id).await?;
    info!(id = %id, receipt = %tx.receipt_number, "Transaction cancelled via API");

    Ok(success(tx))
}

/// `GET /api/transactions/sales/today`
///
/// Rollup of today's completed sales (UTC day).
pub async fn sales_today(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let today = Utc::now().date_naive();
    let start = today.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc();
    let end = start + Duration::days(1);

    let transactions = state
        .db
        .transactions()
        .list_completed(Some(start), Some(end), None)
        .await?;

    Ok(success(compute_daily_sales(today, &transactions)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub payment_method: Option<String>,
}

/// `GET /api/transactions/summary/report`
///
/// Aggregated totals with a per-payment-method breakdown, over an
/// optional date range.
pub async fn summary_report(
    State(state): State<AppState>,
    Query(query): Query<SummaryQuery>,
) -> Result<Json<Value>, ApiError> {
    let start = query
        .start_date
        .as_deref()
        .map(|raw| parse_date_param("startDate", raw))
        .transpose()?;
    let end = query
        .end_date
        .as_deref()
        .map(|raw| parse_end_date_param("endDate", raw))
        .transpose()?;
    let method = query
        .payment_method
        .as_deref()
        .map(parse_payment_method)
        .transpose()?;

    let transactions = state
        .db
        .transactions()
        .list_completed(start, end, method)
        .await?;

    Ok(success(compute_summary(&transactions)))
}
