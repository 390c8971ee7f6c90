//! Transaction handlers: direct create, list, CSV export

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, Response, StatusCode},
    Json,
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::error::Category;
use tracing::info;

use crate::{AppError, AppState, MAX_BODY_SIZE};
use fingenie_core::dates::DATE_FORMAT;
use fingenie_core::export::EXPORT_FILENAME;
use fingenie_core::models::{NewTransaction, PaymentMethod, Transaction, TransactionSource};

/// Body of a direct create request
#[derive(Debug, Deserialize)]
pub struct CreateTransactionRequest {
    pub amount: f64,
    pub category: String,
    /// Any string; unknown methods are stored as "Other"
    #[serde(default, alias = "payment_method")]
    pub mode: Option<String>,
    /// `YYYY-MM-DD`; defaults to today
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub split_with: Option<Vec<String>>,
    #[serde(default)]
    pub description: Option<String>,
}

impl CreateTransactionRequest {
    fn into_new_transaction(self, today: NaiveDate) -> Result<NewTransaction, AppError> {
        let date = match self.date.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
            None => today,
            Some(d) => NaiveDate::parse_from_str(d, DATE_FORMAT).map_err(|_| {
                AppError::invalid_transaction(&format!("date must be YYYY-MM-DD (got {:?})", d))
            })?,
        };

        Ok(NewTransaction {
            amount: self.amount,
            category: self.category.trim().to_string(),
            mode: PaymentMethod::normalize(self.mode.as_deref()),
            date,
            split_with: self.split_with.unwrap_or_default(),
            description: self
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            source: TransactionSource::Manual,
            transcript: None,
        })
    }
}

#[derive(Serialize)]
pub struct SaveResponse {
    pub message: &'static str,
    pub id: String,
}

/// POST /api/transactions (also /api/save-expense) - Store a client-supplied expense
pub async fn create_transaction(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<SaveResponse>, AppError> {
    let bytes = axum::body::to_bytes(request.into_body(), MAX_BODY_SIZE)
        .await
        .map_err(|_| AppError::bad_request("Invalid request body"))?;

    // Well-formed JSON with missing or mistyped fields fails the schema, not the syntax
    let req: CreateTransactionRequest =
        serde_json::from_slice(&bytes).map_err(|e| match e.classify() {
            Category::Data => AppError::invalid_transaction(&e.to_string()),
            _ => AppError::bad_request("Invalid JSON"),
        })?;

    let tx = req.into_new_transaction(Local::now().date_naive())?;
    let id = state
        .db
        .insert_transaction(&tx)
        .map_err(AppError::from_core)?;

    info!(id, amount = tx.amount, category = %tx.category, "Saved expense");

    Ok(Json(SaveResponse {
        message: "Expense saved successfully",
        id: id.to_string(),
    }))
}

/// GET /api/transactions - List all expenses, oldest first
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Transaction>>, AppError> {
    let transactions = state.db.list_transactions().map_err(AppError::from_core)?;
    Ok(Json(transactions))
}

/// GET /api/transactions/export - Download all expenses as CSV
pub async fn export_transactions(
    State(state): State<Arc<AppState>>,
) -> Result<Response<Body>, AppError> {
    let csv = state
        .db
        .export_transactions_csv()
        .map_err(AppError::from_core)?;
    let lines = csv.lines().count().saturating_sub(1);
    info!("Exported {} transactions to CSV", lines);

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/csv; charset=utf-8")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", EXPORT_FILENAME),
        )
        .body(Body::from(csv))
        .map_err(|e| AppError::internal(&e.to_string()))
}
