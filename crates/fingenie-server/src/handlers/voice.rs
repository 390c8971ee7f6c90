//! Voice transcript handlers

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    Json,
};
use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{AppError, AppState, MAX_BODY_SIZE};
use fingenie_core::extract_expense;
use fingenie_core::models::{NewTransaction, Transaction};

#[derive(Debug, Deserialize)]
struct TranscriptRequest {
    #[serde(default)]
    transcript: Option<String>,
}

#[derive(Serialize)]
pub struct VoiceExpenseResponse {
    pub message: &'static str,
    pub id: String,
    pub parsed: Transaction,
}

#[derive(Serialize)]
pub struct ParseResponse {
    pub parsed_expense: NewTransaction,
}

/// Read `{"transcript": "..."}`, rejecting missing or blank transcripts
async fn read_transcript(request: Request) -> Result<String, AppError> {
    let bytes = axum::body::to_bytes(request.into_body(), MAX_BODY_SIZE)
        .await
        .map_err(|_| AppError::bad_request("Invalid request body"))?;
    let req: TranscriptRequest =
        serde_json::from_slice(&bytes).map_err(|_| AppError::bad_request("Invalid JSON"))?;

    req.transcript
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::bad_request("Transcript is required"))
}

/// POST /api/voice-expense - Extract an expense from a transcript and store it
pub async fn voice_expense(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<VoiceExpenseResponse>, AppError> {
    let transcript = read_transcript(request).await?;

    let tx = extract_expense(&state.ai, &transcript, Local::now().date_naive())
        .await
        .map_err(AppError::from_core)?;
    let id = state
        .db
        .insert_transaction(&tx)
        .map_err(AppError::from_core)?;
    let parsed = state
        .db
        .get_transaction(id)
        .map_err(AppError::from_core)?
        .ok_or_else(|| AppError::internal("Saved expense could not be read back"))?;

    info!(id, amount = parsed.amount, mode = %parsed.mode, "Saved voice expense");

    Ok(Json(VoiceExpenseResponse {
        message: "Expense saved successfully",
        id: id.to_string(),
        parsed,
    }))
}

/// POST /api/parse - Extract an expense from a transcript without storing it
pub async fn parse_transcript(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<ParseResponse>, AppError> {
    let transcript = read_transcript(request).await?;

    let parsed_expense = extract_expense(&state.ai, &transcript, Local::now().date_naive())
        .await
        .map_err(AppError::from_core)?;

    Ok(Json(ParseResponse { parsed_expense }))
}
