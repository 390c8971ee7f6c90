//! FinGenie Web Server
//!
//! Axum-based REST API for the FinGenie voice expense tracker.
//!
//! Every route is served both at the root and under `/api`:
//! - `GET  /health`
//! - `GET  /transactions`, `POST /transactions` (alias `POST /save-expense`)
//! - `GET  /transactions/export`
//! - `POST /voice-expense`, `POST /parse`

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};
use tracing::{error, info, warn};

use fingenie_core::db::Database;
use fingenie_core::{AIClient, Error as CoreError, ErrorKind, ExpenseBackend};

mod handlers;

/// Maximum request body size (64 KB)
pub const MAX_BODY_SIZE: usize = 64 * 1024;

/// Origin of the Vite dev server used by the web client
pub const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:5173";

/// Server configuration
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Allowed CORS origins; `*` allows any origin
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![DEFAULT_ALLOWED_ORIGIN.to_string()],
        }
    }
}

/// Shared application state
pub struct AppState {
    pub db: Database,
    pub ai: AIClient,
}

/// Create the application router
pub fn create_router(
    db: Database,
    ai: AIClient,
    static_dir: Option<&str>,
    config: ServerConfig,
) -> Router {
    info!("AI backend: {} (model: {})", ai.host(), ai.model());

    let state = Arc::new(AppState { db, ai });

    let routes = Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/transactions",
            get(handlers::list_transactions).post(handlers::create_transaction),
        )
        .route("/transactions/export", get(handlers::export_transactions))
        .route("/save-expense", post(handlers::create_transaction))
        .route("/voice-expense", post(handlers::voice_expense))
        .route("/parse", post(handlers::parse_transcript));

    let mut app = Router::new()
        .merge(routes.clone())
        .nest("/api", routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config))
        // Security headers
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ));

    // Serve the built web client if a directory is provided
    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    if config.allowed_origins.iter().any(|o| o == "*") {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(v) => Some(v),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", o);
                None
            }
        })
        .collect();
    cors.allow_origin(origins)
}

/// Start the server with custom configuration
pub async fn serve_with_config(
    db: Database,
    ai: AIClient,
    host: &str,
    port: u16,
    static_dir: Option<&str>,
    config: ServerConfig,
) -> anyhow::Result<()> {
    check_ai_connection(&ai).await;

    let app = create_router(db, ai, static_dir, config);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Check and log AI backend connection status
async fn check_ai_connection(ai: &AIClient) {
    if ai.health_check().await {
        info!("✅ AI backend reachable: {} ({})", ai.host(), ai.model());
    } else {
        warn!(
            "⚠️  AI backend not responding or not configured: {} (set OPENROUTER_API_KEY, or AI_BACKEND=mock for offline use)",
            ai.host()
        );
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// API error type
///
/// Serialized as `{"error": ...}`. Errors raised by the extraction pipeline
/// also carry `details` and `raw` (the upstream text, when there is one).
pub struct AppError {
    status: StatusCode,
    message: String,
    details: Option<String>,
    raw: Option<String>,
    internal: Option<anyhow::Error>,
}

impl AppError {
    fn new(status: StatusCode, msg: &str) -> Self {
        Self {
            status,
            message: msg.to_string(),
            details: None,
            raw: None,
            internal: None,
        }
    }

    pub fn bad_request(msg: &str) -> Self {
        Self::new(StatusCode::BAD_REQUEST, msg)
    }

    pub fn not_found(msg: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, msg)
    }

    pub fn internal(msg: &str) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, msg)
    }

    /// Schema validation failure for client-supplied or extracted data
    pub fn invalid_transaction(details: &str) -> Self {
        Self {
            details: Some(details.to_string()),
            ..Self::new(StatusCode::UNPROCESSABLE_ENTITY, "Invalid transaction data")
        }
    }

    /// Map a core error onto a status code by its kind
    pub fn from_core(err: CoreError) -> Self {
        let (status, message) = match err.kind() {
            ErrorKind::Config => (StatusCode::INTERNAL_SERVER_ERROR, "LLM is not configured"),
            ErrorKind::Transport if err.is_timeout() => {
                (StatusCode::GATEWAY_TIMEOUT, "LLM request timed out")
            }
            ErrorKind::Transport => (StatusCode::BAD_GATEWAY, "Could not reach the LLM service"),
            ErrorKind::Upstream => (StatusCode::BAD_GATEWAY, "LLM service returned an error"),
            ErrorKind::Extraction => (StatusCode::BAD_GATEWAY, "No valid JSON found in LLM response"),
            ErrorKind::Decode => (StatusCode::BAD_GATEWAY, "Failed to parse LLM response"),
            ErrorKind::Validation => (StatusCode::UNPROCESSABLE_ENTITY, "Invalid transaction data"),
            ErrorKind::Storage => (StatusCode::INTERNAL_SERVER_ERROR, "Database error"),
            ErrorKind::Other => {
                return match err {
                    CoreError::InvalidData(msg) => Self::bad_request(&msg),
                    CoreError::NotFound(msg) => Self::not_found(&msg),
                    other => Self::from(other),
                };
            }
        };

        if status.is_server_error() {
            warn!(status = status.as_u16(), error = %err, "Request failed");
        }

        Self {
            status,
            message: message.to_string(),
            details: Some(err.to_string()),
            raw: err.raw().map(str::to_string),
            internal: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let mut body = serde_json::json!({
            "error": self.message
        });
        if let Some(details) = self.details {
            body["details"] = details.into();
            body["raw"] = self.raw.into();
        }

        (self.status, Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            // Return generic message to client
            message: "An internal error occurred".to_string(),
            details: None,
            raw: None,
            // Keep full error for logging
            internal: Some(err),
        }
    }
}

#[cfg(test)]
mod tests;
