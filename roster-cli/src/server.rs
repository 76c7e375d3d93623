//! HTTP upload server.
//!
//! The server keeps the most recent report (the "report displayed" state)
//! and the saved-records store. Every upload is classified on its own;
//! only those two slots are shared between requests.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::extract::multipart::MultipartError;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use roster_validator::{
    ClassificationReport, Row, SavedRecords, StoreError, UNKNOWN_MEDIA_TYPE, Upload, UploadConfig,
    UploadError, ValidationConfig, validate_upload,
};
use serde::Serialize;
use serde_json::json;
use tower_http::cors::CorsLayer;

use crate::logging::LoggingMiddleware;

/// Multipart field carrying the spreadsheet.
pub const UPLOAD_FIELD: &str = "file";

/// Room for multipart boundaries and part headers on top of the file limit.
const MULTIPART_OVERHEAD: u64 = 64 * 1024;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: u64,
    pub cors: bool,
    pub verbose: u8,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 8000,
            max_upload_bytes: 10_485_760,
            cors: false,
            verbose: 0,
        }
    }
}

/// Shared state available to all handlers via `State<AppState>`.
///
/// Cheap to clone; everything lives behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    upload_config: Arc<UploadConfig>,
    validation_config: Arc<ValidationConfig>,
    current: Arc<Mutex<Option<ClassificationReport>>>,
    saved: Arc<SavedRecords>,
}

impl AppState {
    #[must_use]
    pub fn new(upload_config: UploadConfig, validation_config: ValidationConfig) -> Self {
        Self {
            upload_config: Arc::new(upload_config),
            validation_config: Arc::new(validation_config),
            current: Arc::new(Mutex::new(None)),
            saved: Arc::new(SavedRecords::new()),
        }
    }

    /// Saved records store, shared with every clone of this state.
    #[must_use]
    pub fn saved(&self) -> &SavedRecords {
        &self.saved
    }

    fn current(&self) -> MutexGuard<'_, Option<ClassificationReport>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Handler error, rendered as `{"error": message, "code": CODE}`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            Self::Upload(err) => {
                let status = match err {
                    UploadError::UnsupportedFileType { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
                    UploadError::SchemaMismatch { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                    UploadError::FileTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
                    UploadError::Io(io) => {
                        tracing::error!(error = %io, "upload i/o error");
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                    _ => StatusCode::BAD_REQUEST,
                };
                (status, err.code())
            }
            Self::Store(_) => (StatusCode::BAD_REQUEST, "NOTHING_TO_SAVE"),
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
        };

        let body = json!({
            "error": self.to_string(),
            "code": code,
        });
        (status, Json(body)).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct SaveResult {
    /// Rows appended by this request.
    pub saved: usize,
    /// Rows in the store after the append.
    pub total: usize,
}

/// Build the application router.
#[must_use]
pub fn router(state: AppState, config: &ServerConfig) -> Router {
    let logging = LoggingMiddleware::new(config.verbose);
    let body_limit = usize::try_from(config.max_upload_bytes.saturating_add(MULTIPART_OVERHEAD))
        .unwrap_or(usize::MAX);

    let app = Router::new()
        .route("/health", get(health))
        .route("/upload", post(upload))
        .route("/report", get(current_report).delete(reset_report))
        .route("/save", post(save))
        .route("/records", get(records))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(axum::middleware::from_fn(move |request, next| {
            let logging = logging.clone();
            async move { logging.handle(request, next).await }
        }))
        .with_state(state);

    if config.cors {
        app.layer(CorsLayer::permissive())
    } else {
        app
    }
}

/// Bind and serve until the process is stopped.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn serve(config: &ServerConfig) -> anyhow::Result<()> {
    let mut upload_config = UploadConfig::default();
    upload_config.max_file_size = config.max_upload_bytes;
    let state = AppState::new(upload_config, ValidationConfig::default());
    let app = router(state, config);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, cors = config.cors, "roster server listening");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// POST /upload
///
/// Accept a multipart upload with a `file` field, classify it and make the
/// report current. A rejected upload leaves the current report untouched.
async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<ClassificationReport>> {
    let limit = state.upload_config.max_file_size;
    let mut received = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(&e, limit))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload").to_owned();
        let media_type = field.content_type().unwrap_or(UNKNOWN_MEDIA_TYPE).to_owned();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| multipart_error(&e, limit))?;
        received = Some(Upload::new(file_name, media_type, bytes.to_vec()));
        break;
    }

    let Some(upload) = received else {
        return Err(AppError::BadRequest(format!(
            "Missing multipart field '{UPLOAD_FIELD}'"
        )));
    };

    let report = validate_upload(&upload, &state.upload_config, &state.validation_config)?;
    *state.current() = Some(report.clone());
    Ok(Json(report))
}

/// A body cut off by the request limit is an oversized upload, not a
/// malformed one.
fn multipart_error(err: &MultipartError, limit: u64) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        UploadError::FileTooLarge { limit }.into()
    } else {
        AppError::BadRequest(err.to_string())
    }
}

/// GET /report
async fn current_report(State(state): State<AppState>) -> AppResult<Json<ClassificationReport>> {
    state
        .current()
        .clone()
        .map(Json)
        .ok_or_else(|| AppError::NotFound("No report yet; upload a roster first".to_owned()))
}

/// DELETE /report: back to awaiting an upload.
async fn reset_report(State(state): State<AppState>) -> StatusCode {
    state.current().take();
    StatusCode::NO_CONTENT
}

/// POST /save: append the current report's valid rows to the store.
async fn save(State(state): State<AppState>) -> AppResult<Json<SaveResult>> {
    let valid: Vec<Row> = state
        .current()
        .as_ref()
        .map(|report| report.valid_data.clone())
        .unwrap_or_default();
    let total = state.saved.append(&valid)?;
    Ok(Json(SaveResult {
        saved: valid.len(),
        total,
    }))
}

/// GET /records
async fn records(State(state): State<AppState>) -> Json<Vec<Row>> {
    Json(state.saved.snapshot())
}
