//! HTTP endpoints using axum.
//!
//! Endpoints:
//! - GET  /                    - status message
//! - POST /predict             - diagnosis label for a clinical note
//! - POST /analyze             - label plus matched symptoms
//! - GET  /catalog             - symptom catalog summary
//! - POST /summarize/          - summarize one uploaded file
//! - POST /summarize_all/      - merged summary of several files
//! - POST /extract_medicines/  - medicines from a prescription image

use crate::error::ApiError;
use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use doctext_core::config::AppConfig;
use doctext_core::models::{Analysis, PredictionRequest};
use doctext_core::{pipeline, DiagnosisContext};
use providers::summary::{CombinedSummary, MedicineList, Summarizer, Summary, Upload};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

const UPLOAD_LIMIT: usize = 20 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub ctx: Arc<DiagnosisContext>,
    pub summarizer: Summarizer,
    pub request_timeout: Duration,
    /// Answer CORS preflights and allow any origin.
    pub cors: bool,
}

pub fn router(state: AppState) -> Router {
    let app = Router::new()
        .route("/", get(home))
        .route("/predict", post(predict))
        .route("/analyze", post(analyze))
        .route("/catalog", get(catalog))
        .route("/summarize/", post(summarize))
        .route("/summarize_all/", post(summarize_all))
        .route("/extract_medicines/", post(extract_medicines))
        .layer(DefaultBodyLimit::max(UPLOAD_LIMIT));
    let app = if state.cors {
        app.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
    } else {
        app
    };
    app.with_state(state)
}

/// Builds the context, binds `bind`, and serves until Ctrl-C.
pub async fn run(cfg: AppConfig, bind: &str) -> anyhow::Result<()> {
    let ctx = tokio::task::spawn_blocking({
        let cfg = cfg.clone();
        move || pipeline::build_context(&cfg)
    })
    .await??;
    let state = AppState {
        ctx: Arc::new(ctx),
        summarizer: crate::summarizer::build_summarizer(&cfg.summarizer),
        request_timeout: Duration::from_secs(cfg.server.request_timeout_secs),
        cors: cfg.server.cors,
    };

    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!(addr = %listener.local_addr()?, "doctext listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
    }
    info!("shutting down");
}

/// Runs one pipeline call on the blocking pool under the request deadline.
async fn run_pipeline<T, F>(state: &AppState, f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&DiagnosisContext) -> doctext_core::error::Result<T> + Send + 'static,
{
    let ctx = Arc::clone(&state.ctx);
    let task = tokio::task::spawn_blocking(move || f(&ctx));
    match tokio::time::timeout(state.request_timeout, task).await {
        Err(_) => Err(ApiError::Timeout),
        Ok(Err(join)) => Err(ApiError::Internal(join.to_string())),
        Ok(Ok(result)) => result.map_err(ApiError::from),
    }
}

#[derive(Serialize)]
struct HomeResponse {
    message: &'static str,
}

async fn home() -> Json<HomeResponse> {
    Json(HomeResponse {
        message: "doctext diagnosis service is running",
    })
}

#[derive(Debug, Serialize, serde::Deserialize)]
pub struct PredictResponse {
    pub prediction: String,
}

async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<PredictionRequest>, JsonRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
    let Json(req) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let prediction = run_pipeline(&state, move |ctx| pipeline::predict(ctx, &req)).await?;
    info!(label = %prediction.label, "prediction served");
    Ok(Json(PredictResponse {
        prediction: prediction.label,
    }))
}

async fn analyze(
    State(state): State<AppState>,
    payload: Result<Json<PredictionRequest>, JsonRejection>,
) -> Result<Json<Analysis>, ApiError> {
    let Json(req) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let analysis = run_pipeline(&state, move |ctx| pipeline::analyze(ctx, &req)).await?;
    Ok(Json(analysis))
}

#[derive(Debug, Serialize, serde::Deserialize)]
pub struct CatalogResponse {
    pub symptoms: Vec<String>,
    pub dimension: usize,
    pub encoder: String,
    pub labels: Vec<String>,
    pub threshold: f32,
}

async fn catalog(State(state): State<AppState>) -> Json<CatalogResponse> {
    let ctx = &state.ctx;
    Json(CatalogResponse {
        symptoms: ctx.catalog().identifiers().to_vec(),
        dimension: ctx.catalog().dimension(),
        encoder: ctx.encoder().model_name().to_string(),
        labels: ctx.classifier().labels().to_vec(),
        threshold: ctx.default_threshold(),
    })
}

async fn read_uploads(mut multipart: Multipart, field_name: &str) -> Result<Vec<Upload>, ApiError> {
    let mut uploads = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.body_text()))?
    {
        if field.name() != Some(field_name) {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;
        info!(file = %filename, size = data.len(), "received upload");
        uploads.push(Upload {
            filename,
            content_type,
            data,
        });
    }
    Ok(uploads)
}

async fn single_upload(multipart: Multipart) -> Result<Upload, ApiError> {
    read_uploads(multipart, "file")
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::BadRequest("missing multipart field `file`".into()))
}

async fn summarize(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<Summary>, ApiError> {
    let upload = single_upload(multipart).await?;
    Ok(Json(state.summarizer.summarize(&upload).await?))
}

async fn extract_medicines(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<MedicineList>, ApiError> {
    let upload = single_upload(multipart).await?;
    Ok(Json(state.summarizer.extract_medicines(&upload).await?))
}

async fn summarize_all(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<CombinedSummary>, ApiError> {
    let uploads = read_uploads(multipart, "files").await?;
    if uploads.is_empty() {
        return Err(ApiError::BadRequest("missing multipart field `files`".into()));
    }
    Ok(Json(state.summarizer.summarize_all(&uploads).await?))
}
