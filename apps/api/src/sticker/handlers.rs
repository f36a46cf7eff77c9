//! Axum route handlers for the Sticker API.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Local;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::sticker::fiscal_year::{fiscal_year_options, resolve_fiscal_year, FiscalYearOptions};
use crate::sticker::jobs::{job_sink, JobStatus};
use crate::sticker::order::ProductOrder;
use crate::sticker::output::{artifact_file_name, purge_artifacts, PurgeReport};
use crate::sticker::sequencer::{PageSequencer, PageSpec};
use crate::sticker::sink::{MemorySink, PageSink};
use crate::sticker::validation::validate_order;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub total_pages: usize,
    pub fiscal_year: String,
    pub artifact_name: String,
    pub placeholder_pages: usize,
    pub pages: Vec<PageSpec>,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub job_id: Uuid,
}

/// GET /api/v1/fiscal-years
pub async fn handle_fiscal_years() -> Json<FiscalYearOptions> {
    Json(fiscal_year_options(Local::now().date_naive()))
}

/// POST /api/v1/stickers/preview
pub async fn handle_preview(
    State(state): State<AppState>,
    Json(mut order): Json<ProductOrder>,
) -> Result<Json<PreviewResponse>, AppError> {
    state.config.settings.apply_to(&mut order);
    validate_order(&order)?;

    let fiscal_year = resolve_fiscal_year(
        order.fiscal_year_override.as_deref(),
        Local::now().date_naive(),
    )?;
    let sequencer = PageSequencer::new(&order, &fiscal_year);

    let mut sink = MemorySink::default();
    for page in sequencer.pages() {
        sink.append_page(&page)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("preview sink failed: {e}")))?;
    }

    // Name the file the generation job will actually write.
    let artifact_name = artifact_file_name(&order, job_sink().artifact_extension());

    Ok(Json(PreviewResponse {
        total_pages: sequencer.total_pages(),
        artifact_name,
        placeholder_pages: sink.placeholder_pages,
        pages: sink.pages,
        fiscal_year: fiscal_year.clone(),
    }))
}

/// POST /api/v1/stickers
///
/// Validates synchronously so bad input is rejected with 400 instead of
/// surfacing later as a failed job.
pub async fn handle_generate(
    State(state): State<AppState>,
    Json(mut order): Json<ProductOrder>,
) -> Result<(StatusCode, Json<GenerateResponse>), AppError> {
    state.config.settings.apply_to(&mut order);
    validate_order(&order)?;

    let job_id = state
        .jobs
        .spawn_generation(
            order,
            state.config.output_dir.clone(),
            Local::now().date_naive(),
        )
        .await;
    info!(%job_id, "Queued sticker generation");

    Ok((StatusCode::ACCEPTED, Json(GenerateResponse { job_id })))
}

/// GET /api/v1/stickers/jobs/:id
pub async fn handle_job_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<JobStatus>, AppError> {
    state
        .jobs
        .get(id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Job {id} not found")))
}

/// DELETE /api/v1/stickers/output
pub async fn handle_purge(State(state): State<AppState>) -> Result<Json<PurgeReport>, AppError> {
    let dir = state.config.output_dir.clone();
    let report = tokio::task::spawn_blocking(move || purge_artifacts(&dir))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in purge: {e}")))??;
    info!(
        deleted = report.deleted,
        failed = report.failed.len(),
        "Purged sticker output"
    );
    Ok(Json(report))
}
