//! Generation run: validate, sequence, render through the sink, finalize.
//!
//! # State machine
//! `Idle → Validating → Running → {Completed, Failed}`. A validation failure
//! (or an unusable output directory) goes straight to `Failed` without a single
//! page reaching the sink. A sink failure aborts the run at that page; whatever
//! the sink already wrote is left as is and must be treated as garbage.
//!
//! The run is synchronous. Hosts wanting a responsive UI run it on a blocking
//! worker and forward the progress callback over a channel.

use std::path::PathBuf;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::errors::{GenerationError, SinkError};
use crate::sticker::fiscal_year::resolve_fiscal_year;
use crate::sticker::order::ProductOrder;
use crate::sticker::output::{artifact_file_name, ensure_output_dir};
use crate::sticker::sequencer::PageSequencer;
use crate::sticker::sink::{ImageStatus, PageSink};
use crate::sticker::validation::validate_order;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationState {
    Idle,
    Validating,
    Running,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
    pub percent: u8,
}

impl Progress {
    pub fn new(completed: usize, total: usize) -> Self {
        Self {
            completed,
            total,
            percent: progress_percent(completed, total),
        }
    }
}

/// `floor(100 * completed / total)`, or 0 for an empty run.
pub fn progress_percent(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    (completed.min(total) * 100 / total) as u8
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationReport {
    pub output_path: PathBuf,
    pub total_pages_emitted: usize,
    /// Pages rendered with a placeholder instead of the sticker image.
    pub placeholder_pages: usize,
    pub fiscal_year: String,
}

/// Drives one generation run at a time into `output_dir`.
#[derive(Debug)]
pub struct Orchestrator {
    output_dir: PathBuf,
    state: GenerationState,
}

impl Orchestrator {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            state: GenerationState::Idle,
        }
    }

    pub fn state(&self) -> GenerationState {
        self.state
    }

    /// Generates every page of `order` into `sink`, reporting progress after each page.
    ///
    /// `today` picks the fiscal year when the order carries no override.
    pub fn run<S, F>(
        &mut self,
        order: &ProductOrder,
        today: NaiveDate,
        sink: &mut S,
        on_progress: F,
    ) -> Result<GenerationReport, GenerationError>
    where
        S: PageSink + ?Sized,
        F: FnMut(Progress),
    {
        info!(
            customer = %order.customer_display(),
            job = %order.job_number,
            op = %order.op_number,
            kind = order.product_kind().label(),
            "Starting sticker generation"
        );

        self.state = GenerationState::Validating;
        let result = self.validate_and_render(order, today, sink, on_progress);

        match &result {
            Ok(report) => {
                self.state = GenerationState::Completed;
                info!(
                    "Document saved successfully: {} ({} pages)",
                    report.output_path.display(),
                    report.total_pages_emitted
                );
            }
            Err(e) => {
                self.state = GenerationState::Failed;
                error!(kind = ?e.kind(), "Generation failed: {e}");
            }
        }
        result
    }

    fn validate_and_render<S, F>(
        &mut self,
        order: &ProductOrder,
        today: NaiveDate,
        sink: &mut S,
        mut on_progress: F,
    ) -> Result<GenerationReport, GenerationError>
    where
        S: PageSink + ?Sized,
        F: FnMut(Progress),
    {
        validate_order(order)?;
        let fiscal_year = resolve_fiscal_year(order.fiscal_year_override.as_deref(), today)?;
        info!("Using fiscal year {fiscal_year}");
        ensure_output_dir(&self.output_dir)?;

        self.state = GenerationState::Running;
        let sequencer = PageSequencer::new(order, &fiscal_year);
        let total = sequencer.total_pages();
        let mut completed = 0usize;
        let mut placeholder_pages = 0usize;

        for page in sequencer.pages() {
            let outcome = sink
                .append_page(&page)
                .map_err(|source| GenerationError::RenderFailure {
                    page: Some(completed + 1),
                    source,
                })?;

            if outcome.image == ImageStatus::Placeholder {
                if placeholder_pages == 0 {
                    warn!("Sticker image unavailable, rendering placeholder");
                }
                placeholder_pages += 1;
            }

            completed += 1;
            debug!(page = completed, total, side = ?page.side, "Rendered page");
            on_progress(Progress::new(completed, total));
        }

        let output_path = self
            .output_dir
            .join(artifact_file_name(order, sink.artifact_extension()));

        sink.finalize(&output_path).map_err(|e| match e {
            SinkError::Io(source) => GenerationError::ResourceFailure {
                path: output_path.clone(),
                source,
            },
            other => GenerationError::RenderFailure {
                page: None,
                source: other,
            },
        })?;

        if placeholder_pages > 0 {
            warn!("{placeholder_pages} of {completed} pages used the image placeholder");
        }

        Ok(GenerationReport {
            output_path,
            total_pages_emitted: completed,
            placeholder_pages,
            fiscal_year,
        })
    }
}
