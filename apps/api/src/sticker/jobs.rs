//! Background generation jobs.
//!
//! Each job runs its own `Orchestrator` inside `tokio::task::spawn_blocking`.
//! Progress flows one way: the blocking worker pushes `JobEvent`s into an
//! unbounded channel and an async task folds them into the registry, which the
//! HTTP layer polls. Finished jobs are kept for a retention window and
//! evicted when the next job is queued.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use serde::Serialize;
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::errors::{ErrorKind, GenerationError};
use crate::sticker::order::ProductOrder;
use crate::sticker::orchestrator::{GenerationReport, Orchestrator, Progress};
use crate::sticker::sink::ManifestSink;
use crate::sticker::text_fit::default_typography;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Running {
        percent: u8,
    },
    Completed {
        output_path: PathBuf,
        total_pages: usize,
        placeholder_pages: usize,
    },
    Failed {
        kind: ErrorKind,
        message: String,
    },
}

impl JobStatus {
    fn is_finished(&self) -> bool {
        matches!(self, JobStatus::Completed { .. } | JobStatus::Failed { .. })
    }
}

#[derive(Debug)]
enum JobEvent {
    Progress(Progress),
    Completed(GenerationReport),
    Failed(GenerationError),
}

impl From<JobEvent> for JobStatus {
    fn from(event: JobEvent) -> Self {
        match event {
            JobEvent::Progress(p) => JobStatus::Running { percent: p.percent },
            JobEvent::Completed(report) => JobStatus::Completed {
                output_path: report.output_path,
                total_pages: report.total_pages_emitted,
                placeholder_pages: report.placeholder_pages,
            },
            JobEvent::Failed(e) => JobStatus::Failed {
                kind: e.kind(),
                message: e.to_string(),
            },
        }
    }
}

/// How long a completed or failed job stays pollable.
pub const FINISHED_JOB_RETENTION: Duration = Duration::from_secs(60 * 60);

/// The sink every background job renders into.
pub fn job_sink() -> ManifestSink {
    ManifestSink::new(default_typography())
}

#[derive(Debug)]
struct JobEntry {
    status: JobStatus,
    updated_at: Instant,
}

impl JobEntry {
    fn new(status: JobStatus) -> Self {
        Self {
            status,
            updated_at: Instant::now(),
        }
    }

    fn is_expired(&self, retention: Duration) -> bool {
        self.status.is_finished() && self.updated_at.elapsed() >= retention
    }
}

#[derive(Clone)]
pub struct JobRegistry {
    jobs: Arc<RwLock<HashMap<Uuid, JobEntry>>>,
    retention: Duration,
}

impl Default for JobRegistry {
    fn default() -> Self {
        Self::with_retention(FINISHED_JOB_RETENTION)
    }
}

impl JobRegistry {
    pub fn with_retention(retention: Duration) -> Self {
        Self {
            jobs: Arc::default(),
            retention,
        }
    }

    pub async fn get(&self, id: Uuid) -> Option<JobStatus> {
        self.jobs.read().await.get(&id).map(|entry| entry.status.clone())
    }

    async fn set(&self, id: Uuid, status: JobStatus) {
        self.jobs.write().await.insert(id, JobEntry::new(status));
    }

    /// Drops finished jobs older than the retention window. Queued and running
    /// jobs are never evicted.
    async fn evict_expired(&self) {
        let mut jobs = self.jobs.write().await;
        let before = jobs.len();
        jobs.retain(|_, entry| !entry.is_expired(self.retention));
        let evicted = before - jobs.len();
        if evicted > 0 {
            debug!(evicted, remaining = jobs.len(), "Evicted finished jobs");
        }
    }

    /// Queues a generation run for `order` and returns its job id immediately.
    pub async fn spawn_generation(
        &self,
        order: ProductOrder,
        output_dir: PathBuf,
        today: NaiveDate,
    ) -> Uuid {
        self.evict_expired().await;
        let id = Uuid::new_v4();
        self.set(id, JobStatus::Queued).await;

        let (tx, mut rx) = mpsc::unbounded_channel::<JobEvent>();

        tokio::task::spawn_blocking(move || {
            let mut orchestrator = Orchestrator::new(output_dir);
            let mut sink = job_sink();
            let result = orchestrator.run(&order, today, &mut sink, |p| {
                tx.send(JobEvent::Progress(p)).ok();
            });
            debug!(%id, state = ?orchestrator.state(), "Generation worker finished");
            let event = match result {
                Ok(report) => JobEvent::Completed(report),
                Err(e) => JobEvent::Failed(e),
            };
            tx.send(event).ok();
        });

        let registry = self.clone();
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                registry.set(id, event.into()).await;
            }
            // Every sender is gone; a worker that panicked never sent a final event.
            let mut jobs = registry.jobs.write().await;
            if let Some(entry) = jobs.get_mut(&id) {
                if !entry.status.is_finished() {
                    warn!(%id, "Generation worker exited without a result");
                    *entry = JobEntry::new(JobStatus::Failed {
                        kind: ErrorKind::RenderFailure,
                        message: "Generation worker exited without a result".to_string(),
                    });
                }
            }
        });

        id
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::sticker::order::{ProductConfig, UpsConfig};
    use crate::sticker::sink::PageSink;

    fn order(num_sets: u32) -> ProductOrder {
        ProductOrder {
            customer_name: "acme".to_string(),
            job_number: "107".to_string(),
            op_number: "12".to_string(),
            sticker_image_ref: None,
            fiscal_year_override: None,
            product: ProductConfig::Ups(UpsConfig {
                kva_rating: 60,
                num_sets,
                units_per_set: 2,
            }),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).expect("valid date")
    }

    async fn wait_finished(registry: &JobRegistry, id: Uuid) -> JobStatus {
        for _ in 0..200 {
            if let Some(status) = registry.get(id).await {
                if status.is_finished() {
                    return status;
                }
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("job {id} did not finish");
    }

    #[tokio::test]
    async fn test_job_completes_and_writes_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let registry = JobRegistry::default();
        let id = registry
            .spawn_generation(order(2), dir.path().to_path_buf(), today())
            .await;

        match wait_finished(&registry, id).await {
            JobStatus::Completed {
                output_path,
                total_pages,
                placeholder_pages,
            } => {
                assert_eq!(total_pages, 12);
                assert_eq!(placeholder_pages, 12);
                assert_eq!(
                    output_path,
                    dir.path().join("Sticker_ACME_107_12_UPS.json")
                );
                assert!(output_path.is_file());
            }
            other => panic!("expected completion, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_job_fails_with_kind() {
        let dir = tempfile::tempdir().unwrap();
        let registry = JobRegistry::default();
        let id = registry
            .spawn_generation(order(0), dir.path().to_path_buf(), today())
            .await;

        match wait_finished(&registry, id).await {
            JobStatus::Failed { kind, message } => {
                assert_eq!(kind, ErrorKind::InvalidInput);
                assert!(message.contains("Number of sets"));
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unknown_job_is_none() {
        assert!(JobRegistry::default().get(Uuid::new_v4()).await.is_none());
    }

    #[tokio::test]
    async fn test_finished_jobs_evicted_after_retention() {
        let dir = tempfile::tempdir().unwrap();
        let registry = JobRegistry::with_retention(Duration::ZERO);
        let first = registry
            .spawn_generation(order(1), dir.path().to_path_buf(), today())
            .await;
        wait_finished(&registry, first).await;

        let second = registry
            .spawn_generation(order(1), dir.path().to_path_buf(), today())
            .await;
        assert!(registry.get(first).await.is_none());
        wait_finished(&registry, second).await;
        assert_eq!(registry.jobs.read().await.len(), 1);
    }

    #[tokio::test]
    async fn test_unfinished_jobs_survive_eviction() {
        let registry = JobRegistry::with_retention(Duration::ZERO);
        let id = Uuid::new_v4();
        registry.set(id, JobStatus::Running { percent: 50 }).await;
        registry.evict_expired().await;
        assert_eq!(
            registry.get(id).await,
            Some(JobStatus::Running { percent: 50 })
        );
    }

    #[tokio::test]
    async fn test_finished_jobs_kept_within_retention() {
        let registry = JobRegistry::default();
        let id = Uuid::new_v4();
        registry.set(id, JobStatus::Queued).await;
        registry
            .set(
                id,
                JobStatus::Failed {
                    kind: ErrorKind::InvalidInput,
                    message: "bad".to_string(),
                },
            )
            .await;
        registry.evict_expired().await;
        assert!(registry.get(id).await.is_some());
    }

    #[test]
    fn test_job_sink_extension_is_json() {
        assert_eq!(job_sink().artifact_extension(), "json");
    }

    #[test]
    fn test_progress_event_maps_to_running() {
        let status: JobStatus = JobEvent::Progress(Progress::new(1, 4)).into();
        assert_eq!(status, JobStatus::Running { percent: 25 });
    }
}
