//! Output directory handling and artifact naming.

use std::fs;
use std::path::Path;

use serde::Serialize;
use tracing::{error, info};

use crate::errors::GenerationError;
use crate::sticker::order::ProductOrder;

const ARTIFACT_PREFIX: &str = "Sticker_";

/// Extensions of files the purge is allowed to delete.
const ARTIFACT_EXTENSIONS: &[&str] = &["docx", "json"];

/// `Sticker_<CUSTOMER>_<JOB>_<OP>_<KIND>.<ext>`.
///
/// Customer and product kind are trimmed and upper-cased; job and OP numbers
/// are inserted exactly as given.
pub fn artifact_file_name(order: &ProductOrder, extension: &str) -> String {
    format!(
        "{ARTIFACT_PREFIX}{}_{}_{}_{}.{extension}",
        order.customer_display(),
        order.job_number,
        order.op_number,
        order.product_kind().label(),
    )
}

pub fn ensure_output_dir(dir: &Path) -> Result<(), GenerationError> {
    fs::create_dir_all(dir).map_err(|source| GenerationError::ResourceFailure {
        path: dir.to_path_buf(),
        source,
    })
}

#[derive(Debug, Default, Serialize)]
pub struct PurgeReport {
    pub deleted: usize,
    pub failed: Vec<String>,
}

fn is_artifact(path: &Path) -> bool {
    let named = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with(ARTIFACT_PREFIX));
    let typed = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| ARTIFACT_EXTENSIONS.contains(&e));
    named && typed && path.is_file()
}

/// Deletes previously generated artifacts from `dir`. A missing directory has
/// nothing to purge; files that fail to delete are listed, not fatal.
pub fn purge_artifacts(dir: &Path) -> Result<PurgeReport, GenerationError> {
    let mut report = PurgeReport::default();
    if !dir.exists() {
        return Ok(report);
    }

    let entries = fs::read_dir(dir).map_err(|source| GenerationError::ResourceFailure {
        path: dir.to_path_buf(),
        source,
    })?;

    for entry in entries.flatten() {
        let path = entry.path();
        if !is_artifact(&path) {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        match fs::remove_file(&path) {
            Ok(()) => {
                info!("Deleted: {name}");
                report.deleted += 1;
            }
            Err(e) => {
                error!("Failed to delete {name}: {e}");
                report.failed.push(name);
            }
        }
    }

    Ok(report)
}
