//! Page sink capability: where rendered pages go.
//!
//! The engine only ever appends pages in sequence order and finalizes once at
//! the end. A sink must never fail because the sticker image is missing; it
//! renders a placeholder and reports it through `PageOutcome`.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::errors::SinkError;
use crate::sticker::sequencer::PageSpec;
use crate::sticker::text_fit::LabelTypography;

/// Text shown in place of a missing sticker image.
pub const IMAGE_PLACEHOLDER: &str = "[Sticker image missing]";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageStatus {
    Embedded,
    Placeholder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageOutcome {
    pub image: ImageStatus,
}

pub trait PageSink {
    /// Appends one rendered page after all previously appended pages.
    fn append_page(&mut self, page: &PageSpec) -> Result<PageOutcome, SinkError>;

    /// Persists the accumulated document at `path`. Called once, after the last page.
    fn finalize(&mut self, _path: &Path) -> Result<(), SinkError> {
        Ok(())
    }

    /// File extension of the artifact this sink produces.
    fn artifact_extension(&self) -> &'static str {
        "docx"
    }
}

/// Whether the page's image can be embedded or needs a placeholder.
pub fn image_status(page: &PageSpec) -> ImageStatus {
    match page.image_path() {
        Some(path) if path.is_file() => ImageStatus::Embedded,
        _ => ImageStatus::Placeholder,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// MemorySink
// ────────────────────────────────────────────────────────────────────────────

/// Keeps appended pages in memory. Used for previews.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub pages: Vec<PageSpec>,
    pub placeholder_pages: usize,
}

impl PageSink for MemorySink {
    fn append_page(&mut self, page: &PageSpec) -> Result<PageOutcome, SinkError> {
        let image = image_status(page);
        if image == ImageStatus::Placeholder {
            self.placeholder_pages += 1;
        }
        self.pages.push(page.clone());
        Ok(PageOutcome { image })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// ManifestSink
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct TextRun {
    pub text: String,
    pub font: String,
    pub size_pt: u32,
    pub bold: bool,
    pub underline: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImageSlot {
    Picture { path: PathBuf, width_in: f32 },
    Placeholder { text: String },
}

/// A page with every run's font and size decided, ready for a document renderer.
#[derive(Debug, Clone, Serialize)]
pub struct LaidOutPage {
    pub page_number: usize,
    pub heading: TextRun,
    pub image: ImageSlot,
    pub product_line: TextRun,
    pub serial_line: TextRun,
}

#[derive(Debug, Serialize)]
struct Manifest<'a> {
    generated_at: DateTime<Utc>,
    page_count: usize,
    pages: &'a [LaidOutPage],
}

/// Lays pages out with the label typography and writes them as a JSON manifest.
pub struct ManifestSink {
    typography: LabelTypography,
    pages: Vec<LaidOutPage>,
}

impl ManifestSink {
    pub fn new(typography: LabelTypography) -> Self {
        Self {
            typography,
            pages: Vec::new(),
        }
    }

    fn body_run(&self, text: String) -> TextRun {
        TextRun {
            size_pt: self.typography.fit_line(&text),
            text,
            font: self.typography.text_font.clone(),
            bold: true,
            underline: false,
        }
    }

    fn lay_out(&self, page: &PageSpec, image: ImageStatus) -> LaidOutPage {
        let heading = TextRun {
            text: page.side.heading().to_string(),
            font: self.typography.heading_font.clone(),
            size_pt: self.typography.heading_size_pt,
            bold: true,
            underline: true,
        };

        let image = match (image, page.image_path()) {
            (ImageStatus::Embedded, Some(path)) => ImageSlot::Picture {
                path: path.to_path_buf(),
                width_in: self.typography.sticker_width_in,
            },
            _ => ImageSlot::Placeholder {
                text: IMAGE_PLACEHOLDER.to_string(),
            },
        };

        LaidOutPage {
            page_number: self.pages.len() + 1,
            heading,
            image,
            product_line: self.body_run(page.product_line()),
            serial_line: self.body_run(page.serial_number.clone()),
        }
    }
}

impl PageSink for ManifestSink {
    fn append_page(&mut self, page: &PageSpec) -> Result<PageOutcome, SinkError> {
        let image = image_status(page);
        let laid_out = self.lay_out(page, image);
        debug!(
            page = laid_out.page_number,
            product_size = laid_out.product_line.size_pt,
            serial_size = laid_out.serial_line.size_pt,
            "Laid out sticker page"
        );
        self.pages.push(laid_out);
        Ok(PageOutcome { image })
    }

    /// Writes to a temp file in the target directory, then renames over `path`,
    /// so a failed write never leaves a truncated manifest behind.
    fn finalize(&mut self, path: &Path) -> Result<(), SinkError> {
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let manifest = Manifest {
            generated_at: Utc::now(),
            page_count: self.pages.len(),
            pages: &self.pages,
        };

        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut tmp, &manifest)?;
        tmp.flush()?;
        tmp.persist(path).map_err(|e| SinkError::Io(e.error))?;
        Ok(())
    }

    fn artifact_extension(&self) -> &'static str {
        "json"
    }
}
