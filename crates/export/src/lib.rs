//! PDF export pipeline.
//!
//! A [`StaticDocument`] is laid out into bands at a fixed device scale,
//! paginated onto A4 pages and written as PDF bytes in memory. Only complete
//! bytes ever reach the filesystem, via a temporary file that is renamed into
//! place.

pub mod error;
pub mod layout;
pub mod options;
pub mod paginate;
mod pdf;
mod text;

use std::path::{Path, PathBuf};

use qikspare_core::ExportId;
use qikspare_invoicing::DocumentType;
use qikspare_render::StaticDocument;
use tracing::Instrument;

pub use error::ExportError;
pub use options::{ExportOptions, FontChoice, PageSize};

use crate::layout::LayoutEngine;
use crate::paginate::{Page, PageGeometry, paginate};
use crate::text::Metrics;

/// `{type}_invoice_{millis}.pdf`
pub fn export_filename(document_type: DocumentType, unix_millis: i64) -> String {
    format!("{}_invoice_{unix_millis}.pdf", document_type.as_str())
}

/// A finished export, not yet on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedPdf {
    pub filename: String,
    pub page_count: usize,
    pub bytes: Vec<u8>,
}

impl ExportedPdf {
    /// Write into `dir` under [`ExportedPdf::filename`].
    ///
    /// The bytes go to a hidden temporary file first; on any failure the
    /// temporary file is removed and no `.pdf` appears in `dir`.
    pub fn save_to(&self, dir: &Path) -> Result<PathBuf, ExportError> {
        let target = dir.join(&self.filename);
        let temp = dir.join(format!(".{}.part", self.filename));

        if let Err(err) = std::fs::write(&temp, &self.bytes).and_then(|_| std::fs::rename(&temp, &target)) {
            let _ = std::fs::remove_file(&temp);
            return Err(err.into());
        }

        tracing::info!(path = %target.display(), bytes = self.bytes.len(), "invoice pdf saved");
        Ok(target)
    }
}

#[derive(Debug, Clone)]
pub struct Exporter {
    options: ExportOptions,
}

impl Exporter {
    pub fn new(options: ExportOptions) -> Result<Self, ExportError> {
        options.validate()?;
        Ok(Self { options })
    }

    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    /// Lay out, paginate and serialise `document`.
    ///
    /// `filename_hint` is reduced to a bare file name ending in `.pdf`.
    pub fn export(&self, document: &StaticDocument, filename_hint: &str) -> Result<ExportedPdf, ExportError> {
        let pages = self.pages(document)?;
        let title = Metrics::for_font(&self.options.font).prepare(&document.title)?;
        let bytes = pdf::write_pdf(&title, &pages, &self.options)?;

        let exported = ExportedPdf {
            filename: sanitize_filename(filename_hint),
            page_count: pages.len(),
            bytes,
        };
        tracing::debug!(
            document_type = %document.document_type,
            filename = %exported.filename,
            pages = exported.page_count,
            bytes = exported.bytes.len(),
            "invoice exported"
        );
        Ok(exported)
    }

    /// Lay out and paginate `document` without producing PDF bytes.
    pub fn pages(&self, document: &StaticDocument) -> Result<Vec<Page>, ExportError> {
        let geometry = PageGeometry::from_options(&self.options);
        let metrics = Metrics::for_font(&self.options.font);
        let bands = LayoutEngine::new(metrics).layout(&document.root, geometry.content_width())?;
        paginate(&bands, &geometry, &self.options)
    }

    /// [`Exporter::export`] on the blocking pool. Each call is an independent
    /// task; there is no queueing or cancellation.
    pub async fn export_in_background(
        &self,
        document: StaticDocument,
        filename_hint: String,
    ) -> Result<ExportedPdf, ExportError> {
        let export_id = ExportId::new();
        let span = tracing::info_span!("export", %export_id, document_type = %document.document_type);
        let exporter = self.clone();

        async move {
            let span = tracing::Span::current();
            tokio::task::spawn_blocking(move || {
                let _guard = span.enter();
                exporter.export(&document, &filename_hint)
            })
            .await
            .map_err(|e| ExportError::Task(e.to_string()))?
        }
        .instrument(span)
        .await
    }
}

fn sanitize_filename(hint: &str) -> String {
    let base = hint.rsplit(['/', '\\']).next().unwrap_or_default().trim();
    let base = base.trim_start_matches('.');
    if base.is_empty() {
        return "invoice.pdf".to_string();
    }
    if base.to_ascii_lowercase().ends_with(".pdf") {
        base.to_string()
    } else {
        format!("{base}.pdf")
    }
}
