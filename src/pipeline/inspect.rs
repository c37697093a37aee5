//! Page count and metadata of a finished PDF.
//!
//! pdfium is optional at runtime: it is bound from `PDFIUM_LIB_PATH` (a
//! library file or the directory holding it) or from the system library
//! path. When neither works the page count falls back to what pdflatex
//! reported in its log, and online builds simply go without one.

use crate::error::ResumePdfError;
use crate::output::DocumentMetadata;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Env var pointing at an existing pdfium library.
pub const PDFIUM_LIB_PATH: &str = "PDFIUM_LIB_PATH";

/// Describe `pdf`, using pdfium when it can be bound and `log_page_count`
/// otherwise. Never fails: an unreadable PDF yields empty metadata.
pub async fn describe(pdf: &Path, log_page_count: Option<usize>) -> DocumentMetadata {
    match read_metadata(pdf).await {
        Ok(meta) => meta,
        Err(reason) => {
            debug!("pdfium unavailable for {}: {}", pdf.display(), reason);
            DocumentMetadata {
                page_count: log_page_count,
                page_count_source: log_page_count.map(|_| "latex-log".to_string()),
                ..DocumentMetadata::default()
            }
        }
    }
}

/// Read metadata with pdfium on a blocking thread.
pub async fn read_metadata(pdf: &Path) -> Result<DocumentMetadata, String> {
    let path = pdf.to_path_buf();
    tokio::task::spawn_blocking(move || read_metadata_blocking(&path))
        .await
        .map_err(|e| format!("metadata task panicked: {e}"))?
}

/// Metadata of an existing PDF, for the library's `inspect` entry point.
pub async fn inspect_existing(pdf: &Path) -> Result<DocumentMetadata, ResumePdfError> {
    if !pdf.exists() {
        return Err(ResumePdfError::FileNotFound {
            path: pdf.to_path_buf(),
        });
    }
    read_metadata(pdf)
        .await
        .map_err(|reason| ResumePdfError::Internal(format!("cannot inspect '{}': {reason}", pdf.display())))
}

fn bind() -> Result<Pdfium, String> {
    let bindings = match std::env::var_os(PDFIUM_LIB_PATH) {
        Some(p) => {
            let p = PathBuf::from(p);
            let lib = if p.is_dir() {
                Pdfium::pdfium_platform_library_name_at_path(&p)
            } else {
                p
            };
            Pdfium::bind_to_library(lib)
        }
        None => Pdfium::bind_to_system_library(),
    }
    .map_err(|e| format!("{e:?}"))?;
    Ok(Pdfium::new(bindings))
}

fn read_metadata_blocking(pdf: &Path) -> Result<DocumentMetadata, String> {
    let pdfium = bind()?;
    let document = pdfium
        .load_pdf_from_file(pdf, None)
        .map_err(|e| format!("{e:?}"))?;

    let metadata = document.metadata();
    let get_meta = |tag: PdfDocumentMetadataTagType| -> Option<String> {
        metadata.get(tag).and_then(|t| {
            let v = t.value().trim().to_string();
            if v.is_empty() {
                None
            } else {
                Some(v)
            }
        })
    };

    Ok(DocumentMetadata {
        title: get_meta(PdfDocumentMetadataTagType::Title),
        author: get_meta(PdfDocumentMetadataTagType::Author),
        creator: get_meta(PdfDocumentMetadataTagType::Creator),
        producer: get_meta(PdfDocumentMetadataTagType::Producer),
        page_count: Some(document.pages().len() as usize),
        pdf_version: Some(format!("{:?}", document.version())),
        page_count_source: Some("pdfium".to_string()),
    })
}

/// Compare the page count against the budget and log the verdict.
///
/// Returns `None` when either side is unknown.
pub fn check_page_budget(meta: &DocumentMetadata, max_pages: Option<usize>) -> Option<bool> {
    let (pages, max) = (meta.page_count?, max_pages?);
    if pages > max {
        warn!(
            "PDF has {pages} page(s), over the {max}-page budget; consider further compacting"
        );
        Some(false)
    } else {
        debug!("PDF has {pages} page(s), within the {max}-page budget");
        Some(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(pages: Option<usize>) -> DocumentMetadata {
        DocumentMetadata {
            page_count: pages,
            ..DocumentMetadata::default()
        }
    }

    #[test]
    fn budget_verdicts() {
        assert_eq!(check_page_budget(&meta(Some(1)), Some(1)), Some(true));
        assert_eq!(check_page_budget(&meta(Some(2)), Some(1)), Some(false));
        assert_eq!(check_page_budget(&meta(None), Some(1)), None);
        assert_eq!(check_page_budget(&meta(Some(3)), None), None);
    }

    #[tokio::test]
    async fn falls_back_to_log_count_for_unreadable_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("broken.pdf");
        std::fs::write(&pdf, b"not a pdf at all").unwrap();

        let m = describe(&pdf, Some(2)).await;
        assert_eq!(m.page_count, Some(2));
        assert_eq!(m.page_count_source.as_deref(), Some("latex-log"));
    }

    #[tokio::test]
    async fn inspect_missing_file() {
        let err = inspect_existing(Path::new("/definitely/not/here.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, ResumePdfError::FileNotFound { .. }));
    }
}
