//! Build stages.
//!
//! ## Data Flow
//!
//! ```text
//!            ┌─▶ latex  (Local / Staged) ─┐
//! input ─────┼─▶ docker                  ─┼──▶ texlog ──▶ cleanup ──▶ inspect
//! (validate) └─▶ remote (Online)         ─┘
//!               ▲
//!             locate (pdflatex / docker discovery)
//! ```
//!
//! 1. [`input`]   — validate the `.tex` source and fix the output directory
//! 2. [`locate`]  — probe pdflatex candidates and docker with `--version`
//! 3. [`latex`]   — run the pass loop against a local pdflatex, in place or
//!    in a scratch directory
//! 4. [`docker`]  — the same pass loop inside the TeX Live image
//! 5. [`remote`]  — one multipart POST to the online compile endpoint
//! 6. [`texlog`]  — pull error excerpts and the page count out of pdflatex output
//! 7. [`cleanup`] — delete auxiliary byproducts next to the PDF
//! 8. [`inspect`] — page count / metadata of the finished PDF via pdfium

pub mod cleanup;
pub mod docker;
pub mod input;
pub mod inspect;
pub mod latex;
pub mod locate;
pub mod remote;
pub mod texlog;

use std::path::PathBuf;

/// What a method hands back to the orchestrator.
#[derive(Debug, Clone)]
pub struct MethodOutput {
    pub pdf_path: PathBuf,
    pub pdf_bytes: u64,
    pub passes: u32,
    pub removed_files: Vec<PathBuf>,
    /// Page count read from the pdflatex log, when one was written.
    pub log_page_count: Option<usize>,
}

/// Write `bytes` to `dest` via a sibling temp file and a rename, so a failed
/// write never leaves a truncated PDF where the last good one was.
pub(crate) async fn write_atomic(
    dest: &std::path::Path,
    bytes: &[u8],
) -> Result<(), crate::error::ResumePdfError> {
    let tmp = dest.with_extension("pdf.tmp");
    let fail = |e| crate::error::ResumePdfError::OutputWriteFailed {
        path: dest.to_path_buf(),
        source: e,
    };
    tokio::fs::write(&tmp, bytes).await.map_err(fail)?;
    tokio::fs::rename(&tmp, dest).await.map_err(fail)
}
