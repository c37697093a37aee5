//! Remove pdflatex byproducts next to the PDF.

use crate::progress::ProgressCallback;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Delete `<dir>/<stem><ext>` for every extension that exists.
///
/// Failures to delete are logged and skipped; a stray `.aux` file is not
/// worth failing a build that already produced its PDF.
pub async fn remove_aux_files(
    dir: &Path,
    stem: &str,
    extensions: &[String],
    progress: Option<&ProgressCallback>,
) -> Vec<PathBuf> {
    let mut removed = Vec::new();
    for ext in extensions {
        let candidate = dir.join(format!("{stem}{ext}"));
        if !tokio::fs::try_exists(&candidate).await.unwrap_or(false) {
            continue;
        }
        match tokio::fs::remove_file(&candidate).await {
            Ok(()) => {
                debug!("Cleaned up: {}", candidate.display());
                if let Some(cb) = progress {
                    cb.on_cleanup(&candidate);
                }
                removed.push(candidate);
            }
            Err(e) => warn!("Could not remove {}: {}", candidate.display(), e),
        }
    }
    removed
}
