//! Input resolution: validate the `.tex` source and decide where the PDF goes.
//!
//! Paths are made absolute up front. Converters run with `current_dir` set
//! to the source directory, so a relative output directory would otherwise
//! be resolved against the wrong base.

use crate::config::{has_tex_extension, ConversionConfig};
use crate::error::ResumePdfError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A validated source file plus its output location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TexSource {
    /// Absolute path of the `.tex` file.
    pub path: PathBuf,
    /// Directory containing the source.
    pub dir: PathBuf,
    /// File name, e.g. `resume.tex`.
    pub file_name: String,
    /// File stem, e.g. `resume`.
    pub stem: String,
    /// Absolute directory that receives the PDF.
    pub output_dir: PathBuf,
}

impl TexSource {
    /// Where the converter is expected to write the PDF.
    pub fn pdf_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}.pdf", self.stem))
    }

    /// The pdflatex log next to the PDF.
    pub fn log_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}.log", self.stem))
    }
}

/// Validate `config.input` and create the output directory.
pub async fn resolve_source(config: &ConversionConfig) -> Result<TexSource, ResumePdfError> {
    let path = absolute(&config.input)?;

    if !path.exists() {
        return Err(ResumePdfError::FileNotFound { path });
    }

    match tokio::fs::File::open(&path).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(ResumePdfError::PermissionDenied { path });
        }
        Err(_) => return Err(ResumePdfError::FileNotFound { path }),
    }

    if !has_tex_extension(&path) {
        return Err(ResumePdfError::NotATexFile { path });
    }

    let dir = path
        .parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| ResumePdfError::Internal(format!("'{}' has no parent", path.display())))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = path
        .file_stem()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let output_dir = match config.output_dir {
        Some(ref d) => absolute(d)?,
        None => dir.clone(),
    };
    tokio::fs::create_dir_all(&output_dir)
        .await
        .map_err(|e| ResumePdfError::OutputWriteFailed {
            path: output_dir.clone(),
            source: e,
        })?;

    debug!(
        "Resolved source {} → {}",
        path.display(),
        output_dir.display()
    );

    Ok(TexSource {
        path,
        dir,
        file_name,
        stem,
        output_dir,
    })
}

fn absolute(p: &Path) -> Result<PathBuf, ResumePdfError> {
    std::path::absolute(p)
        .map_err(|e| ResumePdfError::Internal(format!("cannot resolve '{}': {e}", p.display())))
}
