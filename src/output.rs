//! Result types returned by a build.

use crate::config::Method;
use crate::error::{AttemptError, ResumePdfError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Everything a successful build produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionOutput {
    /// Absolute path of the written PDF.
    pub pdf_path: PathBuf,
    /// The method that produced it.
    pub method: Method,
    /// One entry per method that ran, in order. The last one succeeded.
    pub attempts: Vec<Attempt>,
    /// What we could learn about the PDF afterwards.
    pub metadata: DocumentMetadata,
    /// `Some(true)` when the page count is known and within `max_pages`.
    pub within_page_budget: Option<bool>,
    pub stats: ConversionStats,
}

/// Outcome of running a single method.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attempt {
    pub method: Method,
    /// `None` when the method succeeded.
    pub error: Option<AttemptError>,
    pub duration_ms: u64,
}

impl Attempt {
    pub fn succeeded(method: Method, duration_ms: u64) -> Self {
        Self {
            method,
            error: None,
            duration_ms,
        }
    }

    pub fn failed(method: Method, error: &ResumePdfError, duration_ms: u64) -> Self {
        Self {
            method,
            error: Some(AttemptError::from(error)),
            duration_ms,
        }
    }
}

/// Timing and size figures for a build.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversionStats {
    /// Size of the PDF in bytes.
    pub pdf_bytes: u64,
    /// pdflatex passes run by the winning method (0 for online builds).
    pub passes: u32,
    /// Auxiliary files deleted after the build.
    pub removed_files: Vec<PathBuf>,
    /// Wall-clock time of the winning method.
    pub method_duration_ms: u64,
    /// Wall-clock time of the whole build, fallbacks included.
    pub total_duration_ms: u64,
}

/// Facts about a PDF. Only `page_count` is filled from the pdflatex log;
/// the other fields need pdfium.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub page_count: Option<usize>,
    pub pdf_version: Option<String>,
    /// Where `page_count` came from: `"pdfium"` or `"latex-log"`.
    pub page_count_source: Option<String>,
}

/// Which converters are reachable, without compiling anything.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProbeReport {
    /// The pdflatex that discovery would pick.
    pub pdflatex: Option<ConverterInfo>,
    /// Why discovery failed, when it did.
    pub pdflatex_error: Option<String>,
    /// `docker --version` output, when docker answered.
    pub docker: Option<String>,
    pub api_url: String,
}

/// A converter that answered `--version`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConverterInfo {
    pub path: PathBuf,
    /// First line of `--version` output.
    pub version: String,
}
