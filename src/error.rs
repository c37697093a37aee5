//! Error types for the resume-pdf library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`ResumePdfError`] — **Fatal**: the build cannot proceed or every
//!   configured method failed. Returned as `Err(ResumePdfError)` from the
//!   top-level `convert*` functions.
//!
//! * [`AttemptError`] — **Non-fatal**: one method in a fallback run failed
//!   (pdflatex missing, endpoint down) but the next method may still succeed.
//!   Stored inside [`crate::output::Attempt`] so callers can see why each
//!   method was skipped.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the resume-pdf library.
#[derive(Debug, Error)]
pub enum ResumePdfError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Source file was not found at the given path.
    #[error("LaTeX file not found: '{path}'\nPlease ensure the file exists before running.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input does not carry a `.tex` extension.
    #[error("File must have .tex extension: '{path}'")]
    NotATexFile { path: PathBuf },

    /// The source is not valid UTF-8 and cannot be uploaded as text.
    #[error("LaTeX source '{path}' is not valid UTF-8")]
    SourceNotUtf8 { path: PathBuf },

    // ── Converter discovery ───────────────────────────────────────────────
    /// No pdflatex candidate answered `--version`.
    #[error(
        "LaTeX (pdflatex) not found in PATH or common installation locations \
(tried: {tried})\n\n\
To install LaTeX:\n\
  • Windows: Install MiKTeX or TeX Live\n\
  • macOS:   Install MacTeX\n\
  • Linux:   sudo apt-get install texlive-full      (Ubuntu/Debian)\n\
             sudo yum install texlive-scheme-full   (CentOS/RHEL)\n\
Or point PDFLATEX=/path/to/pdflatex at an existing copy."
    )]
    ConverterNotFound { tried: String },

    /// `docker --version` failed.
    #[error("Docker not found: {detail}\nInstall Docker or pick another method.")]
    DockerNotFound { detail: String },

    // ── Compilation errors ────────────────────────────────────────────────
    /// The converter exited non-zero on a pass.
    #[error("pdflatex failed on pass {pass}/{passes} ({status})\n{excerpt}")]
    CompileFailed {
        pass: u32,
        passes: u32,
        status: String,
        excerpt: String,
    },

    /// A pass exceeded the configured timeout; the child was killed.
    #[error("LaTeX compilation timed out after {secs}s on pass {pass}")]
    CompileTimeout { pass: u32, secs: u64 },

    /// The converter could not be started at all.
    #[error("Failed to run '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Every pass succeeded but the expected PDF is missing.
    #[error("PDF file was not created: '{path}'\nPlease check the LaTeX file for syntax errors.")]
    PdfNotProduced { path: PathBuf },

    // ── Remote errors ─────────────────────────────────────────────────────
    /// The endpoint answered with a status other than 200/201.
    #[error("API request failed with HTTP {status}\nResponse: {body_excerpt}...")]
    ApiStatus { status: u16, body_excerpt: String },

    /// The request did not complete within the configured timeout.
    #[error("API request to '{url}' timed out after {secs}s")]
    ApiTimeout { url: String, secs: u64 },

    /// Transport-level failure (DNS, TLS, connection refused…).
    #[error("Network error talking to '{url}': {reason}\nCheck your internet connection.")]
    Network { url: String, reason: String },

    /// A success status but the body is not a PDF.
    #[error("Response from '{url}' is not a PDF\nFirst bytes: {magic:?}")]
    NotAPdf { url: String, magic: Vec<u8> },

    // ── Orchestration ─────────────────────────────────────────────────────
    /// Every method of a fallback run failed.
    #[error("All {} methods failed:\n{}", .attempts.len(), format_attempts(.attempts))]
    AllMethodsFailed {
        attempts: Vec<crate::output::Attempt>,
    },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create the output directory or write the PDF.
    #[error("Failed to write '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

fn format_attempts(attempts: &[crate::output::Attempt]) -> String {
    attempts
        .iter()
        .map(|a| match &a.error {
            Some(e) => format!("  • {}: {}", a.method, e),
            None => format!("  • {}: ok", a.method),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Why a single method of a fallback run failed.
///
/// A flattened, serialisable copy of the fatal error: the fallback loop
/// keeps going, so the original error value is not propagated.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
#[error("{message}")]
pub struct AttemptError {
    /// Short machine-friendly category, e.g. `converter_not_found`.
    pub kind: String,
    /// Full human-readable message.
    pub message: String,
}

impl From<&ResumePdfError> for AttemptError {
    fn from(e: &ResumePdfError) -> Self {
        let kind = match e {
            ResumePdfError::FileNotFound { .. } => "file_not_found",
            ResumePdfError::PermissionDenied { .. } => "permission_denied",
            ResumePdfError::NotATexFile { .. } => "not_a_tex_file",
            ResumePdfError::SourceNotUtf8 { .. } => "source_not_utf8",
            ResumePdfError::ConverterNotFound { .. } => "converter_not_found",
            ResumePdfError::DockerNotFound { .. } => "docker_not_found",
            ResumePdfError::CompileFailed { .. } => "compile_failed",
            ResumePdfError::CompileTimeout { .. } => "compile_timeout",
            ResumePdfError::Spawn { .. } => "spawn_failed",
            ResumePdfError::PdfNotProduced { .. } => "pdf_not_produced",
            ResumePdfError::ApiStatus { .. } => "api_status",
            ResumePdfError::ApiTimeout { .. } => "api_timeout",
            ResumePdfError::Network { .. } => "network",
            ResumePdfError::NotAPdf { .. } => "not_a_pdf",
            ResumePdfError::AllMethodsFailed { .. } => "all_methods_failed",
            ResumePdfError::OutputWriteFailed { .. } => "output_write_failed",
            ResumePdfError::InvalidConfig(_) => "invalid_config",
            ResumePdfError::Internal(_) => "internal",
        };
        Self {
            kind: kind.to_string(),
            message: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Method;
    use crate::output::Attempt;

    #[test]
    fn converter_not_found_lists_install_hints() {
        let e = ResumePdfError::ConverterNotFound {
            tried: "pdflatex".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("tried: pdflatex"), "got: {msg}");
        assert!(msg.contains("MiKTeX"));
        assert!(msg.contains("texlive-full"));
    }

    #[test]
    fn compile_failed_display() {
        let e = ResumePdfError::CompileFailed {
            pass: 1,
            passes: 2,
            status: "exit status: 1".into(),
            excerpt: "! Undefined control sequence.".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("pass 1/2"), "got: {msg}");
        assert!(msg.contains("Undefined control sequence"));
    }

    #[test]
    fn api_status_display() {
        let e = ResumePdfError::ApiStatus {
            status: 500,
            body_excerpt: "boom".into(),
        };
        assert!(e.to_string().contains("HTTP 500"));
        assert!(e.to_string().contains("boom"));
    }

    #[test]
    fn all_methods_failed_lists_each_attempt() {
        let e = ResumePdfError::AllMethodsFailed {
            attempts: vec![
                Attempt::failed(
                    Method::Online,
                    &ResumePdfError::Network {
                        url: "https://x".into(),
                        reason: "dns".into(),
                    },
                    5,
                ),
                Attempt::failed(
                    Method::Docker,
                    &ResumePdfError::DockerNotFound {
                        detail: "no such file".into(),
                    },
                    1,
                ),
            ],
        };
        let msg = e.to_string();
        assert!(msg.contains("All 2 methods failed"), "got: {msg}");
        assert!(msg.contains("online"));
        assert!(msg.contains("docker"));
    }

    #[test]
    fn attempt_error_kind() {
        let e = ResumePdfError::CompileTimeout { pass: 2, secs: 120 };
        let a = AttemptError::from(&e);
        assert_eq!(a.kind, "compile_timeout");
        assert!(a.message.contains("120s"));
    }
}
