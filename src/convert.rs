//! Build entry points.
//!
//! [`convert`] validates the source once, then runs the configured
//! [`Strategy`]: a single method, or a linear walk through a fixed list that
//! stops at the first method producing a PDF.

use crate::config::{ConversionConfig, Method, Strategy};
use crate::error::ResumePdfError;
use crate::output::{Attempt, ConversionOutput, ConversionStats, DocumentMetadata, ProbeReport};
use crate::pipeline::input::{self, TexSource};
use crate::pipeline::{docker, inspect as pdf_inspect, latex, locate, remote, MethodOutput};
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

/// Compile `config.input` to PDF.
///
/// # Errors
/// Input errors (missing file, wrong extension) are returned straight away.
/// With [`Strategy::Single`] the method's own error is returned; with
/// [`Strategy::Fallback`] a failure of every method is reported as
/// [`ResumePdfError::AllMethodsFailed`].
pub async fn convert(config: &ConversionConfig) -> Result<ConversionOutput, ResumePdfError> {
    let total_start = Instant::now();
    let source = input::resolve_source(config).await?;
    info!("Input file: {}", source.path.display());
    info!("Output directory: {}", source.output_dir.display());

    let methods = config.strategy.methods();
    let mut attempts: Vec<Attempt> = Vec::with_capacity(methods.len());

    for (i, method) in methods.iter().copied().enumerate() {
        let has_next = i + 1 < methods.len();
        if let Some(ref cb) = config.progress_callback {
            cb.on_method_start(method, i + 1, methods.len());
        }
        info!("Method {}/{}: {}", i + 1, methods.len(), method);

        let started = Instant::now();
        let result = run_method(method, &source, config).await;
        let duration_ms = started.elapsed().as_millis() as u64;

        match result {
            Ok(out) => {
                if let Some(ref cb) = config.progress_callback {
                    cb.on_method_complete(method, &out.pdf_path, out.pdf_bytes);
                }
                attempts.push(Attempt::succeeded(method, duration_ms));
                let output = finish(out, method, attempts, duration_ms, total_start, config).await;
                if let Some(ref cb) = config.progress_callback {
                    cb.on_conversion_complete(Some(method), output.attempts.len());
                }
                return Ok(output);
            }
            Err(e) => {
                warn!("{} failed: {}", method, e);
                if let Some(ref cb) = config.progress_callback {
                    cb.on_method_error(method, &e.to_string(), has_next);
                }
                if let Strategy::Single(_) = config.strategy {
                    if let Some(ref cb) = config.progress_callback {
                        cb.on_conversion_complete(None, 1);
                    }
                    return Err(e);
                }
                attempts.push(Attempt::failed(method, &e, duration_ms));
                if has_next {
                    info!("Trying next method...");
                }
            }
        }
    }

    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_complete(None, attempts.len());
    }
    Err(ResumePdfError::AllMethodsFailed { attempts })
}

/// Run exactly one method, ignoring `config.strategy`.
pub async fn convert_with(
    method: Method,
    config: &ConversionConfig,
) -> Result<ConversionOutput, ResumePdfError> {
    let config = ConversionConfig {
        strategy: Strategy::Single(method),
        ..config.clone()
    };
    convert(&config).await
}

/// Synchronous wrapper around [`convert`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_sync(config: &ConversionConfig) -> Result<ConversionOutput, ResumePdfError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| ResumePdfError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert(config))
}

/// Metadata of an existing PDF. Needs pdfium.
pub async fn inspect(pdf: impl AsRef<Path>) -> Result<DocumentMetadata, ResumePdfError> {
    pdf_inspect::inspect_existing(pdf.as_ref()).await
}

/// Report which converters are reachable, without compiling anything.
pub async fn probe(config: &ConversionConfig) -> ProbeReport {
    let (pdflatex, pdflatex_error) =
        match locate::find_pdflatex(config.pdflatex.as_deref(), config.probe_timeout_secs).await {
            Ok(info) => (Some(info), None),
            Err(e) => (None, Some(e.to_string())),
        };
    let docker = locate::find_docker(config.probe_timeout_secs).await.ok();

    ProbeReport {
        pdflatex,
        pdflatex_error,
        docker,
        api_url: config.api_url.clone(),
    }
}

// ── Internal helpers ─────────────────────────────────────────────────────

async fn run_method(
    method: Method,
    source: &TexSource,
    config: &ConversionConfig,
) -> Result<MethodOutput, ResumePdfError> {
    match method {
        Method::Local => latex::compile_local(source, config).await,
        Method::Staged => latex::compile_staged(source, config).await,
        Method::Online => remote::compile_online(source, config).await,
        Method::Docker => docker::compile_docker(source, config).await,
    }
}

async fn finish(
    out: MethodOutput,
    method: Method,
    attempts: Vec<Attempt>,
    method_duration_ms: u64,
    total_start: Instant,
    config: &ConversionConfig,
) -> ConversionOutput {
    let metadata = pdf_inspect::describe(&out.pdf_path, out.log_page_count).await;
    let within_page_budget = pdf_inspect::check_page_budget(&metadata, config.max_pages);

    let stats = ConversionStats {
        pdf_bytes: out.pdf_bytes,
        passes: out.passes,
        removed_files: out.removed_files,
        method_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Build complete via {}: {} ({} bytes, {}ms)",
        method,
        out.pdf_path.display(),
        stats.pdf_bytes,
        stats.total_duration_ms
    );

    ConversionOutput {
        pdf_path: out.pdf_path,
        method,
        attempts,
        metadata,
        within_page_budget,
        stats,
    }
}
