//! # resume-pdf
//!
//! Compile a single LaTeX résumé to PDF, on demand.
//!
//! Four interchangeable methods produce the same PDF:
//!
//! | Method   | Needs                | Byproducts |
//! |----------|----------------------|------------|
//! | `local`  | pdflatex             | cleaned up next to the PDF |
//! | `staged` | pdflatex             | left in a temp dir that is deleted |
//! | `online` | network access       | none |
//! | `docker` | docker + TeX Live image | cleaned up next to the PDF |
//!
//! The default strategy tries them in the order online → local → staged →
//! docker and stops at the first that succeeds.
//!
//! ## Flow
//!
//! ```text
//! .tex
//!  │
//!  ├─ 1. Input    validate path / extension, create the output directory
//!  ├─ 2. Locate   probe pdflatex candidates (or docker) with --version
//!  ├─ 3. Compile  pdflatex ×N passes  |  multipart POST  |  docker run ×N
//!  ├─ 4. Verify   <stem>.pdf exists, page count from the log
//!  ├─ 5. Cleanup  .aux .log .out .fdb_latexmk .fls .synctex.gz
//!  └─ 6. Inspect  page count / metadata via pdfium, page-budget check
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use resume_pdf::{convert, ConversionConfig, Method};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::builder()
//!         .input("assets/pdf/resume.tex")
//!         .method(Method::Local)
//!         .build()?;
//!     let output = convert(&config).await?;
//!     println!("{} ({} bytes)", output.pdf_path.display(), output.stats.pdf_bytes);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `resume-pdf` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder, Method, Strategy};
pub use convert::{convert, convert_sync, convert_with, inspect, probe};
pub use error::{AttemptError, ResumePdfError};
pub use output::{
    Attempt, ConversionOutput, ConversionStats, ConverterInfo, DocumentMetadata, ProbeReport,
};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
