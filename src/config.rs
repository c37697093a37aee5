//! Configuration types for a LaTeX-to-PDF build.
//!
//! All behaviour is controlled through [`ConversionConfig`], built via its
//! [`ConversionConfigBuilder`]. Setters clamp out-of-range numbers; `build()`
//! rejects combinations that can never succeed.

use crate::error::ResumePdfError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Default source file, relative to the working directory.
pub const DEFAULT_INPUT: &str = "assets/pdf/resume.tex";

/// Public synchronous compile endpoint.
pub const DEFAULT_API_URL: &str = "https://latex.ytotech.com/builds/sync";

/// Image used by [`Method::Docker`].
pub const DEFAULT_DOCKER_IMAGE: &str = "texlive/texlive:latest";

/// Byproducts removed after a successful local build.
pub const DEFAULT_CLEANUP_EXTENSIONS: &[&str] =
    &[".aux", ".log", ".out", ".fdb_latexmk", ".fls", ".synctex.gz"];

/// Configuration for one LaTeX-to-PDF build.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use resume_pdf::{ConversionConfig, Method, Strategy};
///
/// let config = ConversionConfig::builder()
///     .input("cv/resume.tex")
///     .strategy(Strategy::Single(Method::Local))
///     .passes(2)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Path to the `.tex` source. Default: [`DEFAULT_INPUT`].
    pub input: PathBuf,

    /// Directory that receives the PDF. `None` means the source's directory.
    pub output_dir: Option<PathBuf>,

    /// Which method(s) to run. Default: fallback through all four.
    pub strategy: Strategy,

    /// pdflatex passes. Range: 1–5. Default: 2.
    ///
    /// The second pass resolves cross references and page totals written to
    /// the `.aux` file by the first.
    pub passes: u32,

    /// Per-pass timeout in seconds. Default: 120.
    pub compile_timeout_secs: u64,

    /// Timeout for each `--version` probe during discovery. Default: 10.
    pub probe_timeout_secs: u64,

    /// Explicit pdflatex executable. Skips the candidate list when set.
    pub pdflatex: Option<PathBuf>,

    /// Remote compile endpoint. Default: [`DEFAULT_API_URL`].
    pub api_url: String,

    /// Timeout for the single remote request in seconds. Default: 30.
    pub api_timeout_secs: u64,

    /// Docker image carrying pdflatex. Default: [`DEFAULT_DOCKER_IMAGE`].
    pub docker_image: String,

    /// Extensions (with leading dot) deleted next to the PDF after a build.
    pub cleanup_extensions: Vec<String>,

    /// Leave auxiliary files in place. Default: false.
    pub keep_aux: bool,

    /// Warn when the PDF has more pages than this. `None` disables the check.
    /// Default: `Some(1)`.
    pub max_pages: Option<usize>,

    /// Optional progress callback. Default: None.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            output_dir: None,
            strategy: Strategy::default(),
            passes: 2,
            compile_timeout_secs: 120,
            probe_timeout_secs: 10,
            pdflatex: None,
            api_url: DEFAULT_API_URL.to_string(),
            api_timeout_secs: 30,
            docker_image: DEFAULT_DOCKER_IMAGE.to_string(),
            cleanup_extensions: DEFAULT_CLEANUP_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            keep_aux: false,
            max_pages: Some(1),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("input", &self.input)
            .field("output_dir", &self.output_dir)
            .field("strategy", &self.strategy)
            .field("passes", &self.passes)
            .field("compile_timeout_secs", &self.compile_timeout_secs)
            .field("pdflatex", &self.pdflatex)
            .field("api_url", &self.api_url)
            .field("docker_image", &self.docker_image)
            .field("keep_aux", &self.keep_aux)
            .field("max_pages", &self.max_pages)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn input(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.input = path.into();
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = Some(dir.into());
        self
    }

    pub fn strategy(mut self, strategy: Strategy) -> Self {
        self.config.strategy = strategy;
        self
    }

    pub fn method(self, method: Method) -> Self {
        self.strategy(Strategy::Single(method))
    }

    pub fn passes(mut self, n: u32) -> Self {
        self.config.passes = n.clamp(1, 5);
        self
    }

    pub fn compile_timeout_secs(mut self, secs: u64) -> Self {
        self.config.compile_timeout_secs = secs.max(1);
        self
    }

    pub fn probe_timeout_secs(mut self, secs: u64) -> Self {
        self.config.probe_timeout_secs = secs.max(1);
        self
    }

    pub fn pdflatex(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdflatex = Some(path.into());
        self
    }

    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_url = url.into();
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs.max(1);
        self
    }

    pub fn docker_image(mut self, image: impl Into<String>) -> Self {
        self.config.docker_image = image.into();
        self
    }

    pub fn cleanup_extensions<I, S>(mut self, exts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.cleanup_extensions = exts.into_iter().map(Into::into).collect();
        self
    }

    pub fn keep_aux(mut self, v: bool) -> Self {
        self.config.keep_aux = v;
        self
    }

    /// `0` disables the page-budget check.
    pub fn max_pages(mut self, n: usize) -> Self {
        self.config.max_pages = if n == 0 { None } else { Some(n) };
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, ResumePdfError> {
        let c = &self.config;
        if !has_tex_extension(&c.input) {
            return Err(ResumePdfError::InvalidConfig(format!(
                "input must be a .tex file, got '{}'",
                c.input.display()
            )));
        }
        if let Strategy::Fallback(ref methods) = c.strategy {
            if methods.is_empty() {
                return Err(ResumePdfError::InvalidConfig(
                    "fallback strategy needs at least one method".into(),
                ));
            }
        }
        if !(c.api_url.starts_with("http://") || c.api_url.starts_with("https://")) {
            return Err(ResumePdfError::InvalidConfig(format!(
                "api_url must be an http(s) URL, got '{}'",
                c.api_url
            )));
        }
        if c.docker_image.trim().is_empty() {
            return Err(ResumePdfError::InvalidConfig(
                "docker image must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

/// Case-insensitive `.tex` check.
pub(crate) fn has_tex_extension(path: &std::path::Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("tex"))
}

// ── Enums ────────────────────────────────────────────────────────────────

/// One way of turning the source into a PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    /// Run a locally installed pdflatex next to the source.
    Local,
    /// Copy the source into a temporary directory, compile there, move the
    /// PDF back. Leaves no byproducts behind.
    Staged,
    /// POST the source to the online compile endpoint.
    Online,
    /// Run pdflatex inside the TeX Live Docker image.
    Docker,
}

impl Method {
    /// Order used by "try all": online first since it needs no installation.
    pub const FALLBACK_ORDER: [Method; 4] =
        [Method::Online, Method::Local, Method::Staged, Method::Docker];

    /// One-line description used by the CLI menu.
    pub fn describe(&self) -> &'static str {
        match self {
            Method::Local => "pdflatex (requires LaTeX installation)",
            Method::Staged => "pdflatex in a scratch directory (requires LaTeX installation)",
            Method::Online => "Online API (requires network access)",
            Method::Docker => "Docker LaTeX (requires Docker)",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Method::Local => "local",
            Method::Staged => "staged",
            Method::Online => "online",
            Method::Docker => "docker",
        };
        f.write_str(s)
    }
}

/// Which methods a build runs, and how.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Strategy {
    /// Run exactly one method.
    Single(Method),
    /// Try each method in order until one succeeds.
    Fallback(Vec<Method>),
}

impl Default for Strategy {
    fn default() -> Self {
        Strategy::Fallback(Method::FALLBACK_ORDER.to_vec())
    }
}

impl Strategy {
    /// The methods this strategy may run, in order.
    pub fn methods(&self) -> Vec<Method> {
        match self {
            Strategy::Single(m) => vec![*m],
            Strategy::Fallback(list) => list.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = ConversionConfig::default();
        assert_eq!(c.passes, 2);
        assert_eq!(c.compile_timeout_secs, 120);
        assert_eq!(c.api_timeout_secs, 30);
        assert_eq!(c.max_pages, Some(1));
        assert_eq!(c.cleanup_extensions.len(), 6);
        assert_eq!(
            c.strategy.methods(),
            vec![Method::Online, Method::Local, Method::Staged, Method::Docker]
        );
    }

    #[test]
    fn passes_are_clamped() {
        let c = ConversionConfig::builder().passes(0).build().unwrap();
        assert_eq!(c.passes, 1);
        let c = ConversionConfig::builder().passes(42).build().unwrap();
        assert_eq!(c.passes, 5);
    }

    #[test]
    fn rejects_non_tex_input() {
        let err = ConversionConfig::builder()
            .input("resume.md")
            .build()
            .unwrap_err();
        assert!(matches!(err, ResumePdfError::InvalidConfig(_)));
    }

    #[test]
    fn accepts_uppercase_extension() {
        assert!(ConversionConfig::builder().input("CV.TEX").build().is_ok());
    }

    #[test]
    fn rejects_empty_fallback() {
        let err = ConversionConfig::builder()
            .strategy(Strategy::Fallback(vec![]))
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("at least one method"));
    }

    #[test]
    fn rejects_non_http_api_url() {
        assert!(ConversionConfig::builder()
            .api_url("ftp://example.com")
            .build()
            .is_err());
    }

    #[test]
    fn zero_max_pages_disables_check() {
        let c = ConversionConfig::builder().max_pages(0).build().unwrap();
        assert_eq!(c.max_pages, None);
    }

    #[test]
    fn method_serialises_lowercase() {
        assert_eq!(serde_json::to_string(&Method::Online).unwrap(), "\"online\"");
        assert_eq!(Method::Staged.to_string(), "staged");
    }
}
