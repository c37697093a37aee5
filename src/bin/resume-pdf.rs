//! CLI binary for resume-pdf.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ConversionConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use resume_pdf::config::{DEFAULT_API_URL, DEFAULT_DOCKER_IMAGE, DEFAULT_INPUT};
use resume_pdf::{
    convert, probe, ConversionConfig, ConversionOutput, ConversionProgressCallback, Method,
    ProgressCallback, ProbeReport, Strategy,
};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a spinner showing the current method and
/// pdflatex pass, with one status line per finished method.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("Preparing");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_method_start(&self, method: Method, index: usize, total: usize) {
        self.bar.set_prefix(method.to_string());
        self.bar.set_message("starting…");
        self.bar.println(format!(
            "{} {}  {}",
            cyan("◆"),
            bold(&format!("[{index}/{total}] {method}")),
            dim(method.describe())
        ));
    }

    fn on_pass_start(&self, _method: Method, pass: u32, passes: u32) {
        self.bar.set_message(format!("pdflatex pass {pass}/{passes}"));
    }

    fn on_method_complete(&self, method: Method, pdf_path: &Path, bytes: u64) {
        self.bar.println(format!(
            "  {} {} → {}  {}",
            green("✓"),
            method,
            pdf_path.display(),
            dim(&format!("{bytes} bytes"))
        ));
    }

    fn on_method_error(&self, method: Method, error: &str, has_next: bool) {
        let first = error.lines().next().unwrap_or(error);
        self.bar
            .println(format!("  {} {}  {}", red("✗"), method, red(first)));
        if has_next {
            self.bar.println(dim("  Trying next method…"));
        }
    }

    fn on_cleanup(&self, removed: &Path) {
        let name = removed
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.bar.println(dim(&format!("  Cleaned up: {name}")));
    }

    fn on_conversion_complete(&self, _succeeded: Option<Method>, _attempts: usize) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Try every method (online, local, staged, docker) until one works
  resume-pdf assets/pdf/resume.tex

  # Local pdflatex only, output elsewhere, keep .aux/.log for debugging
  resume-pdf --method local --keep-aux -o build/ cv.tex

  # Pick a method interactively
  resume-pdf --menu

  # Which converters are reachable?
  resume-pdf --check

  # Machine-readable report
  resume-pdf --json cv.tex > report.json

ENVIRONMENT VARIABLES:
  RESUME_PDF_*        Every flag, e.g. RESUME_PDF_METHOD=docker
  PDFLATEX            Path to pdflatex, tried before the built-in locations
  PDFIUM_LIB_PATH     pdfium library (file or directory) for the page-count check
  RUST_LOG            Log filter, overrides --verbose/--quiet
"#;

/// Compile a LaTeX résumé to PDF.
#[derive(Parser, Debug)]
#[command(
    name = "resume-pdf",
    version,
    about = "Compile a LaTeX résumé to PDF with pdflatex, Docker or an online compile service",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// The .tex source.
    #[arg(env = "RESUME_PDF_INPUT", default_value = DEFAULT_INPUT)]
    input: PathBuf,

    /// Directory for the PDF (default: next to the source).
    #[arg(short, long, env = "RESUME_PDF_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Conversion method; `auto` tries online, local, staged, docker in turn.
    #[arg(short, long, env = "RESUME_PDF_METHOD", value_enum, default_value = "auto")]
    method: MethodArg,

    /// Choose the method from an interactive menu.
    #[arg(long, conflicts_with = "method")]
    menu: bool,

    /// pdflatex passes (1–5).
    #[arg(long, env = "RESUME_PDF_PASSES", default_value_t = 2,
          value_parser = clap::value_parser!(u32).range(1..=5))]
    passes: u32,

    /// Explicit pdflatex executable.
    #[arg(long, env = "RESUME_PDF_PDFLATEX")]
    pdflatex: Option<PathBuf>,

    /// Per-pass compile timeout in seconds.
    #[arg(long, env = "RESUME_PDF_COMPILE_TIMEOUT", default_value_t = 120)]
    compile_timeout: u64,

    /// Online compile endpoint.
    #[arg(long, env = "RESUME_PDF_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Online request timeout in seconds.
    #[arg(long, env = "RESUME_PDF_API_TIMEOUT", default_value_t = 30)]
    api_timeout: u64,

    /// Docker image carrying pdflatex.
    #[arg(long, env = "RESUME_PDF_DOCKER_IMAGE", default_value = DEFAULT_DOCKER_IMAGE)]
    docker_image: String,

    /// Keep .aux/.log/... next to the PDF.
    #[arg(long, env = "RESUME_PDF_KEEP_AUX")]
    keep_aux: bool,

    /// Warn when the PDF exceeds this many pages (0 disables).
    #[arg(long, env = "RESUME_PDF_MAX_PAGES", default_value_t = 1)]
    max_pages: usize,

    /// Print a JSON report instead of the summary.
    #[arg(long, env = "RESUME_PDF_JSON")]
    json: bool,

    /// Probe converters and exit without compiling.
    #[arg(long)]
    check: bool,

    /// Disable the spinner.
    #[arg(long, env = "RESUME_PDF_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs (includes full pdflatex output on failure).
    #[arg(short, long, env = "RESUME_PDF_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "RESUME_PDF_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum MethodArg {
    Auto,
    Local,
    Staged,
    Online,
    Docker,
}

impl From<MethodArg> for Strategy {
    fn from(v: MethodArg) -> Self {
        match v {
            MethodArg::Auto => Strategy::default(),
            MethodArg::Local => Strategy::Single(Method::Local),
            MethodArg::Staged => Strategy::Single(Method::Staged),
            MethodArg::Online => Strategy::Single(Method::Online),
            MethodArg::Docker => Strategy::Single(Method::Docker),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner already reports method/pass progress; INFO logs would
    // only interleave with it.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.check;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Probe-only mode ──────────────────────────────────────────────────
    if cli.check {
        let config = build_config(&cli, Strategy::default(), None)?;
        let report = probe(&config).await;
        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("Failed to serialise report")?
            );
        } else {
            print_probe(&report);
        }
        return Ok(());
    }

    // ── Method selection ─────────────────────────────────────────────────
    let strategy = if cli.menu {
        let stdin = io::stdin();
        prompt_menu(&mut stdin.lock(), &mut io::stderr())?
    } else {
        cli.method.into()
    };

    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn ConversionProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, strategy, progress_cb)?;

    if !cli.quiet && !cli.json {
        eprintln!("{} {}", cyan("◆"), bold("LaTeX résumé → PDF"));
        eprintln!("   Input:  {}", cli.input.display());
    }

    // ── Run conversion ───────────────────────────────────────────────────
    match convert(&config).await {
        Ok(output) => {
            if cli.json {
                let json =
                    serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
                println!("{json}");
            } else if !cli.quiet {
                print_summary(&output);
            }
            Ok(())
        }
        Err(e) => {
            if !cli.quiet {
                eprintln!("\n{} {}", red("✘"), bold("Failed to generate PDF"));
                eprintln!("{}", dim("Alternatives:"));
                eprintln!("{}", dim("  • resume-pdf --method online   (no installation needed)"));
                eprintln!("{}", dim("  • resume-pdf --method docker   (needs Docker only)"));
                eprintln!("{}", dim("  • an online LaTeX editor such as Overleaf"));
            }
            Err(anyhow::Error::new(e).context("Conversion failed"))
        }
    }
}

/// Map CLI args to `ConversionConfig`.
fn build_config(
    cli: &Cli,
    strategy: Strategy,
    progress: Option<ProgressCallback>,
) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder()
        .input(&cli.input)
        .strategy(strategy)
        .passes(cli.passes)
        .compile_timeout_secs(cli.compile_timeout)
        .api_url(&cli.api_url)
        .api_timeout_secs(cli.api_timeout)
        .docker_image(&cli.docker_image)
        .keep_aux(cli.keep_aux)
        .max_pages(cli.max_pages);

    if let Some(ref dir) = cli.output_dir {
        builder = builder.output_dir(dir);
    }
    if let Some(ref p) = cli.pdflatex {
        builder = builder.pdflatex(p);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Show the method menu on `out` and read one choice from `input`.
fn prompt_menu(input: &mut impl BufRead, out: &mut impl Write) -> Result<Strategy> {
    writeln!(out, "\nChoose conversion method:")?;
    for (i, m) in MENU.iter().enumerate() {
        writeln!(out, "{}. {}", i + 1, m.describe())?;
    }
    writeln!(out, "{}. Try all methods", MENU.len() + 1)?;
    write!(out, "\nEnter your choice (1-{}): ", MENU.len() + 1)?;
    out.flush()?;

    let mut line = String::new();
    input.read_line(&mut line).context("Failed to read choice")?;
    parse_menu_choice(&line).with_context(|| format!("Invalid choice: '{}'", line.trim()))
}

const MENU: [Method; 4] = [Method::Local, Method::Staged, Method::Online, Method::Docker];

/// `1`–`4` pick a single method, `5` tries all of them in fallback order.
fn parse_menu_choice(s: &str) -> Option<Strategy> {
    let n: usize = s.trim().parse().ok()?;
    match n {
        1..=4 => Some(Strategy::Single(MENU[n - 1])),
        5 => Some(Strategy::default()),
        _ => None,
    }
}

fn print_summary(output: &ConversionOutput) {
    eprintln!(
        "{} PDF generated via {}  →  {}",
        green("✔"),
        bold(&output.method.to_string()),
        bold(&output.pdf_path.display().to_string())
    );
    eprintln!(
        "   {}  /  {}ms total",
        dim(&format!("{} bytes", output.stats.pdf_bytes)),
        output.stats.total_duration_ms
    );

    match (output.metadata.page_count, output.within_page_budget) {
        (Some(pages), Some(true)) => {
            eprintln!("   {} {pages} page(s), within budget", green("✓"))
        }
        (Some(pages), Some(false)) => eprintln!(
            "   {} {pages} page(s), over budget; consider further compacting",
            yellow("⚠")
        ),
        (Some(pages), None) => eprintln!("   {pages} page(s)"),
        (None, _) => eprintln!(
            "   {}",
            dim("Page count unknown (set PDFIUM_LIB_PATH to enable the check)")
        ),
    }
}

fn print_probe(report: &ProbeReport) {
    match (&report.pdflatex, &report.pdflatex_error) {
        (Some(info), _) => println!(
            "{} pdflatex  {}  {}",
            green("✓"),
            info.path.display(),
            dim(&info.version)
        ),
        (None, Some(err)) => println!("{} pdflatex  {}", red("✗"), err),
        (None, None) => println!("{} pdflatex", red("✗")),
    }
    match &report.docker {
        Some(v) => println!("{} docker    {}", green("✓"), dim(v)),
        None => println!("{} docker    not available", red("✗")),
    }
    println!("{} online    {}", cyan("·"), report.api_url);
}
