//! pdflatex transcript parsing.
//!
//! TeX hard-wraps its terminal output and `.log` at 79 columns, so anything
//! that can span a wrap (file paths, the final "Output written on" line) is
//! matched after the newlines in that region are removed.

use once_cell::sync::Lazy;
use regex::Regex;

/// Errors kept in an excerpt before the rest is elided.
const MAX_ERRORS: usize = 3;

/// Context lines kept after each `!` line when no `l.<n>` marker shows up.
const MAX_CONTEXT: usize = 4;

/// Tail kept when the transcript has no recognisable error line.
const TAIL_LINES: usize = 20;

static RE_OUTPUT_WRITTEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Output written on .*?\((\d+) pages?, (\d+) bytes\)").unwrap()
});

static RE_LINE_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^l\.\d+").unwrap());

/// Page count from the final "Output written on X.pdf (N pages, M bytes)."
pub fn page_count(log: &str) -> Option<usize> {
    let start = log.rfind("Output written on")?;
    let region: String = log[start..]
        .chars()
        .take(600)
        .filter(|c| *c != '\n' && *c != '\r')
        .collect();
    RE_OUTPUT_WRITTEN
        .captures(&region)
        .and_then(|c| c[1].parse().ok())
}

/// True when TeX finished without shipping a single page.
pub fn no_pages_written(log: &str) -> bool {
    log.contains("No pages of output.")
}

/// The `! ...` error blocks of a transcript, each with its `l.<n>` context.
pub fn error_blocks(transcript: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut lines = transcript.lines().peekable();

    while let Some(line) = lines.next() {
        if !line.starts_with('!') {
            continue;
        }
        let mut block = vec![line.trim_end().to_string()];
        let mut taken = 0;
        while let Some(next) = lines.peek() {
            if next.starts_with('!') || taken >= MAX_CONTEXT {
                break;
            }
            let next = lines.next().unwrap_or_default();
            if !next.trim().is_empty() {
                block.push(next.trim_end().to_string());
            }
            taken += 1;
            if RE_LINE_MARKER.is_match(next) {
                break;
            }
        }
        blocks.push(block.join("\n"));
        if blocks.len() == MAX_ERRORS {
            break;
        }
    }
    blocks
}

/// Human-sized summary of a failed run.
///
/// Prefers the LaTeX error blocks; falls back to the tail of stdout and
/// stderr when TeX never printed one (crash, missing format file, …).
pub fn failure_excerpt(stdout: &str, stderr: &str) -> String {
    let blocks = error_blocks(stdout);
    if !blocks.is_empty() {
        return blocks.join("\n\n");
    }

    let mut tail: Vec<&str> = stdout
        .lines()
        .chain(stderr.lines())
        .filter(|l| !l.trim().is_empty())
        .collect();
    if tail.len() > TAIL_LINES {
        tail.drain(..tail.len() - TAIL_LINES);
    }
    if tail.is_empty() {
        "(no output)".to_string()
    } else {
        tail.join("\n")
    }
}
