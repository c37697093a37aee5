//! Converter discovery: find a pdflatex (and docker) that actually runs.
//!
//! Presence on disk is not enough; MiKTeX installs can be half-configured.
//! Each candidate is asked for `--version` under a timeout and the first one
//! that exits 0 wins.

use crate::error::ResumePdfError;
use crate::output::ConverterInfo;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Env var naming an explicit pdflatex executable.
pub const PDFLATEX_ENV: &str = "PDFLATEX";

/// Candidate executables in probe order.
///
/// An `explicit` path (from config) is the only candidate when set.
/// Otherwise `$PDFLATEX` comes first, then well-known install locations for
/// the current OS, then bare `pdflatex` for `PATH` lookup.
pub fn candidates(explicit: Option<&std::path::Path>) -> Vec<PathBuf> {
    if let Some(p) = explicit {
        return vec![p.to_path_buf()];
    }

    let mut list = Vec::new();
    if let Ok(p) = std::env::var(PDFLATEX_ENV) {
        if !p.is_empty() {
            list.push(PathBuf::from(p));
        }
    }

    if cfg!(windows) {
        list.push(PathBuf::from(
            r"C:\Program Files\MiKTeX\miktex\bin\x64\pdflatex.exe",
        ));
        list.push(PathBuf::from(
            r"C:\Program Files (x86)\MiKTeX\miktex\bin\pdflatex.exe",
        ));
        if let Ok(local) = std::env::var("LOCALAPPDATA") {
            list.push(
                PathBuf::from(local)
                    .join(r"Programs\MiKTeX\miktex\bin\x64\pdflatex.exe"),
            );
        }
    } else if cfg!(target_os = "macos") {
        list.push(PathBuf::from("/Library/TeX/texbin/pdflatex"));
    }

    list.push(PathBuf::from("pdflatex"));
    list.dedup();
    list
}

/// Run `<program> --version` and return its first stdout line on success.
///
/// `None` covers every failure: missing binary, non-zero exit, timeout.
pub async fn probe_version(program: &std::path::Path, timeout_secs: u64) -> Option<String> {
    let child = Command::new(program)
        .arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .output();

    match tokio::time::timeout(Duration::from_secs(timeout_secs), child).await {
        Ok(Ok(out)) if out.status.success() => {
            let stdout = String::from_utf8_lossy(&out.stdout);
            Some(stdout.lines().next().unwrap_or("").trim().to_string())
        }
        Ok(Ok(out)) => {
            debug!("{} --version exited with {}", program.display(), out.status);
            None
        }
        Ok(Err(e)) => {
            debug!("{} not runnable: {}", program.display(), e);
            None
        }
        Err(_) => {
            warn!(
                "{} --version timed out after {}s",
                program.display(),
                timeout_secs
            );
            None
        }
    }
}

/// Find the first working pdflatex.
///
/// An explicit path that does not answer `--version` is an error; discovery
/// never substitutes another installation for it.
pub async fn find_pdflatex(
    explicit: Option<&std::path::Path>,
    timeout_secs: u64,
) -> Result<ConverterInfo, ResumePdfError> {
    let list = candidates(explicit);
    for path in &list {
        if let Some(version) = probe_version(path, timeout_secs).await {
            info!("LaTeX installation found at: {}", path.display());
            return Ok(ConverterInfo {
                path: path.clone(),
                version,
            });
        }
    }

    Err(ResumePdfError::ConverterNotFound {
        tried: list
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", "),
    })
}

/// Check that `docker` answers `--version`.
pub async fn find_docker(timeout_secs: u64) -> Result<String, ResumePdfError> {
    probe_version(std::path::Path::new("docker"), timeout_secs)
        .await
        .ok_or_else(|| ResumePdfError::DockerNotFound {
            detail: "`docker --version` did not succeed".into(),
        })
}
