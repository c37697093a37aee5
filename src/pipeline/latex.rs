//! Local pdflatex builds: in place ([`Method::Local`]) or in a scratch
//! directory ([`Method::Staged`]).
//!
//! Both share [`run_passes`]. The Docker method drives [`run_pass`] itself
//! so that each pass gets its own container name.

use crate::config::{ConversionConfig, Method};
use crate::error::ResumePdfError;
use crate::pipeline::input::TexSource;
use crate::pipeline::{cleanup, locate, texlog, write_atomic, MethodOutput};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info};

/// A pdflatex command line, run once per pass.
#[derive(Debug, Clone)]
pub struct PassCommand {
    pub program: OsString,
    pub args: Vec<OsString>,
    pub cwd: PathBuf,
    pub envs: Vec<(OsString, OsString)>,
}

impl PassCommand {
    fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .current_dir(&self.cwd)
            .envs(self.envs.iter().map(|(k, v)| (k, v)))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

/// Run `cmd` `passes` times, stopping at the first failing pass.
pub async fn run_passes(
    cmd: &PassCommand,
    method: Method,
    config: &ConversionConfig,
) -> Result<(), ResumePdfError> {
    for pass in 1..=config.passes {
        run_pass(cmd, method, pass, config).await?;
    }
    Ok(())
}

/// One pass of `cmd` under the compile timeout. The child is killed when the
/// timeout fires.
pub(crate) async fn run_pass(
    cmd: &PassCommand,
    method: Method,
    pass: u32,
    config: &ConversionConfig,
) -> Result<(), ResumePdfError> {
    let passes = config.passes;
    let secs = config.compile_timeout_secs;

    info!("Running pdflatex (pass {pass}/{passes})...");
    if let Some(ref cb) = config.progress_callback {
        cb.on_pass_start(method, pass, passes);
    }
    debug!("{:?} {:?} (cwd {})", cmd.program, cmd.args, cmd.cwd.display());

    let output = tokio::time::timeout(Duration::from_secs(secs), cmd.to_command().output())
        .await
        .map_err(|_| ResumePdfError::CompileTimeout { pass, secs })?
        .map_err(|e| ResumePdfError::Spawn {
            program: cmd.program.to_string_lossy().into_owned(),
            source: e,
        })?;

    if !output.status.success() {
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        debug!("pdflatex stdout:\n{stdout}");
        debug!("pdflatex stderr:\n{stderr}");
        return Err(ResumePdfError::CompileFailed {
            pass,
            passes,
            status: output.status.to_string(),
            excerpt: texlog::failure_excerpt(&stdout, &stderr),
        });
    }
    Ok(())
}

/// pdflatex arguments shared by every method.
pub(crate) fn base_args(output_dir: Option<&str>, file_name: &str) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["-interaction=nonstopmode".into()];
    if let Some(dir) = output_dir {
        args.push(format!("-output-directory={dir}").into());
    }
    args.push(file_name.into());
    args
}

/// Compile next to the source, writing into `source.output_dir`.
pub async fn compile_local(
    source: &TexSource,
    config: &ConversionConfig,
) -> Result<MethodOutput, ResumePdfError> {
    let converter =
        locate::find_pdflatex(config.pdflatex.as_deref(), config.probe_timeout_secs).await?;

    let out_dir = source.output_dir.to_string_lossy();
    let cmd = PassCommand {
        program: converter.path.into_os_string(),
        args: base_args(Some(out_dir.as_ref()), &source.file_name),
        cwd: source.dir.clone(),
        envs: Vec::new(),
    };
    remove_stale_pdf(&source.pdf_path()).await?;
    run_passes(&cmd, Method::Local, config).await?;

    finish_in_place(source, config).await
}

/// Verify the PDF, read the page count from the log, then clean up.
///
/// Shared with the Docker method, which writes to the same place.
pub(crate) async fn finish_in_place(
    source: &TexSource,
    config: &ConversionConfig,
) -> Result<MethodOutput, ResumePdfError> {
    let pdf_path = source.pdf_path();
    let log = read_log(&source.log_path()).await;
    if log.as_deref().is_some_and(texlog::no_pages_written) {
        return Err(ResumePdfError::PdfNotProduced { path: pdf_path });
    }
    let pdf_bytes = pdf_size(&pdf_path).await?;
    let log_page_count = log.as_deref().and_then(texlog::page_count);

    let removed_files = if config.keep_aux {
        Vec::new()
    } else {
        cleanup::remove_aux_files(
            &source.output_dir,
            &source.stem,
            &config.cleanup_extensions,
            config.progress_callback.as_ref(),
        )
        .await
    };

    info!("PDF created successfully: {}", pdf_path.display());
    Ok(MethodOutput {
        pdf_path,
        pdf_bytes,
        passes: config.passes,
        removed_files,
        log_page_count,
    })
}

/// Compile a copy of the source inside a temporary directory and copy the
/// PDF out. The directory, with every byproduct, is dropped afterwards.
pub async fn compile_staged(
    source: &TexSource,
    config: &ConversionConfig,
) -> Result<MethodOutput, ResumePdfError> {
    let converter =
        locate::find_pdflatex(config.pdflatex.as_deref(), config.probe_timeout_secs).await?;

    let scratch = tempfile::Builder::new()
        .prefix("resume-pdf-")
        .tempdir()
        .map_err(|e| ResumePdfError::Internal(format!("tempdir: {e}")))?;
    let staged_tex = scratch.path().join(&source.file_name);
    tokio::fs::copy(&source.path, &staged_tex)
        .await
        .map_err(|e| ResumePdfError::OutputWriteFailed {
            path: staged_tex.clone(),
            source: e,
        })?;
    debug!("Staged {} in {}", source.file_name, scratch.path().display());

    let cmd = PassCommand {
        program: converter.path.into_os_string(),
        args: base_args(None, &source.file_name),
        cwd: scratch.path().to_path_buf(),
        envs: vec![(
            "TEXINPUTS".into(),
            texinputs_with(&source.dir, std::env::var_os("TEXINPUTS")),
        )],
    };
    run_passes(&cmd, Method::Staged, config).await?;

    let built = scratch.path().join(format!("{}.pdf", source.stem));
    pdf_size(&built).await?;
    let log_page_count = read_log(&scratch.path().join(format!("{}.log", source.stem)))
        .await
        .as_deref()
        .and_then(texlog::page_count);

    let bytes = tokio::fs::read(&built)
        .await
        .map_err(|e| ResumePdfError::Internal(format!("read {}: {e}", built.display())))?;
    let pdf_path = source.pdf_path();
    write_atomic(&pdf_path, &bytes).await?;

    info!("PDF created successfully: {}", pdf_path.display());
    Ok(MethodOutput {
        pdf_path,
        pdf_bytes: bytes.len() as u64,
        passes: config.passes,
        removed_files: Vec::new(),
        log_page_count,
    })
}

/// `TEXINPUTS` that searches `dir` first and keeps the default search path
/// (the trailing separator), plus whatever the user already had.
pub(crate) fn texinputs_with(dir: &Path, existing: Option<OsString>) -> OsString {
    let sep = if cfg!(windows) { ";" } else { ":" };
    let mut value = dir.as_os_str().to_os_string();
    value.push(sep);
    if let Some(rest) = existing.filter(|v| !v.is_empty()) {
        value.push(rest);
        if !value.to_string_lossy().ends_with(sep) {
            value.push(sep);
        }
    }
    value
}

async fn pdf_size(path: &Path) -> Result<u64, ResumePdfError> {
    match tokio::fs::metadata(path).await {
        Ok(m) if m.is_file() => Ok(m.len()),
        _ => Err(ResumePdfError::PdfNotProduced {
            path: path.to_path_buf(),
        }),
    }
}

async fn read_log(log: &Path) -> Option<String> {
    let bytes = tokio::fs::read(log).await.ok()?;
    Some(String::from_utf8_lossy(&bytes).into_owned())
}

/// Delete a PDF left over from an earlier build so it cannot pass for the
/// output of this one.
pub(crate) async fn remove_stale_pdf(path: &Path) -> Result<(), ResumePdfError> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {
            debug!("Removed previous {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(ResumePdfError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_args_shape() {
        let args = base_args(Some("/out"), "resume.tex");
        assert_eq!(
            args,
            vec![
                OsString::from("-interaction=nonstopmode"),
                OsString::from("-output-directory=/out"),
                OsString::from("resume.tex"),
            ]
        );
        assert_eq!(base_args(None, "cv.tex").len(), 2);
    }

    #[cfg(unix)]
    #[test]
    fn texinputs_keeps_default_path() {
        let v = texinputs_with(Path::new("/src"), None);
        assert_eq!(v, OsString::from("/src:"));
        let v = texinputs_with(Path::new("/src"), Some("/styles".into()));
        assert_eq!(v, OsString::from("/src:/styles:"));
        let v = texinputs_with(Path::new("/src"), Some("/styles:".into()));
        assert_eq!(v, OsString::from("/src:/styles:"));
    }

    #[tokio::test]
    async fn stale_pdf_is_removed_and_absence_is_fine() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("resume.pdf");
        std::fs::write(&pdf, b"%PDF-old").unwrap();

        remove_stale_pdf(&pdf).await.unwrap();
        assert!(!pdf.exists());
        remove_stale_pdf(&pdf).await.unwrap();
    }

    #[tokio::test]
    async fn missing_pdf_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = pdf_size(&dir.path().join("resume.pdf")).await.unwrap_err();
        assert!(matches!(err, ResumePdfError::PdfNotProduced { .. }));
    }
}
