//! Containerised builds ([`Method::Docker`]).
//!
//! The source directory is mounted at `/workspace` and the output directory
//! at `/out`. Byproducts land in `/out` and are cleaned up like a local build.

use crate::config::{ConversionConfig, Method};
use crate::error::ResumePdfError;
use crate::pipeline::input::TexSource;
use crate::pipeline::latex::{base_args, finish_in_place, remove_stale_pdf, run_pass, PassCommand};
use crate::pipeline::{locate, MethodOutput};
use std::ffi::{OsStr, OsString};
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info, warn};

const WORKSPACE: &str = "/workspace";
const OUT: &str = "/out";

/// Docker builds started by this process, for unique container names.
static BUILDS: AtomicU64 = AtomicU64::new(0);

/// Container name for one pass of one build.
pub fn container_name(build: u64, pass: u32) -> String {
    format!("resume-pdf-{}-{build}-{pass}", std::process::id())
}

/// `docker run` arguments for one pass.
pub fn docker_args(source: &TexSource, image: &str, name: &str) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["run".into(), "--rm".into(), "--name".into(), name.into()];

    let mut src_mount = source.dir.as_os_str().to_os_string();
    src_mount.push(format!(":{WORKSPACE}"));
    let mut out_mount = source.output_dir.as_os_str().to_os_string();
    out_mount.push(format!(":{OUT}"));

    args.extend([
        "-v".into(),
        src_mount,
        "-v".into(),
        out_mount,
        "-w".into(),
        WORKSPACE.into(),
        image.into(),
        "pdflatex".into(),
    ]);
    args.extend(base_args(Some(OUT), &source.file_name));
    args
}

/// Compile inside `config.docker_image`.
pub async fn compile_docker(
    source: &TexSource,
    config: &ConversionConfig,
) -> Result<MethodOutput, ResumePdfError> {
    let version = locate::find_docker(config.probe_timeout_secs).await?;
    info!("Using {version} with image {}", config.docker_image);

    remove_stale_pdf(&source.pdf_path()).await?;
    run_container_passes(OsStr::new("docker"), source, config).await?;

    finish_in_place(source, config).await
}

/// Run every pass in its own named container.
///
/// Killing the `docker` client on timeout leaves the container running in
/// the daemon, so a timed-out container is removed explicitly.
async fn run_container_passes(
    program: &OsStr,
    source: &TexSource,
    config: &ConversionConfig,
) -> Result<(), ResumePdfError> {
    let build = BUILDS.fetch_add(1, Ordering::Relaxed);

    for pass in 1..=config.passes {
        let name = container_name(build, pass);
        let cmd = PassCommand {
            program: program.to_os_string(),
            args: docker_args(source, &config.docker_image, &name),
            cwd: source.dir.clone(),
            envs: Vec::new(),
        };
        match run_pass(&cmd, Method::Docker, pass, config).await {
            Err(e @ ResumePdfError::CompileTimeout { .. }) => {
                remove_container(program, &name, config.probe_timeout_secs).await;
                return Err(e);
            }
            result => result?,
        }
    }
    Ok(())
}

async fn remove_container(program: &OsStr, name: &str, timeout_secs: u64) {
    warn!("Removing container {name} after timeout");
    let rm = Command::new(program)
        .args(["rm", "-f", name])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .status();

    match tokio::time::timeout(Duration::from_secs(timeout_secs), rm).await {
        Ok(Ok(status)) if status.success() => debug!("Removed container {name}"),
        Ok(Ok(status)) => warn!("docker rm -f {name} exited with {status}"),
        Ok(Err(e)) => warn!("docker rm -f {name} failed: {e}"),
        Err(_) => warn!("docker rm -f {name} timed out after {timeout_secs}s"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[cfg(unix)]
    #[test]
    fn mounts_source_and_output() {
        let source = TexSource {
            path: PathBuf::from("/home/u/cv/resume.tex"),
            dir: PathBuf::from("/home/u/cv"),
            file_name: "resume.tex".into(),
            stem: "resume".into(),
            output_dir: PathBuf::from("/home/u/cv/out"),
        };
        let args: Vec<String> = docker_args(&source, "texlive/texlive:latest", "resume-pdf-7-0-1")
            .into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();

        assert_eq!(
            args,
            [
                "run",
                "--rm",
                "--name",
                "resume-pdf-7-0-1",
                "-v",
                "/home/u/cv:/workspace",
                "-v",
                "/home/u/cv/out:/out",
                "-w",
                "/workspace",
                "texlive/texlive:latest",
                "pdflatex",
                "-interaction=nonstopmode",
                "-output-directory=/out",
                "resume.tex",
            ]
        );
    }

    #[test]
    fn container_names_differ_per_pass_and_build() {
        assert_ne!(container_name(0, 1), container_name(0, 2));
        assert_ne!(container_name(0, 1), container_name(1, 1));
        assert!(container_name(3, 2).starts_with("resume-pdf-"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn timed_out_container_is_removed() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let calls = dir.path().join("calls");
        let fake_docker = dir.path().join("fake-docker");
        std::fs::write(
            &fake_docker,
            format!(
                "#!/bin/sh\nif [ \"$1\" = \"rm\" ]; then echo \"$@\" >> \"{}\"; exit 0; fi\nexec sleep 30\n",
                calls.display()
            ),
        )
        .unwrap();
        std::fs::set_permissions(&fake_docker, std::fs::Permissions::from_mode(0o755)).unwrap();

        let source = TexSource {
            path: dir.path().join("resume.tex"),
            dir: dir.path().to_path_buf(),
            file_name: "resume.tex".into(),
            stem: "resume".into(),
            output_dir: dir.path().to_path_buf(),
        };
        let config = ConversionConfig {
            compile_timeout_secs: 1,
            probe_timeout_secs: 5,
            ..ConversionConfig::default()
        };

        let err = run_container_passes(fake_docker.as_os_str(), &source, &config)
            .await
            .unwrap_err();
        assert!(
            matches!(err, ResumePdfError::CompileTimeout { pass: 1, secs: 1 }),
            "{err:?}"
        );

        let removed = std::fs::read_to_string(&calls).unwrap();
        let line = removed.trim();
        assert!(line.starts_with("rm -f resume-pdf-"), "{line}");
        assert!(line.ends_with("-1"), "{line}");
    }
}
