//! Online builds ([`Method::Online`]): one multipart POST, no retries.
//!
//! The endpoint takes the document as a form part named `document.tex` and
//! answers a successful build with the PDF bytes. Any other status carries
//! the compiler's complaint in the body; the first 200 characters of it are
//! kept for the error message.

use crate::config::ConversionConfig;
use crate::error::ResumePdfError;
use crate::pipeline::input::TexSource;
use crate::pipeline::{write_atomic, MethodOutput};
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use std::time::Duration;
use tracing::{debug, info};

/// Form part and file name the endpoint expects.
pub const PART_NAME: &str = "document.tex";

const BODY_EXCERPT_CHARS: usize = 200;

/// Upload the source and write the returned PDF to `source.pdf_path()`.
pub async fn compile_online(
    source: &TexSource,
    config: &ConversionConfig,
) -> Result<MethodOutput, ResumePdfError> {
    let url = config.api_url.as_str();
    let secs = config.api_timeout_secs;

    let content = tokio::fs::read_to_string(&source.path)
        .await
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::InvalidData => ResumePdfError::SourceNotUtf8 {
                path: source.path.clone(),
            },
            std::io::ErrorKind::PermissionDenied => ResumePdfError::PermissionDenied {
                path: source.path.clone(),
            },
            _ => ResumePdfError::FileNotFound {
                path: source.path.clone(),
            },
        })?;

    info!("Uploading {} ({} bytes) to {}", source.file_name, content.len(), url);

    let part = Part::text(content)
        .file_name(PART_NAME)
        .mime_str("text/x-tex")
        .map_err(|e| ResumePdfError::Internal(format!("multipart: {e}")))?;
    let form = Form::new().part(PART_NAME, part);

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(secs))
        .build()
        .map_err(|e| ResumePdfError::Network {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let response = client
        .post(url)
        .multipart(form)
        .send()
        .await
        .map_err(|e| transport_error(url, secs, e))?;

    let status = response.status();
    debug!("{} answered {}", url, status);

    if !is_build_success(status) {
        let body = response.text().await.unwrap_or_default();
        return Err(ResumePdfError::ApiStatus {
            status: status.as_u16(),
            body_excerpt: body.chars().take(BODY_EXCERPT_CHARS).collect(),
        });
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| transport_error(url, secs, e))?;

    if !bytes.starts_with(b"%PDF") {
        return Err(ResumePdfError::NotAPdf {
            url: url.to_string(),
            magic: bytes.iter().take(8).copied().collect(),
        });
    }

    let pdf_path = source.pdf_path();
    write_atomic(&pdf_path, &bytes).await?;
    info!(
        "PDF generated successfully using online API: {} ({} bytes)",
        pdf_path.display(),
        bytes.len()
    );

    Ok(MethodOutput {
        pdf_path,
        pdf_bytes: bytes.len() as u64,
        passes: 0,
        removed_files: Vec::new(),
        log_page_count: None,
    })
}

/// 200 and 201 both mean "here is your PDF".
pub fn is_build_success(status: StatusCode) -> bool {
    status == StatusCode::OK || status == StatusCode::CREATED
}

fn transport_error(url: &str, secs: u64, e: reqwest::Error) -> ResumePdfError {
    if e.is_timeout() {
        ResumePdfError::ApiTimeout {
            url: url.to_string(),
            secs,
        }
    } else {
        ResumePdfError::Network {
            url: url.to_string(),
            reason: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_200_and_201_count() {
        assert!(is_build_success(StatusCode::OK));
        assert!(is_build_success(StatusCode::CREATED));
        assert!(!is_build_success(StatusCode::ACCEPTED));
        assert!(!is_build_success(StatusCode::BAD_REQUEST));
        assert!(!is_build_success(StatusCode::INTERNAL_SERVER_ERROR));
    }
}
