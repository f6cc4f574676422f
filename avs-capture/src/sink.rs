//! Submission sink interface and implementations
//!
//! The core hands a completed bundle to a sink exactly once per session and
//! is agnostic to where it lands. A failed hand-off has no implicit retry;
//! the session stays ready so the operator can retry explicitly.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;

use crate::bundle::{BundleImage, SubmissionBundle};
use crate::error::{Error, Result};

const USER_AGENT: &str = concat!("avs-capture/", env!("CARGO_PKG_VERSION"));
const HTTP_TIMEOUT: Duration = Duration::from_secs(60);

/// External consumer that durably stores or forwards a completed bundle
#[async_trait]
pub trait SubmissionSink: Send + Sync {
    async fn submit(&self, bundle: &SubmissionBundle) -> Result<()>;
}

fn image_file_name(image: &BundleImage) -> String {
    let slug: String = image
        .label
        .to_ascii_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("{:02}_{}.{}", image.step, slug, image.format.extension())
}

/// Sink that writes bundle images and a JSON manifest under a directory,
/// one subdirectory per bundle
pub struct LocalSink {
    root: PathBuf,
}

impl LocalSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl SubmissionSink for LocalSink {
    async fn submit(&self, bundle: &SubmissionBundle) -> Result<()> {
        let dir = self.root.join(bundle.bundle_id.to_string());
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| Error::Sink(format!("cannot create {}: {}", dir.display(), e)))?;

        for image in &bundle.images {
            let path = dir.join(image_file_name(image));
            tokio::fs::write(&path, &image.bytes)
                .await
                .map_err(|e| Error::Sink(format!("cannot write {}: {}", path.display(), e)))?;
        }

        let manifest = serde_json::to_vec_pretty(bundle)
            .map_err(|e| Error::Sink(format!("manifest serialization failed: {}", e)))?;
        tokio::fs::write(dir.join("manifest.json"), manifest)
            .await
            .map_err(|e| Error::Sink(format!("cannot write manifest: {}", e)))?;

        tracing::info!(
            dir = %dir.display(),
            images = bundle.images.len(),
            "Bundle stored locally"
        );
        Ok(())
    }
}

/// Sink that uploads the bundle to the remote verification API as multipart
/// form data (`token` plus `file0..fileN`, POST `{base}/scan`)
pub struct HttpSink {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl HttpSink {
    pub fn new(base_url: String, token: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::Sink(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            token,
        })
    }
}

#[async_trait]
impl SubmissionSink for HttpSink {
    async fn submit(&self, bundle: &SubmissionBundle) -> Result<()> {
        let mut form = reqwest::multipart::Form::new().text("token", self.token.clone());

        for (idx, image) in bundle.images.iter().enumerate() {
            let part = reqwest::multipart::Part::bytes(image.bytes.clone())
                .file_name(image_file_name(image))
                .mime_str(image.format.mime())
                .map_err(|e| Error::Sink(format!("invalid MIME type: {}", e)))?;
            form = form.part(format!("file{}", idx), part);
        }

        let url = format!("{}/scan", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| Error::Sink(format!("upload failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Sink(format!(
                "scan endpoint returned {}: {}",
                status, body
            )));
        }

        tracing::info!(
            bundle_id = %bundle.bundle_id,
            images = bundle.images.len(),
            "Bundle uploaded"
        );
        Ok(())
    }
}
