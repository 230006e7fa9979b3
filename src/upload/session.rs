//! Upload session state machine.
//!
//! One session owns one batch of selected files and drives it through a
//! single multipart submission. The phase carries its own payload, so a
//! succeeded session always has a result and a failed one always has an
//! error.

use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::path::Path;
use tokio::sync::watch;

use crate::common::config::DropConfig;
use crate::common::errors::TransferError;
use crate::common::links;
use crate::upload::progress::ProgressCounter;

/// One selected file, immutable once added to the batch.
#[derive(Debug, Clone)]
pub struct FileDescriptor {
    pub name: String,
    pub size_bytes: u64,
    pub payload: Bytes,
}

impl FileDescriptor {
    /// Reads a local file into a descriptor.
    pub async fn from_path(path: &Path) -> anyhow::Result<Self> {
        use anyhow::Context;
        let payload = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read file: {}", path.display()))?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unnamed")
            .to_string();
        Ok(Self {
            size_bytes: payload.len() as u64,
            payload: Bytes::from(payload),
            name,
        })
    }
}

/// Outcome of a successful upload, read-only once produced.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferResult {
    pub public_url: String,
    pub internal_url: String,
    pub files: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UploadPhase {
    Idle,
    Selected,
    Uploading,
    Succeeded(TransferResult),
    Failed(TransferError),
}

/// Service response for a completed upload. The link field has gone by
/// several names across service versions; they are checked in order.
#[derive(Deserialize)]
struct UploadResponse {
    #[serde(default, rename = "downloadLink")]
    download_link: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    link: Option<String>,
    #[serde(default)]
    files: Option<Vec<UploadedFile>>,
}

#[derive(Deserialize)]
struct UploadedFile {
    name: String,
}

pub struct UploadSession {
    phase: UploadPhase,
    files: Vec<FileDescriptor>,
    progress_tx: watch::Sender<f64>,
    progress_rx: watch::Receiver<f64>,
}

impl Default for UploadSession {
    fn default() -> Self {
        Self::new()
    }
}

impl UploadSession {
    pub fn new() -> Self {
        let (progress_tx, progress_rx) = watch::channel(0.0);
        Self {
            phase: UploadPhase::Idle,
            files: Vec::new(),
            progress_tx,
            progress_rx,
        }
    }

    pub fn phase(&self) -> &UploadPhase {
        &self.phase
    }

    pub fn files(&self) -> &[FileDescriptor] {
        &self.files
    }

    pub fn result(&self) -> Option<&TransferResult> {
        match &self.phase {
            UploadPhase::Succeeded(result) => Some(result),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&TransferError> {
        match &self.phase {
            UploadPhase::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// Latest aggregate progress, 0..=100.
    pub fn progress_percent(&self) -> f64 {
        *self.progress_rx.borrow()
    }

    /// Channel for UI consumers; last write wins.
    pub fn progress_receiver(&self) -> watch::Receiver<f64> {
        self.progress_rx.clone()
    }

    /// Adds descriptors to the batch. Only meaningful before submission.
    pub fn add_files(&mut self, descriptors: impl IntoIterator<Item = FileDescriptor>) {
        if !matches!(self.phase, UploadPhase::Idle | UploadPhase::Selected) {
            tracing::warn!("ignoring add_files outside selection");
            return;
        }
        self.files.extend(descriptors);
        if !self.files.is_empty() {
            self.phase = UploadPhase::Selected;
        }
    }

    /// Removes one descriptor by index. The batch dropping to empty moves
    /// the session back to Idle.
    pub fn remove_file(&mut self, index: usize) -> Option<FileDescriptor> {
        if !matches!(self.phase, UploadPhase::Idle | UploadPhase::Selected) {
            tracing::warn!("ignoring remove_file outside selection");
            return None;
        }
        if index >= self.files.len() {
            return None;
        }
        let removed = self.files.remove(index);
        if self.files.is_empty() {
            self.phase = UploadPhase::Idle;
        }
        Some(removed)
    }

    /// Back to a fresh session: empty batch, no result.
    pub fn clear(&mut self) {
        self.files.clear();
        self.phase = UploadPhase::Idle;
        self.progress_tx.send_replace(0.0);
    }

    /// Submits the batch as one multipart request.
    ///
    /// An empty batch is a validation short-circuit, not an error: the
    /// phase does not change and no request is issued. A session already
    /// uploading ignores the call; retry is always a fresh explicit call,
    /// never automatic.
    pub async fn start_upload(&mut self, client: &reqwest::Client, config: &DropConfig) {
        if self.files.is_empty() {
            tracing::debug!("upload requested with empty batch; nothing to do");
            return;
        }
        if matches!(self.phase, UploadPhase::Uploading) {
            tracing::warn!("upload already in flight; duplicate start ignored");
            return;
        }

        self.phase = UploadPhase::Uploading;
        let total: u64 = self.files.iter().map(|f| f.size_bytes).sum();
        let counter = ProgressCounter::new(total, self.progress_tx.clone());

        let outcome = self.submit(client, config, &counter).await;
        // Success or failure, the bar must not keep a stale value.
        counter.reset();

        match outcome {
            Ok(result) => {
                tracing::info!(url = %result.public_url, "upload succeeded");
                self.files.clear();
                self.phase = UploadPhase::Succeeded(result);
            }
            Err(err) => {
                tracing::warn!(error = %err, "upload failed");
                self.phase = UploadPhase::Failed(err);
            }
        }
    }

    async fn submit(
        &self,
        client: &reqwest::Client,
        config: &DropConfig,
        counter: &ProgressCounter,
    ) -> Result<TransferResult, TransferError> {
        let mut form = Form::new();
        for file in &self.files {
            let body = reqwest::Body::wrap_stream(counter.wrap(file.payload.clone()));
            let part = Part::stream_with_length(body, file.size_bytes).file_name(file.name.clone());
            form = form.part("files", part);
        }

        let endpoint = format!("{}/upload", config.service_base());
        tracing::debug!(%endpoint, files = self.files.len(), "submitting batch");

        let resp = client
            .post(&endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| TransferError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(TransferError::from_upload_status(status.as_u16(), &body));
        }

        let text = resp
            .text()
            .await
            .map_err(|e| TransferError::Network(e.to_string()))?;
        let parsed: UploadResponse =
            serde_json::from_str(&text).map_err(|e| TransferError::BodyParse(e.to_string()))?;

        let internal = [parsed.download_link, parsed.url, parsed.link]
            .into_iter()
            .flatten()
            .find(|s| !s.is_empty())
            .ok_or_else(|| TransferError::BodyParse("no download link in response".to_string()))?;

        let public_url = links::to_public(&internal, config.origin(), config.service_base());
        let files = match parsed.files {
            Some(files) if !files.is_empty() => files.into_iter().map(|f| f.name).collect(),
            _ => self.files.iter().map(|f| f.name.clone()).collect(),
        };

        Ok(TransferResult {
            public_url,
            internal_url: internal,
            files,
        })
    }
}
