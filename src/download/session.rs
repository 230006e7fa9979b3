//! Download session state machine.
//!
//! A session is created once per link activation: the identifier is
//! resolved from the path up front and stays fixed for the session's
//! lifetime. Retrying never resumes; it builds a fresh session from the
//! same path.

use reqwest::header::{ACCEPT, CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE};
use std::path::PathBuf;

use crate::common::config::DropConfig;
use crate::common::errors::TransferError;
use crate::common::links;
use crate::download::headers;
use crate::download::save::SaveSink;

/// Metadata of a successfully fetched and saved file.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievedFile {
    pub filename: String,
    pub size_bytes: u64,
    pub mime_type: String,
    pub saved_to: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DownloadPhase {
    /// Constructed without a source path; nothing to do yet.
    Idle,
    /// Identifier resolved, fetch not started.
    Resolving,
    Fetching,
    Succeeded(RetrievedFile),
    Failed(TransferError),
}

pub struct DownloadSession {
    source_path: String,
    transfer_id: Option<String>,
    phase: DownloadPhase,
}

impl DownloadSession {
    /// Resolves the transfer identifier from a `/download/{id}` path.
    ///
    /// A path without a usable identifier (including the bare
    /// `/download/` form) fails the session immediately; `start` will
    /// then refuse to touch the network.
    pub fn from_path(path: &str) -> Self {
        let transfer_id = links::extract_id(path).map(str::to_string);
        let phase = match &transfer_id {
            Some(id) => {
                tracing::debug!(%id, "resolved transfer identifier");
                DownloadPhase::Resolving
            }
            None => DownloadPhase::Failed(TransferError::NoIdentifier),
        };
        Self {
            source_path: path.to_string(),
            transfer_id,
            phase,
        }
    }

    pub fn phase(&self) -> &DownloadPhase {
        &self.phase
    }

    pub fn transfer_id(&self) -> Option<&str> {
        self.transfer_id.as_deref()
    }

    pub fn file_info(&self) -> Option<&RetrievedFile> {
        match &self.phase {
            DownloadPhase::Succeeded(file) => Some(file),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&TransferError> {
        match &self.phase {
            DownloadPhase::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// Abandons this attempt and re-runs identifier resolution from the
    /// original path. Never a resumption of partial progress.
    pub fn retry(&self) -> Self {
        Self::from_path(&self.source_path)
    }

    /// Fetches the file and hands it to `sink` exactly once on success.
    ///
    /// Runs only from the Resolving phase; a session that already failed
    /// resolution (or already ran) ignores the call.
    pub async fn start(
        &mut self,
        client: &reqwest::Client,
        config: &DropConfig,
        sink: &dyn SaveSink,
    ) {
        let Some(id) = self.transfer_id.clone() else {
            self.phase = DownloadPhase::Failed(TransferError::NoIdentifier);
            return;
        };
        if !matches!(self.phase, DownloadPhase::Resolving) {
            tracing::warn!("download already started; duplicate start ignored");
            return;
        }

        self.phase = DownloadPhase::Fetching;
        match self.fetch(client, config, sink, &id).await {
            Ok(file) => {
                tracing::info!(filename = %file.filename, "download succeeded");
                self.phase = DownloadPhase::Succeeded(file);
            }
            Err(err) => {
                tracing::warn!(error = %err, "download failed");
                self.phase = DownloadPhase::Failed(err);
            }
        }
    }

    async fn fetch(
        &self,
        client: &reqwest::Client,
        config: &DropConfig,
        sink: &dyn SaveSink,
        id: &str,
    ) -> Result<RetrievedFile, TransferError> {
        let url = format!("{}/download/{}", config.service_base(), id);
        tracing::debug!(%url, "fetching");

        let resp = client
            .get(&url)
            .header(ACCEPT, "*/*")
            .send()
            .await
            .map_err(|e| TransferError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(TransferError::from_download_status(
                status.as_u16(),
                status.canonical_reason(),
            ));
        }

        let header_str = |name| resp.headers().get(name).and_then(|v| v.to_str().ok());
        let filename = headers::filename_from_disposition(header_str(CONTENT_DISPOSITION));
        let mime_type = header_str(CONTENT_TYPE)
            .unwrap_or(headers::DEFAULT_MIME)
            .to_string();
        let declared = headers::declared_length(header_str(CONTENT_LENGTH));

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| TransferError::Network(e.to_string()))?;
        let size_bytes = declared.unwrap_or(bytes.len() as u64);

        let saved_to = sink
            .save(&filename, &bytes)
            .await
            .map_err(|e| TransferError::Save(e.to_string()))?;

        Ok(RetrievedFile {
            filename,
            size_bytes,
            mime_type,
            saved_to,
        })
    }
}
