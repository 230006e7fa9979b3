//! Error taxonomy shared by the upload and download sessions.

use thiserror::Error;

/// Terminal failure of one transfer attempt.
///
/// Every variant carries a message suitable for direct display; none of
/// them is retried internally. Retrying means starting a fresh session.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TransferError {
    #[error("No file ID provided")]
    NoIdentifier,

    /// Non-2xx response. `message` is the server body when it had one,
    /// otherwise a plain `HTTP {status}` line.
    #[error("{message}")]
    HttpStatus { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Unexpected response from server: {0}")]
    BodyParse(String),

    #[error("Could not save file: {0}")]
    Save(String),
}

impl TransferError {
    /// Error for a failed upload response. Prefers the server-provided
    /// body over the bare status line.
    pub fn from_upload_status(status: u16, body: &str) -> Self {
        let trimmed = body.trim();
        let message = if trimmed.is_empty() {
            format!("HTTP {status}")
        } else {
            trimmed.to_string()
        };
        Self::HttpStatus { status, message }
    }

    /// Error for a failed download response, carrying status code and
    /// canonical reason text.
    pub fn from_download_status(status: u16, reason: Option<&str>) -> Self {
        let message = match reason {
            Some(reason) => format!("HTTP {status} {reason}"),
            None => format!("HTTP {status}"),
        };
        Self::HttpStatus { status, message }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_status_prefers_server_body() {
        let err = TransferError::from_upload_status(500, "disk full");
        assert_eq!(err.to_string(), "disk full");
        assert_eq!(err.status_code(), Some(500));
    }

    #[test]
    fn upload_status_falls_back_to_status_line() {
        let err = TransferError::from_upload_status(502, "  \n");
        assert_eq!(err.to_string(), "HTTP 502");
    }

    #[test]
    fn download_status_includes_reason() {
        let err = TransferError::from_download_status(404, Some("Not Found"));
        assert_eq!(err.to_string(), "HTTP 404 Not Found");
    }

    #[test]
    fn missing_identifier_message() {
        assert_eq!(TransferError::NoIdentifier.to_string(), "No file ID provided");
    }
}
