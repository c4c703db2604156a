use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Failed to build HTTP client")]
    ClientBuild(#[source] reqwest::Error),

    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus {
        url: String,
        status: StatusCode,
    },

    #[error("Failed to decode archive response from {0}")]
    Decode(String, #[source] reqwest::Error),

    #[error("Archive returned {found} series for a request of {expected} uuids")]
    SeriesCountMismatch { expected: usize, found: usize },

    #[error("Download failed for uuid '{uuid}' even when requested on its own")]
    BatchFailed {
        uuid: String,
        #[source]
        source: Box<ArchiveError>,
    },

    #[error("Archive rejected the request: {0}")]
    Rejected(String),
}

impl ArchiveError {
    /// Whether a smaller request could succeed where this one failed.
    ///
    /// Server errors, oversized payloads, truncated bodies and explicit rejections
    /// qualify. Auth failures, client errors and unreachable hosts do not.
    pub fn may_be_batch_size(&self) -> bool {
        match self {
            ArchiveError::HttpStatus { status, .. } => {
                status.is_server_error() || *status == StatusCode::PAYLOAD_TOO_LARGE
            }
            ArchiveError::NetworkRequest(_, e) => e.is_timeout() && !e.is_connect(),
            ArchiveError::Decode(..) | ArchiveError::Rejected(_) => true,
            ArchiveError::ClientBuild(_)
            | ArchiveError::SeriesCountMismatch { .. }
            | ArchiveError::BatchFailed { .. } => false,
        }
    }
}
