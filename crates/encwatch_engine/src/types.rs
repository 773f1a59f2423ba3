use std::fmt;
use std::path::PathBuf;

use encwatch_core::StatusMap;

/// Correlates a status fetch with the poll tick that requested it.
pub type Tick = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    StatusFetched {
        tick: Tick,
        result: Result<StatusMap, FetchError>,
    },
    UploadProgress {
        sent: u64,
        total: Option<u64>,
    },
    UploadCompleted {
        result: Result<u16, FetchError>,
    },
    DownloadCompleted {
        name: String,
        result: Result<PathBuf, FetchError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for FetchError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    MalformedJson,
    Io,
    Network,
    /// The worker task panicked before reporting a result.
    WorkerPanicked,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::MalformedJson => write!(f, "malformed status json"),
            FailureKind::Io => write!(f, "io error"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::WorkerPanicked => write!(f, "worker panicked"),
        }
    }
}
