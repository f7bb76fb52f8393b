use std::fmt;

use salon_core::{Generation, PageResponse, Record};

/// Progress of a full-collection fetch after one page arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageProgress {
    pub page: u32,
    /// Items in the page just received.
    pub received: usize,
    /// Items accumulated so far.
    pub loaded: usize,
    /// Total observed on the first page.
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    Progress {
        generation: Generation,
        progress: PageProgress,
    },
    PageFetched {
        generation: Generation,
        result: Result<PageResponse<Record>, FetchError>,
    },
    CollectionFetched {
        generation: Generation,
        result: Result<Vec<Record>, FetchError>,
    },
    /// The fetch was cancelled before it finished; no result follows.
    Cancelled { generation: Generation },
}

impl EngineEvent {
    pub fn generation(&self) -> Generation {
        match self {
            EngineEvent::Progress { generation, .. }
            | EngineEvent::PageFetched { generation, .. }
            | EngineEvent::CollectionFetched { generation, .. }
            | EngineEvent::Cancelled { generation } => *generation,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
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

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    /// HTTP 401.
    Unauthorized,
    /// HTTP 403.
    Forbidden,
    HttpStatus(u16),
    Timeout,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    /// The body was not a `{ items, total }` page.
    Decode,
    Cancelled,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::Unauthorized => write!(f, "unauthorized"),
            FailureKind::Forbidden => write!(f, "forbidden"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::Decode => write!(f, "malformed page body"),
            FailureKind::Cancelled => write!(f, "cancelled"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}
