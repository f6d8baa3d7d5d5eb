use halifax_core::{DomainError, ErrorKind};
use http::StatusCode;

/// Boxed error returned by a [`Transport`](crate::Transport) implementation.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Client-specific result type
pub type Result<T> = std::result::Result<T, ClientError>;

/// The exchange never produced an HTTP response.
#[derive(Debug, thiserror::Error)]
#[error("transport failure: {source}")]
pub struct TransportError {
    #[source]
    source: BoxError,
}

impl TransportError {
    pub fn new(source: impl Into<BoxError>) -> Self {
        Self {
            source: source.into(),
        }
    }
}

/// Errors from a Halifax client call.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Business error reported by the server (400, 401 or 404 with a message)
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Body did not match the envelope, or an error envelope had no message
    #[error("Error reading the response of the {client}")]
    ResponseUnreadable { client: String, url: String },

    /// Non-2xx status outside the recognized set
    #[error("Unsuccessful request. {client}. HTTP {status}")]
    Unsuccessful {
        client: String,
        url: String,
        status: StatusCode,
    },

    /// Request never got a response
    #[error("Request failed. {client}. {url}")]
    Transport {
        client: String,
        url: String,
        #[source]
        source: TransportError,
    },

    /// Request body could not be serialized to JSON
    #[error("failed to serialize request body: {0}")]
    RequestBody(#[source] serde_json::Error),

    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] http::header::InvalidHeaderValue),
}

impl ClientError {
    /// Business kind, if the server reported one.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Domain(err) => Some(err.kind()),
            _ => None,
        }
    }

    /// HTTP status the failure was derived from, when there was a response.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Domain(err) => Some(err.status()),
            Self::Unsuccessful { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Unrecognized status or no response at all.
    pub fn is_unclassified(&self) -> bool {
        matches!(self, Self::Unsuccessful { .. } | Self::Transport { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Domain(DomainError::NotFound(_)))
    }
}
