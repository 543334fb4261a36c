use std::time::Duration;

use storeload_core::{TransportError, TransportErrorKind};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("failed to encode purchase body: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("http request build failed: {0}")]
    RequestBuild(#[from] http::Error),

    #[error("http request failed: {0}")]
    Request(#[from] hyper_util::client::legacy::Error),

    #[error("http request timed out after {0:?}")]
    Timeout(Duration),

    #[error("failed to read response body: {0}")]
    BodyRead(#[from] hyper::Error),
}

impl Error {
    #[must_use]
    pub fn transport_error_kind(&self) -> TransportErrorKind {
        match self {
            Self::InvalidUrl(_) => TransportErrorKind::InvalidTarget,
            Self::Encode(_) | Self::RequestBuild(_) => TransportErrorKind::Encode,
            Self::Request(err) if err.is_connect() => TransportErrorKind::Connect,
            Self::Request(_) | Self::BodyRead(_) => TransportErrorKind::Protocol,
            Self::Timeout(_) => TransportErrorKind::Timeout,
        }
    }
}

impl From<Error> for TransportError {
    fn from(err: Error) -> Self {
        TransportError::new(err.transport_error_kind(), err.to_string())
    }
}
