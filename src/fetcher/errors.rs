use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("unsupported scheme for http fetch: {0}")]
    UnsupportedScheme(String),

    #[error("http client setup failed: {0}")]
    Client(String),

    #[error("dns failure: {0}")]
    Dns(String),

    #[error("connect timeout")]
    ConnectTimeout,

    #[error("request timeout")]
    RequestTimeout,

    #[error("too many redirects")]
    RedirectLoop,

    #[error("http error {status}")]
    Http { status: reqwest::StatusCode },

    #[error("body too large ({0} bytes)")]
    BodyTooLarge(u64),

    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("unknown: {0}")]
    Unknown(String),
}

impl FetchError {
    pub fn from_reqwest_error(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            if err.is_connect() {
                Self::ConnectTimeout
            } else {
                Self::RequestTimeout
            }
        } else if err.is_redirect() {
            Self::RedirectLoop
        } else if let Some(status) = err.status() {
            Self::Http { status }
        } else if err.is_connect() || err.is_request() {
            // DNS, connection errors
            Self::Dns(err.to_string())
        } else {
            Self::Unknown(err.to_string())
        }
    }

    fn io_kind(&self) -> io::ErrorKind {
        match self {
            Self::UnsupportedScheme(_) => io::ErrorKind::InvalidInput,
            Self::ConnectTimeout | Self::RequestTimeout => io::ErrorKind::TimedOut,
            Self::Http { status } if status.as_u16() == 404 => io::ErrorKind::NotFound,
            Self::BodyTooLarge(_) => io::ErrorKind::InvalidData,
            Self::Io(err) => err.kind(),
            _ => io::ErrorKind::Other,
        }
    }
}

/// Byte sources speak `io::Error`; the fetch error rides along as its source.
impl From<FetchError> for io::Error {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Io(inner) => inner,
            other => io::Error::new(other.io_kind(), other),
        }
    }
}
