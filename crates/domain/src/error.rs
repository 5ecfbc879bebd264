/// Shared error type used across all PlanForge crates.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Transport-level failure: connect, reset, DNS, body read.
    #[error("HTTP: {0}")]
    Http(String),

    #[error("timeout: {0}")]
    Timeout(String),

    /// The upstream answered with a non-2xx status.
    #[error("provider {provider}: HTTP {status} - {message}")]
    Upstream {
        provider: String,
        status: u16,
        message: String,
    },

    /// The upstream answered 2xx but the body was not usable.
    #[error("provider {provider}: {message}")]
    Provider { provider: String, message: String },

    #[error("config: {0}")]
    Config(String),

    #[error("auth: {0}")]
    Auth(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// HTTP status attached to this error, if the upstream produced one.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Error::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
