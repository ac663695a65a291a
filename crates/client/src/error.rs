use thiserror::Error;

/// Failure classes the data layer reports to its callers.
///
/// Clonable so one cached failure can be handed to every coalesced reader
/// of the same key.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ClientError {
    #[error("network failure: {message}")]
    Network { message: String },
    #[error("request rejected ({status})")]
    Rejected { status: u16, message: Option<String> },
    #[error("session expired")]
    AuthExpired,
    #[error("server error ({status})")]
    Server { status: u16 },
    #[error("malformed response: {message}")]
    Decode { message: String },
    #[error("config error: {message}")]
    Config { message: String },
    #[error("invariant violated: {message}")]
    Invariant { message: String },
}

impl ClientError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    pub fn rejected(status: u16, message: Option<String>) -> Self {
        Self::Rejected { status, message }
    }

    pub fn server(status: u16) -> Self {
        Self::Server { status }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn invariant(message: impl Into<String>) -> Self {
        Self::Invariant {
            message: message.into(),
        }
    }

    /// Structured message supplied by the backend payload, if any.
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            Self::Rejected { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } | Self::Server { status } => Some(*status),
            Self::AuthExpired => Some(401),
            _ => None,
        }
    }

    pub fn is_conflict(&self) -> bool {
        self.status() == Some(409)
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
