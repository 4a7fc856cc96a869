use thiserror::Error;

pub type Result<T> = std::result::Result<T, PublishError>;

#[derive(Debug, Error)]
pub enum PublishError {
    /// Bad or missing arguments, or local input files that do not exist.
    #[error("{0}")]
    Usage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Malformed admin API key: {0}")]
    MalformedCredential(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("HTTP {status}: {body}")]
    Remote { status: u16, body: String },

    /// Rejected update, usually a stale `updated_at`.
    #[error("Update conflict (HTTP {status}): {body}")]
    Conflict { status: u16, body: String },

    #[error("Post not found: {0}")]
    NotFound(String),

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("Token signing failed: {0}")]
    Signing(String),

    #[error("Thumbnail error: {0}")]
    Thumbnail(String),

    #[error("Git error: {0}")]
    Git(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PublishError {
    pub fn usage(msg: impl Into<String>) -> Self {
        PublishError::Usage(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        PublishError::Config(msg.into())
    }

    /// Process exit status for this error. Usage problems follow the clap convention.
    pub fn exit_code(&self) -> i32 {
        match self {
            PublishError::Usage(_) => 2,
            _ => 1,
        }
    }

    /// HTTP status carried by remote failures, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            PublishError::Remote { status, .. } | PublishError::Conflict { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }
}

impl From<reqwest::Error> for PublishError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            PublishError::Transport(format!("request timed out: {err}"))
        } else {
            PublishError::Transport(err.to_string())
        }
    }
}

impl From<config::ConfigError> for PublishError {
    fn from(err: config::ConfigError) -> Self {
        PublishError::Config(err.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for PublishError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        PublishError::Signing(err.to_string())
    }
}

impl From<serde_json::Error> for PublishError {
    fn from(err: serde_json::Error) -> Self {
        PublishError::Decode(err.to_string())
    }
}
