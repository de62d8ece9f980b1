use thiserror::Error;

/// Errors produced anywhere in a demo pass.
#[derive(Debug, Error)]
pub enum DemoError {
    /// The simulation rejected a parameter combination.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
    /// A compound form key could not be resolved (strict exploding only).
    #[error("malformed key `{key}`: {reason}")]
    MalformedKey { key: String, reason: &'static str },
    #[error("unknown demo: {0}")]
    UnknownDemo(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("config error: {0}")]
    Config(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl DemoError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed(key: impl Into<String>, reason: &'static str) -> Self {
        Self::MalformedKey {
            key: key.into(),
            reason,
        }
    }

    pub(crate) fn serialization(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

pub type DemoResult<T> = Result<T, DemoError>;
