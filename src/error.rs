use thiserror::Error;

/// Errors raised below the HTTP layer: storage, media files, credentials.
#[derive(Debug, Error)]
pub enum Error {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("not found")]
    NotFound,

    /// Input rejected for a single named field; surfaces as a 400 with `field` set.
    #[error("{field}: {message}")]
    Validation { field: String, message: String },

    #[error("invalid credentials")]
    Unauthorized,

    #[error("malformed token")]
    InvalidTokenFormat,

    #[error("token lookup collision")]
    TokenLookupCollision,

    #[error("argon2: {0}")]
    Hash(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
