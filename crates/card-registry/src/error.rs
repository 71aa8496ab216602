//! Error types for the card registry.
//!
//! All errors are strongly typed and propagated without panicking.
//! Private key material is never included in error messages.

/// Card error types covering all operations.
#[derive(Debug, thiserror::Error)]
pub enum CardError {
    #[error("Invalid format: {0}")]
    Format(String),

    #[error("Crypto operation failed: {0}")]
    Crypto(String),

    #[error("Card service error {code}: {message}")]
    Client { code: i64, message: String },

    #[error("Card verification failed: {0}")]
    Verification(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Access token error: {0}")]
    Token(String),

    #[error("Transport error: {0}")]
    Transport(String),
}

impl From<serde_json::Error> for CardError {
    fn from(e: serde_json::Error) -> Self {
        Self::Format(e.to_string())
    }
}

impl From<base64::DecodeError> for CardError {
    fn from(e: base64::DecodeError) -> Self {
        Self::Format(format!("invalid base64: {e}"))
    }
}

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, CardError>;
