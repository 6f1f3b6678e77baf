//! Error types for gistchat.

use thiserror::Error;

/// Common error type for gistchat.
#[derive(Error, Debug)]
pub enum ChatError {
    /// Network or backing-store failure on publish, fetch, create or delete.
    ///
    /// Always recoverable: the session reports it inline and keeps going.
    #[error("remote error: {0}")]
    Remote(String),

    /// The local username could not be resolved at startup.
    #[error("could not resolve local identity: {0}")]
    IdentityResolution(String),

    /// The store returned an entry that cannot be turned into a message.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Banner font could not be loaded or the text could not be rendered.
    #[error("banner error: {0}")]
    Banner(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ChatError {
    /// Format the error the way it appears in the chat transcript.
    pub fn transcript_line(&self) -> String {
        format!("system error: {self}")
    }
}

impl From<reqwest::Error> for ChatError {
    fn from(e: reqwest::Error) -> Self {
        ChatError::Remote(e.to_string())
    }
}

/// Result type alias for gistchat operations.
pub type Result<T> = std::result::Result<T, ChatError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_error_display() {
        let err = ChatError::Remote("connection reset".to_string());
        assert_eq!(err.to_string(), "remote error: connection reset");
    }

    #[test]
    fn test_identity_error_display() {
        let err = ChatError::IdentityResolution("no token".to_string());
        assert_eq!(err.to_string(), "could not resolve local identity: no token");
    }

    #[test]
    fn test_transcript_line() {
        let err = ChatError::Remote("503".to_string());
        assert_eq!(err.transcript_line(), "system error: remote error: 503");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "font not found");
        let err: ChatError = io_err.into();
        assert!(matches!(err, ChatError::Io(_)));
        assert!(err.to_string().contains("font not found"));
    }

    #[test]
    fn test_result_alias() {
        fn sample_ok() -> Result<u64> {
            Ok(7)
        }

        fn sample_err() -> Result<u64> {
            Err(ChatError::MalformedResponse("missing id".to_string()))
        }

        assert_eq!(sample_ok().unwrap(), 7);
        assert!(sample_err().is_err());
    }
}
