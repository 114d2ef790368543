//! Token codec error types.

use thiserror::Error;

/// Result type for token codec operations.
pub type CodecResult<T> = std::result::Result<T, CodecError>;

/// Errors that can occur while encoding or decoding a continuation token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// The secret is too short to derive token keys from.
    #[error("token secret must be at least {min} bytes")]
    SecretTooShort {
        /// Minimum accepted secret length.
        min: usize,
    },
    /// The token exceeds the maximum accepted size.
    #[error("token exceeds maximum size of {max} bytes")]
    TooLarge {
        /// Maximum accepted token length.
        max: usize,
    },
    /// The token is not valid URL-safe base64.
    #[error("token is not valid url-safe base64")]
    InvalidEncoding,
    /// The token is too short to contain a nonce and authentication tag.
    #[error("token too short to contain nonce and authentication tag")]
    Truncated,
    /// Decryption failed: the token is corrupted, tampered with, or was
    /// produced under a different secret.
    #[error("token authentication failed")]
    AuthenticationFailed,
    /// The decrypted payload is not valid UTF-8.
    #[error("token payload is not valid utf-8")]
    InvalidPayload,
    /// Encryption failed.
    #[error("token encryption failed")]
    EncryptionFailed,
    /// Key derivation failed.
    #[error("token key derivation failed")]
    KeyDerivation,
}

impl CodecError {
    /// Returns `true` if the error was caused by the token presented by a client.
    pub fn is_invalid_token(&self) -> bool {
        matches!(
            self,
            Self::TooLarge { .. }
                | Self::InvalidEncoding
                | Self::Truncated
                | Self::AuthenticationFailed
                | Self::InvalidPayload
        )
    }
}
