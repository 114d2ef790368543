//! Deterministic XChaCha20-Poly1305 encryption of cursor payloads.

use base64::prelude::*;
use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{Key, XChaCha20Poly1305, XNonce};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::error::{CodecError, CodecResult};
use super::key::TokenKey;
use crate::TRACING_TARGET_TOKEN;

/// Size of the XChaCha20-Poly1305 nonce in bytes.
pub const NONCE_SIZE: usize = 24;

/// Size of the Poly1305 authentication tag in bytes.
pub const TAG_SIZE: usize = 16;

/// Minimum size of valid ciphertext (nonce + tag, no plaintext).
pub const MIN_CIPHERTEXT_SIZE: usize = NONCE_SIZE + TAG_SIZE;

/// Maximum accepted encoded token size (4KB).
///
/// Oversized tokens are rejected before any decoding work is done.
pub const MAX_TOKEN_SIZE: usize = 4 * 1024;

type HmacSha256 = Hmac<Sha256>;

/// Encodes plain cursor payloads into opaque, URL-safe tokens and back.
///
/// The codec holds only immutable key material and is cheap to clone,
/// so one instance can be shared by any number of concurrent calls.
#[derive(Debug, Clone)]
pub struct TokenCodec {
    key: TokenKey,
}

impl TokenCodec {
    /// Creates a codec keyed by the given secret.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::SecretTooShort`] if the secret is too short.
    pub fn new(secret: impl AsRef<[u8]>) -> CodecResult<Self> {
        Ok(Self {
            key: TokenKey::derive(secret)?,
        })
    }

    /// Encrypts and encodes a plain payload.
    pub fn encode(&self, plain: &str) -> CodecResult<String> {
        let nonce = self.synthetic_nonce(plain.as_bytes())?;
        let cipher = XChaCha20Poly1305::new(Key::from_slice(self.key.cipher_key()));

        let ciphertext = cipher
            .encrypt(XNonce::from_slice(&nonce), plain.as_bytes())
            .map_err(|_| CodecError::EncryptionFailed)?;

        let mut sealed = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        sealed.extend_from_slice(&nonce);
        sealed.extend_from_slice(&ciphertext);

        Ok(BASE64_URL_SAFE_NO_PAD.encode(sealed))
    }

    /// Decodes and decrypts a token produced by [`TokenCodec::encode`].
    ///
    /// # Errors
    ///
    /// - [`CodecError::TooLarge`] if the token exceeds [`MAX_TOKEN_SIZE`]
    /// - [`CodecError::InvalidEncoding`] if the token is not URL-safe base64
    /// - [`CodecError::Truncated`] if the token is shorter than nonce + tag
    /// - [`CodecError::AuthenticationFailed`] if the token was corrupted,
    ///   tampered with, or produced under a different secret
    /// - [`CodecError::InvalidPayload`] if the plaintext is not UTF-8
    pub fn decode(&self, token: &str) -> CodecResult<String> {
        if token.len() > MAX_TOKEN_SIZE {
            return Err(CodecError::TooLarge {
                max: MAX_TOKEN_SIZE,
            });
        }

        let sealed = BASE64_URL_SAFE_NO_PAD.decode(token).map_err(|error| {
            tracing::debug!(target: TRACING_TARGET_TOKEN, %error, "Token is not valid base64");
            CodecError::InvalidEncoding
        })?;

        if sealed.len() < MIN_CIPHERTEXT_SIZE {
            return Err(CodecError::Truncated);
        }

        let (nonce, ciphertext) = sealed.split_at(NONCE_SIZE);
        let cipher = XChaCha20Poly1305::new(Key::from_slice(self.key.cipher_key()));

        let plain = cipher
            .decrypt(XNonce::from_slice(nonce), ciphertext)
            .map_err(|_| {
                tracing::debug!(target: TRACING_TARGET_TOKEN, "Token authentication failed");
                CodecError::AuthenticationFailed
            })?;

        String::from_utf8(plain).map_err(|_| CodecError::InvalidPayload)
    }

    fn synthetic_nonce(&self, plain: &[u8]) -> CodecResult<[u8; NONCE_SIZE]> {
        let mut mac = <HmacSha256 as Mac>::new_from_slice(self.key.nonce_key())
            .map_err(|_| CodecError::KeyDerivation)?;
        mac.update(plain);
        let digest = mac.finalize().into_bytes();

        let mut nonce = [0u8; NONCE_SIZE];
        nonce.copy_from_slice(&digest[..NONCE_SIZE]);
        Ok(nonce)
    }
}
