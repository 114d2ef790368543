//! Token key material derived from a caller-supplied secret.

use std::fmt;

use hkdf::Hkdf;
use sha2::Sha256;

use super::error::{CodecError, CodecResult};

/// Minimum accepted secret length in bytes.
pub const MIN_SECRET_SIZE: usize = 16;

/// Size of each derived subkey in bytes.
const SUBKEY_SIZE: usize = 32;

const HKDF_SALT: &[u8] = b"keyset-continuation-token";
const CIPHER_INFO: &[u8] = b"cipher-key";
const NONCE_INFO: &[u8] = b"nonce-key";

/// A pair of 256-bit subkeys derived with HKDF-SHA256.
///
/// The cipher key encrypts payloads; the nonce key derives the synthetic
/// nonce. Keeping them separate means the nonce never leaks anything about
/// the encryption key.
#[derive(Clone)]
pub struct TokenKey {
    cipher: [u8; SUBKEY_SIZE],
    nonce: [u8; SUBKEY_SIZE],
}

impl TokenKey {
    /// Derives token keys from a secret.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::SecretTooShort`] if the secret is shorter than
    /// [`MIN_SECRET_SIZE`] bytes.
    pub fn derive(secret: impl AsRef<[u8]>) -> CodecResult<Self> {
        let secret = secret.as_ref();
        if secret.len() < MIN_SECRET_SIZE {
            return Err(CodecError::SecretTooShort {
                min: MIN_SECRET_SIZE,
            });
        }

        let hkdf = Hkdf::<Sha256>::new(Some(HKDF_SALT), secret);

        let mut cipher = [0u8; SUBKEY_SIZE];
        hkdf.expand(CIPHER_INFO, &mut cipher)
            .map_err(|_| CodecError::KeyDerivation)?;

        let mut nonce = [0u8; SUBKEY_SIZE];
        hkdf.expand(NONCE_INFO, &mut nonce)
            .map_err(|_| CodecError::KeyDerivation)?;

        Ok(Self { cipher, nonce })
    }

    pub(super) fn cipher_key(&self) -> &[u8; SUBKEY_SIZE] {
        &self.cipher
    }

    pub(super) fn nonce_key(&self) -> &[u8; SUBKEY_SIZE] {
        &self.nonce
    }
}

impl fmt::Debug for TokenKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenKey").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_short_secret() {
        let result = TokenKey::derive("short");
        assert_eq!(
            result.unwrap_err(),
            CodecError::SecretTooShort {
                min: MIN_SECRET_SIZE
            }
        );
    }

    #[test]
    fn derivation_is_deterministic() {
        let a = TokenKey::derive("0123456789abcdef").unwrap();
        let b = TokenKey::derive("0123456789abcdef").unwrap();
        assert_eq!(a.cipher_key(), b.cipher_key());
        assert_eq!(a.nonce_key(), b.nonce_key());
        assert_ne!(a.cipher_key(), a.nonce_key());
    }

    #[test]
    fn debug_does_not_leak_key_material() {
        let key = TokenKey::derive("0123456789abcdef").unwrap();
        assert_eq!(format!("{key:?}"), "TokenKey { .. }");
    }
}
