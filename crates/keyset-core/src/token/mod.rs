//! Opaque continuation-token codec.
//!
//! Continuation tokens carry a plain cursor payload encrypted with
//! XChaCha20-Poly1305 under a key derived from a caller-supplied secret, so
//! clients cannot read or hand-craft cursor positions.
//!
//! # Wire Format
//!
//! `base64url_nopad(nonce (24 bytes) || ciphertext || tag (16 bytes))`
//!
//! The nonce is synthetic: it is an HMAC of the plaintext under a dedicated
//! subkey. Encoding is therefore deterministic, so the same payload and secret
//! always yield the same token on any process instance.
//!
//! # Example
//!
//! ```rust
//! use keyset_core::token::TokenCodec;
//!
//! let codec = TokenCodec::new("a sufficiently long secret")?;
//! let token = codec.encode("3f2a_42")?;
//! assert_eq!(codec.decode(&token)?, "3f2a_42");
//! # Ok::<(), keyset_core::token::CodecError>(())
//! ```

mod cipher;
mod error;
mod key;

pub use cipher::{MAX_TOKEN_SIZE, MIN_CIPHERTEXT_SIZE, NONCE_SIZE, TAG_SIZE, TokenCodec};
pub use error::{CodecError, CodecResult};
pub use key::{MIN_SECRET_SIZE, TokenKey};
