#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for continuation-token encoding and decoding.
///
/// Use this target for logging token codec failures. Plain cursor payloads
/// may only be logged at `trace` level.
pub const TRACING_TARGET_TOKEN: &str = "keyset_core::token";

/// Tracing target for search filter canonicalization.
pub const TRACING_TARGET_FILTER: &str = "keyset_core::filter";

/// Tracing target for field registry construction and lookups.
pub const TRACING_TARGET_SCHEMA: &str = "keyset_core::schema";

mod error;
mod fingerprint;
mod filter;
mod sort;

pub mod prelude;
pub mod schema;
pub mod token;
pub mod value;

pub use error::{BoxedError, Error, ErrorKind, Result};
pub use filter::{FieldFilter, SearchFilter, canonical_json};
pub use fingerprint::Fingerprint;
pub use sort::{Direction, SortKey};
