#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

// Tracing target constants for consistent logging.

/// Tracing target for keyset query construction.
///
/// Use this target for logging cursor decoding, predicates and sort orders.
pub const TRACING_TARGET_QUERY: &str = "keyset_engine::query";

/// Tracing target for backing-store reads.
///
/// Use this target for logging query execution, row counts and store failures.
pub const TRACING_TARGET_STORE: &str = "keyset_engine::store";

/// Tracing target for page fetches.
///
/// Use this target for logging the lifecycle of a single page request.
pub const TRACING_TARGET_PAGINATOR: &str = "keyset_engine::paginator";

/// Tracing target for engine configuration.
pub const TRACING_TARGET_CONFIG: &str = "keyset_engine::config";

mod assembler;
mod config;
mod cursor;
mod executor;
mod filter;
mod paginator;
mod request;
mod slice;

pub mod prelude;
pub mod query;
pub mod store;

pub use keyset_core::{Direction, Error, ErrorKind, Fingerprint, Result};

pub use crate::assembler::SliceAssembler;
pub use crate::config::PaginationConfig;
pub use crate::cursor::{CursorState, SortPosition};
pub use crate::executor::PageExecutor;
pub use crate::filter::{EqualityFilter, FilterBuilder, FilterFn, Principal, filter_fn};
pub use crate::paginator::Paginator;
pub use crate::request::{DEFAULT_PAGE_SIZE, PageRequest};
pub use crate::slice::ResultSlice;
