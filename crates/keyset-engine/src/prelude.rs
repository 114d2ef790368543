//! Convenient re-exports for common use.

pub use keyset_core::prelude::*;

pub use crate::config::PaginationConfig;
pub use crate::filter::{EqualityFilter, FilterBuilder, Principal, filter_fn};
pub use crate::paginator::Paginator;
pub use crate::query::{Predicate, Query};
pub use crate::request::PageRequest;
pub use crate::slice::ResultSlice;
pub use crate::store::{DocumentStore, MemoryStore};
