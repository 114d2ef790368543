//! Backing-store capability.
//!
//! The engine is store-agnostic: anything offering range-filtered, sorted and
//! limited reads over entities with a strictly monotonic unique key can back
//! a [`Paginator`]. [`MemoryStore`] is the reference implementation.
//!
//! [`Paginator`]: crate::Paginator

mod memory;

use std::sync::Arc;

use keyset_core::BoxedError;

pub use self::memory::{MemoryStore, StoreError};
use crate::query::Query;

/// A document collection the engine reads pages from.
///
/// Implementations must honor the query's predicate, sort order and limit,
/// and should apply [`Query::max_time`] as a per-query deadline when set.
/// Errors are surfaced to the caller as query execution errors and are
/// never retried.
pub trait DocumentStore<T>: Send + Sync {
    /// Returns at most `query.limit` rows matching the query, in sort order.
    fn find(&self, query: &Query) -> impl Future<Output = Result<Vec<T>, BoxedError>> + Send;
}

impl<T, S> DocumentStore<T> for Arc<S>
where
    S: DocumentStore<T>,
{
    fn find(&self, query: &Query) -> impl Future<Output = Result<Vec<T>, BoxedError>> + Send {
        (**self).find(query)
    }
}
