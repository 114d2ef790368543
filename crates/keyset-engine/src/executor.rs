//! Page query execution.

use std::time::Duration;

use crate::query::Query;
use crate::store::DocumentStore;
use crate::{Error, Result, TRACING_TARGET_STORE};

/// Issues page queries against a backing store.
///
/// The executor applies no policy of its own: it stamps its configured
/// deadline on each query, calls the store exactly once, and wraps any store
/// failure into a query execution error. Nothing is retried.
#[derive(Debug, Clone)]
pub struct PageExecutor<S> {
    store: S,
    max_time: Option<Duration>,
}

impl<S> PageExecutor<S> {
    /// Creates an executor without a query deadline.
    pub fn new(store: S) -> Self {
        Self {
            store,
            max_time: None,
        }
    }

    /// Sets the deadline attached to every query issued by this executor.
    pub fn with_max_time(mut self, max_time: Option<Duration>) -> Self {
        self.max_time = max_time;
        self
    }

    /// Returns the per-query deadline.
    #[inline]
    pub fn max_time(&self) -> Option<Duration> {
        self.max_time
    }

    /// Returns the backing store.
    #[inline]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Executes the query and returns at most `query.limit` rows.
    pub async fn execute<T>(&self, mut query: Query) -> Result<Vec<T>>
    where
        S: DocumentStore<T>,
    {
        if let Some(max_time) = self.max_time {
            query.max_time = Some(max_time);
        }

        tracing::trace!(
            target: TRACING_TARGET_STORE,
            limit = query.limit,
            max_time_ms = query.max_time.map(|d| d.as_millis() as u64),
            "Executing page query"
        );

        let mut rows = self.store.find(&query).await.map_err(|source| {
            tracing::error!(
                target: TRACING_TARGET_STORE,
                error = %source,
                "Backing store failed to execute page query"
            );
            Error::query_execution()
                .with_message("backing store failed to execute page query")
                .with_boxed_source(source)
        })?;

        if rows.len() > query.limit {
            tracing::warn!(
                target: TRACING_TARGET_STORE,
                rows = rows.len(),
                limit = query.limit,
                "Backing store ignored the query limit, truncating"
            );
            rows.truncate(query.limit);
        }

        tracing::debug!(target: TRACING_TARGET_STORE, rows = rows.len(), "Executed page query");
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;
    use std::sync::Mutex;

    use keyset_core::{BoxedError, ErrorKind};

    use super::*;

    /// Records the last query and returns a fixed result.
    struct FixedStore {
        rows: Vec<u32>,
        fail: bool,
        seen: Mutex<Option<Query>>,
    }

    impl FixedStore {
        fn new(rows: Vec<u32>) -> Self {
            Self {
                rows,
                fail: false,
                seen: Mutex::new(None),
            }
        }
    }

    impl DocumentStore<u32> for FixedStore {
        async fn find(&self, query: &Query) -> std::result::Result<Vec<u32>, BoxedError> {
            *self.seen.lock().unwrap() = Some(query.clone());
            if self.fail {
                return Err(std::io::Error::other("connection reset").into());
            }
            Ok(self.rows.clone())
        }
    }

    fn query(limit: usize) -> Query {
        Query {
            filter: None,
            position: None,
            sort: Vec::new(),
            limit,
            max_time: None,
        }
    }

    #[tokio::test]
    async fn stamps_deadline_per_query() {
        let executor = PageExecutor::new(FixedStore::new(vec![1, 2]))
            .with_max_time(Some(Duration::from_millis(250)));

        let rows = executor.execute(query(3)).await.unwrap();
        assert_eq!(rows, vec![1, 2]);

        let seen = executor.store().seen.lock().unwrap().clone().unwrap();
        assert_eq!(seen.max_time, Some(Duration::from_millis(250)));
    }

    #[tokio::test]
    async fn truncates_over_limit_results() {
        let executor = PageExecutor::new(FixedStore::new(vec![1, 2, 3, 4, 5]));
        let rows = executor.execute(query(3)).await.unwrap();
        assert_eq!(rows, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn wraps_store_errors() {
        let mut store = FixedStore::new(Vec::new());
        store.fail = true;

        let error = PageExecutor::new(store).execute::<u32>(query(3)).await.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::QueryExecution);
        assert_eq!(error.source().unwrap().to_string(), "connection reset");
    }
}
