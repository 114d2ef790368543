//! In-memory reference store.

use std::time::Duration;

use keyset_core::BoxedError;
use keyset_core::schema::Schema;
use keyset_core::value::Value;
use thiserror::Error;
use tokio::sync::RwLock;

use super::DocumentStore;
use crate::TRACING_TARGET_STORE;
use crate::query::Query;

/// Errors raised by [`MemoryStore`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The query did not complete within its deadline.
    #[error("query exceeded max time of {0:?}")]
    Timeout(Duration),
}

/// A [`DocumentStore`] over rows held in memory.
///
/// Field values are read through the entity's [`Schema`]; fields the schema
/// does not know evaluate to null.
pub struct MemoryStore<T> {
    schema: Schema<T>,
    rows: RwLock<Vec<T>>,
    latency: Option<Duration>,
}

impl<T> MemoryStore<T> {
    /// Creates an empty store.
    pub fn new(schema: Schema<T>) -> Self {
        Self::with_rows(schema, Vec::new())
    }

    /// Creates a store holding the given rows.
    pub fn with_rows(schema: Schema<T>, rows: Vec<T>) -> Self {
        Self {
            schema,
            rows: RwLock::new(rows),
            latency: None,
        }
    }

    /// Delays every read by the given duration, simulating a slow backend.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Returns the schema used to read field values.
    #[inline]
    pub fn schema(&self) -> &Schema<T> {
        &self.schema
    }

    /// Adds a row.
    pub async fn insert(&self, row: T) {
        self.rows.write().await.push(row);
    }

    /// Adds several rows.
    pub async fn extend(&self, rows: impl IntoIterator<Item = T>) {
        self.rows.write().await.extend(rows);
    }

    /// Returns the number of stored rows.
    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    /// Returns `true` if the store holds no rows.
    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }

    fn lookup(&self, row: &T, field: &str) -> Value {
        self.schema
            .field(field)
            .map_or(Value::Null, |descriptor| descriptor.get(row))
    }
}

impl<T: Clone> MemoryStore<T> {
    async fn scan(&self, query: &Query) -> Vec<T> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let rows = self.rows.read().await;
        let mut matched: Vec<&T> = rows
            .iter()
            .filter(|row| query.matches(&|field: &str| self.lookup(row, field)))
            .collect();

        matched.sort_by(|a, b| {
            query.compare(
                &|field: &str| self.lookup(a, field),
                &|field: &str| self.lookup(b, field),
            )
        });

        matched.into_iter().take(query.limit).cloned().collect()
    }
}

impl<T> DocumentStore<T> for MemoryStore<T>
where
    T: Clone + Send + Sync,
{
    async fn find(&self, query: &Query) -> Result<Vec<T>, BoxedError> {
        let rows = match query.max_time {
            Some(max_time) => tokio::time::timeout(max_time, self.scan(query))
                .await
                .map_err(|_| {
                    tracing::warn!(
                        target: TRACING_TARGET_STORE,
                        max_time_ms = max_time.as_millis() as u64,
                        "Query exceeded its deadline"
                    );
                    StoreError::Timeout(max_time)
                })?,
            None => self.scan(query).await,
        };

        tracing::trace!(target: TRACING_TARGET_STORE, rows = rows.len(), "Scanned rows");
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use keyset_core::value::FieldKind;
    use keyset_core::{Direction, SortKey};

    use super::*;
    use crate::query::Predicate;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: i64,
        age: i64,
    }

    fn store() -> MemoryStore<Row> {
        let schema = Schema::builder()
            .id("id", FieldKind::Int, |r: &Row| Value::Int(r.id))
            .field("age", FieldKind::Int, |r: &Row| Value::Int(r.age))
            .build()
            .unwrap();

        let rows = vec![
            Row { id: 1, age: 30 },
            Row { id: 2, age: 20 },
            Row { id: 3, age: 20 },
            Row { id: 4, age: 40 },
        ];

        MemoryStore::with_rows(schema, rows)
    }

    fn query(position: Option<Predicate>, limit: usize) -> Query {
        Query {
            filter: None,
            position,
            sort: vec![
                SortKey::new("age", Direction::Asc),
                SortKey::new("id", Direction::Asc),
            ],
            limit,
            max_time: None,
        }
    }

    #[tokio::test]
    async fn find_sorts_filters_and_limits() {
        let store = store();

        let rows = store.find(&query(None, 3)).await.unwrap();
        let ids: Vec<_> = rows.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);

        let rows = store
            .find(&query(Some(Predicate::gt("age", 20)), 10))
            .await
            .unwrap();
        let ids: Vec<_> = rows.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 4]);
    }

    #[tokio::test]
    async fn insert_and_len() {
        let store = store();
        assert_eq!(store.len().await, 4);

        store.insert(Row { id: 5, age: 10 }).await;
        store.extend([Row { id: 6, age: 11 }]).await;
        assert_eq!(store.len().await, 6);
        assert!(!store.is_empty().await);

        let rows = store.find(&query(None, 1)).await.unwrap();
        assert_eq!(rows, vec![Row { id: 5, age: 10 }]);
    }

    #[tokio::test(start_paused = true)]
    async fn find_honors_max_time() {
        let store = store().with_latency(Duration::from_secs(5));
        let query = query(None, 10).with_max_time(Duration::from_millis(100));

        let error = store.find(&query).await.unwrap_err();
        let error = error.downcast_ref::<StoreError>().unwrap();
        assert_eq!(*error, StoreError::Timeout(Duration::from_millis(100)));
    }
}
