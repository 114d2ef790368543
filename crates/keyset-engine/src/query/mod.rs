//! Store-independent page queries.
//!
//! A [`Query`] is what the engine hands to a [`DocumentStore`]: the caller's
//! filter predicate, the positional predicate derived from the cursor, a
//! deterministic multi-key sort order and a limit that includes one
//! look-ahead row.
//!
//! [`DocumentStore`]: crate::store::DocumentStore

mod builder;
mod predicate;

use std::cmp::Ordering;
use std::fmt;
use std::time::Duration;

pub use keyset_core::SortKey;
use keyset_core::value::Value;

pub use self::builder::KeysetQueryBuilder;
pub use self::predicate::{Operator, Predicate};

/// A filtered, sorted and limited read against a backing store.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    /// Caller-defined filter predicate.
    pub filter: Option<Predicate>,
    /// Positional predicate derived from the continuation cursor.
    pub position: Option<Predicate>,
    /// Sort order, the unique id always last.
    pub sort: Vec<SortKey>,
    /// Maximum number of rows to return.
    pub limit: usize,
    /// Execution deadline for this query.
    pub max_time: Option<Duration>,
}

impl Query {
    /// Returns the conjunction of the filter and positional predicates.
    pub fn predicate(&self) -> Option<Predicate> {
        Predicate::conjoin(self.filter.clone(), self.position.clone())
    }

    /// Returns `true` if an entity satisfies both the filter and the position.
    pub fn matches<F>(&self, lookup: &F) -> bool
    where
        F: Fn(&str) -> Value,
    {
        self.filter.as_ref().is_none_or(|p| p.evaluate(lookup))
            && self.position.as_ref().is_none_or(|p| p.evaluate(lookup))
    }

    /// Compares two entities by this query's sort order.
    ///
    /// Nulls order before every other value, and values of different kinds
    /// compare as equal.
    pub fn compare<L, R>(&self, lhs: &L, rhs: &R) -> Ordering
    where
        L: Fn(&str) -> Value,
        R: Fn(&str) -> Value,
    {
        for key in &self.sort {
            let a = lhs(&key.field);
            let b = rhs(&key.field);

            let ordering = match (a.is_null(), b.is_null()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Less,
                (false, true) => Ordering::Greater,
                (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
            };

            let ordering = if key.direction.is_ascending() {
                ordering
            } else {
                ordering.reverse()
            };

            if ordering != Ordering::Equal {
                return ordering;
            }
        }

        Ordering::Equal
    }

    /// Sets the execution deadline.
    pub fn with_max_time(mut self, max_time: Duration) -> Self {
        self.max_time = Some(max_time);
        self
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("WHERE ")?;
        match self.predicate() {
            Some(predicate) => write!(f, "{predicate}")?,
            None => f.write_str("TRUE")?,
        }

        f.write_str(" ORDER BY ")?;
        for (i, key) in self.sort.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{key}")?;
        }

        write!(f, " LIMIT {}", self.limit)
    }
}
