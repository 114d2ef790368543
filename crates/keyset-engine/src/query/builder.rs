//! Keyset query construction.

use keyset_core::{Direction, SortKey};

use super::{Operator, Predicate, Query};
use crate::TRACING_TARGET_QUERY;
use crate::cursor::CursorState;

/// Translates a sort specification and cursor position into a [`Query`].
///
/// With no custom sort, rows are ordered by the unique id alone and the
/// positional predicate is `id < last` (DESC) or `id > last` (ASC). With a
/// custom sort field the id becomes the tie-breaker:
///
/// ```text
/// (field = last_value AND id <cmp> last_id) OR (field <cmp> last_value)
/// ORDER BY field <dir>, id <dir>
/// ```
#[derive(Debug, Clone)]
pub struct KeysetQueryBuilder {
    id_field: String,
}

impl KeysetQueryBuilder {
    /// Creates a builder tie-breaking on the given unique id field.
    pub fn new(id_field: impl Into<String>) -> Self {
        Self {
            id_field: id_field.into(),
        }
    }

    /// Returns the name of the id field.
    #[inline]
    pub fn id_field(&self) -> &str {
        &self.id_field
    }

    /// Returns the sort order for the given sort field and direction.
    pub fn sort_order(&self, sort_field: Option<&str>, direction: Direction) -> Vec<SortKey> {
        let mut sort = Vec::with_capacity(2);
        if let Some(field) = sort_field {
            sort.push(SortKey::new(field, direction));
        }
        sort.push(SortKey::new(self.id_field.as_str(), direction));
        sort
    }

    /// Returns the predicate selecting rows strictly after the cursor.
    pub fn position(&self, cursor: &CursorState, direction: Direction) -> Predicate {
        let op = Self::operator(direction);
        let after_id = Predicate::compare(self.id_field.as_str(), op, cursor.last_id.clone());

        match &cursor.sort {
            None => after_id,
            Some(sort) => Predicate::or([
                Predicate::and([
                    Predicate::eq(sort.field.as_str(), sort.value.clone()),
                    after_id,
                ]),
                Predicate::compare(sort.field.as_str(), op, sort.value.clone()),
            ]),
        }
    }

    /// Builds the page query.
    ///
    /// The limit is always `size + 1`: the extra row only tells whether a
    /// further page exists.
    pub fn build(
        &self,
        filter: Option<Predicate>,
        cursor: Option<&CursorState>,
        sort_field: Option<&str>,
        direction: Direction,
        size: usize,
    ) -> Query {
        let query = Query {
            filter,
            position: cursor.map(|cursor| self.position(cursor, direction)),
            sort: self.sort_order(sort_field, direction),
            limit: size.saturating_add(1),
            max_time: None,
        };

        tracing::debug!(
            target: TRACING_TARGET_QUERY,
            query = %query,
            first_page = cursor.is_none(),
            "Built keyset query"
        );

        query
    }

    fn operator(direction: Direction) -> Operator {
        match direction {
            Direction::Asc => Operator::Gt,
            Direction::Desc => Operator::Lt,
        }
    }
}
