//! Decoded continuation-token payloads.
//!
//! The plain payload is `fingerprint_id` when rows are sorted by id only, and
//! `fingerprint_id_field_value` when a custom sort field is active. Parsing is
//! sort-aware: the value part is everything after `field_`, so string sort
//! values may themselves contain underscores.

use keyset_core::Fingerprint;
use keyset_core::schema::FieldDescriptor;
use keyset_core::value::Value;

use crate::{Error, Result, TRACING_TARGET_QUERY};

/// Separator between payload parts.
const SEPARATOR: char = '_';

/// Sort-field position of a cursor.
#[derive(Debug, Clone, PartialEq)]
pub struct SortPosition {
    /// Name of the active sort field.
    pub field: String,
    /// Value of the sort field on the last row of the previous page.
    pub value: Value,
}

/// Position of the last row of a page.
#[derive(Debug, Clone, PartialEq)]
pub struct CursorState {
    /// Fingerprint of the filter and sort the cursor was issued for.
    pub fingerprint: Fingerprint,
    /// Unique id of the last row.
    pub last_id: Value,
    /// Sort-field position, present only when a custom sort is active.
    pub sort: Option<SortPosition>,
}

impl CursorState {
    /// Creates a cursor positioned on the given id.
    pub fn new(fingerprint: Fingerprint, last_id: Value) -> Self {
        Self {
            fingerprint,
            last_id,
            sort: None,
        }
    }

    /// Adds a sort-field position to this cursor.
    pub fn with_sort(mut self, field: impl Into<String>, value: Value) -> Self {
        self.sort = Some(SortPosition {
            field: field.into(),
            value,
        });
        self
    }

    /// Renders the plain payload that gets encrypted into a token.
    ///
    /// # Errors
    ///
    /// Returns an invalid sort value error if the id or sort value has no
    /// token form (null or NaN), or if the id form contains the separator.
    pub fn to_plain(&self) -> Result<String> {
        let id = self.last_id.to_token_string().ok_or_else(|| {
            Error::invalid_sort_value()
                .with_message(format!("id value {} cannot be encoded", self.last_id))
        })?;

        if id.is_empty() || id.contains(SEPARATOR) {
            return Err(Error::invalid_sort_value().with_message(format!(
                "id value {} cannot be encoded: empty or contains '{SEPARATOR}'",
                self.last_id
            )));
        }

        let mut plain = format!("{}{SEPARATOR}{id}", self.fingerprint);

        if let Some(sort) = &self.sort {
            let value = sort.value.to_token_string().ok_or_else(|| {
                Error::invalid_sort_value().with_message(format!(
                    "sort field '{}' value {} cannot be encoded",
                    sort.field, sort.value
                ))
            })?;

            plain.push(SEPARATOR);
            plain.push_str(&sort.field);
            plain.push(SEPARATOR);
            plain.push_str(&value);
        }

        Ok(plain)
    }

    /// Parses a plain payload issued for the given fingerprint.
    ///
    /// The fingerprint is checked before the shape of the payload, so a token
    /// replayed against a different filter or sort always reports a mismatch.
    /// Cursor values are rehydrated with the declared kind of their field.
    ///
    /// # Errors
    ///
    /// - fingerprint mismatch if the payload was issued for another query
    /// - malformed token if the payload does not have the expected parts, or a
    ///   value cannot be parsed as its declared kind
    pub fn parse<T>(
        plain: &str,
        expected: &Fingerprint,
        id: &FieldDescriptor<T>,
        sort: Option<&FieldDescriptor<T>>,
    ) -> Result<Self> {
        let (fingerprint, rest) = match plain.split_once(SEPARATOR) {
            Some((fingerprint, rest)) => (fingerprint, Some(rest)),
            None => (plain, None),
        };

        if !expected.matches(fingerprint) {
            tracing::debug!(
                target: TRACING_TARGET_QUERY,
                expected = %expected,
                "Continuation token was issued for a different filter or sort"
            );
            return Err(Error::fingerprint_mismatch()
                .with_message("continuation token does not match the current filter and sort"));
        }

        let rest = rest.ok_or_else(|| malformed("missing id"))?;
        let (raw_id, tail) = match rest.split_once(SEPARATOR) {
            Some((raw_id, tail)) => (raw_id, Some(tail)),
            None => (rest, None),
        };

        if raw_id.is_empty() {
            return Err(malformed("empty id"));
        }

        let last_id = id
            .kind()
            .parse_token_value(raw_id)
            .map_err(|error| malformed("unparsable id").with_source(error))?;

        let mut cursor = Self::new(expected.clone(), last_id);

        match (sort, tail) {
            (None, None) => {}
            (None, Some(_)) => return Err(malformed("unexpected sort position")),
            (Some(_), None) => return Err(malformed("missing sort position")),
            (Some(sort), Some(tail)) => {
                let raw_value = tail
                    .strip_prefix(sort.name())
                    .and_then(|rest| rest.strip_prefix(SEPARATOR))
                    .ok_or_else(|| malformed("sort field does not match"))?;

                let value = sort
                    .kind()
                    .parse_token_value(raw_value)
                    .map_err(|error| malformed("unparsable sort value").with_source(error))?;

                cursor = cursor.with_sort(sort.name(), value);
            }
        }

        Ok(cursor)
    }
}

fn malformed(reason: &str) -> Error {
    Error::malformed_token().with_message(format!("continuation payload: {reason}"))
}
