//! Page request parameters.

use keyset_core::Direction;
use serde::{Deserialize, Serialize};

/// Page size used when a request asks for fewer than one row.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Parameters of a single page fetch.
///
/// A request without a continuation token fetches the first page. Requests
/// that follow a token must keep the same filter, sort field and direction;
/// only the page size may change along a token sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    /// Token returned with the previous page, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub continuation_token: Option<String>,
    /// Requested number of rows.
    ///
    /// Sizes below 1 are replaced with the configured default page size.
    #[serde(default = "PageRequest::default_size")]
    pub size: i64,
    /// Optional sort field. Rows are sorted by the unique id only when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_field: Option<String>,
    /// Direction applied to the sort field and to the id tie-breaker.
    #[serde(default)]
    pub direction: Direction,
}

impl PageRequest {
    /// Returns a first-page request for the given size, sorted by id descending.
    #[inline]
    pub fn new(size: i64) -> Self {
        Self {
            continuation_token: None,
            size,
            sort_field: None,
            direction: Direction::default(),
        }
    }

    /// Returns a [`PageRequest`] continuing from the given token.
    #[inline]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.continuation_token = Some(token.into());
        self
    }

    /// Returns a [`PageRequest`] with an optional continuation token.
    #[inline]
    pub fn with_optional_token(mut self, token: Option<String>) -> Self {
        self.continuation_token = token;
        self
    }

    /// Returns a [`PageRequest`] sorted by the given field.
    #[inline]
    pub fn with_sort(mut self, field: impl Into<String>) -> Self {
        self.sort_field = Some(field.into());
        self
    }

    /// Returns a [`PageRequest`] with the given direction.
    #[inline]
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Returns a [`PageRequest`] with the given size.
    #[inline]
    pub fn with_size(mut self, size: i64) -> Self {
        self.size = size;
        self
    }

    /// Returns the continuation token, ignoring blank tokens.
    pub fn token(&self) -> Option<&str> {
        self.continuation_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }

    /// Returns the sort field, ignoring blank names.
    pub fn sort(&self) -> Option<&str> {
        self.sort_field
            .as_deref()
            .map(str::trim)
            .filter(|field| !field.is_empty())
    }

    /// Returns the effective page size.
    ///
    /// Sizes below 1 become `default_size`; sizes above `max_size` are capped.
    pub fn effective_size(&self, default_size: u32, max_size: u32) -> u32 {
        if self.size < 1 {
            return default_size.min(max_size);
        }

        u32::try_from(self.size).map_or(max_size, |size| size.min(max_size))
    }

    fn default_size() -> i64 {
        i64::from(DEFAULT_PAGE_SIZE)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(Self::default_size())
    }
}
