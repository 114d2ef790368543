//! Result slices returned by page fetches.

use serde::Serialize;

/// One page of results.
///
/// `has_next` is derived from the presence of a continuation token when the
/// slice is built and cannot disagree with it. `size` echoes the effective
/// page size, not the number of rows in `content`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultSlice<T> {
    content: Vec<T>,
    size: u32,
    continuation_token: Option<String>,
    has_next: bool,
}

impl<T> ResultSlice<T> {
    /// Creates a slice. A continuation token means a further page exists.
    pub fn new(content: Vec<T>, size: u32, continuation_token: Option<String>) -> Self {
        Self {
            has_next: continuation_token.is_some(),
            content,
            size,
            continuation_token,
        }
    }

    /// Returns the rows of this page.
    #[inline]
    pub fn content(&self) -> &[T] {
        &self.content
    }

    /// Returns the effective page size.
    #[inline]
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Returns the token for the next page, if any.
    #[inline]
    pub fn continuation_token(&self) -> Option<&str> {
        self.continuation_token.as_deref()
    }

    /// Returns `true` if a further page exists.
    #[inline]
    pub fn has_next(&self) -> bool {
        self.has_next
    }

    /// Returns the number of rows in this page.
    #[inline]
    pub fn number_of_elements(&self) -> usize {
        self.content.len()
    }

    /// Returns `true` if this page holds at least one row.
    #[inline]
    pub fn has_content(&self) -> bool {
        !self.content.is_empty()
    }

    /// Iterates over the rows of this page.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.content.iter()
    }

    /// Consumes the slice, returning its rows.
    pub fn into_content(self) -> Vec<T> {
        self.content
    }

    /// Maps the rows of this page, keeping size and token.
    pub fn map<U, F>(self, f: F) -> ResultSlice<U>
    where
        F: FnMut(T) -> U,
    {
        ResultSlice {
            content: self.content.into_iter().map(f).collect(),
            size: self.size,
            continuation_token: self.continuation_token,
            has_next: self.has_next,
        }
    }
}

impl<T> IntoIterator for ResultSlice<T> {
    type IntoIter = std::vec::IntoIter<T>;
    type Item = T;

    fn into_iter(self) -> Self::IntoIter {
        self.content.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a ResultSlice<T> {
    type IntoIter = std::slice::Iter<'a, T>;
    type Item = &'a T;

    fn into_iter(self) -> Self::IntoIter {
        self.content.iter()
    }
}
