//! Common error type definitions.

use strum::{AsRefStr, IntoStaticStr};
use thiserror::Error;

/// Type alias for boxed dynamic errors that can be sent across threads.
///
/// Backing stores report their failures through this type; the pagination
/// engine keeps it as the `source` of a [`ErrorKind::QueryExecution`] error.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Type alias for Results with our custom Error type.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Categories of errors that can occur while fetching a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// The request asked for something the engine does not allow,
    /// such as sorting on a field outside the sortable allow-list.
    InvalidRequest,
    /// The continuation token could not be decoded (corrupt, truncated,
    /// tampered with, or produced under a different secret).
    Token,
    /// The continuation token was produced for a different filter or sort.
    FingerprintMismatch,
    /// The decoded continuation payload does not have the expected shape.
    MalformedToken,
    /// A configured field has no accessor on the entity type.
    Schema,
    /// The boundary row carries a null or unresolvable sort or id value.
    InvalidSortValue,
    /// The backing store failed while executing the page query.
    QueryExecution,
    /// The engine configuration is invalid.
    Configuration,
    /// An unexpected server-side failure, such as a token that could not
    /// be encrypted.
    Internal,
}

/// A structured error type for pagination operations.
#[derive(Debug, Error)]
#[error("{}{}", kind.as_ref(), message.as_ref().map(|m| format!(": {m}")).unwrap_or_default())]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional error message.
    pub message: Option<String>,
    /// Optional source error.
    #[source]
    pub source: Option<BoxedError>,
}

impl Error {
    /// Creates a new error with the given kind.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            source: None,
        }
    }

    /// Adds a message to this error.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Adds a source error to this error.
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Adds an already boxed source error to this error.
    pub fn with_boxed_source(mut self, source: BoxedError) -> Self {
        self.source = Some(source);
        self
    }

    /// Creates a new invalid request error.
    pub fn invalid_request() -> Self {
        Self::new(ErrorKind::InvalidRequest)
    }

    /// Creates a new token decoding error.
    pub fn token() -> Self {
        Self::new(ErrorKind::Token)
    }

    /// Creates a new fingerprint mismatch error.
    pub fn fingerprint_mismatch() -> Self {
        Self::new(ErrorKind::FingerprintMismatch)
    }

    /// Creates a new malformed token error.
    pub fn malformed_token() -> Self {
        Self::new(ErrorKind::MalformedToken)
    }

    /// Creates a new schema error.
    pub fn schema() -> Self {
        Self::new(ErrorKind::Schema)
    }

    /// Creates a new invalid sort value error.
    pub fn invalid_sort_value() -> Self {
        Self::new(ErrorKind::InvalidSortValue)
    }

    /// Creates a new query execution error.
    pub fn query_execution() -> Self {
        Self::new(ErrorKind::QueryExecution)
    }

    /// Creates a new configuration error.
    pub fn configuration() -> Self {
        Self::new(ErrorKind::Configuration)
    }

    /// Creates a new internal error.
    pub fn internal() -> Self {
        Self::new(ErrorKind::Internal)
    }

    /// Returns the error kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the error kind as a string.
    pub fn kind_str(&self) -> &'static str {
        self.kind.into()
    }

    /// Returns whether the error was caused by the caller's input.
    ///
    /// Client errors should be reported as an invalid request; everything
    /// else is a server-side configuration or storage failure.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::InvalidRequest
                | ErrorKind::Token
                | ErrorKind::FingerprintMismatch
                | ErrorKind::MalformedToken
        )
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn display_includes_kind_and_message() {
        let error = Error::fingerprint_mismatch().with_message("filter changed");
        assert_eq!(error.to_string(), "fingerprint_mismatch: filter changed");

        let error = Error::schema();
        assert_eq!(error.to_string(), "schema");
    }

    #[test]
    fn source_is_preserved() {
        let io = std::io::Error::other("connection reset");
        let error = Error::query_execution().with_source(io);

        let source = error.source().expect("source should be set");
        assert_eq!(source.to_string(), "connection reset");
    }

    #[test]
    fn client_error_classification() {
        assert!(Error::invalid_request().is_client_error());
        assert!(Error::token().is_client_error());
        assert!(Error::fingerprint_mismatch().is_client_error());
        assert!(Error::malformed_token().is_client_error());

        assert!(!Error::schema().is_client_error());
        assert!(!Error::invalid_sort_value().is_client_error());
        assert!(!Error::query_execution().is_client_error());
        assert!(!Error::configuration().is_client_error());
        assert!(!Error::internal().is_client_error());
    }

    #[test]
    fn kind_str() {
        assert_eq!(Error::malformed_token().kind_str(), "malformed_token");
        assert_eq!(Error::query_execution().kind(), ErrorKind::QueryExecution);
    }
}
