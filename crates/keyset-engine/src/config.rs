//! Pagination engine configuration.
//!
//! The configuration is read once when a [`Paginator`] is built and is never
//! mutated afterwards, so concurrent page fetches only ever share immutable
//! state.
//!
//! [`Paginator`]: crate::Paginator

use std::fmt;
use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use keyset_core::token::MIN_SECRET_SIZE;
use serde::{Deserialize, Serialize};

use crate::request::DEFAULT_PAGE_SIZE;
use crate::{Error, Result, TRACING_TARGET_CONFIG};

// Configuration constants
const MIN_QUERY_TIMEOUT_MS: u64 = 1;
const MAX_QUERY_TIMEOUT_MS: u64 = 300_000;

const MIN_PAGE_SIZE: u32 = 1;
const MAX_PAGE_SIZE: u32 = 10_000;

/// Default upper bound of the page size.
pub const DEFAULT_MAX_PAGE_SIZE: u32 = 100;

/// Configuration of a [`Paginator`].
///
/// ## Example
///
/// ```rust
/// use keyset_engine::PaginationConfig;
///
/// let config = PaginationConfig::new("a sufficiently long secret")
///     .with_sortable_fields(["age", "name"])
///     .with_query_timeout_ms(2_000);
///
/// assert!(config.validate().is_ok());
/// ```
///
/// [`Paginator`]: crate::Paginator
#[derive(Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "pagination configurations must be used to build a paginator"]
pub struct PaginationConfig {
    /// Secret used to encrypt continuation tokens (at least 16 bytes)
    #[cfg_attr(
        feature = "config",
        arg(long = "token-secret", env = "KEYSET_TOKEN_SECRET", hide_env_values = true)
    )]
    pub token_secret: String,

    /// Fields clients may sort by (comma separated)
    #[cfg_attr(
        feature = "config",
        arg(
            long = "sortable-fields",
            env = "KEYSET_SORTABLE_FIELDS",
            value_delimiter = ','
        )
    )]
    #[serde(default)]
    pub sortable_fields: Vec<String>,

    /// Query execution deadline in milliseconds (optional, 1-300000)
    #[cfg_attr(
        feature = "config",
        arg(long = "query-timeout-ms", env = "KEYSET_QUERY_TIMEOUT_MS")
    )]
    #[serde(default)]
    pub query_timeout_ms: Option<u64>,

    /// Page size used when a request asks for fewer than one row
    #[cfg_attr(
        feature = "config",
        arg(
            long = "default-page-size",
            env = "KEYSET_DEFAULT_PAGE_SIZE",
            default_value = "20"
        )
    )]
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,

    /// Upper bound of the page size (1-10000)
    #[cfg_attr(
        feature = "config",
        arg(
            long = "max-page-size",
            env = "KEYSET_MAX_PAGE_SIZE",
            default_value = "100"
        )
    )]
    #[serde(default = "max_page_size")]
    pub max_page_size: u32,
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn max_page_size() -> u32 {
    DEFAULT_MAX_PAGE_SIZE
}

impl PaginationConfig {
    /// Creates a configuration with default page sizes and no sortable fields.
    #[tracing::instrument(skip(token_secret), target = TRACING_TARGET_CONFIG)]
    pub fn new(token_secret: impl Into<String>) -> Self {
        let this = Self {
            token_secret: token_secret.into(),
            sortable_fields: Vec::new(),
            query_timeout_ms: None,
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
        };

        tracing::debug!(
            target: TRACING_TARGET_CONFIG,
            default_page_size = this.default_page_size,
            max_page_size = this.max_page_size,
            "Created pagination configuration"
        );

        this
    }

    /// Returns the query deadline as a Duration.
    #[inline]
    pub fn query_timeout(&self) -> Option<Duration> {
        self.query_timeout_ms.map(Duration::from_millis)
    }

    /// Returns the token secret.
    #[inline]
    pub fn token_secret(&self) -> &str {
        &self.token_secret
    }

    /// Returns the sortable field names, trimmed and without blanks.
    pub fn sortable_fields(&self) -> impl Iterator<Item = &str> {
        self.sortable_fields
            .iter()
            .map(|field| field.trim())
            .filter(|field| !field.is_empty())
    }

    /// Sets the token secret.
    #[tracing::instrument(skip(self, token_secret), target = TRACING_TARGET_CONFIG)]
    pub fn with_token_secret(mut self, token_secret: impl Into<String>) -> Self {
        tracing::debug!(target: TRACING_TARGET_CONFIG, "Setting token secret");
        self.token_secret = token_secret.into();
        self
    }

    /// Sets the fields clients may sort by.
    #[tracing::instrument(skip(self, fields), target = TRACING_TARGET_CONFIG)]
    pub fn with_sortable_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sortable_fields = fields.into_iter().map(Into::into).collect();
        tracing::debug!(
            target: TRACING_TARGET_CONFIG,
            sortable_fields = ?self.sortable_fields,
            "Setting sortable fields"
        );
        self
    }

    /// Sets the query deadline in milliseconds.
    #[tracing::instrument(skip(self), target = TRACING_TARGET_CONFIG)]
    pub fn with_query_timeout_ms(mut self, ms: u64) -> Self {
        tracing::debug!(target: TRACING_TARGET_CONFIG, ms, "Setting query timeout");
        self.query_timeout_ms = Some(ms);
        self
    }

    /// Sets the default page size.
    #[tracing::instrument(skip(self), target = TRACING_TARGET_CONFIG)]
    pub fn with_default_page_size(mut self, size: u32) -> Self {
        tracing::debug!(target: TRACING_TARGET_CONFIG, size, "Setting default page size");
        self.default_page_size = size;
        self
    }

    /// Sets the maximum page size.
    #[tracing::instrument(skip(self), target = TRACING_TARGET_CONFIG)]
    pub fn with_max_page_size(mut self, size: u32) -> Self {
        tracing::debug!(target: TRACING_TARGET_CONFIG, size, "Setting max page size");
        self.max_page_size = size;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.token_secret.len() < MIN_SECRET_SIZE {
            return Err(Error::configuration().with_message(format!(
                "token_secret must be at least {MIN_SECRET_SIZE} bytes"
            )));
        }

        if !(MIN_PAGE_SIZE..=MAX_PAGE_SIZE).contains(&self.max_page_size) {
            return Err(Error::configuration().with_message(format!(
                "max_page_size must be between {MIN_PAGE_SIZE} and {MAX_PAGE_SIZE}"
            )));
        }

        if !(MIN_PAGE_SIZE..=self.max_page_size).contains(&self.default_page_size) {
            return Err(Error::configuration().with_message(format!(
                "default_page_size must be between {MIN_PAGE_SIZE} and max_page_size ({})",
                self.max_page_size
            )));
        }

        if let Some(timeout) = self.query_timeout_ms
            && !(MIN_QUERY_TIMEOUT_MS..=MAX_QUERY_TIMEOUT_MS).contains(&timeout)
        {
            return Err(Error::configuration().with_message(format!(
                "query_timeout_ms must be between {MIN_QUERY_TIMEOUT_MS} and {MAX_QUERY_TIMEOUT_MS}"
            )));
        }

        if self.sortable_fields().next().is_none() {
            tracing::warn!(
                target: TRACING_TARGET_CONFIG,
                "No sortable fields configured, requests may only sort by id"
            );
        }

        Ok(())
    }
}

impl fmt::Debug for PaginationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaginationConfig")
            .field("token_secret", &"***")
            .field("sortable_fields", &self.sortable_fields)
            .field("query_timeout_ms", &self.query_timeout_ms)
            .field("default_page_size", &self.default_page_size)
            .field("max_page_size", &self.max_page_size)
            .finish()
    }
}

impl fmt::Display for PaginationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PaginationConfig(sortable_fields: [{}], query_timeout_ms: {:?}, default_page_size: {}, max_page_size: {})",
            self.sortable_fields.join(", "),
            self.query_timeout_ms,
            self.default_page_size,
            self.max_page_size
        )
    }
}

#[cfg(test)]
mod tests {
    use keyset_core::ErrorKind;

    use super::*;

    const SECRET: &str = "0123456789abcdef";

    #[test]
    fn test_new_config() {
        let config = PaginationConfig::new(SECRET);
        assert_eq!(config.default_page_size, 20);
        assert_eq!(config.max_page_size, 100);
        assert_eq!(config.query_timeout(), None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = PaginationConfig::new(SECRET)
            .with_sortable_fields(["age", " name ", ""])
            .with_query_timeout_ms(1_500)
            .with_default_page_size(10)
            .with_max_page_size(50);

        assert_eq!(config.sortable_fields().collect::<Vec<_>>(), ["age", "name"]);
        assert_eq!(config.query_timeout(), Some(Duration::from_millis(1_500)));
        assert_eq!(config.default_page_size, 10);
        assert_eq!(config.max_page_size, 50);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        let short_secret = PaginationConfig::new("short");
        assert_eq!(
            short_secret.validate().unwrap_err().kind(),
            ErrorKind::Configuration
        );

        let zero_max = PaginationConfig::new(SECRET).with_max_page_size(0);
        assert!(zero_max.validate().is_err());

        let default_above_max = PaginationConfig::new(SECRET)
            .with_max_page_size(10)
            .with_default_page_size(20);
        assert!(default_above_max.validate().is_err());

        let long_timeout = PaginationConfig::new(SECRET).with_query_timeout_ms(300_001);
        assert!(long_timeout.validate().is_err());

        let zero_timeout = PaginationConfig::new(SECRET).with_query_timeout_ms(0);
        assert!(zero_timeout.validate().is_err());
    }

    #[test]
    fn test_secret_masking() {
        let config = PaginationConfig::new("super secret token value");
        assert!(!format!("{config:?}").contains("super secret"));
        assert!(!config.to_string().contains("super secret"));
    }

    #[test]
    fn test_deserialize_defaults() {
        let config: PaginationConfig =
            serde_json::from_str(r#"{"token_secret":"0123456789abcdef"}"#).unwrap();
        assert_eq!(config.default_page_size, 20);
        assert_eq!(config.max_page_size, 100);
        assert!(config.sortable_fields.is_empty());
    }
}
