//! The page-fetch engine.

use std::collections::BTreeSet;

use keyset_core::Fingerprint;
use keyset_core::schema::{FieldDescriptor, Schema};
use keyset_core::token::TokenCodec;

use crate::assembler::{SliceAssembler, codec_error};
use crate::config::PaginationConfig;
use crate::cursor::CursorState;
use crate::executor::PageExecutor;
use crate::filter::{FilterBuilder, Principal};
use crate::query::KeysetQueryBuilder;
use crate::request::PageRequest;
use crate::slice::ResultSlice;
use crate::store::DocumentStore;
use crate::{Error, Result, TRACING_TARGET_PAGINATOR};

/// Keyset pagination over a [`DocumentStore`].
///
/// Every page fetch is stateless: the decoded cursor, fingerprint and query
/// are local to the call, and the paginator only holds immutable
/// configuration. One instance can serve any number of concurrent fetches.
///
/// A fetch moves through fixed steps and fails as a whole at the first one
/// that rejects the request:
///
/// 1. the sort field is checked against the allow-list
/// 2. the filter fingerprint is computed
/// 3. a supplied continuation token is decrypted and checked against it
/// 4. the keyset query is built and executed with one look-ahead row
/// 5. the slice is assembled and the next token encoded
pub struct Paginator<T, S, B = ()> {
    executor: PageExecutor<S>,
    schema: Schema<T>,
    filter_builder: B,
    codec: TokenCodec,
    query_builder: KeysetQueryBuilder,
    sortable_fields: BTreeSet<String>,
    default_page_size: u32,
    max_page_size: u32,
}

impl<T, S, B> Paginator<T, S, B>
where
    S: DocumentStore<T>,
    B: FilterBuilder,
{
    /// Builds a paginator.
    ///
    /// # Errors
    ///
    /// - configuration error if the configuration does not validate
    /// - schema error if a sortable field has no accessor in the schema
    #[tracing::instrument(skip_all, target = TRACING_TARGET_PAGINATOR)]
    pub fn new(
        store: S,
        schema: Schema<T>,
        filter_builder: B,
        config: &PaginationConfig,
    ) -> Result<Self> {
        config.validate()?;

        let mut sortable_fields = BTreeSet::new();
        for field in config.sortable_fields() {
            schema.resolve(field)?;
            sortable_fields.insert(field.to_owned());
        }

        let codec = TokenCodec::new(config.token_secret()).map_err(|error| {
            Error::configuration()
                .with_message("invalid token secret")
                .with_source(error)
        })?;

        let executor = PageExecutor::new(store).with_max_time(config.query_timeout());
        let query_builder = KeysetQueryBuilder::new(schema.id().name());

        tracing::info!(
            target: TRACING_TARGET_PAGINATOR,
            id_field = schema.id().name(),
            sortable_fields = ?sortable_fields,
            query_timeout_ms = config.query_timeout_ms,
            "Pagination engine ready"
        );

        Ok(Self {
            executor,
            schema,
            filter_builder,
            codec,
            query_builder,
            sortable_fields,
            default_page_size: config.default_page_size,
            max_page_size: config.max_page_size,
        })
    }

    /// Returns the field-accessor registry.
    #[inline]
    pub fn schema(&self) -> &Schema<T> {
        &self.schema
    }

    /// Returns the backing store.
    #[inline]
    pub fn store(&self) -> &S {
        self.executor.store()
    }

    /// Returns `true` if clients may sort by the given field.
    #[inline]
    pub fn is_sortable(&self, field: &str) -> bool {
        self.sortable_fields.contains(field)
    }

    /// Fetches one page.
    ///
    /// Without a continuation token the first page is returned. With one,
    /// the page continues strictly after the row the token was issued for,
    /// provided the filter, sort field and direction are unchanged.
    ///
    /// # Errors
    ///
    /// Fails with the error kind of the first rejected step; see
    /// [`ErrorKind`](crate::ErrorKind). No partial results are returned.
    #[tracing::instrument(
        skip_all,
        target = TRACING_TARGET_PAGINATOR,
        fields(
            size = request.size,
            sort = request.sort(),
            direction = %request.direction,
            first_page = request.token().is_none(),
        )
    )]
    pub async fn fetch_page(
        &self,
        request: &PageRequest,
        filter: Option<&B::Filter>,
        principal: Option<&Principal>,
    ) -> Result<ResultSlice<T>> {
        let direction = request.direction;
        let sort = self.sort_descriptor(request.sort())?;
        let sort_field = sort.map(FieldDescriptor::name);
        let size = request.effective_size(self.default_page_size, self.max_page_size);

        let fingerprint = Fingerprint::compute(filter, sort_field, direction);

        let cursor = match request.token() {
            Some(token) => Some(self.decode_cursor(token, &fingerprint, sort)?),
            None => None,
        };

        let query = self.query_builder.build(
            self.filter_builder.build_filter(filter, principal),
            cursor.as_ref(),
            sort_field,
            direction,
            size as usize,
        );

        let rows = self.executor.execute(query).await?;

        let slice = SliceAssembler::new(&self.codec, &self.schema).assemble(
            rows,
            size,
            &fingerprint,
            sort_field,
        )?;

        tracing::debug!(
            target: TRACING_TARGET_PAGINATOR,
            rows = slice.number_of_elements(),
            has_next = slice.has_next(),
            "Fetched page"
        );

        Ok(slice)
    }

    /// Resolves the requested sort field.
    ///
    /// Sorting by the id field itself is the same as not sorting by a
    /// custom field, since the id is always the last sort key.
    fn sort_descriptor(&self, field: Option<&str>) -> Result<Option<&FieldDescriptor<T>>> {
        let Some(field) = field else {
            return Ok(None);
        };

        if !self.is_sortable(field) {
            tracing::warn!(
                target: TRACING_TARGET_PAGINATOR,
                field,
                "Rejected sort on a field outside the allow-list"
            );
            return Err(Error::invalid_request()
                .with_message(format!("sorting by '{field}' is not allowed")));
        }

        if field == self.schema.id().name() {
            return Ok(None);
        }

        self.schema.resolve(field).map(Some)
    }

    fn decode_cursor(
        &self,
        token: &str,
        fingerprint: &Fingerprint,
        sort: Option<&FieldDescriptor<T>>,
    ) -> Result<CursorState> {
        let plain = self.codec.decode(token).map_err(|error| {
            tracing::warn!(
                target: TRACING_TARGET_PAGINATOR,
                error = %error,
                "Rejected undecodable continuation token"
            );
            codec_error(error)
        })?;

        tracing::trace!(target: TRACING_TARGET_PAGINATOR, payload = %plain, "Decoded continuation cursor");

        CursorState::parse(&plain, fingerprint, self.schema.id(), sort)
    }
}

impl<T, S, B> std::fmt::Debug for Paginator<T, S, B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Paginator")
            .field("id_field", &self.query_builder.id_field())
            .field("sortable_fields", &self.sortable_fields)
            .field("default_page_size", &self.default_page_size)
            .field("max_page_size", &self.max_page_size)
            .field("query_timeout", &self.executor.max_time())
            .finish_non_exhaustive()
    }
}
