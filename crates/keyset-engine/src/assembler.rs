//! Slice assembly from over-fetched rows.

use keyset_core::Fingerprint;
use keyset_core::schema::{FieldDescriptor, Schema};
use keyset_core::token::{CodecError, TokenCodec};
use keyset_core::value::Value;

use crate::cursor::CursorState;
use crate::slice::ResultSlice;
use crate::{Error, Result, TRACING_TARGET_QUERY};

/// Turns up to `size + 1` fetched rows into a [`ResultSlice`].
///
/// When the look-ahead row is present it is dropped, and the cursor of the
/// last retained row is encoded into the continuation token.
#[derive(Debug)]
pub struct SliceAssembler<'a, T> {
    codec: &'a TokenCodec,
    schema: &'a Schema<T>,
}

impl<'a, T> SliceAssembler<'a, T> {
    /// Creates an assembler reading boundary values through `schema`.
    pub fn new(codec: &'a TokenCodec, schema: &'a Schema<T>) -> Self {
        Self { codec, schema }
    }

    /// Assembles a slice.
    ///
    /// # Errors
    ///
    /// - schema error if the sort field has no accessor
    /// - invalid sort value error if the boundary row's id or sort value is
    ///   null, of the wrong kind, or has no token form
    /// - internal error if the continuation token cannot be encrypted
    pub fn assemble(
        &self,
        mut rows: Vec<T>,
        size: u32,
        fingerprint: &Fingerprint,
        sort_field: Option<&str>,
    ) -> Result<ResultSlice<T>> {
        let page_size = size as usize;
        let has_next = rows.len() > page_size;

        if !has_next {
            return Ok(ResultSlice::new(rows, size, None));
        }

        rows.truncate(page_size);

        let token = match rows.last() {
            Some(last) => {
                let cursor = self.cursor_for(last, fingerprint, sort_field)?;
                Some(self.encode(&cursor)?)
            }
            None => None,
        };

        Ok(ResultSlice::new(rows, size, token))
    }

    /// Derives the cursor positioned on the given row.
    pub fn cursor_for(
        &self,
        row: &T,
        fingerprint: &Fingerprint,
        sort_field: Option<&str>,
    ) -> Result<CursorState> {
        let last_id = boundary_value(self.schema.id(), row)?;
        let mut cursor = CursorState::new(fingerprint.clone(), last_id);

        if let Some(field) = sort_field {
            let descriptor = self.schema.resolve(field)?;
            cursor = cursor.with_sort(field, boundary_value(descriptor, row)?);
        }

        Ok(cursor)
    }

    fn encode(&self, cursor: &CursorState) -> Result<String> {
        let plain = cursor.to_plain()?;
        tracing::trace!(target: TRACING_TARGET_QUERY, payload = %plain, "Encoding continuation cursor");

        self.codec.encode(&plain).map_err(|error| {
            tracing::error!(
                target: TRACING_TARGET_QUERY,
                error = %error,
                "Failed to encrypt continuation token"
            );
            codec_error(error)
        })
    }
}

/// Maps a token codec failure to an engine error.
///
/// Only failures caused by the presented token are client errors. Anything
/// else, such as a failed encryption, is reported as internal.
pub(crate) fn codec_error(error: CodecError) -> Error {
    if error.is_invalid_token() {
        Error::token()
            .with_message("continuation token is invalid")
            .with_source(error)
    } else {
        Error::internal()
            .with_message("continuation token could not be processed")
            .with_source(error)
    }
}

/// Reads a field from the boundary row, rejecting nulls and kind mismatches.
fn boundary_value<T>(descriptor: &FieldDescriptor<T>, row: &T) -> Result<Value> {
    let value = descriptor.get(row);

    match value.kind() {
        None => {
            tracing::error!(
                target: TRACING_TARGET_QUERY,
                field = descriptor.name(),
                "Boundary row has a null value"
            );
            Err(Error::invalid_sort_value().with_message(format!(
                "field '{}' is null on the last row of the page",
                descriptor.name()
            )))
        }
        Some(kind) if kind != descriptor.kind() => Err(Error::invalid_sort_value().with_message(
            format!(
                "field '{}' is declared as {} but holds {}",
                descriptor.name(),
                descriptor.kind(),
                kind
            ),
        )),
        Some(_) => Ok(value),
    }
}

#[cfg(test)]
mod tests {
    use keyset_core::value::FieldKind;
    use keyset_core::{Direction, ErrorKind};

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: i64,
        age: Option<i64>,
    }

    fn row(id: i64, age: Option<i64>) -> Row {
        Row { id, age }
    }

    fn schema() -> Schema<Row> {
        Schema::builder()
            .id("id", FieldKind::Int, |r: &Row| Value::Int(r.id))
            .field("age", FieldKind::Int, |r: &Row| r.age.into())
            .field("label", FieldKind::String, |r: &Row| Value::Int(r.id))
            .build()
            .unwrap()
    }

    fn codec() -> TokenCodec {
        TokenCodec::new("assembler test secret").unwrap()
    }

    fn fingerprint() -> Fingerprint {
        Fingerprint::compute::<str>(None, Some("age"), Direction::Desc)
    }

    #[test]
    fn exhausted_page_has_no_token() {
        let (codec, schema) = (codec(), schema());
        let assembler = SliceAssembler::new(&codec, &schema);

        let slice = assembler
            .assemble(vec![row(1, Some(1))], 3, &fingerprint(), None)
            .unwrap();
        assert!(!slice.has_next());
        assert_eq!(slice.continuation_token(), None);
        assert_eq!(slice.number_of_elements(), 1);
    }

    #[test]
    fn look_ahead_row_is_dropped() {
        let (codec, schema) = (codec(), schema());
        let assembler = SliceAssembler::new(&codec, &schema);
        let fp = fingerprint();

        let rows = vec![row(4, Some(40)), row(3, Some(30)), row(2, Some(20)), row(1, Some(10))];
        let slice = assembler.assemble(rows, 3, &fp, Some("age")).unwrap();

        assert!(slice.has_next());
        assert_eq!(slice.content().len(), 3);
        assert_eq!(slice.content()[2], row(2, Some(20)));

        let plain = codec.decode(slice.continuation_token().unwrap()).unwrap();
        assert_eq!(plain, format!("{fp}_2_age_20"));
    }

    #[test]
    fn null_boundary_value_is_rejected() {
        let (codec, schema) = (codec(), schema());
        let assembler = SliceAssembler::new(&codec, &schema);

        let rows = vec![row(2, None), row(1, Some(10))];
        let error = assembler
            .assemble(rows, 1, &fingerprint(), Some("age"))
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InvalidSortValue);
    }

    #[test]
    fn mismatched_kind_is_rejected() {
        let (codec, schema) = (codec(), schema());
        let assembler = SliceAssembler::new(&codec, &schema);

        let error = assembler
            .cursor_for(&row(1, Some(1)), &fingerprint(), Some("label"))
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InvalidSortValue);
    }

    #[test]
    fn encryption_failures_are_not_client_errors() {
        let error = codec_error(CodecError::EncryptionFailed);
        assert_eq!(error.kind(), ErrorKind::Internal);
        assert!(!error.is_client_error());

        let error = codec_error(CodecError::KeyDerivation);
        assert_eq!(error.kind(), ErrorKind::Internal);

        let error = codec_error(CodecError::AuthenticationFailed);
        assert_eq!(error.kind(), ErrorKind::Token);
        assert!(error.is_client_error());
    }

    #[test]
    fn unknown_sort_field_is_schema_error() {
        let (codec, schema) = (codec(), schema());
        let assembler = SliceAssembler::new(&codec, &schema);

        let error = assembler
            .cursor_for(&row(1, Some(1)), &fingerprint(), Some("missing"))
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Schema);
    }
}
