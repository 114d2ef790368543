//! Convenient re-exports for common use.

pub use crate::error::{BoxedError, Error, ErrorKind, Result};
pub use crate::filter::{FieldFilter, SearchFilter};
pub use crate::fingerprint::Fingerprint;
pub use crate::schema::{FieldDescriptor, Schema};
pub use crate::sort::{Direction, SortKey};
pub use crate::token::TokenCodec;
pub use crate::value::{FieldKind, Value};
