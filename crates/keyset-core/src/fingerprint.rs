//! Filter fingerprints for continuation-token consistency checks.

use derive_more::Display;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::filter::SearchFilter;
use crate::sort::Direction;

/// Number of digest bytes kept in a fingerprint (128 bits).
const FINGERPRINT_BYTES: usize = 16;

/// Separator between the hashed parts, so that adjacent parts cannot alias.
const PART_SEPARATOR: &[u8] = b"\x1f";

/// A deterministic digest of a query's filter, sort field and direction.
///
/// Page size is deliberately not part of the fingerprint: a client may change
/// the page size while following a token sequence, but not the filter or sort.
/// The fingerprint is a consistency check, not an authentication mechanism.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Computes the fingerprint of a filter and sort specification.
    pub fn compute<F>(filter: Option<&F>, sort_field: Option<&str>, direction: Direction) -> Self
    where
        F: SearchFilter + ?Sized,
    {
        let canonical = filter.map(|f| f.canonical_form()).unwrap_or_default();

        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());
        hasher.update(PART_SEPARATOR);
        hasher.update(sort_field.unwrap_or_default().as_bytes());
        hasher.update(PART_SEPARATOR);
        hasher.update(direction.as_ref().as_bytes());
        let digest = hasher.finalize();

        Self(hex::encode(&digest[..FINGERPRINT_BYTES]))
    }

    /// Returns the fingerprint as a lower-case hex string.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the given string is this fingerprint.
    #[inline]
    pub fn matches(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl AsRef<str> for Fingerprint {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FieldFilter;
    use crate::value::Value;

    #[test]
    fn identical_inputs_produce_identical_fingerprints() {
        let filter = FieldFilter::new().with("name", "alice");
        let a = Fingerprint::compute(Some(&filter), Some("age"), Direction::Desc);
        let b = Fingerprint::compute(Some(&filter.clone()), Some("age"), Direction::Desc);
        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), FINGERPRINT_BYTES * 2);
        assert!(a.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn any_change_produces_a_different_fingerprint() {
        let filter = FieldFilter::new().with("name", "alice");
        let other = FieldFilter::new().with("name", "bob");

        let base = Fingerprint::compute(Some(&filter), Some("age"), Direction::Desc);
        assert_ne!(base, Fingerprint::compute(Some(&other), Some("age"), Direction::Desc));
        assert_ne!(base, Fingerprint::compute(Some(&filter), Some("name"), Direction::Desc));
        assert_ne!(base, Fingerprint::compute(Some(&filter), None, Direction::Desc));
        assert_ne!(base, Fingerprint::compute(Some(&filter), Some("age"), Direction::Asc));
        assert_ne!(base, Fingerprint::compute(None::<&FieldFilter>, Some("age"), Direction::Desc));
    }

    #[test]
    fn typed_filter_values_do_not_alias() {
        let uuid = uuid::Uuid::nil();
        let ts = jiff::Timestamp::from_second(1_700_000_000).unwrap();
        let fingerprint = |filter: FieldFilter| {
            Fingerprint::compute(Some(&filter), None, Direction::Desc)
        };

        assert_ne!(
            fingerprint(FieldFilter::new().with("owner", uuid)),
            fingerprint(FieldFilter::new().with("owner", uuid.to_string())),
        );
        assert_ne!(
            fingerprint(FieldFilter::new().with("created", ts)),
            fingerprint(FieldFilter::new().with("created", ts.to_string())),
        );
        assert_ne!(
            fingerprint(FieldFilter::new().with("score", f64::NAN)),
            fingerprint(FieldFilter::new().with("score", Value::Null)),
        );
        assert_eq!(
            fingerprint(FieldFilter::new()),
            Fingerprint::compute(None::<&FieldFilter>, None, Direction::Desc),
        );
    }

    #[test]
    fn separators_prevent_aliasing() {
        let a = Fingerprint::compute(Some("ab"), Some("c"), Direction::Asc);
        let b = Fingerprint::compute(Some("a"), Some("bc"), Direction::Asc);
        assert_ne!(a, b);
    }

    #[test]
    fn never_contains_the_payload_delimiter() {
        let fp = Fingerprint::compute(None::<&str>, None, Direction::Desc);
        assert!(!fp.as_str().contains('_'));
        assert!(fp.matches(&fp.to_string()));
    }
}
