//! Caller-defined search filters and their canonical string form.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::TRACING_TARGET_FILTER;
use crate::value::Value;

/// A caller-defined filter that restricts the paginated result set.
///
/// The canonical form feeds the filter fingerprint, so it must be
/// deterministic: two filters that select the same documents should
/// produce the same string, and any change in content must change it.
pub trait SearchFilter {
    /// Returns the deterministic string representation of this filter.
    fn canonical_form(&self) -> String;
}

impl SearchFilter for () {
    fn canonical_form(&self) -> String {
        String::new()
    }
}

impl SearchFilter for str {
    fn canonical_form(&self) -> String {
        self.to_owned()
    }
}

impl SearchFilter for String {
    fn canonical_form(&self) -> String {
        self.clone()
    }
}

impl<F: SearchFilter + ?Sized> SearchFilter for &F {
    fn canonical_form(&self) -> String {
        (**self).canonical_form()
    }
}

/// An ordered `field -> value` equality filter.
///
/// Entries are kept sorted by field name, so insertion order never
/// affects the canonical form.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FieldFilter {
    fields: BTreeMap<String, Value>,
}

impl FieldFilter {
    /// Creates an empty filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the required value of a field.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(field, value);
        self
    }

    /// Adds or replaces the required value of a field in place.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Returns the required value of a field, if any.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Returns `true` if the filter has no entries.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Iterates over the entries in field-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl SearchFilter for FieldFilter {
    /// Renders each entry as a `[field, kind, value]` triple.
    ///
    /// The kind is part of the form, so a UUID or timestamp never shares a
    /// canonical form with its string rendering. Nulls carry the kind
    /// `null` and NaN floats the value `NaN`. An empty filter has the same
    /// form as no filter.
    fn canonical_form(&self) -> String {
        if self.is_empty() {
            return String::new();
        }

        let entries: Vec<serde_json::Value> = self
            .iter()
            .map(|(field, value)| {
                let kind: &'static str = value.kind().map_or("null", Into::into);
                let repr = match value {
                    Value::Float(float) if float.is_nan() => "NaN".to_owned(),
                    value => value.to_token_string().unwrap_or_default(),
                };
                serde_json::json!([field, kind, repr])
            })
            .collect();

        serde_json::Value::Array(entries).to_string()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for FieldFilter {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut filter = Self::new();
        for (field, value) in iter {
            filter.insert(field, value);
        }
        filter
    }
}

/// Serializes a value to JSON with object keys sorted at every level.
///
/// Intended for filter types that derive `Serialize` and want a canonical
/// form without writing one by hand.
///
/// # Errors
///
/// Returns the serialization error if the value cannot be represented as
/// JSON, for example a map with non-string keys.
pub fn canonical_json<S: Serialize + ?Sized>(value: &S) -> serde_json::Result<String> {
    let json = serde_json::to_value(value).inspect_err(|error| {
        tracing::warn!(
            target: TRACING_TARGET_FILTER,
            error = %error,
            "Filter could not be serialized to canonical JSON"
        );
    })?;

    Ok(sorted(json).to_string())
}

fn sorted(json: serde_json::Value) -> serde_json::Value {
    use serde_json::Value as Json;

    match json {
        Json::Object(map) => {
            let entries: BTreeMap<String, Json> =
                map.into_iter().map(|(k, v)| (k, sorted(v))).collect();
            Json::Object(entries.into_iter().collect())
        }
        Json::Array(items) => Json::Array(items.into_iter().map(sorted).collect()),
        other => other,
    }
}
