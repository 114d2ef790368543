//! Field declarations and filter arguments.

use std::fmt;
use std::str::FromStr;

use anyhow::{Context, anyhow, bail};
use keyset_core::value::{FieldKind, Value};
use serde_json::Value as Json;

/// A `name:kind` field declaration, e.g. `created:timestamp`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    /// Name of the JSON property.
    pub name: String,
    /// Declared kind of the property.
    pub kind: FieldKind,
}

impl FromStr for FieldSpec {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, kind) = s
            .split_once(':')
            .ok_or_else(|| anyhow!("expected `name:kind`, got '{s}'"))?;

        let name = name.trim();
        if name.is_empty() {
            bail!("field name must not be empty in '{s}'");
        }

        let kind = kind
            .trim()
            .parse::<FieldKind>()
            .with_context(|| format!("unknown field kind in '{s}'"))?;

        Ok(Self {
            name: name.to_owned(),
            kind,
        })
    }
}

impl fmt::Display for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.kind)
    }
}

/// A `field=value` equality filter argument.
///
/// The value is kept raw until the field's declared kind is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhereSpec {
    /// Filtered field.
    pub field: String,
    /// Raw value, parsed with the field's declared kind.
    pub raw: String,
}

impl WhereSpec {
    /// Parses the raw value as the given kind.
    ///
    /// Values are read the same way as document fields: timestamps accept
    /// RFC 3339 strings or epoch milliseconds.
    pub fn value(&self, kind: FieldKind) -> anyhow::Result<Value> {
        let json = match kind {
            FieldKind::String | FieldKind::Uuid => Json::String(self.raw.clone()),
            _ => serde_json::from_str(&self.raw).unwrap_or_else(|_| Json::String(self.raw.clone())),
        };

        kind.from_json(Some(&json))
            .filter(|value| !value.is_null())
            .ok_or_else(|| {
                anyhow!(
                    "invalid value for filter on '{}': '{}' is not a valid {kind}",
                    self.field,
                    self.raw
                )
            })
    }
}

impl FromStr for WhereSpec {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (field, raw) = s
            .split_once('=')
            .ok_or_else(|| anyhow!("expected `field=value`, got '{s}'"))?;

        let field = field.trim();
        if field.is_empty() {
            bail!("filter field must not be empty in '{s}'");
        }

        Ok(Self {
            field: field.to_owned(),
            raw: raw.to_owned(),
        })
    }
}
