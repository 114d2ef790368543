//! JSON documents and their field schema.

use std::path::Path;

use anyhow::{Context, bail};
use keyset_core::schema::Schema;
use keyset_core::value::Value;
use serde::{Deserialize, Serialize};

use crate::TRACING_TARGET_INPUT;
use crate::config::FieldSpec;

/// A JSON object read from the input file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(serde_json::Map<String, serde_json::Value>);

impl Document {
    /// Returns the raw JSON property.
    pub fn get(&self, name: &str) -> Option<&serde_json::Value> {
        self.0.get(name)
    }
}

/// Builds the schema of the declared fields.
pub fn schema(id: &FieldSpec, fields: &[FieldSpec]) -> anyhow::Result<Schema<Document>> {
    let mut builder = Schema::builder().id(id.name.clone(), id.kind, getter(id));
    for field in fields {
        builder = builder.field(field.name.clone(), field.kind, getter(field));
    }

    builder.build().context("invalid field declarations")
}

/// Reads the value of a declared field, or null if it cannot be read.
fn getter(spec: &FieldSpec) -> impl Fn(&Document) -> Value + Send + Sync + 'static {
    let (name, kind) = (spec.name.clone(), spec.kind);
    move |document: &Document| kind.from_json(document.get(&name)).unwrap_or(Value::Null)
}

/// Parses the documents and checks every declared field against its kind.
///
/// Ids must be present on every document. Other fields may be missing or
/// null.
pub fn parse(
    json: &str,
    id: &FieldSpec,
    fields: &[FieldSpec],
) -> anyhow::Result<Vec<Document>> {
    let documents: Vec<Document> =
        serde_json::from_str(json).context("input must be a JSON array of objects")?;

    for (index, document) in documents.iter().enumerate() {
        match id.kind.from_json(document.get(&id.name)) {
            None => bail!("document {index}: '{}' is not a valid {}", id.name, id.kind),
            Some(Value::Null) => bail!("document {index}: missing id '{}'", id.name),
            Some(_) => {}
        }

        for field in fields {
            if field.kind.from_json(document.get(&field.name)).is_none() {
                bail!(
                    "document {index}: '{}' is not a valid {}",
                    field.name,
                    field.kind
                );
            }
        }
    }

    Ok(documents)
}

/// Reads and parses the input file.
pub async fn load(path: &Path, id: &FieldSpec, fields: &[FieldSpec]) -> anyhow::Result<Vec<Document>> {
    let json = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read '{}'", path.display()))?;

    let documents = parse(&json, id, fields)
        .with_context(|| format!("invalid input file '{}'", path.display()))?;

    tracing::info!(
        target: TRACING_TARGET_INPUT,
        path = %path.display(),
        documents = documents.len(),
        "loaded documents"
    );

    Ok(documents)
}

#[cfg(test)]
mod tests {
    use keyset_core::value::FieldKind;

    use super::*;

    fn spec(s: &str) -> FieldSpec {
        s.parse().unwrap()
    }

    #[test]
    fn schema_reads_declared_fields() {
        let documents = parse(
            r#"[{"id": 1, "age": 30, "name": "ada"}, {"id": 2}]"#,
            &spec("id:int"),
            &[spec("age:int"), spec("name:string")],
        )
        .unwrap();

        let schema = schema(&spec("id:int"), &[spec("age:int"), spec("name:string")]).unwrap();
        assert_eq!(schema.id().kind(), FieldKind::Int);
        assert_eq!(schema.value_of("age", &documents[0]).unwrap(), Value::Int(30));
        assert_eq!(schema.value_of("name", &documents[1]).unwrap(), Value::Null);
    }

    #[test]
    fn rejects_invalid_documents() {
        let id = spec("id:int");

        assert!(parse(r#"{"id": 1}"#, &id, &[]).is_err());
        assert!(parse(r#"[{"name": "ada"}]"#, &id, &[]).is_err());
        assert!(parse(r#"[{"id": "one"}]"#, &id, &[]).is_err());
        assert!(parse(r#"[{"id": 1, "age": "old"}]"#, &id, &[spec("age:int")]).is_err());
    }

    #[test]
    fn rejects_duplicate_declarations() {
        assert!(schema(&spec("id:int"), &[spec("age:int"), spec("age:float")]).is_err());
        assert!(schema(&spec("id:int"), &[spec("id:string")]).is_err());
    }
}
