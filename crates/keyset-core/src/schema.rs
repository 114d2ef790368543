//! Field-accessor registry.
//!
//! A [`Schema`] is built once per entity type and maps field names to a
//! declared [`FieldKind`] and a getter. The pagination engine resolves the
//! unique id and the active sort field through it, both to read boundary
//! values off the last row of a page and to rehydrate cursor values with
//! the right type.
//!
//! # Example
//!
//! ```rust
//! use keyset_core::schema::Schema;
//! use keyset_core::value::{FieldKind, Value};
//!
//! struct Person {
//!     id: i64,
//!     age: Option<i64>,
//! }
//!
//! let schema = Schema::<Person>::builder()
//!     .id("id", FieldKind::Int, |p| Value::Int(p.id))
//!     .field("age", FieldKind::Int, |p| p.age.into())
//!     .build()?;
//!
//! let alice = Person { id: 1, age: Some(20) };
//! assert_eq!(schema.value_of("age", &alice)?, Value::Int(20));
//! # Ok::<(), keyset_core::Error>(())
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::value::{FieldKind, Value};
use crate::{Error, Result, TRACING_TARGET_SCHEMA};

/// Getter reading a single field value from an entity.
pub type FieldGetter<T> = Arc<dyn Fn(&T) -> Value + Send + Sync>;

/// Name, declared kind and getter of one entity field.
pub struct FieldDescriptor<T> {
    name: String,
    kind: FieldKind,
    getter: FieldGetter<T>,
}

impl<T> FieldDescriptor<T> {
    /// Creates a new field descriptor.
    pub fn new<G>(name: impl Into<String>, kind: FieldKind, getter: G) -> Self
    where
        G: Fn(&T) -> Value + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            kind,
            getter: Arc::new(getter),
        }
    }

    /// Returns the field name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the declared kind.
    #[inline]
    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Reads the field from an entity.
    #[inline]
    pub fn get(&self, entity: &T) -> Value {
        (self.getter)(entity)
    }
}

impl<T> Clone for FieldDescriptor<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            kind: self.kind,
            getter: Arc::clone(&self.getter),
        }
    }
}

impl<T> fmt::Debug for FieldDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Registry of field accessors for an entity type.
///
/// Always contains exactly one id field: unique, totally ordered, and
/// monotonically assigned at creation. It is the mandatory tie-breaker of
/// every sort order.
pub struct Schema<T> {
    id: FieldDescriptor<T>,
    fields: HashMap<String, FieldDescriptor<T>>,
}

impl<T> Schema<T> {
    /// Returns a new schema builder.
    pub fn builder() -> SchemaBuilder<T> {
        SchemaBuilder::default()
    }

    /// Returns the id field descriptor.
    #[inline]
    pub fn id(&self) -> &FieldDescriptor<T> {
        &self.id
    }

    /// Returns the descriptor of a field, including the id field.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor<T>> {
        if name == self.id.name {
            return Some(&self.id);
        }
        self.fields.get(name)
    }

    /// Returns the descriptor of a field or a schema error.
    pub fn resolve(&self, name: &str) -> Result<&FieldDescriptor<T>> {
        self.field(name).ok_or_else(|| {
            tracing::error!(target: TRACING_TARGET_SCHEMA, field = name, "No accessor registered for field");
            Error::schema().with_message(format!("no accessor registered for field '{name}'"))
        })
    }

    /// Reads a named field from an entity.
    pub fn value_of(&self, name: &str, entity: &T) -> Result<Value> {
        Ok(self.resolve(name)?.get(entity))
    }

    /// Returns `true` if a field with this name is registered.
    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// Iterates over the names of all registered fields, id first.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.id.name()).chain(self.fields.keys().map(String::as_str))
    }
}

impl<T> Clone for Schema<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            fields: self.fields.clone(),
        }
    }
}

impl<T> fmt::Debug for Schema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("id", &self.id)
            .field("fields", &self.fields.values().collect::<Vec<_>>())
            .finish()
    }
}

/// Builder for [`Schema`].
pub struct SchemaBuilder<T> {
    id: Option<FieldDescriptor<T>>,
    fields: Vec<FieldDescriptor<T>>,
}

impl<T> Default for SchemaBuilder<T> {
    fn default() -> Self {
        Self {
            id: None,
            fields: Vec::new(),
        }
    }
}

impl<T> SchemaBuilder<T> {
    /// Sets the unique id field.
    pub fn id<G>(mut self, name: impl Into<String>, kind: FieldKind, getter: G) -> Self
    where
        G: Fn(&T) -> Value + Send + Sync + 'static,
    {
        self.id = Some(FieldDescriptor::new(name, kind, getter));
        self
    }

    /// Registers a named field.
    pub fn field<G>(mut self, name: impl Into<String>, kind: FieldKind, getter: G) -> Self
    where
        G: Fn(&T) -> Value + Send + Sync + 'static,
    {
        self.fields.push(FieldDescriptor::new(name, kind, getter));
        self
    }

    /// Builds the schema.
    ///
    /// # Errors
    ///
    /// Returns a schema error if no id field was set, if a field name is
    /// empty, or if a field name is registered twice.
    pub fn build(self) -> Result<Schema<T>> {
        let id = self
            .id
            .ok_or_else(|| Error::schema().with_message("schema has no id field"))?;

        if id.name.is_empty() {
            return Err(Error::schema().with_message("id field name must not be empty"));
        }

        let mut fields = HashMap::with_capacity(self.fields.len());
        for descriptor in self.fields {
            if descriptor.name.is_empty() {
                return Err(Error::schema().with_message("field name must not be empty"));
            }
            if descriptor.name == id.name || fields.contains_key(&descriptor.name) {
                return Err(Error::schema()
                    .with_message(format!("field '{}' registered twice", descriptor.name)));
            }
            fields.insert(descriptor.name.clone(), descriptor);
        }

        tracing::debug!(
            target: TRACING_TARGET_SCHEMA,
            id = %id.name,
            fields = fields.len(),
            "Built field registry"
        );

        Ok(Schema { id, fields })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    struct Person {
        id: i64,
        name: String,
        age: Option<i64>,
    }

    fn alice() -> Person {
        Person {
            id: 7,
            name: "alice".to_owned(),
            age: None,
        }
    }

    fn schema() -> Schema<Person> {
        Schema::builder()
            .id("id", FieldKind::Int, |p: &Person| Value::Int(p.id))
            .field("name", FieldKind::String, |p: &Person| p.name.as_str().into())
            .field("age", FieldKind::Int, |p: &Person| p.age.into())
            .build()
            .unwrap()
    }

    #[test]
    fn resolves_registered_fields() {
        let schema = schema();
        let person = alice();

        assert_eq!(schema.id().name(), "id");
        assert_eq!(schema.value_of("id", &person).unwrap(), Value::Int(7));
        assert_eq!(schema.value_of("name", &person).unwrap(), Value::from("alice"));
        assert_eq!(schema.value_of("age", &person).unwrap(), Value::Null);
        assert_eq!(schema.resolve("age").unwrap().kind(), FieldKind::Int);
    }

    #[test]
    fn unknown_field_is_schema_error() {
        let error = schema().resolve("unknown").unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Schema);
    }

    #[test]
    fn build_requires_id() {
        let error = Schema::<Person>::builder()
            .field("name", FieldKind::String, |p: &Person| p.name.as_str().into())
            .build()
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Schema);
    }

    #[test]
    fn build_rejects_duplicates() {
        let error = Schema::<Person>::builder()
            .id("id", FieldKind::Int, |p: &Person| Value::Int(p.id))
            .field("id", FieldKind::Int, |p: &Person| Value::Int(p.id))
            .build()
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Schema);
    }

    #[test]
    fn field_names_lists_id_first() {
        let schema = schema();
        let names: Vec<_> = schema.field_names().collect();
        assert_eq!(names[0], "id");
        assert_eq!(names.len(), 3);
        assert!(schema.contains("name"));
    }
}
