// StructuredRecord and its staged builder
//
// A record is built through a mutable RecordBuilder bound to one schema and
// becomes immutable at build(). The schema is shared, not owned: it outlives
// every record built against it.

use std::sync::Arc;

use crate::codec::coerce;
use crate::internal::error::{Error, Result};
use crate::record::types::{conform, Value};
use crate::schema::types::{RecordSchema, Schema};

/// An immutable, schema-typed, ordered mapping from field name to value.
///
/// Values are stored in the schema's declared field order. Once built a
/// record is freely shareable across threads.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredRecord {
    schema: Arc<Schema>,
    values: Vec<Value>,
}

impl StructuredRecord {
    /// Starts building a record against the given schema.
    ///
    /// Fails with `SchemaMismatchError` if the schema is not a record.
    pub fn builder(schema: Arc<Schema>) -> Result<RecordBuilder> {
        if schema.as_record().is_none() {
            return Err(Error::SchemaMismatchError(format!(
                "records can only be built against a record schema, got {}",
                schema
            )));
        }
        let field_count = schema.as_record().map(|r| r.fields().len()).unwrap_or(0);
        Ok(RecordBuilder {
            schema,
            values: vec![None; field_count],
        })
    }

    /// Returns the schema this record conforms to.
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Returns the record shape of the schema.
    pub fn record_schema(&self) -> &RecordSchema {
        // Invariant: the builder only accepts record schemas.
        self.schema
            .as_record()
            .expect("StructuredRecord schema is always a record")
    }

    /// Returns the value of a field, or `None` if the field is not part of
    /// the schema. A null field yields `Some(&Value::Null)`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        let index = self.record_schema().field_index(name)?;
        Some(&self.values[index])
    }

    /// Iterates over (field name, value) pairs in schema field order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.record_schema()
            .fields()
            .iter()
            .map(|f| f.name())
            .zip(self.values.iter())
    }
}

/// Incremental builder for a [`StructuredRecord`].
///
/// Not thread-safe; owned by a single construction sequence and consumed by
/// [`RecordBuilder::build`]. On any error the builder can simply be dropped,
/// so no partial record ever escapes.
#[derive(Debug)]
pub struct RecordBuilder {
    schema: Arc<Schema>,
    values: Vec<Option<Value>>,
}

impl RecordBuilder {
    /// Sets a field value, validating that the field exists and coercing the
    /// value to the field schema.
    pub fn set(&mut self, name: &str, value: Value) -> Result<&mut Self> {
        let record = self.record_schema();
        let index = record.field_index(name).ok_or_else(|| {
            Error::SchemaMismatchError(format!(
                "record '{}' has no field '{}'",
                record.name(),
                name
            ))
        })?;
        let field_schema = record.fields()[index].schema().clone();
        self.values[index] = Some(conform(value, &field_schema)?);
        Ok(self)
    }

    /// Converts a text token into the field's type and sets it, using the
    /// same coercion rules as the delimited decoder.
    pub fn convert_and_set(&mut self, name: &str, token: &str) -> Result<&mut Self> {
        let record = self.record_schema();
        let field_schema = record
            .field(name)
            .ok_or_else(|| {
                Error::SchemaMismatchError(format!(
                    "record '{}' has no field '{}'",
                    record.name(),
                    name
                ))
            })?
            .schema()
            .clone();
        let value = coerce::text_to_value(token, &field_schema)?;
        self.set(name, value)
    }

    /// Finalizes the record. Unset nullable fields resolve to null; an unset
    /// non-nullable field fails with `MissingFieldError`.
    pub fn build(self) -> Result<StructuredRecord> {
        let record = self
            .schema
            .as_record()
            .expect("RecordBuilder schema is always a record");
        let mut values = Vec::with_capacity(record.fields().len());
        for (field, slot) in record.fields().iter().zip(self.values.into_iter()) {
            match slot {
                Some(value) => values.push(value),
                None if field.schema().is_nullable() => values.push(Value::Null),
                None => {
                    return Err(Error::MissingFieldError(format!(
                        "field '{}' of record '{}' was never set",
                        field.name(),
                        record.name()
                    )))
                }
            }
        }
        Ok(StructuredRecord {
            schema: self.schema,
            values,
        })
    }

    fn record_schema(&self) -> &RecordSchema {
        self.schema
            .as_record()
            .expect("RecordBuilder schema is always a record")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::types::Field;

    fn person_schema() -> Arc<Schema> {
        Arc::new(
            Schema::record(
                "Person",
                vec![
                    Field::new("name", Schema::String),
                    Field::new("age", Schema::nullable(Schema::Int32)),
                ],
            )
            .unwrap(),
        )
    }

    #[test]
    fn test_build_with_all_fields() {
        let schema = person_schema();
        let mut builder = StructuredRecord::builder(schema.clone()).unwrap();
        builder
            .set("name", Value::String("Ann".to_string()))
            .unwrap()
            .set("age", Value::I32(30))
            .unwrap();
        let record = builder.build().unwrap();

        assert_eq!(record.get("name"), Some(&Value::String("Ann".to_string())));
        assert_eq!(record.get("age"), Some(&Value::I32(30)));
        assert_eq!(record.get("missing"), None);
    }

    #[test]
    fn test_unset_nullable_resolves_to_null() {
        let mut builder = StructuredRecord::builder(person_schema()).unwrap();
        builder.set("name", Value::String("Ann".to_string())).unwrap();
        let record = builder.build().unwrap();
        assert_eq!(record.get("age"), Some(&Value::Null));
    }

    #[test]
    fn test_unset_non_nullable_fails() {
        let mut builder = StructuredRecord::builder(person_schema()).unwrap();
        builder.set("age", Value::I32(30)).unwrap();
        assert!(matches!(
            builder.build(),
            Err(Error::MissingFieldError(_))
        ));
    }

    #[test]
    fn test_set_unknown_field_fails() {
        let mut builder = StructuredRecord::builder(person_schema()).unwrap();
        assert!(matches!(
            builder.set("height", Value::I32(180)),
            Err(Error::SchemaMismatchError(_))
        ));
    }

    #[test]
    fn test_set_coerces_value() {
        let mut builder = StructuredRecord::builder(person_schema()).unwrap();
        builder.set("name", Value::String("Ann".to_string())).unwrap();
        builder.set("age", Value::I64(30)).unwrap();
        let record = builder.build().unwrap();
        assert_eq!(record.get("age"), Some(&Value::I32(30)));
    }

    #[test]
    fn test_builder_requires_record_schema() {
        assert!(matches!(
            StructuredRecord::builder(Arc::new(Schema::Int32)),
            Err(Error::SchemaMismatchError(_))
        ));
    }

    #[test]
    fn test_convert_and_set() {
        let mut builder = StructuredRecord::builder(person_schema()).unwrap();
        builder.convert_and_set("name", "Ann").unwrap();
        builder.convert_and_set("age", "30").unwrap();
        let record = builder.build().unwrap();
        assert_eq!(record.get("age"), Some(&Value::I32(30)));
    }

    #[test]
    fn test_records_compare_field_by_field() {
        let build = || {
            let mut b = StructuredRecord::builder(person_schema()).unwrap();
            b.set("name", Value::String("Ann".to_string())).unwrap();
            b.build().unwrap()
        };
        assert_eq!(build(), build());
    }
}
