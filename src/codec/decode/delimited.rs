// Delimited-line decoding for flat structured records
//
// The input is split on the literal delimiter, one token per schema field in
// declared order. An empty token means null; non-empty tokens coerce with
// the same numeric width and overflow rules as the JSON decoder.

use std::sync::Arc;

use crate::codec::ensure_flat_schema;
use crate::internal::error::{Error, Result};
use crate::record::builder::StructuredRecord;
use crate::schema::types::Schema;

/// Decodes a single delimited line into a record conforming to the schema.
pub fn decode_record(
    input: &str,
    delimiter: &str,
    schema: &Arc<Schema>,
) -> Result<StructuredRecord> {
    let record_schema = schema.as_record().ok_or_else(|| {
        Error::SchemaMismatchError(format!(
            "delimited decoding requires a record schema, got {}",
            schema
        ))
    })?;
    ensure_flat_schema(record_schema, delimiter)?;

    let tokens: Vec<&str> = input.split(delimiter).collect();
    if tokens.len() != record_schema.fields().len() {
        return Err(Error::FieldCountMismatchError(format!(
            "record '{}' has {} fields but the input has {} tokens",
            record_schema.name(),
            record_schema.fields().len(),
            tokens.len()
        )));
    }

    let mut builder = StructuredRecord::builder(schema.clone())?;
    for (field, token) in record_schema.fields().iter().zip(tokens) {
        if token.is_empty() {
            if !field.schema().is_nullable() {
                return Err(Error::MissingFieldError(format!(
                    "empty token for non-nullable field '{}'",
                    field.name()
                )));
            }
            // Leave the slot unset; build() resolves it to null.
        } else {
            builder.convert_and_set(field.name(), token)?;
        }
    }
    builder.build()
}
