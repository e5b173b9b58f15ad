// Codec module for the Fulgur record interchange layer
//
// Two wire representations are supported: a JSON document and a flat
// delimited line. Both are schema-guided in each direction and share one
// coercion path, so numeric width and overflow behavior are identical.

pub mod coerce;
pub mod decode;
pub mod encode;

use std::sync::Arc;

pub use self::decode::json::{JsonDecoder, JsonDecoderConfig};

use crate::internal::error::{Error, Result};
use crate::record::builder::StructuredRecord;
use crate::schema::types::{RecordSchema, Schema};

/// Encodes a record to a JSON string.
pub fn to_json(record: &StructuredRecord) -> Result<String> {
    encode::json::encode_record(record)
}

/// Decodes a JSON string into a record conforming to the schema, strictly
/// (unknown keys are rejected; use [`JsonDecoder::with_config`] for leniency).
pub fn from_json(json: &str, schema: &Arc<Schema>) -> Result<StructuredRecord> {
    JsonDecoder::new().decode(json, schema)
}

/// Encodes a record as a single delimited line.
pub fn to_delimited(record: &StructuredRecord, delimiter: &str) -> Result<String> {
    encode::delimited::encode_record(record, delimiter)
}

/// Decodes a single delimited line into a record conforming to the schema.
pub fn from_delimited(
    input: &str,
    delimiter: &str,
    schema: &Arc<Schema>,
) -> Result<StructuredRecord> {
    decode::delimited::decode_record(input, delimiter, schema)
}

/// Validates that a record schema is representable on the delimited wire:
/// every field must be a primitive or a nullable wrapper around exactly one
/// primitive, and the delimiter must be non-empty.
pub(crate) fn ensure_flat_schema(record: &RecordSchema, delimiter: &str) -> Result<()> {
    if delimiter.is_empty() {
        return Err(Error::UnsupportedShapeError(
            "delimiter must not be empty".to_string(),
        ));
    }
    for field in record.fields() {
        let schema = field.schema();
        let flat = if schema.is_primitive() {
            true
        } else if schema.is_nullable() {
            matches!(schema.non_null_union_members().as_slice(), [sole] if sole.is_primitive())
        } else {
            false
        };
        if !flat {
            return Err(Error::UnsupportedShapeError(format!(
                "field '{}' of record '{}' is {}, which has no delimited form",
                field.name(),
                record.name(),
                schema
            )));
        }
    }
    Ok(())
}
