// Delimited-line encoding for flat structured records
//
// Only schemas whose top-level fields are primitives (or nullable primitives)
// are representable. The delimiter is inserted literally with no escaping: a
// field value containing the delimiter corrupts the line, which is a known,
// accepted limitation of this format.

use crate::codec::coerce;
use crate::codec::ensure_flat_schema;
use crate::internal::error::Result;
use crate::record::builder::StructuredRecord;

/// Encodes a record as a single delimited line, in schema field order, with
/// an empty string standing in for null.
pub fn encode_record(record: &StructuredRecord, delimiter: &str) -> Result<String> {
    ensure_flat_schema(record.record_schema(), delimiter)?;

    let mut parts = Vec::with_capacity(record.record_schema().fields().len());
    for (_, value) in record.iter() {
        parts.push(coerce::value_to_text(value)?);
    }
    Ok(parts.join(delimiter))
}
