// Fulgur library entry point
//
// Schema-driven record interchange: a recursive schema model, a schema-typed
// record container, and bidirectional codecs between records and two wire
// representations (JSON documents and flat delimited lines).

pub mod codec;
pub mod internal;
pub mod record;
pub mod schema;

pub use codec::{from_delimited, from_json, to_delimited, to_json, JsonDecoder, JsonDecoderConfig};
pub use internal::error::{Error, Result};
pub use record::{RecordBuilder, StructuredRecord, Value};
pub use schema::{Field, RecordSchema, Schema, SchemaGenerator, TypeDescriptor};
