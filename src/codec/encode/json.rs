// JSON encoding for structured records
//
// Encoding is schema-guided: object keys are emitted in schema field order,
// nullable null fields are written as explicit JSON null, enums write their
// symbolic name, and non-sugar unions are tagged as a single-key object
// keyed by the zero-based index of the resolved member.

use serde_json::{Map, Number, Value as JsonValue};

use crate::codec::coerce;
use crate::internal::error::{Error, Result};
use crate::record::builder::StructuredRecord;
use crate::record::types::{conform, Value};
use crate::schema::types::{RecordEnv, Schema};

/// Encodes a record to a JSON string.
pub fn encode_record(record: &StructuredRecord) -> Result<String> {
    let mut env = RecordEnv::new();
    let json = encode_record_fields(record, &mut env)?;
    Ok(json.to_string())
}

fn encode_record_fields<'a>(
    record: &'a StructuredRecord,
    env: &mut RecordEnv<'a>,
) -> Result<JsonValue> {
    env.push(record.record_schema());
    let result = encode_scoped_fields(record, env);
    env.pop();
    result
}

fn encode_scoped_fields<'a>(
    record: &'a StructuredRecord,
    env: &mut RecordEnv<'a>,
) -> Result<JsonValue> {
    let record_schema = record.record_schema();
    let mut object = Map::with_capacity(record_schema.fields().len());
    for (field, (name, value)) in record_schema.fields().iter().zip(record.iter()) {
        let encoded = encode_value(value, field.schema(), env)?;
        object.insert(name.to_string(), encoded);
    }
    Ok(JsonValue::Object(object))
}

fn encode_value<'a>(
    value: &'a Value,
    schema: &'a Schema,
    env: &mut RecordEnv<'a>,
) -> Result<JsonValue> {
    match (schema, value) {
        (Schema::Null, Value::Null) => Ok(JsonValue::Null),
        (Schema::Boolean, Value::Bool(v)) => Ok(JsonValue::Bool(*v)),
        (Schema::Int8, Value::I8(v)) => Ok(JsonValue::Number(Number::from(*v))),
        (Schema::Int16, Value::I16(v)) => Ok(JsonValue::Number(Number::from(*v))),
        (Schema::Int32, Value::I32(v)) => Ok(JsonValue::Number(Number::from(*v))),
        (Schema::Int64, Value::I64(v)) => Ok(JsonValue::Number(Number::from(*v))),
        (Schema::Float32, Value::F32(v)) => finite_number(f64::from(*v)),
        (Schema::Float64, Value::F64(v)) => finite_number(*v),
        (Schema::String, Value::String(v)) => Ok(JsonValue::String(v.clone())),
        (Schema::Binary, Value::Bytes(v)) => Ok(JsonValue::String(hex::encode(v))),
        (Schema::Enum(_), Value::Enum { symbol, .. }) => Ok(JsonValue::String(symbol.clone())),

        (Schema::Array(element), Value::Array(items)) => {
            let mut encoded = Vec::with_capacity(items.len());
            for item in items {
                encoded.push(encode_value(item, element, env)?);
            }
            Ok(JsonValue::Array(encoded))
        }
        (Schema::Map(_, value_schema), Value::Map(entries)) => {
            let mut object = Map::with_capacity(entries.len());
            for (entry_key, entry_value) in entries {
                let key_text = coerce::value_to_text(entry_key)?;
                object.insert(key_text, encode_value(entry_value, value_schema, env)?);
            }
            Ok(JsonValue::Object(object))
        }

        (Schema::Record(_), Value::Record(nested)) => encode_record_fields(nested, env),
        (Schema::Ref(name), Value::Record(nested)) => {
            // Resolution validates the reference; the nested record carries
            // its own copy of the definition.
            env.resolve(name)?;
            encode_record_fields(nested, env)
        }

        (union @ Schema::Union(members), value) => encode_union(union, members, value, env),

        (schema, Value::Null) => Err(Error::SchemaMismatchError(format!(
            "null value for non-nullable {}",
            schema
        ))),
        (schema, value) => Err(Error::SchemaMismatchError(format!(
            "expected {}, got {} value",
            schema,
            value.type_name()
        ))),
    }
}

fn encode_union<'a>(
    union: &'a Schema,
    members: &'a [Schema],
    value: &'a Value,
    env: &mut RecordEnv<'a>,
) -> Result<JsonValue> {
    if matches!(value, Value::Null) {
        if union.is_nullable() {
            return Ok(JsonValue::Null);
        }
        return Err(Error::SchemaMismatchError(
            "null value for a union without a null member".to_string(),
        ));
    }

    let non_null = union.non_null_union_members();
    if let [sole] = non_null.as_slice() {
        // Nullable sugar: collapse to the plain encoding of the sole branch.
        return encode_value(value, sole, env);
    }

    // True multi-member union: tag with the zero-based member index so decode
    // is unambiguous even when several members share a JSON shape. Builder
    // conformance guarantees a stored value matches one member exactly, so
    // the tag is the first member the value matches without coercion; this
    // keeps the tag stable when member shapes overlap (int64 vs int32).
    for (index, member) in members.iter().enumerate() {
        if matches!(member, Schema::Null) {
            continue;
        }
        if let Ok(conformed) = conform(value.clone(), member) {
            if conformed == *value {
                let mut tagged = Map::with_capacity(1);
                tagged.insert(index.to_string(), encode_value(value, member, env)?);
                return Ok(JsonValue::Object(tagged));
            }
        }
    }
    Err(Error::SchemaMismatchError(format!(
        "{} value does not match any union member",
        value.type_name()
    )))
}

fn finite_number(value: f64) -> Result<JsonValue> {
    Number::from_f64(value)
        .map(JsonValue::Number)
        .ok_or_else(|| {
            Error::CoercionError(format!("non-finite float {} has no JSON form", value))
        })
}
