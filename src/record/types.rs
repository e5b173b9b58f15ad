// Value type system for structured records
//
// A Value is the polymorphic slot type carried by a StructuredRecord: one tag
// per schema kind, so codec and builder logic is an exhaustive match the
// compiler checks for completeness.

use bytes::Bytes;

use crate::internal::error::{Error, Result};
use crate::record::builder::StructuredRecord;
use crate::schema::types::Schema;

/// A single record field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    String(String),
    /// Raw bytes, zero-copy
    Bytes(Bytes),
    /// Resolved enum value: symbolic name plus its ordinal in the symbol set
    Enum { symbol: String, ordinal: usize },
    /// Ordered sequence of values
    Array(Vec<Value>),
    /// Ordered sub-mapping (insertion order preserved)
    Map(Vec<(Value, Value)>),
    /// Nested record
    Record(StructuredRecord),
}

impl Value {
    /// Short tag name for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::I8(_) => "int8",
            Value::I16(_) => "int16",
            Value::I32(_) => "int32",
            Value::I64(_) => "int64",
            Value::F32(_) => "float32",
            Value::F64(_) => "float64",
            Value::String(_) => "string",
            Value::Bytes(_) => "binary",
            Value::Enum { .. } => "enum",
            Value::Array(_) => "array",
            Value::Map(_) => "map",
            Value::Record(_) => "record",
        }
    }

    fn as_i64(&self) -> Option<i64> {
        match self {
            Value::I8(v) => Some(i64::from(*v)),
            Value::I16(v) => Some(i64::from(*v)),
            Value::I32(v) => Some(i64::from(*v)),
            Value::I64(v) => Some(*v),
            _ => None,
        }
    }
}

/// Coerces a value into the given schema, returning the conforming value.
///
/// Integer values convert across widths with an overflow check; `F32` widens
/// to `F64` (the reverse is checked for range); strings resolve against enum
/// symbol sets. Union members are tried in declared order, but a member the
/// value already matches without coercion wins over one that would change it,
/// so a value carrying an explicit member type keeps it. Everything else must
/// match the schema kind exactly.
pub fn conform(value: Value, schema: &Schema) -> Result<Value> {
    match (schema, value) {
        (Schema::Null, Value::Null) => Ok(Value::Null),
        (Schema::Boolean, Value::Bool(v)) => Ok(Value::Bool(v)),
        (Schema::String, Value::String(v)) => Ok(Value::String(v)),
        (Schema::Binary, Value::Bytes(v)) => Ok(Value::Bytes(v)),

        (target, value) if target.is_integer() && value.as_i64().is_some() => {
            let wide = value.as_i64().unwrap();
            integer_of_width(wide, target)
        }
        (Schema::Float32, Value::F32(v)) => Ok(Value::F32(v)),
        (Schema::Float32, Value::F64(v)) => {
            let narrowed = v as f32;
            if narrowed.is_infinite() && v.is_finite() {
                return Err(Error::CoercionError(format!(
                    "value {} does not fit in float32",
                    v
                )));
            }
            Ok(Value::F32(narrowed))
        }
        (Schema::Float64, Value::F32(v)) => Ok(Value::F64(f64::from(v))),
        (Schema::Float64, Value::F64(v)) => Ok(Value::F64(v)),
        (target, value) if target.is_float() && value.as_i64().is_some() => {
            let wide = value.as_i64().unwrap() as f64;
            match target {
                Schema::Float32 => Ok(Value::F32(wide as f32)),
                _ => Ok(Value::F64(wide)),
            }
        }

        (schema @ Schema::Enum(_), Value::String(symbol)) => {
            match schema.enum_ordinal(&symbol) {
                Some(ordinal) => Ok(Value::Enum { symbol, ordinal }),
                None => Err(Error::CoercionError(format!(
                    "'{}' is not a symbol of {}",
                    symbol, schema
                ))),
            }
        }
        (schema @ Schema::Enum(_), Value::Enum { symbol, .. }) => {
            match schema.enum_ordinal(&symbol) {
                Some(ordinal) => Ok(Value::Enum { symbol, ordinal }),
                None => Err(Error::CoercionError(format!(
                    "'{}' is not a symbol of {}",
                    symbol, schema
                ))),
            }
        }

        (Schema::Array(element), Value::Array(items)) => {
            let mut conformed = Vec::with_capacity(items.len());
            for item in items {
                conformed.push(conform(item, element)?);
            }
            Ok(Value::Array(conformed))
        }
        (Schema::Map(key, value), Value::Map(entries)) => {
            let mut conformed = Vec::with_capacity(entries.len());
            for (entry_key, entry_value) in entries {
                conformed.push((conform(entry_key, key)?, conform(entry_value, value)?));
            }
            Ok(Value::Map(conformed))
        }

        (Schema::Record(expected), Value::Record(record)) => {
            let actual = record.record_schema();
            if actual != expected {
                return Err(Error::SchemaMismatchError(format!(
                    "nested record '{}' does not match field record '{}'",
                    actual.name(),
                    expected.name()
                )));
            }
            Ok(Value::Record(record))
        }
        // A reference resolves by name: the nested record must carry the
        // named definition, which the enclosing schema guarantees is in scope.
        (Schema::Ref(name), Value::Record(record)) => {
            if record.record_schema().name() != name {
                return Err(Error::SchemaMismatchError(format!(
                    "nested record '{}' does not match reference to '{}'",
                    record.record_schema().name(),
                    name
                )));
            }
            Ok(Value::Record(record))
        }

        (Schema::Union(members), value) => {
            if matches!(value, Value::Null) {
                if members.iter().any(|m| matches!(m, Schema::Null)) {
                    return Ok(Value::Null);
                }
                return Err(Error::SchemaMismatchError(
                    "null value for a union without a null member".to_string(),
                ));
            }
            // Exact pass first: a member the value matches as-is keeps the
            // value's member type, so e.g. an int32 in a (int64, int32)
            // union is not silently widened into the earlier member.
            for member in members {
                if let Ok(conformed) = conform(value.clone(), member) {
                    if conformed == value {
                        return Ok(conformed);
                    }
                }
            }
            for member in members {
                if let Ok(conformed) = conform(value.clone(), member) {
                    return Ok(conformed);
                }
            }
            Err(Error::SchemaMismatchError(format!(
                "{} value does not match any union member",
                value.type_name()
            )))
        }

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

fn integer_of_width(wide: i64, target: &Schema) -> Result<Value> {
    let out_of_range = |width: &str| {
        Error::CoercionError(format!("value {} does not fit in {}", wide, width))
    };
    match target {
        Schema::Int8 => i8::try_from(wide)
            .map(Value::I8)
            .map_err(|_| out_of_range("int8")),
        Schema::Int16 => i16::try_from(wide)
            .map(Value::I16)
            .map_err(|_| out_of_range("int16")),
        Schema::Int32 => i32::try_from(wide)
            .map(Value::I32)
            .map_err(|_| out_of_range("int32")),
        Schema::Int64 => Ok(Value::I64(wide)),
        other => Err(Error::SchemaMismatchError(format!(
            "expected {}, got integer value",
            other
        ))),
    }
}
