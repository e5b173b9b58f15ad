// Coercion between loosely-typed wire values and schema primitives
//
// Both codecs funnel through this module so numeric width and overflow rules
// are identical for JSON numbers and delimited text tokens.

use bytes::Bytes;
use serde_json::Number;

use crate::internal::error::{Error, Result};
use crate::record::types::{conform, Value};
use crate::schema::types::Schema;

/// Coerces a JSON number into the target primitive, checking that the value
/// fits the target width.
pub fn json_number_to_value(number: &Number, target: &Schema) -> Result<Value> {
    if target.is_integer() {
        if let Some(wide) = number.as_i64() {
            return conform(Value::I64(wide), target);
        }
        if number.as_u64().is_some() {
            // Positive and beyond i64::MAX, so beyond every signed width.
            return Err(Error::CoercionError(format!(
                "value {} does not fit in {}",
                number, target
            )));
        }
        // A float-typed JSON number may still be integral (e.g. 3.0).
        let float = number.as_f64().unwrap_or(f64::NAN);
        if float.fract() == 0.0 && float >= i64::MIN as f64 && float <= i64::MAX as f64 {
            return conform(Value::I64(float as i64), target);
        }
        return Err(Error::CoercionError(format!(
            "JSON number {} is not a valid {}",
            number, target
        )));
    }

    match target {
        Schema::Float64 => {
            let float = number.as_f64().ok_or_else(|| {
                Error::CoercionError(format!("JSON number {} is not a valid float64", number))
            })?;
            Ok(Value::F64(float))
        }
        Schema::Float32 => {
            let float = number.as_f64().ok_or_else(|| {
                Error::CoercionError(format!("JSON number {} is not a valid float32", number))
            })?;
            let narrowed = float as f32;
            if narrowed.is_infinite() && float.is_finite() {
                return Err(Error::CoercionError(format!(
                    "value {} does not fit in float32",
                    number
                )));
            }
            Ok(Value::F32(narrowed))
        }
        other => Err(Error::CoercionError(format!(
            "JSON number {} cannot be coerced to {}",
            number, other
        ))),
    }
}

/// Coerces a text token into the target schema.
///
/// Used by the delimited decoder, by `RecordBuilder::convert_and_set`, and
/// for map keys on the JSON path. An empty token only ever means null and is
/// handled by the caller; here it is parsed like any other token.
pub fn text_to_value(token: &str, target: &Schema) -> Result<Value> {
    let parse_error = |width: &str, detail: &dyn std::fmt::Display| {
        Error::CoercionError(format!("cannot parse '{}' as {}: {}", token, width, detail))
    };
    match target {
        Schema::Boolean => match token {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => Err(Error::CoercionError(format!(
                "cannot parse '{}' as boolean",
                token
            ))),
        },
        Schema::Int8 => token
            .parse::<i8>()
            .map(Value::I8)
            .map_err(|e| parse_error("int8", &e)),
        Schema::Int16 => token
            .parse::<i16>()
            .map(Value::I16)
            .map_err(|e| parse_error("int16", &e)),
        Schema::Int32 => token
            .parse::<i32>()
            .map(Value::I32)
            .map_err(|e| parse_error("int32", &e)),
        Schema::Int64 => token
            .parse::<i64>()
            .map(Value::I64)
            .map_err(|e| parse_error("int64", &e)),
        Schema::Float32 => token
            .parse::<f32>()
            .map(Value::F32)
            .map_err(|e| parse_error("float32", &e)),
        Schema::Float64 => token
            .parse::<f64>()
            .map(Value::F64)
            .map_err(|e| parse_error("float64", &e)),
        Schema::String => Ok(Value::String(token.to_string())),
        Schema::Binary => hex::decode(token)
            .map(|bytes| Value::Bytes(Bytes::from(bytes)))
            .map_err(|e| parse_error("binary (hex)", &e)),
        schema @ Schema::Enum(_) => match schema.enum_ordinal(token) {
            Some(ordinal) => Ok(Value::Enum {
                symbol: token.to_string(),
                ordinal,
            }),
            None => Err(Error::CoercionError(format!(
                "'{}' is not a symbol of {}",
                token, schema
            ))),
        },
        schema @ Schema::Union(_) => {
            let members = schema.non_null_union_members();
            match members.as_slice() {
                [sole] => text_to_value(token, sole),
                _ => Err(Error::CoercionError(format!(
                    "cannot convert text into a union with {} non-null members",
                    members.len()
                ))),
            }
        }
        other => Err(Error::CoercionError(format!(
            "cannot convert text to {}",
            other
        ))),
    }
}

/// Renders a value in its canonical text form: integers in decimal, floats
/// via their shortest round-trippable form, booleans as `true`/`false`,
/// binary as lowercase hex, enums as their symbol. Null renders empty.
pub fn value_to_text(value: &Value) -> Result<String> {
    match value {
        Value::Null => Ok(String::new()),
        Value::Bool(v) => Ok(v.to_string()),
        Value::I8(v) => Ok(v.to_string()),
        Value::I16(v) => Ok(v.to_string()),
        Value::I32(v) => Ok(v.to_string()),
        Value::I64(v) => Ok(v.to_string()),
        Value::F32(v) => Ok(v.to_string()),
        Value::F64(v) => Ok(v.to_string()),
        Value::String(v) => Ok(v.clone()),
        Value::Bytes(v) => Ok(hex::encode(v)),
        Value::Enum { symbol, .. } => Ok(symbol.clone()),
        other => Err(Error::CoercionError(format!(
            "{} value has no canonical text form",
            other.type_name()
        ))),
    }
}
