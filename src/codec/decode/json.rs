// Schema-guided JSON decoding for structured records
//
// The decoder walks the schema in lock-step with the parsed JSON document:
// JSON's type system is coarser than the schema's (no integer widths, no
// enums, no union tags), so the schema drives every coercion. Decoding is
// all-or-nothing; any failure discards the in-progress builder.

use std::sync::Arc;

use serde_json::Value as JsonValue;

use crate::codec::coerce;
use crate::internal::error::{Error, Result};
use crate::record::builder::StructuredRecord;
use crate::record::types::Value;
use crate::schema::types::{RecordEnv, RecordSchema, Schema};

/// Configuration for JSON decoding.
#[derive(Debug, Clone)]
pub struct JsonDecoderConfig {
    /// Whether to discard JSON object keys that are not present in the
    /// schema. When false, an unknown key is a schema mismatch.
    pub lenient: bool,
}

impl Default for JsonDecoderConfig {
    fn default() -> Self {
        Self { lenient: false }
    }
}

/// Schema-guided JSON decoder.
#[derive(Debug, Default)]
pub struct JsonDecoder {
    config: JsonDecoderConfig,
}

impl JsonDecoder {
    /// Creates a strict decoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a decoder with custom configuration.
    pub fn with_config(config: JsonDecoderConfig) -> Self {
        Self { config }
    }

    /// Decodes a JSON document into a record conforming to the schema.
    ///
    /// Malformed or truncated JSON fails with `StreamError` before any
    /// schema-guided work begins.
    pub fn decode(&self, json: &str, schema: &Arc<Schema>) -> Result<StructuredRecord> {
        let parsed: JsonValue = serde_json::from_str(json)?;
        let record_schema = schema.as_record().ok_or_else(|| {
            Error::SchemaMismatchError(format!(
                "JSON decoding requires a record schema, got {}",
                schema
            ))
        })?;
        let mut env = RecordEnv::new();
        self.decode_record(&parsed, record_schema, schema.clone(), &mut env)
    }

    fn decode_record<'a>(
        &self,
        json: &JsonValue,
        record_schema: &'a RecordSchema,
        schema: Arc<Schema>,
        env: &mut RecordEnv<'a>,
    ) -> Result<StructuredRecord> {
        env.push(record_schema);
        let result = self.decode_scoped_record(json, record_schema, schema, env);
        env.pop();
        result
    }

    fn decode_scoped_record<'a>(
        &self,
        json: &JsonValue,
        record_schema: &'a RecordSchema,
        schema: Arc<Schema>,
        env: &mut RecordEnv<'a>,
    ) -> Result<StructuredRecord> {
        let object = match json {
            JsonValue::Object(object) => object,
            other => {
                return Err(Error::SchemaMismatchError(format!(
                    "expected JSON object for record '{}', got {}",
                    record_schema.name(),
                    json_kind(other)
                )))
            }
        };

        let mut builder = StructuredRecord::builder(schema)?;
        for field in record_schema.fields() {
            match object.get(field.name()) {
                Some(value) => {
                    let decoded = self.decode_value(value, field.schema(), env)?;
                    builder.set(field.name(), decoded)?;
                }
                // Field absent: permitted only when nullable; build() resolves
                // the unset slot to null.
                None if field.schema().is_nullable() => {}
                None => {
                    return Err(Error::MissingFieldError(format!(
                        "non-nullable field '{}' of record '{}' is absent",
                        field.name(),
                        record_schema.name()
                    )))
                }
            }
        }

        if !self.config.lenient {
            for key in object.keys() {
                if record_schema.field(key).is_none() {
                    return Err(Error::SchemaMismatchError(format!(
                        "unknown field '{}' for record '{}'",
                        key,
                        record_schema.name()
                    )));
                }
            }
        }

        builder.build()
    }

    fn decode_value<'a>(
        &self,
        json: &JsonValue,
        schema: &'a Schema,
        env: &mut RecordEnv<'a>,
    ) -> Result<Value> {
        match schema {
            Schema::Null => match json {
                JsonValue::Null => Ok(Value::Null),
                other => Err(Error::CoercionError(format!(
                    "expected JSON null, got {}",
                    json_kind(other)
                ))),
            },
            Schema::Boolean => match json {
                JsonValue::Bool(v) => Ok(Value::Bool(*v)),
                other => Err(Error::CoercionError(format!(
                    "expected JSON boolean, got {}",
                    json_kind(other)
                ))),
            },
            target if target.is_integer() || target.is_float() => match json {
                JsonValue::Number(number) => coerce::json_number_to_value(number, target),
                other => Err(Error::CoercionError(format!(
                    "expected JSON number for {}, got {}",
                    target,
                    json_kind(other)
                ))),
            },
            Schema::String => match json {
                JsonValue::String(v) => Ok(Value::String(v.clone())),
                other => Err(Error::CoercionError(format!(
                    "expected JSON string, got {}",
                    json_kind(other)
                ))),
            },
            Schema::Binary => match json {
                JsonValue::String(v) => coerce::text_to_value(v, &Schema::Binary),
                other => Err(Error::CoercionError(format!(
                    "expected hex string for binary, got {}",
                    json_kind(other)
                ))),
            },
            Schema::Enum(_) => match json {
                JsonValue::String(symbol) => coerce::text_to_value(symbol, schema),
                other => Err(Error::CoercionError(format!(
                    "expected enum symbol string, got {}",
                    json_kind(other)
                ))),
            },
            Schema::Array(element) => match json {
                JsonValue::Array(items) => {
                    let mut decoded = Vec::with_capacity(items.len());
                    for item in items {
                        decoded.push(self.decode_value(item, element, env)?);
                    }
                    Ok(Value::Array(decoded))
                }
                other => Err(Error::SchemaMismatchError(format!(
                    "expected JSON array, got {}",
                    json_kind(other)
                ))),
            },
            Schema::Map(key_schema, value_schema) => match json {
                JsonValue::Object(object) => {
                    let mut entries = Vec::with_capacity(object.len());
                    for (key, value) in object {
                        let decoded_key = coerce::text_to_value(key, key_schema)?;
                        let decoded_value = self.decode_value(value, value_schema, env)?;
                        entries.push((decoded_key, decoded_value));
                    }
                    Ok(Value::Map(entries))
                }
                other => Err(Error::SchemaMismatchError(format!(
                    "expected JSON object for map, got {}",
                    json_kind(other)
                ))),
            },
            Schema::Record(record_schema) => {
                let nested_schema = Arc::new(Schema::Record(record_schema.clone()));
                let nested = self.decode_record(json, record_schema, nested_schema, env)?;
                Ok(Value::Record(nested))
            }
            Schema::Ref(name) => {
                let record_schema = env.resolve(name)?;
                let nested_schema = Arc::new(Schema::Record(record_schema.clone()));
                let nested = self.decode_record(json, record_schema, nested_schema, env)?;
                Ok(Value::Record(nested))
            }
            Schema::Union(members) => self.decode_union(json, schema, members, env),
            // Primitive arms above are exhaustive; this is unreachable but
            // keeps the match total without a panic.
            other => Err(Error::SchemaMismatchError(format!(
                "cannot decode into {}",
                other
            ))),
        }
    }

    fn decode_union<'a>(
        &self,
        json: &JsonValue,
        union: &'a Schema,
        members: &'a [Schema],
        env: &mut RecordEnv<'a>,
    ) -> Result<Value> {
        if matches!(json, JsonValue::Null) {
            if union.is_nullable() {
                return Ok(Value::Null);
            }
            return Err(Error::SchemaMismatchError(
                "JSON null for a union without a null member".to_string(),
            ));
        }

        let non_null = union.non_null_union_members();
        if let [sole] = non_null.as_slice() {
            // Nullable sugar: decode straight into the sole non-null branch.
            return self.decode_value(json, sole, env);
        }

        // True multi-member union: require the tagged single-key-object form,
        // keyed by the zero-based member index.
        if let JsonValue::Object(object) = json {
            if object.len() == 1 {
                let (key, inner) = object.iter().next().expect("len checked");
                if let Ok(index) = key.parse::<usize>() {
                    let member = members.get(index).ok_or_else(|| {
                        Error::SchemaMismatchError(format!(
                            "union tag {} out of range for {} members",
                            index,
                            members.len()
                        ))
                    })?;
                    return self.decode_value(inner, member, env);
                }
            }
        }
        Err(Error::SchemaMismatchError(format!(
            "union with {} non-null members requires the tagged object form",
            non_null.len()
        )))
    }
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
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
    fn test_decode_basic_record() {
        let schema = person_schema();
        let record = JsonDecoder::new()
            .decode(r#"{"name":"Ann","age":30}"#, &schema)
            .unwrap();
        assert_eq!(record.get("name"), Some(&Value::String("Ann".to_string())));
        assert_eq!(record.get("age"), Some(&Value::I32(30)));
    }

    #[test]
    fn test_absent_nullable_field_decodes_to_null() {
        let schema = person_schema();
        let record = JsonDecoder::new().decode(r#"{"name":"Ann"}"#, &schema).unwrap();
        assert_eq!(record.get("age"), Some(&Value::Null));
    }

    #[test]
    fn test_absent_non_nullable_field_fails() {
        let schema = person_schema();
        assert!(matches!(
            JsonDecoder::new().decode(r#"{"age":30}"#, &schema),
            Err(Error::MissingFieldError(_))
        ));
    }

    #[test]
    fn test_integer_width_boundary() {
        let schema = Arc::new(
            Schema::record(
                "Widths",
                vec![
                    Field::new("narrow", Schema::nullable(Schema::Int32)),
                    Field::new("wide", Schema::nullable(Schema::Int64)),
                ],
            )
            .unwrap(),
        );
        assert!(matches!(
            JsonDecoder::new().decode(r#"{"narrow":2147483648}"#, &schema),
            Err(Error::CoercionError(_))
        ));
        let record = JsonDecoder::new()
            .decode(r#"{"wide":2147483648}"#, &schema)
            .unwrap();
        assert_eq!(record.get("wide"), Some(&Value::I64(2_147_483_648)));
    }

    #[test]
    fn test_unknown_key_strict_vs_lenient() {
        let schema = person_schema();
        let input = r#"{"name":"Ann","age":30,"extra":true}"#;
        assert!(matches!(
            JsonDecoder::new().decode(input, &schema),
            Err(Error::SchemaMismatchError(_))
        ));
        let lenient = JsonDecoder::with_config(JsonDecoderConfig { lenient: true });
        let record = lenient.decode(input, &schema).unwrap();
        assert_eq!(record.get("name"), Some(&Value::String("Ann".to_string())));
    }

    #[test]
    fn test_truncated_document_is_stream_error() {
        let schema = person_schema();
        assert!(matches!(
            JsonDecoder::new().decode(r#"{"name":"Ann""#, &schema),
            Err(Error::StreamError(_))
        ));
    }

    #[test]
    fn test_wrong_shape_is_mismatch() {
        let schema = person_schema();
        assert!(matches!(
            JsonDecoder::new().decode(r#"[1,2,3]"#, &schema),
            Err(Error::SchemaMismatchError(_))
        ));
    }

    #[test]
    fn test_enum_symbol_resolves_to_ordinal() {
        let schema = Arc::new(
            Schema::record(
                "Light",
                vec![Field::new(
                    "color",
                    Schema::enum_with(vec!["RED".to_string(), "GREEN".to_string()]).unwrap(),
                )],
            )
            .unwrap(),
        );
        let record = JsonDecoder::new()
            .decode(r#"{"color":"GREEN"}"#, &schema)
            .unwrap();
        assert_eq!(
            record.get("color"),
            Some(&Value::Enum {
                symbol: "GREEN".to_string(),
                ordinal: 1
            })
        );
        assert!(matches!(
            JsonDecoder::new().decode(r#"{"color":"BLUE"}"#, &schema),
            Err(Error::CoercionError(_))
        ));
    }

    #[test]
    fn test_multi_member_union_requires_tag() {
        let schema = Arc::new(
            Schema::record(
                "Holder",
                vec![Field::new(
                    "value",
                    Schema::union(vec![Schema::Int32, Schema::String]).unwrap(),
                )],
            )
            .unwrap(),
        );
        let record = JsonDecoder::new()
            .decode(r#"{"value":{"1":"x"}}"#, &schema)
            .unwrap();
        assert_eq!(record.get("value"), Some(&Value::String("x".to_string())));

        // Untagged form is rejected when more than one non-null member exists.
        assert!(matches!(
            JsonDecoder::new().decode(r#"{"value":"x"}"#, &schema),
            Err(Error::SchemaMismatchError(_))
        ));
    }

    #[test]
    fn test_float64_decode_inverts_encode_exactly() {
        let schema = Arc::new(
            Schema::record("Metric", vec![Field::new("ratio", Schema::Float64)]).unwrap(),
        );
        // A 17-significant-digit value: the shortest text form must parse
        // back to the identical f64 bits.
        let mut builder = StructuredRecord::builder(schema.clone()).unwrap();
        builder.set("ratio", Value::F64(193666155276669.66)).unwrap();
        let record = builder.build().unwrap();
        let json = crate::codec::encode::json::encode_record(&record).unwrap();
        assert_eq!(JsonDecoder::new().decode(&json, &schema).unwrap(), record);
    }

    #[test]
    fn test_union_tag_picks_member_despite_overlap() {
        // 5 fits both widths; the explicit tag decides, and the decoded
        // value keeps the tagged member's type.
        let schema = Arc::new(
            Schema::record(
                "Holder",
                vec![Field::new(
                    "value",
                    Schema::union(vec![Schema::Int64, Schema::Int32]).unwrap(),
                )],
            )
            .unwrap(),
        );
        let record = JsonDecoder::new()
            .decode(r#"{"value":{"1":5}}"#, &schema)
            .unwrap();
        assert_eq!(record.get("value"), Some(&Value::I32(5)));

        let record = JsonDecoder::new()
            .decode(r#"{"value":{"0":5}}"#, &schema)
            .unwrap();
        assert_eq!(record.get("value"), Some(&Value::I64(5)));
    }

    #[test]
    fn test_ref_does_not_resolve_to_sibling_record() {
        // "Pet" is defined under field "a" and referenced under field "b";
        // the definition is out of scope once the walk leaves "a".
        let pet = Schema::record("Pet", vec![Field::new("name", Schema::String)]).unwrap();
        let schema = Arc::new(
            Schema::record(
                "Outer",
                vec![
                    Field::new("a", pet),
                    Field::new("b", Schema::Ref("Pet".to_string())),
                ],
            )
            .unwrap(),
        );
        assert!(matches!(
            JsonDecoder::new().decode(r#"{"a":{"name":"x"},"b":{"name":"y"}}"#, &schema),
            Err(Error::SchemaDefinitionError(_))
        ));
    }

    #[test]
    fn test_self_referential_record_decodes() {
        let schema = Arc::new(
            Schema::record(
                "Node",
                vec![
                    Field::new("value", Schema::Int64),
                    Field::new(
                        "next",
                        Schema::nullable(Schema::Ref("Node".to_string())),
                    ),
                ],
            )
            .unwrap(),
        );
        let record = JsonDecoder::new()
            .decode(
                r#"{"value":1,"next":{"value":2,"next":null}}"#,
                &schema,
            )
            .unwrap();
        match record.get("next") {
            Some(Value::Record(next)) => {
                assert_eq!(next.get("value"), Some(&Value::I64(2)));
                assert_eq!(next.get("next"), Some(&Value::Null));
            }
            other => panic!("expected nested record, got {:?}", other),
        }
    }
}
