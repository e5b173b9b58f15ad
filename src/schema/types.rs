// Schema type system for the Fulgur record interchange layer
//
// This module defines the recursive Schema model. A Schema is immutable once
// constructed and is shared across records and codecs (typically behind an
// Arc) without synchronization.

use std::collections::HashMap;
use std::fmt;

use crate::internal::error::{Error, Result};

/// Recursive description of a value's shape.
///
/// Self-referential record schemas are represented by a lightweight
/// [`Schema::Ref`] node naming an enclosing record, so a schema is always a
/// finite tree even when it describes a cyclic type graph. Equality and
/// hashing are structural; union member order is significant because it
/// encodes the wire tag order for union resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Schema {
    /// Null type
    Null,
    /// Boolean type
    Boolean,
    /// 8-bit signed integer
    Int8,
    /// 16-bit signed integer
    Int16,
    /// 32-bit signed integer
    Int32,
    /// 64-bit signed integer
    Int64,
    /// 32-bit floating point (IEEE 754)
    Float32,
    /// 64-bit floating point (IEEE 754)
    Float64,
    /// UTF-8 encoded string
    String,
    /// Binary data (raw bytes)
    Binary,
    /// Ordered set of symbolic names; decode maps symbol to ordinal
    Enum(Vec<std::string::String>),
    /// Homogeneous array of one element schema
    Array(Box<Schema>),
    /// Map with one key schema and one value schema
    Map(Box<Schema>, Box<Schema>),
    /// Named record with ordered fields
    Record(RecordSchema),
    /// Ordered union of alternative schemas
    Union(Vec<Schema>),
    /// By-name reference to an enclosing named record (cycle breaker)
    Ref(std::string::String),
}

/// A named field within a record schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Field {
    name: String,
    schema: Schema,
}

impl Field {
    /// Creates a new field.
    pub fn new(name: impl Into<String>, schema: Schema) -> Self {
        Self {
            name: name.into(),
            schema,
        }
    }

    /// Returns the field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the field schema.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }
}

/// A named record shape: ordered fields with unique names.
///
/// Fields are private so a record schema cannot be mutated after
/// construction; build one through [`Schema::record`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordSchema {
    name: String,
    fields: Vec<Field>,
}

impl RecordSchema {
    /// Returns the record name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the fields in declared order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Looks up a field by name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Returns the positional index of a field by name.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}

impl Schema {
    /// Creates a record schema, validating that field names are unique.
    pub fn record(name: impl Into<String>, fields: Vec<Field>) -> Result<Schema> {
        let name = name.into();
        let mut seen: HashMap<&str, ()> = HashMap::new();
        for field in &fields {
            if seen.insert(field.name(), ()).is_some() {
                return Err(Error::SchemaDefinitionError(format!(
                    "duplicate field '{}' in record '{}'",
                    field.name(),
                    name
                )));
            }
        }
        Ok(Schema::Record(RecordSchema { name, fields }))
    }

    /// Creates a union schema, validating that it has at least one member.
    pub fn union(members: Vec<Schema>) -> Result<Schema> {
        if members.is_empty() {
            return Err(Error::SchemaDefinitionError(
                "union must have at least one member".to_string(),
            ));
        }
        Ok(Schema::Union(members))
    }

    /// Creates an enum schema, validating the symbol set is non-empty and
    /// free of duplicates.
    pub fn enum_with(symbols: Vec<String>) -> Result<Schema> {
        if symbols.is_empty() {
            return Err(Error::SchemaDefinitionError(
                "enum must have at least one symbol".to_string(),
            ));
        }
        let mut seen: HashMap<&str, ()> = HashMap::new();
        for symbol in &symbols {
            if seen.insert(symbol.as_str(), ()).is_some() {
                return Err(Error::SchemaDefinitionError(format!(
                    "duplicate enum symbol '{}'",
                    symbol
                )));
            }
        }
        Ok(Schema::Enum(symbols))
    }

    /// Creates an array schema.
    pub fn array(element: Schema) -> Schema {
        Schema::Array(Box::new(element))
    }

    /// Creates a map schema.
    pub fn map(key: Schema, value: Schema) -> Schema {
        Schema::Map(Box::new(key), Box::new(value))
    }

    /// Sugar for `union(null, inner)`. Codecs recognize this shape specially:
    /// it collapses to "absent or JSON null" on the wire rather than a tagged
    /// union.
    pub fn nullable(inner: Schema) -> Schema {
        if inner.is_nullable() {
            return inner;
        }
        Schema::Union(vec![Schema::Null, inner])
    }

    /// Returns true if this schema is a union containing a null member.
    pub fn is_nullable(&self) -> bool {
        match self {
            Schema::Union(members) => members.iter().any(|m| matches!(m, Schema::Null)),
            _ => false,
        }
    }

    /// Returns the union members that are not null.
    pub fn non_null_union_members(&self) -> Vec<&Schema> {
        match self {
            Schema::Union(members) => members
                .iter()
                .filter(|m| !matches!(m, Schema::Null))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Returns true if this schema is a scalar primitive.
    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            Schema::Null
                | Schema::Boolean
                | Schema::Int8
                | Schema::Int16
                | Schema::Int32
                | Schema::Int64
                | Schema::Float32
                | Schema::Float64
                | Schema::String
                | Schema::Binary
        )
    }

    /// Returns true if this schema is an integer primitive.
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            Schema::Int8 | Schema::Int16 | Schema::Int32 | Schema::Int64
        )
    }

    /// Returns true if this schema is a floating point primitive.
    pub fn is_float(&self) -> bool {
        matches!(self, Schema::Float32 | Schema::Float64)
    }

    /// Returns the record shape if this schema is a record.
    pub fn as_record(&self) -> Option<&RecordSchema> {
        match self {
            Schema::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Resolves an enum symbol to its ordinal.
    pub fn enum_ordinal(&self, symbol: &str) -> Option<usize> {
        match self {
            Schema::Enum(symbols) => symbols.iter().position(|s| s == symbol),
            _ => None,
        }
    }

    /// Resolves an enum ordinal to its symbol.
    pub fn enum_symbol(&self, ordinal: usize) -> Option<&str> {
        match self {
            Schema::Enum(symbols) => symbols.get(ordinal).map(|s| s.as_str()),
            _ => None,
        }
    }

    /// Short tag name for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Schema::Null => "null",
            Schema::Boolean => "boolean",
            Schema::Int8 => "int8",
            Schema::Int16 => "int16",
            Schema::Int32 => "int32",
            Schema::Int64 => "int64",
            Schema::Float32 => "float32",
            Schema::Float64 => "float64",
            Schema::String => "string",
            Schema::Binary => "binary",
            Schema::Enum(_) => "enum",
            Schema::Array(_) => "array",
            Schema::Map(_, _) => "map",
            Schema::Record(_) => "record",
            Schema::Union(_) => "union",
            Schema::Ref(_) => "ref",
        }
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Schema::Record(record) => write!(f, "record '{}'", record.name()),
            Schema::Ref(name) => write!(f, "ref '{}'", name),
            other => f.write_str(other.type_name()),
        }
    }
}

/// Resolution environment for [`Schema::Ref`] nodes.
///
/// Any recursive walk over a schema (encode, decode) pushes each record as it
/// descends into its subtree and pops it on the way back out, so a `Ref`
/// resolves only to an enclosing definition, never to a sibling record the
/// walk happened to visit earlier. Inner definitions shadow outer ones of the
/// same name.
#[derive(Debug, Default)]
pub struct RecordEnv<'a> {
    records: Vec<&'a RecordSchema>,
}

impl<'a> RecordEnv<'a> {
    /// Creates an empty environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Brings a record definition into scope for its subtree.
    pub fn push(&mut self, record: &'a RecordSchema) {
        self.records.push(record);
    }

    /// Takes the innermost definition back out of scope.
    pub fn pop(&mut self) {
        self.records.pop();
    }

    /// Resolves a record reference to the innermost enclosing definition.
    pub fn resolve(&self, name: &str) -> Result<&'a RecordSchema> {
        self.records
            .iter()
            .rev()
            .find(|record| record.name() == name)
            .copied()
            .ok_or_else(|| {
                Error::SchemaDefinitionError(format!("unresolved record reference '{}'", name))
            })
    }
}
