// Schema generation from native type descriptors
//
// The concrete reflection mechanism is a host-language concern; it feeds this
// module a TypeDescriptor tree (plus named registrations for composite types
// that reference each other). The generator itself is descriptor-agnostic.

use std::collections::{HashMap, HashSet};

use crate::internal::error::{Error, Result};
use crate::schema::types::{Field, Schema};

/// Description of a native type, as reported by a reflection front-end.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDescriptor {
    /// Boolean
    Boolean,
    /// 8-bit signed integer
    Int8,
    /// 16-bit signed integer
    Int16,
    /// 32-bit signed integer
    Int32,
    /// 64-bit signed integer
    Int64,
    /// 32-bit floating point
    Float32,
    /// 64-bit floating point
    Float64,
    /// UTF-8 string
    String,
    /// Raw bytes
    Binary,
    /// An optional/nullable native field
    Optional(Box<TypeDescriptor>),
    /// A native collection with one element type
    List(Box<TypeDescriptor>),
    /// A native keyed collection (key type, value type)
    KeyedCollection(Box<TypeDescriptor>, Box<TypeDescriptor>),
    /// A native enumerated type
    Enumeration { name: String, symbols: Vec<String> },
    /// A composite (struct/class) type with named fields in declaration order
    Composite {
        name: String,
        fields: Vec<(String, TypeDescriptor)>,
    },
    /// A by-name reference to a registered composite or enumeration, used for
    /// self-referential and mutually-recursive native types
    Named(String),
    /// A member type with no schema mapping (function type, raw handle, ...)
    Unsupported(String),
}

/// Generates a [`Schema`] from a [`TypeDescriptor`].
///
/// The generator is deterministic: the same descriptor always yields an equal
/// schema, with field order equal to declaration order. A visited set keyed
/// by composite name breaks cycles, producing a [`Schema::Ref`] for a
/// composite that is encountered again while its own schema is still being
/// generated.
#[derive(Debug, Default)]
pub struct SchemaGenerator {
    registry: HashMap<String, TypeDescriptor>,
}

impl SchemaGenerator {
    /// Creates a generator with an empty type registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a named composite or enumeration so `Named` references to it
    /// can be resolved.
    pub fn register(&mut self, descriptor: TypeDescriptor) -> Result<()> {
        let name = match &descriptor {
            TypeDescriptor::Composite { name, .. } => name.clone(),
            TypeDescriptor::Enumeration { name, .. } => name.clone(),
            other => {
                return Err(Error::UnsupportedTypeError(format!(
                    "only composite and enumeration types can be registered, got {:?}",
                    other
                )))
            }
        };
        self.registry.insert(name, descriptor);
        Ok(())
    }

    /// Generates a schema for the given native type descriptor.
    pub fn generate(&self, descriptor: &TypeDescriptor) -> Result<Schema> {
        let mut in_progress = HashSet::new();
        self.generate_type(descriptor, &mut in_progress)
    }

    fn generate_type(
        &self,
        descriptor: &TypeDescriptor,
        in_progress: &mut HashSet<String>,
    ) -> Result<Schema> {
        match descriptor {
            TypeDescriptor::Boolean => Ok(Schema::Boolean),
            TypeDescriptor::Int8 => Ok(Schema::Int8),
            TypeDescriptor::Int16 => Ok(Schema::Int16),
            TypeDescriptor::Int32 => Ok(Schema::Int32),
            TypeDescriptor::Int64 => Ok(Schema::Int64),
            TypeDescriptor::Float32 => Ok(Schema::Float32),
            TypeDescriptor::Float64 => Ok(Schema::Float64),
            TypeDescriptor::String => Ok(Schema::String),
            TypeDescriptor::Binary => Ok(Schema::Binary),
            TypeDescriptor::Optional(inner) => {
                let inner_schema = self.generate_type(inner, in_progress)?;
                Ok(Schema::nullable(inner_schema))
            }
            TypeDescriptor::List(element) => {
                let element_schema = self.generate_type(element, in_progress)?;
                Ok(Schema::array(element_schema))
            }
            TypeDescriptor::KeyedCollection(key, value) => {
                let key_schema = self.generate_type(key, in_progress)?;
                if !key_schema.is_primitive() {
                    return Err(Error::UnsupportedTypeError(format!(
                        "map key must map to a primitive schema, got {}",
                        key_schema
                    )));
                }
                let value_schema = self.generate_type(value, in_progress)?;
                Ok(Schema::map(key_schema, value_schema))
            }
            TypeDescriptor::Enumeration { symbols, .. } => {
                Schema::enum_with(symbols.clone())
            }
            TypeDescriptor::Composite { name, fields } => {
                if in_progress.contains(name) {
                    return Ok(Schema::Ref(name.clone()));
                }
                in_progress.insert(name.clone());
                let mut schema_fields = Vec::with_capacity(fields.len());
                for (field_name, field_descriptor) in fields {
                    let field_schema = self.generate_type(field_descriptor, in_progress)?;
                    schema_fields.push(Field::new(field_name.clone(), field_schema));
                }
                in_progress.remove(name);
                Schema::record(name.clone(), schema_fields)
            }
            TypeDescriptor::Named(name) => {
                if in_progress.contains(name) {
                    return Ok(Schema::Ref(name.clone()));
                }
                match self.registry.get(name) {
                    Some(registered) => self.generate_type(registered, in_progress),
                    None => Err(Error::UnsupportedTypeError(format!(
                        "reference to unregistered type '{}'",
                        name
                    ))),
                }
            }
            TypeDescriptor::Unsupported(reason) => Err(Error::UnsupportedTypeError(format!(
                "no schema mapping for native type: {}",
                reason
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person_descriptor() -> TypeDescriptor {
        TypeDescriptor::Composite {
            name: "Person".to_string(),
            fields: vec![
                ("name".to_string(), TypeDescriptor::String),
                (
                    "age".to_string(),
                    TypeDescriptor::Optional(Box::new(TypeDescriptor::Int32)),
                ),
            ],
        }
    }

    #[test]
    fn test_generate_flat_composite() {
        let generator = SchemaGenerator::new();
        let schema = generator.generate(&person_descriptor()).unwrap();

        let expected = Schema::record(
            "Person",
            vec![
                Field::new("name", Schema::String),
                Field::new("age", Schema::nullable(Schema::Int32)),
            ],
        )
        .unwrap();
        assert_eq!(schema, expected);
    }

    #[test]
    fn test_generator_is_deterministic() {
        let generator = SchemaGenerator::new();
        let first = generator.generate(&person_descriptor()).unwrap();
        let second = generator.generate(&person_descriptor()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_self_referential_composite() {
        // A linked-list node: Node { value: int64, next: Option<Node> }
        let node = TypeDescriptor::Composite {
            name: "Node".to_string(),
            fields: vec![
                ("value".to_string(), TypeDescriptor::Int64),
                (
                    "next".to_string(),
                    TypeDescriptor::Optional(Box::new(TypeDescriptor::Named("Node".to_string()))),
                ),
            ],
        };

        let generator = SchemaGenerator::new();
        let schema = generator.generate(&node).unwrap();

        let record = schema.as_record().unwrap();
        assert_eq!(record.name(), "Node");
        let next = record.field("next").unwrap().schema();
        assert_eq!(
            next,
            &Schema::Union(vec![Schema::Null, Schema::Ref("Node".to_string())])
        );
    }

    #[test]
    fn test_mutually_recursive_composites() {
        let forest = TypeDescriptor::Composite {
            name: "Forest".to_string(),
            fields: vec![(
                "trees".to_string(),
                TypeDescriptor::List(Box::new(TypeDescriptor::Named("Tree".to_string()))),
            )],
        };
        let tree = TypeDescriptor::Composite {
            name: "Tree".to_string(),
            fields: vec![(
                "children".to_string(),
                TypeDescriptor::Optional(Box::new(TypeDescriptor::Named("Forest".to_string()))),
            )],
        };

        let mut generator = SchemaGenerator::new();
        generator.register(tree).unwrap();
        let schema = generator.generate(&forest).unwrap();

        let trees = schema.as_record().unwrap().field("trees").unwrap().schema();
        match trees {
            Schema::Array(element) => {
                let tree_record = element.as_record().unwrap();
                let children = tree_record.field("children").unwrap().schema();
                assert_eq!(
                    children,
                    &Schema::Union(vec![Schema::Null, Schema::Ref("Forest".to_string())])
                );
            }
            other => panic!("expected array of trees, got {}", other),
        }
    }

    #[test]
    fn test_unsupported_member_type_fails() {
        let descriptor = TypeDescriptor::Composite {
            name: "Handler".to_string(),
            fields: vec![(
                "callback".to_string(),
                TypeDescriptor::Unsupported("function type".to_string()),
            )],
        };
        let generator = SchemaGenerator::new();
        assert!(matches!(
            generator.generate(&descriptor),
            Err(Error::UnsupportedTypeError(_))
        ));
    }

    #[test]
    fn test_unregistered_reference_fails() {
        let generator = SchemaGenerator::new();
        assert!(matches!(
            generator.generate(&TypeDescriptor::Named("Ghost".to_string())),
            Err(Error::UnsupportedTypeError(_))
        ));
    }

    #[test]
    fn test_non_primitive_map_key_fails() {
        let descriptor = TypeDescriptor::KeyedCollection(
            Box::new(TypeDescriptor::List(Box::new(TypeDescriptor::String))),
            Box::new(TypeDescriptor::Int32),
        );
        let generator = SchemaGenerator::new();
        assert!(matches!(
            generator.generate(&descriptor),
            Err(Error::UnsupportedTypeError(_))
        ));
    }

    #[test]
    fn test_enumeration_maps_to_enum() {
        let descriptor = TypeDescriptor::Enumeration {
            name: "Color".to_string(),
            symbols: vec!["RED".to_string(), "GREEN".to_string(), "BLUE".to_string()],
        };
        let generator = SchemaGenerator::new();
        let schema = generator.generate(&descriptor).unwrap();
        assert_eq!(schema.enum_ordinal("GREEN"), Some(1));
        assert_eq!(schema.enum_symbol(2), Some("BLUE"));
    }

    #[test]
    fn test_name_distinguished_but_field_equal() {
        // Two structurally identical composites with different names produce
        // name-distinguished schemas whose fields compare equal.
        let a = TypeDescriptor::Composite {
            name: "A".to_string(),
            fields: vec![("x".to_string(), TypeDescriptor::Int32)],
        };
        let b = TypeDescriptor::Composite {
            name: "B".to_string(),
            fields: vec![("x".to_string(), TypeDescriptor::Int32)],
        };
        let generator = SchemaGenerator::new();
        let schema_a = generator.generate(&a).unwrap();
        let schema_b = generator.generate(&b).unwrap();
        assert_ne!(schema_a, schema_b);
        assert_eq!(
            schema_a.as_record().unwrap().fields(),
            schema_b.as_record().unwrap().fields()
        );
    }
}
