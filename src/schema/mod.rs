// Schema module for the Fulgur record interchange layer
//
// This module provides the recursive schema model and the generator that
// derives schemas from native type descriptors:
//
// 1. Schema type system with structural equality and cycle-safe references
// 2. Descriptor-driven schema generation with cycle detection

// Re-export public types and functions
pub use self::generator::{SchemaGenerator, TypeDescriptor};
pub use self::types::{Field, RecordEnv, RecordSchema, Schema};

// Sub-modules
pub mod generator;
pub mod types;
