// Record module for the Fulgur record interchange layer
//
// Provides the schema-typed in-memory record container:
//
// 1. The polymorphic Value slot type
// 2. StructuredRecord and its staged RecordBuilder

// Re-export public types and functions
pub use self::builder::{RecordBuilder, StructuredRecord};
pub use self::types::{conform, Value};

// Sub-modules
pub mod builder;
pub mod types;
