use thiserror::Error;

/// Unified error type for the Fulgur record interchange layer.
///
/// Every failure is local and synchronous: it is returned at the point of
/// detection and never retried internally. Decode failures never leave a
/// partial record behind; the in-progress builder is discarded.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed schema construction (duplicate field names, empty union,
    /// duplicate enum symbols, unresolved record reference).
    #[error("Schema Definition Error: {0}")]
    SchemaDefinitionError(String),

    /// The generator encountered a native member type with no schema mapping.
    #[error("Unsupported Type Error: {0}")]
    UnsupportedTypeError(String),

    /// Numeric overflow or type-incompatible text/JSON value for the target
    /// primitive.
    #[error("Coercion Error: {0}")]
    CoercionError(String),

    /// A non-nullable field is absent from the source text.
    #[error("Missing Field Error: {0}")]
    MissingFieldError(String),

    /// Structural shape disagreement between schema and data, e.g. a JSON
    /// array where an object was expected, or an unknown field in strict mode.
    #[error("Schema Mismatch Error: {0}")]
    SchemaMismatchError(String),

    /// Delimited token count does not equal the schema field count.
    #[error("Field Count Mismatch Error: {0}")]
    FieldCountMismatchError(String),

    /// The delimited codec was given a schema that is not flat.
    #[error("Unsupported Shape Error: {0}")]
    UnsupportedShapeError(String),

    /// Malformed or truncated underlying token stream.
    #[error("Stream Error: {0}")]
    StreamError(String),
}

/// A specialized `Result` type for Fulgur operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        // Parser-level failures (malformed syntax, unexpected end of input)
        // all surface as stream errors; shape disagreements are detected by
        // the schema-guided walk and reported with their own variants.
        Error::StreamError(format!("JSON parse error: {}", err))
    }
}
