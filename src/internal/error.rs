use thiserror::Error;

/// Unified error type for the avroschema library.
#[derive(Error, Debug)]
pub enum Error {
    /// The schema tree could not be rendered to JSON text.
    #[error("Encoding Error: {0}")]
    EncodingError(#[from] serde_json::Error),

    /// A type mapper returned a result that is neither a primitive name,
    /// a schema node nor a list of schema nodes.
    #[error("Invalid Mapper Result: {0}")]
    InvalidMapperResult(String),
}

/// A specialized `Result` type for avroschema operations.
pub type Result<T> = std::result::Result<T, Error>;

/*
Error policy:

Reflection prefers producing a schema over rejecting a type. Shape problems
(non-string map keys, unsupported kinds, odd mapper output) degrade to a
documented fallback. Only rendering failures and, when explicitly enabled,
invalid mapper results surface as `Error`.
*/
