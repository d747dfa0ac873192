use std::io;

use thiserror::Error;

/// The schema document could not be parsed into a valid schema.
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Invalid schema: {0}")]
    Invalid(#[from] apache_avro::Error),
    #[error("Malformed schema: {0}")]
    Malformed(String),
}

/// A codec could not be built from its configuration.
///
/// Always fatal to the construction attempt.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("Schema info is empty")]
    EmptySchemaInfo,
    #[error("Only one binding language is supported, got {0} entries")]
    MultipleLanguages(usize),
    #[error("Malformed schema info entry `{0}`, expected `lang=TypeName`")]
    MalformedEntry(String),
    #[error("Unsupported binding language `{found}`, only `{expected}` is supported")]
    UnsupportedLanguage {
        found: String,
        expected: &'static str,
    },
    #[error("No record type registered under `{0}`")]
    UnknownType(String),
    #[error("Unknown serializer `{0}`")]
    UnknownSerializer(String),
    #[error("Invalid serializer definition: {0}")]
    Definition(#[from] serde_json::Error),
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Encoding or decoding of a single payload failed.
///
/// The codec stays usable after this error.
#[derive(Error, Debug)]
pub enum SerializationError {
    #[error("Failed to encode value: {0}")]
    Encode(#[source] apache_avro::Error),
    #[error("Failed to decode container: {0}")]
    Decode(#[source] apache_avro::Error),
    #[error("Corrupted container: {0}")]
    Corrupted(String),
    #[error("Container holds no record")]
    EmptyContainer,
    #[error("Value is not an instance of `{expected}`")]
    TypeMismatch { expected: String },
    #[error("Io error: {0}")]
    Io(#[from] io::Error),
}
