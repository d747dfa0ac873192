use std::convert::TryFrom;
use std::io::{Read, Write};
use std::panic::{self, AssertUnwindSafe};

use apache_avro::types::Value;
use apache_avro::Schema;
use log::{debug, trace};

use crate::container;
use crate::error::{SchemaError, SerializationError};

/// Serializes untyped [`Value`]s against a schema supplied as a JSON
/// document.
///
/// The schema is fixed at construction. Calls share no other state, so a
/// codec can be used from several threads at once.
#[derive(Clone, Debug)]
pub struct GenericRecordCodec {
    schema: Schema,
}

impl GenericRecordCodec {
    /// Parses `schema` and binds the codec to it.
    pub fn new(schema: &str) -> Result<Self, SchemaError> {
        let schema = panic::catch_unwind(AssertUnwindSafe(|| Schema::parse_str(schema)))
            .map_err(|_| SchemaError::Malformed(schema.to_string()))??;
        debug!("generic codec bound to schema {}", schema.canonical_form());
        Ok(GenericRecordCodec { schema })
    }

    pub fn with_schema(schema: Schema) -> Self {
        GenericRecordCodec { schema }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Encodes `value` into a container blob.
    pub fn to_bytes(&self, value: &Value) -> Result<Vec<u8>, SerializationError> {
        self.write_to(value, Vec::new())
    }

    /// Decodes the first record of a container blob.
    pub fn to_object(&self, bytes: &[u8]) -> Result<Value, SerializationError> {
        trace!("decoding generic value");
        container::read_first(&self.schema, bytes)
    }

    /// Same as [`GenericRecordCodec::to_bytes`], writing into `sink`.
    ///
    /// `sink` is returned on success and dropped on failure.
    pub fn write_to<W: Write>(&self, value: &Value, sink: W) -> Result<W, SerializationError> {
        trace!("encoding generic value");
        container::write_single(&self.schema, value, sink)
    }

    /// Same as [`GenericRecordCodec::to_object`], reading from `source`.
    ///
    /// `source` is drained, then dropped before decoding starts.
    pub fn read_from<R: Read>(&self, source: R) -> Result<Value, SerializationError> {
        trace!("decoding generic value");
        container::read_first_from(&self.schema, source)
    }

    /// Encodes a JSON document, after resolving it against the bound schema.
    ///
    /// JSON numbers are resolved to the numeric type the schema expects,
    /// so `{"x": 42}` is accepted for an `int` field.
    pub fn to_bytes_json(&self, json: &serde_json::Value) -> Result<Vec<u8>, SerializationError> {
        let value = Value::from(json.clone())
            .resolve(&self.schema)
            .map_err(SerializationError::Encode)?;
        self.to_bytes(&value)
    }

    /// Decodes a container blob into a JSON document.
    pub fn to_json(&self, bytes: &[u8]) -> Result<serde_json::Value, SerializationError> {
        let value = self.to_object(bytes)?;
        serde_json::Value::try_from(value).map_err(SerializationError::Decode)
    }
}
