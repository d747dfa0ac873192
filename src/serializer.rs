use std::any::Any;

use apache_avro::types::Value;
use apache_avro::Schema;

use crate::error::SerializationError;
use crate::generic::GenericRecordCodec;
use crate::specific::SpecificRecordCodec;

/// Object-safe view on a codec, for callers that pick the codec from
/// configuration.
pub trait Serializer: Send + Sync {
    /// Encodes `object` into a container blob.
    ///
    /// # Errors
    ///
    /// Fails with [`SerializationError::TypeMismatch`] if `object` is not of
    /// the type the codec works with.
    fn to_binary(&self, object: &dyn Any) -> Result<Vec<u8>, SerializationError>;

    /// Decodes the first record of a container blob.
    fn from_binary(&self, bytes: &[u8]) -> Result<Box<dyn Any + Send>, SerializationError>;

    fn schema(&self) -> &Schema;
}

impl Serializer for GenericRecordCodec {
    fn to_binary(&self, object: &dyn Any) -> Result<Vec<u8>, SerializationError> {
        let value = object
            .downcast_ref::<Value>()
            .ok_or_else(|| SerializationError::TypeMismatch {
                expected: std::any::type_name::<Value>().to_string(),
            })?;
        self.to_bytes(value)
    }

    fn from_binary(&self, bytes: &[u8]) -> Result<Box<dyn Any + Send>, SerializationError> {
        Ok(Box::new(self.to_object(bytes)?))
    }

    fn schema(&self) -> &Schema {
        GenericRecordCodec::schema(self)
    }
}

impl Serializer for SpecificRecordCodec {
    fn to_binary(&self, object: &dyn Any) -> Result<Vec<u8>, SerializationError> {
        self.to_bytes(object)
    }

    fn from_binary(&self, bytes: &[u8]) -> Result<Box<dyn Any + Send>, SerializationError> {
        self.to_object(bytes)
    }

    fn schema(&self) -> &Schema {
        SpecificRecordCodec::schema(self)
    }
}
