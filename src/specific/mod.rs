mod registry;

use std::any::Any;
use std::io::{Read, Write};

use apache_avro::{AvroSchema, Schema};
use log::{debug, trace};
use serde::de::DeserializeOwned;
use serde::Serialize;

pub use self::registry::{RecordType, TypeRegistry};
use crate::container;
use crate::error::{ConfigurationError, SerializationError};
use crate::schema_info::parse_schema_info;

/// A statically-known type that carries its own schema.
///
/// Implemented for every type deriving `AvroSchema`, `Serialize` and
/// `Deserialize`.
pub trait SpecificRecord: AvroSchema + Serialize + DeserializeOwned + Send + 'static {
    /// Name under which the type is looked up: the full name of its
    /// schema, e.g. `com.example.User`.
    fn type_identifier() -> String {
        Self::get_schema()
            .name()
            .map(|name| name.fullname(None))
            .unwrap_or_else(|| std::any::type_name::<Self>().to_string())
    }
}

impl<T> SpecificRecord for T where T: AvroSchema + Serialize + DeserializeOwned + Send + 'static {}

/// Serializes instances of a single bound type.
///
/// The schema is derived from the type when the codec is built, and never
/// changes afterwards.
#[derive(Clone, Debug)]
pub struct SpecificRecordCodec {
    record_type: RecordType,
    schema: Schema,
}

impl SpecificRecordCodec {
    pub fn for_type<T: SpecificRecord>() -> Self {
        SpecificRecordCodec::with_record_type(RecordType::of::<T>())
    }

    pub fn with_record_type(record_type: RecordType) -> Self {
        let schema = record_type.schema();
        debug!(
            "specific codec bound to type {} ({})",
            record_type.type_name(),
            schema.canonical_form()
        );
        SpecificRecordCodec {
            record_type,
            schema,
        }
    }

    /// Builds a codec from a `java=TypeName` schema-info string, looking the
    /// type up in `registry`.
    pub fn from_schema_info(
        schema_info: &str,
        registry: &TypeRegistry,
    ) -> Result<Self, ConfigurationError> {
        let type_identifier = parse_schema_info(schema_info)?;
        let record_type = registry.resolve(type_identifier)?;
        Ok(SpecificRecordCodec::with_record_type(record_type))
    }

    pub fn type_name(&self) -> &'static str {
        self.record_type.type_name()
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Encodes `object` into a container blob.
    ///
    /// `object` must be an instance of the bound type.
    pub fn to_bytes(&self, object: &dyn Any) -> Result<Vec<u8>, SerializationError> {
        self.write_to(object, Vec::new())
    }

    /// Decodes the first record of a container blob into an instance of the
    /// bound type.
    pub fn to_object(&self, bytes: &[u8]) -> Result<Box<dyn Any + Send>, SerializationError> {
        trace!("decoding {}", self.type_name());
        let value = container::read_first(&self.schema, bytes)?;
        self.record_type.from_value(value)
    }

    /// Same as [`SpecificRecordCodec::to_object`], downcast to `T`.
    pub fn to_object_as<T: Any>(&self, bytes: &[u8]) -> Result<T, SerializationError> {
        let object = self.to_object(bytes)?;
        match object.downcast::<T>() {
            Ok(record) => Ok(*record),
            Err(_) => Err(SerializationError::TypeMismatch {
                expected: std::any::type_name::<T>().to_string(),
            }),
        }
    }

    pub fn write_to<W: Write>(&self, object: &dyn Any, sink: W) -> Result<W, SerializationError> {
        trace!("encoding {}", self.type_name());
        let value = self.record_type.to_value(object, &self.schema)?;
        container::write_single(&self.schema, &value, sink)
    }

    pub fn read_from<R: Read>(&self, source: R) -> Result<Box<dyn Any + Send>, SerializationError> {
        trace!("decoding {}", self.type_name());
        let value = container::read_first_from(&self.schema, source)?;
        self.record_type.from_value(value)
    }
}

#[cfg(test)]
mod tests;
