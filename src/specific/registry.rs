use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;

use apache_avro::types::Value;
use apache_avro::Schema;
use log::{debug, warn};

use super::SpecificRecord;
use crate::error::{ConfigurationError, SerializationError};

type ToValueFn = fn(&dyn Any, &Schema) -> Result<Value, SerializationError>;
type FromValueFn = fn(Value) -> Result<Box<dyn Any + Send>, SerializationError>;

/// Type-erased handle on a [`SpecificRecord`] type.
#[derive(Clone, Copy)]
pub struct RecordType {
    type_id: TypeId,
    type_name: &'static str,
    schema_fn: fn() -> Schema,
    to_value_fn: ToValueFn,
    from_value_fn: FromValueFn,
}

impl RecordType {
    pub fn of<T: SpecificRecord>() -> Self {
        RecordType {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            schema_fn: T::get_schema,
            to_value_fn: to_value::<T>,
            from_value_fn: from_value::<T>,
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn schema(&self) -> Schema {
        (self.schema_fn)()
    }

    pub(crate) fn to_value(
        &self,
        object: &dyn Any,
        schema: &Schema,
    ) -> Result<Value, SerializationError> {
        (self.to_value_fn)(object, schema)
    }

    pub(crate) fn from_value(&self, value: Value) -> Result<Box<dyn Any + Send>, SerializationError> {
        (self.from_value_fn)(value)
    }
}

impl fmt::Debug for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("RecordType")
            .field("type_name", &self.type_name)
            .finish()
    }
}

fn to_value<T: SpecificRecord>(
    object: &dyn Any,
    schema: &Schema,
) -> Result<Value, SerializationError> {
    let record: &T = object
        .downcast_ref::<T>()
        .ok_or_else(|| SerializationError::TypeMismatch {
            expected: std::any::type_name::<T>().to_string(),
        })?;
    apache_avro::to_value(record)
        .and_then(|value| value.resolve(schema))
        .map_err(SerializationError::Encode)
}

fn from_value<T: SpecificRecord>(value: Value) -> Result<Box<dyn Any + Send>, SerializationError> {
    let record: T = apache_avro::from_value(&value).map_err(SerializationError::Decode)?;
    Ok(Box::new(record))
}

/// Maps type identifiers to the record types they name.
///
/// Filled at startup. Codecs built from a schema-info string look their
/// type up here.
#[derive(Clone, Debug, Default)]
pub struct TypeRegistry {
    record_types: HashMap<String, RecordType>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        TypeRegistry::default()
    }

    /// Registers `T` under the full name of its schema.
    pub fn register<T: SpecificRecord>(&mut self) -> &mut Self {
        self.register_as::<T>(T::type_identifier())
    }

    /// Registers `T` under an explicit identifier.
    ///
    /// A type previously registered under the same identifier is replaced.
    pub fn register_as<T: SpecificRecord>(&mut self, type_identifier: impl Into<String>) -> &mut Self {
        let type_identifier = type_identifier.into();
        debug!(
            "registering {} as `{}`",
            std::any::type_name::<T>(),
            type_identifier
        );
        let record_type = RecordType::of::<T>();
        if let Some(previous) = self
            .record_types
            .insert(type_identifier.clone(), record_type)
        {
            if previous.type_id() != record_type.type_id() {
                warn!(
                    "`{}` was bound to {}, now bound to {}",
                    type_identifier,
                    previous.type_name(),
                    record_type.type_name()
                );
            }
        }
        self
    }

    pub fn resolve(&self, type_identifier: &str) -> Result<RecordType, ConfigurationError> {
        self.record_types
            .get(type_identifier)
            .copied()
            .ok_or_else(|| ConfigurationError::UnknownType(type_identifier.to_string()))
    }

    pub fn contains(&self, type_identifier: &str) -> bool {
        self.record_types.contains_key(type_identifier)
    }

    pub fn type_identifiers(&self) -> impl Iterator<Item = &str> {
        self.record_types.keys().map(String::as_str)
    }
}
