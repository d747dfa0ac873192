use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;
use crate::generic::GenericRecordCodec;
use crate::serializer::Serializer;
use crate::specific::{SpecificRecordCodec, TypeRegistry};

/// Serializer name whose schema info is a schema document.
pub const AVRO_GENERIC: &str = "avro-generic";
/// Serializer name whose schema info is a `java=TypeName` string.
pub const AVRO_SPECIFIC: &str = "avro-specific";

/// Configuration naming a serializer and its schema info.
///
/// ```json
/// {"name": "avro-specific", "schema_info": "java=com.example.User"}
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializerDefinition {
    pub name: String,
    #[serde(default, alias = "schema-info")]
    pub schema_info: Option<String>,
}

impl SerializerDefinition {
    pub fn new(name: impl Into<String>, schema_info: impl Into<String>) -> Self {
        SerializerDefinition {
            name: name.into(),
            schema_info: Some(schema_info.into()),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigurationError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Builds serializers from their definitions.
#[derive(Clone, Debug, Default)]
pub struct SerializerFactory {
    registry: TypeRegistry,
}

impl SerializerFactory {
    pub fn new(registry: TypeRegistry) -> Self {
        SerializerFactory { registry }
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn get_serializer(
        &self,
        definition: &SerializerDefinition,
    ) -> Result<Box<dyn Serializer>, ConfigurationError> {
        let serializer_res = self.build_serializer(definition);
        match &serializer_res {
            Ok(_) => debug!("built serializer `{}`", definition.name),
            Err(err) => warn!("rejected serializer `{}`: {}", definition.name, err),
        }
        serializer_res
    }

    fn build_serializer(
        &self,
        definition: &SerializerDefinition,
    ) -> Result<Box<dyn Serializer>, ConfigurationError> {
        let schema_info = definition
            .schema_info
            .as_deref()
            .ok_or(ConfigurationError::EmptySchemaInfo)?;
        match definition.name.as_str() {
            AVRO_GENERIC => Ok(Box::new(GenericRecordCodec::new(schema_info)?)),
            AVRO_SPECIFIC => Ok(Box::new(SpecificRecordCodec::from_schema_info(
                schema_info,
                &self.registry,
            )?)),
            other => Err(ConfigurationError::UnknownSerializer(other.to_string())),
        }
    }
}
