//! This library serializes application objects into self-describing
//! binary blobs, and back.
//!
//! Every blob is an Avro object container holding exactly one record:
//! the magic bytes `Obj\x01`, the writer schema, a sync marker and the
//! encoded value. A blob can therefore be decoded by a process that
//! knows a compatible schema, without any side channel.
//!
//! There are two ways to bind a codec to a schema:
//! - [`GenericRecordCodec`] parses a schema document and works with
//!   untyped [`Value`]s.
//! - [`SpecificRecordCodec`] is bound to a Rust type deriving
//!   `AvroSchema`, and derives the schema from the type itself. The type
//!   can be given directly, or named in a `java=TypeName` schema-info
//!   string and looked up in a [`TypeRegistry`].
//!
//! The bound schema never changes. Calls are independent from each other,
//! and a failed call leaves the codec usable.
//!
//! # Usage
//!
//! ```
//! use recordcodec::{GenericRecordCodec, Value};
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let codec = GenericRecordCodec::new(
//!     r#"{"type":"record","name":"R","fields":[{"name":"x","type":"int"}]}"#,
//! )?;
//! let value = Value::Record(vec![("x".to_string(), Value::Int(42))]);
//!
//! let bytes = codec.to_bytes(&value)?;
//! assert!(bytes.starts_with(b"Obj\x01"));
//! assert_eq!(codec.to_object(&bytes)?, value);
//! # Ok(())
//! # }
//! ```

mod container;
mod error;
mod factory;
mod generic;
mod schema_info;
mod seekable;
mod serializer;
mod specific;

pub use apache_avro::types::Value;
pub use apache_avro::{AvroSchema, Schema};

pub use self::container::{embedded_schema, CONTAINER_MAGIC};
pub use self::error::{ConfigurationError, SchemaError, SerializationError};
pub use self::factory::{SerializerDefinition, SerializerFactory, AVRO_GENERIC, AVRO_SPECIFIC};
pub use self::generic::GenericRecordCodec;
pub use self::schema_info::{parse_schema_info, BINDING_LANGUAGE};
pub use self::seekable::SeekableByteView;
pub use self::serializer::Serializer;
pub use self::specific::{RecordType, SpecificRecord, SpecificRecordCodec, TypeRegistry};
