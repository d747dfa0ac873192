use apache_avro::AvroSchema;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{RecordType, SpecificRecord, SpecificRecordCodec, TypeRegistry};
use crate::container::tests::{
    check_single_byte_corruptions, oversized_schema_container, rename_embedded_record,
    truncate_schema_length, OpenCounter, TrackedSink, TrackedSource,
};
use crate::container::CONTAINER_MAGIC;
use crate::error::{ConfigurationError, SerializationError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, AvroSchema)]
#[avro(namespace = "com.example")]
struct User {
    id: i64,
    name: String,
    email: Option<String>,
    tags: Vec<String>,
    active: bool,
    score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, AvroSchema)]
struct Point {
    x: i32,
    y: i32,
}

fn happy_user() -> User {
    User {
        id: 17,
        name: "happy".to_string(),
        email: Some("happy@example.com".to_string()),
        tags: vec!["tax".to_string(), "payer".to_string()],
        active: true,
        score: 1.5,
    }
}

fn registry() -> TypeRegistry {
    let mut registry = TypeRegistry::new();
    registry.register::<User>().register::<Point>();
    registry
}

#[test]
fn test_type_identifier_is_schema_full_name() {
    assert_eq!(User::type_identifier(), "com.example.User");
    assert_eq!(Point::type_identifier(), "Point");
}

#[test]
fn test_specific_simple() {
    let codec = SpecificRecordCodec::for_type::<User>();
    let user = happy_user();
    let bytes = codec.to_bytes(&user).unwrap();
    assert!(bytes.starts_with(&CONTAINER_MAGIC));
    assert_eq!(codec.to_object_as::<User>(&bytes).unwrap(), user);
}

#[test]
fn test_specific_to_object_returns_bound_type() {
    let codec = SpecificRecordCodec::for_type::<Point>();
    let bytes = codec.to_bytes(&Point { x: 1, y: -1 }).unwrap();
    let object = codec.to_object(&bytes).unwrap();
    assert_eq!(object.downcast_ref::<Point>(), Some(&Point { x: 1, y: -1 }));
}

#[test]
fn test_specific_optional_none() {
    let codec = SpecificRecordCodec::for_type::<User>();
    let user = User {
        email: None,
        tags: Vec::new(),
        ..happy_user()
    };
    let bytes = codec.to_bytes(&user).unwrap();
    assert_eq!(codec.to_object_as::<User>(&bytes).unwrap(), user);
}

#[test]
fn test_specific_schema_derived_from_type() {
    let codec = SpecificRecordCodec::for_type::<User>();
    assert_eq!(codec.schema(), &User::get_schema());
    assert_eq!(
        codec.schema().name().map(|name| name.fullname(None)),
        Some("com.example.User".to_string())
    );
    let bytes = codec.to_bytes(&happy_user()).unwrap();
    assert_eq!(
        crate::container::embedded_schema(&bytes).unwrap(),
        User::get_schema()
    );
}

#[test]
fn test_specific_random_round_trip() {
    let codec = SpecificRecordCodec::for_type::<Point>();
    let mut rng = rand::thread_rng();
    for _ in 0..100 {
        let point = Point {
            x: rng.gen(),
            y: rng.gen(),
        };
        let bytes = codec.to_bytes(&point).unwrap();
        assert_eq!(codec.to_object_as::<Point>(&bytes).unwrap(), point);
    }
}

#[test]
fn test_specific_wrong_type_rejected() {
    let codec = SpecificRecordCodec::for_type::<User>();
    assert!(matches!(
        codec.to_bytes(&Point { x: 1, y: 2 }),
        Err(SerializationError::TypeMismatch { .. })
    ));
    assert!(matches!(
        codec.to_bytes(&"happy"),
        Err(SerializationError::TypeMismatch { .. })
    ));
    let bytes = codec.to_bytes(&happy_user()).unwrap();
    assert!(matches!(
        codec.to_object_as::<Point>(&bytes),
        Err(SerializationError::TypeMismatch { .. })
    ));
    // The codec is still usable after a failed call.
    assert_eq!(codec.to_object_as::<User>(&bytes).unwrap(), happy_user());
}

#[test]
fn test_specific_bytes_of_other_type_rejected() {
    let user_bytes = SpecificRecordCodec::for_type::<User>()
        .to_bytes(&happy_user())
        .unwrap();
    let point_codec = SpecificRecordCodec::for_type::<Point>();
    assert!(matches!(
        point_codec.to_object(&user_bytes),
        Err(SerializationError::Decode(_))
    ));
}

#[test]
fn test_specific_corrupted_bytes() {
    let codec = SpecificRecordCodec::for_type::<User>();
    let bytes = codec.to_bytes(&happy_user()).unwrap();
    for len in [0, 2, bytes.len() / 2, bytes.len() - 1] {
        assert!(matches!(
            codec.to_object(&bytes[..len]),
            Err(SerializationError::Corrupted(_)) | Err(SerializationError::EmptyContainer)
        ));
    }
    assert!(matches!(
        codec.to_object(&[0u8; 64]),
        Err(SerializationError::Corrupted(_))
    ));
}

#[test]
fn test_specific_invalid_embedded_name() {
    let codec = SpecificRecordCodec::for_type::<Point>();
    let bytes = codec.to_bytes(&Point { x: 1, y: 2 }).unwrap();
    let renamed = rename_embedded_record(&bytes, "Point", "-----");
    assert!(matches!(
        codec.to_object(&renamed),
        Err(SerializationError::Corrupted(_)) | Err(SerializationError::Decode(_))
    ));
    assert_eq!(
        codec.to_object_as::<Point>(&bytes).unwrap(),
        Point { x: 1, y: 2 }
    );
}

#[test]
fn test_specific_oversized_schema_length() {
    let codec = SpecificRecordCodec::for_type::<User>();
    let bytes = codec.to_bytes(&happy_user()).unwrap();
    assert!(codec.to_object(&truncate_schema_length(&bytes)).is_err());
    assert!(matches!(
        codec.to_object(&oversized_schema_container()),
        Err(SerializationError::Corrupted(_))
    ));
}

#[test]
fn test_specific_single_byte_corruptions() {
    let codec = SpecificRecordCodec::for_type::<Point>();
    let bytes = codec.to_bytes(&Point { x: -3, y: 300 }).unwrap();
    check_single_byte_corruptions(&bytes, |corrupted| codec.to_object(corrupted));

    let codec = SpecificRecordCodec::for_type::<User>();
    let bytes = codec.to_bytes(&happy_user()).unwrap();
    check_single_byte_corruptions(&bytes, |corrupted| codec.to_object(corrupted));
}

#[test]
fn test_from_schema_info() {
    let codec = SpecificRecordCodec::from_schema_info("java=com.example.User", &registry()).unwrap();
    assert_eq!(codec.type_name(), std::any::type_name::<User>());
    let bytes = codec.to_bytes(&happy_user()).unwrap();
    assert_eq!(codec.to_object_as::<User>(&bytes).unwrap(), happy_user());
}

#[test]
fn test_from_schema_info_errors() {
    let registry = registry();
    assert!(matches!(
        SpecificRecordCodec::from_schema_info("", &registry),
        Err(ConfigurationError::EmptySchemaInfo)
    ));
    assert!(matches!(
        SpecificRecordCodec::from_schema_info("java=Foo,py=Bar", &registry),
        Err(ConfigurationError::MultipleLanguages(_))
    ));
    assert!(matches!(
        SpecificRecordCodec::from_schema_info("java", &registry),
        Err(ConfigurationError::MalformedEntry(_))
    ));
    assert!(matches!(
        SpecificRecordCodec::from_schema_info("py=Foo", &registry),
        Err(ConfigurationError::UnsupportedLanguage { .. })
    ));
    assert!(matches!(
        SpecificRecordCodec::from_schema_info("java=com.example.Missing", &registry),
        Err(ConfigurationError::UnknownType(identifier)) if identifier == "com.example.Missing"
    ));
}

#[test]
fn test_registry() {
    let mut registry = registry();
    registry.register_as::<Point>("geo.Point");
    assert!(registry.contains("com.example.User"));
    assert!(registry.contains("Point"));
    assert!(registry.contains("geo.Point"));
    assert!(!registry.contains("User"));
    let mut identifiers: Vec<&str> = registry.type_identifiers().collect();
    identifiers.sort_unstable();
    assert_eq!(identifiers, vec!["Point", "com.example.User", "geo.Point"]);
    let record_type = registry.resolve("geo.Point").unwrap();
    assert_eq!(record_type.type_id(), std::any::TypeId::of::<Point>());
    assert_eq!(record_type.schema(), Point::get_schema());
    assert!(matches!(
        registry.resolve("geo.Line"),
        Err(ConfigurationError::UnknownType(_))
    ));
}

#[test]
fn test_registry_rebinding_replaces_type() {
    let mut registry = registry();
    registry.register_as::<User>("Point");
    let record_type = registry.resolve("Point").unwrap();
    assert_eq!(record_type.type_id(), std::any::TypeId::of::<User>());
    // Binding the same type again keeps it.
    registry.register_as::<User>("Point");
    assert_eq!(
        registry.resolve("Point").unwrap().type_id(),
        std::any::TypeId::of::<User>()
    );
}

#[test]
fn test_with_record_type() {
    let codec = SpecificRecordCodec::with_record_type(RecordType::of::<Point>());
    let bytes = codec.to_bytes(&Point { x: 3, y: 4 }).unwrap();
    assert_eq!(
        codec.to_object_as::<Point>(&bytes).unwrap(),
        Point { x: 3, y: 4 }
    );
}

#[test]
fn test_specific_resources_released() {
    let codec = SpecificRecordCodec::for_type::<Point>();
    let counter = OpenCounter::default();

    let sink = codec
        .write_to(&Point { x: 5, y: 6 }, TrackedSink::open(&counter))
        .unwrap();
    let bytes = sink.buffer.clone();
    drop(sink);
    assert_eq!(counter.num_open(), 0);

    assert!(codec
        .write_to(&happy_user(), TrackedSink::open(&counter))
        .is_err());
    assert_eq!(counter.num_open(), 0);

    let object = codec
        .read_from(TrackedSource::open(&bytes, &counter))
        .unwrap();
    assert_eq!(object.downcast_ref::<Point>(), Some(&Point { x: 5, y: 6 }));
    assert_eq!(counter.num_open(), 0);

    assert!(codec
        .read_from(TrackedSource::open(b"Obj\x01", &counter))
        .is_err());
    assert_eq!(counter.num_open(), 0);
}

#[test]
fn test_specific_concurrent_calls() {
    let codec = SpecificRecordCodec::for_type::<User>();
    std::thread::scope(|scope| {
        for thread_id in 0..4i64 {
            let codec = &codec;
            scope.spawn(move || {
                for i in 0..25 {
                    let user = User {
                        id: thread_id * 100 + i,
                        ..happy_user()
                    };
                    let bytes = codec.to_bytes(&user).unwrap();
                    assert_eq!(codec.to_object_as::<User>(&bytes).unwrap(), user);
                }
            });
        }
    });
}
