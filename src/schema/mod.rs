// Schema module for avroschema
//
// This module derives Avro schemas from native type descriptors. It includes:
//
// 1. Schema tree types and their JSON rendering
// 2. Type descriptors and the `Reflect` trait
// 3. Structured field tag parsing
// 4. The type mapper extension hook
// 5. The reflection engine

// Re-export public types and functions
pub use self::descriptor::{
    FieldDescriptor, PrimitiveKind, RecordDescriptor, Reflect, TypeDescriptor, TypeKind, TypeRef,
    WellKnownRecord,
};
pub use self::mapper::{MapResult, TypeMapper};
pub use self::reflector::{reflect_value, RecordCache, Reflector, ReflectorConfig};
pub use self::tags::{get_name_and_omit, parse_tag, StructuredTag, TagFlags};
pub use self::types::{SchemaNode, SchemaType};

// Sub-modules
pub mod descriptor;
pub mod mapper;
pub mod reflector;
pub mod tags;
pub mod types;
