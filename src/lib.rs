// avroschema library entry point
//
// Derives Avro schemas from native record type descriptors.

pub mod ext;
pub mod internal;
pub mod schema;

pub use internal::error::{Error, Result};
pub use schema::{
    reflect_value, FieldDescriptor, MapResult, Reflect, Reflector, ReflectorConfig, SchemaNode,
    SchemaType, TypeDescriptor, TypeMapper,
};
