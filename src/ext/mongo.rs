// MongoDB type mappings
//
// Maps the BSON driver's domain types by bare name: timestamps become
// `timestamp-millis` longs, object ids and untyped documents become strings.

use crate::schema::descriptor::{FieldDescriptor, PrimitiveKind, TypeDescriptor, TypeKind};
use crate::schema::mapper::{MapResult, TypeMapper};
use crate::schema::types::{SchemaNode, STRING};

/// Type mapper for BSON driver types.
#[derive(Debug, Clone, Copy, Default)]
pub struct MongoMapper;

impl MongoMapper {
    /// Maps a bare type name. Useful when composing with other mappers.
    pub fn map_name(&self, name: &str) -> MapResult {
        match name {
            "DateTime" => MapResult::Node(SchemaNode::timestamp_millis()),
            "ObjectId" | "ObjectID" => MapResult::primitive(STRING),
            "Document" | "M" => MapResult::primitive(STRING),
            _ => MapResult::Absent,
        }
    }
}

impl TypeMapper for MongoMapper {
    fn map(&self, ty: &TypeDescriptor) -> MapResult {
        self.map_name(ty.bare_name())
    }
}

/// Descriptor of `bson::oid::ObjectId` (12 raw bytes).
pub fn object_id() -> TypeDescriptor {
    TypeDescriptor::array(TypeDescriptor::primitive(PrimitiveKind::U8)).with_name("bson::oid::ObjectId")
}

/// Descriptor of `bson::DateTime` (milliseconds since the epoch).
pub fn date_time() -> TypeDescriptor {
    TypeDescriptor::primitive(PrimitiveKind::I64).with_name("bson::DateTime")
}

/// Descriptor of `bson::Document`, an untyped string-keyed map.
pub fn document() -> TypeDescriptor {
    TypeDescriptor::named(
        "bson::Document",
        TypeKind::Map {
            key: Box::new(TypeDescriptor::string()),
            value: Box::new(TypeDescriptor::dynamic()),
        },
    )
}

/// Descriptor of the common model base: `_id`, `created_at` and `updated_at`.
///
/// Meant to be embedded with an `inline` tag.
pub fn default_model() -> TypeDescriptor {
    TypeDescriptor::record(
        "DefaultModel",
        vec![
            FieldDescriptor::new("Id", object_id())
                .json("_id,omitempty")
                .bson("_id,omitempty"),
            FieldDescriptor::new("CreatedAt", date_time())
                .json("created_at")
                .bson("created_at"),
            FieldDescriptor::new("UpdatedAt", date_time())
                .json("updated_at")
                .bson("updated_at"),
        ],
    )
}
