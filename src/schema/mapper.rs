// Extension hook for custom type mappings
//
// A type mapper is consulted before the built-in rules for every type the
// reflector visits. It lets callers render domain types (timestamps,
// identifiers, untyped documents) with their own schema fragments.

use serde_json::Value;

use crate::internal::error::{Error, Result};
use crate::schema::descriptor::TypeDescriptor;
use crate::schema::types::SchemaNode;

/// Result of a [`TypeMapper`] call.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum MapResult {
    /// The mapper does not handle this type.
    #[default]
    Absent,
    /// A primitive or named type, e.g. `"string"`.
    Primitive(String),
    /// A single schema node, e.g. a logical `long`.
    Node(SchemaNode),
    /// Sibling fields spliced into the owning record.
    Nodes(Vec<SchemaNode>),
    /// An untyped JSON fragment, decoded with [`MapResult::from_json`].
    Raw(Value),
}

impl MapResult {
    /// Creates a primitive result.
    pub fn primitive(name: impl Into<String>) -> Self {
        MapResult::Primitive(name.into())
    }

    /// Returns true if the mapper declined the type.
    ///
    /// Empty primitive names and empty node lists count as declined.
    pub fn is_absent(&self) -> bool {
        match self {
            MapResult::Absent => true,
            MapResult::Primitive(name) => name.is_empty(),
            MapResult::Nodes(nodes) => nodes.is_empty(),
            MapResult::Node(_) => false,
            MapResult::Raw(value) => value.is_null(),
        }
    }

    /// Decodes a raw JSON fragment.
    ///
    /// A string becomes a primitive, an object a node and an array of
    /// objects a node list. `null` is `Absent`. Anything else is an
    /// `InvalidMapperResult`.
    pub fn from_json(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(MapResult::Absent),
            Value::String(name) => Ok(MapResult::Primitive(name)),
            Value::Object(_) => serde_json::from_value(value.clone())
                .map(MapResult::Node)
                .map_err(|e| {
                    Error::InvalidMapperResult(format!("object {} is not a schema node: {}", value, e))
                }),
            Value::Array(_) => serde_json::from_value::<Vec<SchemaNode>>(value.clone())
                .map(MapResult::Nodes)
                .map_err(|e| {
                    Error::InvalidMapperResult(format!("array {} is not a list of schema nodes: {}", value, e))
                }),
            other => Err(Error::InvalidMapperResult(format!(
                "expected a type name, schema node or node list, got {}",
                other
            ))),
        }
    }
}

impl From<SchemaNode> for MapResult {
    fn from(node: SchemaNode) -> Self {
        MapResult::Node(node)
    }
}

impl From<Vec<SchemaNode>> for MapResult {
    fn from(nodes: Vec<SchemaNode>) -> Self {
        MapResult::Nodes(nodes)
    }
}

impl From<&str> for MapResult {
    fn from(name: &str) -> Self {
        MapResult::primitive(name)
    }
}

/// Caller-supplied override consulted before default type handling.
///
/// Implementations must be side-effect free: the reflector may call them
/// any number of times for the same type.
pub trait TypeMapper {
    fn map(&self, ty: &TypeDescriptor) -> MapResult;
}

impl<F> TypeMapper for F
where
    F: Fn(&TypeDescriptor) -> MapResult,
{
    fn map(&self, ty: &TypeDescriptor) -> MapResult {
        self(ty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_closure_mapper() {
        let mapper = |ty: &TypeDescriptor| match ty.bare_name() {
            "Uuid" => MapResult::primitive("string"),
            _ => MapResult::Absent,
        };

        let uuid = TypeDescriptor::record("uuid::Uuid", Vec::new());
        assert_eq!(mapper.map(&uuid), MapResult::primitive("string"));
        assert!(mapper.map(&TypeDescriptor::string()).is_absent());
    }

    #[test]
    fn test_empty_results_are_absent() {
        assert!(MapResult::primitive("").is_absent());
        assert!(MapResult::Nodes(Vec::new()).is_absent());
        assert!(MapResult::Raw(Value::Null).is_absent());
        assert!(!MapResult::Node(SchemaNode::timestamp_millis()).is_absent());
    }

    #[test]
    fn test_from_json_shapes() {
        assert_eq!(
            MapResult::from_json(json!("string")).unwrap(),
            MapResult::primitive("string")
        );
        assert_eq!(
            MapResult::from_json(json!({"type": "long", "logicalType": "timestamp-millis"})).unwrap(),
            MapResult::Node(SchemaNode::timestamp_millis())
        );
        assert_eq!(
            MapResult::from_json(json!([{"name": "id", "type": "string"}])).unwrap(),
            MapResult::Nodes(vec![SchemaNode::field("id", "string")])
        );
        assert_eq!(MapResult::from_json(Value::Null).unwrap(), MapResult::Absent);
    }

    #[test]
    fn test_from_json_invalid() {
        for value in [json!(42), json!(true), json!({"name": "no_type"}), json!(["string"])] {
            let err = MapResult::from_json(value).unwrap_err();
            assert!(matches!(err, Error::InvalidMapperResult(_)));
        }
    }
}
