// Schema tree types
//
// This module defines the Avro schema node produced by reflection and its
// JSON rendering.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::internal::error::Result;

/// Avro `null` type name.
pub const NULL: &str = "null";
/// Avro `boolean` type name.
pub const BOOLEAN: &str = "boolean";
/// Avro `int` type name.
pub const INT: &str = "int";
/// Avro `long` type name.
pub const LONG: &str = "long";
/// Avro `float` type name.
pub const FLOAT: &str = "float";
/// Avro `double` type name.
pub const DOUBLE: &str = "double";
/// Avro `string` type name.
pub const STRING: &str = "string";
/// Avro `record` type name.
pub const RECORD: &str = "record";
/// Avro `array` type name.
pub const ARRAY: &str = "array";
/// Avro `map` type name.
pub const MAP: &str = "map";

/// Logical type for millisecond timestamps stored as `long`.
pub const TIMESTAMP_MILLIS: &str = "timestamp-millis";

/// The value of a node's `type` attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaType {
    /// A primitive name, a complex kind (`record`, `array`, `map`) or a named type reference.
    Name(String),
    /// A nested schema node.
    Node(Box<SchemaNode>),
    /// A union of alternatives, e.g. `["null", "int"]`.
    Union(Vec<SchemaType>),
}

impl SchemaType {
    /// Creates a name type.
    pub fn name(name: impl Into<String>) -> Self {
        SchemaType::Name(name.into())
    }

    /// Wraps a type into the two-branch `[null, T]` union.
    pub fn nullable(inner: SchemaType) -> Self {
        SchemaType::Union(vec![SchemaType::name(NULL), inner])
    }

    /// Returns the name if this is a `Name` type.
    pub fn as_name(&self) -> Option<&str> {
        match self {
            SchemaType::Name(name) => Some(name),
            _ => None,
        }
    }
}

impl Default for SchemaType {
    fn default() -> Self {
        SchemaType::name(NULL)
    }
}

impl From<SchemaNode> for SchemaType {
    fn from(node: SchemaNode) -> Self {
        SchemaType::Node(Box::new(node))
    }
}

impl From<&str> for SchemaType {
    fn from(name: &str) -> Self {
        SchemaType::name(name)
    }
}

/// One Avro schema element.
///
/// Field order matters: it is the key order of the rendered JSON.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SchemaNode {
    /// Field or record name, empty for anonymous nodes.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Primitive name, complex kind, nested node or union.
    #[serde(rename = "type")]
    pub schema_type: SchemaType,
    /// Element schema (arrays only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaType>>,
    /// Value schema (maps only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Box<SchemaType>>,
    /// Ordered fields (records only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<SchemaNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    /// Default value as raw JSON.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(
        rename = "logicalType",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub logical_type: Option<String>,
}

impl SchemaNode {
    /// Creates an anonymous node with a primitive type, e.g. `{"type": "long"}`.
    pub fn primitive(name: impl Into<String>) -> Self {
        Self {
            schema_type: SchemaType::name(name),
            ..Default::default()
        }
    }

    /// Creates a primitive node annotated with a logical type.
    pub fn logical(primitive: impl Into<String>, logical_type: impl Into<String>) -> Self {
        Self {
            logical_type: Some(logical_type.into()),
            ..Self::primitive(primitive)
        }
    }

    /// The `{type: long, logicalType: timestamp-millis}` node.
    pub fn timestamp_millis() -> Self {
        Self::logical(LONG, TIMESTAMP_MILLIS)
    }

    /// Creates a record node.
    pub fn record(name: impl Into<String>, fields: Vec<SchemaNode>) -> Self {
        Self {
            name: name.into(),
            schema_type: SchemaType::name(RECORD),
            fields: Some(fields),
            ..Default::default()
        }
    }

    /// Creates an array node.
    pub fn array(items: impl Into<SchemaType>) -> Self {
        Self {
            schema_type: SchemaType::name(ARRAY),
            items: Some(Box::new(items.into())),
            ..Default::default()
        }
    }

    /// Creates a map node with string keys.
    pub fn map(values: impl Into<SchemaType>) -> Self {
        Self {
            schema_type: SchemaType::name(MAP),
            values: Some(Box::new(values.into())),
            ..Default::default()
        }
    }

    /// Creates a reference to an already emitted record: `{name: N, type: N}`.
    pub fn reference(type_name: impl Into<String>) -> Self {
        let type_name = type_name.into();
        Self {
            schema_type: SchemaType::name(type_name.clone()),
            name: type_name,
            ..Default::default()
        }
    }

    /// Creates a named field node with the given type.
    pub fn field(name: impl Into<String>, schema_type: impl Into<SchemaType>) -> Self {
        Self {
            name: name.into(),
            schema_type: schema_type.into(),
            ..Default::default()
        }
    }

    /// Sets the name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Sets the documentation.
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Adds an alias.
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Sets the default value.
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    /// Returns true for record, array and map nodes.
    ///
    /// These are nested one level down when used as a field type; every
    /// other node (primitive, logical, reference) is a plain type annotation.
    pub fn is_complex(&self) -> bool {
        self.fields.is_some()
            || self.items.is_some()
            || self.values.is_some()
            || matches!(self.schema_type.as_name(), Some(RECORD | ARRAY | MAP))
    }

    /// Renders the node as compact JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Renders the node as indented JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parses a node from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_with_array_of_record() {
        let node = SchemaNode::record(
            "testRecord",
            vec![SchemaNode::field(
                "testArray",
                SchemaNode::array(SchemaNode::record(
                    "testObject",
                    vec![SchemaNode::field("testString", STRING)],
                )),
            )],
        );

        let rendered: Value = serde_json::from_str(&node.to_json().unwrap()).unwrap();
        let expected = json!({
            "name": "testRecord", "type": "record", "fields": [
                {"name": "testArray", "type": {
                    "type": "array", "items": {
                        "name": "testObject", "type": "record", "fields": [
                            {"name": "testString", "type": "string"}
                        ]
                    }
                }}
            ]
        });
        assert_eq!(rendered, expected);
    }

    #[test]
    fn test_key_order_and_omission() {
        let mut node = SchemaNode::field("ts", LONG).with_doc("created");
        node.logical_type = Some(TIMESTAMP_MILLIS.to_string());

        assert_eq!(
            node.to_json().unwrap(),
            r#"{"name":"ts","type":"long","doc":"created","logicalType":"timestamp-millis"}"#
        );
    }

    #[test]
    fn test_empty_record_keeps_fields() {
        let node = SchemaNode::record("Empty", Vec::new());
        assert_eq!(
            node.to_json().unwrap(),
            r#"{"name":"Empty","type":"record","fields":[]}"#
        );
    }

    #[test]
    fn test_nullable_union() {
        let node = SchemaNode::field("count", SchemaType::nullable(SchemaType::name(INT)));
        assert_eq!(
            node.to_json().unwrap(),
            r#"{"name":"count","type":["null","int"]}"#
        );
    }

    #[test]
    fn test_metadata_rendering() {
        let node = SchemaNode::record("User", vec![SchemaNode::field("id", LONG).with_default(json!(0))])
            .with_namespace("com.example")
            .with_alias("Account");
        let rendered: Value = serde_json::from_str(&node.to_json().unwrap()).unwrap();
        assert_eq!(
            rendered,
            json!({
                "name": "User",
                "type": "record",
                "fields": [{"name": "id", "type": "long", "default": 0}],
                "namespace": "com.example",
                "aliases": ["Account"]
            })
        );
    }

    #[test]
    fn test_from_json() {
        let node = SchemaNode::from_json(r#"{"type": "long", "logicalType": "timestamp-millis"}"#).unwrap();
        assert_eq!(node, SchemaNode::timestamp_millis());
        assert!(!node.is_complex());

        let node = SchemaNode::from_json(r#"{"type": "array", "items": "int"}"#).unwrap();
        assert_eq!(node, SchemaNode::array(INT));
        assert!(node.is_complex());
    }

    #[test]
    fn test_reference_is_not_complex() {
        let node = SchemaNode::reference("Foo");
        assert_eq!(node.to_json().unwrap(), r#"{"name":"Foo","type":"Foo"}"#);
        assert!(!node.is_complex());
    }
}
