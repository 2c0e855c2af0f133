use avroschema::ext::mongo::{self, MongoMapper};
use avroschema::schema::descriptor::{FieldDescriptor, TypeDescriptor};
use avroschema::{MapResult, Reflector, ReflectorConfig, SchemaNode};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

fn book() -> TypeDescriptor {
    TypeDescriptor::record(
        "library::Book",
        vec![
            FieldDescriptor::new("DefaultModel", mongo::default_model()).bson(",inline"),
            FieldDescriptor::of::<String>("Name").json("name").bson("name"),
            FieldDescriptor::of::<i32>("Pages").json("pages").bson("pages"),
            FieldDescriptor::new("ObjId", mongo::object_id()).json("obj_id").bson("obj_id"),
            FieldDescriptor::new("ArrivedAt", mongo::date_time())
                .json("arrived_at")
                .bson("arrived_at"),
            FieldDescriptor::new("RefData", mongo::document())
                .json("ref_data")
                .bson("ref_data"),
            FieldDescriptor::of::<Vec<String>>("Author").json("author").bson("author"),
        ],
    )
}

/// Tests the common document model with the BSON type mappings.
#[test]
fn test_mongo_common_types() {
    let reflector = Reflector::new().with_mapper(MongoMapper);
    let json = reflector.reflect_value(&book()).unwrap();
    let reflected: Value = serde_json::from_str(&json).unwrap();

    let expected = json!({
        "name": "Book",
        "type": "record",
        "fields": [
            {"name": "_id", "type": ["null", "string"]},
            {"name": "created_at", "type": "long", "logicalType": "timestamp-millis"},
            {"name": "updated_at", "type": "long", "logicalType": "timestamp-millis"},
            {"name": "name", "type": "string"},
            {"name": "pages", "type": "int"},
            {"name": "obj_id", "type": "string"},
            {"name": "arrived_at", "type": "long", "logicalType": "timestamp-millis"},
            {"name": "ref_data", "type": "string"},
            {"name": "author", "type": {"type": "array", "items": "string"}}
        ]
    });
    assert_eq!(reflected, expected);
}

/// Tests that without the mapper the BSON types fall back to their raw shapes.
#[test]
fn test_mongo_types_without_mapper() {
    let schema = Reflector::new().reflect_schema(&book()).unwrap();
    let fields = schema.fields.unwrap();

    let obj_id = fields.iter().find(|f| f.name == "obj_id").unwrap();
    assert_eq!(obj_id.to_json().unwrap(), r#"{"name":"obj_id","type":{"type":"array","items":"int"}}"#);

    let ref_data = fields.iter().find(|f| f.name == "ref_data").unwrap();
    assert_eq!(
        ref_data.to_json().unwrap(),
        r#"{"name":"ref_data","type":{"type":"map","values":"string"}}"#
    );
}

/// Tests a mapper that contributes framework fields in place of a marker type.
#[test]
fn test_mapper_contributes_sibling_fields() {
    let mapper = |ty: &TypeDescriptor| match ty.bare_name() {
        "Model" => MapResult::Nodes(vec![
            SchemaNode::field("_id", "string"),
            SchemaNode::timestamp_millis().with_name("created_at"),
            SchemaNode::timestamp_millis().with_name("updated_at"),
        ]),
        other => MongoMapper.map_name(other),
    };
    let record = TypeDescriptor::record(
        "Shelf",
        vec![
            FieldDescriptor::new("Model", TypeDescriptor::record("Model", Vec::new())).json("model"),
            FieldDescriptor::new("Updated", mongo::date_time()).json("last_seen,omitempty"),
        ],
    );

    let reflector = Reflector::with_config(ReflectorConfig::default()).with_mapper(mapper);
    let reflected: Value = serde_json::from_str(&reflector.reflect_value(&record).unwrap()).unwrap();
    assert_eq!(
        reflected["fields"],
        json!([
            {"name": "_id", "type": "string"},
            {"name": "created_at", "type": "long", "logicalType": "timestamp-millis"},
            {"name": "updated_at", "type": "long", "logicalType": "timestamp-millis"},
            {"name": "last_seen", "type": ["null", {"type": "long", "logicalType": "timestamp-millis"}]}
        ])
    );
}

fn author() -> TypeDescriptor {
    TypeDescriptor::record(
        "library::Author",
        vec![
            FieldDescriptor::new("DefaultModel", mongo::default_model()).bson(",inline"),
            FieldDescriptor::of::<String>("Name").json("name").bson("name"),
        ],
    )
}

/// Tests that every record embedding the common model gets its fields.
#[test]
fn test_default_model_inlined_at_every_level() {
    let record = TypeDescriptor::record(
        "library::Shelf",
        vec![
            FieldDescriptor::new("DefaultModel", mongo::default_model()).bson(",inline"),
            FieldDescriptor::new("Author", author()).json("author"),
            FieldDescriptor::new("Base", mongo::default_model()).json("base"),
        ],
    );

    let reflector = Reflector::new().with_mapper(MongoMapper);
    let reflected: Value = serde_json::from_str(&reflector.reflect_value(&record).unwrap()).unwrap();

    let model_fields = json!([
        {"name": "_id", "type": ["null", "string"]},
        {"name": "created_at", "type": "long", "logicalType": "timestamp-millis"},
        {"name": "updated_at", "type": "long", "logicalType": "timestamp-millis"}
    ]);
    let mut author_fields = model_fields.as_array().unwrap().clone();
    author_fields.push(json!({"name": "name", "type": "string"}));
    let mut shelf_fields = model_fields.as_array().unwrap().clone();
    shelf_fields.push(json!({"name": "author", "type": {
        "name": "Author", "type": "record", "fields": author_fields
    }}));
    shelf_fields.push(json!({"name": "base", "type": {
        "name": "DefaultModel", "type": "record", "fields": model_fields
    }}));

    assert_eq!(reflected["fields"], Value::Array(shelf_fields));
}
