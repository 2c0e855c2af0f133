// Type reflection
//
// The reflector walks a type descriptor and builds the matching Avro schema
// tree. Records are expanded once per reflection pass; later encounters of
// the same record emit a reference by name, which bounds recursion for
// self-referential and repeated types. Inlined records are spliced into
// their parent and never enter the cache, since they are not emitted as
// named types.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::internal::error::Result;
use crate::schema::descriptor::{
    FieldDescriptor, PrimitiveKind, RecordDescriptor, Reflect, TypeDescriptor, TypeKind,
    WellKnownRecord, BSON_TAG, JSON_TAG,
};
use crate::schema::mapper::{MapResult, TypeMapper};
use crate::schema::tags::{parse_tag, StructuredTag, TagFlags};
use crate::schema::types::{
    SchemaNode, SchemaType, BOOLEAN, DOUBLE, FLOAT, INT, LONG, STRING,
};

/// Configuration for schema reflection
#[derive(Debug, Clone)]
pub struct ReflectorConfig {
    /// Makes every record field optional (`["null", T]`).
    pub backward_transitive: bool,

    /// Emits fields without a tag name under their declared identifier
    /// instead of skipping them.
    pub emit_all_fields: bool,

    /// Always uses declared identifiers, even when tags carry names.
    pub skip_tag_field_names: bool,

    /// Keys the record cache by qualified name instead of bare name, so
    /// distinct types sharing a short name are both expanded.
    pub strict_record_identity: bool,

    /// Fails the reflection when a mapper returns an undecodable raw result
    /// instead of falling back to default handling.
    pub strict_mapper_results: bool,

    /// Tag namespace whose names take precedence.
    pub primary_tag: String,

    /// Tag namespace consulted when the primary tag has no name.
    pub secondary_tag: String,
}

impl Default for ReflectorConfig {
    fn default() -> Self {
        Self {
            backward_transitive: false,
            emit_all_fields: false,
            skip_tag_field_names: false,
            strict_record_identity: false,
            strict_mapper_results: false,
            primary_tag: JSON_TAG.to_string(),
            secondary_tag: BSON_TAG.to_string(),
        }
    }
}

/// Record types already expanded in the current reflection pass.
#[derive(Debug, Default)]
pub struct RecordCache {
    seen: HashSet<String>,
    inlining: HashSet<String>,
}

impl RecordCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a record key as expanded. Returns false if it already was.
    pub fn insert(&mut self, key: &str) -> bool {
        self.seen.insert(key.to_string())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.seen.contains(key)
    }

    /// Marks a record as being inlined. Returns false if it already is,
    /// which means the record inlines itself.
    fn enter_inline(&mut self, key: &str) -> bool {
        self.inlining.insert(key.to_string())
    }

    fn leave_inline(&mut self, key: &str) {
        self.inlining.remove(key);
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

/// Intermediate result of reflecting one type.
#[derive(Debug, Clone, PartialEq)]
enum Reflected {
    /// A primitive type name.
    Primitive(String),
    /// A schema node (record, array, map or mapper-provided node).
    Node(SchemaNode),
    /// A record already expanded in this pass, by bare name.
    Reference(String),
    /// Sibling fields contributed by a mapper, with the bare name of the
    /// mapped type.
    Nodes(String, Vec<SchemaNode>),
}

impl Reflected {
    /// Converts to a type usable as array items, map values or a union branch.
    fn into_schema_type(self) -> SchemaType {
        match self {
            Reflected::Primitive(name) => SchemaType::Name(name),
            Reflected::Reference(name) => SchemaNode::reference(name).into(),
            Reflected::Nodes(name, _) if name.is_empty() => {
                debug!("Anonymous mapper node list outside a record, falling back to string");
                SchemaType::name(STRING)
            }
            other => other.into_node().into(),
        }
    }

    /// Converts to a standalone node.
    ///
    /// Outside a field list a node list becomes a record named after the
    /// mapped type, or `"string"` when that type is anonymous.
    fn into_node(self) -> SchemaNode {
        match self {
            Reflected::Primitive(name) => SchemaNode::primitive(name),
            Reflected::Node(node) => node,
            Reflected::Reference(name) => SchemaNode::reference(name),
            Reflected::Nodes(name, _) if name.is_empty() => {
                debug!("Anonymous mapper node list outside a record, falling back to string");
                SchemaNode::primitive(STRING)
            }
            Reflected::Nodes(name, nodes) => SchemaNode::record(name, nodes),
        }
    }
}

/// Returns the Avro primitive name for a scalar kind.
pub fn primitive_name(kind: PrimitiveKind) -> &'static str {
    match kind {
        PrimitiveKind::String | PrimitiveKind::Char => STRING,
        PrimitiveKind::I8
        | PrimitiveKind::I16
        | PrimitiveKind::I32
        | PrimitiveKind::Isize
        | PrimitiveKind::U8
        | PrimitiveKind::U16
        | PrimitiveKind::U32
        | PrimitiveKind::Usize => INT,
        PrimitiveKind::I64 | PrimitiveKind::U64 => LONG,
        PrimitiveKind::F32 => FLOAT,
        PrimitiveKind::F64 => DOUBLE,
        PrimitiveKind::Bool => BOOLEAN,
    }
}

/// Derives Avro schemas from type descriptors.
#[derive(Clone, Default)]
pub struct Reflector {
    config: ReflectorConfig,
    mapper: Option<Arc<dyn TypeMapper + Send + Sync>>,
}

impl fmt::Debug for Reflector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reflector")
            .field("config", &self.config)
            .field("mapper", &self.mapper.is_some())
            .finish()
    }
}

impl Reflector {
    /// Creates a new reflector with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new reflector with custom configuration
    pub fn with_config(config: ReflectorConfig) -> Self {
        Self {
            config,
            mapper: None,
        }
    }

    /// Registers the type mapper consulted before the built-in rules.
    pub fn with_mapper<M>(mut self, mapper: M) -> Self
    where
        M: TypeMapper + Send + Sync + 'static,
    {
        self.mapper = Some(Arc::new(mapper));
        self
    }

    pub fn config(&self) -> &ReflectorConfig {
        &self.config
    }

    /// Reflects `T` and renders the schema as JSON.
    pub fn reflect<T: Reflect + ?Sized>(&self) -> Result<String> {
        self.reflect_value(&T::type_descriptor())
    }

    /// Reflects `T` into a schema tree.
    pub fn reflect_schema_of<T: Reflect + ?Sized>(&self) -> Result<SchemaNode> {
        self.reflect_schema(&T::type_descriptor())
    }

    /// Reflects a root type and renders the schema as JSON.
    pub fn reflect_value(&self, root: &TypeDescriptor) -> Result<String> {
        self.reflect_schema(root)?.to_json()
    }

    /// Reflects a root type into a schema tree.
    ///
    /// One level of optional indirection is stripped and a record root is
    /// expanded directly, without consulting the mapper. Any other root is
    /// reflected like a field type and returned as a standalone node.
    pub fn reflect_schema(&self, root: &TypeDescriptor) -> Result<SchemaNode> {
        let mut cache = RecordCache::new();
        let root = root.unwrap_optional();

        let reflected = match root.kind() {
            TypeKind::Record(record) if record.well_known.is_none() => {
                self.expand_record(root, record, &mut cache)?
            }
            _ => self.reflect_type(root, &mut cache)?,
        };

        Ok(reflected.into_node())
    }

    fn record_key<'a>(&self, ty: &'a TypeDescriptor) -> &'a str {
        if self.config.strict_record_identity {
            ty.qualified_name().unwrap_or_default()
        } else {
            ty.bare_name()
        }
    }

    fn reflect_type(&self, ty: &TypeDescriptor, cache: &mut RecordCache) -> Result<Reflected> {
        let ty = ty.unwrap_optional();

        if let Some(mapped) = self.apply_mapper(ty)? {
            return Ok(mapped);
        }

        let reflected = match ty.kind() {
            TypeKind::Primitive(kind) => Reflected::Primitive(primitive_name(*kind).to_string()),
            TypeKind::Array(element) => {
                let items = self.reflect_type(element, cache)?.into_schema_type();
                Reflected::Node(SchemaNode::array(items))
            }
            TypeKind::Map { key, value } => {
                if key.unwrap_optional().is_string_like() {
                    let values = self.reflect_type(value, cache)?.into_schema_type();
                    Reflected::Node(SchemaNode::map(values))
                } else {
                    debug!(map = ty.bare_name(), "Map key is not a string, degrading to string");
                    Reflected::Primitive(STRING.to_string())
                }
            }
            TypeKind::Record(record) => match record.well_known {
                Some(WellKnownRecord::Timestamp) => Reflected::Node(SchemaNode::timestamp_millis()),
                None if ty.bare_name().is_empty() => {
                    debug!("Anonymous record cannot be named, falling back to string");
                    Reflected::Primitive(STRING.to_string())
                }
                None => self.expand_record(ty, record, cache)?,
            },
            TypeKind::Optional(_) | TypeKind::Dynamic => {
                debug!(type_name = ty.bare_name(), "Unsupported type, falling back to string");
                Reflected::Primitive(STRING.to_string())
            }
        };

        Ok(reflected)
    }

    fn apply_mapper(&self, ty: &TypeDescriptor) -> Result<Option<Reflected>> {
        let Some(mapper) = &self.mapper else {
            return Ok(None);
        };

        let result = match mapper.map(ty) {
            MapResult::Raw(value) => match MapResult::from_json(value) {
                Ok(decoded) => decoded,
                Err(err) if self.config.strict_mapper_results => return Err(err),
                Err(err) => {
                    warn!(type_name = ty.bare_name(), error = %err, "Ignoring mapper result");
                    return Ok(None);
                }
            },
            other => other,
        };

        if result.is_absent() {
            return Ok(None);
        }

        trace!(type_name = ty.bare_name(), "Type handled by mapper");
        let reflected = match result {
            MapResult::Primitive(name) => Reflected::Primitive(name),
            MapResult::Node(node) => Reflected::Node(node),
            MapResult::Nodes(nodes) => Reflected::Nodes(ty.bare_name().to_string(), nodes),
            MapResult::Absent | MapResult::Raw(_) => return Ok(None),
        };
        Ok(Some(reflected))
    }

    fn expand_record(
        &self,
        ty: &TypeDescriptor,
        record: &RecordDescriptor,
        cache: &mut RecordCache,
    ) -> Result<Reflected> {
        let name = ty.bare_name();

        // Anonymous records have no name to be referenced by.
        if !name.is_empty() && !cache.insert(self.record_key(ty)) {
            trace!(record = name, "Record already expanded, emitting reference");
            return Ok(Reflected::Reference(name.to_string()));
        }

        debug!(record = name, fields = record.fields.len(), "Expanding record");
        let mut fields = Vec::with_capacity(record.fields.len());
        self.expand_fields(record, &mut fields, cache)?;

        Ok(Reflected::Node(SchemaNode::record(name, fields)))
    }

    fn expand_fields(
        &self,
        record: &RecordDescriptor,
        out: &mut Vec<SchemaNode>,
        cache: &mut RecordCache,
    ) -> Result<()> {
        for field in &record.fields {
            self.reflect_field(field, out, cache)?;
        }
        Ok(())
    }

    /// Splices an inlined record's fields into `out` without touching the
    /// record cache.
    fn inline_record(
        &self,
        ty: &TypeDescriptor,
        record: &RecordDescriptor,
        out: &mut Vec<SchemaNode>,
        cache: &mut RecordCache,
    ) -> Result<()> {
        let key = self.record_key(ty);
        if key.is_empty() {
            return self.expand_fields(record, out, cache);
        }

        if !cache.enter_inline(key) {
            debug!(record = ty.bare_name(), "Record inlines itself, splicing nothing");
            return Ok(());
        }

        trace!(record = ty.bare_name(), fields = record.fields.len(), "Inlining record");
        let result = self.expand_fields(record, out, cache);
        cache.leave_inline(key);
        result
    }

    fn reflect_field(
        &self,
        field: &FieldDescriptor,
        out: &mut Vec<SchemaNode>,
        cache: &mut RecordCache,
    ) -> Result<()> {
        let primary = self.field_tag(field, &self.config.primary_tag);
        let secondary = self.field_tag(field, &self.config.secondary_tag);
        let flags = primary.flags | secondary.flags;
        let ty = field.ty.resolve();

        if flags.contains(TagFlags::INLINE) {
            let inner = ty.unwrap_optional();
            match inner.as_record() {
                Some(record) if record.well_known.is_none() => {
                    return self.inline_record(inner, record, out, cache);
                }
                _ => debug!(field = %field.ident, "Inline marker on a non-record field ignored"),
            }
        }

        let Some(name) = self.field_name(field, &primary, &secondary) else {
            trace!(field = %field.ident, "Field has no tag name, skipping");
            return Ok(());
        };

        let optional = flags.contains(TagFlags::OPTIONAL) || self.config.backward_transitive;
        let reflected = self.reflect_type(&ty, cache)?;
        compose_field(name, optional, reflected, out);
        Ok(())
    }

    fn field_tag(&self, field: &FieldDescriptor, namespace: &str) -> StructuredTag {
        field.tag(namespace).map(parse_tag).unwrap_or_default()
    }

    fn field_name(
        &self,
        field: &FieldDescriptor,
        primary: &StructuredTag,
        secondary: &StructuredTag,
    ) -> Option<String> {
        if self.config.skip_tag_field_names {
            Some(field.ident.clone())
        } else if !primary.name.is_empty() {
            Some(primary.name.clone())
        } else if !secondary.name.is_empty() {
            Some(secondary.name.clone())
        } else if self.config.emit_all_fields {
            Some(field.ident.clone())
        } else {
            None
        }
    }
}

/// Appends the field node(s) for a reflected field type.
fn compose_field(name: String, optional: bool, reflected: Reflected, out: &mut Vec<SchemaNode>) {
    match reflected {
        // Mapper-contributed siblings carry their own names.
        Reflected::Nodes(_, nodes) => out.extend(nodes),
        Reflected::Reference(type_name) if optional => out.push(SchemaNode::field(
            name,
            SchemaType::nullable(SchemaType::Name(type_name)),
        )),
        reflected if optional => out.push(SchemaNode::field(
            name,
            SchemaType::nullable(reflected.into_schema_type()),
        )),
        Reflected::Primitive(type_name) | Reflected::Reference(type_name) => {
            out.push(SchemaNode::field(name, SchemaType::Name(type_name)))
        }
        Reflected::Node(node) if node.is_complex() => out.push(SchemaNode::field(name, node)),
        Reflected::Node(node) => out.push(node.with_name(name)),
    }
}

/// Reflects a root type with the given configuration and no mapper.
pub fn reflect_value(root: &TypeDescriptor, config: &ReflectorConfig) -> Result<String> {
    Reflector::with_config(config.clone()).reflect_value(root)
}
