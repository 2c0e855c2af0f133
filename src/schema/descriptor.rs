// Type descriptors
//
// A type descriptor is an explicit description of a native type's shape.
// Reflection walks descriptors instead of relying on runtime introspection,
// so the same engine works for any type that can describe itself.

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::rc::Rc;
use std::sync::Arc;
use std::time::SystemTime;

/// Tag namespace of the primary serialization tag.
pub const JSON_TAG: &str = "json";

/// Tag namespace of the secondary storage tag.
pub const BSON_TAG: &str = "bson";

/// Scalar kinds understood by the reflector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Bool,
    I8,
    I16,
    I32,
    I64,
    Isize,
    U8,
    U16,
    U32,
    U64,
    Usize,
    F32,
    F64,
    Char,
    String,
}

impl PrimitiveKind {
    /// Returns true for textual kinds (usable as Avro map keys).
    pub fn is_string_like(&self) -> bool {
        matches!(self, PrimitiveKind::String | PrimitiveKind::Char)
    }
}

/// Records with a fixed, library-known schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WellKnownRecord {
    /// A point in time, rendered as `long` with `timestamp-millis`.
    Timestamp,
}

/// The shape of a type.
#[derive(Debug, Clone)]
pub enum TypeKind {
    Primitive(PrimitiveKind),
    Record(RecordDescriptor),
    /// Homogeneous sequence.
    Array(Box<TypeDescriptor>),
    Map {
        key: Box<TypeDescriptor>,
        value: Box<TypeDescriptor>,
    },
    /// One level of optional indirection.
    Optional(Box<TypeDescriptor>),
    /// Untyped or unsupported values.
    Dynamic,
}

/// A native type: an optional, possibly path-qualified name plus its shape.
#[derive(Debug, Clone)]
pub struct TypeDescriptor {
    name: Option<String>,
    kind: TypeKind,
}

impl TypeDescriptor {
    /// Creates an anonymous descriptor.
    pub fn new(kind: TypeKind) -> Self {
        Self { name: None, kind }
    }

    /// Creates a named descriptor. The name may be qualified (`app::models::User`).
    pub fn named(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: Some(name.into()),
            kind,
        }
    }

    /// Replaces the name, keeping the shape.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn primitive(kind: PrimitiveKind) -> Self {
        Self::new(TypeKind::Primitive(kind))
    }

    pub fn string() -> Self {
        Self::primitive(PrimitiveKind::String)
    }

    pub fn array(element: TypeDescriptor) -> Self {
        Self::new(TypeKind::Array(Box::new(element)))
    }

    pub fn map(key: TypeDescriptor, value: TypeDescriptor) -> Self {
        Self::new(TypeKind::Map {
            key: Box::new(key),
            value: Box::new(value),
        })
    }

    pub fn optional(inner: TypeDescriptor) -> Self {
        Self::new(TypeKind::Optional(Box::new(inner)))
    }

    pub fn dynamic() -> Self {
        Self::new(TypeKind::Dynamic)
    }

    /// Creates a named record with the given fields.
    pub fn record(name: impl Into<String>, fields: Vec<FieldDescriptor>) -> Self {
        Self::named(name, TypeKind::Record(RecordDescriptor::new(fields)))
    }

    /// Creates a named record that reflects as a millisecond timestamp.
    pub fn timestamp(name: impl Into<String>) -> Self {
        Self::named(
            name,
            TypeKind::Record(RecordDescriptor {
                fields: Vec::new(),
                well_known: Some(WellKnownRecord::Timestamp),
            }),
        )
    }

    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }

    /// The name as given, possibly qualified.
    pub fn qualified_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The last segment of the name (`User` for `app::models::User` or
    /// `models.User`), empty for anonymous types.
    pub fn bare_name(&self) -> &str {
        let name = self.name.as_deref().unwrap_or_default();
        let name = name.rsplit("::").next().unwrap_or(name);
        name.rsplit('.').next().unwrap_or(name)
    }

    /// Strips one level of optional indirection.
    pub fn unwrap_optional(&self) -> &TypeDescriptor {
        match &self.kind {
            TypeKind::Optional(inner) => inner,
            _ => self,
        }
    }

    /// Returns the record shape, if any.
    pub fn as_record(&self) -> Option<&RecordDescriptor> {
        match &self.kind {
            TypeKind::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Returns true if values of this type are strings.
    pub fn is_string_like(&self) -> bool {
        matches!(&self.kind, TypeKind::Primitive(kind) if kind.is_string_like())
    }
}

/// The fields of a record type.
#[derive(Debug, Clone, Default)]
pub struct RecordDescriptor {
    /// Fields in declaration order.
    pub fields: Vec<FieldDescriptor>,
    /// Set for records with a fixed schema.
    pub well_known: Option<WellKnownRecord>,
}

impl RecordDescriptor {
    pub fn new(fields: Vec<FieldDescriptor>) -> Self {
        Self {
            fields,
            well_known: None,
        }
    }
}

/// A field's type, either built or built on demand.
///
/// Deferred construction lets self-referential records describe themselves
/// without building an infinite descriptor.
#[derive(Debug, Clone)]
pub enum TypeRef {
    Resolved(Box<TypeDescriptor>),
    Deferred(fn() -> TypeDescriptor),
}

impl TypeRef {
    pub fn resolve(&self) -> Cow<'_, TypeDescriptor> {
        match self {
            TypeRef::Resolved(ty) => Cow::Borrowed(ty),
            TypeRef::Deferred(build) => Cow::Owned(build()),
        }
    }
}

/// One declared field of a record.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    /// Identifier as declared in the source type.
    pub ident: String,
    /// Raw tag strings keyed by tag namespace, in declaration order.
    pub tags: Vec<(String, String)>,
    pub ty: TypeRef,
}

impl FieldDescriptor {
    /// Creates an untagged field of the given type.
    pub fn new(ident: impl Into<String>, ty: TypeDescriptor) -> Self {
        Self {
            ident: ident.into(),
            tags: Vec::new(),
            ty: TypeRef::Resolved(Box::new(ty)),
        }
    }

    /// Creates an untagged field whose type is described by `T`, built lazily.
    pub fn of<T: Reflect + ?Sized>(ident: impl Into<String>) -> Self {
        Self {
            ident: ident.into(),
            tags: Vec::new(),
            ty: TypeRef::Deferred(T::type_descriptor),
        }
    }

    /// Attaches a raw tag string under a namespace, replacing any previous one.
    pub fn with_tag(mut self, namespace: impl Into<String>, tag: impl Into<String>) -> Self {
        let namespace = namespace.into();
        self.tags.retain(|(ns, _)| *ns != namespace);
        self.tags.push((namespace, tag.into()));
        self
    }

    /// Shorthand for `with_tag("json", tag)`.
    pub fn json(self, tag: impl Into<String>) -> Self {
        self.with_tag(JSON_TAG, tag)
    }

    /// Shorthand for `with_tag("bson", tag)`.
    pub fn bson(self, tag: impl Into<String>) -> Self {
        self.with_tag(BSON_TAG, tag)
    }

    /// Returns the raw tag string for a namespace.
    pub fn tag(&self, namespace: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|(ns, _)| ns == namespace)
            .map(|(_, tag)| tag.as_str())
    }
}

/// Types that can describe their own shape.
///
/// Implemented for the std scalar, collection and pointer types; record
/// types implement it by listing their fields.
pub trait Reflect {
    fn type_descriptor() -> TypeDescriptor;
}

macro_rules! impl_reflect_primitive {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl Reflect for $ty {
                fn type_descriptor() -> TypeDescriptor {
                    TypeDescriptor::primitive(PrimitiveKind::$kind)
                }
            }
        )*
    };
}

impl_reflect_primitive! {
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    isize => Isize,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    usize => Usize,
    f32 => F32,
    f64 => F64,
    char => Char,
    String => String,
    str => String,
}

macro_rules! impl_reflect_sequence {
    ($($ty:ident),* $(,)?) => {
        $(
            impl<T: Reflect> Reflect for $ty<T> {
                fn type_descriptor() -> TypeDescriptor {
                    TypeDescriptor::array(T::type_descriptor())
                }
            }
        )*
    };
}

impl_reflect_sequence!(Vec, VecDeque, BTreeSet);

impl<T: Reflect, S> Reflect for HashSet<T, S> {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::array(T::type_descriptor())
    }
}

impl<T: Reflect> Reflect for [T] {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::array(T::type_descriptor())
    }
}

impl<T: Reflect, const N: usize> Reflect for [T; N] {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::array(T::type_descriptor())
    }
}

impl<K: Reflect, V: Reflect, S> Reflect for HashMap<K, V, S> {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::map(K::type_descriptor(), V::type_descriptor())
    }
}

impl<K: Reflect, V: Reflect> Reflect for BTreeMap<K, V> {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::map(K::type_descriptor(), V::type_descriptor())
    }
}

impl<T: Reflect> Reflect for Option<T> {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::optional(T::type_descriptor())
    }
}

// Owning and shared pointers describe their pointee.
macro_rules! impl_reflect_transparent {
    ($($ty:ident),* $(,)?) => {
        $(
            impl<T: Reflect + ?Sized> Reflect for $ty<T> {
                fn type_descriptor() -> TypeDescriptor {
                    T::type_descriptor()
                }
            }
        )*
    };
}

impl_reflect_transparent!(Box, Arc, Rc);

impl<T: Reflect + ?Sized> Reflect for &T {
    fn type_descriptor() -> TypeDescriptor {
        T::type_descriptor()
    }
}

impl Reflect for SystemTime {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::timestamp("std::time::SystemTime")
    }
}

impl Reflect for serde_json::Value {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::dynamic().with_name("serde_json::Value")
    }
}
