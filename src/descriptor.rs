//! Type descriptors - the abstract, introspectable view of a data type's shape.
//!
//! The schema engine never looks at concrete Rust types. It consumes [`Kind`] values,
//! which can come from two providers:
//!
//! - the [`Describe`] trait, implemented by types wired into routes in code
//!   (`RouteDescriptor::with_body::<CreateUser>()`)
//! - the source-based [`crate::type_resolver::TypeResolver`], which reads `struct`
//!   and `enum` definitions out of Rust files
//!
//! # Example
//!
//! ```
//! use openapi_from_routes::descriptor::{Describe, FieldDescriptor, Kind, TypeDescriptor};
//!
//! struct UserDto {
//!     id: String,
//!     name: String,
//! }
//!
//! impl Describe for UserDto {
//!     fn kind() -> Kind {
//!         Kind::deferred("UserDto", || {
//!             TypeDescriptor::named("UserDto")
//!                 .field(FieldDescriptor::of::<String>("id"))
//!                 .field(FieldDescriptor::of::<String>("name").validate("required,min=2,max=50"))
//!         })
//!     }
//! }
//!
//! assert!(UserDto::kind().is_named_object());
//! ```

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;
use std::time::SystemTime;

/// Serialized name that marks a field as never serialized.
pub const SKIP_SENTINEL: &str = "-";

/// Scalar kinds that map directly onto an OpenAPI `(type, format)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    String,
    Char,
    I8,
    I16,
    I32,
    I64,
    I128,
    Isize,
    U8,
    U16,
    U32,
    U64,
    U128,
    Usize,
    F32,
    F64,
    Bool,
}

impl PrimitiveType {
    /// Parse a Rust primitive type name (`i32`, `String`, `bool`, ...).
    pub fn from_rust_name(type_name: &str) -> Option<Self> {
        match type_name {
            "String" | "str" => Some(Self::String),
            "char" => Some(Self::Char),
            "i8" => Some(Self::I8),
            "i16" => Some(Self::I16),
            "i32" => Some(Self::I32),
            "i64" => Some(Self::I64),
            "i128" => Some(Self::I128),
            "isize" => Some(Self::Isize),
            "u8" => Some(Self::U8),
            "u16" => Some(Self::U16),
            "u32" => Some(Self::U32),
            "u64" => Some(Self::U64),
            "u128" => Some(Self::U128),
            "usize" => Some(Self::Usize),
            "f32" => Some(Self::F32),
            "f64" => Some(Self::F64),
            "bool" => Some(Self::Bool),
            _ => None,
        }
    }

    /// Parse either an OpenAPI type name (`integer`, `number`, ...) or a Rust
    /// primitive name. Used for declared query parameters.
    pub fn from_declared_name(type_name: &str) -> Option<Self> {
        match type_name.to_ascii_lowercase().as_str() {
            "string" => Some(Self::String),
            "integer" | "int" => Some(Self::Isize),
            "int32" => Some(Self::I32),
            "int64" => Some(Self::I64),
            "number" | "double" => Some(Self::F64),
            "float" => Some(Self::F32),
            "boolean" | "bool" => Some(Self::Bool),
            _ => Self::from_rust_name(type_name),
        }
    }
}

/// The shape of a value as seen by the schema engine.
#[derive(Debug, Clone, PartialEq)]
pub enum Kind {
    /// A scalar value
    Primitive(PrimitiveType),
    /// A point in time, always documented as `string` / `date-time`
    DateTime,
    /// A structured type whose fields are already known. An empty name means
    /// an anonymous, inline shape.
    Object(TypeDescriptor),
    /// A named structured type whose fields are produced on demand
    Deferred(DeferredType),
    /// A sequence of elements
    Array(Box<Kind>),
    /// A value that may be absent or null
    Optional(Box<Kind>),
    /// A map or otherwise dynamic value; its structure is not inspected
    Map,
    /// A closed set of string values
    Enum(Vec<String>),
    /// Anything the provider could not classify
    Unknown(String),
}

impl Kind {
    /// The kind of a type implementing [`Describe`].
    pub fn of<T: Describe + ?Sized>() -> Self {
        T::kind()
    }

    /// A named object whose descriptor is built lazily by `describe`.
    ///
    /// Deferring the descriptor lets a type refer to itself through one of its
    /// fields without recursing while the kind is being constructed.
    pub fn deferred(name: impl Into<String>, describe: fn() -> TypeDescriptor) -> Self {
        Kind::Deferred(DeferredType {
            name: name.into(),
            describe,
        })
    }

    pub fn array(inner: Kind) -> Self {
        Kind::Array(Box::new(inner))
    }

    pub fn optional(inner: Kind) -> Self {
        Kind::Optional(Box::new(inner))
    }

    /// Whether the kind is a structured type with a declared name.
    pub fn is_named_object(&self) -> bool {
        match self {
            Kind::Object(descriptor) => !descriptor.is_anonymous(),
            Kind::Deferred(_) => true,
            _ => false,
        }
    }

    /// Whether field-level constraint enrichment applies to this kind.
    pub fn is_primitive(&self) -> bool {
        matches!(self, Kind::Primitive(_) | Kind::Enum(_))
    }
}

/// A named object type described on demand.
#[derive(Clone)]
pub struct DeferredType {
    pub name: String,
    describe: fn() -> TypeDescriptor,
}

impl DeferredType {
    /// Produce the full descriptor for this type.
    pub fn describe(&self) -> TypeDescriptor {
        (self.describe)()
    }
}

impl fmt::Debug for DeferredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeferredType")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

// Nominal identity: two deferred types with the same name are the same schema.
impl PartialEq for DeferredType {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

/// Field layout of a structured type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeDescriptor {
    /// Declared type name, empty for anonymous shapes
    pub name: String,
    /// Fields in declaration order
    pub fields: Vec<FieldDescriptor>,
}

impl TypeDescriptor {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Append a field, builder style.
    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    pub fn is_anonymous(&self) -> bool {
        self.name.is_empty()
    }
}

/// One field of a structured type.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    /// Serialized name of the field
    pub name: String,
    /// Shape of the field's value
    pub kind: Kind,
    /// Documentation and validation annotations
    pub tags: FieldTags,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, kind: Kind) -> Self {
        Self {
            name: name.into(),
            kind,
            tags: FieldTags::default(),
        }
    }

    /// A field whose kind comes from a [`Describe`] implementation.
    pub fn of<T: Describe + ?Sized>(name: impl Into<String>) -> Self {
        Self::new(name, T::kind())
    }

    pub fn validate(mut self, rules: impl Into<String>) -> Self {
        self.tags.validate = Some(rules.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.tags.description = Some(description.into());
        self
    }

    pub fn example(mut self, example: impl Into<String>) -> Self {
        self.tags.example = Some(example.into());
        self
    }

    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.tags.format = Some(format.into());
        self
    }

    pub fn default_value(mut self, default: impl Into<String>) -> Self {
        self.tags.default = Some(default.into());
        self
    }

    /// Whether the field appears in the serialized form at all.
    pub fn is_emitted(&self) -> bool {
        !self.name.is_empty() && self.name != SKIP_SENTINEL
    }

    /// Whether the field belongs in the parent object's `required` list.
    pub fn is_required(&self) -> bool {
        self.tags
            .rules()
            .iter()
            .any(|rule| *rule == ValidationRule::Required)
    }
}

/// Annotations attached to a field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldTags {
    /// Comma-separated validation tokens, e.g. `required,min=2,max=50`
    pub validate: Option<String>,
    pub description: Option<String>,
    pub example: Option<String>,
    /// Explicit OpenAPI format override
    pub format: Option<String>,
    pub default: Option<String>,
}

impl FieldTags {
    /// Parse the validation tokens in declaration order.
    pub fn rules(&self) -> Vec<ValidationRule> {
        self.validate
            .as_deref()
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|token| !token.is_empty())
                    .map(ValidationRule::parse)
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// One validation token from a field's `validate` annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationRule {
    Required,
    Min(String),
    Max(String),
    Email,
    Uuid,
    Url,
    OneOf(Vec<String>),
    /// Tokens without a documentation counterpart (`numeric`, `gte=1`, ...)
    Other(String),
}

impl ValidationRule {
    pub fn parse(token: &str) -> Self {
        match token.split_once('=') {
            Some(("min", value)) => ValidationRule::Min(value.trim().to_string()),
            Some(("max", value)) => ValidationRule::Max(value.trim().to_string()),
            Some(("oneof", values)) => {
                ValidationRule::OneOf(values.split_whitespace().map(str::to_string).collect())
            }
            Some(_) => ValidationRule::Other(token.to_string()),
            None => match token {
                "required" => ValidationRule::Required,
                "email" => ValidationRule::Email,
                "uuid" => ValidationRule::Uuid,
                "url" => ValidationRule::Url,
                other => ValidationRule::Other(other.to_string()),
            },
        }
    }
}

/// Capability implemented by types that can describe their own shape.
///
/// This is the code-side TypeDescription provider: route wiring code calls
/// `RouteDescriptor::with_body::<T>()` and the engine only ever sees `T::kind()`.
pub trait Describe {
    fn kind() -> Kind;
}

macro_rules! describe_primitive {
    ($($ty:ty => $prim:ident),* $(,)?) => {
        $(
            impl Describe for $ty {
                fn kind() -> Kind {
                    Kind::Primitive(PrimitiveType::$prim)
                }
            }
        )*
    };
}

describe_primitive! {
    String => String,
    str => String,
    char => Char,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    i128 => I128,
    isize => Isize,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    u128 => U128,
    usize => Usize,
    f32 => F32,
    f64 => F64,
    bool => Bool,
}

impl<T: Describe> Describe for Vec<T> {
    fn kind() -> Kind {
        Kind::array(T::kind())
    }
}

impl<T: Describe> Describe for [T] {
    fn kind() -> Kind {
        Kind::array(T::kind())
    }
}

impl<T: Describe> Describe for VecDeque<T> {
    fn kind() -> Kind {
        Kind::array(T::kind())
    }
}

impl<T: Describe, S> Describe for HashSet<T, S> {
    fn kind() -> Kind {
        Kind::array(T::kind())
    }
}

impl<T: Describe> Describe for BTreeSet<T> {
    fn kind() -> Kind {
        Kind::array(T::kind())
    }
}

impl<T: Describe> Describe for Option<T> {
    fn kind() -> Kind {
        Kind::optional(T::kind())
    }
}

impl<T: Describe + ?Sized> Describe for &T {
    fn kind() -> Kind {
        T::kind()
    }
}

impl<T: Describe + ?Sized> Describe for Box<T> {
    fn kind() -> Kind {
        T::kind()
    }
}

impl<T: Describe + ?Sized> Describe for Arc<T> {
    fn kind() -> Kind {
        T::kind()
    }
}

impl<T: Describe + ?Sized> Describe for Rc<T> {
    fn kind() -> Kind {
        T::kind()
    }
}

impl<K, V, S> Describe for HashMap<K, V, S> {
    fn kind() -> Kind {
        Kind::Map
    }
}

impl<K, V> Describe for BTreeMap<K, V> {
    fn kind() -> Kind {
        Kind::Map
    }
}

impl Describe for serde_json::Value {
    fn kind() -> Kind {
        Kind::Map
    }
}

impl Describe for serde_json::Map<String, serde_json::Value> {
    fn kind() -> Kind {
        Kind::Map
    }
}

impl<Tz: chrono::TimeZone> Describe for chrono::DateTime<Tz> {
    fn kind() -> Kind {
        Kind::DateTime
    }
}

impl Describe for chrono::NaiveDateTime {
    fn kind() -> Kind {
        Kind::DateTime
    }
}

impl Describe for SystemTime {
    fn kind() -> Kind {
        Kind::DateTime
    }
}
