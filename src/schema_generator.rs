use crate::descriptor::{FieldDescriptor, FieldTags, Kind, PrimitiveType, TypeDescriptor, ValidationRule};
use crate::registry::{schema_ref_path, standard_schema_kinds, SchemaRegistry};
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::collections::BTreeMap;

/// Schema generator - converts type descriptors to OpenAPI schemas
///
/// The generator owns the [`SchemaRegistry`] of one build. It is created at the
/// start of a build, threaded by `&mut` through every route, and consumed when
/// the document is assembled.
pub struct SchemaGenerator {
    /// Component schemas collected so far
    registry: SchemaRegistry,
}

/// OpenAPI Schema definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Reference to a component schema
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// The type of the schema (string, integer, object, array, etc.)
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,
    /// Format for primitive types (e.g., "int32", "int64", "email", "date-time")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Properties for object types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, Schema>>,
    /// Required field names for object types, in field order
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
    /// Items schema for array types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    /// Used to attach annotations to a reference
    #[serde(rename = "allOf", skip_serializing_if = "Option::is_none")]
    pub all_of: Option<Vec<Schema>>,
    #[serde(rename = "additionalProperties", skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<bool>,
    /// Enum values for enum types
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,
    #[serde(rename = "minLength", skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(rename = "maxLength", skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl Schema {
    /// A schema with only `type` set
    pub fn typed(schema_type: &str) -> Self {
        Self {
            schema_type: Some(schema_type.to_string()),
            ..Self::default()
        }
    }

    pub fn with_format(mut self, format: &str) -> Self {
        self.format = Some(format.to_string());
        self
    }

    /// A `$ref` to a component schema
    pub fn reference(name: &str) -> Self {
        Self {
            reference: Some(schema_ref_path(name)),
            ..Self::default()
        }
    }

    pub fn array(items: Schema) -> Self {
        Self {
            items: Some(Box::new(items)),
            ..Self::typed("array")
        }
    }

    pub fn is_reference(&self) -> bool {
        self.reference.is_some()
    }

    /// Mark the schema as nullable. A `$ref` cannot carry siblings, so it is
    /// wrapped in `allOf` first.
    pub fn into_nullable(self) -> Self {
        let mut schema = self.into_annotatable();
        schema.nullable = Some(true);
        schema
    }

    fn into_annotatable(self) -> Self {
        if self.is_reference() {
            Self {
                all_of: Some(vec![self]),
                ..Self::default()
            }
        } else {
            self
        }
    }
}

impl SchemaGenerator {
    /// Create a generator whose registry already holds the standard error schemas
    pub fn new() -> Self {
        let mut generator = Self::with_registry(SchemaRegistry::new());
        for kind in standard_schema_kinds() {
            generator.generate_schema(&kind);
        }
        generator
    }

    /// Create a generator around an existing registry, without pre-registration
    pub fn with_registry(registry: SchemaRegistry) -> Self {
        debug!("Initializing SchemaGenerator");
        Self { registry }
    }

    /// Generate a schema for a kind. Named object types are registered and
    /// returned as a `$ref`.
    pub fn generate_schema(&mut self, kind: &Kind) -> Schema {
        match kind {
            Kind::Primitive(primitive) => primitive_to_schema(*primitive),
            Kind::DateTime => Schema::typed("string").with_format("date-time"),
            Kind::Object(descriptor) if descriptor.is_anonymous() => {
                debug!("Inlining anonymous object schema");
                self.object_schema(descriptor)
            }
            Kind::Object(descriptor) => {
                self.named_reference(&descriptor.name, |generator| {
                    generator.object_schema(descriptor)
                })
            }
            Kind::Deferred(deferred) => self.named_reference(&deferred.name, |generator| {
                generator.object_schema(&deferred.describe())
            }),
            Kind::Array(inner) => Schema::array(self.generate_schema(inner)),
            Kind::Optional(inner) => self.generate_schema(inner).into_nullable(),
            Kind::Map => Schema {
                additional_properties: Some(true),
                ..Schema::typed("object")
            },
            Kind::Enum(variants) => Schema {
                enum_values: Some(variants.clone()),
                ..Schema::typed("string")
            },
            Kind::Unknown(name) => {
                // Fallback for unknown types
                debug!("Unknown type: {}, using string placeholder", name);
                Schema::typed("string")
            }
        }
    }

    /// Return a `$ref` to `name`, building and registering its schema first if
    /// the registry does not know it yet.
    fn named_reference<F>(&mut self, name: &str, build: F) -> Schema
    where
        F: FnOnce(&mut Self) -> Schema,
    {
        if self.registry.contains(name) {
            debug!("Schema for {} already exists", name);
            return Schema::reference(name);
        }

        debug!("Generating object schema for: {}", name);
        self.registry.reserve(name);
        let schema = build(self);
        self.registry.register(name, schema);

        Schema::reference(name)
    }

    /// Generate the inline object schema for a descriptor
    fn object_schema(&mut self, descriptor: &TypeDescriptor) -> Schema {
        let mut properties = BTreeMap::new();
        let mut required: Vec<String> = Vec::new();

        for field in &descriptor.fields {
            if !field.is_emitted() {
                debug!("Skipping field without serialized name in {}", descriptor.name);
                continue;
            }

            let schema = self.field_schema(field);
            properties.insert(field.name.clone(), schema);

            if field.is_required() && !required.contains(&field.name) {
                required.push(field.name.clone());
            }
        }

        Schema {
            properties: Some(properties),
            required: if required.is_empty() {
                None
            } else {
                Some(required)
            },
            ..Schema::typed("object")
        }
    }

    /// Generate the schema of a single field, including its annotations
    fn field_schema(&mut self, field: &FieldDescriptor) -> Schema {
        let mut schema = self.generate_schema(&field.kind);

        if field.kind.is_primitive() {
            apply_constraints(&mut schema, &field.tags);
        }

        let tags = &field.tags;
        if tags.description.is_none() && tags.example.is_none() && tags.default.is_none() {
            return schema;
        }

        let mut schema = schema.into_annotatable();
        let value_type = schema.schema_type.clone();
        if let Some(description) = &tags.description {
            schema.description = Some(description.clone());
        }
        if let Some(example) = &tags.example {
            schema.example = Some(typed_value(example, value_type.as_deref()));
        }
        if let Some(default) = &tags.default {
            schema.default = Some(typed_value(default, value_type.as_deref()));
        }
        schema
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Get all generated schemas
    pub fn get_schemas(&self) -> &BTreeMap<String, Schema> {
        self.registry.schemas()
    }

    pub fn into_registry(self) -> SchemaRegistry {
        self.registry
    }
}

impl Default for SchemaGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert a primitive type to an OpenAPI schema
pub fn primitive_to_schema(primitive: PrimitiveType) -> Schema {
    let (schema_type, format) = match primitive {
        PrimitiveType::String | PrimitiveType::Char => ("string", None),
        PrimitiveType::I8 | PrimitiveType::I16 | PrimitiveType::I32 => ("integer", Some("int32")),
        PrimitiveType::U8 | PrimitiveType::U16 => ("integer", Some("int32")),
        // u32 overflows int32
        PrimitiveType::U32 | PrimitiveType::I64 | PrimitiveType::I128 => ("integer", Some("int64")),
        // No signed format holds the full u64 range
        PrimitiveType::U64 | PrimitiveType::U128 => ("integer", None),
        PrimitiveType::Isize | PrimitiveType::Usize => ("integer", None),
        PrimitiveType::F32 => ("number", Some("float")),
        PrimitiveType::F64 => ("number", Some("double")),
        PrimitiveType::Bool => ("boolean", None),
    };

    Schema {
        format: format.map(str::to_string),
        ..Schema::typed(schema_type)
    }
}

/// Apply validation-derived constraints to a primitive field schema
fn apply_constraints(schema: &mut Schema, tags: &FieldTags) {
    let rules = tags.rules();

    if let Some(format) = &tags.format {
        schema.format = Some(format.clone());
    } else {
        let inferred = [
            (ValidationRule::Email, "email"),
            (ValidationRule::Uuid, "uuid"),
            (ValidationRule::Url, "uri"),
        ]
        .into_iter()
        .find(|(rule, _)| rules.contains(rule));

        if let Some((_, format)) = inferred {
            schema.format = Some(format.to_string());
        }
    }

    let is_string = schema.schema_type.as_deref() == Some("string");
    for rule in rules {
        match rule {
            ValidationRule::Min(value) if is_string => schema.min_length = parse_length(&value),
            ValidationRule::Max(value) if is_string => schema.max_length = parse_length(&value),
            ValidationRule::Min(value) => schema.minimum = parse_number(&value),
            ValidationRule::Max(value) => schema.maximum = parse_number(&value),
            ValidationRule::OneOf(values) => schema.enum_values = Some(values),
            _ => {}
        }
    }
}

fn parse_length(raw: &str) -> Option<u64> {
    let length = raw.parse::<u64>().ok();
    if length.is_none() {
        debug!("Ignoring non-integer length constraint: {}", raw);
    }
    length
}

fn parse_number(raw: &str) -> Option<Number> {
    if let Ok(integer) = raw.parse::<i64>() {
        return Some(Number::from(integer));
    }
    let number = raw.parse::<f64>().ok().and_then(Number::from_f64);
    if number.is_none() {
        debug!("Ignoring non-numeric bound: {}", raw);
    }
    number
}

/// Interpret annotation text as a JSON value of the schema's type, keeping it
/// as a string when it does not parse.
fn typed_value(raw: &str, schema_type: Option<&str>) -> Value {
    let typed = match schema_type {
        Some("integer") => raw.parse::<i64>().ok().map(Value::from),
        Some("number") => parse_number(raw).map(Value::Number),
        Some("boolean") => raw.parse::<bool>().ok().map(Value::Bool),
        _ => None,
    };
    typed.unwrap_or_else(|| Value::String(raw.to_string()))
}
