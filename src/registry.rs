//! Schema registry - per-build mapping from type name to its synthesized schema.
//!
//! Named object types are registered lazily the first time the introspector meets
//! them and every later occurrence becomes a `$ref`. The dedup key is the bare
//! declared name: the first structure registered under a name wins.

use crate::descriptor::{FieldDescriptor, Kind, TypeDescriptor};
use crate::schema_generator::Schema;
use log::{debug, warn};
use std::collections::{BTreeMap, HashSet};

/// Prefix of every component schema reference.
pub const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";

/// Generic error envelope used by 400/401/403/404/500 responses.
pub const ERROR_RESPONSE: &str = "ErrorResponse";
/// Envelope of a 422 response.
pub const VALIDATION_ERROR_RESPONSE: &str = "ValidationErrorResponse";
/// One item of a validation-error envelope.
pub const FIELD_ERROR: &str = "FieldError";

/// Build the `$ref` path for a component schema.
pub fn schema_ref_path(name: &str) -> String {
    format!("{}{}", SCHEMA_REF_PREFIX, name)
}

/// Registry of component schemas for a single build.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: BTreeMap<String, Schema>,
    /// Names whose schema is being built right now
    pending: HashSet<String>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the name is registered or currently being built.
    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name) || self.pending.contains(name)
    }

    /// Claim a name before its fields are visited, so that a reference back to
    /// the same type resolves to a `$ref` instead of recursing.
    ///
    /// Returns `false` if the name is already known.
    pub fn reserve(&mut self, name: &str) -> bool {
        if self.contains(name) {
            return false;
        }
        debug!("Reserving schema name: {}", name);
        self.pending.insert(name.to_string())
    }

    /// Register a schema under `name`. The first registration wins; later ones
    /// are dropped with a warning.
    pub fn register(&mut self, name: &str, schema: Schema) -> bool {
        self.pending.remove(name);

        if self.schemas.contains_key(name) {
            warn!(
                "Schema name collision for {}: keeping the first registered structure",
                name
            );
            return false;
        }

        debug!("Registering schema: {}", name);
        self.schemas.insert(name.to_string(), schema);
        true
    }

    pub fn get(&self, name: &str) -> Option<&Schema> {
        self.schemas.get(name)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    pub fn schemas(&self) -> &BTreeMap<String, Schema> {
        &self.schemas
    }

    pub fn into_schemas(self) -> BTreeMap<String, Schema> {
        self.schemas
    }
}

/// The fixed vocabulary of error shapes referenced by synthesized responses,
/// in registration order.
pub fn standard_schema_kinds() -> Vec<Kind> {
    let field_error = TypeDescriptor::named(FIELD_ERROR)
        .field(
            FieldDescriptor::of::<String>("field")
                .validate("required")
                .description("Name of the invalid field")
                .example("email"),
        )
        .field(
            FieldDescriptor::of::<String>("message")
                .validate("required")
                .description("Why the value was rejected")
                .example("must be a valid email"),
        );

    let error_response = TypeDescriptor::named(ERROR_RESPONSE)
        .field(
            FieldDescriptor::of::<i32>("status_code")
                .validate("required")
                .description("HTTP status code")
                .example("404"),
        )
        .field(
            FieldDescriptor::of::<String>("code")
                .description("Machine readable error code")
                .example("NOT_FOUND"),
        )
        .field(
            FieldDescriptor::of::<String>("message")
                .validate("required")
                .description("Human readable error message")
                .example("resource not found"),
        );

    let validation_error_response = TypeDescriptor::named(VALIDATION_ERROR_RESPONSE)
        .field(
            FieldDescriptor::of::<i32>("status_code")
                .validate("required")
                .description("HTTP status code")
                .example("422"),
        )
        .field(
            FieldDescriptor::of::<String>("message")
                .validate("required")
                .description("Human readable error message")
                .example("validation error"),
        )
        .field(
            FieldDescriptor::new("errors", Kind::array(Kind::Object(field_error.clone())))
                .validate("required")
                .description("One entry per rejected field"),
        );

    vec![
        Kind::Object(error_response),
        Kind::Object(validation_error_response),
        Kind::Object(field_error),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_ref_path() {
        assert_eq!(schema_ref_path("User"), "#/components/schemas/User");
    }

    #[test]
    fn test_first_registration_wins() {
        let mut registry = SchemaRegistry::new();
        assert!(registry.register("User", Schema::typed("object")));
        assert!(!registry.register("User", Schema::typed("string")));

        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.get("User").and_then(|s| s.schema_type.clone()),
            Some("object".to_string())
        );
    }

    #[test]
    fn test_reserve_marks_name_as_known() {
        let mut registry = SchemaRegistry::new();
        assert!(registry.reserve("Node"));
        assert!(registry.contains("Node"));
        assert!(!registry.reserve("Node"));

        // Reserved names are not emitted until registered
        assert!(registry.is_empty());
        assert!(registry.register("Node", Schema::typed("object")));
        assert!(registry.contains("Node"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_standard_schema_kinds() {
        let names: Vec<String> = standard_schema_kinds()
            .into_iter()
            .filter_map(|kind| match kind {
                Kind::Object(descriptor) => Some(descriptor.name),
                _ => None,
            })
            .collect();

        assert_eq!(
            names,
            vec![ERROR_RESPONSE, VALIDATION_ERROR_RESPONSE, FIELD_ERROR]
        );
    }
}
