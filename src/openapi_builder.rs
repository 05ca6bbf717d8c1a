use crate::config::{ApiConfig, BuildInput, Contact, License, Server, Tag};
use crate::parameters::{operation_parameters, Parameter};
use crate::route::{path_segments, HttpMethod, PathSegment, RouteDescriptor};
use crate::responses::{json_content, operation_responses, MediaType, Responses};
use crate::schema_generator::{Schema, SchemaGenerator};
use crate::security::{register_schemes, security_requirements, SecurityRequirement, SecurityScheme};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// OpenAPI version written into every document
pub const OPENAPI_VERSION: &str = "3.0.0";

/// OpenAPI document builder
pub struct OpenApiBuilder {
    /// OpenAPI info section
    info: Info,
    servers: Vec<Server>,
    tags: Vec<Tag>,
    /// Paths collection (URL path -> PathItem)
    paths: BTreeMap<String, PathItem>,
    /// Security schemes referenced by any route, inferred once per name
    security_schemes: BTreeMap<String, SecurityScheme>,
}

/// OpenAPI Info object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Info {
    /// API title
    pub title: String,
    /// API version
    pub version: String,
    /// API description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<Contact>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<License>,
}

/// OpenAPI PathItem object - represents all operations for a single path
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathItem {
    /// GET operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    /// POST operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    /// PUT operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    /// DELETE operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
    /// PATCH operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
}

impl PathItem {
    /// The slot holding the operation for `method`
    fn slot(&mut self, method: HttpMethod) -> &mut Option<Operation> {
        match method {
            HttpMethod::Get => &mut self.get,
            HttpMethod::Post => &mut self.post,
            HttpMethod::Put => &mut self.put,
            HttpMethod::Delete => &mut self.delete,
            HttpMethod::Patch => &mut self.patch,
        }
    }

    pub fn operation(&self, method: HttpMethod) -> Option<&Operation> {
        match method {
            HttpMethod::Get => self.get.as_ref(),
            HttpMethod::Post => self.post.as_ref(),
            HttpMethod::Put => self.put.as_ref(),
            HttpMethod::Delete => self.delete.as_ref(),
            HttpMethod::Patch => self.patch.as_ref(),
        }
    }
}

/// OpenAPI Operation object - represents a single API operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    /// Operation summary
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Operation description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Operation ID
    #[serde(rename = "operationId")]
    pub operation_id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Parameters (path, query)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<Parameter>>,
    /// Request body
    #[serde(rename = "requestBody", skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,
    /// Responses keyed by status code
    pub responses: Responses,
    /// Alternative security requirements
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security: Option<Vec<SecurityRequirement>>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub deprecated: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// OpenAPI RequestBody object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestBody {
    /// Whether the request body is required
    pub required: bool,
    /// Content types and their schemas
    pub content: BTreeMap<String, MediaType>,
}

/// OpenAPI Components object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Components {
    /// Schema definitions
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub schemas: BTreeMap<String, Schema>,
    #[serde(
        rename = "securitySchemes",
        default,
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub security_schemes: BTreeMap<String, SecurityScheme>,
}

/// Complete OpenAPI document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenApiDocument {
    /// OpenAPI version
    pub openapi: String,
    /// API info
    pub info: Info,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub servers: Vec<Server>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
    /// API paths
    pub paths: BTreeMap<String, PathItem>,
    /// Components (schemas, security schemes)
    pub components: Components,
}

/// Build a complete document from a configuration and its routes.
pub fn build(input: &BuildInput) -> OpenApiDocument {
    info!("Building OpenAPI document for {} routes", input.routes.len());

    let mut generator = SchemaGenerator::new();
    let mut builder = OpenApiBuilder::new(&input.config);
    for route in &input.routes {
        builder.add_route(route, &mut generator);
    }
    builder.build(generator)
}

impl OpenApiBuilder {
    /// Create a builder for the given document configuration
    pub fn new(config: &ApiConfig) -> Self {
        debug!("Initializing OpenApiBuilder");
        let config = config.clone().apply_defaults();

        Self {
            info: Info {
                title: config.title,
                version: config.version,
                description: config.description,
                contact: config.contact,
                license: config.license,
            },
            servers: config.servers,
            tags: config.tags,
            paths: BTreeMap::new(),
            security_schemes: BTreeMap::new(),
        }
    }

    /// Add a route to the OpenAPI document
    pub fn add_route(&mut self, route: &RouteDescriptor, schema_gen: &mut SchemaGenerator) {
        debug!("Adding route: {} {}", route.method, route.path);

        // Convert path parameters from :param to {param} format
        let openapi_path = convert_path_format(&route.path);

        // Generate request body if present
        let request_body = route.body.as_ref().map(|kind| RequestBody {
            required: true,
            content: json_content(schema_gen.generate_schema(kind)),
        });

        let security = if route.is_secured() {
            register_schemes(&mut self.security_schemes, &route.secured_by);
            Some(security_requirements(&route.secured_by))
        } else {
            None
        };

        let operation = Operation {
            summary: route.summary.clone(),
            description: route.description.clone(),
            operation_id: operation_id(route.method, &route.path),
            tags: dedup_tags(&route.tags),
            parameters: operation_parameters(route),
            request_body,
            responses: operation_responses(route, schema_gen),
            security,
            deprecated: route.deprecated,
        };

        // Add operation to the appropriate path and method
        let slot = self.paths.entry(openapi_path.clone()).or_default().slot(route.method);
        if slot.is_some() {
            warn!(
                "Duplicate operation {} {}: replacing the earlier definition",
                route.method, openapi_path
            );
        }
        *slot = Some(operation);
    }

    /// Build the final OpenAPI document
    pub fn build(self, schema_gen: SchemaGenerator) -> OpenApiDocument {
        debug!("Building final OpenAPI document");

        let schemas = schema_gen.into_registry().into_schemas();
        info!(
            "Generated {} paths, {} schemas and {} security schemes",
            self.paths.len(),
            schemas.len(),
            self.security_schemes.len()
        );

        OpenApiDocument {
            openapi: OPENAPI_VERSION.to_string(),
            info: self.info,
            servers: self.servers,
            tags: self.tags,
            paths: self.paths,
            components: Components {
                schemas,
                security_schemes: self.security_schemes,
            },
        }
    }
}

/// Convert path format from :param to OpenAPI {param} format
pub fn convert_path_format(path: &str) -> String {
    path_segments(path)
        .map(|segment| match segment {
            PathSegment::Param(name) => format!("{{{}}}", name),
            PathSegment::Literal(literal) => literal.to_string(),
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Derive an operation ID from the method and path template, e.g.
/// `GET /users/:id/posts/:postId` becomes `getUsersByIdPostsByPostId`.
pub fn operation_id(method: HttpMethod, path: &str) -> String {
    let mut id = method.lowercase().to_string();

    for segment in path_segments(path) {
        match segment {
            PathSegment::Literal("") => {}
            PathSegment::Param(name) => {
                id.push_str("By");
                id.push_str(&capitalize(name));
            }
            PathSegment::Literal(literal) => {
                for word in literal.split(|c: char| !c.is_alphanumeric()) {
                    id.push_str(&capitalize(word));
                }
            }
        }
    }

    id
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Drop repeated tags, keeping the first occurrence.
fn dedup_tags(tags: &[String]) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        if !unique.contains(tag) {
            unique.push(tag.clone());
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{Describe, FieldDescriptor, Kind, PrimitiveType, TypeDescriptor};
    use crate::registry::{ERROR_RESPONSE, FIELD_ERROR, VALIDATION_ERROR_RESPONSE};
    use crate::responses::JSON_CONTENT_TYPE;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    struct UserDto;

    impl Describe for UserDto {
        fn kind() -> Kind {
            Kind::deferred("UserDTO", || {
                TypeDescriptor::named("UserDTO")
                    .field(FieldDescriptor::of::<String>("id"))
                    .field(FieldDescriptor::of::<String>("name"))
            })
        }
    }

    struct CreateUserRequest;

    impl Describe for CreateUserRequest {
        fn kind() -> Kind {
            Kind::deferred("CreateUserRequest", || {
                TypeDescriptor::named("CreateUserRequest")
                    .field(FieldDescriptor::of::<String>("name").validate("required,min=2,max=50"))
                    .field(FieldDescriptor::of::<i32>("age").validate("required,min=2,max=50"))
                    .field(FieldDescriptor::new("profile", Kind::Object(profile())))
            })
        }
    }

    fn profile() -> TypeDescriptor {
        TypeDescriptor::named("Profile").field(FieldDescriptor::of::<String>("bio"))
    }

    /// Helper function to build a document from routes with the default config
    fn build_routes(routes: Vec<RouteDescriptor>) -> OpenApiDocument {
        build(&BuildInput::new(ApiConfig::default(), routes))
    }

    fn operation<'a>(document: &'a OpenApiDocument, path: &str, method: HttpMethod) -> &'a Operation {
        document.paths[path].operation(method).unwrap()
    }

    fn response_codes(operation: &Operation) -> Vec<&str> {
        operation.responses.keys().map(String::as_str).collect()
    }

    #[test]
    fn test_new_builder_defaults() {
        let builder = OpenApiBuilder::new(&ApiConfig::default());

        assert_eq!(builder.info.title, "API");
        assert_eq!(builder.info.version, "1.0.0");
        assert!(builder.info.description.is_none());
        assert!(builder.paths.is_empty());
    }

    #[test]
    fn test_info_from_config() {
        let config = ApiConfig::new("My API", "2.0.0")
            .with_description("Custom description")
            .with_license("MIT", Some("https://opensource.org/licenses/MIT"))
            .with_server(Server::parse("https://api.example.com - Production"))
            .with_tag("users", Some("User operations"));

        let document = build(&BuildInput::new(config, Vec::new()));

        assert_eq!(document.info.title, "My API");
        assert_eq!(document.info.version, "2.0.0");
        assert_eq!(document.info.description.as_deref(), Some("Custom description"));
        assert_eq!(document.servers[0].url, "https://api.example.com");
        assert_eq!(document.tags[0].name, "users");
    }

    #[test]
    fn test_get_route_with_path_parameter_and_response() {
        let document = build_routes(vec![RouteDescriptor::get("/users/:id")
            .describe("Get user", None)
            .with_response::<UserDto>(200)]);

        assert!(document.paths.contains_key("/users/{id}"));
        let operation = operation(&document, "/users/{id}", HttpMethod::Get);

        assert_eq!(operation.operation_id, "getUsersById");
        assert_eq!(operation.summary.as_deref(), Some("Get user"));

        let parameters = operation.parameters.as_ref().unwrap();
        assert_eq!(parameters.len(), 1);
        assert_eq!(parameters[0].name, "id");
        assert!(parameters[0].required);
        assert_eq!(parameters[0].schema, Schema::typed("string"));

        let success = &operation.responses["200"];
        assert_eq!(success.description, "Successful response");
        assert_eq!(
            success.content.as_ref().unwrap()[JSON_CONTENT_TYPE].schema,
            Schema::reference("UserDTO")
        );
        assert_eq!(response_codes(operation), vec!["200", "404", "500"]);

        let user = &document.components.schemas["UserDTO"];
        let properties = user.properties.as_ref().unwrap();
        assert!(properties.contains_key("id"));
        assert!(properties.contains_key("name"));
    }

    #[test]
    fn test_post_route_with_request_body() {
        let document = build_routes(vec![RouteDescriptor::post("/users")
            .with_body::<CreateUserRequest>()
            .with_response::<UserDto>(201)]);

        let operation = operation(&document, "/users", HttpMethod::Post);
        let request_body = operation.request_body.as_ref().unwrap();
        assert!(request_body.required);
        assert_eq!(
            request_body.content[JSON_CONTENT_TYPE].schema,
            Schema::reference("CreateUserRequest")
        );

        assert_eq!(response_codes(operation), vec!["201", "400", "422", "500"]);
        assert_eq!(operation.responses["201"].description, "Created");

        let schemas = &document.components.schemas;
        let request = &schemas["CreateUserRequest"];
        let properties = request.properties.as_ref().unwrap();
        assert_eq!(properties["name"].min_length, Some(2));
        assert_eq!(properties["name"].max_length, Some(50));
        assert_eq!(properties["age"].minimum, Some(serde_json::Number::from(2)));
        assert_eq!(properties["age"].maximum, Some(serde_json::Number::from(50)));
        assert_eq!(
            request.required,
            Some(vec!["name".to_string(), "age".to_string()])
        );

        // Nested named types are registered too
        assert!(schemas.contains_key("Profile"));
    }

    #[test]
    fn test_secured_route_with_alternative_schemes() {
        let document = build_routes(vec![RouteDescriptor::get("/me").secured(&["bearerAuth", "apiKey"])]);

        let operation = operation(&document, "/me", HttpMethod::Get);
        assert_eq!(
            serde_json::to_value(operation.security.as_ref().unwrap()).unwrap(),
            json!([{ "bearerAuth": [] }, { "apiKey": [] }])
        );
        assert_eq!(response_codes(operation), vec!["401", "403", "500"]);

        let schemes = &document.components.security_schemes;
        assert_eq!(schemes["bearerAuth"], SecurityScheme::bearer());
        assert_eq!(schemes["apiKey"], SecurityScheme::api_key_header("X-API-Key"));
    }

    #[test]
    fn test_route_without_response_has_no_success_entry() {
        let document = build_routes(vec![RouteDescriptor::delete("/users/:id").secured(&["bearerAuth"])]);

        let secured = operation(&document, "/users/{id}", HttpMethod::Delete);
        assert_eq!(response_codes(secured), vec!["401", "403", "404", "500"]);

        let document = build_routes(vec![RouteDescriptor::delete("/users/:id").with_status(204)]);
        let no_content = operation(&document, "/users/{id}", HttpMethod::Delete);
        assert_eq!(response_codes(no_content), vec!["204", "404", "500"]);
        assert!(no_content.responses["204"].content.is_none());
    }

    #[test]
    fn test_bare_sigil_segment_stays_literal() {
        let document = build_routes(vec![RouteDescriptor::get("/users/:")]);

        assert_eq!(convert_path_format("/users/:"), "/users/:");
        let operation = operation(&document, "/users/:", HttpMethod::Get);
        assert_eq!(operation.operation_id, "getUsers");
        assert!(operation.parameters.is_none());
        assert_eq!(response_codes(operation), vec!["500"]);
    }

    #[test]
    fn test_public_routes_have_no_security() {
        let document = build_routes(vec![RouteDescriptor::get("/health")]);

        let operation = operation(&document, "/health", HttpMethod::Get);
        assert!(operation.security.is_none());
        assert!(operation.parameters.is_none());
        assert!(operation.request_body.is_none());
        assert!(document.components.security_schemes.is_empty());

        let value = serde_json::to_value(&document).unwrap();
        assert!(value["components"].get("securitySchemes").is_none());
    }

    #[test]
    fn test_standard_schemas_always_present() {
        let document = build_routes(Vec::new());

        let names: Vec<&str> = document.components.schemas.keys().map(String::as_str).collect();
        assert_eq!(names, vec![ERROR_RESPONSE, FIELD_ERROR, VALIDATION_ERROR_RESPONSE]);
    }

    #[test]
    fn test_multiple_routes_same_path() {
        let document = build_routes(vec![
            RouteDescriptor::get("/users"),
            RouteDescriptor::post("/users"),
            RouteDescriptor::put("/users"),
            RouteDescriptor::patch("/users"),
            RouteDescriptor::delete("/users"),
        ]);

        // Should have only one path entry
        assert_eq!(document.paths.len(), 1);

        let path_item = &document.paths["/users"];
        assert_eq!(path_item.get.as_ref().unwrap().operation_id, "getUsers");
        assert_eq!(path_item.post.as_ref().unwrap().operation_id, "postUsers");
        assert_eq!(path_item.put.as_ref().unwrap().operation_id, "putUsers");
        assert_eq!(path_item.patch.as_ref().unwrap().operation_id, "patchUsers");
        assert_eq!(path_item.delete.as_ref().unwrap().operation_id, "deleteUsers");
    }

    #[test]
    fn test_duplicate_operation_keeps_later_route() {
        let document = build_routes(vec![
            RouteDescriptor::get("/users").describe("First", None),
            RouteDescriptor::get("/users").describe("Second", None),
        ]);

        let operation = operation(&document, "/users", HttpMethod::Get);
        assert_eq!(operation.summary.as_deref(), Some("Second"));
    }

    #[test]
    fn test_tags_deduplicated_in_order() {
        let document = build_routes(vec![RouteDescriptor::get("/users")
            .tag("users")
            .tag("admin")
            .tag("users")]);

        let operation = operation(&document, "/users", HttpMethod::Get);
        assert_eq!(operation.tags, vec!["users", "admin"]);
    }

    #[test]
    fn test_query_parameters_and_deprecation() {
        let document = build_routes(vec![RouteDescriptor::get("/users")
            .query_param("page", Some(PrimitiveType::I32), false, None)
            .deprecated()]);

        let operation = operation(&document, "/users", HttpMethod::Get);
        let parameters = operation.parameters.as_ref().unwrap();
        assert_eq!(parameters[0].name, "page");
        assert!(!parameters[0].required);
        assert!(operation.deprecated);
    }

    #[test]
    fn test_convert_path_format() {
        assert_eq!(convert_path_format("/users/:id/posts/:post_id"), "/users/{id}/posts/{post_id}");
        assert_eq!(convert_path_format("/users/list"), "/users/list");
        assert_eq!(convert_path_format("/"), "/");
        assert_eq!(convert_path_format("/files/v1.0/:name"), "/files/v1.0/{name}");
    }

    #[test]
    fn test_operation_id() {
        assert_eq!(operation_id(HttpMethod::Get, "/users/:id"), "getUsersById");
        assert_eq!(operation_id(HttpMethod::Post, "/v1/users"), "postV1Users");
        assert_eq!(
            operation_id(HttpMethod::Patch, "/users/:id/posts/:postId"),
            "patchUsersByIdPostsByPostId"
        );
        assert_eq!(operation_id(HttpMethod::Get, "/"), "get");
        assert_eq!(operation_id(HttpMethod::Get, "/user-profiles/"), "getUserProfiles");
        assert_eq!(operation_id(HttpMethod::Delete, "/api_keys/:key"), "deleteApiKeysByKey");
        assert_eq!(operation_id(HttpMethod::Get, "/users/:"), "getUsers");
    }

    #[test]
    fn test_build_is_deterministic() {
        let routes = vec![
            RouteDescriptor::post("/users").with_body::<CreateUserRequest>(),
            RouteDescriptor::get("/users/:id").with_response::<UserDto>(200),
        ];

        let first = serde_json::to_string(&build_routes(routes.clone())).unwrap();
        let second = serde_json::to_string(&build_routes(routes)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_operation_serialization_shape() {
        let document = build_routes(vec![RouteDescriptor::get("/health")]);
        let value = serde_json::to_value(&document).unwrap();

        assert_eq!(value["openapi"], json!("3.0.0"));
        assert_eq!(
            value["paths"]["/health"]["get"],
            json!({
                "operationId": "getHealth",
                "responses": {
                    "500": {
                        "description": "Internal server error",
                        "content": {
                            "application/json": {
                                "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                            }
                        }
                    }
                }
            })
        );
    }
}
