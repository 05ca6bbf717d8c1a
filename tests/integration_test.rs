use openapi_from_routes::{
    manifest::Manifest,
    openapi_builder::{build, OpenApiDocument},
    route::HttpMethod,
    serializer::{serialize_json, serialize_yaml},
    source::{load_sources, SourceScanner},
    type_resolver::TypeResolver,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::path::Path;
use tempfile::TempDir;

/// Helper function to create a temporary source tree
fn create_test_project(files: Vec<(&str, &str)>) -> TempDir {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");

    for (path, content) in files {
        let file_path = temp_dir.path().join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(&file_path, content).expect("Failed to write test file");
    }

    temp_dir
}

/// Build the fixture document from the route manifest and the model sources
fn build_fixture_document() -> OpenApiDocument {
    let temp_dir = create_test_project(vec![("src/models.rs", include_str!("fixtures/models.rs"))]);

    let mut resolver = TypeResolver::new(load_sources(&[temp_dir.path().to_path_buf()]));
    let manifest = Manifest::from_yaml_str(include_str!("fixtures/routes.yaml"))
        .expect("Failed to parse manifest");
    let input = manifest
        .into_build_input(&mut resolver)
        .expect("Failed to convert manifest");

    build(&input)
}

fn fixture_json() -> Value {
    let json = serialize_json(&build_fixture_document()).expect("Failed to serialize to JSON");
    serde_json::from_str(&json).expect("Generated JSON is not valid")
}

#[test]
fn test_scanner_finds_fixture_sources() {
    let temp_dir = create_test_project(vec![
        ("src/models.rs", include_str!("fixtures/models.rs")),
        ("src/nested/extra.rs", "pub struct Extra;"),
        ("target/debug/build.rs", "fn main() {}"),
        ("README.md", "# not rust"),
    ]);

    let result = SourceScanner::new(temp_dir.path().to_path_buf()).scan();
    assert!(result.warnings.is_empty());

    let names: Vec<_> = result
        .rust_files
        .iter()
        .map(|path| path.strip_prefix(temp_dir.path()).unwrap().to_path_buf())
        .collect();
    assert_eq!(
        names,
        vec![
            Path::new("src/models.rs").to_path_buf(),
            Path::new("src/nested/extra.rs").to_path_buf(),
        ]
    );
}

#[test]
fn test_document_info_and_servers() {
    let doc = fixture_json();

    assert_eq!(doc["openapi"], "3.0.0");
    assert_eq!(doc["info"]["title"], "Accounts API");
    assert_eq!(doc["info"]["version"], "2.1.0");
    assert_eq!(doc["info"]["description"], "User and category management");
    assert_eq!(doc["info"]["contact"]["email"], "platform@example.com");
    assert_eq!(doc["info"]["license"]["name"], "MIT");

    assert_eq!(
        doc["servers"],
        json!([
            { "url": "https://api.example.com", "description": "Production" },
            { "url": "http://localhost:8080" }
        ])
    );
    assert_eq!(doc["tags"][0]["name"], "users");
}

#[test]
fn test_paths_and_operations() {
    let document = build_fixture_document();

    let paths: Vec<_> = document.paths.keys().map(String::as_str).collect();
    assert_eq!(paths, vec!["/categories/{id}/tree", "/users", "/users/{id}"]);

    let users = &document.paths["/users"];
    let list = users.operation(HttpMethod::Get).expect("GET /users missing");
    assert_eq!(list.operation_id, "getUsers");
    assert_eq!(list.summary.as_deref(), Some("List users"));
    assert!(list.request_body.is_none());

    let create = users.operation(HttpMethod::Post).expect("POST /users missing");
    assert_eq!(create.operation_id, "postUsers");
    assert!(create.request_body.as_ref().is_some_and(|body| body.required));

    let by_id = &document.paths["/users/{id}"];
    assert_eq!(
        by_id.operation(HttpMethod::Get).map(|op| op.operation_id.as_str()),
        Some("getUsersById")
    );
    let delete = by_id.operation(HttpMethod::Delete).expect("DELETE /users/:id missing");
    assert!(delete.deprecated);
    assert!(by_id.operation(HttpMethod::Put).is_none());

    let tree = document.paths["/categories/{id}/tree"]
        .operation(HttpMethod::Get)
        .expect("GET /categories/:id/tree missing");
    assert_eq!(tree.operation_id, "getCategoriesByIdTree");
    assert_eq!(tree.tags, vec!["categories"]);
}

#[test]
fn test_parameters() {
    let doc = fixture_json();

    assert_eq!(
        doc["paths"]["/users"]["get"]["parameters"],
        json!([
            { "name": "page", "in": "query", "required": false, "schema": { "type": "integer" } },
            {
                "name": "role",
                "in": "query",
                "required": false,
                "schema": { "type": "string" },
                "description": "Filter by role"
            }
        ])
    );

    assert_eq!(
        doc["paths"]["/users/{id}"]["get"]["parameters"],
        json!([
            { "name": "id", "in": "path", "required": true, "schema": { "type": "string" } }
        ])
    );
    assert!(doc["paths"]["/users"]["post"].get("parameters").is_none());
}

#[test]
fn test_responses_and_request_bodies() {
    let doc = fixture_json();

    let create = &doc["paths"]["/users"]["post"];
    assert_eq!(
        create["requestBody"]["content"]["application/json"]["schema"],
        json!({ "$ref": "#/components/schemas/CreateUser" })
    );
    let statuses: Vec<_> = create["responses"].as_object().unwrap().keys().cloned().collect();
    assert_eq!(statuses, vec!["201", "400", "401", "403", "422", "500"]);
    assert_eq!(create["responses"]["201"]["description"], "Created");
    assert_eq!(
        create["responses"]["422"]["content"]["application/json"]["schema"],
        json!({ "$ref": "#/components/schemas/ValidationErrorResponse" })
    );

    let list = &doc["paths"]["/users"]["get"]["responses"];
    assert_eq!(
        list["200"]["content"]["application/json"]["schema"],
        json!({ "type": "array", "items": { "$ref": "#/components/schemas/User" } })
    );
    let statuses: Vec<_> = list.as_object().unwrap().keys().cloned().collect();
    assert_eq!(statuses, vec!["200", "500"]);

    let delete = &doc["paths"]["/users/{id}"]["delete"]["responses"];
    assert_eq!(delete["204"], json!({ "description": "No content" }));
    assert!(delete.get("404").is_some());
    assert!(delete.get("401").is_some());
}

#[test]
fn test_security_schemes() {
    let doc = fixture_json();

    assert_eq!(
        doc["components"]["securitySchemes"],
        json!({
            "apiKey": { "type": "apiKey", "in": "header", "name": "X-API-Key" },
            "basicAuth": { "type": "http", "scheme": "basic" },
            "bearerAuth": { "type": "http", "scheme": "bearer", "bearerFormat": "JWT" }
        })
    );
    assert_eq!(
        doc["paths"]["/users/{id}"]["get"]["security"],
        json!([{ "bearerAuth": [] }, { "apiKey": [] }])
    );
    assert!(doc["paths"]["/users"]["get"].get("security").is_none());
}

#[test]
fn test_component_schemas_from_sources() {
    let doc = fixture_json();
    let schemas = &doc["components"]["schemas"];

    let names: Vec<_> = schemas.as_object().unwrap().keys().cloned().collect();
    assert_eq!(
        names,
        vec![
            "Category",
            "CreateUser",
            "ErrorResponse",
            "FieldError",
            "User",
            "ValidationErrorResponse"
        ]
    );

    let user = &schemas["User"];
    assert_eq!(user["required"], json!(["id", "displayName"]));
    assert_eq!(user["properties"]["id"], json!({ "type": "string", "format": "uuid" }));
    assert_eq!(
        user["properties"]["displayName"],
        json!({
            "type": "string",
            "description": "Display name shown in listings",
            "minLength": 2,
            "maxLength": 50
        })
    );
    assert_eq!(user["properties"]["email"]["format"], "email");
    assert_eq!(
        user["properties"]["role"],
        json!({ "type": "string", "enum": ["admin", "member", "read-only"] })
    );
    assert_eq!(
        user["properties"]["createdAt"],
        json!({ "type": "string", "format": "date-time" })
    );
    assert_eq!(
        user["properties"]["manager"],
        json!({ "allOf": [{ "$ref": "#/components/schemas/User" }], "nullable": true })
    );
    assert_eq!(
        user["properties"]["attributes"],
        json!({ "type": "object", "additionalProperties": true })
    );
    assert!(user["properties"].get("passwordHash").is_none());

    let create = &schemas["CreateUser"];
    assert_eq!(create["required"], json!(["display_name", "email"]));
    assert_eq!(
        create["properties"]["role"],
        json!({ "type": "string", "enum": ["admin", "member"], "default": "member" })
    );
    assert_eq!(
        create["properties"]["age"],
        json!({
            "type": "integer",
            "format": "int32",
            "minimum": 13,
            "maximum": 130,
            "example": 30
        })
    );
}

#[test]
fn test_self_referencing_type() {
    let doc = fixture_json();
    let category = &doc["components"]["schemas"]["Category"];

    assert_eq!(
        category["properties"]["children"],
        json!({ "type": "array", "items": { "$ref": "#/components/schemas/Category" } })
    );
    assert_eq!(
        category["properties"]["parent"],
        json!({ "allOf": [{ "$ref": "#/components/schemas/Category" }], "nullable": true })
    );
}

#[test]
fn test_yaml_output_is_deterministic() {
    let first = serialize_yaml(&build_fixture_document()).expect("Failed to serialize to YAML");
    let second = serialize_yaml(&build_fixture_document()).expect("Failed to serialize to YAML");

    assert_eq!(first, second);
    assert!(first.contains("openapi: 3.0.0"));
    assert!(first.contains("/users/{id}:"));

    let parsed: OpenApiDocument = serde_yaml::from_str(&first).expect("Generated YAML is not valid");
    assert_eq!(parsed, build_fixture_document());
}
