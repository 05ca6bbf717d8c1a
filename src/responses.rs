//! Response synthesis: the declared success response plus the standard error
//! responses implied by a route's shape.

use crate::registry::{ERROR_RESPONSE, VALIDATION_ERROR_RESPONSE};
use crate::route::RouteDescriptor;
use crate::schema_generator::{Schema, SchemaGenerator};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Media type used for every request and response body.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Responses keyed by status code.
pub type Responses = BTreeMap<String, Response>;

/// OpenAPI MediaType object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaType {
    /// Schema for this media type
    pub schema: Schema,
}

/// OpenAPI Response object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Response description
    pub description: String,
    /// Response content
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<BTreeMap<String, MediaType>>,
}

impl Response {
    /// A response without a body
    pub fn empty(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            content: None,
        }
    }

    /// A JSON response with the given schema
    pub fn json(description: impl Into<String>, schema: Schema) -> Self {
        Self {
            description: description.into(),
            content: Some(json_content(schema)),
        }
    }
}

/// Wrap a schema as `application/json` content.
pub fn json_content(schema: Schema) -> BTreeMap<String, MediaType> {
    let mut content = BTreeMap::new();
    content.insert(JSON_CONTENT_TYPE.to_string(), MediaType { schema });
    content
}

fn error_response(description: &str, schema_name: &str) -> Response {
    Response::json(description, Schema::reference(schema_name))
}

/// Error responses implied by the route: a body may be malformed or invalid,
/// a secured route may be rejected, a path parameter may not match anything,
/// and every route may fail.
pub fn auto_responses(route: &RouteDescriptor) -> Responses {
    let mut responses = Responses::new();

    if route.body.is_some() {
        responses.insert("400".to_string(), error_response("Bad request", ERROR_RESPONSE));
        responses.insert(
            "422".to_string(),
            error_response("Validation error", VALIDATION_ERROR_RESPONSE),
        );
    }

    if route.is_secured() {
        responses.insert("401".to_string(), error_response("Unauthorized", ERROR_RESPONSE));
        responses.insert("403".to_string(), error_response("Forbidden", ERROR_RESPONSE));
    }

    if route.has_path_parameters() {
        responses.insert("404".to_string(), error_response("Not found", ERROR_RESPONSE));
    }

    responses.insert(
        "500".to_string(),
        error_response("Internal server error", ERROR_RESPONSE),
    );

    responses
}

/// Description used for a success status code.
pub fn success_description(status: u16) -> &'static str {
    match status {
        201 => "Created",
        202 => "Accepted",
        204 => "No content",
        _ => "Successful response",
    }
}

/// The declared success response with its status code, or `None` when the
/// route declares neither a response shape nor a status. The schema is
/// registered through the generator; a 204 never carries content.
pub fn success_response(
    route: &RouteDescriptor,
    generator: &mut SchemaGenerator,
) -> Option<(u16, Response)> {
    let status = route.success_status()?;
    let description = success_description(status);

    let response = match &route.response {
        Some(_) if status == 204 => {
            debug!("Dropping response body of 204 route {} {}", route.method, route.path);
            Response::empty(description)
        }
        Some(kind) => Response::json(description, generator.generate_schema(kind)),
        None => Response::empty(description),
    };
    Some((status, response))
}

/// All responses of an operation. The declared success response replaces any
/// synthesized entry at the same status code.
pub fn operation_responses(route: &RouteDescriptor, generator: &mut SchemaGenerator) -> Responses {
    let mut responses = auto_responses(route);
    if let Some((status, response)) = success_response(route, generator) {
        responses.insert(status.to_string(), response);
    }
    responses
}
