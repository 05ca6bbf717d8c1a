use crate::descriptor::PrimitiveType;
use crate::route::{path_segments, PathSegment, QueryParam, RouteDescriptor};
use crate::schema_generator::{primitive_to_schema, Schema};
use serde::{Deserialize, Serialize};

/// Parameter location (path, query)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Path,
    Query,
}

/// OpenAPI Parameter object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name
    pub name: String,
    /// Parameter location (path, query)
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    /// Whether the parameter is required
    pub required: bool,
    /// Parameter schema
    pub schema: Schema,
    /// Parameter description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One required string parameter per `:name` segment, left to right.
pub fn path_parameters(template: &str) -> Vec<Parameter> {
    path_segments(template)
        .filter_map(|segment| match segment {
            PathSegment::Param(name) => Some(Parameter {
                name: name.to_string(),
                location: ParameterLocation::Path,
                required: true,
                schema: primitive_to_schema(PrimitiveType::String),
                description: None,
            }),
            PathSegment::Literal(_) => None,
        })
        .collect()
}

/// Query parameters in declaration order. Undeclared kinds default to string.
pub fn query_parameters(declared: &[QueryParam]) -> Vec<Parameter> {
    declared
        .iter()
        .map(|param| Parameter {
            name: param.name.clone(),
            location: ParameterLocation::Query,
            required: param.required,
            schema: primitive_to_schema(param.kind.unwrap_or(PrimitiveType::String)),
            description: param.description.clone(),
        })
        .collect()
}

/// Path parameters followed by query parameters, or `None` if the route has
/// neither.
pub fn operation_parameters(route: &RouteDescriptor) -> Option<Vec<Parameter>> {
    let mut parameters = path_parameters(&route.path);
    parameters.extend(query_parameters(&route.query_params));

    if parameters.is_empty() {
        None
    } else {
        Some(parameters)
    }
}
