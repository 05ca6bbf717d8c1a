//! Route descriptors - the declarative description of one documented endpoint.
//!
//! Routes are assembled once at wiring time with a small builder API and are
//! immutable afterwards:
//!
//! ```
//! use openapi_from_routes::route::RouteDescriptor;
//!
//! let route = RouteDescriptor::get("/users/:id")
//!     .describe("Get a user", Some("Returns a single user by id"))
//!     .tag("users")
//!     .secured(&["bearerAuth"])
//!     .with_response::<String>(200)
//!     .query_param("expand", None, false, Some("Related resources to include"));
//!
//! assert_eq!(route.path_parameter_names(), vec!["id"]);
//! ```

use crate::descriptor::{Describe, Kind, PrimitiveType};
use std::fmt;

/// Prefix that marks a path segment as a named parameter.
pub const PARAM_SIGIL: char = ':';

/// HTTP methods that can be documented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// Lowercase name, as used for the operation key under a path item
    pub fn lowercase(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Patch => "patch",
            HttpMethod::Delete => "delete",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for HttpMethod {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "PATCH" => Ok(HttpMethod::Patch),
            "DELETE" => Ok(HttpMethod::Delete),
            other => Err(format!("unsupported HTTP method: {}", other)),
        }
    }
}

/// One `/`-separated segment of a path template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathSegment<'a> {
    Literal(&'a str),
    Param(&'a str),
}

impl<'a> PathSegment<'a> {
    /// A lone `:` has no parameter name and stays a literal.
    pub fn parse(segment: &'a str) -> Self {
        match segment.strip_prefix(PARAM_SIGIL) {
            Some(name) if !name.is_empty() => PathSegment::Param(name),
            _ => PathSegment::Literal(segment),
        }
    }
}

/// Split a path template into its segments, keeping empty ones so that the
/// template can be rebuilt position by position.
pub fn path_segments(path: &str) -> impl Iterator<Item = PathSegment<'_>> {
    path.split('/').map(PathSegment::parse)
}

/// A declared query string parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryParam {
    pub name: String,
    /// Declared kind; `None` documents the parameter as a string
    pub kind: Option<PrimitiveType>,
    pub required: bool,
    pub description: Option<String>,
}

/// Complete documentation metadata for a single endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteDescriptor {
    pub method: HttpMethod,
    /// Path template, parameters marked with `:` (e.g. `/users/:id`)
    pub path: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    /// Security scheme names; empty means the route is public
    pub secured_by: Vec<String>,
    /// Request body shape
    pub body: Option<Kind>,
    /// Success response shape
    pub response: Option<Kind>,
    /// Declared success status; `None` means 200 when a response shape is set
    /// and no success entry otherwise
    pub response_status: Option<u16>,
    pub query_params: Vec<QueryParam>,
    pub deprecated: bool,
}

impl RouteDescriptor {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            summary: None,
            description: None,
            tags: Vec::new(),
            secured_by: Vec::new(),
            body: None,
            response: None,
            response_status: None,
            query_params: Vec::new(),
            deprecated: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Patch, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    /// Set the summary and, optionally, a longer description.
    pub fn describe(mut self, summary: impl Into<String>, description: Option<&str>) -> Self {
        self.summary = Some(summary.into());
        if let Some(description) = description {
            self.description = Some(description.to_string());
        }
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Document the security schemes accepted by the route. Any one of them
    /// is enough to authenticate.
    pub fn secured(mut self, schemes: &[&str]) -> Self {
        self.secured_by
            .extend(schemes.iter().map(|scheme| scheme.to_string()));
        self
    }

    pub fn with_body<T: Describe + ?Sized>(self) -> Self {
        self.with_body_kind(T::kind())
    }

    pub fn with_body_kind(mut self, kind: Kind) -> Self {
        self.body = Some(kind);
        self
    }

    pub fn with_response<T: Describe + ?Sized>(self, status: u16) -> Self {
        self.with_response_kind(T::kind(), status)
    }

    pub fn with_response_kind(mut self, kind: Kind, status: u16) -> Self {
        self.response = Some(kind);
        self.response_status = Some(status);
        self
    }

    /// Declare a success status without a response body, e.g. 204.
    pub fn with_status(mut self, status: u16) -> Self {
        self.response_status = Some(status);
        self
    }

    /// Status code of the documented success response, if there is one.
    pub fn success_status(&self) -> Option<u16> {
        match (self.response_status, &self.response) {
            (Some(status), _) => Some(status),
            (None, Some(_)) => Some(200),
            (None, None) => None,
        }
    }

    pub fn query_param(
        mut self,
        name: impl Into<String>,
        kind: Option<PrimitiveType>,
        required: bool,
        description: Option<&str>,
    ) -> Self {
        self.query_params.push(QueryParam {
            name: name.into(),
            kind,
            required,
            description: description.map(str::to_string),
        });
        self
    }

    pub fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }

    /// Names of the path parameters, left to right.
    pub fn path_parameter_names(&self) -> Vec<&str> {
        path_segments(&self.path)
            .filter_map(|segment| match segment {
                PathSegment::Param(name) => Some(name),
                PathSegment::Literal(_) => None,
            })
            .collect()
    }

    pub fn has_path_parameters(&self) -> bool {
        path_segments(&self.path).any(|segment| matches!(segment, PathSegment::Param(_)))
    }

    pub fn is_secured(&self) -> bool {
        !self.secured_by.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_parsing() {
        assert_eq!(HttpMethod::try_from("get"), Ok(HttpMethod::Get));
        assert_eq!(HttpMethod::try_from(" PATCH "), Ok(HttpMethod::Patch));
        assert!(HttpMethod::try_from("OPTIONS").is_err());
    }

    #[test]
    fn test_method_names() {
        assert_eq!(HttpMethod::Delete.as_str(), "DELETE");
        assert_eq!(HttpMethod::Delete.lowercase(), "delete");
        assert_eq!(HttpMethod::Put.to_string(), "PUT");
    }

    #[test]
    fn test_path_segments() {
        let segments: Vec<_> = path_segments("/users/:id/posts").collect();
        assert_eq!(
            segments,
            vec![
                PathSegment::Literal(""),
                PathSegment::Literal("users"),
                PathSegment::Param("id"),
                PathSegment::Literal("posts"),
            ]
        );
    }

    #[test]
    fn test_bare_sigil_is_literal() {
        assert_eq!(PathSegment::parse(":"), PathSegment::Literal(":"));

        let route = RouteDescriptor::get("/users/:");
        assert!(route.path_parameter_names().is_empty());
        assert!(!route.has_path_parameters());
    }

    #[test]
    fn test_success_status() {
        let route = RouteDescriptor::delete("/users/:id");
        assert_eq!(route.success_status(), None);

        let route = RouteDescriptor::delete("/users/:id").with_status(204);
        assert_eq!(route.success_status(), Some(204));

        let mut route = RouteDescriptor::get("/users").with_response::<String>(200);
        route.response_status = None;
        assert_eq!(route.success_status(), Some(200));
    }

    #[test]
    fn test_path_parameter_names() {
        let route = RouteDescriptor::get("/users/:userId/posts/:postId");
        assert_eq!(route.path_parameter_names(), vec!["userId", "postId"]);
        assert!(route.has_path_parameters());

        let route = RouteDescriptor::get("/users");
        assert!(route.path_parameter_names().is_empty());
        assert!(!route.has_path_parameters());
    }

    #[test]
    fn test_builder_defaults() {
        let route = RouteDescriptor::post("/users");
        assert_eq!(route.method, HttpMethod::Post);
        assert_eq!(route.response_status, None);
        assert_eq!(route.success_status(), None);
        assert!(route.body.is_none());
        assert!(route.response.is_none());
        assert!(!route.is_secured());
        assert!(!route.deprecated);
    }

    #[test]
    fn test_builder_chain() {
        let route = RouteDescriptor::post("/users")
            .describe("Create user", None)
            .tag("users")
            .tag("admin")
            .secured(&["bearerAuth", "apiKey"])
            .with_body::<String>()
            .with_response::<Vec<String>>(201)
            .query_param("dry_run", Some(PrimitiveType::Bool), false, None)
            .deprecated();

        assert_eq!(route.summary.as_deref(), Some("Create user"));
        assert!(route.description.is_none());
        assert_eq!(route.tags, vec!["users", "admin"]);
        assert_eq!(route.secured_by, vec!["bearerAuth", "apiKey"]);
        assert_eq!(route.body, Some(Kind::Primitive(PrimitiveType::String)));
        assert_eq!(route.success_status(), Some(201));
        assert_eq!(route.query_params.len(), 1);
        assert_eq!(route.query_params[0].kind, Some(PrimitiveType::Bool));
        assert!(route.deprecated);
    }
}
