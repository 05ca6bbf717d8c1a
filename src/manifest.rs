//! Route manifest - a YAML or JSON file declaring the document configuration
//! and the routes to document.
//!
//! ```yaml
//! title: Users API
//! version: 2.0.0
//! servers: ["https://api.example.com - Production"]
//! routes:
//!   - method: GET
//!     path: /users/:id
//!     summary: Get a user
//!     tags: [users]
//!     secured: [bearerAuth]
//!     response: UserDto
//!     query:
//!       - { name: expand, type: string, description: Related resources }
//! ```
//!
//! `body` and `response` are Rust type expressions, resolved against the Rust
//! sources handed to the [`TypeResolver`].

use crate::config::{ApiConfig, BuildInput};
use crate::descriptor::{Kind, PrimitiveType};
use crate::error::{Error, Result};
use crate::route::{HttpMethod, RouteDescriptor};
use crate::type_resolver::TypeResolver;
use log::{debug, info, warn};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Parsed manifest file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Manifest {
    /// Document configuration (title, version, servers, ...)
    #[serde(flatten)]
    pub config: ApiConfig,
    #[serde(default)]
    pub routes: Vec<RouteEntry>,
}

/// One route as written in the manifest
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RouteEntry {
    pub method: String,
    pub path: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    /// Accepted security scheme names
    pub secured: Vec<String>,
    /// Request body type expression
    pub body: Option<String>,
    /// Success response type expression
    pub response: Option<String>,
    /// Success status code; 200 when a response is given without one
    pub status: Option<u16>,
    pub query: Vec<QueryEntry>,
    pub deprecated: bool,
}

/// A declared query parameter
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct QueryEntry {
    pub name: String,
    /// `string`, `integer`, `number`, `boolean` or a Rust primitive name
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub required: bool,
    pub description: Option<String>,
}

impl Manifest {
    /// Load a manifest, choosing JSON for `.json` files and YAML otherwise.
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading manifest: {}", path.display());
        let content = fs::read_to_string(path)?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let manifest = if is_json {
            Self::from_json_str(&content)?
        } else {
            Self::from_yaml_str(&content)?
        };

        info!("Loaded {} routes from {}", manifest.routes.len(), path.display());
        Ok(manifest)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Convert every entry into a route descriptor, resolving type
    /// expressions through `resolver`.
    pub fn into_build_input(self, resolver: &mut TypeResolver) -> Result<BuildInput> {
        let routes = self
            .routes
            .iter()
            .map(|entry| entry.to_route(resolver))
            .collect::<Result<Vec<_>>>()?;

        Ok(BuildInput::new(self.config, routes))
    }
}

impl RouteEntry {
    /// Build the route descriptor for this entry
    pub fn to_route(&self, resolver: &mut TypeResolver) -> Result<RouteDescriptor> {
        let method = HttpMethod::try_from(self.method.as_str())
            .map_err(|e| Error::InvalidArgument(format!("route {}: {}", self.path, e)))?;

        if !self.path.starts_with('/') {
            return Err(Error::InvalidArgument(format!(
                "route {} {}: path must start with '/'",
                method, self.path
            )));
        }

        let mut route = RouteDescriptor::new(method, self.path.clone());
        route.summary = self.summary.clone();
        route.description = self.description.clone();
        route.tags = self.tags.clone();
        route.secured_by = self.secured.clone();
        route.deprecated = self.deprecated;

        if let Some(body) = &self.body {
            route = route.with_body_kind(self.resolve(resolver, body)?);
        }

        if let Some(response) = &self.response {
            route.response = Some(self.resolve(resolver, response)?);
        }
        route.response_status = self.status;

        for query in &self.query {
            let kind = query.kind.as_deref().and_then(|name| {
                let primitive = PrimitiveType::from_declared_name(name);
                if primitive.is_none() {
                    warn!(
                        "Unknown type {} for query parameter {} of {} {}, documenting as string",
                        name, query.name, method, self.path
                    );
                }
                primitive
            });
            route = route.query_param(
                query.name.clone(),
                kind,
                query.required,
                query.description.as_deref(),
            );
        }

        debug!("Loaded route {} {}", method, self.path);
        Ok(route)
    }

    fn resolve(&self, resolver: &mut TypeResolver, expr: &str) -> Result<Kind> {
        resolver.kind_from_type_expr(expr).map_err(|e| {
            Error::InvalidArgument(format!(
                "route {} {}: invalid type expression `{}`: {}",
                self.method, self.path, expr, e
            ))
        })
    }
}
