//! openapi-from-routes - OpenAPI 3.0 documents from route descriptors.
//!
//! Routes are described as plain values ([`route::RouteDescriptor`]) that carry
//! the method, path template, security schemes and the shapes of their request
//! and response bodies. Shapes come from the [`descriptor::Describe`] trait or
//! from Rust `struct`/`enum` definitions read by [`type_resolver::TypeResolver`].
//! The engine turns them into a complete document with reusable component
//! schemas, parameters, standard error responses and security schemes.
//!
//! # Architecture
//!
//! 1. [`descriptor`] - abstract type shapes and the [`descriptor::Describe`] trait
//! 2. [`route`] - route descriptors and path templates
//! 3. [`source`] / [`type_resolver`] - reading shapes out of Rust sources
//! 4. [`registry`] / [`schema_generator`] - component schemas and reflection
//! 5. [`parameters`], [`responses`], [`security`] - operation pieces
//! 6. [`openapi_builder`] - assembles the document from a [`config::BuildInput`]
//! 7. [`serializer`] / [`swagger_ui`] - output
//! 8. [`manifest`] / [`cli`] - the file-driven command-line front end
//!
//! # Example Usage
//!
//! ```
//! use openapi_from_routes::config::{ApiConfig, BuildInput};
//! use openapi_from_routes::descriptor::{Describe, FieldDescriptor, Kind, TypeDescriptor};
//! use openapi_from_routes::openapi_builder::build;
//! use openapi_from_routes::route::RouteDescriptor;
//! use openapi_from_routes::serializer::serialize_yaml;
//!
//! struct CreateUser;
//!
//! impl Describe for CreateUser {
//!     fn kind() -> Kind {
//!         Kind::deferred("CreateUser", || {
//!             TypeDescriptor::named("CreateUser")
//!                 .field(FieldDescriptor::of::<String>("email").validate("required,email"))
//!         })
//!     }
//! }
//!
//! let routes = vec![
//!     RouteDescriptor::post("/users")
//!         .tag("users")
//!         .secured(&["bearerAuth"])
//!         .with_body::<CreateUser>()
//!         .with_response::<CreateUser>(201),
//! ];
//!
//! let document = build(&BuildInput::new(ApiConfig::new("Users API", "1.0.0"), routes));
//! assert!(document.components.schemas.contains_key("CreateUser"));
//! assert!(document.components.security_schemes.contains_key("bearerAuth"));
//!
//! let yaml = serialize_yaml(&document).unwrap();
//! assert!(yaml.contains("postUsers"));
//! ```

pub mod cli;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod manifest;
pub mod openapi_builder;
pub mod parameters;
pub mod registry;
pub mod responses;
pub mod route;
pub mod schema_generator;
pub mod security;
pub mod serializer;
pub mod source;
pub mod swagger_ui;
pub mod type_resolver;
