//! Serialization of OpenAPI documents to YAML or JSON.
//!
//! Every map in the document model is ordered, so the same input always yields
//! byte-identical output.

use crate::openapi_builder::OpenApiDocument;
use anyhow::{Context, Result};
use log::debug;
use std::fs;
use std::path::Path;

/// Serializes an OpenAPI document to YAML format.
///
/// # Example
///
/// ```
/// use openapi_from_routes::config::{ApiConfig, BuildInput};
/// use openapi_from_routes::openapi_builder::build;
/// use openapi_from_routes::route::RouteDescriptor;
/// use openapi_from_routes::serializer::serialize_yaml;
///
/// let input = BuildInput::new(ApiConfig::new("Pets", "1.0.0"), vec![RouteDescriptor::get("/pets")]);
/// let yaml = serialize_yaml(&build(&input)).unwrap();
/// assert!(yaml.contains("getPets"));
/// ```
pub fn serialize_yaml(doc: &OpenApiDocument) -> Result<String> {
    debug!("Serializing OpenAPI document to YAML");
    serde_yaml::to_string(doc).context("Failed to serialize OpenAPI document to YAML")
}

/// Serializes an OpenAPI document to pretty-printed JSON.
pub fn serialize_json(doc: &OpenApiDocument) -> Result<String> {
    debug!("Serializing OpenAPI document to JSON");
    serde_json::to_string_pretty(doc).context("Failed to serialize OpenAPI document to JSON")
}

/// Writes content to a file, creating parent directories as needed.
pub fn write_to_file(content: &str, path: &Path) -> Result<()> {
    debug!("Writing content to file: {}", path.display());

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    fs::write(path, content)
        .with_context(|| format!("Failed to write to file: {}", path.display()))?;

    debug!("Successfully wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}
