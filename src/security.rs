//! Security scheme inference.
//!
//! A route only names the schemes it accepts. The scheme definitions placed in
//! `components.securitySchemes` are guessed from those names.

use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Header carrying the key for inferred `apiKey` schemes.
pub const API_KEY_HEADER: &str = "X-API-Key";

/// A single security requirement: scheme name to required scopes.
pub type SecurityRequirement = BTreeMap<String, Vec<String>>;

/// OpenAPI Security Scheme object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityScheme {
    /// `http` or `apiKey`
    #[serde(rename = "type")]
    pub scheme_type: String,
    /// HTTP authorization scheme (`bearer`, `basic`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
    #[serde(rename = "bearerFormat", skip_serializing_if = "Option::is_none")]
    pub bearer_format: Option<String>,
    /// Location of an API key (`header`)
    #[serde(rename = "in", skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Name of the header carrying an API key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl SecurityScheme {
    pub fn bearer() -> Self {
        Self {
            scheme_type: "http".to_string(),
            scheme: Some("bearer".to_string()),
            bearer_format: Some("JWT".to_string()),
            location: None,
            name: None,
        }
    }

    pub fn basic() -> Self {
        Self {
            scheme_type: "http".to_string(),
            scheme: Some("basic".to_string()),
            bearer_format: None,
            location: None,
            name: None,
        }
    }

    pub fn api_key_header(header: &str) -> Self {
        Self {
            scheme_type: "apiKey".to_string(),
            scheme: None,
            bearer_format: None,
            location: Some("header".to_string()),
            name: Some(header.to_string()),
        }
    }
}

/// Infer a scheme definition from its name, case-insensitively.
pub fn infer_security_scheme(name: &str) -> SecurityScheme {
    let lowered = name.to_lowercase();

    let scheme = if lowered.contains("bearer") {
        SecurityScheme::bearer()
    } else if lowered.contains("basic") {
        SecurityScheme::basic()
    } else {
        SecurityScheme::api_key_header(API_KEY_HEADER)
    };

    debug!("Inferred {} security scheme for {}", scheme.scheme_type, name);
    scheme
}

/// One requirement per scheme name, so that any one of them satisfies the
/// operation.
pub fn security_requirements(secured_by: &[String]) -> Vec<SecurityRequirement> {
    secured_by
        .iter()
        .map(|name| {
            let mut requirement = SecurityRequirement::new();
            requirement.insert(name.clone(), Vec::new());
            requirement
        })
        .collect()
}

/// Record a scheme for each name not seen yet.
pub fn register_schemes(schemes: &mut BTreeMap<String, SecurityScheme>, secured_by: &[String]) {
    for name in secured_by {
        schemes
            .entry(name.clone())
            .or_insert_with(|| infer_security_scheme(name));
    }
}
