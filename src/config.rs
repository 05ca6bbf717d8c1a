use crate::route::RouteDescriptor;
use serde::{Deserialize, Serialize};

/// Title used when none is configured
pub const DEFAULT_TITLE: &str = "API";
/// Version used when none is configured
pub const DEFAULT_VERSION: &str = "1.0.0";

/// Document-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// API title
    pub title: String,
    /// API version
    pub version: String,
    /// API description
    pub description: Option<String>,
    pub contact: Option<Contact>,
    pub license: Option<License>,
    /// Servers, either `{url, description}` or `"url - description"`
    pub servers: Vec<Server>,
    /// Global tag definitions
    pub tags: Vec<Tag>,
}

/// OpenAPI Contact object
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// OpenAPI License object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct License {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// OpenAPI Server object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ServerEntry")]
pub struct Server {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Accepted spellings of a server entry
#[derive(Deserialize)]
#[serde(untagged)]
enum ServerEntry {
    Compact(String),
    Full {
        url: String,
        #[serde(default)]
        description: Option<String>,
    },
}

impl From<ServerEntry> for Server {
    fn from(entry: ServerEntry) -> Self {
        match entry {
            ServerEntry::Compact(text) => Server::parse(&text),
            ServerEntry::Full { url, description } => Server { url, description },
        }
    }
}

impl Server {
    pub fn new(url: impl Into<String>, description: Option<&str>) -> Self {
        Self {
            url: url.into(),
            description: description.map(str::to_string),
        }
    }

    /// Parse the compact `"https://api.example.com - Production"` form.
    pub fn parse(text: &str) -> Self {
        match text.split_once(" - ") {
            Some((url, description)) if !description.trim().is_empty() => {
                Self::new(url.trim(), Some(description.trim()))
            }
            Some((url, _)) => Self::new(url.trim(), None),
            None => Self::new(text.trim(), None),
        }
    }
}

/// OpenAPI Tag object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ApiConfig {
    pub fn new(title: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            version: version.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_contact(mut self, contact: Contact) -> Self {
        self.contact = Some(contact);
        self
    }

    pub fn with_license(mut self, name: impl Into<String>, url: Option<&str>) -> Self {
        self.license = Some(License {
            name: name.into(),
            url: url.map(str::to_string),
        });
        self
    }

    pub fn with_server(mut self, server: Server) -> Self {
        self.servers.push(server);
        self
    }

    pub fn with_tag(mut self, name: impl Into<String>, description: Option<&str>) -> Self {
        self.tags.push(Tag {
            name: name.into(),
            description: description.map(str::to_string),
        });
        self
    }

    /// Fill in the default title and version where they are missing.
    pub fn apply_defaults(mut self) -> Self {
        if self.title.trim().is_empty() {
            self.title = DEFAULT_TITLE.to_string();
        }
        if self.version.trim().is_empty() {
            self.version = DEFAULT_VERSION.to_string();
        }
        self
    }
}

/// Everything needed to build one document
#[derive(Debug, Clone, Default)]
pub struct BuildInput {
    pub config: ApiConfig,
    pub routes: Vec<RouteDescriptor>,
}

impl BuildInput {
    pub fn new(config: ApiConfig, routes: Vec<RouteDescriptor>) -> Self {
        Self { config, routes }
    }
}
