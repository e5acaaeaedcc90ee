//! Resource Registry - Load resource schemas from JSON
//!
//! Resource schemas are embedded at compile time and describe the attributes
//! a definition must carry. Definitions arrive as generic key/value objects
//! and are checked here before anything is sent to the service.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;
use thiserror::Error;
use url::Url;

/// Embedded resource JSON files (compiled into the binary)
const RESOURCE_FILES: &[&str] = &[include_str!("../resources/applet.json")];

/// Attribute value type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeType {
    String,
}

/// Extra checks applied to string attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeFormat {
    Url,
}

/// Attribute definition from JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeDef {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: AttributeType,
    #[serde(default)]
    pub required: bool,
    /// Set by the service, never by the definition
    #[serde(default)]
    pub computed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<AttributeFormat>,
    #[serde(default)]
    pub description: String,
}

/// Resource definition from JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceDef {
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    pub id_field: String,
    #[serde(default)]
    pub importable: bool,
    pub attributes: Vec<AttributeDef>,
}

/// Root structure of resources/*.json
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceConfig {
    #[serde(default)]
    pub resources: HashMap<String, ResourceDef>,
}

/// A definition that does not satisfy its resource schema
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttributeError {
    #[error("resource definition must be an object")]
    NotAnObject,
    #[error("missing required attribute \"{0}\"")]
    Missing(String),
    #[error("attribute \"{name}\" must be a {expected}")]
    WrongType { name: String, expected: &'static str },
    #[error("attribute \"{0}\" must not be empty")]
    Empty(String),
    #[error("attribute \"{name}\" is not a valid URL: {reason}")]
    InvalidUrl { name: String, reason: String },
    #[error("unknown attribute \"{0}\"")]
    Unknown(String),
    #[error("no schema is registered for resource type \"{0}\"")]
    UnknownResource(String),
}

impl ResourceDef {
    pub fn attribute(&self, name: &str) -> Option<&AttributeDef> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Check a generic definition against this schema and return its
    /// settable string attributes. Computed attributes are ignored.
    pub fn validate(&self, definition: &Value) -> Result<BTreeMap<String, String>, AttributeError> {
        let Some(object) = definition.as_object() else {
            return Err(AttributeError::NotAnObject);
        };

        if let Some(unknown) = object.keys().find(|key| self.attribute(key).is_none()) {
            return Err(AttributeError::Unknown(unknown.clone()));
        }

        let mut values = BTreeMap::new();
        for attr in self.attributes.iter().filter(|a| !a.computed) {
            let value = match object.get(&attr.name) {
                None | Some(Value::Null) if attr.required => {
                    return Err(AttributeError::Missing(attr.name.clone()))
                }
                None | Some(Value::Null) => continue,
                Some(value) => value,
            };

            let text = match attr.kind {
                AttributeType::String => value.as_str().ok_or_else(|| AttributeError::WrongType {
                    name: attr.name.clone(),
                    expected: "string",
                })?,
            };

            if attr.required && text.trim().is_empty() {
                return Err(AttributeError::Empty(attr.name.clone()));
            }

            if attr.format == Some(AttributeFormat::Url) {
                Url::parse(text).map_err(|e| AttributeError::InvalidUrl {
                    name: attr.name.clone(),
                    reason: e.to_string(),
                })?;
            }

            values.insert(attr.name.clone(), text.to_string());
        }

        Ok(values)
    }
}

/// Global registry loaded from JSON
static REGISTRY: OnceLock<ResourceConfig> = OnceLock::new();

/// Get the resource registry (loads from embedded JSON on first access)
pub fn get_registry() -> &'static ResourceConfig {
    REGISTRY.get_or_init(|| {
        let mut final_config = ResourceConfig {
            resources: HashMap::new(),
        };

        for content in RESOURCE_FILES {
            let partial: ResourceConfig = serde_json::from_str(content)
                .unwrap_or_else(|e| panic!("Failed to parse embedded resource JSON: {}", e));
            final_config.resources.extend(partial.resources);
        }

        final_config
    })
}

/// Get a resource definition by key
pub fn get_resource(key: &str) -> Option<&'static ResourceDef> {
    get_registry().resources.get(key)
}

/// Get all resource type names, sorted
pub fn get_all_resource_keys() -> Vec<&'static str> {
    let mut keys: Vec<&'static str> = get_registry()
        .resources
        .keys()
        .map(|s| s.as_str())
        .collect();
    keys.sort_unstable();
    keys
}
