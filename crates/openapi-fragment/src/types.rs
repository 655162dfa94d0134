//! Type definitions for resolved operation fragments

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// HTTP methods a panel can render
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
        }
    }

    /// Match an operation key from a path item (case-insensitive)
    pub fn from_key(key: &str) -> Option<Self> {
        match key.to_ascii_lowercase().as_str() {
            "get" => Some(HttpMethod::Get),
            "post" => Some(HttpMethod::Post),
            "put" => Some(HttpMethod::Put),
            "delete" => Some(HttpMethod::Delete),
            "patch" => Some(HttpMethod::Patch),
            _ => None,
        }
    }

    /// Display color tag used by the method badge
    pub fn color(&self) -> MethodColor {
        match self {
            HttpMethod::Get => MethodColor::Teal,
            HttpMethod::Post => MethodColor::Orange,
            HttpMethod::Put => MethodColor::Green,
            HttpMethod::Delete => MethodColor::Red,
            HttpMethod::Patch => MethodColor::Violet,
        }
    }

    /// Whether requests with this method carry a JSON body
    pub fn sends_body(&self) -> bool {
        !matches!(self, HttpMethod::Get)
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Cosmetic color tag attached to each method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MethodColor {
    Teal,
    Orange,
    Green,
    Red,
    Violet,
}

impl MethodColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            MethodColor::Teal => "teal",
            MethodColor::Orange => "orange",
            MethodColor::Green => "green",
            MethodColor::Red => "red",
            MethodColor::Violet => "violet",
        }
    }
}

impl std::fmt::Display for MethodColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a field's value ends up in the outgoing request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldLocation {
    Path,
    Query,
    Header,
    Cookie,
    Body,
}

impl FieldLocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldLocation::Path => "path",
            FieldLocation::Query => "query",
            FieldLocation::Header => "header",
            FieldLocation::Cookie => "cookie",
            FieldLocation::Body => "body",
        }
    }

    /// Parse a parameter's declared `in` value. `body` is never a valid
    /// parameter location in OpenAPI 3, so it is rejected here.
    pub fn from_parameter_in(value: &str) -> Option<Self> {
        match value {
            "path" => Some(FieldLocation::Path),
            "query" => Some(FieldLocation::Query),
            "header" => Some(FieldLocation::Header),
            "cookie" => Some(FieldLocation::Cookie),
            _ => None,
        }
    }

    /// Parse any location name, including `body`
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "body" => Some(FieldLocation::Body),
            other => Self::from_parameter_in(other),
        }
    }
}

impl std::fmt::Display for FieldLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of a form field: its name qualified by where it is sent.
///
/// Displays as the bare name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FieldKey {
    pub location: FieldLocation,
    pub name: String,
}

impl FieldKey {
    pub fn new(location: FieldLocation, name: impl Into<String>) -> Self {
        Self {
            location,
            name: name.into(),
        }
    }

    pub fn path(name: impl Into<String>) -> Self {
        Self::new(FieldLocation::Path, name)
    }

    pub fn query(name: impl Into<String>) -> Self {
        Self::new(FieldLocation::Query, name)
    }

    pub fn header(name: impl Into<String>) -> Self {
        Self::new(FieldLocation::Header, name)
    }

    pub fn body(name: impl Into<String>) -> Self {
        Self::new(FieldLocation::Body, name)
    }

    /// Qualified form, e.g. `query.limit`
    pub fn qualified(&self) -> String {
        format!("{}.{}", self.location, self.name)
    }
}

impl std::fmt::Display for FieldKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// Input value kind. Every field is edited and sent as a string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    #[default]
    String,
}

/// One form input derived from a parameter or a body property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Field name as declared in the fragment
    pub name: String,
    /// Where the value is sent
    #[serde(rename = "in")]
    pub location: FieldLocation,
    /// Declared description, used as the input placeholder
    pub description: Option<String>,
    /// Whether a value must be supplied before submitting
    pub required: bool,
    pub value_type: ValueType,
}

impl FieldDescriptor {
    pub fn key(&self) -> FieldKey {
        FieldKey::new(self.location, self.name.clone())
    }

    /// Placeholder text; empty when no description was declared
    pub fn placeholder(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }
}

/// Predicate attached to a field and checked on submit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValidationRule {
    /// Value must be a non-empty string
    Required,
}

impl ValidationRule {
    /// Check a value, returning the user-facing message on failure
    pub fn check(&self, key: &FieldKey, value: &str) -> Result<(), String> {
        match self {
            ValidationRule::Required if value.is_empty() => Err(format!("{} is required", key)),
            ValidationRule::Required => Ok(()),
        }
    }
}

/// Validators keyed by field
pub type ValidatorMap = IndexMap<FieldKey, ValidationRule>;

/// A server the request can be sent to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerEntry {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Selects which operation of a fragment to render
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationSelector {
    pub path: String,
    pub method: HttpMethod,
}

impl OperationSelector {
    pub fn new(path: impl Into<String>, method: HttpMethod) -> Self {
        Self {
            path: path.into(),
            method,
        }
    }
}

/// A single resolved operation, immutable once built
#[derive(Debug, Clone)]
pub struct OperationDescriptor {
    /// URL path template (e.g., "/pets/{petId}")
    pub path: String,
    pub method: HttpMethod,
    pub operation_id: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub deprecated: bool,
    /// Candidate servers; the first is the default selection
    pub servers: Vec<ServerEntry>,
    /// Parameters after merging path-level and operation-level declarations
    pub parameters: Vec<RawParameter>,
    pub request_body: Option<RawRequestBody>,
    /// Declared response status keys, `None` when `responses` is absent
    pub responses: Option<Vec<String>>,
}

impl OperationDescriptor {
    pub fn color(&self) -> MethodColor {
        self.method.color()
    }
}

// --- Raw fragment structures for parsing ---

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOperation {
    pub operation_id: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub deprecated: bool,
    #[serde(default)]
    pub parameters: Vec<RawParameter>,
    pub request_body: Option<RawRequestBody>,
    #[serde(default)]
    pub servers: Vec<ServerEntry>,
    pub responses: Option<IndexMap<String, serde_json::Value>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawParameter {
    #[serde(default)]
    pub name: String,
    /// Declared `in` value
    #[serde(rename = "in", default)]
    pub location: String,
    #[serde(default)]
    pub required: bool,
    pub description: Option<String>,
    pub schema: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawRequestBody {
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub content: IndexMap<String, RawMediaType>,
}

impl RawRequestBody {
    /// The only media type consulted: the first one declared
    pub fn first_media(&self) -> Option<(&str, &RawMediaType)> {
        self.content.first().map(|(ct, media)| (ct.as_str(), media))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawMediaType {
    pub schema: Option<serde_json::Value>,
}
