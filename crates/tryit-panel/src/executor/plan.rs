//! Per-location request serialization

use openapi_fragment::{FieldLocation, FieldSet, HttpMethod, OperationDescriptor};
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE, COOKIE};
use serde_json::{Map, Value};
use std::sync::OnceLock;
use tracing::debug;
use url::form_urlencoded;
use url::Url;

use crate::error::RequestFailure;
use crate::form::FieldValues;

fn template_regex() -> Result<&'static Regex, RequestFailure> {
    static TEMPLATE: OnceLock<std::result::Result<Regex, regex::Error>> = OnceLock::new();
    TEMPLATE
        .get_or_init(|| Regex::new(r"\{([^{}/]+)\}"))
        .as_ref()
        .map_err(|e| RequestFailure::InvalidUrl {
            url: String::new(),
            reason: format!("path template pattern: {}", e),
        })
}

/// Resolve a declared server URL to an absolute one.
///
/// Relative URLs such as `/v1` are joined onto `base` when one is given.
/// Anything else is returned unchanged and checked when the plan is built.
pub fn resolve_server_url(server: &str, base: Option<&str>) -> Result<String, RequestFailure> {
    let base = match (Url::parse(server), base) {
        (Err(url::ParseError::RelativeUrlWithoutBase), Some(base)) => base,
        _ => return Ok(server.to_string()),
    };

    let invalid = |url: &str, e: url::ParseError| RequestFailure::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    };
    let joined = Url::parse(base)
        .map_err(|e| invalid(base, e))?
        .join(server)
        .map_err(|e| invalid(server, e))?;

    debug!("Resolved relative server {} to {}", server, joined);
    Ok(joined.to_string())
}

/// Fully routed request, ready to send.
///
/// A plan is a snapshot: later edits to the form do not affect it.
#[derive(Debug, Clone)]
pub struct RequestPlan {
    pub method: HttpMethod,
    pub url: Url,
    pub headers: HeaderMap,
    /// JSON body; only for methods that send one
    pub body: Option<Value>,
    /// Declared response keys, carried through for status matching
    pub declared_responses: Option<Vec<String>>,
}

impl RequestPlan {
    /// Route every field value to its declared location.
    ///
    /// Empty values of optional fields are left out. Body fields of a GET
    /// operation go to the query string.
    pub fn build(
        operation: &OperationDescriptor,
        fields: &FieldSet,
        values: &FieldValues,
        server_url: &str,
    ) -> Result<Self, RequestFailure> {
        let mut path_values: Vec<(&str, &str)> = Vec::new();
        let mut query = form_urlencoded::Serializer::new(String::new());
        let mut headers = HeaderMap::new();
        let mut cookies: Vec<String> = Vec::new();
        let mut body = Map::new();

        for field in &fields.fields {
            let value = values
                .get(&field.key())
                .map(String::as_str)
                .unwrap_or("");

            if field.location == FieldLocation::Path {
                path_values.push((field.name.as_str(), value));
                continue;
            }
            if value.is_empty() && !field.required {
                continue;
            }

            match field.location {
                FieldLocation::Path => {}
                FieldLocation::Query => {
                    query.append_pair(&field.name, value);
                }
                FieldLocation::Header => {
                    let (name, value) = Self::header_pair(&field.name, value)?;
                    headers.append(name, value);
                }
                FieldLocation::Cookie => {
                    cookies.push(format!("{}={}", field.name, urlencoding::encode(value)));
                }
                FieldLocation::Body if operation.method.sends_body() => {
                    body.insert(field.name.clone(), Value::String(value.to_string()));
                }
                FieldLocation::Body => {
                    query.append_pair(&field.name, value);
                }
            }
        }

        if !cookies.is_empty() {
            let (_, value) = Self::header_pair(COOKIE.as_str(), &cookies.join("; "))?;
            headers.insert(COOKIE, value);
        }

        let path = Self::substitute_path(&operation.path, &path_values)?;
        let query = query.finish();

        let mut raw_url = format!("{}{}", server_url.trim_end_matches('/'), path);
        if !query.is_empty() {
            raw_url.push('?');
            raw_url.push_str(&query);
        }

        let url = Url::parse(&raw_url).map_err(|e| RequestFailure::InvalidUrl {
            url: raw_url.clone(),
            reason: e.to_string(),
        })?;

        let body = Self::finish_body(operation, body, &mut headers);

        debug!(
            "Planned {} {} ({} headers, body: {})",
            operation.method,
            url,
            headers.len(),
            body.is_some()
        );

        Ok(Self {
            method: operation.method,
            url,
            headers,
            body,
            declared_responses: operation.responses.clone(),
        })
    }

    /// Replace every `{name}` in the template with its percent-encoded value
    fn substitute_path(template: &str, values: &[(&str, &str)]) -> Result<String, RequestFailure> {
        let mut path = String::with_capacity(template.len());
        let mut last = 0;

        for caps in template_regex()?.captures_iter(template) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };

            let value = values
                .iter()
                .find(|(n, _)| *n == name.as_str())
                .map(|(_, v)| *v)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| RequestFailure::MissingPathParameter(name.as_str().to_string()))?;

            path.push_str(&template[last..whole.start()]);
            path.push_str(&urlencoding::encode(value));
            last = whole.end();
        }

        path.push_str(&template[last..]);
        Ok(path)
    }

    fn header_pair(name: &str, value: &str) -> Result<(HeaderName, HeaderValue), RequestFailure> {
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| RequestFailure::InvalidHeader {
                name: name.to_string(),
                reason: e.to_string(),
            })?;
        let header_value = HeaderValue::from_str(value).map_err(|e| RequestFailure::InvalidHeader {
            name: name.to_string(),
            reason: e.to_string(),
        })?;
        Ok((header_name, header_value))
    }

    /// Decide whether a JSON body is sent and set its content type
    fn finish_body(
        operation: &OperationDescriptor,
        body: Map<String, Value>,
        headers: &mut HeaderMap,
    ) -> Option<Value> {
        if !operation.method.sends_body() {
            return None;
        }

        let declared = operation.request_body.as_ref();
        let body_required = declared.map(|b| b.required).unwrap_or(false);
        if body.is_empty() && !body_required {
            return None;
        }

        let content_type = declared
            .and_then(|b| b.first_media())
            .map(|(ct, _)| ct)
            .filter(|ct| ct.contains("json"))
            .unwrap_or("application/json");

        if !headers.contains_key(CONTENT_TYPE) {
            if let Ok(value) = HeaderValue::from_str(content_type) {
                headers.insert(CONTENT_TYPE, value);
            }
        }

        Some(Value::Object(body))
    }
}
