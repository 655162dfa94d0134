//! Operation selection from a raw path-object fragment

use crate::error::{ResolveError, ResolveResult};
use crate::types::*;
use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;

/// `{ path: { key: value } }` as decoded from the payload
type RawFragment = IndexMap<String, IndexMap<String, Value>>;

/// Path Item fields that sit next to operations but are not operations
const PATH_ITEM_FIELDS: &[&str] = &["summary", "description", "servers", "parameters", "$ref"];

/// Turns a raw JSON fragment into the one operation a panel renders
pub struct OperationResolver;

impl OperationResolver {
    /// Resolve the first path and its first operation
    pub fn resolve(payload: &str) -> ResolveResult<OperationDescriptor> {
        let fragment = Self::parse_fragment(payload)?;

        let (path, item) = fragment
            .first()
            .ok_or(ResolveError::EmptyPayload("no path declared"))?;

        let key = item
            .keys()
            .find(|k| !PATH_ITEM_FIELDS.contains(&k.as_str()))
            .ok_or(ResolveError::EmptyPayload("no operation declared"))?;

        let method =
            HttpMethod::from_key(key).ok_or_else(|| ResolveError::UnsupportedMethod(key.clone()))?;

        Self::build_descriptor(path, item, key, method)
    }

    /// Resolve the operation named by the caller
    pub fn resolve_selected(
        payload: &str,
        selector: &OperationSelector,
    ) -> ResolveResult<OperationDescriptor> {
        let fragment = Self::parse_fragment(payload)?;

        let item = fragment
            .get(&selector.path)
            .ok_or_else(|| ResolveError::PathNotFound(selector.path.clone()))?;

        let key = item
            .keys()
            .find(|k| HttpMethod::from_key(k) == Some(selector.method))
            .ok_or_else(|| ResolveError::OperationNotFound {
                path: selector.path.clone(),
                method: selector.method.to_string(),
            })?;

        Self::build_descriptor(&selector.path, item, key, selector.method)
    }

    fn parse_fragment(payload: &str) -> ResolveResult<RawFragment> {
        let fragment: RawFragment = serde_json::from_str(payload)?;
        debug!("Parsed fragment with {} path(s)", fragment.len());
        Ok(fragment)
    }

    fn build_descriptor(
        path: &str,
        item: &IndexMap<String, Value>,
        key: &str,
        method: HttpMethod,
    ) -> ResolveResult<OperationDescriptor> {
        let operation_value = item
            .get(key)
            .cloned()
            .unwrap_or_else(|| Value::Object(serde_json::Map::new()));
        let operation: RawOperation = serde_json::from_value(operation_value)?;

        let path_params: Vec<RawParameter> = match item.get("parameters") {
            Some(value) => serde_json::from_value(value.clone())?,
            None => Vec::new(),
        };
        let path_servers: Vec<ServerEntry> = match item.get("servers") {
            Some(value) => serde_json::from_value(value.clone())?,
            None => Vec::new(),
        };

        let parameters = Self::merge_parameters(path_params, operation.parameters);

        // Operation-level servers override the path item's
        let servers = if operation.servers.is_empty() {
            path_servers
        } else {
            operation.servers
        };

        let responses = operation
            .responses
            .map(|r| r.keys().cloned().collect::<Vec<_>>());

        debug!(
            "Selected {} {} ({} parameters, {} servers)",
            method,
            path,
            parameters.len(),
            servers.len()
        );

        Ok(OperationDescriptor {
            path: path.to_string(),
            method,
            operation_id: operation.operation_id,
            summary: operation.summary,
            description: operation.description,
            deprecated: operation.deprecated,
            servers,
            parameters,
            request_body: operation.request_body,
            responses,
        })
    }

    /// Combine path-level and operation-level parameters; an operation
    /// parameter replaces a path-level one with the same name and location.
    fn merge_parameters(
        path_params: Vec<RawParameter>,
        operation_params: Vec<RawParameter>,
    ) -> Vec<RawParameter> {
        let mut parameters = path_params;
        for param in operation_params {
            parameters.retain(|existing| {
                !(existing.name == param.name && existing.location == param.location)
            });
            parameters.push(param);
        }
        parameters
    }
}
