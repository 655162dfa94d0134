//! Form field derivation from an operation descriptor

use crate::types::*;
use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, warn};

/// Field descriptors plus the validators registered for them
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldSet {
    pub fields: Vec<FieldDescriptor>,
    pub validators: ValidatorMap,
}

impl FieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field; a field with the same key is replaced in place
    pub fn push(&mut self, field: FieldDescriptor) {
        let key = field.key();

        self.validators.shift_remove(&key);
        if field.required {
            self.validators.insert(key.clone(), ValidationRule::Required);
        }

        match self.fields.iter().position(|f| f.key() == key) {
            Some(index) => {
                debug!("Field {} redeclared, keeping the later one", key.qualified());
                self.fields[index] = field;
            }
            None => self.fields.push(field),
        }
    }

    /// Append another set after this one
    pub fn merge(mut self, other: FieldSet) -> FieldSet {
        for field in other.fields {
            self.push(field);
        }
        self
    }

    /// Initial value map: every field starts as an empty string
    pub fn default_values(&self) -> IndexMap<FieldKey, String> {
        self.fields
            .iter()
            .map(|f| (f.key(), String::new()))
            .collect()
    }

    pub fn get(&self, key: &FieldKey) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| &f.key() == key)
    }

    /// All keys whose bare name matches
    pub fn keys_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = FieldKey> + 'a {
        self.fields.iter().filter(move |f| f.name == name).map(|f| f.key())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Derives form inputs from parameters and flat object request bodies
pub struct SchemaFieldExtractor;

impl SchemaFieldExtractor {
    /// Parameter fields followed by body fields
    pub fn extract(operation: &OperationDescriptor) -> FieldSet {
        let fields =
            Self::extract_param_fields(operation).merge(Self::extract_body_fields(operation));
        debug!(
            "Extracted {} fields ({} required) for {} {}",
            fields.len(),
            fields.validators.len(),
            operation.method,
            operation.path
        );
        fields
    }

    /// One field per declared parameter
    pub fn extract_param_fields(operation: &OperationDescriptor) -> FieldSet {
        let mut set = FieldSet::new();

        for param in &operation.parameters {
            let Some(location) = FieldLocation::from_parameter_in(&param.location) else {
                warn!(
                    "Skipping parameter {:?} with unknown location {:?}",
                    param.name, param.location
                );
                continue;
            };

            set.push(FieldDescriptor {
                name: param.name.clone(),
                location,
                description: param.description.clone(),
                required: param.required,
                value_type: ValueType::String,
            });
        }

        set
    }

    /// One field per property of the first media type's object schema.
    ///
    /// Any other schema shape yields an empty set.
    pub fn extract_body_fields(operation: &OperationDescriptor) -> FieldSet {
        let mut set = FieldSet::new();

        let Some((content_type, media)) = operation
            .request_body
            .as_ref()
            .and_then(|body| body.first_media())
        else {
            return set;
        };

        let Some(schema) = media.schema.as_ref().and_then(Value::as_object) else {
            return set;
        };

        if schema.get("type").and_then(Value::as_str) != Some("object") {
            debug!(
                "Request body schema for {} is not a flat object, no body fields",
                content_type
            );
            return set;
        }

        let required: Vec<&str> = schema
            .get("required")
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();

        let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
            return set;
        };

        for (name, property) in properties {
            set.push(FieldDescriptor {
                name: name.clone(),
                location: FieldLocation::Body,
                description: property
                    .get("description")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                required: required.contains(&name.as_str()),
                value_type: ValueType::String,
            });
        }

        set
    }
}
