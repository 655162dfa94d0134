//! Form state and submit-time validation

use indexmap::IndexMap;
use openapi_fragment::{FieldKey, FieldLocation, FieldSet, ValidatorMap};
use tracing::debug;

use crate::error::{PanelError, Result};

/// Current value of every field
pub type FieldValues = IndexMap<FieldKey, String>;

/// Per-field validation messages
pub type ValidationErrors = IndexMap<FieldKey, String>;

/// Values and inline errors of one form
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormState {
    pub values: FieldValues,
    pub errors: ValidationErrors,
}

/// Holds the form for one operation and applies its validators on submit
#[derive(Debug, Clone)]
pub struct FormModel {
    validators: ValidatorMap,
    state: FormState,
}

impl FormModel {
    /// Build a form with every field set to an empty string
    pub fn new(fields: &FieldSet) -> Self {
        Self {
            validators: fields.validators.clone(),
            state: FormState {
                values: fields.default_values(),
                errors: ValidationErrors::new(),
            },
        }
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn values(&self) -> &FieldValues {
        &self.state.values
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.state.errors
    }

    pub fn value(&self, key: &FieldKey) -> Option<&str> {
        self.state.values.get(key).map(String::as_str)
    }

    pub fn error(&self, key: &FieldKey) -> Option<&str> {
        self.state.errors.get(key).map(String::as_str)
    }

    /// Set a field's value. Editing a field clears its error.
    pub fn set_value(&mut self, key: &FieldKey, value: impl Into<String>) -> Result<()> {
        let slot = self
            .state
            .values
            .get_mut(key)
            .ok_or_else(|| PanelError::UnknownField(key.qualified()))?;
        *slot = value.into();
        self.state.errors.shift_remove(key);
        Ok(())
    }

    /// Check `values` against every registered validator.
    ///
    /// A field without a value counts as empty.
    pub fn validate(&self, values: &FieldValues) -> std::result::Result<(), ValidationErrors> {
        let errors: ValidationErrors = self
            .validators
            .iter()
            .filter_map(|(key, rule)| {
                let value = values.get(key).map(String::as_str).unwrap_or("");
                rule.check(key, value).err().map(|msg| (key.clone(), msg))
            })
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate the current values; on success return them unchanged,
    /// on failure record the errors for inline display.
    pub fn submit(&mut self) -> std::result::Result<FieldValues, ValidationErrors> {
        match self.validate(&self.state.values) {
            Ok(()) => {
                self.state.errors.clear();
                Ok(self.state.values.clone())
            }
            Err(errors) => {
                debug!("Submit rejected, {} field(s) invalid", errors.len());
                self.state.errors = errors.clone();
                Err(errors)
            }
        }
    }

    /// Discard all edits and errors
    pub fn reset(&mut self, fields: &FieldSet) {
        *self = Self::new(fields);
    }
}

/// Find a field from user input: either a bare name or `location.name`.
///
/// A bare name shared by several locations is rejected as ambiguous.
pub fn lookup_field(fields: &FieldSet, reference: &str) -> Result<FieldKey> {
    if let Some((prefix, name)) = reference.split_once('.') {
        if let Some(location) = FieldLocation::parse(prefix) {
            let key = FieldKey::new(location, name);
            if fields.get(&key).is_some() {
                return Ok(key);
            }
        }
    }

    let mut matches: Vec<FieldKey> = fields.keys_named(reference).collect();
    match matches.len() {
        0 => Err(PanelError::UnknownField(reference.to_string())),
        1 => Ok(matches.remove(0)),
        _ => Err(PanelError::AmbiguousField {
            name: reference.to_string(),
            candidates: matches
                .iter()
                .map(FieldKey::qualified)
                .collect::<Vec<_>>()
                .join(", "),
        }),
    }
}
