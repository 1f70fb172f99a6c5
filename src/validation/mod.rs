//! Form validation: schema checks over a raw field map, producing either
//! typed data or a flat `field -> message` error map.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

pub mod rules;

pub use rules::{Schema, INVITATION_SCHEMA, LOGIN_SCHEMA, REGISTER_SCHEMA};

/// Decoded form submission.
pub type FormInput = HashMap<String, String>;

/// One message per field; the first failing rule wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrors {
    pub errors: BTreeMap<String, String>,
}

impl FieldErrors {
    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Builds a single-field error outside of schema validation.
pub fn form_error(field: &str, message: impl Into<String>) -> FieldErrors {
    let mut errors = BTreeMap::new();
    errors.insert(field.to_string(), message.into());
    FieldErrors { errors }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum FormResult<T> {
    Success { data: T },
    Error { error: FieldErrors },
}

impl<T> FormResult<T> {
    pub fn fail(field: &str, message: impl Into<String>) -> Self {
        FormResult::Error {
            error: form_error(field, message),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, FormResult::Success { .. })
    }

    pub fn into_result(self) -> Result<T, FieldErrors> {
        match self {
            FormResult::Success { data } => Ok(data),
            FormResult::Error { error } => Err(error),
        }
    }
}

/// Field values that passed a schema, keyed by field name.
#[derive(Debug, Default)]
pub struct ValidFields(HashMap<&'static str, String>);

impl ValidFields {
    /// Removes a field the schema guaranteed to be present.
    pub fn take(&mut self, name: &str) -> String {
        self.0.remove(name).unwrap_or_default()
    }
}

/// A typed form backed by a validation schema.
pub trait FormSchema: Sized {
    fn schema() -> &'static Schema;
    fn from_fields(fields: ValidFields) -> Self;
}

impl Schema {
    /// Checks every field and collects the first message for each failing one.
    /// Fields not named by the schema are dropped.
    pub fn check(&self, input: &FormInput) -> Result<ValidFields, FieldErrors> {
        let mut valid = HashMap::with_capacity(self.fields.len());
        let mut errors = BTreeMap::new();

        for spec in self.fields {
            let Some(value) = input.get(spec.name) else {
                errors.insert(spec.name.to_string(), rules::MSG_REQUIRED.to_string());
                continue;
            };
            match spec.rules.iter().find_map(|rule| rule.check(value)) {
                Some(message) => {
                    errors.insert(spec.name.to_string(), message.to_string());
                }
                None => {
                    valid.insert(spec.name, value.clone());
                }
            }
        }

        if errors.is_empty() {
            Ok(ValidFields(valid))
        } else {
            Err(FieldErrors { errors })
        }
    }
}

pub fn validate<T: FormSchema>(input: &FormInput) -> FormResult<T> {
    match T::schema().check(input) {
        Ok(fields) => FormResult::Success {
            data: T::from_fields(fields),
        },
        Err(error) => FormResult::Error { error },
    }
}

#[cfg(test)]
pub(crate) fn form_input(pairs: &[(&str, &str)]) -> FormInput {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
