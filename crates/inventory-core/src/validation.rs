//! Item field validation

use inventory_db::{Item, NewItem};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Maximum allowed item name length
pub const MAX_NAME_LENGTH: usize = 255;
/// Maximum allowed item description length
pub const MAX_DESCRIPTION_LENGTH: usize = 10_000;

/// Raw item fields as submitted by a client
///
/// Fields are kept as untyped JSON so that a wrong type is reported
/// against the field rather than rejecting the whole body. `None` means
/// the field was absent; an explicit `null` is `Some(Value::Null)`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemFields {
    #[serde(default, deserialize_with = "present")]
    pub name: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Value>,
}

fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

impl ItemFields {
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            name: Some(Value::String(name.to_string())),
            description: Some(Value::String(description.to_string())),
        }
    }
}

/// Field name to list of problems, serialized as a JSON object
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Problems recorded for one field
    pub fn field(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{}: {}", field, message)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Validate a full item submission (create or replace)
pub fn validate_full(fields: &ItemFields) -> Result<NewItem, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let name = match &fields.name {
        Some(value) => check_name(value, &mut errors),
        None => {
            errors.add("name", "This field is required.");
            None
        }
    };
    let description = match &fields.description {
        Some(value) => check_description(value, &mut errors),
        None => Some(String::new()),
    };

    match (name, description) {
        (Some(name), Some(description)) if errors.is_empty() => Ok(NewItem { name, description }),
        _ => Err(errors),
    }
}

/// Validate a partial submission, keeping `current` values for absent fields
pub fn validate_partial(fields: &ItemFields, current: &Item) -> Result<NewItem, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let name = match &fields.name {
        Some(value) => check_name(value, &mut errors),
        None => Some(current.name.clone()),
    };
    let description = match &fields.description {
        Some(value) => check_description(value, &mut errors),
        None => Some(current.description.clone()),
    };

    match (name, description) {
        (Some(name), Some(description)) if errors.is_empty() => Ok(NewItem { name, description }),
        _ => Err(errors),
    }
}

fn check_name(value: &Value, errors: &mut ValidationErrors) -> Option<String> {
    let name = match value {
        Value::String(s) => s,
        Value::Null => {
            errors.add("name", "This field may not be null.");
            return None;
        }
        _ => {
            errors.add("name", "Not a valid string.");
            return None;
        }
    };

    if name.trim().is_empty() {
        errors.add("name", "This field may not be blank.");
        return None;
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        errors.add(
            "name",
            format!("Ensure this field has no more than {} characters.", MAX_NAME_LENGTH),
        );
        return None;
    }
    Some(name.clone())
}

fn check_description(value: &Value, errors: &mut ValidationErrors) -> Option<String> {
    let description = match value {
        Value::String(s) => s,
        Value::Null => {
            errors.add("description", "This field may not be null.");
            return None;
        }
        _ => {
            errors.add("description", "Not a valid string.");
            return None;
        }
    };

    if description.chars().count() > MAX_DESCRIPTION_LENGTH {
        errors.add(
            "description",
            format!(
                "Ensure this field has no more than {} characters.",
                MAX_DESCRIPTION_LENGTH
            ),
        );
        return None;
    }
    Some(description.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(body: Value) -> ItemFields {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_full_accepts_name_and_description() {
        let item = validate_full(&ItemFields::new("Widget", "A widget")).unwrap();
        assert_eq!(item.name, "Widget");
        assert_eq!(item.description, "A widget");
    }

    #[test]
    fn test_description_is_optional() {
        let item = validate_full(&fields(json!({"name": "Widget"}))).unwrap();
        assert_eq!(item.description, "");
    }

    #[test]
    fn test_name_required() {
        let errors = validate_full(&fields(json!({"description": "x"}))).unwrap_err();
        assert_eq!(errors.field("name"), ["This field is required."]);
        assert!(errors.field("description").is_empty());
    }

    #[test]
    fn test_blank_and_oversized_names() {
        let errors = validate_full(&fields(json!({"name": "   "}))).unwrap_err();
        assert_eq!(errors.field("name"), ["This field may not be blank."]);

        let long = "x".repeat(MAX_NAME_LENGTH + 1);
        let errors = validate_full(&fields(json!({ "name": long }))).unwrap_err();
        assert_eq!(errors.field("name").len(), 1);
    }

    #[test]
    fn test_wrong_types_reported_per_field() {
        let errors = validate_full(&fields(json!({"name": 5, "description": ["a"]}))).unwrap_err();
        assert_eq!(errors.field("name"), ["Not a valid string."]);
        assert_eq!(errors.field("description"), ["Not a valid string."]);
        assert_eq!(
            serde_json::to_value(&errors).unwrap(),
            json!({"description": ["Not a valid string."], "name": ["Not a valid string."]})
        );
    }

    #[test]
    fn test_null_is_not_absent() {
        let errors = validate_full(&fields(json!({"name": null, "description": null}))).unwrap_err();
        assert_eq!(errors.field("name"), ["This field may not be null."]);
        assert_eq!(errors.field("description"), ["This field may not be null."]);

        let current = Item {
            id: 1,
            name: "Widget".to_string(),
            description: "A widget".to_string(),
        };
        let errors = validate_partial(&fields(json!({"name": null})), &current).unwrap_err();
        assert_eq!(errors.field("name"), ["This field may not be null."]);
    }

    #[test]
    fn test_partial_keeps_current_values() {
        let current = Item {
            id: 1,
            name: "Widget".to_string(),
            description: "A widget".to_string(),
        };

        let item = validate_partial(&fields(json!({"description": "Changed"})), &current).unwrap();
        assert_eq!(item.name, "Widget");
        assert_eq!(item.description, "Changed");

        let errors = validate_partial(&fields(json!({"name": ""})), &current).unwrap_err();
        assert_eq!(errors.field("name"), ["This field may not be blank."]);
    }
}
