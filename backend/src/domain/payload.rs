//! Entity fields as they reach a handler.
//!
//! Inbound adapters hand request bodies over undecoded. Decoding then runs as
//! part of structural validation, after the caller has been authorized, and a
//! missing or mistyped field is reported per field like any other validation
//! failure.

use serde_json::{Map, Value};

use crate::domain::{FieldErrors, Resource};

/// Field key used when the body as a whole cannot be decoded.
pub const BODY_FIELD: &str = "body";

const MISSING_FIELD_PREFIX: &str = "missing field `";

/// Fields for a create or update.
///
/// # Examples
/// ```
/// use backend::domain::{EquipmentGroup, Payload};
/// use serde_json::json;
///
/// let typed: Payload<EquipmentGroup> = EquipmentGroup::named("Home Gym").into();
/// assert!(typed.into_valid().is_ok());
///
/// let raw = Payload::<EquipmentGroup>::Json(json!({}));
/// let errors = raw.into_valid().expect_err("name is required");
/// assert_eq!(errors.messages("name"), ["name is required"]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Payload<E> {
    /// Already typed, as built by in-process callers.
    Fields(E),
    /// A JSON body still to be decoded.
    Json(Value),
}

impl<E> From<E> for Payload<E> {
    fn from(fields: E) -> Self {
        Self::Fields(fields)
    }
}

impl<E: Resource> Payload<E> {
    /// Decode if needed, then run [`Resource::validate`].
    ///
    /// # Errors
    /// Per-field messages for undecodable or invalid fields.
    pub fn into_valid(self) -> Result<E, FieldErrors> {
        let fields = match self {
            Self::Fields(fields) => fields,
            Self::Json(value) => decode(value)?,
        };
        fields.validate()?;
        Ok(fields)
    }
}

fn decode<E: Resource>(value: Value) -> Result<E, FieldErrors> {
    let Value::Object(object) = value else {
        let mut errors = FieldErrors::default();
        errors.add(BODY_FIELD, "body must be a JSON object");
        return Err(errors);
    };
    serde_json::from_value(Value::Object(object.clone()))
        .map_err(|error| locate::<E>(&object, &error.to_string()))
}

fn missing_field(message: &str) -> Option<&str> {
    message
        .strip_prefix(MISSING_FIELD_PREFIX)
        .and_then(|rest| rest.split_once('`'))
        .map(|(field, _)| field)
}

/// Attribute a decode failure to the field that caused it.
///
/// Serde reports the first bad value it meets, so a value is the culprit when
/// dropping it makes that failure go away.
fn locate<E: Resource>(object: &Map<String, Value>, message: &str) -> FieldErrors {
    let mut errors = FieldErrors::default();
    if let Some(field) = missing_field(message) {
        errors.add(field, format!("{field} is required"));
        return errors;
    }
    let culprit = object.keys().find(|key| {
        let mut rest = object.clone();
        rest.remove(key.as_str());
        match serde_json::from_value::<E>(Value::Object(rest)) {
            Ok(_) => true,
            Err(error) => error.to_string() != message,
        }
    });
    match culprit {
        Some(field) => errors.add(field.as_str(), format!("{field} is invalid: {message}")),
        None => errors.add(BODY_FIELD, message),
    }
    errors
}
