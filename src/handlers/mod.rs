//! HTTP handlers for forms, fields, and the field type catalog.

pub mod field_types;
pub mod fields;
pub mod forms;

use crate::error::AppError;
use serde::de::DeserializeOwned;
use serde_json::Value;

pub(crate) fn parse_id(id_str: &str, what: &str) -> Result<i64, AppError> {
    id_str
        .trim()
        .parse()
        .map_err(|_| AppError::BadRequest(format!("invalid {} id", what)))
}

pub(crate) fn parse_body<T: DeserializeOwned>(body: Value) -> Result<T, AppError> {
    if !body.is_object() {
        return Err(AppError::BadRequest("body must be a JSON object".into()));
    }
    serde_json::from_value(body).map_err(|e| AppError::BadRequest(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CreateFormInput;
    use serde_json::json;

    #[test]
    fn ids_must_be_numeric() {
        assert_eq!(parse_id("12", "form").unwrap(), 12);
        assert!(matches!(parse_id("abc", "form"), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn body_must_be_object() {
        assert!(matches!(parse_body::<CreateFormInput>(json!([1])), Err(AppError::BadRequest(_))));
        let input: CreateFormInput = parse_body(json!({"title": "T"})).unwrap();
        assert_eq!(input.title, "T");
    }
}
