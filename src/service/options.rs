//! Field options validation: each field type has its own required shape for `options`.

use crate::error::OptionsError;
use crate::model::FieldType;
use base64::Engine;
use serde_json::Value;
use std::collections::HashSet;

/// Length of the label-derived part of a generated choice id.
const CHOICE_ID_LEN: usize = 8;

pub struct OptionsValidator;

impl OptionsValidator {
    /// Check `options` against the shape required by `field_type`.
    ///
    /// Choice entries without an id get one derived from their label; no other mutation happens,
    /// and nothing is mutated when validation fails.
    pub fn validate(field_type: FieldType, options: Option<&mut Value>) -> Result<(), OptionsError> {
        let options = match options {
            Some(v) if is_truthy(v) => v,
            _ => return missing_options(field_type),
        };

        match field_type {
            FieldType::MultipleChoice | FieldType::Checkboxes | FieldType::Dropdown => validate_choices(options),
            FieldType::FileUpload => validate_file_upload(options),
            FieldType::LinearScale | FieldType::Rating => validate_scale(options),
            FieldType::MultipleChoiceGrid | FieldType::CheckboxGrid => validate_grid(options),
            FieldType::ShortAnswer | FieldType::Paragraph | FieldType::Date | FieldType::Time => Ok(()),
        }
    }
}

/// Absent options are only acceptable for types whose catalog entry does not require them.
fn missing_options(field_type: FieldType) -> Result<(), OptionsError> {
    if field_type.is_choice_based() {
        Err(OptionsError::ChoicesRequired)
    } else if field_type.is_scale() {
        Err(OptionsError::ScaleBoundsNotNumbers)
    } else if field_type.is_grid() {
        Err(OptionsError::GridAxesRequired)
    } else {
        Ok(())
    }
}

/// Derive a short id from a choice label. Deterministic; equal labels give equal ids.
pub fn choice_id(label: &str) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(label.as_bytes());
    let short: String = encoded.chars().take(CHOICE_ID_LEN).collect();
    format!("c_{}", short)
}

fn validate_choices(options: &mut Value) -> Result<(), OptionsError> {
    let choices = match options.get_mut("choices") {
        Some(Value::Array(arr)) if !arr.is_empty() => arr,
        _ => return Err(OptionsError::ChoicesEmpty),
    };

    let mut seen: HashSet<String> = HashSet::new();
    for c in choices.iter() {
        if label_text(c).is_none() {
            return Err(OptionsError::ChoiceLabelMissing);
        }
        if let Some(id) = explicit_id(c) {
            if !seen.insert(id.clone()) {
                return Err(OptionsError::DuplicateChoiceId(id));
            }
        }
    }

    for c in choices.iter_mut() {
        if explicit_id(c).is_some() {
            continue;
        }
        let label = label_text(c).unwrap_or_default();
        let id = unique_id(choice_id(&label), &mut seen);
        if let Value::Object(map) = c {
            map.insert("id".into(), Value::String(id));
        }
    }
    Ok(())
}

fn validate_file_upload(options: &Value) -> Result<(), OptionsError> {
    if let Some(max_files) = options.get("max_files") {
        if !max_files.is_null() && !max_files.is_number() {
            return Err(OptionsError::MaxFilesNotNumber);
        }
    }
    if let Some(types) = options.get("allowed_mime_types") {
        if is_truthy(types) && !types.is_array() {
            return Err(OptionsError::MimeTypesNotArray);
        }
    }
    Ok(())
}

fn validate_scale(options: &Value) -> Result<(), OptionsError> {
    let min = options.get("min").and_then(Value::as_f64);
    let max = options.get("max").and_then(Value::as_f64);
    match (min, max) {
        (Some(min), Some(max)) if min < max => Ok(()),
        (Some(_), Some(_)) => Err(OptionsError::ScaleBoundsOrder),
        _ => Err(OptionsError::ScaleBoundsNotNumbers),
    }
}

fn validate_grid(options: &Value) -> Result<(), OptionsError> {
    match (options.get("rows"), options.get("columns")) {
        (Some(Value::Array(rows)), Some(Value::Array(cols))) => {
            if rows.is_empty() || cols.is_empty() {
                Err(OptionsError::GridAxesEmpty)
            } else {
                Ok(())
            }
        }
        _ => Err(OptionsError::GridAxesRequired),
    }
}

/// Generated ids get `_2`, `_3`, ... when an earlier choice already holds the same id.
fn unique_id(base: String, seen: &mut HashSet<String>) -> String {
    if seen.insert(base.clone()) {
        return base;
    }
    let mut n = 2;
    loop {
        let candidate = format!("{}_{}", base, n);
        if seen.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

/// Label as text; missing, empty, zero and non-scalar labels count as absent.
fn label_text(choice: &Value) -> Option<String> {
    match choice.get("label")? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        _ => None,
    }
}

fn explicit_id(choice: &Value) -> Option<String> {
    match choice.get("id")? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        _ => None,
    }
}

fn is_truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64() != Some(0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn check(t: FieldType, mut v: Value) -> Result<Value, OptionsError> {
        OptionsValidator::validate(t, Some(&mut v)).map(|_| v)
    }

    #[test]
    fn choice_types_distinguish_missing_from_empty() {
        for t in [FieldType::MultipleChoice, FieldType::Checkboxes, FieldType::Dropdown] {
            assert_eq!(OptionsValidator::validate(t, None), Err(OptionsError::ChoicesRequired));
            assert_eq!(check(t, Value::Null).unwrap_err(), OptionsError::ChoicesRequired);
            assert_eq!(check(t, json!({ "choices": [] })).unwrap_err(), OptionsError::ChoicesEmpty);
            assert_eq!(check(t, json!({})).unwrap_err(), OptionsError::ChoicesEmpty);
            assert_eq!(check(t, json!({ "choices": "a,b" })).unwrap_err(), OptionsError::ChoicesEmpty);
        }
        assert_ne!(
            OptionsError::ChoicesRequired.to_string(),
            OptionsError::ChoicesEmpty.to_string()
        );
    }

    #[test]
    fn choice_needs_label() {
        let err = check(
            FieldType::Dropdown,
            json!({ "choices": [{ "label": "North" }, { "value": "s" }] }),
        )
        .unwrap_err();
        assert_eq!(err, OptionsError::ChoiceLabelMissing);
        let err = check(FieldType::Dropdown, json!({ "choices": [{ "label": "" }] })).unwrap_err();
        assert_eq!(err, OptionsError::ChoiceLabelMissing);
        let err = check(FieldType::Dropdown, json!({ "choices": ["North"] })).unwrap_err();
        assert_eq!(err, OptionsError::ChoiceLabelMissing);
    }

    #[test]
    fn missing_choice_ids_are_filled() {
        let v = check(
            FieldType::Dropdown,
            json!({ "choices": [{ "label": "North" }, { "label": "South", "id": "keep" }] }),
        )
        .unwrap();
        assert_eq!(v["choices"][0]["id"], json!(choice_id("North")));
        assert_eq!(v["choices"][1]["id"], json!("keep"));
    }

    #[test]
    fn choice_id_is_short_and_deterministic() {
        let id = choice_id("North");
        assert_eq!(id, "c_Tm9ydGg=");
        assert_eq!(id, choice_id("North"));
        assert_eq!(choice_id("A much longer label").len(), 2 + CHOICE_ID_LEN);
    }

    #[test]
    fn equal_labels_get_distinct_ids() {
        let v = check(
            FieldType::Checkboxes,
            json!({ "choices": [{ "label": "Yes" }, { "label": "Yes" }] }),
        )
        .unwrap();
        let a = v["choices"][0]["id"].as_str().unwrap();
        let b = v["choices"][1]["id"].as_str().unwrap();
        assert_ne!(a, b);
        assert_eq!(b, format!("{}_2", a));
    }

    #[test]
    fn duplicate_explicit_ids_rejected() {
        let err = check(
            FieldType::MultipleChoice,
            json!({ "choices": [{ "label": "A", "id": "x" }, { "label": "B", "id": "x" }] }),
        )
        .unwrap_err();
        assert_eq!(err, OptionsError::DuplicateChoiceId("x".into()));
    }

    #[test]
    fn failed_validation_leaves_options_untouched() {
        let mut v = json!({ "choices": [{ "label": "A" }, { "value": "b" }] });
        let before = v.clone();
        assert!(OptionsValidator::validate(FieldType::Dropdown, Some(&mut v)).is_err());
        assert_eq!(v, before);
    }

    #[test]
    fn scale_bounds() {
        for t in [FieldType::LinearScale, FieldType::Rating] {
            assert_eq!(check(t, json!({ "min": 5, "max": 5 })).unwrap_err(), OptionsError::ScaleBoundsOrder);
            assert_eq!(check(t, json!({ "min": 6, "max": 5 })).unwrap_err(), OptionsError::ScaleBoundsOrder);
            assert!(check(t, json!({ "min": 1, "max": 5 })).is_ok());
            assert!(check(t, json!({ "min": 0.5, "max": 1.5 })).is_ok());
            assert_eq!(
                check(t, json!({ "min": "1", "max": 5 })).unwrap_err(),
                OptionsError::ScaleBoundsNotNumbers
            );
            assert_eq!(check(t, json!({ "max": 5 })).unwrap_err(), OptionsError::ScaleBoundsNotNumbers);
        }
    }

    #[test]
    fn scale_and_grid_require_options() {
        for t in [FieldType::LinearScale, FieldType::Rating] {
            assert_eq!(OptionsValidator::validate(t, None), Err(OptionsError::ScaleBoundsNotNumbers));
            assert_eq!(check(t, Value::Null).unwrap_err(), OptionsError::ScaleBoundsNotNumbers);
        }
        for t in [FieldType::MultipleChoiceGrid, FieldType::CheckboxGrid] {
            assert_eq!(OptionsValidator::validate(t, None), Err(OptionsError::GridAxesRequired));
        }
    }

    #[test]
    fn absent_options_match_catalog() {
        for t in FieldType::ALL {
            let rejected = OptionsValidator::validate(t, None).is_err();
            assert_eq!(rejected, t.descriptor().options_required, "{}", t);
        }
    }

    #[test]
    fn file_upload_rules() {
        assert!(OptionsValidator::validate(FieldType::FileUpload, None).is_ok());
        assert!(check(FieldType::FileUpload, json!({ "max_files": 3, "allowed_mime_types": ["image/png"] })).is_ok());
        assert!(check(FieldType::FileUpload, json!({ "max_files": null })).is_ok());
        assert_eq!(
            check(FieldType::FileUpload, json!({ "max_files": "3" })).unwrap_err(),
            OptionsError::MaxFilesNotNumber
        );
        assert_eq!(
            check(FieldType::FileUpload, json!({ "allowed_mime_types": "image/png" })).unwrap_err(),
            OptionsError::MimeTypesNotArray
        );
    }

    #[test]
    fn grid_rules() {
        for t in [FieldType::MultipleChoiceGrid, FieldType::CheckboxGrid] {
            assert!(check(t, json!({ "rows": ["Q1"], "columns": ["Good", "Bad"] })).is_ok());
            assert_eq!(check(t, json!({ "rows": ["Q1"] })).unwrap_err(), OptionsError::GridAxesRequired);
            assert_eq!(
                check(t, json!({ "rows": [], "columns": ["Good"] })).unwrap_err(),
                OptionsError::GridAxesEmpty
            );
        }
    }

    #[test]
    fn free_types_accept_anything() {
        for t in [FieldType::ShortAnswer, FieldType::Paragraph, FieldType::Date, FieldType::Time] {
            assert!(OptionsValidator::validate(t, None).is_ok());
            assert!(check(t, json!({ "anything": [1, 2, 3] })).is_ok());
        }
    }
}
