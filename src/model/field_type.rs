//! The fixed set of field types and the catalog shown to form builders.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    ShortAnswer,
    Paragraph,
    MultipleChoice,
    Checkboxes,
    Dropdown,
    FileUpload,
    LinearScale,
    Rating,
    MultipleChoiceGrid,
    CheckboxGrid,
    Date,
    Time,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown field type '{0}'")]
pub struct UnknownFieldType(pub String);

impl FieldType {
    pub const ALL: [FieldType; 12] = [
        FieldType::ShortAnswer,
        FieldType::Paragraph,
        FieldType::MultipleChoice,
        FieldType::Checkboxes,
        FieldType::Dropdown,
        FieldType::FileUpload,
        FieldType::LinearScale,
        FieldType::Rating,
        FieldType::MultipleChoiceGrid,
        FieldType::CheckboxGrid,
        FieldType::Date,
        FieldType::Time,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::ShortAnswer => "short_answer",
            FieldType::Paragraph => "paragraph",
            FieldType::MultipleChoice => "multiple_choice",
            FieldType::Checkboxes => "checkboxes",
            FieldType::Dropdown => "dropdown",
            FieldType::FileUpload => "file_upload",
            FieldType::LinearScale => "linear_scale",
            FieldType::Rating => "rating",
            FieldType::MultipleChoiceGrid => "multiple_choice_grid",
            FieldType::CheckboxGrid => "checkbox_grid",
            FieldType::Date => "date",
            FieldType::Time => "time",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FieldType::ShortAnswer => "Short answer",
            FieldType::Paragraph => "Paragraph",
            FieldType::MultipleChoice => "Multiple choice",
            FieldType::Checkboxes => "Checkboxes",
            FieldType::Dropdown => "Dropdown",
            FieldType::FileUpload => "File upload",
            FieldType::LinearScale => "Linear scale",
            FieldType::Rating => "Rating",
            FieldType::MultipleChoiceGrid => "Multiple choice grid",
            FieldType::CheckboxGrid => "Checkbox grid",
            FieldType::Date => "Date",
            FieldType::Time => "Time",
        }
    }

    /// Types whose options must enumerate selectable choices.
    pub fn is_choice_based(&self) -> bool {
        matches!(self, FieldType::MultipleChoice | FieldType::Checkboxes | FieldType::Dropdown)
    }

    pub fn is_scale(&self) -> bool {
        matches!(self, FieldType::LinearScale | FieldType::Rating)
    }

    pub fn is_grid(&self) -> bool {
        matches!(self, FieldType::MultipleChoiceGrid | FieldType::CheckboxGrid)
    }

    /// Whether a field of this type must carry an `options` document.
    pub fn requires_options(&self) -> bool {
        self.is_choice_based() || self.is_scale() || self.is_grid()
    }

    /// Option keys the builder UI may set for this type.
    pub fn options_schema(&self) -> Value {
        let choices = json!({
            "type": "array",
            "items": { "type": "object", "properties": { "id": { "type": "string" }, "label": { "type": "string" }, "value": { "type": "string" } } },
            "description": "Array of {label, value} objects, at least 1 required"
        });
        let axis_item = json!({ "type": "object", "properties": { "id": { "type": "string" }, "label": { "type": "string" } } });
        match self {
            FieldType::ShortAnswer | FieldType::Paragraph => json!({
                "placeholder": { "type": "string", "description": "Input placeholder text (optional)" },
                "max_length": { "type": "number", "description": "Maximum characters allowed (optional)" }
            }),
            FieldType::MultipleChoice => json!({
                "choices": choices,
                "allow_other": { "type": "boolean", "description": "Show an \"Other\" option allowing a custom answer" }
            }),
            FieldType::Checkboxes => json!({
                "choices": choices,
                "allow_other": { "type": "boolean", "description": "Show an \"Other\" option allowing a custom answer" },
                "min_selections": { "type": "number", "description": "Minimum selections allowed (optional)" },
                "max_selections": { "type": "number", "description": "Maximum selections allowed (optional)" }
            }),
            FieldType::Dropdown => json!({
                "choices": choices,
                "placeholder": { "type": "string", "description": "Placeholder text (optional)" },
                "allow_search": { "type": "boolean", "description": "Allow search inside the dropdown (optional)" }
            }),
            FieldType::FileUpload => json!({
                "max_files": { "type": "number", "description": "Maximum number of files allowed" },
                "max_size_mb": { "type": "number", "description": "Maximum size per file in MB" },
                "allowed_mime_types": { "type": "array", "items": { "type": "string" }, "description": "MIME types allowed (optional)" }
            }),
            FieldType::LinearScale => json!({
                "min": { "type": "number", "description": "Minimum scale value (e.g. 1)" },
                "max": { "type": "number", "description": "Maximum scale value (e.g. 5)" },
                "step": { "type": "number", "description": "Step size (optional, default 1)" },
                "min_label": { "type": "string", "description": "Label for the minimum value (optional)" },
                "max_label": { "type": "string", "description": "Label for the maximum value (optional)" }
            }),
            FieldType::Rating => json!({
                "min": { "type": "number" },
                "max": { "type": "number" },
                "step": { "type": "number", "description": "Optional step" }
            }),
            FieldType::MultipleChoiceGrid | FieldType::CheckboxGrid => json!({
                "rows": { "description": "Row objects (questions)", "type": "array", "items": axis_item.clone() },
                "columns": { "description": "Column objects (choices)", "type": "array", "items": axis_item.clone() }
            }),
            FieldType::Date => json!({
                "min": { "type": "string", "description": "Earliest allowed date, yyyy-mm-dd (optional)" },
                "max": { "type": "string", "description": "Latest allowed date (optional)" }
            }),
            FieldType::Time => json!({
                "min_time": { "type": "string", "description": "Earliest allowed time, HH:MM (optional)" },
                "max_time": { "type": "string", "description": "Latest allowed time (optional)" }
            }),
        }
    }

    pub fn descriptor(&self) -> FieldTypeDescriptor {
        FieldTypeDescriptor {
            field_type: *self,
            label: self.label(),
            options_required: self.requires_options(),
            options_schema: self.options_schema(),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = UnknownFieldType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownFieldType(s.to_string()))
    }
}

/// One catalog entry for `GET /field-types`.
#[derive(Clone, Debug, Serialize)]
pub struct FieldTypeDescriptor {
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub label: &'static str,
    pub options_required: bool,
    pub options_schema: Value,
}
