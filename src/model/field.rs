//! Form fields, their creation inputs and partial updates.

use crate::model::{FieldType, Lifecycle};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Clone, Debug, Serialize)]
pub struct FormField {
    pub id: i64,
    pub form_id: i64,
    pub field_type: FieldType,
    pub label: String,
    pub placeholder: Option<String>,
    pub description: Option<String>,
    pub is_required: bool,
    pub validation_rules: Option<Value>,
    pub options: Option<Value>,
    pub order_index: i32,
    pub created_by: Option<i64>,
    pub updated_by: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub lifecycle: Lifecycle,
}

impl FormField {
    /// Apply a partial update in place. Attributes absent from the patch are left unchanged.
    pub fn apply(&mut self, patch: &FieldPatch, actor: Option<i64>) {
        if let Some(t) = patch.field_type {
            self.field_type = t;
        }
        if let Some(label) = &patch.label {
            self.label = label.clone();
        }
        if let Some(p) = &patch.placeholder {
            self.placeholder = p.clone();
        }
        if let Some(d) = &patch.description {
            self.description = d.clone();
        }
        if let Some(r) = patch.is_required {
            self.is_required = r;
        }
        if let Some(rules) = &patch.validation_rules {
            self.validation_rules = rules.clone();
        }
        if let Some(opts) = &patch.options {
            self.options = opts.clone();
        }
        if let Some(idx) = patch.order_index {
            self.order_index = idx;
        }
        if actor.is_some() {
            self.updated_by = actor;
        }
    }
}

/// Attributes for a field insert. The order index is resolved separately by the store.
#[derive(Clone, Debug)]
pub struct NewField {
    pub form_id: i64,
    pub field_type: FieldType,
    pub label: String,
    pub placeholder: Option<String>,
    pub description: Option<String>,
    pub is_required: bool,
    pub validation_rules: Option<Value>,
    pub options: Option<Value>,
    pub created_by: Option<i64>,
}

/// Which rows `find_fields` returns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FieldFilter {
    #[default]
    ActiveOnly,
    IncludeDeleted,
}

impl FieldFilter {
    pub fn admits(&self, lifecycle: &Lifecycle) -> bool {
        match self {
            FieldFilter::ActiveOnly => !lifecycle.is_deleted(),
            FieldFilter::IncludeDeleted => true,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct CreateFieldInput {
    pub field_type: FieldType,
    pub label: String,
    pub placeholder: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub is_required: bool,
    pub validation_rules: Option<Value>,
    pub options: Option<Value>,
    pub order_index: Option<i32>,
}

/// Simplified creation used by the builder palette: always appended at the end.
#[derive(Clone, Debug, Deserialize)]
pub struct AddFieldFromTypeInput {
    pub field_type: FieldType,
    pub label: String,
    pub options: Option<Value>,
    pub placeholder: Option<String>,
    pub is_required: Option<bool>,
}

impl From<AddFieldFromTypeInput> for CreateFieldInput {
    fn from(input: AddFieldFromTypeInput) -> Self {
        CreateFieldInput {
            field_type: input.field_type,
            label: input.label,
            placeholder: input.placeholder,
            description: None,
            is_required: input.is_required.unwrap_or(false),
            validation_rules: None,
            options: input.options,
            order_index: None,
        }
    }
}

/// Partial field update. For nullable attributes `Some(None)` clears the value and `None` leaves it.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct FieldPatch {
    pub field_type: Option<FieldType>,
    pub label: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub placeholder: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    pub is_required: Option<bool>,
    #[serde(default, deserialize_with = "nullable")]
    pub validation_rules: Option<Option<Value>>,
    #[serde(default, deserialize_with = "nullable")]
    pub options: Option<Option<Value>>,
    pub order_index: Option<i32>,
}

fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
