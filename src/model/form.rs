//! Forms and the inputs that create them.

use crate::model::{FormField, Lifecycle};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormStatus {
    #[default]
    Draft,
    Published,
    Archived,
    Closed,
}

impl FormStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormStatus::Draft => "draft",
            FormStatus::Published => "published",
            FormStatus::Archived => "archived",
            FormStatus::Closed => "closed",
        }
    }
}

impl FromStr for FormStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(FormStatus::Draft),
            "published" => Ok(FormStatus::Published),
            "archived" => Ok(FormStatus::Archived),
            "closed" => Ok(FormStatus::Closed),
            other => Err(format!("unknown form status '{}'", other)),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct Form {
    pub id: i64,
    pub owner_user_id: i64,
    pub title: String,
    pub description: Option<String>,
    /// Unique and immutable once assigned.
    pub slug: String,
    pub status: FormStatus,
    pub settings: Value,
    pub theme_config: Value,
    pub expires_at: Option<DateTime<Utc>>,
    pub max_responses: Option<i32>,
    pub is_public: bool,
    pub created_by: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub lifecycle: Lifecycle,
}

/// Attributes for a form insert; the slug is already resolved.
#[derive(Clone, Debug)]
pub struct NewForm {
    pub owner_user_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub slug: String,
    pub status: FormStatus,
    pub settings: Value,
    pub theme_config: Value,
    pub expires_at: Option<DateTime<Utc>>,
    pub max_responses: Option<i32>,
    pub is_public: bool,
}

/// Request body for form creation.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct CreateFormInput {
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
    pub slug: Option<String>,
    pub status: Option<FormStatus>,
    pub settings: Option<Value>,
    pub theme_config: Option<Value>,
    pub expires_at: Option<DateTime<Utc>>,
    pub max_responses: Option<i32>,
    pub is_public: Option<bool>,
}

#[derive(Clone, Debug, Serialize)]
pub struct FormWithFields {
    #[serde(flatten)]
    pub form: Form,
    pub fields: Vec<FormField>,
}
