//! Form and field orchestration: checks, then validation, then ordering, then one atomic store write.

use crate::error::AppError;
use crate::model::{
    AddFieldFromTypeInput, CreateFieldInput, CreateFormInput, FieldFilter, FieldPatch, Form, FormField,
    FormWithFields, NewField, NewForm,
};
use crate::service::{sort_by_order_index, OptionsValidator, OrderPlacement, ReorderItem};
use crate::slug::{fallback_slug, resolve_unique_slug, slugify, truncate_slug};
use crate::store::Store;
use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;

const MAX_TEXT_LEN: usize = 255;

#[derive(Clone)]
pub struct FormService {
    store: Arc<dyn Store>,
}

impl FormService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    /// Create a form owned by `actor`. The slug comes from `input.slug` when given, else the title.
    pub async fn create_form(&self, actor: Option<i64>, input: CreateFormInput) -> Result<Form, AppError> {
        let owner = actor.ok_or(AppError::Unauthorized)?;
        let title = input.title.trim().to_string();
        if title.is_empty() {
            return Err(AppError::Validation("title is required".into()));
        }
        check_length("title", &title)?;
        if let Some(max) = input.max_responses {
            if max < 1 {
                return Err(AppError::Validation("max_responses must be at least 1".into()));
            }
        }
        let settings = object_or_empty("settings", input.settings)?;
        let theme_config = object_or_empty("theme_config", input.theme_config)?;

        let requested = input
            .slug
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());
        let mut base = truncate_slug(slugify(requested.unwrap_or(&title)));
        if base.is_empty() {
            base = fallback_slug(Utc::now());
        }
        let slug = resolve_unique_slug(self.store.as_ref(), &base).await?;

        let form = self
            .store
            .create_form(NewForm {
                owner_user_id: owner,
                title,
                description: input.description,
                slug,
                status: input.status.unwrap_or_default(),
                settings,
                theme_config,
                expires_at: input.expires_at,
                max_responses: input.max_responses,
                is_public: input.is_public.unwrap_or(true),
            })
            .await?;
        tracing::info!(form_id = form.id, slug = %form.slug, owner, "form created");
        Ok(form)
    }

    /// Form plus its non-deleted fields in display order.
    pub async fn get_form_with_fields(&self, form_id: i64) -> Result<FormWithFields, AppError> {
        let form = self.require_form(form_id).await?;
        let mut fields = self.store.find_fields(form_id, FieldFilter::ActiveOnly).await?;
        sort_by_order_index(&mut fields);
        Ok(FormWithFields { form, fields })
    }

    pub async fn list_fields(&self, form_id: i64) -> Result<Vec<FormField>, AppError> {
        self.require_form(form_id).await?;
        self.store.find_fields(form_id, FieldFilter::ActiveOnly).await
    }

    pub async fn get_field(&self, form_id: i64, field_id: i64) -> Result<FormField, AppError> {
        self.require_field(form_id, field_id).await
    }

    /// Validate options and place the field: at `order_index` when given, else after the last field.
    pub async fn create_field(
        &self,
        form_id: i64,
        mut input: CreateFieldInput,
        actor: Option<i64>,
    ) -> Result<FormField, AppError> {
        self.require_form(form_id).await?;
        check_label(&input.label)?;
        if let Some(p) = &input.placeholder {
            check_length("placeholder", p)?;
        }
        if let Err(e) = OptionsValidator::validate(input.field_type, input.options.as_mut()) {
            tracing::warn!(form_id, field_type = %input.field_type, error = %e, "field options rejected");
            return Err(e.into());
        }

        let placement = OrderPlacement::from(input.order_index);
        let field = self
            .store
            .create_field(
                NewField {
                    form_id,
                    field_type: input.field_type,
                    label: input.label,
                    placeholder: input.placeholder,
                    description: input.description,
                    is_required: input.is_required,
                    validation_rules: input.validation_rules,
                    options: input.options,
                    created_by: actor,
                },
                placement,
            )
            .await?;
        tracing::info!(form_id, field_id = field.id, order_index = field.order_index, "field created");
        Ok(field)
    }

    /// Palette shortcut: create with the type's basics, always appended.
    pub async fn add_field_from_type(
        &self,
        form_id: i64,
        input: AddFieldFromTypeInput,
        actor: Option<i64>,
    ) -> Result<FormField, AppError> {
        self.create_field(form_id, input.into(), actor).await
    }

    /// Partial update. New options are checked against the new field type if one is given, else the current one.
    pub async fn update_field(
        &self,
        form_id: i64,
        field_id: i64,
        mut patch: FieldPatch,
        actor: Option<i64>,
    ) -> Result<FormField, AppError> {
        let field = self.require_field(form_id, field_id).await?;
        if let Some(label) = &patch.label {
            check_label(label)?;
        }
        if let Some(Some(p)) = &patch.placeholder {
            check_length("placeholder", p)?;
        }
        let field_type = patch.field_type.unwrap_or(field.field_type);
        if let Some(options) = patch.options.as_mut() {
            if let Err(e) = OptionsValidator::validate(field_type, options.as_mut()) {
                tracing::warn!(form_id, field_id, field_type = %field_type, error = %e, "field options rejected");
                return Err(e.into());
            }
        }
        let updated = self.store.update_field(&field, &patch, actor).await?;
        tracing::debug!(form_id, field_id, "field updated");
        Ok(updated)
    }

    /// Soft delete. The row stays addressable through the store but leaves default listings.
    pub async fn delete_field(&self, form_id: i64, field_id: i64) -> Result<(), AppError> {
        let field = self.require_field(form_id, field_id).await?;
        self.store.soft_delete_field(&field).await?;
        tracing::info!(form_id, field_id, "field deleted");
        Ok(())
    }

    /// Apply a reorder batch atomically. Entries for fields outside `form_id` are ignored.
    /// Returns how many fields were actually moved.
    pub async fn reorder_fields(&self, form_id: i64, items: &[ReorderItem]) -> Result<u64, AppError> {
        let updated = self.store.reorder_fields(form_id, items).await?;
        if updated < items.len() as u64 {
            tracing::debug!(form_id, requested = items.len(), updated, "reorder matched fewer fields than requested");
        }
        tracing::info!(form_id, updated, "fields reordered");
        Ok(updated)
    }

    async fn require_form(&self, form_id: i64) -> Result<Form, AppError> {
        self.store
            .find_form(form_id)
            .await?
            .ok_or(AppError::NotFound("form"))
    }

    async fn require_field(&self, form_id: i64, field_id: i64) -> Result<FormField, AppError> {
        self.store
            .find_field(field_id, form_id)
            .await?
            .filter(|f| !f.lifecycle.is_deleted())
            .ok_or(AppError::NotFound("field"))
    }
}

fn check_label(label: &str) -> Result<(), AppError> {
    if label.trim().is_empty() {
        return Err(AppError::Validation("label is required".into()));
    }
    check_length("label", label)
}

fn check_length(name: &str, value: &str) -> Result<(), AppError> {
    if value.chars().count() > MAX_TEXT_LEN {
        return Err(AppError::Validation(format!(
            "{} must be at most {} characters",
            name, MAX_TEXT_LEN
        )));
    }
    Ok(())
}

fn object_or_empty(name: &str, value: Option<Value>) -> Result<Value, AppError> {
    match value {
        None | Some(Value::Null) => Ok(Value::Object(Default::default())),
        Some(v @ Value::Object(_)) => Ok(v),
        Some(_) => Err(AppError::Validation(format!("{} must be an object", name))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OptionsError;
    use crate::model::FieldType;
    use crate::store::{FieldStore, MemoryStore};
    use serde_json::json;

    fn service() -> FormService {
        FormService::new(Arc::new(MemoryStore::new()))
    }

    fn form_input(title: &str) -> CreateFormInput {
        CreateFormInput {
            title: title.into(),
            ..Default::default()
        }
    }

    fn field_input(field_type: FieldType, label: &str, options: Option<Value>) -> CreateFieldInput {
        CreateFieldInput {
            field_type,
            label: label.into(),
            placeholder: None,
            description: None,
            is_required: false,
            validation_rules: None,
            options,
            order_index: None,
        }
    }

    #[tokio::test]
    async fn create_form_defaults() {
        let svc = service();
        let form = svc.create_form(Some(1), form_input("Customer Feedback")).await.unwrap();
        assert_eq!(form.slug, "customer-feedback");
        assert_eq!(form.owner_user_id, 1);
        assert_eq!(form.status, crate::model::FormStatus::Draft);
        assert!(form.is_public);
        assert_eq!(form.settings, json!({}));
    }

    #[tokio::test]
    async fn create_form_requires_title_and_actor() {
        let svc = service();
        let err = svc.create_form(Some(1), form_input("   ")).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        let err = svc.create_form(None, form_input("Survey")).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
    }

    #[tokio::test]
    async fn same_title_twice_gets_suffix() {
        let svc = service();
        let a = svc.create_form(Some(1), form_input("Customer Feedback")).await.unwrap();
        let b = svc.create_form(Some(1), form_input("Customer Feedback")).await.unwrap();
        assert_eq!(a.slug, "customer-feedback");
        assert_eq!(b.slug, "customer-feedback-1");
    }

    #[tokio::test]
    async fn explicit_slug_and_fallback() {
        let svc = service();
        let mut input = form_input("Anything");
        input.slug = Some("My Custom_Slug".into());
        let form = svc.create_form(Some(1), input).await.unwrap();
        assert_eq!(form.slug, "my-custom-slug");

        let form = svc.create_form(Some(1), form_input("???")).await.unwrap();
        assert!(form.slug.starts_with("form-"));
    }

    #[tokio::test]
    async fn settings_must_be_objects() {
        let svc = service();
        let mut input = form_input("Survey");
        input.settings = Some(json!([1, 2]));
        let err = svc.create_form(Some(1), input).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn append_assigns_next_index() {
        let svc = service();
        let form = svc.create_form(Some(1), form_input("Survey")).await.unwrap();
        let first = svc
            .create_field(form.id, field_input(FieldType::ShortAnswer, "Name", None), None)
            .await
            .unwrap();
        assert_eq!(first.order_index, 0);

        let mut explicit = field_input(FieldType::Paragraph, "Bio", None);
        explicit.order_index = Some(3);
        svc.create_field(form.id, explicit, None).await.unwrap();

        let next = svc
            .create_field(form.id, field_input(FieldType::Date, "Birthday", None), None)
            .await
            .unwrap();
        assert_eq!(next.order_index, 4);
    }

    #[tokio::test]
    async fn create_field_on_missing_form() {
        let svc = service();
        let err = svc
            .create_field(99, field_input(FieldType::ShortAnswer, "Name", None), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound("form")));
    }

    #[tokio::test]
    async fn invalid_options_not_persisted() {
        let svc = service();
        let form = svc.create_form(Some(1), form_input("Survey")).await.unwrap();
        let err = svc
            .create_field(
                form.id,
                field_input(FieldType::Rating, "Score", Some(json!({ "min": 1, "max": 1 }))),
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidOptions(OptionsError::ScaleBoundsOrder)));
        assert!(svc.list_fields(form.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_revalidates_against_new_type() {
        let svc = service();
        let form = svc.create_form(Some(1), form_input("Survey")).await.unwrap();
        let field = svc
            .create_field(form.id, field_input(FieldType::ShortAnswer, "Pick", None), Some(5))
            .await
            .unwrap();

        let patch: FieldPatch = serde_json::from_value(json!({
            "field_type": "dropdown",
            "options": { "choices": [] }
        }))
        .unwrap();
        let err = svc.update_field(form.id, field.id, patch, None).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidOptions(OptionsError::ChoicesEmpty)));

        let patch: FieldPatch = serde_json::from_value(json!({
            "field_type": "dropdown",
            "options": { "choices": [{ "label": "A" }] }
        }))
        .unwrap();
        let updated = svc.update_field(form.id, field.id, patch, Some(6)).await.unwrap();
        assert_eq!(updated.field_type, FieldType::Dropdown);
        assert_eq!(updated.label, "Pick");
        assert_eq!(updated.updated_by, Some(6));
        assert!(updated.options.unwrap()["choices"][0]["id"].is_string());
    }

    #[tokio::test]
    async fn update_validates_against_existing_type() {
        let svc = service();
        let form = svc.create_form(Some(1), form_input("Survey")).await.unwrap();
        let field = svc
            .create_field(
                form.id,
                field_input(FieldType::LinearScale, "Scale", Some(json!({ "min": 1, "max": 10 }))),
                None,
            )
            .await
            .unwrap();
        let patch: FieldPatch = serde_json::from_value(json!({ "options": { "min": 10, "max": 1 } })).unwrap();
        let err = svc.update_field(form.id, field.id, patch, None).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidOptions(OptionsError::ScaleBoundsOrder)));
    }

    #[tokio::test]
    async fn update_scoped_to_form() {
        let svc = service();
        let a = svc.create_form(Some(1), form_input("A")).await.unwrap();
        let b = svc.create_form(Some(1), form_input("B")).await.unwrap();
        let field = svc
            .create_field(a.id, field_input(FieldType::ShortAnswer, "Name", None), None)
            .await
            .unwrap();
        let err = svc
            .update_field(b.id, field.id, FieldPatch::default(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound("field")));
    }

    #[tokio::test]
    async fn soft_delete_hides_but_keeps_row() {
        let store = Arc::new(MemoryStore::new());
        let svc = FormService::new(store.clone());
        let form = svc.create_form(Some(1), form_input("Survey")).await.unwrap();
        let field = svc
            .create_field(form.id, field_input(FieldType::Time, "When", None), None)
            .await
            .unwrap();

        svc.delete_field(form.id, field.id).await.unwrap();
        assert!(svc.list_fields(form.id).await.unwrap().is_empty());
        assert!(matches!(
            svc.get_field(form.id, field.id).await.unwrap_err(),
            AppError::NotFound("field")
        ));
        assert!(matches!(
            svc.delete_field(form.id, field.id).await.unwrap_err(),
            AppError::NotFound("field")
        ));

        let row = store.find_field(field.id, form.id).await.unwrap().unwrap();
        assert!(row.lifecycle.is_deleted());
        assert!(row.lifecycle.deleted_at().is_some());
    }

    #[tokio::test]
    async fn deleted_field_frees_its_index_for_append() {
        let svc = service();
        let form = svc.create_form(Some(1), form_input("Survey")).await.unwrap();
        svc.create_field(form.id, field_input(FieldType::ShortAnswer, "A", None), None)
            .await
            .unwrap();
        let b = svc
            .create_field(form.id, field_input(FieldType::ShortAnswer, "B", None), None)
            .await
            .unwrap();
        svc.delete_field(form.id, b.id).await.unwrap();
        let c = svc
            .create_field(form.id, field_input(FieldType::ShortAnswer, "C", None), None)
            .await
            .unwrap();
        assert_eq!(c.order_index, 1);
    }

    #[tokio::test]
    async fn reorder_swaps_and_ignores_foreign_fields() {
        let svc = service();
        let form = svc.create_form(Some(1), form_input("Survey")).await.unwrap();
        let other = svc.create_form(Some(1), form_input("Other")).await.unwrap();
        let mut ids = Vec::new();
        for label in ["A", "B", "C"] {
            let f = svc
                .create_field(form.id, field_input(FieldType::ShortAnswer, label, None), None)
                .await
                .unwrap();
            ids.push(f.id);
        }
        let foreign = svc
            .create_field(other.id, field_input(FieldType::ShortAnswer, "X", None), None)
            .await
            .unwrap();

        let updated = svc
            .reorder_fields(
                form.id,
                &[
                    ReorderItem { field_id: ids[0], order_index: 2 },
                    ReorderItem { field_id: ids[2], order_index: 0 },
                    ReorderItem { field_id: foreign.id, order_index: 9 },
                ],
            )
            .await
            .unwrap();
        assert_eq!(updated, 2);

        let listed: Vec<i64> = svc.list_fields(form.id).await.unwrap().iter().map(|f| f.id).collect();
        assert_eq!(listed, vec![ids[2], ids[1], ids[0]]);
        let foreign_now = svc.get_field(other.id, foreign.id).await.unwrap();
        assert_eq!(foreign_now.order_index, 0);
    }

    #[tokio::test]
    async fn customer_feedback_scenario() {
        let svc = service();
        let form = svc.create_form(Some(1), form_input("Customer Feedback")).await.unwrap();
        assert_eq!(form.slug, "customer-feedback");

        let region = svc
            .create_field(
                form.id,
                field_input(
                    FieldType::Dropdown,
                    "Region",
                    Some(json!({ "choices": [{ "label": "North" }, { "label": "South" }] })),
                ),
                Some(1),
            )
            .await
            .unwrap();
        assert_eq!(region.order_index, 0);
        assert_eq!(region.created_by, Some(1));
        let choices = region.options.as_ref().unwrap()["choices"].as_array().unwrap().clone();
        assert!(choices.iter().all(|c| c["id"].is_string()));

        let err = svc
            .create_field(
                form.id,
                field_input(FieldType::Rating, "Score", Some(json!({ "min": 1, "max": 1 }))),
                Some(1),
            )
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "min must be < max");

        let full = svc.get_form_with_fields(form.id).await.unwrap();
        assert_eq!(full.fields.len(), 1);
        assert_eq!(full.fields[0].id, region.id);
    }
}
