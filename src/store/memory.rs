//! In-process store for tests and local development.

use crate::error::AppError;
use crate::model::{FieldFilter, FieldPatch, Form, FormField, Lifecycle, NewField, NewForm};
use crate::service::{apply_reorder, sort_by_order_index, OrderPlacement, ReorderItem};
use crate::store::{FieldStore, FormStore, Store};
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

#[derive(Default)]
struct Tables {
    forms: Vec<Form>,
    fields: Vec<FormField>,
    next_form_id: i64,
    next_field_id: i64,
}

/// Keeps forms and fields in memory behind one lock, so every write is atomic.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn max_active_index(fields: &[FormField], form_id: i64) -> Option<i32> {
    fields
        .iter()
        .filter(|f| f.form_id == form_id && !f.lifecycle.is_deleted())
        .map(|f| f.order_index)
        .max()
}

#[async_trait]
impl FormStore for MemoryStore {
    async fn find_form(&self, id: i64) -> Result<Option<Form>, AppError> {
        let t = self.tables.read().await;
        Ok(t.forms
            .iter()
            .find(|f| f.id == id && !f.lifecycle.is_deleted())
            .cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Form>, AppError> {
        let t = self.tables.read().await;
        Ok(t.forms.iter().find(|f| f.slug == slug).cloned())
    }

    async fn create_form(&self, new: NewForm) -> Result<Form, AppError> {
        let mut t = self.tables.write().await;
        if t.forms.iter().any(|f| f.slug == new.slug) {
            return Err(AppError::Conflict("duplicate value for forms_slug_key".into()));
        }
        t.next_form_id += 1;
        let now = Utc::now();
        let form = Form {
            id: t.next_form_id,
            owner_user_id: new.owner_user_id,
            title: new.title,
            description: new.description,
            slug: new.slug,
            status: new.status,
            settings: new.settings,
            theme_config: new.theme_config,
            expires_at: new.expires_at,
            max_responses: new.max_responses,
            is_public: new.is_public,
            created_by: Some(new.owner_user_id),
            created_at: now,
            updated_at: now,
            lifecycle: Lifecycle::Active,
        };
        t.forms.push(form.clone());
        Ok(form)
    }
}

#[async_trait]
impl FieldStore for MemoryStore {
    async fn find_fields(&self, form_id: i64, filter: FieldFilter) -> Result<Vec<FormField>, AppError> {
        let t = self.tables.read().await;
        let mut fields: Vec<FormField> = t
            .fields
            .iter()
            .filter(|f| f.form_id == form_id && filter.admits(&f.lifecycle))
            .cloned()
            .collect();
        fields.sort_by_key(|f| f.id);
        sort_by_order_index(&mut fields);
        Ok(fields)
    }

    async fn find_field(&self, field_id: i64, form_id: i64) -> Result<Option<FormField>, AppError> {
        let t = self.tables.read().await;
        Ok(t.fields
            .iter()
            .find(|f| f.id == field_id && f.form_id == form_id)
            .cloned())
    }

    async fn max_order_index(&self, form_id: i64) -> Result<Option<i32>, AppError> {
        let t = self.tables.read().await;
        Ok(max_active_index(&t.fields, form_id))
    }

    async fn create_field(&self, new: NewField, placement: OrderPlacement) -> Result<FormField, AppError> {
        let mut t = self.tables.write().await;
        if !t.forms.iter().any(|f| f.id == new.form_id) {
            return Err(AppError::Conflict("form_fields_form_id_fkey".into()));
        }
        let order_index = placement.resolve(max_active_index(&t.fields, new.form_id));
        t.next_field_id += 1;
        let now = Utc::now();
        let field = FormField {
            id: t.next_field_id,
            form_id: new.form_id,
            field_type: new.field_type,
            label: new.label,
            placeholder: new.placeholder,
            description: new.description,
            is_required: new.is_required,
            validation_rules: new.validation_rules,
            options: new.options,
            order_index,
            created_by: new.created_by,
            updated_by: None,
            created_at: now,
            updated_at: now,
            lifecycle: Lifecycle::Active,
        };
        t.fields.push(field.clone());
        Ok(field)
    }

    async fn update_field(
        &self,
        field: &FormField,
        patch: &FieldPatch,
        actor: Option<i64>,
    ) -> Result<FormField, AppError> {
        let mut t = self.tables.write().await;
        let stored = t
            .fields
            .iter_mut()
            .find(|f| f.id == field.id && f.form_id == field.form_id)
            .ok_or(AppError::NotFound("field"))?;
        stored.apply(patch, actor);
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn soft_delete_field(&self, field: &FormField) -> Result<(), AppError> {
        let mut t = self.tables.write().await;
        if let Some(stored) = t
            .fields
            .iter_mut()
            .find(|f| f.id == field.id && f.form_id == field.form_id)
        {
            let now = Utc::now();
            stored.lifecycle = Lifecycle::Deleted { at: now };
            stored.updated_at = now;
        }
        Ok(())
    }

    async fn reorder_fields(&self, form_id: i64, items: &[ReorderItem]) -> Result<u64, AppError> {
        let mut t = self.tables.write().await;
        Ok(apply_reorder(&mut t.fields, form_id, items))
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FieldType;
    use serde_json::json;

    async fn seeded() -> (MemoryStore, i64) {
        let store = MemoryStore::new();
        let form = store
            .create_form(NewForm {
                owner_user_id: 1,
                title: "Survey".into(),
                description: None,
                slug: "survey".into(),
                status: Default::default(),
                settings: json!({}),
                theme_config: json!({}),
                expires_at: None,
                max_responses: None,
                is_public: true,
            })
            .await
            .unwrap();
        (store, form.id)
    }

    fn new_field(form_id: i64, label: &str) -> NewField {
        NewField {
            form_id,
            field_type: FieldType::ShortAnswer,
            label: label.into(),
            placeholder: None,
            description: None,
            is_required: false,
            validation_rules: None,
            options: None,
            created_by: None,
        }
    }

    #[tokio::test]
    async fn max_index_ignores_deleted() {
        let (store, form_id) = seeded().await;
        assert_eq!(store.max_order_index(form_id).await.unwrap(), None);
        store.create_field(new_field(form_id, "A"), OrderPlacement::Append).await.unwrap();
        let b = store.create_field(new_field(form_id, "B"), OrderPlacement::At(5)).await.unwrap();
        assert_eq!(store.max_order_index(form_id).await.unwrap(), Some(5));

        store.soft_delete_field(&b).await.unwrap();
        assert_eq!(store.max_order_index(form_id).await.unwrap(), Some(0));
    }

    #[tokio::test]
    async fn filter_controls_deleted_rows() {
        let (store, form_id) = seeded().await;
        let a = store.create_field(new_field(form_id, "A"), OrderPlacement::Append).await.unwrap();
        store.create_field(new_field(form_id, "B"), OrderPlacement::Append).await.unwrap();
        store.soft_delete_field(&a).await.unwrap();

        let active = store.find_fields(form_id, FieldFilter::ActiveOnly).await.unwrap();
        assert_eq!(active.len(), 1);
        let all = store.find_fields(form_id, FieldFilter::IncludeDeleted).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn duplicate_slug_conflicts() {
        let (store, _) = seeded().await;
        let err = store
            .create_form(NewForm {
                owner_user_id: 2,
                title: "Other".into(),
                description: None,
                slug: "survey".into(),
                status: Default::default(),
                settings: json!({}),
                theme_config: json!({}),
                expires_at: None,
                max_responses: None,
                is_public: false,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }
}
