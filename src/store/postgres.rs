//! PostgreSQL store. Tables live in the schema named by `AppConfig::schema`.

use crate::config::AppConfig;
use crate::error::AppError;
use crate::migration::apply_migrations;
use crate::model::{FieldFilter, FieldPatch, FieldType, Form, FormField, FormStatus, Lifecycle, NewField, NewForm};
use crate::service::{OrderPlacement, ReorderItem};
use crate::store::{ensure_database_exists, quote_ident, FieldStore, FormStore, Store};
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;

const FORM_COLUMNS: &str = "id, owner_user_id, title, description, slug, status, settings, theme_config, \
     expires_at, max_responses, is_public, created_by, created_at, updated_at, is_deleted, deleted_at";

const FIELD_COLUMNS: &str = "id, form_id, field_type, label, placeholder, description, is_required, \
     validation_rules, options, order_index, created_by, updated_by, created_at, updated_at, is_deleted, deleted_at";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
    forms: String,
    fields: String,
}

impl PgStore {
    /// Wrap an existing pool. `schema` must already hold the tables (see `apply_migrations`).
    pub fn new(pool: PgPool, schema: &str) -> Self {
        let schema = quote_ident(schema);
        Self {
            pool,
            forms: format!("{}.forms", schema),
            fields: format!("{}.form_fields", schema),
        }
    }

    /// Create the database if needed, open the pool and apply migrations.
    pub async fn connect(config: &AppConfig) -> Result<Self, AppError> {
        ensure_database_exists(&config.database_url).await?;
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.database_url)
            .await?;
        apply_migrations(&pool, &config.schema).await?;
        Ok(Self::new(pool, &config.schema))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn form_from_row(row: &PgRow) -> Result<Form, sqlx::Error> {
    let status: String = row.try_get("status")?;
    let status: FormStatus = status.parse().map_err(|e: String| sqlx::Error::Decode(e.into()))?;
    let updated_at = row.try_get("updated_at")?;
    Ok(Form {
        id: row.try_get("id")?,
        owner_user_id: row.try_get("owner_user_id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        slug: row.try_get("slug")?,
        status,
        settings: row.try_get("settings")?,
        theme_config: row.try_get("theme_config")?,
        expires_at: row.try_get("expires_at")?,
        max_responses: row.try_get("max_responses")?,
        is_public: row.try_get("is_public")?,
        created_by: row.try_get("created_by")?,
        created_at: row.try_get("created_at")?,
        updated_at,
        lifecycle: Lifecycle::from_columns(row.try_get("is_deleted")?, row.try_get("deleted_at")?, updated_at),
    })
}

fn field_from_row(row: &PgRow) -> Result<FormField, sqlx::Error> {
    let field_type: String = row.try_get("field_type")?;
    let field_type: FieldType = field_type.parse().map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
    let updated_at = row.try_get("updated_at")?;
    Ok(FormField {
        id: row.try_get("id")?,
        form_id: row.try_get("form_id")?,
        field_type,
        label: row.try_get("label")?,
        placeholder: row.try_get("placeholder")?,
        description: row.try_get("description")?,
        is_required: row.try_get("is_required")?,
        validation_rules: row.try_get("validation_rules")?,
        options: row.try_get("options")?,
        order_index: row.try_get("order_index")?,
        created_by: row.try_get("created_by")?,
        updated_by: row.try_get("updated_by")?,
        created_at: row.try_get("created_at")?,
        updated_at,
        lifecycle: Lifecycle::from_columns(row.try_get("is_deleted")?, row.try_get("deleted_at")?, updated_at),
    })
}

#[async_trait]
impl FormStore for PgStore {
    async fn find_form(&self, id: i64) -> Result<Option<Form>, AppError> {
        let sql = format!(
            "SELECT {} FROM {} WHERE id = $1 AND is_deleted = FALSE",
            FORM_COLUMNS, self.forms
        );
        tracing::debug!(sql = %sql, id, "query");
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        Ok(row.as_ref().map(form_from_row).transpose()?)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Form>, AppError> {
        let sql = format!("SELECT {} FROM {} WHERE slug = $1", FORM_COLUMNS, self.forms);
        tracing::debug!(sql = %sql, slug, "query");
        let row = sqlx::query(&sql).bind(slug).fetch_optional(&self.pool).await?;
        Ok(row.as_ref().map(form_from_row).transpose()?)
    }

    async fn create_form(&self, new: NewForm) -> Result<Form, AppError> {
        let sql = format!(
            "INSERT INTO {} (owner_user_id, title, description, slug, status, settings, theme_config, \
             expires_at, max_responses, is_public, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $1) RETURNING {}",
            self.forms, FORM_COLUMNS
        );
        tracing::debug!(sql = %sql, slug = %new.slug, "insert");
        let row = sqlx::query(&sql)
            .bind(new.owner_user_id)
            .bind(&new.title)
            .bind(&new.description)
            .bind(&new.slug)
            .bind(new.status.as_str())
            .bind(&new.settings)
            .bind(&new.theme_config)
            .bind(new.expires_at)
            .bind(new.max_responses)
            .bind(new.is_public)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::from_db)?;
        Ok(form_from_row(&row)?)
    }
}

#[async_trait]
impl FieldStore for PgStore {
    async fn find_fields(&self, form_id: i64, filter: FieldFilter) -> Result<Vec<FormField>, AppError> {
        let deleted_clause = match filter {
            FieldFilter::ActiveOnly => " AND is_deleted = FALSE",
            FieldFilter::IncludeDeleted => "",
        };
        let sql = format!(
            "SELECT {} FROM {} WHERE form_id = $1{} ORDER BY order_index ASC, id ASC",
            FIELD_COLUMNS, self.fields, deleted_clause
        );
        tracing::debug!(sql = %sql, form_id, "query");
        let rows = sqlx::query(&sql).bind(form_id).fetch_all(&self.pool).await?;
        Ok(rows.iter().map(field_from_row).collect::<Result<Vec<_>, _>>()?)
    }

    async fn find_field(&self, field_id: i64, form_id: i64) -> Result<Option<FormField>, AppError> {
        let sql = format!(
            "SELECT {} FROM {} WHERE id = $1 AND form_id = $2",
            FIELD_COLUMNS, self.fields
        );
        tracing::debug!(sql = %sql, field_id, form_id, "query");
        let row = sqlx::query(&sql)
            .bind(field_id)
            .bind(form_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(field_from_row).transpose()?)
    }

    async fn max_order_index(&self, form_id: i64) -> Result<Option<i32>, AppError> {
        let sql = format!(
            "SELECT MAX(order_index) FROM {} WHERE form_id = $1 AND is_deleted = FALSE",
            self.fields
        );
        let (max,): (Option<i32>,) = sqlx::query_as(&sql).bind(form_id).fetch_one(&self.pool).await?;
        Ok(max)
    }

    async fn create_field(&self, new: NewField, placement: OrderPlacement) -> Result<FormField, AppError> {
        let mut tx = self.pool.begin().await?;
        let order_index = match placement {
            OrderPlacement::At(i) => i,
            OrderPlacement::Append => {
                let sql = format!(
                    "SELECT MAX(order_index) FROM {} WHERE form_id = $1 AND is_deleted = FALSE",
                    self.fields
                );
                let (max,): (Option<i32>,) = sqlx::query_as(&sql).bind(new.form_id).fetch_one(&mut *tx).await?;
                placement.resolve(max)
            }
        };
        let sql = format!(
            "INSERT INTO {} (form_id, field_type, label, placeholder, description, is_required, \
             validation_rules, options, order_index, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING {}",
            self.fields, FIELD_COLUMNS
        );
        tracing::debug!(sql = %sql, form_id = new.form_id, order_index, "insert (tx)");
        let row = sqlx::query(&sql)
            .bind(new.form_id)
            .bind(new.field_type.as_str())
            .bind(&new.label)
            .bind(&new.placeholder)
            .bind(&new.description)
            .bind(new.is_required)
            .bind(&new.validation_rules)
            .bind(&new.options)
            .bind(order_index)
            .bind(new.created_by)
            .fetch_one(&mut *tx)
            .await;
        let row = match row {
            Ok(row) => row,
            Err(e) => {
                tx.rollback().await?;
                return Err(AppError::from_db(e));
            }
        };
        let field = field_from_row(&row)?;
        tx.commit().await?;
        Ok(field)
    }

    async fn update_field(
        &self,
        field: &FormField,
        patch: &FieldPatch,
        actor: Option<i64>,
    ) -> Result<FormField, AppError> {
        let mut next = field.clone();
        next.apply(patch, actor);
        let sql = format!(
            "UPDATE {} SET field_type = $1, label = $2, placeholder = $3, description = $4, is_required = $5, \
             validation_rules = $6, options = $7, order_index = $8, updated_by = $9, updated_at = NOW() \
             WHERE id = $10 AND form_id = $11 AND is_deleted = FALSE RETURNING {}",
            self.fields, FIELD_COLUMNS
        );
        tracing::debug!(sql = %sql, field_id = field.id, "update");
        let row = sqlx::query(&sql)
            .bind(next.field_type.as_str())
            .bind(&next.label)
            .bind(&next.placeholder)
            .bind(&next.description)
            .bind(next.is_required)
            .bind(&next.validation_rules)
            .bind(&next.options)
            .bind(next.order_index)
            .bind(next.updated_by)
            .bind(field.id)
            .bind(field.form_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::from_db)?
            .ok_or(AppError::NotFound("field"))?;
        Ok(field_from_row(&row)?)
    }

    async fn soft_delete_field(&self, field: &FormField) -> Result<(), AppError> {
        let sql = format!(
            "UPDATE {} SET is_deleted = TRUE, deleted_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND form_id = $2 AND is_deleted = FALSE",
            self.fields
        );
        tracing::debug!(sql = %sql, field_id = field.id, "soft delete");
        sqlx::query(&sql)
            .bind(field.id)
            .bind(field.form_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn reorder_fields(&self, form_id: i64, items: &[ReorderItem]) -> Result<u64, AppError> {
        let sql = format!(
            "UPDATE {} SET order_index = $1, updated_at = NOW() \
             WHERE id = $2 AND form_id = $3 AND is_deleted = FALSE",
            self.fields
        );
        let mut tx = self.pool.begin().await?;
        let mut updated = 0u64;
        for item in items {
            let res = sqlx::query(&sql)
                .bind(item.order_index)
                .bind(item.field_id)
                .bind(form_id)
                .execute(&mut *tx)
                .await;
            match res {
                Ok(r) => updated += r.rows_affected(),
                Err(e) => {
                    tracing::warn!(form_id, field_id = item.field_id, error = %e, "reorder failed, rolling back");
                    tx.rollback().await?;
                    return Err(AppError::from_db(e));
                }
            }
        }
        tx.commit().await?;
        Ok(updated)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").fetch_optional(&self.pool).await?;
        Ok(())
    }
}
