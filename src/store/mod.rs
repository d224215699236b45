//! Persistence boundary for forms and fields.
//!
//! `PgStore` is the production backend; `MemoryStore` keeps everything in process and backs the tests.
//! Multi-row writes (`create_field` with an appended index, `reorder_fields`) are all-or-nothing.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use crate::error::{AppError, ConfigError};
use crate::model::{FieldFilter, FieldPatch, Form, FormField, NewField, NewForm};
use crate::service::{OrderPlacement, ReorderItem};
use async_trait::async_trait;
use sqlx::ConnectOptions;
use std::str::FromStr;

#[async_trait]
pub trait FormStore: Send + Sync {
    /// Non-deleted form by id.
    async fn find_form(&self, id: i64) -> Result<Option<Form>, AppError>;

    /// Form holding `slug`, soft-deleted ones included since the unique key covers them.
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Form>, AppError>;

    /// Insert a form. A taken slug surfaces as `AppError::Conflict`.
    async fn create_form(&self, new: NewForm) -> Result<Form, AppError>;
}

#[async_trait]
pub trait FieldStore: Send + Sync {
    /// Fields of a form ordered by `order_index` ascending, then id.
    async fn find_fields(&self, form_id: i64, filter: FieldFilter) -> Result<Vec<FormField>, AppError>;

    /// Field by id scoped to its form. Soft-deleted rows are returned with their lifecycle set.
    async fn find_field(&self, field_id: i64, form_id: i64) -> Result<Option<FormField>, AppError>;

    /// Highest `order_index` among the form's non-deleted fields.
    async fn max_order_index(&self, form_id: i64) -> Result<Option<i32>, AppError>;

    /// Insert a field. An `Append` placement is resolved inside the same transaction as the insert.
    async fn create_field(&self, new: NewField, placement: OrderPlacement) -> Result<FormField, AppError>;

    /// Write `patch` over `field` and return the stored row.
    async fn update_field(
        &self,
        field: &FormField,
        patch: &FieldPatch,
        actor: Option<i64>,
    ) -> Result<FormField, AppError>;

    async fn soft_delete_field(&self, field: &FormField) -> Result<(), AppError>;

    /// Apply every index assignment or none. Entries not matching (field_id, form_id) update nothing.
    /// Returns the number of rows updated.
    async fn reorder_fields(&self, form_id: i64, items: &[ReorderItem]) -> Result<u64, AppError>;
}

#[async_trait]
pub trait Store: FormStore + FieldStore {
    /// Cheap liveness check for readiness probes.
    async fn ping(&self) -> Result<(), AppError>;
}

/// Ensure the database in `database_url` exists; create it if not. Connects to the
/// default `postgres` database to run CREATE DATABASE. Call before creating the main pool.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let (admin_url, db_name) = parse_db_name_from_url(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = sqlx::postgres::PgConnectOptions::from_str(&admin_url)
        .map_err(|e| ConfigError::Invalid {
            key: "DATABASE_URL",
            reason: e.to_string(),
        })?;
    let mut conn: sqlx::PgConnection = opts.connect().await.map_err(AppError::Db)?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await
        .map_err(AppError::Db)?;
    if !exists.0 {
        tracing::info!(database = %db_name, "creating database");
        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(&db_name)))
            .execute(&mut conn)
            .await
            .map_err(AppError::Db)?;
    }
    Ok(())
}

fn parse_db_name_from_url(url: &str) -> Result<(String, String), AppError> {
    let authority_start = url.find("://").map(|i| i + 3).unwrap_or(0);
    let path_start = url
        .get(authority_start..)
        .and_then(|rest| rest.find('/'))
        .map(|i| authority_start + i + 1)
        .ok_or(ConfigError::Invalid {
            key: "DATABASE_URL",
            reason: "no database path".into(),
        })?;
    let path_and_query = url.get(path_start..).unwrap_or("");
    let db_name = path_and_query.split('?').next().unwrap_or("").trim();
    let base = url.get(..path_start).unwrap_or(url);
    let admin_url = format!("{}postgres", base);
    Ok((admin_url, db_name.to_string()))
}

pub(crate) fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
