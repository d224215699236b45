//! DDL for the forms schema: `forms`, `form_fields` and their indexes. Idempotent.

use crate::error::AppError;
use crate::model::FieldType;
use crate::store::quote_ident;
use sqlx::PgPool;

/// Create the schema and tables if they do not exist.
pub async fn apply_migrations(pool: &PgPool, schema: &str) -> Result<(), AppError> {
    let schema_q = quote_ident(schema);
    let forms = format!("{}.forms", schema_q);
    let fields = format!("{}.form_fields", schema_q);

    sqlx::query(&format!("CREATE SCHEMA IF NOT EXISTS {}", schema_q))
        .execute(pool)
        .await?;

    let forms_ddl = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {} (
            id BIGSERIAL PRIMARY KEY,
            owner_user_id BIGINT NOT NULL,
            title VARCHAR(255) NOT NULL,
            description TEXT,
            slug VARCHAR(255) NOT NULL,
            status TEXT NOT NULL DEFAULT 'draft',
            settings JSONB NOT NULL DEFAULT '{{}}'::jsonb,
            theme_config JSONB NOT NULL DEFAULT '{{}}'::jsonb,
            expires_at TIMESTAMPTZ,
            max_responses INTEGER,
            is_public BOOLEAN NOT NULL DEFAULT TRUE,
            created_by BIGINT,
            updated_by BIGINT,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            is_deleted BOOLEAN NOT NULL DEFAULT FALSE,
            deleted_at TIMESTAMPTZ,
            CONSTRAINT forms_slug_key UNIQUE (slug),
            CONSTRAINT forms_status_check CHECK (status IN ('draft', 'published', 'archived', 'closed')),
            CONSTRAINT forms_max_responses_check CHECK (max_responses IS NULL OR max_responses >= 1),
            CONSTRAINT forms_lifecycle_check CHECK (is_deleted = (deleted_at IS NOT NULL))
        )
        "#,
        forms
    );
    sqlx::query(&forms_ddl).execute(pool).await?;

    let type_list = FieldType::ALL
        .iter()
        .map(|t| format!("'{}'", t.as_str()))
        .collect::<Vec<_>>()
        .join(", ");
    let fields_ddl = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {} (
            id BIGSERIAL PRIMARY KEY,
            form_id BIGINT NOT NULL REFERENCES {} (id),
            field_type VARCHAR(50) NOT NULL,
            label VARCHAR(255) NOT NULL,
            placeholder VARCHAR(255),
            description TEXT,
            is_required BOOLEAN NOT NULL DEFAULT FALSE,
            validation_rules JSONB,
            options JSONB,
            order_index INTEGER NOT NULL,
            created_by BIGINT,
            updated_by BIGINT,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            is_deleted BOOLEAN NOT NULL DEFAULT FALSE,
            deleted_at TIMESTAMPTZ,
            CONSTRAINT form_fields_type_check CHECK (field_type IN ({})),
            CONSTRAINT form_fields_lifecycle_check CHECK (is_deleted = (deleted_at IS NOT NULL))
        )
        "#,
        fields, forms, type_list
    );
    sqlx::query(&fields_ddl).execute(pool).await?;

    let order_idx = format!(
        "CREATE INDEX IF NOT EXISTS form_fields_order_idx ON {} (form_id, order_index) WHERE is_deleted = FALSE",
        fields
    );
    sqlx::query(&order_idx).execute(pool).await?;

    tracing::info!(schema, "migrations applied");
    Ok(())
}
