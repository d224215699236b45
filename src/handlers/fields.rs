//! Field handlers: list, create, from-type, read, update, delete, reorder.

use crate::error::AppError;
use crate::extractors::ActorId;
use crate::handlers::{parse_body, parse_id};
use crate::model::{AddFieldFromTypeInput, CreateFieldInput, FieldPatch};
use crate::response::{success_ack, success_many, success_one, success_one_ok};
use crate::service::ReorderRequest;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde_json::{json, Value};

fn parse_ids(form_id: &str, field_id: &str) -> Result<(i64, i64), AppError> {
    Ok((parse_id(form_id, "form")?, parse_id(field_id, "field")?))
}

pub async fn list(
    State(state): State<AppState>,
    Path(form_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let form_id = parse_id(&form_id, "form")?;
    let fields = state.forms.list_fields(form_id).await?;
    Ok(success_many(fields))
}

pub async fn create(
    State(state): State<AppState>,
    ActorId(actor): ActorId,
    Path(form_id): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let form_id = parse_id(&form_id, "form")?;
    let input: CreateFieldInput = parse_body(body)?;
    let field = state.forms.create_field(form_id, input, actor).await?;
    Ok(success_one(field))
}

pub async fn create_from_type(
    State(state): State<AppState>,
    ActorId(actor): ActorId,
    Path(form_id): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let form_id = parse_id(&form_id, "form")?;
    let input: AddFieldFromTypeInput = parse_body(body)?;
    let field = state.forms.add_field_from_type(form_id, input, actor).await?;
    Ok(success_one(field))
}

pub async fn read(
    State(state): State<AppState>,
    Path((form_id, field_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let (form_id, field_id) = parse_ids(&form_id, &field_id)?;
    let field = state.forms.get_field(form_id, field_id).await?;
    Ok(success_one_ok(field))
}

pub async fn update(
    State(state): State<AppState>,
    ActorId(actor): ActorId,
    Path((form_id, field_id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let (form_id, field_id) = parse_ids(&form_id, &field_id)?;
    let patch: FieldPatch = parse_body(body)?;
    let field = state.forms.update_field(form_id, field_id, patch, actor).await?;
    Ok(success_one_ok(field))
}

pub async fn delete(
    State(state): State<AppState>,
    Path((form_id, field_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let (form_id, field_id) = parse_ids(&form_id, &field_id)?;
    state.forms.delete_field(form_id, field_id).await?;
    Ok(success_ack(None))
}

pub async fn reorder(
    State(state): State<AppState>,
    Path(form_id): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let form_id = parse_id(&form_id, "form")?;
    let request: ReorderRequest = parse_body(body)?;
    let updated = state.forms.reorder_fields(form_id, &request.order).await?;
    Ok(success_ack(Some(json!({ "updated": updated }))))
}
