//! Form handlers: create, read with fields.

use crate::error::AppError;
use crate::extractors::ActorId;
use crate::handlers::{parse_body, parse_id};
use crate::model::CreateFormInput;
use crate::response::{success_one, success_one_ok};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde_json::Value;

pub async fn create_form(
    State(state): State<AppState>,
    ActorId(actor): ActorId,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let input: CreateFormInput = parse_body(body)?;
    let form = state.forms.create_form(actor, input).await?;
    Ok(success_one(form))
}

pub async fn get_form(
    State(state): State<AppState>,
    Path(form_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let form_id = parse_id(&form_id, "form")?;
    let form = state.forms.get_form_with_fields(form_id).await?;
    Ok(success_one_ok(form))
}
