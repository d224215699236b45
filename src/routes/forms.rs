//! Form builder admin routes, mounted under `/api/admin`.

use crate::handlers::{field_types, fields, forms};
use crate::state::AppState;
use axum::{
    routing::{get, post, put},
    Router,
};

pub fn admin_routes(state: AppState) -> Router {
    Router::new()
        .route("/forms", post(forms::create_form))
        .route("/forms/:form_id", get(forms::get_form))
        .route("/forms/:form_id/fields", get(fields::list).post(fields::create))
        .route("/forms/:form_id/fields/from-type", post(fields::create_from_type))
        .route("/forms/:form_id/fields/reorder", put(fields::reorder))
        .route(
            "/forms/:form_id/fields/:field_id",
            get(fields::read)
                .put(fields::update)
                .patch(fields::update)
                .delete(fields::delete),
        )
        .route("/field-types", get(field_types::list))
        .with_state(state)
}
