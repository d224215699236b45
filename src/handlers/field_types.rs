//! Field type catalog for the builder palette.

use crate::model::FieldType;
use crate::response::success_many;
use axum::response::IntoResponse;

pub async fn list() -> impl IntoResponse {
    let catalog = FieldType::ALL.iter().map(|t| t.descriptor()).collect::<Vec<_>>();
    success_many(catalog)
}
