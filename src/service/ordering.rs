//! Field ordering: append placement and bulk reorder batches.

use crate::model::FormField;
use serde::Deserialize;

/// Where a newly created field goes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrderPlacement {
    /// After the current last field (`max + 1`, or 0 on an empty form).
    Append,
    At(i32),
}

impl From<Option<i32>> for OrderPlacement {
    fn from(index: Option<i32>) -> Self {
        index.map_or(OrderPlacement::Append, OrderPlacement::At)
    }
}

impl OrderPlacement {
    /// Resolve against the current maximum index of the form's non-deleted fields.
    pub fn resolve(self, current_max: Option<i32>) -> i32 {
        match self {
            OrderPlacement::At(i) => i,
            OrderPlacement::Append => next_order_index(current_max),
        }
    }
}

pub fn next_order_index(current_max: Option<i32>) -> i32 {
    current_max.map_or(0, |m| m.saturating_add(1))
}

/// One entry of a reorder batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub struct ReorderItem {
    pub field_id: i64,
    pub order_index: i32,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ReorderRequest {
    pub order: Vec<ReorderItem>,
}

/// Stable ascending sort by `order_index`; equal indices keep their incoming order.
pub fn sort_by_order_index(fields: &mut [FormField]) {
    fields.sort_by_key(|f| f.order_index);
}

/// Apply a reorder batch to an in-memory field set. Only entries whose id belongs to `form_id`
/// and is not soft-deleted are touched; the rest match nothing. Returns the number of fields updated.
pub fn apply_reorder(fields: &mut [FormField], form_id: i64, items: &[ReorderItem]) -> u64 {
    let mut updated = 0;
    for item in items {
        if let Some(f) = fields
            .iter_mut()
            .find(|f| f.id == item.field_id && f.form_id == form_id && !f.lifecycle.is_deleted())
        {
            f.order_index = item.order_index;
            updated += 1;
        }
    }
    updated
}
