//! Form and field operations: options validation, ordering and orchestration over a `Store`.

mod forms;
mod options;
mod ordering;

pub use forms::FormService;
pub use options::{choice_id, OptionsValidator};
pub use ordering::{apply_reorder, next_order_index, sort_by_order_index, OrderPlacement, ReorderItem, ReorderRequest};
