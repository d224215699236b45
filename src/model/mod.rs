//! Domain records: forms, fields and their lifecycle.

mod field;
mod field_type;
mod form;
mod lifecycle;

pub use field::{AddFieldFromTypeInput, CreateFieldInput, FieldFilter, FieldPatch, FormField, NewField};
pub use field_type::{FieldType, FieldTypeDescriptor, UnknownFieldType};
pub use form::{CreateFormInput, Form, FormStatus, FormWithFields, NewForm};
pub use lifecycle::Lifecycle;
