//! Formkit: form builder backend for field definitions, option validation, and ordering.

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod migration;
pub mod model;
pub mod response;
pub mod routes;
pub mod service;
pub mod slug;
pub mod state;
pub mod store;

pub use config::AppConfig;
pub use error::{AppError, ConfigError, OptionsError};
pub use extractors::ActorId;
pub use migration::apply_migrations;
pub use response::{success_ack, success_many, success_one, success_one_ok};
pub use routes::{admin_routes, app_router, common_routes};
pub use service::{FormService, OptionsValidator};
pub use state::AppState;
pub use store::{ensure_database_exists, MemoryStore, PgStore, Store};
