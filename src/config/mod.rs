//! Startup configuration: settings from the environment and their validation.

pub mod settings;
pub mod validator;

pub use settings::*;
pub use validator::*;
