//! Shared application state for all routes.

use crate::service::FormService;
use crate::store::Store;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub forms: FormService,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            forms: FormService::new(store),
        }
    }
}
