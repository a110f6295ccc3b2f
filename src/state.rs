// src/state.rs
use crate::{config::Config, store::Store};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    // Coleções JSON (ou em memória, nos testes)
    pub store: Store,
}

impl AppState {
    pub fn new(config: Config, store: Store) -> Self {
        Self { config: Arc::new(config), store }
    }
}

