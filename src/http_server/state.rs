//! Shared handler state

use std::sync::Arc;

use crate::tiering::TieringEngine;

#[derive(Debug, Clone)]
pub struct AppState {
    pub engine: Arc<TieringEngine>,
}

impl AppState {
    pub fn new(engine: Arc<TieringEngine>) -> Self {
        Self { engine }
    }
}
