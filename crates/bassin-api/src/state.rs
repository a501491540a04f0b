//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor. The [`Atlas`] is cheap to clone: it holds
//! `Arc`s to the backend.

use bassin_core::{Atlas, MemorySource};

#[derive(Debug, Clone)]
pub struct AppState {
    pub atlas: Atlas,
}

impl AppState {
    pub fn new(atlas: Atlas) -> Self {
        Self { atlas }
    }

    /// State over an in-memory backend with nothing loaded yet. Every query
    /// answers empty and readiness fails until a catalog is installed.
    pub fn unloaded() -> (Self, MemorySource) {
        let source = MemorySource::empty();
        (Self::new(Atlas::from_source(source.clone())), source)
    }
}
