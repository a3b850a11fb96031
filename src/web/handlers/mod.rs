//! API handlers for the Web API.

pub mod file;

pub use file::*;

use crate::store::SharedObjectStore;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Backing object store.
    pub store: SharedObjectStore,
}

impl AppState {
    /// Create a new application state.
    pub fn new(store: SharedObjectStore) -> Self {
        Self { store }
    }
}
