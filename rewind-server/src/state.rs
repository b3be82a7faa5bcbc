use std::sync::Arc;

use rewind_core::{
    InMemoryVideoCatalog, InMemoryWatchRecordStore, ProgressReducer, VideoCatalog,
    WatchRecordStore,
};

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub reducer: Arc<ProgressReducer>,
    pub catalog: Arc<dyn VideoCatalog>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}

impl AppState {
    pub fn new(store: Arc<dyn WatchRecordStore>, catalog: Arc<dyn VideoCatalog>) -> Self {
        let reducer = Arc::new(ProgressReducer::new(store, Arc::clone(&catalog)));
        Self { reducer, catalog }
    }

    /// State backed entirely by in-memory storage.
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryWatchRecordStore::new()),
            Arc::new(InMemoryVideoCatalog::new()),
        )
    }
}
