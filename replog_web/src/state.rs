//! Shared handler state.

use crate::views::{HtmlRenderer, Renderer};
use replog_core::{EntryStore, Error, Result, SharedStore};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Everything a request handler needs; cheap to clone
#[derive(Clone)]
pub struct AppState {
    store: SharedStore,
    renderer: Arc<dyn Renderer>,
    static_dir: PathBuf,
}

impl AppState {
    /// State using the built-in HTML renderer
    pub fn new(store: SharedStore, static_dir: impl Into<PathBuf>) -> Self {
        Self::with_renderer(store, Arc::new(HtmlRenderer), static_dir)
    }

    pub fn with_renderer(
        store: SharedStore,
        renderer: Arc<dyn Renderer>,
        static_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            store,
            renderer,
            static_dir: static_dir.into(),
        }
    }

    pub fn renderer(&self) -> &dyn Renderer {
        self.renderer.as_ref()
    }

    pub fn static_dir(&self) -> &Path {
        &self.static_dir
    }

    /// Run one store operation on the blocking pool
    pub async fn with_store<T, F>(&self, op: F) -> Result<T>
    where
        F: FnOnce(&dyn EntryStore) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || op(store.as_ref()))
            .await
            .map_err(|e| Error::Store(format!("store task failed: {}", e)))?
    }
}
