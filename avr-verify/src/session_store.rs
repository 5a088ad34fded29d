//! Session Store seam
//!
//! The navigator never touches storage directly: it loads the whole
//! `SessionState` once and saves the whole state after every mutation.
//! `SqliteSessionStore` (see `db::session`) is the durable backend;
//! `MemorySessionStore` backs tests and embedders that manage persistence
//! themselves.

use crate::models::SessionState;
use async_trait::async_trait;
use avr_common::Result;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Durable key/value persistence of navigator state
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load persisted state; missing keys come back as their zero values
    async fn load(&self) -> Result<SessionState>;

    /// Persist every key of `state`
    async fn save(&self, state: &SessionState) -> Result<()>;
}

#[async_trait]
impl<S: SessionStore + ?Sized> SessionStore for Arc<S> {
    async fn load(&self) -> Result<SessionState> {
        (**self).load().await
    }

    async fn save(&self, state: &SessionState) -> Result<()> {
        (**self).save(state).await
    }
}

/// In-process session store
///
/// Clones share the same underlying state.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    state: Arc<Mutex<SessionState>>,
    saves: Arc<AtomicUsize>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with `state`, as if a previous run had saved it
    pub fn with_state(state: SessionState) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
            saves: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Snapshot of what is currently persisted
    pub async fn snapshot(&self) -> SessionState {
        self.state.lock().await.clone()
    }

    /// Number of successful saves so far
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self) -> Result<SessionState> {
        Ok(self.state.lock().await.clone())
    }

    async fn save(&self, state: &SessionState) -> Result<()> {
        *self.state.lock().await = state.clone();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
