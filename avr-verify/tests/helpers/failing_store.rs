//! SessionStore whose saves can be switched to fail
//!
//! Wraps a MemorySessionStore; while failing, `save` returns an error and
//! leaves the persisted state untouched. Clones share the switch.

use async_trait::async_trait;
use avr_common::{Error, Result};
use avr_verify::models::SessionState;
use avr_verify::{MemorySessionStore, SessionStore};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct FailingStore {
    inner: MemorySessionStore,
    failing: Arc<AtomicBool>,
}

impl FailingStore {
    pub fn new(inner: MemorySessionStore) -> Self {
        Self {
            inner,
            failing: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn inner(&self) -> &MemorySessionStore {
        &self.inner
    }
}

#[async_trait]
impl SessionStore for FailingStore {
    async fn load(&self) -> Result<SessionState> {
        self.inner.load().await
    }

    async fn save(&self, state: &SessionState) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::Internal("disk full".to_string()));
        }
        self.inner.save(state).await
    }
}
