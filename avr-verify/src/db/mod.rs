//! Database access for avr-verify

pub mod session;

pub use session::SqliteSessionStore;

use avr_common::config::SessionConfig;
use avr_common::Result;
use std::path::Path;

/// Open the session database and build a store for the configured profile
pub async fn open_session_store(db_path: &Path, config: &SessionConfig) -> Result<SqliteSessionStore> {
    let pool = avr_common::db::init_database(db_path).await?;

    tracing::debug!(profile = %config.profile, "Session store ready");

    Ok(SqliteSessionStore::new(pool, config.profile.clone())
        .with_max_lock_wait_ms(config.max_lock_wait_ms))
}
