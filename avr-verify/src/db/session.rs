//! SQLite-backed session store
//!
//! One row per persisted key in `review_session`, scoped by profile. Values
//! are JSON text so booleans, integers and id arrays share one column.

use crate::models::{keys, SessionState};
use crate::session_store::SessionStore;
use crate::utils::retry_on_lock;
use async_trait::async_trait;
use avr_common::Result;
use serde::de::DeserializeOwned;
use sqlx::SqlitePool;
use std::collections::HashMap;
use tracing::warn;

/// Default retry budget when the caller does not configure one
const DEFAULT_MAX_LOCK_WAIT_MS: u64 = 5000;

/// Session store persisting to the `review_session` table
#[derive(Debug, Clone)]
pub struct SqliteSessionStore {
    pool: SqlitePool,
    profile: String,
    max_lock_wait_ms: u64,
}

impl SqliteSessionStore {
    pub fn new(pool: SqlitePool, profile: impl Into<String>) -> Self {
        Self {
            pool,
            profile: profile.into(),
            max_lock_wait_ms: DEFAULT_MAX_LOCK_WAIT_MS,
        }
    }

    pub fn with_max_lock_wait_ms(mut self, max_lock_wait_ms: u64) -> Self {
        self.max_lock_wait_ms = max_lock_wait_ms;
        self
    }

    pub fn profile(&self) -> &str {
        &self.profile
    }
}

#[async_trait]
impl SessionStore for SqliteSessionStore {
    async fn load(&self) -> Result<SessionState> {
        let rows: Vec<(String, String)> =
            sqlx::query_as("SELECT key, value FROM review_session WHERE profile = ?")
                .bind(&self.profile)
                .fetch_all(&self.pool)
                .await?;

        let values: HashMap<String, String> = rows.into_iter().collect();
        let zero = SessionState::default();

        Ok(SessionState {
            selection_mounted: read(&values, keys::SELECTION_MOUNTED, zero.selection_mounted),
            selected_annotation_collections: read(
                &values,
                keys::SELECTED_ANNOTATION_COLLECTIONS,
                zero.selected_annotation_collections,
            ),
            selected_tracking_first: read(
                &values,
                keys::SELECTED_TRACKING_FIRST,
                zero.selected_tracking_first,
            ),
            exclude_tracking: read(&values, keys::EXCLUDE_TRACKING, zero.exclude_tracking),
            ignored_annotations: read(&values, keys::IGNORED_ANNOTATIONS, zero.ignored_annotations),
            cur_index: read(&values, keys::CUR_INDEX, zero.cur_index),
            total_annotations: read(&values, keys::TOTAL_ANNOTATIONS, zero.total_annotations),
            no_annotations: read(&values, keys::NO_ANNOTATIONS, zero.no_annotations),
        })
    }

    async fn save(&self, state: &SessionState) -> Result<()> {
        // Serialize everything before touching the database
        let rows = vec![
            (keys::SELECTION_MOUNTED, serde_json::to_string(&state.selection_mounted)?),
            (
                keys::SELECTED_ANNOTATION_COLLECTIONS,
                serde_json::to_string(&state.selected_annotation_collections)?,
            ),
            (
                keys::SELECTED_TRACKING_FIRST,
                serde_json::to_string(&state.selected_tracking_first)?,
            ),
            (keys::EXCLUDE_TRACKING, serde_json::to_string(&state.exclude_tracking)?),
            (
                keys::IGNORED_ANNOTATIONS,
                serde_json::to_string(&state.ignored_annotations)?,
            ),
            (keys::CUR_INDEX, serde_json::to_string(&state.cur_index)?),
            (keys::TOTAL_ANNOTATIONS, serde_json::to_string(&state.total_annotations)?),
            (keys::NO_ANNOTATIONS, serde_json::to_string(&state.no_annotations)?),
        ];

        retry_on_lock("save_review_session", self.max_lock_wait_ms, || {
            let pool = self.pool.clone();
            let profile = self.profile.clone();
            let rows = rows.clone();
            async move { write_rows(&pool, &profile, &rows).await }
        })
        .await
    }
}

/// Upsert all rows in one transaction
async fn write_rows(pool: &SqlitePool, profile: &str, rows: &[(&str, String)]) -> Result<()> {
    let mut tx = pool.begin().await?;

    for (key, value) in rows {
        sqlx::query(
            r#"
            INSERT INTO review_session (profile, key, value, updated_at)
            VALUES (?, ?, ?, CURRENT_TIMESTAMP)
            ON CONFLICT(profile, key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(profile)
        .bind(*key)
        .bind(value)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}

/// Parse one persisted value; missing or malformed values fall back to `default`
fn read<T: DeserializeOwned>(values: &HashMap<String, String>, key: &str, default: T) -> T {
    match values.get(key) {
        None => default,
        Some(raw) => match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, value = %raw, error = %e, "Malformed persisted value, using zero value");
                default
            }
        },
    }
}
