use chrono::{DateTime, Utc};
use quiz_core::model::{Session, SessionId};
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{conn, ser};
use crate::repository::{SessionStore, StorageError};

#[async_trait::async_trait]
impl SessionStore for SqliteRepository {
    async fn load(&self, id: SessionId) -> Result<Option<Session>, StorageError> {
        let row = sqlx::query("SELECT state FROM quiz_sessions WHERE session_id = ?1")
            .bind(id.value())
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;

        let Some(row) = row else {
            return Ok(None);
        };
        let state: String = row.try_get("state").map_err(ser)?;
        serde_json::from_str(&state).map(Some).map_err(ser)
    }

    async fn save(
        &self,
        id: SessionId,
        session: &Session,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let state = serde_json::to_string(session).map_err(ser)?;
        sqlx::query(
            r"
                INSERT INTO quiz_sessions (session_id, state, updated_at)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(session_id) DO UPDATE SET
                    state = excluded.state,
                    updated_at = excluded.updated_at
            ",
        )
        .bind(id.value())
        .bind(state)
        .bind(updated_at)
        .execute(&self.pool)
        .await
        .map_err(conn)?;
        Ok(())
    }

    async fn remove(&self, id: SessionId) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM quiz_sessions WHERE session_id = ?1")
            .bind(id.value())
            .execute(&self.pool)
            .await
            .map_err(conn)?;
        Ok(())
    }
}
