use chrono::{DateTime, Utc};
use quiz_core::model::{LanguageMode, QuizMode, SessionId};

use super::SqliteRepository;
use super::mapping::{conn, map_answer_row, map_run_row, option_to_i64, quiz_mode_to_str};
use crate::repository::{AnswerLogRecord, QuizLogRepository, RunRecord, RunStatus, StorageError};

#[async_trait::async_trait]
impl QuizLogRepository for SqliteRepository {
    async fn ensure_user(
        &self,
        session_id: SessionId,
        language: LanguageMode,
        at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        sqlx::query(
            r"
                INSERT INTO users (session_id, lang_mode, created_at)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(session_id) DO UPDATE SET lang_mode = excluded.lang_mode
            ",
        )
        .bind(session_id.value())
        .bind(language.as_str())
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(conn)?;
        Ok(())
    }

    async fn start_run(
        &self,
        session_id: SessionId,
        mode: QuizMode,
        total: u32,
        started_at: DateTime<Utc>,
    ) -> Result<i64, StorageError> {
        let res = sqlx::query(
            r"
                INSERT INTO quiz_runs (user_id, mode, total, status, started_at)
                SELECT id, ?2, ?3, ?4, ?5 FROM users WHERE session_id = ?1
            ",
        )
        .bind(session_id.value())
        .bind(quiz_mode_to_str(mode))
        .bind(i64::from(total))
        .bind(RunStatus::InProgress.as_str())
        .bind(started_at)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(res.last_insert_rowid())
    }

    async fn log_answer(&self, answer: &AnswerLogRecord) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await.map_err(conn)?;

        let bumped = sqlx::query(
            r"
                UPDATE quiz_runs
                SET score = score + ?2, wrong = wrong + ?3
                WHERE id = ?1
            ",
        )
        .bind(answer.run_id)
        .bind(i64::from(answer.is_correct))
        .bind(i64::from(!answer.is_correct))
        .execute(&mut *tx)
        .await
        .map_err(conn)?;
        if bumped.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        sqlx::query(
            r"
                INSERT INTO answers (
                    run_id, question_number, selected, correct,
                    is_correct, answered_at, latency_ms
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ",
        )
        .bind(answer.run_id)
        .bind(i64::from(answer.question_number.value()))
        .bind(option_to_i64(answer.selected))
        .bind(option_to_i64(answer.correct))
        .bind(answer.is_correct)
        .bind(answer.answered_at)
        .bind(answer.latency_ms)
        .execute(&mut *tx)
        .await
        .map_err(conn)?;

        tx.commit().await.map_err(conn)?;
        Ok(())
    }

    async fn finish_run(
        &self,
        run_id: i64,
        status: RunStatus,
        finished_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let res = sqlx::query("UPDATE quiz_runs SET status = ?2, finished_at = ?3 WHERE id = ?1")
            .bind(run_id)
            .bind(status.as_str())
            .bind(finished_at)
            .execute(&self.pool)
            .await
            .map_err(conn)?;
        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn get_run(&self, run_id: i64) -> Result<RunRecord, StorageError> {
        let row = sqlx::query(
            r"
                SELECT
                    r.id, u.session_id, r.mode, r.total, r.score, r.wrong,
                    r.status, r.started_at, r.finished_at
                FROM quiz_runs r
                JOIN users u ON u.id = r.user_id
                WHERE r.id = ?1
            ",
        )
        .bind(run_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?
        .ok_or(StorageError::NotFound)?;

        map_run_row(&row)
    }

    async fn answers_for_run(&self, run_id: i64) -> Result<Vec<AnswerLogRecord>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT
                    run_id, question_number, selected, correct,
                    is_correct, answered_at, latency_ms
                FROM answers
                WHERE run_id = ?1
                ORDER BY id ASC
            ",
        )
        .bind(run_id)
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_answer_row(&row)?);
        }
        Ok(out)
    }
}
