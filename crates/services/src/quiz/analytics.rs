use chrono::{DateTime, Utc};
use quiz_core::machine::{Event, Transition};
use quiz_core::model::{CompletionReason, Session, SessionId};
use storage::repository::{AnswerLogRecord, QuizLogRepository, RunStatus, StorageError};
use tracing::warn;

/// Mirror one applied transition into the analytics log.
///
/// Sink failures are logged and swallowed; a new run id is stored on the
/// transition's session.
pub(crate) async fn record(
    log: &dyn QuizLogRepository,
    id: SessionId,
    before: &Session,
    event: Event,
    transition: &mut Transition,
    now: DateTime<Utc>,
) {
    if let Err(err) = apply(log, id, before, event, transition, now).await {
        warn!(session = %id, event = event.name(), error = %err, "analytics sink failed");
    }
}

async fn apply(
    log: &dyn QuizLogRepository,
    id: SessionId,
    before: &Session,
    event: Event,
    transition: &mut Transition,
    now: DateTime<Utc>,
) -> Result<(), StorageError> {
    match event {
        Event::ChooseLanguage(language) => {
            log.ensure_user(id, language, now).await?;
        }
        Event::ChooseQuizMode(mode) => {
            let total = u32::try_from(transition.session.total()).unwrap_or(u32::MAX);
            let started = transition.session.started_at().unwrap_or(now);
            let run = log.start_run(id, mode, total, started).await?;
            transition.session.set_run_id(Some(run));
        }
        Event::Restart => {
            if let Some(run) = before.run_id() {
                if !before.is_complete() {
                    log.finish_run(run, RunStatus::Abandoned, now).await?;
                }
            }
            return Ok(());
        }
        _ => {}
    }

    let Some(run) = transition.session.run_id() else {
        return Ok(());
    };

    if let Some(answer) = transition.answer.filter(|a| a.counted) {
        log.log_answer(&AnswerLogRecord {
            run_id: run,
            question_number: answer.question_number,
            selected: answer.selected,
            correct: answer.correct,
            is_correct: answer.is_correct,
            answered_at: now,
            latency_ms: answer.latency_ms,
        })
        .await?;
    }

    if transition.session.is_complete() && !before.is_complete() {
        let status = match transition.session.completion() {
            Some(CompletionReason::FailedFast) => RunStatus::Failed,
            _ => RunStatus::Completed,
        };
        log.finish_run(run, status, now).await?;
    }
    Ok(())
}
