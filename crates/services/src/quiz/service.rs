use std::sync::{Arc, Mutex};

use chrono::Duration;
use quiz_core::machine::{Action, Event, QuizEngine, Transition};
use quiz_core::model::{
    LanguageMode, QuestionBank, QuestionNumber, QuizMode, QuizRules, Session, SessionId,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use storage::repository::{QuizLogRepository, SessionStore};
use tracing::{debug, info};

use super::analytics;
use super::progress::SessionProgress;
use super::throttle::EventThrottle;
use crate::Clock;
use crate::error::QuizServiceError;

/// Runs quiz events for any number of sessions against one question bank.
///
/// Each call loads the session, applies the event through `QuizEngine`,
/// mirrors the result into the optional analytics log and writes the session
/// back. Completed sessions are removed from the store.
#[derive(Clone)]
pub struct QuizService {
    clock: Clock,
    bank: Arc<QuestionBank>,
    rules: QuizRules,
    sessions: Arc<dyn SessionStore>,
    quiz_log: Option<Arc<dyn QuizLogRepository>>,
    throttle: Option<Arc<EventThrottle>>,
    rng: Arc<Mutex<StdRng>>,
}

impl QuizService {
    #[must_use]
    pub fn new(
        clock: Clock,
        bank: Arc<QuestionBank>,
        rules: QuizRules,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            clock,
            bank,
            rules,
            sessions,
            quiz_log: None,
            throttle: None,
            rng: Arc::new(Mutex::new(StdRng::from_os_rng())),
        }
    }

    #[must_use]
    pub fn with_quiz_log(mut self, quiz_log: Arc<dyn QuizLogRepository>) -> Self {
        self.quiz_log = Some(quiz_log);
        self
    }

    /// Use a seeded generator so exam samples are reproducible.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Arc::new(Mutex::new(StdRng::seed_from_u64(seed)));
        self
    }

    /// Drop answers and continues that arrive within `min_interval` of the
    /// previous accepted one for the same session.
    #[must_use]
    pub fn with_throttle(mut self, min_interval: Duration) -> Self {
        self.throttle = Some(Arc::new(EventThrottle::new(min_interval)));
        self
    }

    #[must_use]
    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    #[must_use]
    pub fn rules(&self) -> QuizRules {
        self.rules
    }

    /// Apply one event and return the render requests for the transport.
    ///
    /// Duplicate, stale and throttled events yield an empty list. Rejected
    /// input yields a single `Action::RenderError` and leaves the stored
    /// session untouched.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Storage` if the session cannot be loaded or
    /// written, and `QuizServiceError::Poisoned` if shared state is poisoned.
    pub async fn dispatch(
        &self,
        id: SessionId,
        event: Event,
    ) -> Result<Vec<Action>, QuizServiceError> {
        let now = self.clock.now();

        if let Some(throttle) = &self.throttle {
            let debounced = matches!(event, Event::SubmitAnswer { .. } | Event::Advance);
            if debounced && !throttle.admit(id, now)? {
                debug!(session = %id, event = event.name(), "throttled event dropped");
                return Ok(Vec::new());
            }
        }

        let before = self.sessions.load(id).await?.unwrap_or_default();
        let outcome = {
            let mut rng = self
                .rng
                .lock()
                .map_err(|e| QuizServiceError::Poisoned(e.to_string()))?;
            QuizEngine::new(&self.bank, self.rules).apply(&before, event, now, &mut *rng)
        };

        let mut transition = match outcome {
            Ok(transition) => transition,
            Err(err) if err.is_silent() => {
                debug!(session = %id, event = event.name(), error = %err, "event ignored");
                return Ok(Vec::new());
            }
            Err(err) => {
                debug!(session = %id, event = event.name(), error = %err, "event rejected");
                return Ok(vec![Action::RenderError { kind: err.kind() }]);
            }
        };

        if let Some(log) = &self.quiz_log {
            analytics::record(log.as_ref(), id, &before, event, &mut transition, now).await;
        }
        self.log_lifecycle(id, &before, &transition);

        if let Some(throttle) = &self.throttle {
            if transition.session.is_complete() || matches!(event, Event::Restart) {
                throttle.forget(id)?;
            }
        }

        if transition.session.is_complete() {
            self.sessions.remove(id).await?;
        } else {
            self.sessions.save(id, &transition.session, now).await?;
        }
        Ok(transition.actions)
    }

    fn log_lifecycle(&self, id: SessionId, before: &Session, transition: &Transition) {
        let after = &transition.session;
        if let (Some(mode), None) = (after.quiz_mode(), before.quiz_mode()) {
            info!(
                session = %id,
                mode = mode.as_str(),
                language = after.language_mode().as_str(),
                total = after.total(),
                "quiz started"
            );
        }
        if after.is_complete() && !before.is_complete() {
            info!(
                session = %id,
                mode = after.quiz_mode().map_or("none", QuizMode::as_str),
                score = after.score(),
                wrong = after.wrong_count(),
                total = after.total(),
                reason = ?after.completion(),
                "quiz completed"
            );
        }
    }

    /// Current progress of a stored session, if any.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Storage` if the session cannot be loaded.
    pub async fn progress(&self, id: SessionId) -> Result<Option<SessionProgress>, QuizServiceError> {
        let session = self.sessions.load(id).await?;
        Ok(session.map(|s| SessionProgress::from_session(&s, &self.bank)))
    }

    //
    // ─── EVENT SHORTCUTS ───────────────────────────────────────────────────────
    //

    /// # Errors
    ///
    /// See [`QuizService::dispatch`].
    pub async fn choose_language(
        &self,
        id: SessionId,
        language: LanguageMode,
    ) -> Result<Vec<Action>, QuizServiceError> {
        self.dispatch(id, Event::ChooseLanguage(language)).await
    }

    /// # Errors
    ///
    /// See [`QuizService::dispatch`].
    pub async fn choose_quiz_mode(
        &self,
        id: SessionId,
        mode: QuizMode,
    ) -> Result<Vec<Action>, QuizServiceError> {
        self.dispatch(id, Event::ChooseQuizMode(mode)).await
    }

    /// `question` is the number shown when the options were rendered.
    ///
    /// # Errors
    ///
    /// See [`QuizService::dispatch`].
    pub async fn submit_answer(
        &self,
        id: SessionId,
        option: usize,
        question: Option<QuestionNumber>,
    ) -> Result<Vec<Action>, QuizServiceError> {
        self.dispatch(id, Event::SubmitAnswer { option, question })
            .await
    }

    /// # Errors
    ///
    /// See [`QuizService::dispatch`].
    pub async fn advance(&self, id: SessionId) -> Result<Vec<Action>, QuizServiceError> {
        self.dispatch(id, Event::Advance).await
    }

    /// # Errors
    ///
    /// See [`QuizService::dispatch`].
    pub async fn jump_to(&self, id: SessionId, number: u32) -> Result<Vec<Action>, QuizServiceError> {
        self.dispatch(id, Event::JumpTo(number)).await
    }

    /// # Errors
    ///
    /// See [`QuizService::dispatch`].
    pub async fn pause(&self, id: SessionId) -> Result<Vec<Action>, QuizServiceError> {
        self.dispatch(id, Event::Pause).await
    }

    /// # Errors
    ///
    /// See [`QuizService::dispatch`].
    pub async fn resume(&self, id: SessionId) -> Result<Vec<Action>, QuizServiceError> {
        self.dispatch(id, Event::Resume).await
    }

    /// # Errors
    ///
    /// See [`QuizService::dispatch`].
    pub async fn restart(&self, id: SessionId) -> Result<Vec<Action>, QuizServiceError> {
        self.dispatch(id, Event::Restart).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::QuestionDraft;
    use quiz_core::time::fixed_now;
    use storage::repository::InMemoryRepository;

    fn bank(size: u32) -> Arc<QuestionBank> {
        let questions = (1..=size)
            .map(|n| {
                QuestionDraft {
                    number: n,
                    prompt: format!("Q{n}"),
                    prompt_secondary: None,
                    options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
                    options_secondary: None,
                    correct_option: 0,
                    explanation: None,
                    explanation_secondary: None,
                }
                .validate()
                .unwrap()
            })
            .collect();
        Arc::new(QuestionBank::new(questions).unwrap())
    }

    fn service(size: u32) -> QuizService {
        QuizService::new(
            Clock::fixed(fixed_now()),
            bank(size),
            QuizRules::default(),
            Arc::new(InMemoryRepository::new()),
        )
        .with_seed(11)
    }

    #[tokio::test]
    async fn silent_errors_produce_no_actions() {
        let svc = service(3);
        let id = SessionId::new(1);
        assert!(svc.advance(id).await.unwrap().is_empty());
        assert!(svc.progress(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn insufficient_questions_is_rendered_and_state_kept() {
        let svc = service(5);
        let id = SessionId::new(2);
        svc.choose_language(id, LanguageMode::Primary).await.unwrap();
        let actions = svc.choose_quiz_mode(id, QuizMode::Exam).await.unwrap();
        assert_eq!(
            actions,
            vec![Action::RenderError {
                kind: quiz_core::ErrorKind::InsufficientQuestions
            }]
        );
        let progress = svc.progress(id).await.unwrap().unwrap();
        assert_eq!(progress.phase, quiz_core::model::SessionPhase::AwaitingMode);
    }

    #[tokio::test]
    async fn throttle_drops_fast_repeats() {
        let svc = service(3).with_throttle(Duration::seconds(1));
        let id = SessionId::new(3);
        svc.choose_language(id, LanguageMode::Primary).await.unwrap();
        svc.choose_quiz_mode(id, QuizMode::Learning).await.unwrap();
        assert_eq!(svc.submit_answer(id, 0, None).await.unwrap().len(), 1);
        // Same fixed instant: the continue is inside the interval.
        assert!(svc.advance(id).await.unwrap().is_empty());
        let progress = svc.progress(id).await.unwrap().unwrap();
        assert_eq!(progress.score, 1);
        assert_eq!(progress.position, 1);
    }

    #[tokio::test]
    async fn throttle_forgets_finished_and_restarted_sessions() {
        let clock = Clock::fixed(fixed_now());
        let svc = QuizService::new(
            clock,
            bank(1),
            QuizRules::default(),
            Arc::new(InMemoryRepository::new()),
        )
        .with_throttle(Duration::seconds(1));
        let throttle = svc.throttle.clone().unwrap();
        let done = SessionId::new(4);
        let restarted = SessionId::new(5);

        for id in [done, restarted] {
            svc.choose_language(id, LanguageMode::Primary).await.unwrap();
            svc.choose_quiz_mode(id, QuizMode::Learning).await.unwrap();
            svc.submit_answer(id, 0, None).await.unwrap();
        }
        assert_eq!(throttle.tracked(), 2);

        svc.restart(restarted).await.unwrap();
        assert_eq!(throttle.tracked(), 1);

        let later = QuizService {
            clock: Clock::fixed(fixed_now() + Duration::seconds(2)),
            ..svc.clone()
        };
        let actions = later.advance(done).await.unwrap();
        assert!(matches!(actions[0], Action::RenderSummary(_)));
        assert_eq!(throttle.tracked(), 0);
        assert!(later.progress(done).await.unwrap().is_none());
    }
}
