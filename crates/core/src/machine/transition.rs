use chrono::{DateTime, Utc};
use rand::Rng;

use super::action::{Action, FeedbackView, PauseView, QuestionView, SummaryView};
use super::event::Event;
use crate::error::QuizError;
use crate::model::{
    CompletionReason, LanguageMode, OptionIndex, Question, QuestionBank, QuestionNumber,
    QuizMode, QuizRules, Session, SessionPhase,
};
use crate::scoring::{compute_pass, evaluate, should_fail_fast};
use crate::selector::{build_exam_order, learning_order, select_next};

//
// ─── TRANSITION RESULT ─────────────────────────────────────────────────────────
//

/// Answer recorded by a `submit_answer` transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerRecord {
    pub question_number: QuestionNumber,
    pub position: usize,
    pub selected: OptionIndex,
    pub correct: OptionIndex,
    pub is_correct: bool,
    /// False when the position had already been scored.
    pub counted: bool,
    /// Milliseconds between rendering the question and the answer.
    pub latency_ms: Option<i64>,
}

/// New session state plus the render requests it produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub session: Session,
    pub actions: Vec<Action>,
    pub answer: Option<AnswerRecord>,
}

//
// ─── ENGINE ────────────────────────────────────────────────────────────────────
//

/// Pure transition function over a fixed question bank and rule set.
///
/// `apply` never mutates its input: the updated session is returned inside
/// `Transition`, and on error the caller keeps the session it passed in.
#[derive(Debug, Clone, Copy)]
pub struct QuizEngine<'a> {
    bank: &'a QuestionBank,
    rules: QuizRules,
}

fn invalid(session: &Session, event: &Event) -> QuizError {
    QuizError::InvalidTransition {
        phase: session.phase,
        event: event.name(),
    }
}

impl<'a> QuizEngine<'a> {
    #[must_use]
    pub fn new(bank: &'a QuestionBank, rules: QuizRules) -> Self {
        Self { bank, rules }
    }

    #[must_use]
    pub fn bank(&self) -> &'a QuestionBank {
        self.bank
    }

    #[must_use]
    pub fn rules(&self) -> QuizRules {
        self.rules
    }

    /// Apply one event to `session`.
    ///
    /// `now` stamps question rendering and answer latency; `rng` is only drawn
    /// from when an exam starts.
    ///
    /// # Errors
    ///
    /// - `QuizError::InvalidTransition` for events that do not fit the current
    ///   phase, duplicates and stale replays (callers treat it as a no-op)
    /// - `QuizError::InsufficientQuestions` when an exam cannot be sampled
    /// - `QuizError::ModeNotAllowed` for jumps outside learning mode
    /// - `QuizError::OptionOutOfRange` / `QuizError::QuestionOutOfRange` for bad input
    pub fn apply<R: Rng + ?Sized>(
        &self,
        session: &Session,
        event: Event,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Result<Transition, QuizError> {
        if session.paused && !matches!(event, Event::Resume | Event::Restart) {
            return Err(invalid(session, &event));
        }

        let transition = match event {
            Event::ChooseLanguage(mode) => self.choose_language(session, mode, &event),
            Event::ChooseQuizMode(mode) => self.choose_quiz_mode(session, mode, now, rng, &event),
            Event::SubmitAnswer { option, question } => {
                self.submit_answer(session, option, question, now, &event)
            }
            Event::Advance => self.advance(session, now, &event),
            Event::JumpTo(number) => self.jump_to(session, number, now, &event),
            Event::Pause => self.pause(session, &event),
            Event::Resume => self.resume(session, now, &event),
            Event::Restart => Ok(Self::restart()),
        }?;

        debug_assert!(invariants_hold(&transition.session));
        Ok(transition)
    }

    fn choose_language(
        &self,
        session: &Session,
        mode: LanguageMode,
        event: &Event,
    ) -> Result<Transition, QuizError> {
        if session.phase != SessionPhase::AwaitingLanguage {
            return Err(invalid(session, event));
        }
        let mut next = session.clone();
        next.language_mode = mode;
        next.cursor = 0;
        next.score = 0;
        next.wrong_count = 0;
        next.phase = SessionPhase::AwaitingMode;

        Ok(Transition {
            session: next,
            actions: vec![Action::PromptMode {
                language_mode: mode,
            }],
            answer: None,
        })
    }

    fn choose_quiz_mode<R: Rng + ?Sized>(
        &self,
        session: &Session,
        mode: QuizMode,
        now: DateTime<Utc>,
        rng: &mut R,
        event: &Event,
    ) -> Result<Transition, QuizError> {
        if session.phase != SessionPhase::AwaitingMode {
            return Err(invalid(session, event));
        }
        let order = match mode {
            QuizMode::Learning => learning_order(self.bank.len()),
            QuizMode::Exam => {
                let exam_size = usize::try_from(self.rules.exam_size()).unwrap_or(usize::MAX);
                build_exam_order(self.bank.len(), exam_size, rng)?
            }
        };

        let mut next = session.clone();
        next.quiz_mode = Some(mode);
        next.question_order = order;
        next.used_questions.clear();
        next.answered_positions.clear();
        next.cursor = 0;
        next.score = 0;
        next.wrong_count = 0;
        next.paused = false;
        next.resume_cursor = None;
        next.completion = None;
        next.started_at = Some(now);

        let mut actions = Vec::with_capacity(1);
        self.present_from(&mut next, 0, now, &mut actions);
        Ok(Transition {
            session: next,
            actions,
            answer: None,
        })
    }

    fn submit_answer(
        &self,
        session: &Session,
        option: usize,
        question_ref: Option<QuestionNumber>,
        now: DateTime<Utc>,
        event: &Event,
    ) -> Result<Transition, QuizError> {
        if session.phase != SessionPhase::InQuestion {
            return Err(invalid(session, event));
        }
        let (Some(mode), Some(question)) = (session.quiz_mode, self.current_question(session))
        else {
            return Err(invalid(session, event));
        };
        if question_ref.is_some_and(|number| number != question.number()) {
            return Err(invalid(session, event));
        }
        let selected = OptionIndex::new(option).ok_or(QuizError::OptionOutOfRange(option))?;
        let evaluation = evaluate(question, selected);

        let position = session.cursor;
        let counted = !session.is_answered(position);
        let mut next = session.clone();
        if counted {
            next.answered_positions.insert(position);
            if evaluation.is_correct {
                next.score += 1;
            } else {
                next.wrong_count += 1;
            }
        }
        let answer = AnswerRecord {
            question_number: question.number(),
            position,
            selected,
            correct: evaluation.correct,
            is_correct: evaluation.is_correct,
            counted,
            latency_ms: session
                .presented_at
                .map(|at| (now - at).num_milliseconds().max(0)),
        };

        let mut actions = Vec::with_capacity(1);
        if counted && should_fail_fast(mode, next.wrong_count, self.rules.fail_threshold()) {
            self.complete(&mut next, CompletionReason::FailedFast, &mut actions);
        } else {
            let bilingual = next.language_mode.is_bilingual();
            let explanation = if mode == QuizMode::Learning && evaluation.is_correct {
                question.explanation().map(|e| e.for_display(bilingual))
            } else {
                None
            };
            next.phase = SessionPhase::AwaitingContinue;
            actions.push(Action::RenderFeedback(FeedbackView {
                number: question.number(),
                prompt: question.prompt().for_display(bilingual),
                options: question
                    .options()
                    .iter()
                    .map(|o| o.for_display(bilingual))
                    .collect(),
                marks: evaluation.marks(),
                selected,
                is_correct: evaluation.is_correct,
                counted,
                explanation,
                position: position + 1,
                total: next.total(),
                score: next.score,
                wrong_count: next.wrong_count,
            }));
        }

        Ok(Transition {
            session: next,
            actions,
            answer: Some(answer),
        })
    }

    fn advance(
        &self,
        session: &Session,
        now: DateTime<Utc>,
        event: &Event,
    ) -> Result<Transition, QuizError> {
        if session.phase != SessionPhase::AwaitingContinue {
            return Err(invalid(session, event));
        }
        let mut next = session.clone();
        let mut actions = Vec::with_capacity(1);
        self.present_from(&mut next, session.cursor + 1, now, &mut actions);
        Ok(Transition {
            session: next,
            actions,
            answer: None,
        })
    }

    fn jump_to(
        &self,
        session: &Session,
        number: u32,
        now: DateTime<Utc>,
        event: &Event,
    ) -> Result<Transition, QuizError> {
        if !session.is_running() {
            return Err(invalid(session, event));
        }
        if session.quiz_mode != Some(QuizMode::Learning) {
            return Err(QuizError::ModeNotAllowed {
                mode: session.quiz_mode,
            });
        }
        let out_of_range = QuizError::QuestionOutOfRange {
            number,
            bank_size: self.bank.len(),
        };
        // `number` is a 1-based position in the learning order, not a question number.
        let position = usize::try_from(number)
            .ok()
            .filter(|n| (1..=self.bank.len()).contains(n))
            .map(|n| n - 1)
            .filter(|&p| p < session.question_order.len())
            .ok_or(out_of_range)?;

        let mut next = session.clone();
        let mut actions = Vec::with_capacity(1);
        self.present_at(&mut next, position, now, &mut actions);
        Ok(Transition {
            session: next,
            actions,
            answer: None,
        })
    }

    fn pause(&self, session: &Session, event: &Event) -> Result<Transition, QuizError> {
        if !session.is_running() {
            return Err(invalid(session, event));
        }
        let mut next = session.clone();
        next.paused = true;
        next.resume_cursor = Some(session.cursor);

        Ok(Transition {
            actions: vec![Action::Paused(PauseView {
                position: next.cursor + 1,
                total: next.total(),
                answered: next.answered_count(),
            })],
            session: next,
            answer: None,
        })
    }

    fn resume(
        &self,
        session: &Session,
        now: DateTime<Utc>,
        event: &Event,
    ) -> Result<Transition, QuizError> {
        if !session.paused {
            return Err(invalid(session, event));
        }
        let mut next = session.clone();
        next.paused = false;
        let cursor = next.resume_cursor.take().unwrap_or(session.cursor);

        let mut actions = Vec::with_capacity(1);
        self.present_at(&mut next, cursor, now, &mut actions);
        Ok(Transition {
            session: next,
            actions,
            answer: None,
        })
    }

    fn restart() -> Transition {
        Transition {
            session: Session::default(),
            actions: vec![Action::PromptLanguage],
            answer: None,
        }
    }

    //
    // ─── PRESENTATION HELPERS ──────────────────────────────────────────────────
    //

    fn current_question(&self, session: &Session) -> Option<&'a Question> {
        session
            .current_question_index()
            .and_then(|index| self.bank.get(index))
    }

    /// Move to the next question at or after `from`, or complete the session.
    ///
    /// Exams skip questions that were already presented and wrap around before
    /// giving up; learning walks the order strictly.
    fn present_from(
        &self,
        next: &mut Session,
        from: usize,
        now: DateTime<Utc>,
        actions: &mut Vec<Action>,
    ) {
        next.cursor = from.min(next.total());
        match next.quiz_mode {
            Some(QuizMode::Exam) => {
                match select_next(&next.question_order, &next.used_questions, from) {
                    Some(selection) => self.present_at(next, selection.position, now, actions),
                    None => {
                        let reason = if next.answered_count() >= next.total() {
                            CompletionReason::Finished
                        } else {
                            CompletionReason::Exhausted
                        };
                        self.complete(next, reason, actions);
                    }
                }
            }
            _ if from < next.total() => self.present_at(next, from, now, actions),
            _ => self.complete(next, CompletionReason::Finished, actions),
        }
    }

    /// Render the question at `position` and enter `InQuestion`.
    fn present_at(
        &self,
        next: &mut Session,
        position: usize,
        now: DateTime<Utc>,
        actions: &mut Vec<Action>,
    ) {
        let Some(index) = next.question_order.get(position).copied() else {
            next.cursor = next.total();
            self.complete(next, CompletionReason::Exhausted, actions);
            return;
        };
        let Some(question) = self.bank.get(index) else {
            next.cursor = position;
            self.complete(next, CompletionReason::Exhausted, actions);
            return;
        };

        next.cursor = position;
        next.phase = SessionPhase::InQuestion;
        next.presented_at = Some(now);
        if next.quiz_mode == Some(QuizMode::Exam) {
            next.used_questions.insert(index);
        }

        let bilingual = next.language_mode.is_bilingual();
        actions.push(Action::RenderQuestion(QuestionView {
            number: question.number(),
            prompt: question.prompt().for_display(bilingual),
            options: question
                .options()
                .iter()
                .map(|o| o.for_display(bilingual))
                .collect(),
            position: position + 1,
            total: next.total(),
            mode: next.quiz_mode.unwrap_or(QuizMode::Learning),
        }));
    }

    fn complete(&self, next: &mut Session, reason: CompletionReason, actions: &mut Vec<Action>) {
        let mode = next.quiz_mode.unwrap_or(QuizMode::Learning);
        next.phase = SessionPhase::Complete;
        next.completion = Some(reason);
        next.presented_at = None;
        next.paused = false;
        next.resume_cursor = None;

        let passed = match (mode, reason) {
            (QuizMode::Learning, _) => None,
            (QuizMode::Exam, CompletionReason::FailedFast) => Some(false),
            (QuizMode::Exam, _) => Some(compute_pass(
                mode,
                next.score,
                self.rules.pass_threshold(),
            )),
        };
        actions.push(Action::RenderSummary(SummaryView {
            mode,
            score: next.score,
            wrong_count: next.wrong_count,
            total: next.total(),
            passed,
            reason,
        }));
    }
}

/// Structural invariants every transition must preserve.
fn invariants_hold(session: &Session) -> bool {
    let recorded = u64::from(session.score) + u64::from(session.wrong_count);
    let answered = u64::try_from(session.answered_positions.len()).unwrap_or(u64::MAX);
    let exam_ok = session.quiz_mode != Some(QuizMode::Exam)
        || session.used_questions.len() <= session.question_order.len();
    recorded == answered && session.cursor <= session.question_order.len() && exam_ok
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::model::QuestionDraft;
    use crate::scoring::OptionMark;
    use crate::time::fixed_now;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    // Question n has its correct answer at (n % 4).
    fn bank(size: u32) -> QuestionBank {
        let questions = (1..=size)
            .map(|n| {
                QuestionDraft {
                    number: n,
                    prompt: format!("Q{n}"),
                    prompt_secondary: Some(format!("П{n}")),
                    options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
                    options_secondary: Some(vec!["а".into(), "б".into(), "в".into(), "г".into()]),
                    correct_option: (n % 4) as usize,
                    explanation: Some(format!("E{n}")),
                    explanation_secondary: Some(format!("Пояснення {n}")),
                }
                .validate()
                .unwrap()
            })
            .collect();
        QuestionBank::new(questions).unwrap()
    }

    fn rules() -> QuizRules {
        QuizRules::new(30, 6, 25).unwrap()
    }

    struct Harness {
        bank: QuestionBank,
        rules: QuizRules,
        rng: StdRng,
        session: Session,
    }

    impl Harness {
        fn new(size: u32) -> Self {
            Self {
                bank: bank(size),
                rules: rules(),
                rng: StdRng::seed_from_u64(99),
                session: Session::new(),
            }
        }

        fn try_send(&mut self, event: Event) -> Result<Transition, QuizError> {
            let engine = QuizEngine::new(&self.bank, self.rules);
            let transition = engine.apply(&self.session, event, fixed_now(), &mut self.rng)?;
            self.session = transition.session.clone();
            Ok(transition)
        }

        fn send(&mut self, event: Event) -> Vec<Action> {
            self.try_send(event).unwrap().actions
        }

        fn start(&mut self, mode: QuizMode) -> Vec<Action> {
            self.send(Event::ChooseLanguage(LanguageMode::Primary));
            self.send(Event::ChooseQuizMode(mode))
        }

        fn correct_option(&self) -> usize {
            let index = self.session.current_question_index().unwrap();
            self.bank.get(index).unwrap().correct_option().value()
        }

        fn answer(&mut self, correct: bool) -> Vec<Action> {
            let right = self.correct_option();
            let option = if correct { right } else { (right + 1) % 4 };
            self.send(Event::SubmitAnswer {
                option,
                question: None,
            })
        }
    }

    #[test]
    fn language_choice_moves_to_mode_selection() {
        let mut h = Harness::new(5);
        let actions = h.send(Event::ChooseLanguage(LanguageMode::Bilingual));
        assert_eq!(
            actions,
            vec![Action::PromptMode {
                language_mode: LanguageMode::Bilingual
            }]
        );
        assert_eq!(h.session.phase(), SessionPhase::AwaitingMode);

        let err = h
            .try_send(Event::ChooseLanguage(LanguageMode::Primary))
            .unwrap_err();
        assert!(err.is_silent());
        assert_eq!(h.session.language_mode(), LanguageMode::Bilingual);
    }

    #[test]
    fn learning_mode_walks_bank_in_order() {
        let mut h = Harness::new(5);
        let actions = h.start(QuizMode::Learning);
        assert_eq!(h.session.question_order(), &[0, 1, 2, 3, 4]);
        let Action::RenderQuestion(view) = &actions[0] else {
            panic!("expected question render, got {actions:?}");
        };
        assert_eq!(view.number, QuestionNumber::new(1));
        assert_eq!(view.position, 1);
        assert_eq!(view.total, 5);
        assert!(view.prompt.secondary.is_none());
    }

    #[test]
    fn correct_learning_answer_then_advance() {
        let mut h = Harness::new(10);
        h.start(QuizMode::Learning);
        for correct in [true, false, true, false, true] {
            h.answer(correct);
            h.send(Event::Advance);
        }
        assert_eq!(h.session.cursor(), 5);
        assert_eq!(h.session.wrong_count(), 2);
        assert_eq!(h.session.score(), 3);

        let actions = h.answer(true);
        assert_eq!(h.session.score(), 4);
        assert_eq!(h.session.wrong_count(), 2);
        assert!(h.session.awaiting_next());
        let Action::RenderFeedback(feedback) = &actions[0] else {
            panic!("expected feedback, got {actions:?}");
        };
        assert!(feedback.is_correct);
        assert_eq!(feedback.explanation.as_ref().unwrap().primary, "E6");
        assert_eq!(feedback.marks[2], OptionMark::SelectedCorrect);

        h.send(Event::Advance);
        assert_eq!(h.session.cursor(), 6);
        assert_eq!(h.session.phase(), SessionPhase::InQuestion);
    }

    #[test]
    fn wrong_learning_answer_has_no_explanation() {
        let mut h = Harness::new(3);
        h.start(QuizMode::Learning);
        let actions = h.answer(false);
        let Action::RenderFeedback(feedback) = &actions[0] else {
            panic!("expected feedback");
        };
        assert!(!feedback.is_correct);
        assert!(feedback.explanation.is_none());
        assert_eq!(feedback.wrong_count, 1);
    }

    #[test]
    fn duplicate_submission_is_a_noop() {
        let mut h = Harness::new(4);
        h.start(QuizMode::Learning);
        h.answer(true);
        let after_first = h.session.clone();

        let option = h.correct_option();
        let err = h
            .try_send(Event::SubmitAnswer {
                option,
                question: None,
            })
            .unwrap_err();
        assert!(err.is_silent());
        assert_eq!(h.session, after_first);
    }

    #[test]
    fn stale_question_reference_is_rejected() {
        let mut h = Harness::new(4);
        h.start(QuizMode::Learning);
        h.answer(true);
        h.send(Event::Advance);

        let err = h
            .try_send(Event::SubmitAnswer {
                option: 0,
                question: Some(QuestionNumber::new(1)),
            })
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidTransition);
        assert_eq!(h.session.score(), 1);
        assert_eq!(h.session.phase(), SessionPhase::InQuestion);
    }

    #[test]
    fn option_out_of_range_leaves_session_untouched() {
        let mut h = Harness::new(4);
        h.start(QuizMode::Learning);
        let before = h.session.clone();
        let err = h
            .try_send(Event::SubmitAnswer {
                option: 4,
                question: None,
            })
            .unwrap_err();
        assert_eq!(err, QuizError::OptionOutOfRange(4));
        assert_eq!(h.session, before);
    }

    #[test]
    fn duplicate_advance_is_a_noop() {
        let mut h = Harness::new(4);
        h.start(QuizMode::Learning);
        h.answer(true);
        h.send(Event::Advance);
        let err = h.try_send(Event::Advance).unwrap_err();
        assert!(err.is_silent());
        assert_eq!(h.session.cursor(), 1);
    }

    #[test]
    fn learning_completes_after_last_question() {
        let mut h = Harness::new(2);
        h.start(QuizMode::Learning);
        h.answer(true);
        h.send(Event::Advance);
        h.answer(false);
        let actions = h.send(Event::Advance);
        assert_eq!(
            actions,
            vec![Action::RenderSummary(SummaryView {
                mode: QuizMode::Learning,
                score: 1,
                wrong_count: 1,
                total: 2,
                passed: None,
                reason: CompletionReason::Finished,
            })]
        );
        assert!(h.session.is_complete());
        assert_eq!(h.session.cursor(), 2);
    }

    #[test]
    fn exam_requires_enough_questions() {
        let mut h = Harness::new(20);
        h.send(Event::ChooseLanguage(LanguageMode::Primary));
        let err = h.try_send(Event::ChooseQuizMode(QuizMode::Exam)).unwrap_err();
        assert_eq!(
            err,
            QuizError::InsufficientQuestions {
                available: 20,
                required: 30
            }
        );
        assert_eq!(h.session.phase(), SessionPhase::AwaitingMode);
    }

    #[test]
    fn exam_samples_fixed_size_without_repeats() {
        let mut h = Harness::new(120);
        h.start(QuizMode::Exam);
        assert_eq!(h.session.question_order().len(), 30);
        assert_eq!(h.session.used_questions().len(), 1);

        for _ in 0..10 {
            h.answer(true);
            h.send(Event::Advance);
            assert!(h.session.used_questions().len() <= h.session.question_order().len());
        }
        assert_eq!(h.session.used_questions().len(), 11);
        let presented: Vec<_> = h.session.question_order()[..11].to_vec();
        assert!(presented.iter().all(|i| h.session.used_questions().contains(i)));
    }

    #[test]
    fn exam_fails_fast_on_threshold() {
        let mut h = Harness::new(40);
        h.start(QuizMode::Exam);
        for _ in 0..5 {
            h.answer(false);
            h.send(Event::Advance);
        }
        assert_eq!(h.session.wrong_count(), 5);

        let actions = h.answer(false);
        assert!(h.session.is_complete());
        assert_eq!(h.session.completion(), Some(CompletionReason::FailedFast));
        let Action::RenderSummary(summary) = actions[0] else {
            panic!("expected summary, got {actions:?}");
        };
        assert_eq!(summary.passed, Some(false));
        assert_eq!(summary.wrong_count, 6);
        assert_eq!(summary.reason, CompletionReason::FailedFast);
    }

    #[test]
    fn exam_without_feedback_explanations_and_pass_mark() {
        let bank = bank(30);
        let rules = QuizRules::new(4, 3, 3).unwrap();
        let engine = QuizEngine::new(&bank, rules);
        let mut rng = StdRng::seed_from_u64(5);
        let now = fixed_now();

        let mut session = engine
            .apply(&Session::new(), Event::ChooseLanguage(LanguageMode::Primary), now, &mut rng)
            .unwrap()
            .session;
        session = engine
            .apply(&session, Event::ChooseQuizMode(QuizMode::Exam), now, &mut rng)
            .unwrap()
            .session;

        let mut last = Vec::new();
        for step in 0..4 {
            let index = session.current_question_index().unwrap();
            let right = bank.get(index).unwrap().correct_option().value();
            let option = if step == 0 { (right + 1) % 4 } else { right };
            let t = engine
                .apply(&session, Event::SubmitAnswer { option, question: None }, now, &mut rng)
                .unwrap();
            if let Action::RenderFeedback(feedback) = &t.actions[0] {
                assert!(feedback.explanation.is_none());
            }
            let t = engine.apply(&t.session, Event::Advance, now, &mut rng).unwrap();
            session = t.session;
            last = t.actions;
        }

        assert_eq!(
            last,
            vec![Action::RenderSummary(SummaryView {
                mode: QuizMode::Exam,
                score: 3,
                wrong_count: 1,
                total: 4,
                passed: Some(true),
                reason: CompletionReason::Finished,
            })]
        );
    }

    #[test]
    fn jump_in_exam_is_not_allowed() {
        let mut h = Harness::new(40);
        h.start(QuizMode::Exam);
        let cursor = h.session.cursor();
        let err = h.try_send(Event::JumpTo(7)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ModeNotAllowed);
        assert_eq!(h.session.cursor(), cursor);
    }

    #[test]
    fn jump_in_learning_moves_cursor() {
        let mut h = Harness::new(12);
        h.start(QuizMode::Learning);
        let actions = h.send(Event::JumpTo(7));
        assert_eq!(h.session.cursor(), 6);
        let Action::RenderQuestion(view) = &actions[0] else {
            panic!("expected question render");
        };
        assert_eq!(view.number, QuestionNumber::new(7));

        let err = h.try_send(Event::JumpTo(13)).unwrap_err();
        assert_eq!(
            err,
            QuizError::QuestionOutOfRange {
                number: 13,
                bank_size: 12
            }
        );
        assert_eq!(h.try_send(Event::JumpTo(0)).unwrap_err().kind(), ErrorKind::OutOfRange);
        assert_eq!(h.session.cursor(), 6);
    }

    #[test]
    fn jump_targets_positions_when_numbers_start_elsewhere() {
        let questions = (10..20)
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
        let mut h = Harness::new(1);
        h.bank = QuestionBank::new(questions).unwrap();
        h.start(QuizMode::Learning);

        let actions = h.send(Event::JumpTo(5));
        assert_eq!(h.session.cursor(), 4);
        let Action::RenderQuestion(view) = &actions[0] else {
            panic!("expected question render");
        };
        assert_eq!(view.number, QuestionNumber::new(14));

        h.send(Event::JumpTo(10));
        assert_eq!(h.session.cursor(), 9);
        assert_eq!(
            h.try_send(Event::JumpTo(15)).unwrap_err(),
            QuizError::QuestionOutOfRange {
                number: 15,
                bank_size: 10
            }
        );
        assert_eq!(h.session.cursor(), 9);
    }

    #[test]
    fn revisited_question_is_not_scored_twice() {
        let mut h = Harness::new(5);
        h.start(QuizMode::Learning);
        h.answer(true);
        h.send(Event::Advance);
        h.send(Event::JumpTo(1));

        let actions = h.answer(false);
        let Action::RenderFeedback(feedback) = &actions[0] else {
            panic!("expected feedback");
        };
        assert!(!feedback.counted);
        assert_eq!(h.session.score(), 1);
        assert_eq!(h.session.wrong_count(), 0);
    }

    #[test]
    fn pause_and_resume_rerender_same_question() {
        let mut h = Harness::new(6);
        h.start(QuizMode::Learning);
        h.answer(true);
        h.send(Event::Advance);

        let actions = h.send(Event::Pause);
        assert_eq!(
            actions,
            vec![Action::Paused(PauseView {
                position: 2,
                total: 6,
                answered: 1
            })]
        );
        assert!(h.session.is_paused());
        assert_eq!(h.session.resume_cursor(), Some(1));

        assert!(h.try_send(Event::Advance).unwrap_err().is_silent());
        assert!(h.try_send(Event::Pause).unwrap_err().is_silent());

        let actions = h.send(Event::Resume);
        assert!(!h.session.is_paused());
        assert_eq!(h.session.cursor(), 1);
        assert_eq!(h.session.resume_cursor(), None);
        let Action::RenderQuestion(view) = &actions[0] else {
            panic!("expected question render");
        };
        assert_eq!(view.number, QuestionNumber::new(2));
        assert!(h.try_send(Event::Resume).unwrap_err().is_silent());
    }

    #[test]
    fn resume_in_exam_keeps_the_presented_question() {
        let mut h = Harness::new(40);
        h.start(QuizMode::Exam);
        let first = h.session.current_question_index();
        h.send(Event::Pause);
        h.send(Event::Resume);
        assert_eq!(h.session.current_question_index(), first);
        assert_eq!(h.session.used_questions().len(), 1);
    }

    #[test]
    fn restart_resets_everything() {
        let mut h = Harness::new(40);
        h.start(QuizMode::Exam);
        h.answer(false);
        h.send(Event::Pause);

        let actions = h.send(Event::Restart);
        assert_eq!(actions, vec![Action::PromptLanguage]);
        assert_eq!(h.session, Session::default());
        assert_eq!(h.session.phase(), SessionPhase::AwaitingLanguage);
        assert!(h.session.question_order().is_empty());
        assert!(h.session.used_questions().is_empty());
    }

    #[test]
    fn bilingual_session_carries_secondary_texts() {
        let mut h = Harness::new(3);
        h.send(Event::ChooseLanguage(LanguageMode::Bilingual));
        let actions = h.send(Event::ChooseQuizMode(QuizMode::Learning));
        let Action::RenderQuestion(view) = &actions[0] else {
            panic!("expected question render");
        };
        assert_eq!(view.prompt.secondary.as_deref(), Some("П1"));
        assert_eq!(view.options[3].secondary.as_deref(), Some("г"));
    }

    #[test]
    fn events_before_a_quiz_are_ignored() {
        let mut h = Harness::new(3);
        for event in [
            Event::Advance,
            Event::Pause,
            Event::Resume,
            Event::JumpTo(1),
            Event::SubmitAnswer {
                option: 0,
                question: None,
            },
        ] {
            let err = h.try_send(event).unwrap_err();
            assert!(err.is_silent(), "{event:?} produced {err:?}");
        }
        assert_eq!(h.session, Session::default());
    }

    #[test]
    fn answer_latency_uses_presentation_time() {
        let bank = bank(3);
        let engine = QuizEngine::new(&bank, rules());
        let mut rng = StdRng::seed_from_u64(1);
        let start = fixed_now();
        let session = engine
            .apply(&Session::new(), Event::ChooseLanguage(LanguageMode::Primary), start, &mut rng)
            .unwrap()
            .session;
        let session = engine
            .apply(&session, Event::ChooseQuizMode(QuizMode::Learning), start, &mut rng)
            .unwrap()
            .session;
        let later = start + chrono::Duration::milliseconds(1_500);
        let t = engine
            .apply(&session, Event::SubmitAnswer { option: 1, question: None }, later, &mut rng)
            .unwrap();
        let answer = t.answer.unwrap();
        assert_eq!(answer.latency_ms, Some(1_500));
        assert!(answer.is_correct);
        assert_eq!(answer.question_number, QuestionNumber::new(1));
    }
}
