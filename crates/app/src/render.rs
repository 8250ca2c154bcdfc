use std::fmt::Write as _;

use quiz_core::ErrorKind;
use quiz_core::machine::{Action, FeedbackView, QuestionView, SummaryView};
use quiz_core::model::{CompletionReason, LocalizedText, OPTION_LABELS, QuizMode, QuizRules};
use quiz_core::scoring::OptionMark;
use services::SessionProgress;

fn push_text(out: &mut String, indent: &str, text: &LocalizedText) {
    let _ = writeln!(out, "{indent}{}", text.primary);
    if let Some(secondary) = &text.secondary {
        let _ = writeln!(out, "{indent}{secondary}");
    }
}

fn option_line(label: char, text: &LocalizedText) -> String {
    match &text.secondary {
        Some(secondary) => format!("{label}. {} / {secondary}", text.primary),
        None => format!("{label}. {}", text.primary),
    }
}

fn mark_symbol(mark: OptionMark) -> &'static str {
    match mark {
        OptionMark::SelectedCorrect => "✅",
        OptionMark::SelectedWrong => "❌",
        OptionMark::Correct => "✔️",
        OptionMark::Neutral => "  ",
    }
}

/// Plain-text rendering of one action.
#[must_use]
pub fn render(action: &Action, rules: QuizRules) -> String {
    match action {
        Action::PromptLanguage => {
            "Choose a language: `lang en` (English) or `lang bi` (English + Ukrainian)\n".into()
        }
        Action::PromptMode { .. } => format!(
            "Choose a mode:\n  `mode learning`  every question in order, with explanations\n  \
             `mode exam`      {} random questions, {} mistakes end the exam, {} to pass\n",
            rules.exam_size(),
            rules.fail_threshold(),
            rules.pass_threshold()
        ),
        Action::RenderQuestion(view) => render_question(view),
        Action::RenderFeedback(view) => render_feedback(view),
        Action::RenderSummary(view) => render_summary(view),
        Action::Paused(view) => format!(
            "⏸ Paused at question {}/{} ({} answered). Type `resume` to continue.\n",
            view.position, view.total, view.answered
        ),
        Action::RenderError { kind } => render_error(*kind, rules),
    }
}

fn render_question(view: &QuestionView) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "\nQuestion {}/{} (#{}, {})",
        view.position,
        view.total,
        view.number,
        view.mode.as_str()
    );
    push_text(&mut out, "", &view.prompt);
    for (label, option) in OPTION_LABELS.iter().zip(&view.options) {
        let _ = writeln!(out, "  {}", option_line(*label, option));
    }
    out
}

fn render_feedback(view: &FeedbackView) -> String {
    let mut out = String::new();
    let verdict = if view.is_correct { "Correct!" } else { "Wrong." };
    let _ = writeln!(out, "{verdict}");
    for ((label, option), mark) in OPTION_LABELS.iter().zip(&view.options).zip(view.marks) {
        let _ = writeln!(out, "{} {}", mark_symbol(mark), option_line(*label, option));
    }
    if let Some(explanation) = &view.explanation {
        push_text(&mut out, "ℹ ", explanation);
    }
    if !view.counted {
        let _ = writeln!(out, "(already answered, not counted again)");
    }
    let _ = writeln!(
        out,
        "Score {} · mistakes {} · question {}/{}. Type `next`.",
        view.score, view.wrong_count, view.position, view.total
    );
    out
}

fn render_summary(view: &SummaryView) -> String {
    let mut out = String::new();
    let headline = match (view.mode, view.reason, view.passed) {
        (QuizMode::Exam, CompletionReason::FailedFast, _) => "❌ Exam stopped: too many mistakes.",
        (QuizMode::Exam, _, Some(true)) => "🎉 Exam passed!",
        (QuizMode::Exam, _, _) => "❌ Exam not passed.",
        (QuizMode::Learning, _, _) => "📘 Learning session finished.",
    };
    let _ = writeln!(out, "\n{headline}");
    let _ = writeln!(
        out,
        "Correct: {} · Mistakes: {} · Questions: {}",
        view.score, view.wrong_count, view.total
    );
    if view.reason == CompletionReason::Exhausted {
        let _ = writeln!(out, "No unused questions were left.");
    }
    let _ = writeln!(out, "Type `start` to go again.");
    out
}

fn render_error(kind: ErrorKind, rules: QuizRules) -> String {
    match kind {
        ErrorKind::InsufficientQuestions => format!(
            "⚠ The question bank is too small for a {}-question exam.\n",
            rules.exam_size()
        ),
        ErrorKind::ModeNotAllowed => "⚠ Jumping is only available in learning mode.\n".into(),
        ErrorKind::OutOfRange => "⚠ That option or question number does not exist.\n".into(),
        ErrorKind::InvalidTransition => String::new(),
    }
}

#[must_use]
pub fn render_progress(progress: Option<&SessionProgress>) -> String {
    let Some(p) = progress else {
        return "No active session. Type `start`.\n".into();
    };
    let mode = p.quiz_mode.map_or("not chosen", QuizMode::as_str);
    format!(
        "Phase: {} · mode: {mode} · language: {} · question {}/{} · answered {} · score {} · mistakes {}{}\n",
        p.phase,
        p.language_mode.as_str(),
        p.position,
        p.total,
        p.answered,
        p.score,
        p.wrong_count,
        if p.is_paused { " · paused" } else { "" }
    )
}
