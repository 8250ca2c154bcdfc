use std::sync::Arc;

use quiz_core::machine::Action;
use quiz_core::model::QuestionNumber;
use services::{Clock, QuizService};
use storage::bank::load_bank_from_path;
use storage::repository::{InMemoryRepository, SessionStore, Storage};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod args;
mod command;
mod render;

use args::{Args, print_usage};
use command::{Command, parse_line, print_help};

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("info,services=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Number of the question the last render put on screen.
fn on_screen(actions: &[Action], previous: Option<QuestionNumber>) -> Option<QuestionNumber> {
    actions.iter().fold(previous, |current, action| match action {
        Action::RenderQuestion(view) => Some(view.number),
        Action::RenderSummary(_) | Action::PromptLanguage | Action::PromptMode { .. } => None,
        _ => current,
    })
}

async fn build_service(args: &Args) -> Result<QuizService, Box<dyn std::error::Error>> {
    let bank = Arc::new(load_bank_from_path(&args.bank_path)?);
    info!(path = %args.bank_path.display(), questions = bank.len(), "question bank loaded");

    let service = match &args.db_url {
        Some(url) => {
            let storage = Storage::sqlite(url).await?;
            info!(db = %url, "sqlite storage ready");
            QuizService::new(Clock::default(), bank, args.rules, storage.sessions)
                .with_quiz_log(storage.quiz_log)
        }
        None => {
            let sessions: Arc<dyn SessionStore> = Arc::new(InMemoryRepository::new());
            QuizService::new(Clock::default(), bank, args.rules, sessions)
        }
    };

    Ok(match args.seed {
        Some(seed) => service.with_seed(seed),
        None => service,
    })
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let parsed = Args::parse(&mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;
    if parsed.help {
        print_usage();
        return Ok(());
    }

    init_tracing(parsed.verbose);
    let service = build_service(&parsed).await?;
    let id = parsed.session_id;

    // A paused session from an earlier run picks up where it left off.
    let mut current = match service.progress(id).await? {
        Some(progress) if progress.is_paused => {
            println!("{}", render::render_progress(Some(&progress)));
            println!("Type `resume` to continue or `start` for a new quiz.");
            None
        }
        _ => {
            let actions = service.restart(id).await?;
            for action in &actions {
                print!("{}", render::render(action, parsed.rules));
            }
            on_screen(&actions, None)
        }
    };

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match parse_line(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(err) => {
                println!("{err}");
                continue;
            }
        };
        match command {
            Command::Quit => break,
            Command::Help => print_help(),
            Command::Progress => {
                let progress = service.progress(id).await?;
                print!("{}", render::render_progress(progress.as_ref()));
            }
            Command::Quiz(input) => {
                let actions = service.dispatch(id, input.into_event(current)).await?;
                for action in &actions {
                    print!("{}", render::render(action, parsed.rules));
                }
                current = on_screen(&actions, current);
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::machine::{PauseView, QuestionView};
    use quiz_core::model::{LocalizedText, QuizMode};

    fn question(number: u32) -> Action {
        Action::RenderQuestion(QuestionView {
            number: QuestionNumber::new(number),
            prompt: LocalizedText::primary_only("Q"),
            options: Vec::new(),
            position: 1,
            total: 1,
            mode: QuizMode::Learning,
        })
    }

    #[test]
    fn tracks_the_question_on_screen() {
        let paused = Action::Paused(PauseView {
            position: 1,
            total: 1,
            answered: 0,
        });
        assert_eq!(on_screen(&[question(4)], None), Some(QuestionNumber::new(4)));
        assert_eq!(
            on_screen(&[paused], Some(QuestionNumber::new(4))),
            Some(QuestionNumber::new(4))
        );
        assert_eq!(on_screen(&[Action::PromptLanguage], Some(QuestionNumber::new(4))), None);
    }
}
