use std::fmt;
use std::path::PathBuf;

use quiz_core::model::{QuizRules, RulesError, SessionId};

#[derive(Debug)]
pub enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidNumber { flag: &'static str, raw: String },
    InvalidDbUrl { raw: String },
    Rules(RulesError),
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidNumber { flag, raw } => write!(f, "invalid {flag} value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::Rules(err) => write!(f, "invalid quiz rules: {err}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn parse_number<T: std::str::FromStr>(flag: &'static str, raw: String) -> Result<T, ArgsError> {
    raw.trim()
        .parse()
        .map_err(|_| ArgsError::InvalidNumber { flag, raw })
}

pub fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [--bank <path>] [--db <sqlite_url>] [--session <id>]");
    eprintln!("                      [--exam-size <n>] [--fail-threshold <n>] [--pass-threshold <n>]");
    eprintln!("                      [--seed <n>] [--verbose]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --bank data/sample_questions.json");
    eprintln!("  --db   (none: sessions kept in memory, no analytics)");
    eprintln!("  --session 1");
    eprintln!("  exam rules 30 / 6 / 25");
    eprintln!();
    eprintln!("The sample bank is small; try an exam with:");
    eprintln!("  --exam-size 5 --fail-threshold 2 --pass-threshold 4");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_BANK_PATH, QUIZ_DB_URL, QUIZ_SESSION_ID, RUST_LOG");
}

/// Resolved command-line configuration.
#[derive(Debug)]
pub struct Args {
    pub bank_path: PathBuf,
    pub db_url: Option<String>,
    pub session_id: SessionId,
    pub rules: QuizRules,
    pub seed: Option<u64>,
    pub verbose: bool,
    pub help: bool,
}

impl Args {
    /// Parse flags, falling back to environment variables and defaults.
    pub fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        Self::parse_with_env(args, |key| std::env::var(key).ok())
    }

    fn parse_with_env(
        args: &mut impl Iterator<Item = String>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ArgsError> {
        let mut bank_path = env("QUIZ_BANK_PATH")
            .map_or_else(|| PathBuf::from("data/sample_questions.json"), PathBuf::from);
        let mut db_url = env("QUIZ_DB_URL")
            .filter(|v| !v.trim().is_empty())
            .map(normalize_sqlite_url);
        let mut session_id = env("QUIZ_SESSION_ID")
            .and_then(|v| v.parse::<SessionId>().ok())
            .unwrap_or_else(|| SessionId::new(1));
        let defaults = QuizRules::default();
        let mut exam_size = defaults.exam_size();
        let mut fail_threshold = defaults.fail_threshold();
        let mut pass_threshold = defaults.pass_threshold();
        let mut seed = None;
        let mut verbose = false;
        let mut help = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--bank" => bank_path = PathBuf::from(require_value(args, "--bank")?),
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = Some(normalize_sqlite_url(value));
                }
                "--session" => {
                    let value = require_value(args, "--session")?;
                    session_id = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidNumber {
                            flag: "--session",
                            raw: value.clone(),
                        })?;
                }
                "--exam-size" => {
                    exam_size = parse_number("--exam-size", require_value(args, "--exam-size")?)?;
                }
                "--fail-threshold" => {
                    fail_threshold = parse_number(
                        "--fail-threshold",
                        require_value(args, "--fail-threshold")?,
                    )?;
                }
                "--pass-threshold" => {
                    pass_threshold = parse_number(
                        "--pass-threshold",
                        require_value(args, "--pass-threshold")?,
                    )?;
                }
                "--seed" => seed = Some(parse_number("--seed", require_value(args, "--seed")?)?),
                "--verbose" | "-v" => verbose = true,
                "--help" | "-h" => help = true,
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        let rules =
            QuizRules::new(exam_size, fail_threshold, pass_threshold).map_err(ArgsError::Rules)?;
        Ok(Self {
            bank_path,
            db_url,
            session_id,
            rules,
            seed,
            verbose,
            help,
        })
    }
}

pub fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" {
        return raw;
    }
    if raw.starts_with("sqlite://") {
        return if raw.contains('?') { raw } else { format!("{raw}?mode=rwc") };
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}?mode=rwc", absolute.display())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str], env: &[(&str, &str)]) -> Result<Args, ArgsError> {
        let env: Vec<(String, String)> = env
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        let mut iter = argv.iter().map(|s| (*s).to_string());
        Args::parse_with_env(&mut iter, |key| {
            env.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone())
        })
    }

    #[test]
    fn defaults_without_flags_or_env() {
        let args = parse(&[], &[]).unwrap();
        assert_eq!(args.bank_path, PathBuf::from("data/sample_questions.json"));
        assert!(args.db_url.is_none());
        assert_eq!(args.session_id, SessionId::new(1));
        assert_eq!(args.rules, QuizRules::default());
        assert!(!args.verbose);
    }

    #[test]
    fn flags_override_environment() {
        let args = parse(
            &["--session", "-42", "--exam-size", "5", "--fail-threshold", "2", "--pass-threshold", "4", "--seed", "7"],
            &[("QUIZ_SESSION_ID", "9"), ("QUIZ_BANK_PATH", "bank.json")],
        )
        .unwrap();
        assert_eq!(args.session_id, SessionId::new(-42));
        assert_eq!(args.bank_path, PathBuf::from("bank.json"));
        assert_eq!(args.rules, QuizRules::new(5, 2, 4).unwrap());
        assert_eq!(args.seed, Some(7));
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!(
            parse(&["--exam-size"], &[]),
            Err(ArgsError::MissingValue { flag: "--exam-size" })
        ));
        assert!(matches!(
            parse(&["--seed", "x"], &[]),
            Err(ArgsError::InvalidNumber { flag: "--seed", .. })
        ));
        assert!(matches!(
            parse(&["--pass-threshold", "40"], &[]),
            Err(ArgsError::Rules(_))
        ));
        assert!(matches!(parse(&["--nope"], &[]), Err(ArgsError::UnknownArg(_))));
    }

    #[test]
    fn sqlite_urls_become_absolute() {
        assert_eq!(normalize_sqlite_url("sqlite::memory:".into()), "sqlite::memory:");
        let url = normalize_sqlite_url("quiz.sqlite3".into());
        assert!(url.starts_with("sqlite://"));
        assert!(url.ends_with("quiz.sqlite3?mode=rwc"));
        assert_eq!(
            normalize_sqlite_url("sqlite:///tmp/q.db?mode=ro".into()),
            "sqlite:///tmp/q.db?mode=ro"
        );
    }
}
