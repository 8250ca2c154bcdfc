pub mod bank;
pub mod repository;
pub mod sqlite;

pub use bank::{BankLoadError, QuestionRecord, bank_from_json_str, load_bank_from_path};
pub use repository::{
    AnswerLogRecord, InMemoryRepository, QuizLogRepository, RunRecord, RunStatus, SessionStore,
    Storage, StorageError,
};
