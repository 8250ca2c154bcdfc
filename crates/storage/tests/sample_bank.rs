use quiz_core::model::{OptionIndex, QuestionNumber};
use storage::bank::load_bank_from_path;

#[test]
fn bundled_sample_bank_loads() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../data/sample_questions.json");
    let bank = load_bank_from_path(path).expect("sample bank");
    assert_eq!(bank.len(), 10);

    let index = bank.index_of(QuestionNumber::new(5)).unwrap();
    let question = bank.get(index).unwrap();
    assert_eq!(question.correct_option(), OptionIndex::new(2).unwrap());
    assert!(question.options().iter().all(|o| o.secondary.is_some()));
    assert!(bank.iter().all(|q| !q.prompt().primary.is_empty()));
}

#[test]
fn missing_file_is_an_io_error() {
    let err = load_bank_from_path("/definitely/not/here.json").unwrap_err();
    assert!(matches!(err, storage::bank::BankLoadError::Io(_)));
}
