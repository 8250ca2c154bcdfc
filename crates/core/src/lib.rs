#![forbid(unsafe_code)]

pub mod error;
pub mod machine;
pub mod model;
pub mod scoring;
pub mod selector;
pub mod time;

pub use error::{ErrorKind, QuizError};
pub use time::Clock;
