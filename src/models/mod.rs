pub mod quiz;
pub mod upload;

pub use quiz::{QuizItem, QuizResult};
pub use upload::{UploadedDocument, WrongQuestionList};
