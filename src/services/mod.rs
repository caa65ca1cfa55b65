pub mod llm_service;
pub mod pdf_extractor;
pub mod prompt_builder;
pub mod response_parser;

pub use llm_service::{LlmService, TextGenerator};
pub use pdf_extractor::{DocumentExtractor, PdfExtractor};
pub use prompt_builder::build_quiz_prompt;
pub use response_parser::parse_quiz_response;
