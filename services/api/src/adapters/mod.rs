pub mod db;
pub mod extract;
pub mod flashcards_llm;
pub mod json_store;
pub mod notes_llm;
pub mod quiz_llm;
pub mod structured;
pub mod summary_llm;

pub use db::PgSlotRepository;
pub use extract::DocumentExtractor;
pub use flashcards_llm::OpenAiFlashcardsAdapter;
pub use json_store::JsonFileRepository;
pub use notes_llm::OpenAiNotesAdapter;
pub use quiz_llm::OpenAiQuizAdapter;
pub use summary_llm::OpenAiSummaryAdapter;
