pub mod domain;
pub mod generation;
pub mod ports;
pub mod quiz;
pub mod store;
pub mod study;
pub mod summary;

pub use domain::{
    Document, Feature, Flashcard, FlashcardCheck, GeneratedOutputs, MediaType, NewDocument, OptionIndex,
    OutputsPatch, QuizQuestion, QuizResult, QuizResultEntry, SummarySection,
};
pub use ports::{
    DocumentRepository, FlashcardGenerationService, NotesGenerationService, PortError,
    PortResult, QuizGenerationService, SummaryGenerationService, TextExtractionService,
};
pub use quiz::QuizAttempt;
pub use store::{DocumentStore, StoreEvent};
pub use study::{GenerationOutcome, StudyFlows, StudyService};
