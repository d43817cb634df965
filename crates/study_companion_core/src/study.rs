//! crates/study_companion_core/src/study.rs
//!
//! The per-feature controllers: upload ingestion, generation of each study
//! artifact with write-back into the store, note editing, and quiz attempts.

use crate::domain::{
    Document, Feature, Flashcard, FlashcardCheck, MediaType, NewDocument, OptionIndex, OutputsPatch,
    QuizQuestion, QuizResult, SummarySection,
};
use crate::generation::{GenerationTicket, GenerationTracker};
use crate::ports::{
    FlashcardGenerationService, NotesGenerationService, PortError, PortResult,
    QuizGenerationService, SummaryGenerationService, TextExtractionService,
};
use crate::quiz::{shuffle_questions, QuizAttempt};
use crate::store::DocumentStore;
use crate::summary::parse_sections;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Whether a finished generation made it into the store.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutcome {
    /// The result was written to the document, shown here after the write.
    Applied(Document),
    /// A newer request for the same document and feature was issued while this
    /// one was in flight, so its result was discarded.
    Superseded,
}

/// The generation backends, one per flow.
#[derive(Clone)]
pub struct StudyFlows {
    pub summary: Arc<dyn SummaryGenerationService>,
    pub notes: Arc<dyn NotesGenerationService>,
    pub flashcards: Arc<dyn FlashcardGenerationService>,
    pub quiz: Arc<dyn QuizGenerationService>,
}

pub struct StudyService {
    store: Arc<DocumentStore>,
    extractor: Arc<dyn TextExtractionService>,
    flows: StudyFlows,
    tracker: GenerationTracker,
    attempts: Mutex<HashMap<Uuid, QuizAttempt>>,
}

impl StudyService {
    pub fn new(
        store: Arc<DocumentStore>,
        extractor: Arc<dyn TextExtractionService>,
        flows: StudyFlows,
    ) -> Self {
        Self {
            store,
            extractor,
            flows,
            tracker: GenerationTracker::new(),
            attempts: Mutex::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &Arc<DocumentStore> {
        &self.store
    }

    pub fn flows(&self) -> &StudyFlows {
        &self.flows
    }

    //=====================================================================================
    // Documents
    //=====================================================================================

    /// Validates the declared media type, extracts text, and stores the result
    /// as a new, active document.
    pub async fn ingest(
        &self,
        file_name: &str,
        declared_type: &str,
        bytes: &[u8],
    ) -> PortResult<Document> {
        let media_type = MediaType::from_mime(declared_type)?;
        let text = self.extractor.extract_text(bytes, media_type).await?;
        if text.trim().is_empty() {
            return Err(PortError::InvalidInput(
                "Could not extract any text from the document. Please ensure it's a text-based file."
                    .to_string(),
            ));
        }

        let document = self.store.add(NewDocument::new(file_name, text)).await;
        info!(
            "Ingested '{}' as document {} ({} words).",
            document.name, document.id, document.word_count
        );
        self.store.select(document.id).await
    }

    pub async fn remove_document(&self, document_id: Uuid) -> PortResult<()> {
        self.store.remove(document_id).await?;
        self.tracker.forget_document(document_id);
        self.attempts.lock().await.remove(&document_id);
        Ok(())
    }

    /// Features with a generation request still in flight for the document.
    pub fn pending_features(&self, document_id: Uuid) -> Vec<Feature> {
        [Feature::Summary, Feature::Notes, Feature::Flashcards, Feature::Quiz]
            .into_iter()
            .filter(|f| self.tracker.is_pending(document_id, *f))
            .collect()
    }

    //=====================================================================================
    // Generation
    //=====================================================================================

    pub async fn generate_summary(&self, document_id: Uuid) -> PortResult<GenerationOutcome> {
        let flow = self.flows.summary.clone();
        self.generate(document_id, Feature::Summary, |text| async move {
            flow.summarize(&text).await.map(OutputsPatch::summary)
        })
        .await
    }

    pub async fn generate_notes(&self, document_id: Uuid) -> PortResult<GenerationOutcome> {
        let flow = self.flows.notes.clone();
        self.generate(document_id, Feature::Notes, |text| async move {
            flow.generate_study_notes(&text)
                .await
                .map(OutputsPatch::notes)
        })
        .await
    }

    pub async fn generate_flashcards(&self, document_id: Uuid) -> PortResult<GenerationOutcome> {
        let flow = self.flows.flashcards.clone();
        self.generate(document_id, Feature::Flashcards, |text| async move {
            flow.create_flashcards(&text)
                .await
                .map(OutputsPatch::flashcards)
        })
        .await
    }

    /// Generates a quiz, shuffles it, caches it, and starts a fresh attempt.
    /// Any attempt in progress is discarded as soon as the request starts, and
    /// no new attempt can be opened until the request finishes.
    pub async fn generate_quiz(&self, document_id: Uuid) -> PortResult<GenerationOutcome> {
        let ticket = {
            let mut attempts = self.attempts.lock().await;
            attempts.remove(&document_id);
            self.tracker.begin(document_id, Feature::Quiz)
        };

        let flow = self.flows.quiz.clone();
        let outcome = self
            .run_generation(ticket, |text| async move {
                let mut quiz = flow.build_quiz(&text).await?;
                if quiz.is_empty() {
                    return Err(PortError::NothingGenerated(
                        "The AI could not generate a quiz from this document. It might be too short or in an unsupported format."
                            .to_string(),
                    ));
                }
                shuffle_questions(&mut quiz, &mut rand::thread_rng());
                Ok(OutputsPatch::quiz(quiz))
            })
            .await?;

        if let GenerationOutcome::Applied(document) = &outcome {
            if let Some(quiz) = &document.outputs.quiz {
                self.attempts
                    .lock()
                    .await
                    .entry(document_id)
                    .or_insert_with(|| QuizAttempt::new(quiz.clone()));
            }
        }
        Ok(outcome)
    }

    async fn generate<F, Fut>(
        &self,
        document_id: Uuid,
        feature: Feature,
        call: F,
    ) -> PortResult<GenerationOutcome>
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = PortResult<OutputsPatch>>,
    {
        let ticket = self.tracker.begin(document_id, feature);
        self.run_generation(ticket, call).await
    }

    /// Runs one flow under `ticket` and writes the result only if the ticket
    /// is still the latest for its document and feature.
    async fn run_generation<F, Fut>(
        &self,
        ticket: GenerationTicket,
        call: F,
    ) -> PortResult<GenerationOutcome>
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = PortResult<OutputsPatch>>,
    {
        let (document_id, feature) = (ticket.document_id, ticket.feature);
        let document = match self.store.get(document_id).await {
            Ok(document) => document,
            Err(e) => {
                self.tracker.finish(&ticket);
                return Err(e);
            }
        };
        info!("Generating {} for document {}.", feature, document_id);

        let result = match call(document.content).await {
            Ok(patch) => self
                .store
                .update_if(document_id, patch, || self.tracker.is_current(&ticket))
                .await
                .map(|applied| match applied {
                    Some(document) => GenerationOutcome::Applied(document),
                    None => {
                        warn!(
                            "Discarding superseded {} result for document {}.",
                            feature, document_id
                        );
                        GenerationOutcome::Superseded
                    }
                }),
            Err(e) => {
                error!(
                    "Failed to generate {} for document {}: {}",
                    feature, document_id, e
                );
                Err(e)
            }
        };

        self.tracker.finish(&ticket);
        result
    }

    //=====================================================================================
    // Reading and Editing Outputs
    //=====================================================================================

    /// Replaces the notes with user-edited text. A generation still in flight
    /// for the notes is superseded by the edit.
    pub async fn edit_notes(&self, document_id: Uuid, notes: String) -> PortResult<Document> {
        let ticket = self.tracker.begin(document_id, Feature::Notes);
        let result = self
            .store
            .update(document_id, OutputsPatch::notes(notes))
            .await;
        self.tracker.finish(&ticket);
        result
    }

    pub async fn summary_sections(&self, document_id: Uuid) -> PortResult<Vec<SummarySection>> {
        let document = self.store.get(document_id).await?;
        let summary = document
            .outputs
            .summary
            .ok_or_else(|| not_generated(Feature::Summary, document_id))?;
        Ok(parse_sections(&summary))
    }

    pub async fn notes(&self, document_id: Uuid) -> PortResult<String> {
        self.store
            .get(document_id)
            .await?
            .outputs
            .notes
            .ok_or_else(|| not_generated(Feature::Notes, document_id))
    }

    pub async fn flashcards(&self, document_id: Uuid) -> PortResult<Vec<Flashcard>> {
        self.store
            .get(document_id)
            .await?
            .outputs
            .flashcards
            .ok_or_else(|| not_generated(Feature::Flashcards, document_id))
    }

    /// Grades a picked option for one flashcard of the document.
    pub async fn check_flashcard(
        &self,
        document_id: Uuid,
        card_index: usize,
        option_index: usize,
    ) -> PortResult<FlashcardCheck> {
        let option = OptionIndex::new(option_index)?;
        let cards = self.flashcards(document_id).await?;
        let card = cards.get(card_index).ok_or_else(|| {
            PortError::InvalidInput(format!(
                "Flashcard index {} is out of range for {} cards",
                card_index,
                cards.len()
            ))
        })?;
        Ok(card.check(option))
    }

    //=====================================================================================
    // Quiz Attempts
    //=====================================================================================

    /// The current attempt, started from the cached quiz if none is running.
    pub async fn quiz_attempt(&self, document_id: Uuid) -> PortResult<QuizAttempt> {
        self.with_attempt(document_id, |attempt| Ok(attempt.clone()))
            .await
    }

    pub async fn answer_question(
        &self,
        document_id: Uuid,
        question_index: usize,
        option_index: usize,
    ) -> PortResult<QuizAttempt> {
        let option = OptionIndex::new(option_index)?;
        self.with_attempt(document_id, |attempt| {
            attempt.answer(question_index, option)?;
            Ok(attempt.clone())
        })
        .await
    }

    /// Reshuffles the questions and clears the answers. The new order is not persisted.
    pub async fn restart_quiz(&self, document_id: Uuid) -> PortResult<QuizAttempt> {
        self.with_attempt(document_id, |attempt| {
            attempt.restart(&mut rand::thread_rng());
            Ok(attempt.clone())
        })
        .await
    }

    pub async fn submit_quiz(&self, document_id: Uuid) -> PortResult<QuizResult> {
        self.with_attempt(document_id, |attempt| attempt.submit())
            .await
    }

    async fn with_attempt<T>(
        &self,
        document_id: Uuid,
        f: impl FnOnce(&mut QuizAttempt) -> PortResult<T>,
    ) -> PortResult<T> {
        let mut attempts = self.attempts.lock().await;
        if self.tracker.is_pending(document_id, Feature::Quiz) {
            return Err(PortError::Conflict(format!(
                "A new quiz is being generated for document {}",
                document_id
            )));
        }
        if !attempts.contains_key(&document_id) {
            let quiz: Vec<QuizQuestion> = self
                .store
                .get(document_id)
                .await?
                .outputs
                .quiz
                .ok_or_else(|| not_generated(Feature::Quiz, document_id))?;
            attempts.insert(document_id, QuizAttempt::new(quiz));
        }
        let attempt = attempts
            .get_mut(&document_id)
            .ok_or_else(|| PortError::Unexpected("quiz attempt vanished".to_string()))?;
        f(attempt)
    }
}

fn not_generated(feature: Feature, document_id: Uuid) -> PortError {
    PortError::NotFound(format!(
        "No {} has been generated for document {}",
        feature, document_id
    ))
}
