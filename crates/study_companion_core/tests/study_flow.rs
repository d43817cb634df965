//! End-to-end behaviour of the study controllers against in-memory ports.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use study_companion_core::{
    Document, DocumentRepository, DocumentStore, Flashcard, FlashcardGenerationService,
    GenerationOutcome, MediaType, NotesGenerationService, PortError, PortResult,
    QuizGenerationService, QuizQuestion, StudyFlows, StudyService, SummaryGenerationService,
    TextExtractionService,
};
use tokio::sync::Notify;

#[derive(Default)]
struct MemoryRepository {
    saved: Mutex<Vec<Document>>,
}

#[async_trait]
impl DocumentRepository for MemoryRepository {
    async fn load(&self) -> PortResult<Vec<Document>> {
        Ok(self.saved.lock().unwrap().clone())
    }

    async fn save(&self, snapshot: &[Document]) -> PortResult<()> {
        *self.saved.lock().unwrap() = snapshot.to_vec();
        Ok(())
    }
}

struct PassthroughExtractor;

#[async_trait]
impl TextExtractionService for PassthroughExtractor {
    async fn extract_text(&self, bytes: &[u8], media_type: MediaType) -> PortResult<String> {
        match media_type {
            MediaType::PlainText => String::from_utf8(bytes.to_vec())
                .map_err(|e| PortError::ExtractionFailed(e.to_string())),
            MediaType::Pdf => Err(PortError::ExtractionFailed("corrupt".into())),
        }
    }
}

/// First call blocks until released and answers "old"; later calls answer "new" at once.
#[derive(Default)]
struct GatedSummary {
    calls: AtomicUsize,
    started: Notify,
    release: Notify,
}

#[async_trait]
impl SummaryGenerationService for GatedSummary {
    async fn summarize(&self, _document_text: &str) -> PortResult<String> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            self.started.notify_one();
            self.release.notified().await;
            Ok("## Old\nstale".to_string())
        } else {
            Ok("## Intro\nFoo\n## Methods\nBar".to_string())
        }
    }
}

struct FixedNotes;

#[async_trait]
impl NotesGenerationService for FixedNotes {
    async fn generate_study_notes(&self, _document_content: &str) -> PortResult<String> {
        Ok("## Key Concepts\n* **Mammals** are animals".to_string())
    }
}

struct FailingFlashcards;

#[async_trait]
impl FlashcardGenerationService for FailingFlashcards {
    async fn create_flashcards(&self, _document_content: &str) -> PortResult<Vec<Flashcard>> {
        Err(PortError::Unexpected("provider unavailable".to_string()))
    }
}

struct TwoCards;

#[async_trait]
impl FlashcardGenerationService for TwoCards {
    async fn create_flashcards(&self, _document_content: &str) -> PortResult<Vec<Flashcard>> {
        let options = || vec!["Cat".into(), "Dog".into(), "Fish".into(), "Bird".into()];
        Ok(vec![
            Flashcard::new(
                "Which animal purrs?".into(),
                "Cat".into(),
                "Cats purr when content.".into(),
                options(),
                0,
            )?,
            Flashcard::new(
                "Which animal barks?".into(),
                "Dog".into(),
                "Dogs bark.".into(),
                options(),
                1,
            )?,
        ])
    }
}

/// One question per sentence. When `hold_next` is set, the next call waits for `release`.
#[derive(Default)]
struct SentenceQuiz {
    hold_next: AtomicBool,
    started: Notify,
    release: Notify,
}

#[async_trait]
impl QuizGenerationService for SentenceQuiz {
    async fn build_quiz(&self, document_text: &str) -> PortResult<Vec<QuizQuestion>> {
        if self.hold_next.swap(false, Ordering::SeqCst) {
            self.started.notify_one();
            self.release.notified().await;
        }
        document_text
            .split('.')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .enumerate()
            .map(|(i, sentence)| {
                QuizQuestion::new(
                    format!("True or false: {}?", sentence),
                    vec!["True".into(), "False".into(), "Unknown".into(), "Both".into()],
                    (i % 2) as i64,
                    format!("The document states: {}.", sentence),
                )
            })
            .collect()
    }
}

struct Harness {
    service: Arc<StudyService>,
    repo: Arc<MemoryRepository>,
    summary: Arc<GatedSummary>,
    quiz: Arc<SentenceQuiz>,
}

async fn harness() -> Harness {
    harness_with_flashcards(Arc::new(FailingFlashcards)).await
}

async fn harness_with_flashcards(flashcards: Arc<dyn FlashcardGenerationService>) -> Harness {
    let repo = Arc::new(MemoryRepository::default());
    let store = Arc::new(DocumentStore::open(repo.clone()).await);
    let summary = Arc::new(GatedSummary::default());
    let quiz = Arc::new(SentenceQuiz::default());
    let flows = StudyFlows {
        summary: summary.clone(),
        notes: Arc::new(FixedNotes),
        flashcards,
        quiz: quiz.clone(),
    };
    let service = Arc::new(StudyService::new(store, Arc::new(PassthroughExtractor), flows));
    Harness {
        service,
        repo,
        summary,
        quiz,
    }
}

#[tokio::test]
async fn uploaded_text_becomes_active_document_and_gets_a_quiz() {
    let h = harness().await;
    let text = "Cats are mammals. Dogs are mammals too.";

    let doc = h
        .service
        .ingest("notes.txt", "text/plain", text.as_bytes())
        .await
        .unwrap();
    assert_eq!(doc.content, text);
    assert_eq!(doc.word_count, 7);
    assert_eq!(h.service.store().active().await.unwrap().id, doc.id);

    let outcome = h.service.generate_quiz(doc.id).await.unwrap();
    let GenerationOutcome::Applied(updated) = outcome else {
        panic!("quiz was not applied");
    };
    let quiz = updated.outputs.quiz.unwrap();
    assert!(!quiz.is_empty());
    assert!(quiz.iter().all(|q| q.correct_answer.get() < 4));

    let attempt = h.service.quiz_attempt(doc.id).await.unwrap();
    assert_eq!(attempt.questions(), quiz.as_slice());
}

#[tokio::test]
async fn unsupported_and_blank_uploads_are_rejected() {
    let h = harness().await;

    let err = h
        .service
        .ingest("photo.png", "image/png", b"binary")
        .await
        .unwrap_err();
    assert!(matches!(err, PortError::Unsupported(_)));

    let err = h
        .service
        .ingest("blank.txt", "text/plain", b"  \n\t ")
        .await
        .unwrap_err();
    assert!(matches!(err, PortError::InvalidInput(_)));

    let err = h
        .service
        .ingest("broken.pdf", "application/pdf", b"%PDF-garbage")
        .await
        .unwrap_err();
    assert!(matches!(err, PortError::ExtractionFailed(_)));

    assert!(h.service.store().list().await.is_empty());
}

#[tokio::test]
async fn superseded_generation_is_discarded() {
    let h = harness().await;
    let doc = h
        .service
        .ingest("paper.txt", "text/plain", b"Some research text.")
        .await
        .unwrap();

    let first = {
        let service = h.service.clone();
        let id = doc.id;
        tokio::spawn(async move { service.generate_summary(id).await })
    };
    h.summary.started.notified().await;

    let second = h.service.generate_summary(doc.id).await.unwrap();
    assert!(matches!(second, GenerationOutcome::Applied(_)));

    h.summary.release.notify_one();
    let first = first.await.unwrap().unwrap();
    assert_eq!(first, GenerationOutcome::Superseded);

    let sections = h.service.summary_sections(doc.id).await.unwrap();
    let titles: Vec<_> = sections.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, vec!["Intro", "Methods"]);
}

#[tokio::test]
async fn failed_generation_leaves_slot_empty() {
    let h = harness().await;
    let doc = h
        .service
        .ingest("paper.txt", "text/plain", b"Some research text.")
        .await
        .unwrap();

    assert!(h.service.generate_flashcards(doc.id).await.is_err());
    assert!(h.service.flashcards(doc.id).await.is_err());
    assert!(h.service.pending_features(doc.id).is_empty());
}

#[tokio::test]
async fn edited_notes_are_persisted() {
    let h = harness().await;
    let doc = h
        .service
        .ingest("paper.txt", "text/plain", b"Some research text.")
        .await
        .unwrap();

    h.service.generate_notes(doc.id).await.unwrap();
    h.service
        .edit_notes(doc.id, "my own notes".to_string())
        .await
        .unwrap();

    assert_eq!(h.service.notes(doc.id).await.unwrap(), "my own notes");
    let persisted = h.repo.saved.lock().unwrap().clone();
    assert_eq!(persisted[0].outputs.notes.as_deref(), Some("my own notes"));
}

#[tokio::test]
async fn quiz_attempt_scores_answers() {
    let h = harness().await;
    let doc = h
        .service
        .ingest("notes.txt", "text/plain", b"Cats are mammals. Dogs are mammals too.")
        .await
        .unwrap();
    h.service.generate_quiz(doc.id).await.unwrap();

    let attempt = h.service.quiz_attempt(doc.id).await.unwrap();
    let total = attempt.questions().len();
    assert!(h.service.submit_quiz(doc.id).await.is_err());

    for (i, q) in attempt.questions().iter().enumerate() {
        h.service
            .answer_question(doc.id, i, q.correct_answer.get())
            .await
            .unwrap();
    }
    let result = h.service.submit_quiz(doc.id).await.unwrap();
    assert_eq!(result.score, total);
    assert_eq!(result.total, total);

    let restarted = h.service.restart_quiz(doc.id).await.unwrap();
    assert!(restarted.answers().is_empty());
}

#[tokio::test]
async fn removing_a_document_drops_its_quiz_attempt() {
    let h = harness().await;
    let doc = h
        .service
        .ingest("notes.txt", "text/plain", b"Cats are mammals.")
        .await
        .unwrap();
    h.service.generate_quiz(doc.id).await.unwrap();
    h.service.remove_document(doc.id).await.unwrap();

    assert!(matches!(
        h.service.quiz_attempt(doc.id).await,
        Err(PortError::NotFound(_))
    ));
    assert!(h.repo.saved.lock().unwrap().is_empty());
}

#[tokio::test]
async fn quiz_attempt_waits_for_pending_regeneration() {
    let h = harness().await;
    let doc = h
        .service
        .ingest("notes.txt", "text/plain", b"Cats are mammals. Dogs bark.")
        .await
        .unwrap();
    h.service.generate_quiz(doc.id).await.unwrap();
    h.service.answer_question(doc.id, 0, 1).await.unwrap();

    h.quiz.hold_next.store(true, Ordering::SeqCst);
    let regenerating = {
        let service = h.service.clone();
        let id = doc.id;
        tokio::spawn(async move { service.generate_quiz(id).await })
    };
    h.quiz.started.notified().await;

    assert!(matches!(
        h.service.quiz_attempt(doc.id).await,
        Err(PortError::Conflict(_))
    ));
    assert!(matches!(
        h.service.answer_question(doc.id, 0, 0).await,
        Err(PortError::Conflict(_))
    ));

    h.quiz.release.notify_one();
    let outcome = regenerating.await.unwrap().unwrap();
    assert!(matches!(outcome, GenerationOutcome::Applied(_)));

    let attempt = h.service.quiz_attempt(doc.id).await.unwrap();
    assert!(attempt.answers().is_empty());
}

#[tokio::test]
async fn flashcard_answers_are_checked() {
    let h = harness_with_flashcards(Arc::new(TwoCards)).await;
    let doc = h
        .service
        .ingest("pets.txt", "text/plain", b"Cats purr and dogs bark.")
        .await
        .unwrap();

    assert!(matches!(
        h.service.check_flashcard(doc.id, 0, 0).await,
        Err(PortError::NotFound(_))
    ));

    h.service.generate_flashcards(doc.id).await.unwrap();

    let right = h.service.check_flashcard(doc.id, 1, 1).await.unwrap();
    assert!(right.correct);
    assert_eq!(right.answer, "Dog");

    let wrong = h.service.check_flashcard(doc.id, 0, 2).await.unwrap();
    assert!(!wrong.correct);
    assert_eq!(wrong.correct_option.get(), 0);
    assert_eq!(wrong.explanation, "Cats purr when content.");

    assert!(matches!(
        h.service.check_flashcard(doc.id, 2, 0).await,
        Err(PortError::InvalidInput(_))
    ));
    assert!(matches!(
        h.service.check_flashcard(doc.id, 0, 4).await,
        Err(PortError::InvalidInput(_))
    ));
}
