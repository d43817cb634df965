//! crates/study_companion_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any storage or serialization format.

use crate::ports::{PortError, PortResult};
use chrono::{DateTime, Utc};
use std::fmt;
use uuid::Uuid;

/// Number of answer options every flashcard and quiz question carries.
pub const OPTION_COUNT: usize = 4;

//=========================================================================================
// Documents
//=========================================================================================

/// One uploaded source text plus its cached generated study artifacts.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub word_count: usize,
    pub content: String,
    pub outputs: GeneratedOutputs,
}

/// A freshly extracted document that has not yet been assigned an id.
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub name: String,
    pub content: String,
}

impl NewDocument {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// Counts whitespace-separated words.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// The optional generated slots of a document. Each slot is overwritten
/// wholesale when regenerated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeneratedOutputs {
    pub summary: Option<String>,
    pub notes: Option<String>,
    pub flashcards: Option<Vec<Flashcard>>,
    pub quiz: Option<Vec<QuizQuestion>>,
}

impl GeneratedOutputs {
    /// Merges a patch into these outputs, slot by slot.
    pub fn apply(&mut self, patch: OutputsPatch) {
        if let Some(summary) = patch.summary {
            self.summary = Some(summary);
        }
        if let Some(notes) = patch.notes {
            self.notes = Some(notes);
        }
        if let Some(flashcards) = patch.flashcards {
            self.flashcards = Some(flashcards);
        }
        if let Some(quiz) = patch.quiz {
            self.quiz = Some(quiz);
        }
    }
}

/// A partial update to [`GeneratedOutputs`]. `None` leaves a slot untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutputsPatch {
    pub summary: Option<String>,
    pub notes: Option<String>,
    pub flashcards: Option<Vec<Flashcard>>,
    pub quiz: Option<Vec<QuizQuestion>>,
}

impl OutputsPatch {
    pub fn summary(summary: impl Into<String>) -> Self {
        Self {
            summary: Some(summary.into()),
            ..Default::default()
        }
    }

    pub fn notes(notes: impl Into<String>) -> Self {
        Self {
            notes: Some(notes.into()),
            ..Default::default()
        }
    }

    pub fn flashcards(flashcards: Vec<Flashcard>) -> Self {
        Self {
            flashcards: Some(flashcards),
            ..Default::default()
        }
    }

    pub fn quiz(quiz: Vec<QuizQuestion>) -> Self {
        Self {
            quiz: Some(quiz),
            ..Default::default()
        }
    }
}

/// The generated artifacts a document can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Feature {
    Summary,
    Notes,
    Flashcards,
    Quiz,
}

impl Feature {
    pub fn as_str(&self) -> &'static str {
        match self {
            Feature::Summary => "summary",
            Feature::Notes => "notes",
            Feature::Flashcards => "flashcards",
            Feature::Quiz => "quiz",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//=========================================================================================
// Uploads
//=========================================================================================

/// The upload media types accepted for text extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    PlainText,
    Pdf,
}

impl MediaType {
    pub const PLAIN_TEXT: &'static str = "text/plain";
    pub const PDF: &'static str = "application/pdf";

    /// Parses a declared MIME type. Parameters such as `; charset=utf-8` are ignored.
    pub fn from_mime(mime: &str) -> PortResult<Self> {
        let essence = mime.split(';').next().unwrap_or_default().trim();
        if essence.eq_ignore_ascii_case(Self::PLAIN_TEXT) {
            Ok(MediaType::PlainText)
        } else if essence.eq_ignore_ascii_case(Self::PDF) {
            Ok(MediaType::Pdf)
        } else {
            Err(PortError::Unsupported(format!(
                "Please upload a PDF or TXT file. You uploaded a {} file.",
                if mime.is_empty() { "untyped" } else { mime }
            )))
        }
    }
}

//=========================================================================================
// Flashcards and Quiz Questions
//=========================================================================================

/// Index of the correct option; always within `[0, OPTION_COUNT)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OptionIndex(u8);

impl OptionIndex {
    pub fn new(index: usize) -> PortResult<Self> {
        if index < OPTION_COUNT {
            Ok(Self(index as u8))
        } else {
            Err(PortError::InvalidInput(format!(
                "option index {} is outside 0..{}",
                index, OPTION_COUNT
            )))
        }
    }

    pub fn get(&self) -> usize {
        self.0 as usize
    }
}

fn four_options(options: Vec<String>) -> PortResult<[String; OPTION_COUNT]> {
    let len = options.len();
    options.try_into().map_err(|_| {
        PortError::InvalidResponse(format!(
            "expected exactly {} options, got {}",
            OPTION_COUNT, len
        ))
    })
}

fn response_index(index: i64) -> PortResult<OptionIndex> {
    usize::try_from(index)
        .ok()
        .and_then(|i| OptionIndex::new(i).ok())
        .ok_or_else(|| {
            PortError::InvalidResponse(format!(
                "correct option index {} is outside 0..{}",
                index, OPTION_COUNT
            ))
        })
}

/// An interactive multiple-choice flashcard.
#[derive(Debug, Clone, PartialEq)]
pub struct Flashcard {
    pub question: String,
    pub answer: String,
    pub explanation: String,
    pub options: [String; OPTION_COUNT],
    pub correct_option: OptionIndex,
}

impl Flashcard {
    /// Builds a flashcard from untrusted data, rejecting anything that does not
    /// carry exactly four options and an in-range index.
    pub fn new(
        question: String,
        answer: String,
        explanation: String,
        options: Vec<String>,
        correct_option_index: i64,
    ) -> PortResult<Self> {
        Ok(Self {
            question,
            answer,
            explanation,
            options: four_options(options)?,
            correct_option: response_index(correct_option_index)?,
        })
    }

    pub fn correct_text(&self) -> &str {
        &self.options[self.correct_option.get()]
    }

    pub fn is_correct(&self, selected: OptionIndex) -> bool {
        selected == self.correct_option
    }

    /// Grades a picked option and reveals the back of the card.
    pub fn check(&self, selected: OptionIndex) -> FlashcardCheck {
        FlashcardCheck {
            correct: self.is_correct(selected),
            correct_option: self.correct_option,
            answer: self.answer.clone(),
            explanation: self.explanation.clone(),
        }
    }
}

/// The result of answering one flashcard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashcardCheck {
    pub correct: bool,
    pub correct_option: OptionIndex,
    pub answer: String,
    pub explanation: String,
}

/// A single multiple-choice quiz question.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizQuestion {
    pub question: String,
    pub options: [String; OPTION_COUNT],
    pub correct_answer: OptionIndex,
    pub explanation: String,
}

impl QuizQuestion {
    /// Builds a quiz question from untrusted data with the same checks as [`Flashcard::new`].
    pub fn new(
        question: String,
        options: Vec<String>,
        correct_answer_index: i64,
        explanation: String,
    ) -> PortResult<Self> {
        Ok(Self {
            question,
            options: four_options(options)?,
            correct_answer: response_index(correct_answer_index)?,
            explanation,
        })
    }

    pub fn correct_text(&self) -> &str {
        &self.options[self.correct_answer.get()]
    }

    pub fn option_text(&self, index: OptionIndex) -> &str {
        &self.options[index.get()]
    }
}

//=========================================================================================
// Transient Results
//=========================================================================================

/// One scored question and what the user picked for it.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizResultEntry {
    pub question: QuizQuestion,
    pub selected_answer: Option<OptionIndex>,
}

/// The outcome of submitting a quiz. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizResult {
    pub score: usize,
    pub total: usize,
    pub answered_correctly: Vec<QuizResultEntry>,
    pub answered_incorrectly: Vec<QuizResultEntry>,
}

/// A titled block of a generated summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummarySection {
    pub title: String,
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> Vec<String> {
        vec!["a".into(), "b".into(), "c".into(), "d".into()]
    }

    #[test]
    fn word_count_splits_on_any_whitespace() {
        assert_eq!(word_count("Cats are mammals. Dogs are mammals too."), 7);
        assert_eq!(word_count("  one\n\ttwo  "), 2);
        assert_eq!(word_count(""), 0);
    }

    #[test]
    fn option_index_rejects_out_of_range() {
        assert_eq!(OptionIndex::new(3).unwrap().get(), 3);
        assert!(OptionIndex::new(4).is_err());
    }

    #[test]
    fn flashcard_requires_four_options_and_valid_index() {
        let card = Flashcard::new("q".into(), "a".into(), "e".into(), options(), 2).unwrap();
        assert_eq!(card.correct_text(), "c");

        let three = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        assert!(matches!(
            Flashcard::new("q".into(), "a".into(), "e".into(), three, 0),
            Err(PortError::InvalidResponse(_))
        ));
        assert!(matches!(
            Flashcard::new("q".into(), "a".into(), "e".into(), options(), -1),
            Err(PortError::InvalidResponse(_))
        ));
    }

    #[test]
    fn checking_a_flashcard_reveals_the_answer() {
        let card = Flashcard::new("q".into(), "long a".into(), "why".into(), options(), 1).unwrap();

        let right = card.check(OptionIndex::new(1).unwrap());
        assert!(right.correct);
        assert_eq!(right.answer, "long a");

        let wrong = card.check(OptionIndex::new(3).unwrap());
        assert!(!wrong.correct);
        assert_eq!(wrong.correct_option.get(), 1);
        assert_eq!(wrong.explanation, "why");
    }

    #[test]
    fn quiz_question_is_validated_like_flashcards() {
        assert!(QuizQuestion::new("q".into(), options(), 4, "e".into()).is_err());
        let q = QuizQuestion::new("q".into(), options(), 0, "e".into()).unwrap();
        assert_eq!(q.correct_text(), "a");
    }

    #[test]
    fn patch_overwrites_only_present_slots() {
        let mut outputs = GeneratedOutputs {
            summary: Some("old".into()),
            notes: Some("notes".into()),
            ..Default::default()
        };
        outputs.apply(OutputsPatch::summary("X"));
        assert_eq!(outputs.summary.as_deref(), Some("X"));
        assert_eq!(outputs.notes.as_deref(), Some("notes"));
        assert!(outputs.flashcards.is_none());
    }

    #[test]
    fn media_type_accepts_only_text_and_pdf() {
        assert_eq!(MediaType::from_mime("text/plain").unwrap(), MediaType::PlainText);
        assert_eq!(
            MediaType::from_mime("text/plain; charset=utf-8").unwrap(),
            MediaType::PlainText
        );
        assert_eq!(MediaType::from_mime("application/pdf").unwrap(), MediaType::Pdf);
        assert!(matches!(
            MediaType::from_mime("image/png"),
            Err(PortError::Unsupported(_))
        ));
    }
}
