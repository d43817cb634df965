//! crates/study_companion_core/src/quiz.rs
//!
//! Quiz shuffling, answer capture, and scoring.

use crate::domain::{OptionIndex, QuizQuestion, QuizResult, QuizResultEntry};
use crate::ports::{PortError, PortResult};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeMap;
use std::fmt::Write;

/// Applies a uniform random permutation (Fisher-Yates) to the question order.
/// Option order inside each question is left as is.
pub fn shuffle_questions<R: Rng + ?Sized>(questions: &mut [QuizQuestion], rng: &mut R) {
    questions.shuffle(rng);
}

/// Scores `questions` against the recorded answers, keyed by question index.
///
/// Unanswered questions count as incorrect and carry no selected answer.
/// Both partitions keep quiz order.
pub fn score(questions: &[QuizQuestion], answers: &BTreeMap<usize, OptionIndex>) -> QuizResult {
    let mut answered_correctly = Vec::new();
    let mut answered_incorrectly = Vec::new();

    for (index, question) in questions.iter().enumerate() {
        let selected_answer = answers.get(&index).copied();
        let entry = QuizResultEntry {
            question: question.clone(),
            selected_answer,
        };
        if selected_answer == Some(question.correct_answer) {
            answered_correctly.push(entry);
        } else {
            answered_incorrectly.push(entry);
        }
    }

    QuizResult {
        score: answered_correctly.len(),
        total: questions.len(),
        answered_correctly,
        answered_incorrectly,
    }
}

/// One user's pass through a quiz: the question order they see and what they picked.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizAttempt {
    questions: Vec<QuizQuestion>,
    answers: BTreeMap<usize, OptionIndex>,
}

impl QuizAttempt {
    /// Starts an attempt over `questions` in the order given.
    pub fn new(questions: Vec<QuizQuestion>) -> Self {
        Self {
            questions,
            answers: BTreeMap::new(),
        }
    }

    pub fn questions(&self) -> &[QuizQuestion] {
        &self.questions
    }

    pub fn answers(&self) -> &BTreeMap<usize, OptionIndex> {
        &self.answers
    }

    /// Records (or replaces) the selection for a question.
    pub fn answer(&mut self, question_index: usize, option: OptionIndex) -> PortResult<()> {
        if question_index >= self.questions.len() {
            return Err(PortError::InvalidInput(format!(
                "question {} does not exist in a quiz of {}",
                question_index,
                self.questions.len()
            )));
        }
        self.answers.insert(question_index, option);
        Ok(())
    }

    pub fn is_complete(&self) -> bool {
        !self.questions.is_empty() && self.answers.len() == self.questions.len()
    }

    /// Scores the attempt. Every question must have an answer first.
    pub fn submit(&self) -> PortResult<QuizResult> {
        if !self.is_complete() {
            return Err(PortError::InvalidInput(format!(
                "answer all {} questions before submitting ({} answered)",
                self.questions.len(),
                self.answers.len()
            )));
        }
        Ok(score(&self.questions, &self.answers))
    }

    /// Reshuffles the questions and clears every answer.
    pub fn restart<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        shuffle_questions(&mut self.questions, rng);
        self.answers.clear();
    }
}

impl QuizResult {
    /// Score as a whole-number percentage, rounded half up.
    pub fn percentage(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        (self.score as f64 / self.total as f64 * 100.0).round() as u32
    }

    /// Renders the plain-text results report offered as a download.
    pub fn report(&self) -> String {
        let mut out = String::new();
        let _ = write!(
            out,
            "Quiz Results\nScore: {}/{} ({}%)\n\n",
            self.score,
            self.total,
            self.percentage()
        );

        out.push_str("Correct Answers:\n");
        for (i, entry) in self.answered_correctly.iter().enumerate() {
            let q = &entry.question;
            let _ = write!(
                out,
                "{}. {}\n   Correct Answer: {}\n   Explanation: {}\n\n",
                i + 1,
                q.question,
                q.correct_text(),
                q.explanation
            );
        }

        out.push_str("Incorrect Answers:\n");
        for (i, entry) in self.answered_incorrectly.iter().enumerate() {
            let q = &entry.question;
            let selected = entry
                .selected_answer
                .map(|s| q.option_text(s))
                .unwrap_or("No answer");
            let _ = write!(
                out,
                "{}. {}\n   Your Answer: {}\n   Correct Answer: {}\n   Explanation: {}\n\n",
                i + 1,
                q.question,
                selected,
                q.correct_text(),
                q.explanation
            );
        }
        out
    }
}
