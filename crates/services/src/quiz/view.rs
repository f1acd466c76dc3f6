use prep_core::model::{Difficulty, Question, QuestionId};
use prep_core::quiz::QuizProgress;

/// One row of the history list shown beside the current question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub index: usize,
    pub id: QuestionId,
    pub title: String,
    pub difficulty: Difficulty,
    pub is_current: bool,
}

/// Everything the quiz view needs to render one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizSnapshot {
    pub current: Option<Question>,
    pub answer: Option<String>,
    pub progress: QuizProgress,
    pub history: Vec<HistoryEntry>,
}

impl QuizSnapshot {
    /// 1-based position within the history, if there is a current question.
    #[must_use]
    pub fn position(&self) -> Option<usize> {
        self.current
            .as_ref()
            .map(|_| self.progress.history_index + 1)
    }
}
