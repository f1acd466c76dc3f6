use std::collections::{BTreeSet, HashSet};

use crate::model::{Question, QuestionId};
use crate::quiz::picker::Picker;
use crate::quiz::progress::QuizProgress;

//
// ─── INPUTS ───────────────────────────────────────────────────────────────────
//

/// Previously persisted quiz state, as read back from storage.
///
/// `None` means nothing was stored (or the stored value could not be parsed).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredQuiz {
    pub seen: Option<Vec<QuestionId>>,
    pub history: Option<Vec<QuestionId>>,
}

impl StoredQuiz {
    /// Whether `QuizSession::initialize` resumes this state over `questions`
    /// instead of starting fresh.
    #[must_use]
    pub fn resumes(&self, questions: &[Question]) -> bool {
        let known: HashSet<QuestionId> = questions.iter().map(|q| q.id).collect();
        self.resumes_in(&known)
    }

    fn resumes_in(&self, known: &HashSet<QuestionId>) -> bool {
        self.history
            .as_deref()
            .and_then(<[QuestionId]>::last)
            .is_some_and(|last| known.contains(last))
    }
}

/// A user intent dispatched by the quiz view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizIntent {
    Next,
    Previous,
    JumpTo(usize),
    Reset,
}

//
// ─── SESSION ──────────────────────────────────────────────────────────────────
//

/// Navigation state for one quiz run.
///
/// Invariants, upheld by every constructor and transition:
/// - `history[history_index] == current` whenever `current` is set.
/// - every id in `history` is also in `seen`.
/// - `history_index < history.len()` unless `history` is empty (then it is 0).
///
/// Transitions never mutate in place; they return the next session so the
/// caller can diff and persist what changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuizSession {
    current: Option<QuestionId>,
    seen: BTreeSet<QuestionId>,
    history: Vec<QuestionId>,
    history_index: usize,
}

impl QuizSession {
    /// Session with no current question, used when the question set is empty.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build the session shown when the quiz view mounts.
    ///
    /// Resumes when the last stored history entry is still in `questions`;
    /// stale ids earlier in that history are dropped. Otherwise the stored
    /// history is discarded and a one-entry session starts with a random
    /// unseen question.
    #[must_use]
    pub fn initialize<P: Picker + ?Sized>(
        questions: &[Question],
        stored: StoredQuiz,
        picker: &mut P,
    ) -> Self {
        let known: HashSet<QuestionId> = questions.iter().map(|q| q.id).collect();
        let resume = stored.resumes_in(&known);

        let mut seen: BTreeSet<QuestionId> = stored
            .seen
            .unwrap_or_default()
            .into_iter()
            .filter(|id| known.contains(id))
            .collect();

        if resume {
            let history: Vec<QuestionId> = stored
                .history
                .unwrap_or_default()
                .into_iter()
                .filter(|id| known.contains(id))
                .collect();
            seen.extend(history.iter().copied());
            return Self {
                current: history.last().copied(),
                seen,
                history_index: history.len().saturating_sub(1),
                history,
            };
        }

        let base = Self {
            seen,
            ..Self::default()
        };
        base.advance_to_unseen(questions, picker)
            .unwrap_or(base)
    }

    /// Start over: a one-entry session picked from the full question set.
    #[must_use]
    pub fn reset<P: Picker + ?Sized>(questions: &[Question], picker: &mut P) -> Self {
        Self::empty()
            .advance_to_unseen(questions, picker)
            .unwrap_or_default()
    }

    /// Apply a view intent. Invalid intents return an identical session.
    #[must_use]
    pub fn apply<P: Picker + ?Sized>(
        &self,
        intent: QuizIntent,
        questions: &[Question],
        picker: &mut P,
    ) -> Self {
        match intent {
            QuizIntent::Next => self.go_next(questions, picker),
            QuizIntent::Previous => self.go_previous(),
            QuizIntent::JumpTo(index) => self.jump_to_history(index),
            QuizIntent::Reset => Self::reset(questions, picker),
        }
    }

    /// Move forward: replay history if possible, else pick a new unseen question.
    ///
    /// At the frontier with every question seen this is a no-op.
    #[must_use]
    pub fn go_next<P: Picker + ?Sized>(&self, questions: &[Question], picker: &mut P) -> Self {
        if self.has_forward_history() {
            return self.at_index(self.history_index + 1);
        }
        self.advance_to_unseen(questions, picker)
            .unwrap_or_else(|| self.clone())
    }

    /// Step back one history entry; no-op at the first entry.
    #[must_use]
    pub fn go_previous(&self) -> Self {
        if self.history_index == 0 {
            return self.clone();
        }
        self.at_index(self.history_index - 1)
    }

    /// Jump to a history entry; out-of-range indexes are ignored.
    #[must_use]
    pub fn jump_to_history(&self, index: usize) -> Self {
        if index >= self.history.len() {
            return self.clone();
        }
        self.at_index(index)
    }

    /// Ids from `questions` (in order) that have not been shown yet.
    #[must_use]
    pub fn unseen_ids(&self, questions: &[Question]) -> Vec<QuestionId> {
        questions
            .iter()
            .map(|q| q.id)
            .filter(|id| !self.seen.contains(id))
            .collect()
    }

    fn advance_to_unseen<P: Picker + ?Sized>(
        &self,
        questions: &[Question],
        picker: &mut P,
    ) -> Option<Self> {
        let unseen = self.unseen_ids(questions);
        if unseen.is_empty() {
            return None;
        }
        let slot = picker.pick(unseen.len()).min(unseen.len() - 1);
        let id = unseen[slot];

        let mut next = self.clone();
        next.history.push(id);
        next.history_index = next.history.len() - 1;
        next.seen.insert(id);
        next.current = Some(id);
        Some(next)
    }

    fn at_index(&self, index: usize) -> Self {
        let mut next = self.clone();
        next.history_index = index;
        next.current = Some(self.history[index]);
        next
    }

    fn has_forward_history(&self) -> bool {
        self.history_index + 1 < self.history.len()
    }

    #[must_use]
    pub fn current(&self) -> Option<QuestionId> {
        self.current
    }

    #[must_use]
    pub fn seen(&self) -> &BTreeSet<QuestionId> {
        &self.seen
    }

    #[must_use]
    pub fn history(&self) -> &[QuestionId] {
        &self.history
    }

    #[must_use]
    pub fn history_index(&self) -> usize {
        self.history_index
    }

    /// True once every question in a set of `total` has been seen.
    #[must_use]
    pub fn is_complete(&self, total: usize) -> bool {
        self.seen.len() == total
    }

    #[must_use]
    pub fn can_go_previous(&self) -> bool {
        self.history_index > 0
    }

    #[must_use]
    pub fn can_go_next(&self, total: usize) -> bool {
        self.has_forward_history() || !self.is_complete(total)
    }

    /// Derived navigation flags for a question set of size `total`.
    #[must_use]
    pub fn progress(&self, total: usize) -> QuizProgress {
        QuizProgress {
            seen: self.seen.len(),
            total,
            history_len: self.history.len(),
            history_index: self.history_index,
            is_complete: self.is_complete(total),
            can_go_previous: self.can_go_previous(),
            can_go_next: self.can_go_next(total),
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
