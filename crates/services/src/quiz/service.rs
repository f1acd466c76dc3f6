use std::sync::Arc;

use prep_core::model::{Question, QuestionId};
use prep_core::quiz::{Picker, QuizIntent, QuizProgress, QuizSession};
use storage::QuestionCatalog;
use tracing::debug;

use crate::quiz::persistence::QuizPersistence;
use crate::quiz::view::{HistoryEntry, QuizSnapshot};

/// Drives a `QuizSession` and persists whatever each transition changed.
///
/// Transitions are awaited one at a time; the write for a transition
/// completes before the next intent can be dispatched.
pub struct QuizService {
    catalog: Arc<QuestionCatalog>,
    persistence: QuizPersistence,
    picker: Box<dyn Picker + Send>,
    session: QuizSession,
}

impl QuizService {
    /// Load stored state and build the initial session. Nothing is written.
    pub async fn start<P>(
        catalog: Arc<QuestionCatalog>,
        persistence: QuizPersistence,
        picker: P,
    ) -> Self
    where
        P: Picker + Send + 'static,
    {
        let mut picker: Box<dyn Picker + Send> = Box::new(picker);
        let stored = persistence.load().await;
        let resumed = stored.resumes(catalog.questions());

        let session = QuizSession::initialize(catalog.questions(), stored, &mut *picker);
        if resumed {
            debug!(
                history = session.history().len(),
                seen = session.seen().len(),
                "resumed quiz session"
            );
        } else {
            debug!(
                current = ?session.current(),
                seen = session.seen().len(),
                total = catalog.len(),
                "started fresh quiz session"
            );
        }

        Self {
            catalog,
            persistence,
            picker,
            session,
        }
    }

    /// Apply an intent, then persist the collections it changed.
    pub async fn dispatch(&mut self, intent: QuizIntent) -> &QuizSession {
        let next = self
            .session
            .apply(intent, self.catalog.questions(), &mut *self.picker);

        let reset = intent == QuizIntent::Reset;
        if reset {
            self.persistence.clear().await;
        }
        self.persist(&next, reset).await;

        self.session = next;
        &self.session
    }

    pub async fn next(&mut self) -> &QuizSession {
        self.dispatch(QuizIntent::Next).await
    }

    pub async fn previous(&mut self) -> &QuizSession {
        self.dispatch(QuizIntent::Previous).await
    }

    pub async fn jump_to(&mut self, index: usize) -> &QuizSession {
        self.dispatch(QuizIntent::JumpTo(index)).await
    }

    pub async fn reset(&mut self) -> &QuizSession {
        self.dispatch(QuizIntent::Reset).await
    }

    /// Write the collections that differ from the current session.
    /// Empty collections are never written.
    async fn persist(&self, next: &QuizSession, force: bool) {
        if (force || next.seen() != self.session.seen()) && !next.seen().is_empty() {
            self.persistence.save_seen(next.seen()).await;
        }
        if (force || next.history() != self.session.history()) && !next.history().is_empty() {
            self.persistence.save_history(next.history()).await;
        }
    }

    #[must_use]
    pub fn session(&self) -> &QuizSession {
        &self.session
    }

    #[must_use]
    pub fn catalog(&self) -> &QuestionCatalog {
        &self.catalog
    }

    #[must_use]
    pub fn progress(&self) -> QuizProgress {
        self.session.progress(self.catalog.len())
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.session
            .current()
            .and_then(|id| self.catalog.get(id))
    }

    #[must_use]
    pub fn snapshot(&self) -> QuizSnapshot {
        let current_id = self.session.current();
        let history = self
            .session
            .history()
            .iter()
            .enumerate()
            .filter_map(|(index, &id)| self.history_entry(index, id))
            .collect();

        QuizSnapshot {
            current: self.current_question().cloned(),
            answer: current_id
                .and_then(|id| self.catalog.answer(id))
                .map(str::to_owned),
            progress: self.progress(),
            history,
        }
    }

    fn history_entry(&self, index: usize, id: QuestionId) -> Option<HistoryEntry> {
        let question = self.catalog.get(id)?;
        Some(HistoryEntry {
            index,
            id,
            title: question.title.clone(),
            difficulty: question.difficulty,
            is_current: index == self.session.history_index() && self.session.current().is_some(),
        })
    }
}
