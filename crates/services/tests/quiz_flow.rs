use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use prep_core::model::{Difficulty, Question, QuestionId};
use prep_core::quiz::FirstPicker;
use services::quiz::{HISTORY_KEY, SEEN_QUESTIONS_KEY};
use services::{QuizPersistence, QuizService, RandomPicker};
use storage::repository::{InMemoryStore, KeyValueStore, Storage, StorageError};
use storage::QuestionCatalog;

fn catalog(ids: &[u64]) -> Arc<QuestionCatalog> {
    let questions = ids
        .iter()
        .map(|&id| {
            let question = Question::new(QuestionId::new(id), format!("Question {id}"), Difficulty::Medium);
            if id == 2 {
                question.with_answer("Two is answered.")
            } else {
                question
            }
        })
        .collect();
    Arc::new(QuestionCatalog::new(questions).unwrap())
}

fn qid(id: u64) -> QuestionId {
    QuestionId::new(id)
}

/// Session-scope double that records writes and can refuse them.
#[derive(Default)]
struct RecordingStore {
    inner: InMemoryStore,
    writes: Mutex<Vec<String>>,
    full: bool,
}

impl RecordingStore {
    fn full() -> Self {
        Self {
            full: true,
            ..Self::default()
        }
    }

    fn writes(&self) -> Vec<String> {
        self.writes.lock().unwrap().clone()
    }
}

#[async_trait]
impl KeyValueStore for RecordingStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.writes.lock().unwrap().push(key.to_owned());
        if self.full {
            return Err(StorageError::QuotaExceeded { key: key.to_owned() });
        }
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.inner.remove(key).await
    }
}

async fn stored_ids(store: &dyn KeyValueStore, key: &str) -> Option<Vec<u64>> {
    let raw = store.get(key).await.unwrap()?;
    Some(serde_json::from_str(&raw).unwrap())
}

#[tokio::test]
async fn fresh_run_walks_every_question_once() {
    let storage = Storage::in_memory();
    let qs = catalog(&[1, 2, 3]);
    let mut quiz = QuizService::start(qs, QuizPersistence::new(storage.clone()), RandomPicker::seeded(3)).await;

    let first = quiz.session().current().unwrap();
    assert!([qid(1), qid(2), qid(3)].contains(&first));
    assert_eq!(quiz.session().history(), &[first]);
    assert_eq!(quiz.session().seen(), &BTreeSet::from([first]));
    // Loading never writes back.
    assert_eq!(storage.durable.get(SEEN_QUESTIONS_KEY).await.unwrap(), None);
    assert_eq!(storage.session.get(HISTORY_KEY).await.unwrap(), None);

    quiz.next().await;
    quiz.next().await;
    let progress = quiz.progress();
    assert_eq!(quiz.session().history().len(), 3);
    assert_eq!(progress.seen, 3);
    assert!(progress.is_complete);
    assert!(!progress.can_go_next);
    assert!(progress.can_go_previous);

    let finished = quiz.session().clone();
    quiz.next().await;
    assert_eq!(quiz.session(), &finished);

    let history: Vec<u64> = finished.history().iter().map(|id| id.value()).collect();
    assert_eq!(stored_ids(storage.session.as_ref(), HISTORY_KEY).await, Some(history));
    assert_eq!(
        stored_ids(storage.durable.as_ref(), SEEN_QUESTIONS_KEY).await,
        Some(vec![1, 2, 3])
    );
}

#[tokio::test]
async fn resumes_at_last_history_entry() {
    let storage = Storage::in_memory();
    storage.durable.set(SEEN_QUESTIONS_KEY, "[1]").await.unwrap();
    storage.session.set(HISTORY_KEY, "[3,99,1]").await.unwrap();

    let never = |_len: usize| -> usize { panic!("resume should not pick") };
    let mut quiz = QuizService::start(catalog(&[1, 2, 3]), QuizPersistence::new(storage.clone()), never).await;

    let session = quiz.session();
    assert_eq!(session.current(), Some(qid(1)));
    assert_eq!(session.history(), &[qid(3), qid(1)]);
    assert_eq!(session.history_index(), 1);
    assert_eq!(session.seen(), &BTreeSet::from([qid(1), qid(3)]));
    assert!(!quiz.progress().is_complete);

    quiz.previous().await;
    assert_eq!(quiz.session().current(), Some(qid(3)));
    quiz.next().await;
    assert_eq!(quiz.session().current(), Some(qid(1)));
}

#[tokio::test]
async fn stale_last_history_entry_starts_fresh_without_writing() {
    let session_store = Arc::new(RecordingStore::default());
    let storage = Storage::new(Arc::new(InMemoryStore::new()), session_store.clone());
    storage.durable.set(SEEN_QUESTIONS_KEY, "[1]").await.unwrap();
    storage.session.set(HISTORY_KEY, "[1,99]").await.unwrap();
    let recorded_before = session_store.writes().len();

    let quiz = QuizService::start(catalog(&[1, 2, 3]), QuizPersistence::new(storage), FirstPicker).await;

    let session = quiz.session();
    assert_eq!(session.history(), &[qid(2)]);
    assert_eq!(session.history_index(), 0);
    assert_eq!(session.current(), Some(qid(2)));
    assert_eq!(session.seen(), &BTreeSet::from([qid(1), qid(2)]));
    assert_eq!(session_store.writes().len(), recorded_before);
}

#[tokio::test]
async fn navigation_within_history_does_not_write() {
    let session_store = Arc::new(RecordingStore::default());
    let storage = Storage::new(Arc::new(InMemoryStore::new()), session_store.clone());
    let mut quiz = QuizService::start(catalog(&[1, 2, 3]), QuizPersistence::new(storage), FirstPicker).await;

    quiz.next().await;
    assert_eq!(session_store.writes(), vec![HISTORY_KEY.to_owned()]);

    quiz.previous().await;
    quiz.previous().await;
    quiz.jump_to(1).await;
    quiz.jump_to(7).await;
    quiz.next().await;
    assert_eq!(quiz.session().history_index(), 2);
    assert_eq!(session_store.writes().len(), 2);
}

#[tokio::test]
async fn reset_clears_storage_and_starts_over() {
    let storage = Storage::in_memory();
    let mut quiz = QuizService::start(catalog(&[1, 2, 3]), QuizPersistence::new(storage.clone()), FirstPicker).await;
    quiz.next().await;
    quiz.next().await;
    assert!(quiz.progress().is_complete);

    quiz.reset().await;

    let session = quiz.session().clone();
    assert_eq!(session.history(), &[qid(1)]);
    assert_eq!(session.seen(), &BTreeSet::from([qid(1)]));
    assert_eq!(session.history_index(), 0);
    assert_eq!(stored_ids(storage.session.as_ref(), HISTORY_KEY).await, Some(vec![1]));
    assert_eq!(
        stored_ids(storage.durable.as_ref(), SEEN_QUESTIONS_KEY).await,
        Some(vec![1])
    );
}

#[tokio::test]
async fn write_failures_leave_memory_authoritative() {
    let durable = Arc::new(RecordingStore::full());
    let session = Arc::new(RecordingStore::full());
    let storage = Storage::new(durable.clone(), session.clone());
    let mut quiz = QuizService::start(catalog(&[1, 2, 3]), QuizPersistence::new(storage), FirstPicker).await;

    quiz.next().await;
    quiz.next().await;

    assert!(quiz.progress().is_complete);
    assert_eq!(quiz.session().history().len(), 3);
    assert_eq!(durable.writes().len(), 2);
    assert_eq!(durable.get(SEEN_QUESTIONS_KEY).await.unwrap(), None);
}

#[tokio::test]
async fn snapshot_reports_answer_and_history() {
    let mut quiz = QuizService::start(
        catalog(&[1, 2, 3]),
        QuizPersistence::new(Storage::in_memory()),
        FirstPicker,
    )
    .await;
    quiz.next().await;

    let snapshot = quiz.snapshot();
    assert_eq!(snapshot.current.as_ref().map(|q| q.id), Some(qid(2)));
    assert_eq!(snapshot.answer.as_deref(), Some("Two is answered."));
    assert_eq!(snapshot.position(), Some(2));
    assert_eq!(snapshot.progress.remaining(), 1);

    let current: Vec<bool> = snapshot.history.iter().map(|e| e.is_current).collect();
    assert_eq!(current, vec![false, true]);
    assert_eq!(snapshot.history[0].title, "Question 1");

    quiz.previous().await;
    let snapshot = quiz.snapshot();
    assert_eq!(snapshot.answer, None);
    assert!(snapshot.history[0].is_current);
}

#[tokio::test]
async fn empty_catalog_has_no_current_question() {
    let quiz = QuizService::start(
        catalog(&[]),
        QuizPersistence::new(Storage::in_memory()),
        FirstPicker,
    )
    .await;

    let snapshot = quiz.snapshot();
    assert!(snapshot.current.is_none());
    assert_eq!(snapshot.position(), None);
    assert!(snapshot.progress.is_complete);
    assert!(!snapshot.progress.can_go_next);
}
