use std::collections::BTreeSet;

use prep_core::model::{Difficulty, Question, QuestionId};
use prep_core::quiz::{QuizIntent, QuizSession, StoredQuiz};
use proptest::prelude::*;

fn questions(count: u64) -> Vec<Question> {
    (1..=count)
        .map(|id| Question::new(QuestionId::new(id), format!("Question {id}"), Difficulty::Easy))
        .collect()
}

/// Picker that replays a fixed list of raw choices, wrapping around.
fn replay(choices: Vec<usize>) -> impl FnMut(usize) -> usize {
    let mut cursor = 0;
    move |len| {
        let raw = choices.get(cursor % choices.len().max(1)).copied().unwrap_or(0);
        cursor += 1;
        raw % len
    }
}

fn intent_strategy() -> impl Strategy<Value = QuizIntent> {
    prop_oneof![
        4 => Just(QuizIntent::Next),
        2 => Just(QuizIntent::Previous),
        1 => (0usize..12).prop_map(QuizIntent::JumpTo),
    ]
}

fn assert_invariants(session: &QuizSession) {
    let history = session.history();
    if let Some(current) = session.current() {
        assert_eq!(history[session.history_index()], current);
    }
    if history.is_empty() {
        assert_eq!(session.history_index(), 0);
    } else {
        assert!(session.history_index() < history.len());
    }
    for id in history {
        assert!(session.seen().contains(id), "{id:?} in history but not seen");
    }
}

proptest! {
    #[test]
    fn seen_set_never_shrinks(
        count in 1u64..8,
        intents in prop::collection::vec(intent_strategy(), 0..40),
        choices in prop::collection::vec(0usize..100, 1..10),
    ) {
        let qs = questions(count);
        let mut picker = replay(choices);
        let mut session = QuizSession::initialize(&qs, StoredQuiz::default(), &mut picker);
        assert_invariants(&session);

        for intent in intents {
            let before: BTreeSet<QuestionId> = session.seen().clone();
            session = session.apply(intent, &qs, &mut picker);
            assert_invariants(&session);
            prop_assert!(session.seen().is_superset(&before));
        }
    }

    #[test]
    fn frontier_picks_are_always_unseen(
        count in 1u64..10,
        choices in prop::collection::vec(0usize..100, 1..10),
    ) {
        let qs = questions(count);
        let mut picker = replay(choices);
        let mut session = QuizSession::initialize(&qs, StoredQuiz::default(), &mut picker);

        while !session.is_complete(qs.len()) {
            let before = session.clone();
            session = session.go_next(&qs, &mut picker);
            let picked = *session.history().last().unwrap();
            prop_assert!(!before.seen().contains(&picked));
            prop_assert_eq!(session.history().len(), before.history().len() + 1);
        }

        prop_assert_eq!(session.history().len(), qs.len());
        let finished = session.clone();
        for _ in 0..3 {
            session = session.go_next(&qs, &mut picker);
            prop_assert_eq!(&session, &finished);
        }
    }

    #[test]
    fn back_then_forward_returns_to_same_entry(
        count in 2u64..10,
        steps in 1usize..10,
        back in 0usize..10,
    ) {
        let qs = questions(count);
        let mut picker = replay(vec![0]);
        let mut session = QuizSession::initialize(&qs, StoredQuiz::default(), &mut picker);
        for _ in 0..steps {
            session = session.go_next(&qs, &mut picker);
        }

        let start = session.clone();
        let back = back.min(start.history_index());
        for _ in 0..back {
            session = session.go_previous();
        }
        let mut never = |_len: usize| -> usize { panic!("replay should not pick") };
        for _ in 0..back {
            session = session.go_next(&qs, &mut never);
        }

        prop_assert_eq!(session, start);
    }

    #[test]
    fn reset_leaves_exactly_one_entry(
        count in 1u64..10,
        intents in prop::collection::vec(intent_strategy(), 0..20),
        choices in prop::collection::vec(0usize..100, 1..10),
    ) {
        let qs = questions(count);
        let mut picker = replay(choices);
        let mut session = QuizSession::initialize(&qs, StoredQuiz::default(), &mut picker);
        for intent in intents {
            session = session.apply(intent, &qs, &mut picker);
        }

        let reset = session.apply(QuizIntent::Reset, &qs, &mut picker);
        prop_assert_eq!(reset.seen().len(), 1);
        prop_assert_eq!(reset.history().len(), 1);
        prop_assert_eq!(reset.history_index(), 0);
        prop_assert!(reset.seen().contains(&reset.history()[0]));
        prop_assert_eq!(reset.current(), Some(reset.history()[0]));
    }
}

#[test]
fn stale_jump_leaves_state_identical() {
    let qs = questions(3);
    let mut picker = replay(vec![0]);
    let session = QuizSession::initialize(&qs, StoredQuiz::default(), &mut picker);
    let session = session.go_next(&qs, &mut picker);

    assert_eq!(session.history().len(), 2);
    assert_eq!(session.jump_to_history(5), session);
}
