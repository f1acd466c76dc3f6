use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use prep_core::model::{Difficulty, Question, QuestionId};
use prep_core::Clock;
use services::prep::{
    AnswerClient, AnswerRequest, GeneratedAnswer, GenerationProgress, TokenUsage,
};
use services::{AnswerClientError, AnswerGenerator, GenerateError, GenerationConfig, GenerationPaths};

const STAMP_MILLIS: i64 = 1_700_000_000_000;

const ANSWER: &str = "A thorough answer that easily clears the minimum length check.";

/// Scripted client: fails for prompts mentioning any of `failing`, answers otherwise.
#[derive(Default)]
struct StubClient {
    failing: Vec<String>,
    usage: Option<TokenUsage>,
    prompts: Mutex<Vec<String>>,
}

impl StubClient {
    fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl AnswerClient for StubClient {
    async fn generate(&self, request: &AnswerRequest) -> Result<GeneratedAnswer, AnswerClientError> {
        self.prompts.lock().unwrap().push(request.user_prompt.clone());
        if self.failing.iter().any(|title| request.user_prompt.contains(title.as_str())) {
            return Err(AnswerClientError::EmptyResponse);
        }
        Ok(GeneratedAnswer {
            text: ANSWER.to_owned(),
            model: "stub-model".to_owned(),
            usage: self.usage,
        })
    }
}

fn fast_config() -> GenerationConfig {
    GenerationConfig {
        max_retries: 2,
        retry_delay: Duration::ZERO,
        request_delay: Duration::ZERO,
        ..GenerationConfig::default()
    }
}

fn write_questions(dir: &std::path::Path, questions: &[Question]) -> GenerationPaths {
    let paths = GenerationPaths {
        input: dir.join("fe-questions.json"),
        output: dir.join("out").join("fe-questions-with-answers.json"),
        progress: dir.join("progress.json"),
    };
    std::fs::write(&paths.input, serde_json::to_string(questions).unwrap()).unwrap();
    paths
}

fn read_output(paths: &GenerationPaths) -> Vec<Question> {
    serde_json::from_str(&std::fs::read_to_string(&paths.output).unwrap()).unwrap()
}

fn question(id: u64, title: &str) -> Question {
    Question::new(QuestionId::new(id), title, Difficulty::Medium).with_tags("JavaScript")
}

#[tokio::test]
async fn answers_every_question_and_cleans_up() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_questions(
        dir.path(),
        &[
            question(1, "Explain closures"),
            question(2, "Event loop").with_answer("Kept as is."),
            question(3, "Promises"),
        ],
    );
    let client = Arc::new(StubClient {
        usage: Some(TokenUsage {
            prompt_tokens: 1_000,
            completion_tokens: 2_000,
        }),
        ..StubClient::default()
    });

    let report = AnswerGenerator::new(client.clone(), fast_config())
        .with_clock(Clock::at_millis(STAMP_MILLIS).unwrap())
        .run(&paths)
        .await
        .unwrap();

    assert_eq!(report.succeeded, 3);
    assert_eq!(report.failed, 0);
    assert_eq!(report.total, 3);
    assert_eq!(report.cost_micro_usd, 2 * 5_300);
    assert!(!report.budget_reached);
    assert_eq!(client.calls(), 2);
    assert!(!paths.progress.exists());

    let output = read_output(&paths);
    assert_eq!(output.len(), 3);
    let first = &output[0];
    assert_eq!(first.answer.as_deref(), Some(ANSWER));
    assert_eq!(first.ai_model.as_deref(), Some("stub-model"));
    assert_eq!(first.ai_generated_at, Some(STAMP_MILLIS));
    assert_eq!(first.last_updated, Some(STAMP_MILLIS));
    assert!(first.completed);
    assert_eq!(output[1].answer.as_deref(), Some("Kept as is."));
    assert_eq!(output[1].ai_model, None);
}

#[tokio::test]
async fn failing_question_is_retried_then_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_questions(
        dir.path(),
        &[question(1, "Broken one"), question(2, "Working one")],
    );
    let client = Arc::new(StubClient {
        failing: vec!["Broken one".to_owned()],
        ..StubClient::default()
    });

    let report = AnswerGenerator::new(client.clone(), fast_config())
        .run(&paths)
        .await
        .unwrap();

    assert_eq!(report.succeeded, 1);
    assert_eq!(report.failed, 1);
    assert_eq!(client.calls(), 3);

    let output = read_output(&paths);
    assert_eq!(output.len(), 1);
    assert_eq!(output[0].id, QuestionId::new(2));
}

#[tokio::test]
async fn budget_stops_batch_and_progress_resumes_it() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_questions(
        dir.path(),
        &[question(1, "First"), question(2, "Second"), question(3, "Third")],
    );
    // 1M prompt tokens at $0.30 per million.
    let usage = Some(TokenUsage {
        prompt_tokens: 1_000_000,
        completion_tokens: 0,
    });
    let client = Arc::new(StubClient {
        usage,
        ..StubClient::default()
    });

    let report = AnswerGenerator::new(client.clone(), fast_config().with_budget_usd(0.5))
        .run(&paths)
        .await
        .unwrap();

    assert!(report.budget_reached);
    assert_eq!(report.succeeded, 2);
    assert_eq!(report.cost_micro_usd, 600_000);
    assert_eq!(client.calls(), 2);

    let saved = GenerationProgress::load(&paths.progress, 0).await;
    assert_eq!(saved.last_processed_index, Some(1));
    assert_eq!(saved.start_index(), 2);
    assert_eq!(saved.results.len(), 2);

    let resumed_client = Arc::new(StubClient {
        usage,
        ..StubClient::default()
    });
    let report = AnswerGenerator::new(resumed_client.clone(), fast_config().with_budget_usd(10.0))
        .run(&paths)
        .await
        .unwrap();

    assert!(!report.budget_reached);
    assert_eq!(report.succeeded, 3);
    assert_eq!(report.cost_micro_usd, 900_000);
    assert_eq!(resumed_client.calls(), 1);
    assert!(resumed_client.prompts.lock().unwrap()[0].contains("Third"));
    assert_eq!(read_output(&paths).len(), 3);
    assert!(!paths.progress.exists());
}

#[tokio::test]
async fn limit_truncates_the_batch() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_questions(
        dir.path(),
        &[question(1, "One"), question(2, "Two"), question(3, "Three")],
    );
    let client = Arc::new(StubClient::default());

    let report = AnswerGenerator::new(client.clone(), fast_config().with_limit(Some(2)))
        .run(&paths)
        .await
        .unwrap();

    assert_eq!(report.total, 2);
    assert_eq!(client.calls(), 2);
    assert_eq!(report.cost_micro_usd, 0);
}

#[tokio::test]
async fn missing_input_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let paths = GenerationPaths {
        input: dir.path().join("absent.json"),
        output: dir.path().join("out.json"),
        progress: dir.path().join("progress.json"),
    };

    let err = AnswerGenerator::new(Arc::new(StubClient::default()), fast_config())
        .run(&paths)
        .await
        .unwrap_err();

    assert!(matches!(err, GenerateError::MissingInput { .. }));
    assert!(!paths.output.exists());
}
