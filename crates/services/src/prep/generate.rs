use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use prep_core::Clock;
use prep_core::model::Question;
use tracing::{error, info, warn};

use crate::error::{AnswerClientError, GenerateError};
use crate::prep::client::{AnswerClient, AnswerRequest, GeneratedAnswer};
use crate::prep::pricing::{Pricing, micro_to_usd, usd_to_micro};
use crate::prep::progress::{GenerationProgress, write_file};

const MIN_ANSWER_CHARS: usize = 50;
const REFUSAL_MARKERS: [&str; 2] = ["I cannot", "I apologize"];

/// Tunables for an answer generation batch.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationConfig {
    /// Attempts per question, including the first.
    pub max_retries: u32,
    /// Base back-off; attempt `n` waits `retry_delay * n`.
    pub retry_delay: Duration,
    /// Pause between consecutive API requests.
    pub request_delay: Duration,
    pub budget_micro_usd: u64,
    pub pricing: Pricing,
    /// Only process the first `limit` questions.
    pub limit: Option<usize>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_delay: Duration::from_secs(3),
            request_delay: Duration::from_millis(1_200),
            budget_micro_usd: usd_to_micro(3.0),
            pricing: Pricing::default(),
            limit: None,
        }
    }
}

impl GenerationConfig {
    #[must_use]
    pub fn with_budget_usd(mut self, usd: f64) -> Self {
        self.budget_micro_usd = usd_to_micro(usd);
        self
    }

    #[must_use]
    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit.filter(|&n| n > 0);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationPaths {
    pub input: PathBuf,
    pub output: PathBuf,
    pub progress: PathBuf,
}

impl Default for GenerationPaths {
    fn default() -> Self {
        Self {
            input: PathBuf::from("data/fe-questions.json"),
            output: PathBuf::from("data/fe-questions-with-answers.json"),
            progress: PathBuf::from("data/progress.json"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationReport {
    pub succeeded: usize,
    pub failed: usize,
    pub total: usize,
    pub cost_micro_usd: u64,
    pub budget_reached: bool,
}

impl GenerationReport {
    #[must_use]
    pub fn cost_usd(&self) -> f64 {
        micro_to_usd(self.cost_micro_usd)
    }
}

/// Reason a generated answer looks suspicious. Answers are kept regardless.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerIssue {
    TooShort,
    Refusal,
}

#[must_use]
pub fn validate_answer(text: &str) -> Option<AnswerIssue> {
    if text.chars().count() < MIN_ANSWER_CHARS {
        return Some(AnswerIssue::TooShort);
    }
    if REFUSAL_MARKERS.iter().any(|marker| text.contains(marker)) {
        return Some(AnswerIssue::Refusal);
    }
    None
}

/// Batch job that fills in answers for prepared questions.
#[derive(Clone)]
pub struct AnswerGenerator {
    client: Arc<dyn AnswerClient>,
    config: GenerationConfig,
    clock: Clock,
}

impl AnswerGenerator {
    #[must_use]
    pub fn new(client: Arc<dyn AnswerClient>, config: GenerationConfig) -> Self {
        Self {
            client,
            config,
            clock: Clock::System,
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Run (or resume) the batch described by `paths`.
    ///
    /// Individual question failures are logged and counted, never returned.
    ///
    /// # Errors
    ///
    /// Returns `GenerateError` if the input cannot be read or parsed, or if
    /// progress or results cannot be written.
    pub async fn run(&self, paths: &GenerationPaths) -> Result<GenerationReport, GenerateError> {
        let mut questions = read_questions(&paths.input).await?;
        if let Some(limit) = self.config.limit {
            info!(limit, "limiting batch");
            questions.truncate(limit);
        }
        let total = questions.len();

        let mut progress = GenerationProgress::load(&paths.progress, self.clock.now_millis()).await;
        let start = progress.start_index();
        if start > 0 {
            info!(
                resume_at = start + 1,
                total,
                done = progress.results.len(),
                cost_usd = micro_to_usd(progress.total_cost_micro_usd),
                "resuming answer generation"
            );
        }

        let mut succeeded = progress.results.len();
        let mut failed = 0;
        let mut budget_reached = false;
        let mut pending_delay = false;

        for (index, question) in questions.iter().enumerate().skip(start) {
            if progress.total_cost_micro_usd >= self.config.budget_micro_usd {
                warn!(
                    budget_usd = micro_to_usd(self.config.budget_micro_usd),
                    succeeded,
                    "budget reached, stopping"
                );
                budget_reached = true;
                break;
            }

            if question.has_answer() {
                progress.results.push(question.clone());
                succeeded += 1;
            } else {
                if pending_delay {
                    tokio::time::sleep(self.config.request_delay).await;
                }
                pending_delay = true;

                info!(
                    position = index + 1,
                    total,
                    id = %question.id,
                    title = %question.title,
                    "generating answer"
                );
                match self.generate_with_retry(question).await {
                    Ok(answer) => {
                        let cost = answer
                            .usage
                            .map_or(0, |usage| self.config.pricing.cost_micro_usd(usage));
                        progress.total_cost_micro_usd =
                            progress.total_cost_micro_usd.saturating_add(cost);
                        progress.results.push(self.answered(question, answer));
                        succeeded += 1;
                    }
                    Err(err) => {
                        error!(id = %question.id, error = %err, "skipping question");
                        failed += 1;
                    }
                }
            }

            progress.last_processed_index = Some(index);
            progress.timestamp = self.clock.now_millis();
            progress.save(&paths.progress).await?;
        }

        let json = serde_json::to_string_pretty(&progress.results)?;
        write_file(&paths.output, json).await?;
        if !budget_reached {
            remove_progress(&paths.progress).await?;
        }

        let report = GenerationReport {
            succeeded,
            failed,
            total,
            cost_micro_usd: progress.total_cost_micro_usd,
            budget_reached,
        };
        info!(
            succeeded = report.succeeded,
            failed = report.failed,
            total = report.total,
            cost_usd = report.cost_usd(),
            output = %paths.output.display(),
            "answer generation finished"
        );
        Ok(report)
    }

    async fn generate_with_retry(
        &self,
        question: &Question,
    ) -> Result<GeneratedAnswer, AnswerClientError> {
        let request = AnswerRequest::for_question(question);
        let mut attempt: u32 = 1;
        loop {
            match self.client.generate(&request).await {
                Ok(answer) => return Ok(answer),
                Err(AnswerClientError::Disabled) => return Err(AnswerClientError::Disabled),
                Err(err) if attempt < self.config.max_retries => {
                    let delay = self.config.retry_delay * attempt;
                    warn!(
                        id = %question.id,
                        attempt,
                        max = self.config.max_retries,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %err,
                        "answer request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn answered(&self, question: &Question, answer: GeneratedAnswer) -> Question {
        if let Some(issue) = validate_answer(&answer.text) {
            warn!(id = %question.id, ?issue, "answer failed validation, keeping it");
        }
        let now = self.clock.now_millis();
        Question {
            answer: Some(answer.text),
            ai_generated_at: Some(now),
            ai_model: Some(answer.model),
            completed: true,
            last_updated: Some(now),
            ..question.clone()
        }
    }
}

async fn read_questions(path: &Path) -> Result<Vec<Question>, GenerateError> {
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(GenerateError::MissingInput {
                path: path.to_path_buf(),
            });
        }
        Err(source) => {
            return Err(GenerateError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    Ok(serde_json::from_str(&raw)?)
}

async fn remove_progress(path: &Path) -> Result<(), GenerateError> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(GenerateError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}
