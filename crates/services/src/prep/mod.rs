//! Offline jobs that build the question data the quiz reads.

pub mod client;
pub mod generate;
pub mod prepare;
pub mod pricing;
pub mod progress;
pub mod prompts;

pub use client::{
    AnswerClient, AnswerRequest, ChatCompletionsClient, ChatCompletionsConfig, GeneratedAnswer,
    TokenUsage,
};
pub use generate::{
    AnswerGenerator, AnswerIssue, GenerationConfig, GenerationPaths, GenerationReport,
    validate_answer,
};
pub use prepare::{PrepareStats, RawQuestion, prepare_file, prepare_questions};
pub use pricing::Pricing;
pub use progress::GenerationProgress;
