#![forbid(unsafe_code)]

pub mod error;
pub mod prep;
pub mod quiz;

pub use prep_core::Clock;

pub use error::{AnswerClientError, GenerateError, PrepareError};
pub use prep::{AnswerGenerator, ChatCompletionsClient, GenerationConfig, GenerationPaths};
pub use quiz::{QuizPersistence, QuizService, QuizSnapshot, RandomPicker};
