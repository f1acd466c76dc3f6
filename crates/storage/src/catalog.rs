//! Read-only question store loaded once from the prepared JSON files.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use prep_core::model::{Question, QuestionId};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid question JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("duplicate question id {0}")]
    DuplicateId(QuestionId),
}

/// Ordered question list plus an id → answer lookup.
#[derive(Debug, Clone, Default)]
pub struct QuestionCatalog {
    questions: Vec<Question>,
    index: HashMap<QuestionId, usize>,
    answers: HashMap<QuestionId, String>,
}

impl QuestionCatalog {
    /// Build a catalog from already-parsed questions.
    ///
    /// Questions that carry a non-blank answer populate the answer lookup.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::DuplicateId` if two questions share an id.
    pub fn new(questions: Vec<Question>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(questions.len());
        let mut answers = HashMap::new();
        for (pos, question) in questions.iter().enumerate() {
            if index.insert(question.id, pos).is_some() {
                return Err(CatalogError::DuplicateId(question.id));
            }
            if let Some(answer) = question.answer_text() {
                answers.insert(question.id, answer.to_owned());
            }
        }
        Ok(Self {
            questions,
            index,
            answers,
        })
    }

    /// Parse the prepared question list and, optionally, the answered list.
    ///
    /// Answers are matched by id and attached to questions that have none.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` on malformed JSON or duplicate ids.
    pub fn from_json(questions_json: &str, answers_json: Option<&str>) -> Result<Self, CatalogError> {
        let mut questions: Vec<Question> = serde_json::from_str(questions_json)?;

        if let Some(raw) = answers_json {
            let answered: Vec<Question> = serde_json::from_str(raw)?;
            let by_id: HashMap<QuestionId, Question> = answered
                .into_iter()
                .filter(Question::has_answer)
                .map(|q| (q.id, q))
                .collect();

            for question in &mut questions {
                if question.has_answer() {
                    continue;
                }
                if let Some(source) = by_id.get(&question.id) {
                    question.answer.clone_from(&source.answer);
                    question.ai_generated_at = source.ai_generated_at;
                    question.ai_model.clone_from(&source.ai_model);
                }
            }
        }

        Self::new(questions)
    }

    /// Load the catalog from disk. A missing answers file is treated as "no answers yet".
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the questions file cannot be read or parsed.
    pub fn load(questions_path: &Path, answers_path: Option<&Path>) -> Result<Self, CatalogError> {
        let questions_json = read(questions_path)?;
        let answers_json = match answers_path {
            Some(path) if path.exists() => Some(read(path)?),
            Some(path) => {
                debug!(path = %path.display(), "answers file not found, continuing without answers");
                None
            }
            None => None,
        };
        let catalog = Self::from_json(&questions_json, answers_json.as_deref())?;
        debug!(
            questions = catalog.len(),
            answers = catalog.answers.len(),
            "question catalog loaded"
        );
        Ok(catalog)
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn get(&self, id: QuestionId) -> Option<&Question> {
        self.index.get(&id).map(|&pos| &self.questions[pos])
    }

    #[must_use]
    pub fn answer(&self, id: QuestionId) -> Option<&str> {
        self.answers.get(&id).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[must_use]
    pub fn into_questions(self) -> Vec<Question> {
        self.questions
    }
}

fn read(path: &Path) -> Result<String, CatalogError> {
    std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })
}
