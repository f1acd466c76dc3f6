use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::ids::{CompanyId, QuestionId};

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("unknown difficulty: {0}")]
    UnknownDifficulty(String),
}

//
// ─── DIFFICULTY ───────────────────────────────────────────────────────────────
//

/// Coarse difficulty bucket shown next to each question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    /// Guess a difficulty from the tag string and title of a scraped question.
    ///
    /// Matching is case-insensitive. Easy keywords are checked first, then Hard ones;
    /// anything else lands in `Medium`.
    #[must_use]
    pub fn infer(tags: &str, title: &str) -> Self {
        let tags = tags.to_lowercase();
        let title = title.to_lowercase();

        let easy_tag = ["behavioral", "general"].iter().any(|k| tags.contains(k));
        let easy_title = ["what is", "explain", "difference between"]
            .iter()
            .any(|k| title.contains(k));
        if easy_tag || easy_title {
            return Self::Easy;
        }

        let hard_tag = ["system", "architecture", "design", "algorithm", "performance"]
            .iter()
            .any(|k| tags.contains(k));
        let hard_title = ["implement", "build", "design"]
            .iter()
            .any(|k| title.contains(k));
        if hard_tag || hard_title {
            return Self::Hard;
        }

        Self::Medium
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = QuestionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Easy" | "easy" => Ok(Self::Easy),
            "Medium" | "medium" => Ok(Self::Medium),
            "Hard" | "hard" => Ok(Self::Hard),
            other => Err(QuestionError::UnknownDifficulty(other.to_string())),
        }
    }
}

//
// ─── COMPANY ──────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub id: CompanyId,
    pub name: String,
    pub logo: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

//
// ─── QUESTION ─────────────────────────────────────────────────────────────────
//

/// A prepared interview question, optionally enriched with a generated answer.
///
/// Timestamps are epoch milliseconds, matching the JSON produced by the
/// preparation jobs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: QuestionId,
    pub title: String,
    #[serde(default)]
    pub permalink: String,
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub companies: Vec<Company>,
    #[serde(default)]
    pub created_at: i64,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub last_updated: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_generated_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_model: Option<String>,
}

impl Question {
    /// Minimal question with no answer, companies, or metadata.
    #[must_use]
    pub fn new(id: QuestionId, title: impl Into<String>, difficulty: Difficulty) -> Self {
        Self {
            id,
            title: title.into(),
            permalink: String::new(),
            tags: String::new(),
            likes: 0,
            companies: Vec::new(),
            created_at: 0,
            difficulty,
            answer: None,
            notes: None,
            completed: false,
            last_updated: None,
            ai_generated_at: None,
            ai_model: None,
        }
    }

    #[must_use]
    pub fn with_tags(mut self, tags: impl Into<String>) -> Self {
        self.tags = tags.into();
        self
    }

    #[must_use]
    pub fn with_answer(mut self, answer: impl Into<String>) -> Self {
        self.answer = Some(answer.into());
        self
    }

    /// Individual tags, split on commas with surrounding whitespace removed.
    #[must_use]
    pub fn tag_list(&self) -> Vec<&str> {
        self.tags
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .collect()
    }

    /// The answer text, treating an empty or whitespace-only answer as absent.
    #[must_use]
    pub fn answer_text(&self) -> Option<&str> {
        self.answer
            .as_deref()
            .filter(|answer| !answer.trim().is_empty())
    }

    #[must_use]
    pub fn has_answer(&self) -> bool {
        self.answer_text().is_some()
    }

    #[must_use]
    pub fn company_names(&self) -> Vec<&str> {
        self.companies.iter().map(|c| c.name.as_str()).collect()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
