use std::path::Path;

use prep_core::model::{Company, Difficulty, Question, QuestionId};
use serde::Deserialize;
use tracing::info;

use crate::error::PrepareError;

/// Log a progress line every this many questions.
const PROGRESS_EVERY: usize = 50;

#[derive(Debug, Deserialize)]
struct ScrapedPage {
    #[serde(default)]
    props: Option<ScrapedProps>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScrapedProps {
    #[serde(default)]
    page_props: Option<ScrapedPageProps>,
}

#[derive(Debug, Deserialize)]
struct ScrapedPageProps {
    #[serde(default)]
    items: Vec<RawQuestion>,
}

/// A question as it appears in the scraped listing page.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawQuestion {
    pub id: QuestionId,
    pub title: String,
    #[serde(default)]
    pub permalink: String,
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub companies: Option<Vec<Company>>,
    #[serde(default)]
    pub created_at: i64,
}

impl RawQuestion {
    #[must_use]
    pub fn into_question(self) -> Question {
        let difficulty = Difficulty::infer(&self.tags, &self.title);
        Question {
            permalink: self.permalink,
            tags: self.tags,
            likes: self.likes,
            companies: self.companies.unwrap_or_default(),
            created_at: self.created_at,
            ..Question::new(self.id, self.title, difficulty)
        }
    }
}

/// Counts reported after a preparation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrepareStats {
    pub total: usize,
    pub easy: usize,
    pub medium: usize,
    pub hard: usize,
    pub with_companies: usize,
}

impl PrepareStats {
    #[must_use]
    pub fn from_questions(questions: &[Question]) -> Self {
        let count = |difficulty: Difficulty| {
            questions
                .iter()
                .filter(|q| q.difficulty == difficulty)
                .count()
        };
        Self {
            total: questions.len(),
            easy: count(Difficulty::Easy),
            medium: count(Difficulty::Medium),
            hard: count(Difficulty::Hard),
            with_companies: questions.iter().filter(|q| !q.companies.is_empty()).count(),
        }
    }

    /// Share of `count` in the total, rounded to a whole percent.
    #[must_use]
    pub fn percent(&self, count: usize) -> u32 {
        if self.total == 0 {
            return 0;
        }
        let scaled = (count as f64 / self.total as f64) * 100.0;
        scaled.round() as u32
    }
}

/// Extract and normalise the questions embedded in a scraped page.
///
/// # Errors
///
/// Returns `PrepareError::Json` on malformed input and
/// `PrepareError::NoQuestions` if the page holds no items.
pub fn prepare_questions(raw_page: &str) -> Result<Vec<Question>, PrepareError> {
    let page: ScrapedPage = serde_json::from_str(raw_page)?;
    let items = page
        .props
        .and_then(|props| props.page_props)
        .map(|page_props| page_props.items)
        .unwrap_or_default();
    if items.is_empty() {
        return Err(PrepareError::NoQuestions);
    }

    let total = items.len();
    info!(total, "found scraped questions");

    let questions = items
        .into_iter()
        .enumerate()
        .map(|(index, raw)| {
            if (index + 1) % PROGRESS_EVERY == 0 {
                info!(processed = index + 1, total, "preparing questions");
            }
            raw.into_question()
        })
        .collect();
    Ok(questions)
}

/// Read the scraped page at `input`, write prepared questions to `output`.
///
/// # Errors
///
/// Returns `PrepareError::NoQuestions` when `input` is missing or empty,
/// and `PrepareError::Io` / `PrepareError::Json` on read, parse, or write failures.
pub async fn prepare_file(input: &Path, output: &Path) -> Result<PrepareStats, PrepareError> {
    let raw = match tokio::fs::read_to_string(input).await {
        Ok(raw) => raw,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(PrepareError::NoQuestions);
        }
        Err(source) => {
            return Err(PrepareError::Io {
                path: input.to_path_buf(),
                source,
            });
        }
    };

    let questions = prepare_questions(&raw)?;
    let json = serde_json::to_string_pretty(&questions)?;

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| PrepareError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
    }
    tokio::fs::write(output, json)
        .await
        .map_err(|source| PrepareError::Io {
            path: output.to_path_buf(),
            source,
        })?;

    let stats = PrepareStats::from_questions(&questions);
    info!(
        total = stats.total,
        easy = stats.easy,
        easy_pct = stats.percent(stats.easy),
        medium = stats.medium,
        medium_pct = stats.percent(stats.medium),
        hard = stats.hard,
        hard_pct = stats.percent(stats.hard),
        with_companies = stats.with_companies,
        output = %output.display(),
        "questions prepared"
    );
    Ok(stats)
}
