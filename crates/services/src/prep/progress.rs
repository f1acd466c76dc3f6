use std::path::Path;

use prep_core::model::Question;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::GenerateError;
use crate::prep::pricing::{micro_to_usd, usd_to_micro};

/// Resumable state of an answer generation batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationProgress {
    pub results: Vec<Question>,
    pub last_processed_index: Option<usize>,
    pub total_cost_micro_usd: u64,
    pub timestamp: i64,
}

/// On-disk shape; `lastProcessedIndex` is -1 before the first question.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProgressFile {
    results: Vec<Question>,
    last_processed_index: i64,
    #[serde(default)]
    total_cost_usd: f64,
    #[serde(default)]
    timestamp: i64,
}

impl GenerationProgress {
    #[must_use]
    pub fn fresh(timestamp: i64) -> Self {
        Self {
            timestamp,
            ..Self::default()
        }
    }

    /// Index of the first question not yet processed.
    #[must_use]
    pub fn start_index(&self) -> usize {
        self.last_processed_index.map_or(0, |index| index + 1)
    }

    /// Read saved progress. A missing or unreadable file starts fresh.
    pub async fn load(path: &Path, now_millis: i64) -> Self {
        let raw = match tokio::fs::read_to_string(path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Self::fresh(now_millis);
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "could not read progress, starting fresh");
                return Self::fresh(now_millis);
            }
        };

        match serde_json::from_str::<ProgressFile>(&raw) {
            Ok(file) => file.into(),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "malformed progress file, starting fresh");
                Self::fresh(now_millis)
            }
        }
    }

    /// Write progress as pretty JSON, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns `GenerateError` if the file cannot be encoded or written.
    pub async fn save(&self, path: &Path) -> Result<(), GenerateError> {
        let json = serde_json::to_string_pretty(&ProgressFile::from(self))?;
        write_file(path, json).await
    }
}

impl From<ProgressFile> for GenerationProgress {
    fn from(file: ProgressFile) -> Self {
        Self {
            results: file.results,
            last_processed_index: usize::try_from(file.last_processed_index).ok(),
            total_cost_micro_usd: usd_to_micro(file.total_cost_usd),
            timestamp: file.timestamp,
        }
    }
}

impl From<&GenerationProgress> for ProgressFile {
    fn from(progress: &GenerationProgress) -> Self {
        Self {
            results: progress.results.clone(),
            last_processed_index: progress
                .last_processed_index
                .and_then(|index| i64::try_from(index).ok())
                .unwrap_or(-1),
            total_cost_usd: micro_to_usd(progress.total_cost_micro_usd),
            timestamp: progress.timestamp,
        }
    }
}

pub(crate) async fn write_file(path: &Path, contents: String) -> Result<(), GenerateError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| GenerateError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
    }
    tokio::fs::write(path, contents)
        .await
        .map_err(|source| GenerateError::Io {
            path: path.to_path_buf(),
            source,
        })
}
