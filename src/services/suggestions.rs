//! Break activity suggestions

use std::path::PathBuf;

use async_trait::async_trait;
use rand::Rng;
use serde::Deserialize;
use tokio::fs;
use tracing::debug;

use super::error::SuggestionError;

/// Shape of the bundled suggestion resource
#[derive(Debug, Deserialize)]
struct ActivityList {
    activities: Vec<String>,
}

/// Something that can produce the current list of break activities
#[async_trait]
pub trait SuggestionSource: Send + Sync {
    async fn load(&self) -> Result<Vec<String>, SuggestionError>;
}

/// Reads `{ "activities": [...] }` from disk on every call
#[derive(Debug, Clone)]
pub struct FileSuggestions {
    path: PathBuf,
}

impl FileSuggestions {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn load_failure(&self, reason: impl ToString) -> SuggestionError {
        SuggestionError::LoadFailure {
            path: self.path.clone(),
            reason: reason.to_string(),
        }
    }
}

#[async_trait]
impl SuggestionSource for FileSuggestions {
    async fn load(&self) -> Result<Vec<String>, SuggestionError> {
        let contents = fs::read_to_string(&self.path)
            .await
            .map_err(|e| self.load_failure(e))?;

        let list: ActivityList =
            serde_json::from_str(&contents).map_err(|e| self.load_failure(e))?;

        debug!(
            "Loaded {} suggestions from {}",
            list.activities.len(),
            self.path.display()
        );
        Ok(list.activities)
    }
}

/// Pick one suggestion with an index drawn uniformly from `[0, len)`
pub fn pick_suggestion<'a, R: Rng + ?Sized>(
    suggestions: &'a [String],
    rng: &mut R,
) -> Result<&'a str, SuggestionError> {
    if suggestions.is_empty() {
        return Err(SuggestionError::EmptySuggestions);
    }
    let index = rng.gen_range(0..suggestions.len());
    Ok(suggestions[index].as_str())
}
