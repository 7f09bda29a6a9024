//! Error types for settings, suggestions and notification delivery

use std::path::PathBuf;

use thiserror::Error;

/// Failures of the key-value settings store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("settings file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("settings file is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("settings file must contain a JSON object")]
    NotAnObject,

    #[error("break interval must be a positive number of minutes, got {0}")]
    InvalidInterval(u32),
}

/// Failures while obtaining a break suggestion
#[derive(Debug, Error)]
pub enum SuggestionError {
    /// Resource missing, unreadable or malformed
    #[error("failed to load suggestions from {}: {reason}", path.display())]
    LoadFailure { path: PathBuf, reason: String },

    /// Resource parsed but contains no activities
    #[error("no suggestions found")]
    EmptySuggestions,
}

/// The host declined to show a notification
#[derive(Debug, Error)]
#[error("notification rejected: {0}")]
pub struct NotifyError(pub String);

/// Outcome of a failed BreakDue delivery. Logged and swallowed by the caller.
#[derive(Debug, Error)]
pub enum BreakError {
    #[error("suggestion unavailable: {0}")]
    SuggestionUnavailable(#[from] SuggestionError),

    #[error("notification display failure: {0}")]
    NotificationDisplayFailure(#[from] NotifyError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_failure_display() {
        let error = SuggestionError::LoadFailure {
            path: PathBuf::from("assets/activities.json"),
            reason: "not found".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "failed to load suggestions from assets/activities.json: not found"
        );
    }

    #[test]
    fn test_break_error_wraps_suggestion_error() {
        let error = BreakError::from(SuggestionError::EmptySuggestions);
        assert!(matches!(
            error,
            BreakError::SuggestionUnavailable(SuggestionError::EmptySuggestions)
        ));
        assert_eq!(error.to_string(), "suggestion unavailable: no suggestions found");
    }

    #[test]
    fn test_break_error_wraps_notify_error() {
        let error = BreakError::from(NotifyError("no notification daemon".to_string()));
        assert_eq!(
            error.to_string(),
            "notification display failure: notification rejected: no notification daemon"
        );
    }

    #[test]
    fn test_invalid_interval_display() {
        let error = StoreError::InvalidInterval(0);
        assert!(error.to_string().contains("got 0"));
    }
}
