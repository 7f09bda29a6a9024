//! BreakDue handling: load suggestions, pick one, show the notification

use tracing::{debug, info};

use super::{
    error::BreakError,
    notifier::{BreakNotification, NotificationId, Notifier},
    suggestions::{pick_suggestion, SuggestionSource},
};

/// A break notification that was accepted by the notifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveredBreak {
    pub notification_id: NotificationId,
    pub suggestion: String,
}

/// Deliver one break reminder.
///
/// The suggestion list is loaded fresh on every call. Any failure is returned
/// to the caller, which logs it and keeps ticking.
pub async fn deliver_break(
    suggestions: &dyn SuggestionSource,
    notifier: &dyn Notifier,
    icon: &str,
) -> Result<DeliveredBreak, BreakError> {
    let activities = suggestions.load().await?;
    let suggestion = pick_suggestion(&activities, &mut rand::thread_rng())?.to_string();
    debug!("Picked suggestion {:?} out of {}", suggestion, activities.len());

    let notification = BreakNotification::new(icon, suggestion.clone());
    let notification_id = notifier.show(&notification).await?;

    info!("Break notification {} shown: {}", notification_id, suggestion);
    Ok(DeliveredBreak {
        notification_id,
        suggestion,
    })
}
