use uuid::Uuid;

use crate::{
    models::{ActionType, NewActivityLog},
    repository::Repository,
};

/// log_activity
///
/// Records a club activity entry. Fire-and-forget from the caller's point of view:
/// a failed write is logged and swallowed, it never fails the action it describes.
pub async fn log_activity(
    repo: &dyn Repository,
    club_id: Uuid,
    user_id: Uuid,
    action_type: ActionType,
    description: impl Into<String>,
) {
    let entry = NewActivityLog {
        club_id,
        user_id,
        action_type,
        description: description.into(),
    };

    if let Err(e) = repo.insert_activity_log(entry).await {
        tracing::error!(
            %club_id,
            %user_id,
            action_type = action_type.as_str(),
            error = %e,
            "Activity log write failed"
        );
    }
}
