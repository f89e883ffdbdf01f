use axum::extract::State;
use serde_json::{json, Value};

use crate::middleware::{ApiResponse, ApiResult, AuthUser, IdPath};
use crate::relation::{self, TargetKind};
use crate::state::AppState;

/// POST /api/v1/subscriptions/channel/:channelId
///
/// Channels are users; the channel id is never looked up.
pub async fn toggle(
    State(state): State<AppState>,
    user: AuthUser,
    IdPath(channel_id): IdPath<String>,
) -> ApiResult<Value> {
    let outcome =
        relation::toggle(state.store.as_ref(), user.user_id, &channel_id, TargetKind::Channel).await?;

    let message = if outcome.is_active {
        "Subscription added"
    } else {
        "Subscription removed"
    };
    Ok(ApiResponse::success(json!({ "isSubscribed": outcome.is_active }), message))
}
