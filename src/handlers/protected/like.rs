use axum::extract::State;
use serde_json::{json, Value};

use crate::database::models::Like;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, IdPath};
use crate::relation::{self, TargetKind, ToggleOutcome};
use crate::state::AppState;

/// POST /api/v1/likes/toggle/v/:videoId
pub async fn toggle_video(
    State(state): State<AppState>,
    user: AuthUser,
    IdPath(video_id): IdPath<String>,
) -> ApiResult<Value> {
    let outcome = relation::toggle(state.store.as_ref(), user.user_id, &video_id, TargetKind::Video).await?;
    Ok(like_response(outcome))
}

/// POST /api/v1/likes/toggle/t/:tweetId
pub async fn toggle_tweet(
    State(state): State<AppState>,
    user: AuthUser,
    IdPath(tweet_id): IdPath<String>,
) -> ApiResult<Value> {
    let outcome = relation::toggle(state.store.as_ref(), user.user_id, &tweet_id, TargetKind::Tweet).await?;
    Ok(like_response(outcome))
}

/// GET /api/v1/likes/videos
pub async fn liked_videos(State(state): State<AppState>, user: AuthUser) -> ApiResult<Vec<Like>> {
    let likes = state.store.liked_videos(user.user_id).await?;
    Ok(ApiResponse::success(likes, "Liked videos fetched successfully"))
}

fn like_response(outcome: ToggleOutcome) -> ApiResponse<Value> {
    let message = if outcome.is_active { "Like added" } else { "Like removed" };
    ApiResponse::success(json!({ "isLiked": outcome.is_active }), message)
}
