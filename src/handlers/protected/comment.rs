use axum::extract::State;
use serde::Deserialize;

use crate::database::models::{comment::NewComment, Comment};
use crate::middleware::{ApiResponse, ApiResult, AuthUser, IdPath, JsonBody};
use crate::ownership::{authorize_mutation, found};
use crate::state::AppState;
use crate::validate::{parse_id, required};

#[derive(Debug, Default, Deserialize)]
pub struct CommentBody {
    #[serde(default)]
    pub content: Option<String>,
}

/// POST /api/v1/comments/:videoId
pub async fn add(
    State(state): State<AppState>,
    user: AuthUser,
    IdPath(video_id): IdPath<String>,
    JsonBody(body): JsonBody<CommentBody>,
) -> ApiResult<Comment> {
    let video = parse_id("videoId", &video_id)?;
    let content = required("content", body.content)?;

    let comment = state
        .store
        .insert_comment(NewComment {
            content,
            video,
            owner: user.user_id,
        })
        .await?;

    Ok(ApiResponse::created(comment, "Comment created successfully"))
}

/// PATCH /api/v1/comments/comment/:commentId
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    IdPath(comment_id): IdPath<String>,
    JsonBody(body): JsonBody<CommentBody>,
) -> ApiResult<Comment> {
    let id = parse_id("commentId", &comment_id)?;
    let content = required("content", body.content)?;

    let comment = found(state.store.find_comment(id).await?)?;
    authorize_mutation(user.user_id, &comment, "update")?;

    let updated = found(state.store.update_comment(id, content).await?)?;
    Ok(ApiResponse::success(updated, "Comment updated successfully"))
}
