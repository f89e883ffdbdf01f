use axum::extract::State;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::database::models::video::{NewVideo, VideoChanges};
use crate::database::models::Video;
use crate::error::ApiError;
use crate::handlers::upload::{with_staged_form, StagedForm};
use crate::media::{discard, upload_staged, ResourceKind};
use crate::middleware::{ApiResponse, ApiResult, AuthUser, IdPath, MultipartBody};
use crate::ownership::{authorize_mutation, found};
use crate::state::AppState;
use crate::validate::{parse_id, require_all, require_any};

/// POST /api/v1/videos (multipart: title, description, videoFile, thumbnail)
///
/// The record is only written once both files are hosted. A failed thumbnail
/// upload or insert discards whatever was already hosted.
pub async fn publish(
    State(state): State<AppState>,
    user: AuthUser,
    MultipartBody(multipart): MultipartBody,
) -> ApiResult<Video> {
    let temp_dir = state.config.media.temp_dir.clone();
    with_staged_form(multipart, &temp_dir, |form| publish_form(&state, &user, form)).await
}

async fn publish_form(state: &AppState, user: &AuthUser, mut form: StagedForm) -> ApiResult<Video> {
    let title = form.text("title");
    let description = form.text("description");
    require_all(&[
        ("title", title.as_deref()),
        ("description", description.as_deref()),
        ("videoFile", form.has_file("videoFile").then_some("file")),
        ("thumbnail", form.has_file("thumbnail").then_some("file")),
    ])?;

    let (Some(title), Some(description), Some(video_file), Some(thumbnail_file)) = (
        title,
        description,
        form.take_file("videoFile"),
        form.take_file("thumbnail"),
    ) else {
        return Err(ApiError::validation_error("videoFile is required", None));
    };

    let media = state.media.as_ref();
    let video_asset = upload_staged(media, video_file.path()).await?;
    let thumbnail_asset = match upload_staged(media, thumbnail_file.path()).await {
        Ok(asset) => asset,
        Err(e) => {
            discard(media, &video_asset.url, ResourceKind::Video).await;
            return Err(e.into());
        }
    };

    let new = NewVideo {
        video_file: video_asset.url.clone(),
        thumbnail: thumbnail_asset.url.clone(),
        title,
        description,
        duration: video_asset.duration.unwrap_or_default(),
        owner: user.user_id,
    };
    let video = match state.store.insert_video(new).await {
        Ok(video) => video,
        Err(e) => {
            futures::join!(
                discard(media, &video_asset.url, ResourceKind::Video),
                discard(media, &thumbnail_asset.url, ResourceKind::Image)
            );
            return Err(e.into());
        }
    };

    tracing::info!(video = %video.id, owner = %video.owner, "video published");
    Ok(ApiResponse::created(video, "Video published successfully"))
}

/// GET /api/v1/videos/:videoId
pub async fn get(
    State(state): State<AppState>,
    _user: AuthUser,
    IdPath(video_id): IdPath<String>,
) -> ApiResult<Video> {
    let id = parse_id("videoId", &video_id)?;
    let video = found(state.store.find_video(id).await?)?;
    Ok(ApiResponse::success(video, "Video fetched successfully"))
}

/// PATCH /api/v1/videos/:videoId (multipart: title?, description?, thumbnail?)
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    IdPath(video_id): IdPath<String>,
    MultipartBody(multipart): MultipartBody,
) -> ApiResult<Video> {
    let id = parse_id("videoId", &video_id)?;
    let temp_dir = state.config.media.temp_dir.clone();
    with_staged_form(multipart, &temp_dir, |form| update_form(&state, &user, id, form)).await
}

async fn update_form(state: &AppState, user: &AuthUser, id: Uuid, mut form: StagedForm) -> ApiResult<Video> {
    let title = form.text("title");
    let description = form.text("description");
    let thumbnail_file = form.take_file("thumbnail");
    require_any(&[
        ("title", title.is_some()),
        ("description", description.is_some()),
        ("thumbnail", thumbnail_file.is_some()),
    ])?;

    let video = found(state.store.find_video(id).await?)?;
    authorize_mutation(user.user_id, &video, "update")?;

    let media = state.media.as_ref();
    let new_thumbnail = match &thumbnail_file {
        Some(file) => Some(upload_staged(media, file.path()).await?),
        None => None,
    };

    let changes = VideoChanges {
        title,
        description,
        thumbnail: new_thumbnail.as_ref().map(|asset| asset.url.clone()),
        is_published: None,
    };
    let updated = match state.store.update_video(id, changes).await {
        Ok(Some(updated)) => updated,
        result => {
            if let Some(asset) = &new_thumbnail {
                discard(media, &asset.url, ResourceKind::Image).await;
            }
            return Err(match result {
                Err(e) => e.into(),
                _ => ApiError::not_found("Video not found"),
            });
        }
    };

    if new_thumbnail.is_some() {
        discard(media, &video.thumbnail, ResourceKind::Image).await;
    }
    Ok(ApiResponse::success(updated, "Video updated successfully"))
}

/// DELETE /api/v1/videos/:videoId
///
/// The record goes first; hosted files are then discarded best effort.
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    IdPath(video_id): IdPath<String>,
) -> ApiResult<Value> {
    let id = parse_id("videoId", &video_id)?;

    let video = found(state.store.find_video(id).await?)?;
    authorize_mutation(user.user_id, &video, "delete")?;

    if !state.store.delete_video(id).await? {
        return Err(ApiError::not_found("Video not found"));
    }

    let media = state.media.as_ref();
    futures::join!(
        discard(media, &video.video_file, ResourceKind::Video),
        discard(media, &video.thumbnail, ResourceKind::Image)
    );

    tracing::info!(video = %id, "video deleted");
    Ok(ApiResponse::success(json!({}), "Video deleted successfully"))
}

/// PATCH /api/v1/videos/toggle/publish/:videoId
pub async fn toggle_publish(
    State(state): State<AppState>,
    user: AuthUser,
    IdPath(video_id): IdPath<String>,
) -> ApiResult<Value> {
    let id = parse_id("videoId", &video_id)?;

    let video = found(state.store.find_video(id).await?)?;
    authorize_mutation(user.user_id, &video, "update")?;

    let changes = VideoChanges {
        is_published: Some(!video.is_published),
        ..Default::default()
    };
    let updated = found(state.store.update_video(id, changes).await?)?;

    let message = if updated.is_published {
        "Video published"
    } else {
        "Video unpublished"
    };
    Ok(ApiResponse::success(json!({ "isPublished": updated.is_published }), message))
}
