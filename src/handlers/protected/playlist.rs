use axum::extract::State;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::database::models::playlist::{NewPlaylist, PlaylistChanges};
use crate::database::models::Playlist;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, IdPath, JsonBody};
use crate::ownership::{authorize_mutation, found};
use crate::state::AppState;
use crate::validate::{parse_id, present, require_all, require_any, required};

#[derive(Debug, Default, Deserialize)]
pub struct PlaylistBody {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// POST /api/v1/playlist
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    JsonBody(body): JsonBody<PlaylistBody>,
) -> ApiResult<Playlist> {
    require_all(&[
        ("name", body.name.as_deref()),
        ("description", body.description.as_deref()),
    ])?;

    let playlist = state
        .store
        .insert_playlist(NewPlaylist {
            name: required("name", body.name)?,
            description: required("description", body.description)?,
            owner: user.user_id,
        })
        .await?;

    Ok(ApiResponse::created(playlist, "Playlist created successfully"))
}

/// GET /api/v1/playlist/user/:userId
pub async fn by_user(
    State(state): State<AppState>,
    _user: AuthUser,
    IdPath(user_id): IdPath<String>,
) -> ApiResult<Vec<Playlist>> {
    let owner = parse_id("userId", &user_id)?;
    let playlists = state.store.playlists_by_owner(owner).await?;
    Ok(ApiResponse::success(playlists, "Playlists fetched successfully"))
}

/// GET /api/v1/playlist/:playlistId
pub async fn get(
    State(state): State<AppState>,
    _user: AuthUser,
    IdPath(playlist_id): IdPath<String>,
) -> ApiResult<Playlist> {
    let id = parse_id("playlistId", &playlist_id)?;
    let playlist = found(state.store.find_playlist(id).await?)?;
    Ok(ApiResponse::success(playlist, "Playlist fetched successfully"))
}

/// PATCH /api/v1/playlist/:playlistId - absent fields keep their stored value
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    IdPath(playlist_id): IdPath<String>,
    JsonBody(body): JsonBody<PlaylistBody>,
) -> ApiResult<Playlist> {
    let id = parse_id("playlistId", &playlist_id)?;
    let changes = PlaylistChanges {
        name: present(body.name),
        description: present(body.description),
    };
    require_any(&[
        ("name", changes.name.is_some()),
        ("description", changes.description.is_some()),
    ])?;

    let playlist = found(state.store.find_playlist(id).await?)?;
    authorize_mutation(user.user_id, &playlist, "update")?;

    let updated = found(state.store.update_playlist(id, changes).await?)?;
    Ok(ApiResponse::success(updated, "Playlist updated successfully"))
}

/// DELETE /api/v1/playlist/:playlistId
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    IdPath(playlist_id): IdPath<String>,
) -> ApiResult<Value> {
    let id = parse_id("playlistId", &playlist_id)?;

    let playlist = found(state.store.find_playlist(id).await?)?;
    authorize_mutation(user.user_id, &playlist, "delete")?;

    if !state.store.delete_playlist(id).await? {
        return Err(ApiError::not_found("Playlist not found"));
    }
    tracing::info!(playlist = %id, "playlist deleted");
    Ok(ApiResponse::success(json!({}), "Playlist deleted successfully"))
}

/// PATCH /api/v1/playlist/add/:videoId/:playlistId
pub async fn add_video(
    State(state): State<AppState>,
    user: AuthUser,
    IdPath((video_id, playlist_id)): IdPath<(String, String)>,
) -> ApiResult<Playlist> {
    let video = parse_id("videoId", &video_id)?;
    let id = parse_id("playlistId", &playlist_id)?;

    let playlist = found(state.store.find_playlist(id).await?)?;
    authorize_mutation(user.user_id, &playlist, "add a video to")?;

    let updated = found(state.store.add_playlist_video(id, video).await?)?;
    Ok(ApiResponse::success(updated, "Video added to playlist successfully"))
}

/// PATCH /api/v1/playlist/remove/:videoId/:playlistId
pub async fn remove_video(
    State(state): State<AppState>,
    user: AuthUser,
    IdPath((video_id, playlist_id)): IdPath<(String, String)>,
) -> ApiResult<Playlist> {
    let video = parse_id("videoId", &video_id)?;
    let id = parse_id("playlistId", &playlist_id)?;

    let playlist = found(state.store.find_playlist(id).await?)?;
    authorize_mutation(user.user_id, &playlist, "remove a video from")?;

    let updated = found(state.store.remove_playlist_video(id, video).await?)?;
    Ok(ApiResponse::success(updated, "Video removed from playlist successfully"))
}
