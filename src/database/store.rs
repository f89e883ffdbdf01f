use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::database::models::comment::NewComment;
use crate::database::models::playlist::{NewPlaylist, PlaylistChanges};
use crate::database::models::tweet::NewTweet;
use crate::database::models::video::{NewVideo, VideoChanges};
use crate::database::models::{Comment, Like, Playlist, Tweet, Video};
use crate::relation::Relation;

/// Errors from the document store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Store misconfigured: {0}")]
    Config(String),

    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Document store used by every handler.
///
/// Point lookups return `Ok(None)` for a missing record. Updates and deletes by
/// id return `Ok(None)` / `Ok(false)` when the record vanished between load and
/// write; handlers treat that as not found.
#[async_trait]
pub trait Store: Send + Sync {
    /// Check connectivity
    async fn health_check(&self) -> StoreResult<()>;

    // Videos
    async fn insert_video(&self, new: NewVideo) -> StoreResult<Video>;
    async fn find_video(&self, id: Uuid) -> StoreResult<Option<Video>>;
    async fn update_video(&self, id: Uuid, changes: VideoChanges) -> StoreResult<Option<Video>>;
    async fn delete_video(&self, id: Uuid) -> StoreResult<bool>;

    // Comments
    async fn insert_comment(&self, new: NewComment) -> StoreResult<Comment>;
    async fn find_comment(&self, id: Uuid) -> StoreResult<Option<Comment>>;
    async fn update_comment(&self, id: Uuid, content: String) -> StoreResult<Option<Comment>>;

    // Tweets
    async fn insert_tweet(&self, new: NewTweet) -> StoreResult<Tweet>;
    async fn find_tweet(&self, id: Uuid) -> StoreResult<Option<Tweet>>;
    async fn tweets_by_owner(&self, owner: Uuid) -> StoreResult<Vec<Tweet>>;
    async fn update_tweet(&self, id: Uuid, content: String) -> StoreResult<Option<Tweet>>;
    async fn delete_tweet(&self, id: Uuid) -> StoreResult<bool>;

    // Playlists
    async fn insert_playlist(&self, new: NewPlaylist) -> StoreResult<Playlist>;
    async fn find_playlist(&self, id: Uuid) -> StoreResult<Option<Playlist>>;
    async fn playlists_by_owner(&self, owner: Uuid) -> StoreResult<Vec<Playlist>>;
    async fn update_playlist(&self, id: Uuid, changes: PlaylistChanges) -> StoreResult<Option<Playlist>>;
    /// Appends `video` unless already present
    async fn add_playlist_video(&self, id: Uuid, video: Uuid) -> StoreResult<Option<Playlist>>;
    async fn remove_playlist_video(&self, id: Uuid, video: Uuid) -> StoreResult<Option<Playlist>>;
    async fn delete_playlist(&self, id: Uuid) -> StoreResult<bool>;

    // Relations (likes, subscriptions)

    /// Deletes the first record matching `relation` if one exists, otherwise
    /// creates one, as a single atomic step. Returns whether the relation is
    /// active afterwards.
    async fn toggle_relation(&self, relation: &Relation) -> StoreResult<bool>;
    async fn count_relations(&self, relation: &Relation) -> StoreResult<i64>;
    /// Like records of `actor` that target a video
    async fn liked_videos(&self, actor: Uuid) -> StoreResult<Vec<Like>>;
}
