use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::comment::NewComment;
use crate::database::models::playlist::{NewPlaylist, PlaylistChanges};
use crate::database::models::tweet::NewTweet;
use crate::database::models::video::{NewVideo, VideoChanges};
use crate::database::models::{Comment, Like, Playlist, Tweet, Video};
use crate::database::store::{Store, StoreError, StoreResult};
use crate::relation::{Relation, TargetKind};

/// Postgres-backed store. Each record type lives in its own table; see `migrations/`.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// (table, actor column, target column) holding relations of `kind`
    fn relation_columns(kind: TargetKind) -> (&'static str, &'static str, &'static str) {
        match kind {
            TargetKind::Video => ("likes", "liked_by", "video"),
            TargetKind::Tweet => ("likes", "liked_by", "tweet"),
            TargetKind::Channel => ("subscriptions", "subscriber", "channel"),
        }
    }

    /// Advisory lock key shared by every toggle of the same relation
    fn relation_lock_key(relation: &Relation) -> String {
        let (table, _, target_col) = Self::relation_columns(relation.kind);
        format!("{}:{}:{}:{}", table, target_col, relation.actor, relation.target)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn health_check(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(())
    }

    async fn insert_video(&self, new: NewVideo) -> StoreResult<Video> {
        let video = sqlx::query_as::<_, Video>(
            "INSERT INTO videos (id, video_file, thumbnail, title, description, duration, owner)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&new.video_file)
        .bind(&new.thumbnail)
        .bind(&new.title)
        .bind(&new.description)
        .bind(new.duration)
        .bind(new.owner)
        .fetch_one(&self.pool)
        .await?;
        Ok(video)
    }

    async fn find_video(&self, id: Uuid) -> StoreResult<Option<Video>> {
        let video = sqlx::query_as::<_, Video>("SELECT * FROM videos WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(video)
    }

    async fn update_video(&self, id: Uuid, changes: VideoChanges) -> StoreResult<Option<Video>> {
        let video = sqlx::query_as::<_, Video>(
            "UPDATE videos SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                thumbnail = COALESCE($4, thumbnail),
                is_published = COALESCE($5, is_published),
                updated_at = now()
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(changes.title)
        .bind(changes.description)
        .bind(changes.thumbnail)
        .bind(changes.is_published)
        .fetch_optional(&self.pool)
        .await?;
        Ok(video)
    }

    async fn delete_video(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM videos WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_comment(&self, new: NewComment) -> StoreResult<Comment> {
        let comment = sqlx::query_as::<_, Comment>(
            "INSERT INTO comments (id, content, video, owner) VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&new.content)
        .bind(new.video)
        .bind(new.owner)
        .fetch_one(&self.pool)
        .await?;
        Ok(comment)
    }

    async fn find_comment(&self, id: Uuid) -> StoreResult<Option<Comment>> {
        let comment = sqlx::query_as::<_, Comment>("SELECT * FROM comments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(comment)
    }

    async fn update_comment(&self, id: Uuid, content: String) -> StoreResult<Option<Comment>> {
        let comment = sqlx::query_as::<_, Comment>(
            "UPDATE comments SET content = $2, updated_at = now() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(content)
        .fetch_optional(&self.pool)
        .await?;
        Ok(comment)
    }

    async fn insert_tweet(&self, new: NewTweet) -> StoreResult<Tweet> {
        let tweet = sqlx::query_as::<_, Tweet>(
            "INSERT INTO tweets (id, content, owner) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&new.content)
        .bind(new.owner)
        .fetch_one(&self.pool)
        .await?;
        Ok(tweet)
    }

    async fn find_tweet(&self, id: Uuid) -> StoreResult<Option<Tweet>> {
        let tweet = sqlx::query_as::<_, Tweet>("SELECT * FROM tweets WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(tweet)
    }

    async fn tweets_by_owner(&self, owner: Uuid) -> StoreResult<Vec<Tweet>> {
        let tweets = sqlx::query_as::<_, Tweet>("SELECT * FROM tweets WHERE owner = $1 ORDER BY created_at")
            .bind(owner)
            .fetch_all(&self.pool)
            .await?;
        Ok(tweets)
    }

    async fn update_tweet(&self, id: Uuid, content: String) -> StoreResult<Option<Tweet>> {
        let tweet = sqlx::query_as::<_, Tweet>(
            "UPDATE tweets SET content = $2, updated_at = now() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(content)
        .fetch_optional(&self.pool)
        .await?;
        Ok(tweet)
    }

    async fn delete_tweet(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM tweets WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_playlist(&self, new: NewPlaylist) -> StoreResult<Playlist> {
        let playlist = sqlx::query_as::<_, Playlist>(
            "INSERT INTO playlists (id, name, description, owner) VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&new.name)
        .bind(&new.description)
        .bind(new.owner)
        .fetch_one(&self.pool)
        .await?;
        Ok(playlist)
    }

    async fn find_playlist(&self, id: Uuid) -> StoreResult<Option<Playlist>> {
        let playlist = sqlx::query_as::<_, Playlist>("SELECT * FROM playlists WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(playlist)
    }

    async fn playlists_by_owner(&self, owner: Uuid) -> StoreResult<Vec<Playlist>> {
        let playlists =
            sqlx::query_as::<_, Playlist>("SELECT * FROM playlists WHERE owner = $1 ORDER BY created_at")
                .bind(owner)
                .fetch_all(&self.pool)
                .await?;
        Ok(playlists)
    }

    async fn update_playlist(&self, id: Uuid, changes: PlaylistChanges) -> StoreResult<Option<Playlist>> {
        let playlist = sqlx::query_as::<_, Playlist>(
            "UPDATE playlists SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                updated_at = now()
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(changes.name)
        .bind(changes.description)
        .fetch_optional(&self.pool)
        .await?;
        Ok(playlist)
    }

    async fn add_playlist_video(&self, id: Uuid, video: Uuid) -> StoreResult<Option<Playlist>> {
        let playlist = sqlx::query_as::<_, Playlist>(
            "UPDATE playlists SET
                videos = CASE WHEN $2 = ANY(videos) THEN videos ELSE array_append(videos, $2) END,
                updated_at = now()
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(video)
        .fetch_optional(&self.pool)
        .await?;
        Ok(playlist)
    }

    async fn remove_playlist_video(&self, id: Uuid, video: Uuid) -> StoreResult<Option<Playlist>> {
        let playlist = sqlx::query_as::<_, Playlist>(
            "UPDATE playlists SET videos = array_remove(videos, $2), updated_at = now()
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(video)
        .fetch_optional(&self.pool)
        .await?;
        Ok(playlist)
    }

    async fn delete_playlist(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM playlists WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn toggle_relation(&self, relation: &Relation) -> StoreResult<bool> {
        let (table, actor_col, target_col) = Self::relation_columns(relation.kind);
        let mut tx = self.pool.begin().await?;

        // Toggles on one (kind, actor, target) run one at a time until commit, so each
        // sees the outcome of the previous one.
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
            .bind(Self::relation_lock_key(relation))
            .execute(&mut *tx)
            .await?;

        let delete = format!(
            "DELETE FROM {table} WHERE id = (
                SELECT id FROM {table} WHERE {actor_col} = $1 AND {target_col} = $2
                ORDER BY created_at LIMIT 1 FOR UPDATE
             ) RETURNING id"
        );
        let removed: Option<Uuid> = sqlx::query_scalar(&delete)
            .bind(relation.actor)
            .bind(relation.target)
            .fetch_optional(&mut *tx)
            .await?;

        let active = if removed.is_some() {
            false
        } else {
            let insert = format!(
                "INSERT INTO {table} (id, {actor_col}, {target_col}) VALUES ($1, $2, $3) ON CONFLICT DO NOTHING"
            );
            sqlx::query(&insert)
                .bind(Uuid::new_v4())
                .bind(relation.actor)
                .bind(relation.target)
                .execute(&mut *tx)
                .await?;
            true
        };

        tx.commit().await?;
        Ok(active)
    }

    async fn count_relations(&self, relation: &Relation) -> StoreResult<i64> {
        let (table, actor_col, target_col) = Self::relation_columns(relation.kind);
        let sql = format!("SELECT COUNT(*) FROM {table} WHERE {actor_col} = $1 AND {target_col} = $2");
        let count: i64 = sqlx::query_scalar(&sql)
            .bind(relation.actor)
            .bind(relation.target)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn liked_videos(&self, actor: Uuid) -> StoreResult<Vec<Like>> {
        let likes = sqlx::query_as::<_, Like>(
            "SELECT * FROM likes WHERE liked_by = $1 AND video IS NOT NULL ORDER BY created_at",
        )
        .bind(actor)
        .fetch_all(&self.pool)
        .await?;
        Ok(likes)
    }
}
