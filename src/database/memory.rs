use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::models::comment::NewComment;
use crate::database::models::playlist::{NewPlaylist, PlaylistChanges};
use crate::database::models::tweet::NewTweet;
use crate::database::models::video::{NewVideo, VideoChanges};
use crate::database::models::{Comment, Like, Playlist, Subscription, Tweet, Video};
use crate::database::store::{Store, StoreResult};
use crate::relation::{Relation, TargetKind};

#[derive(Default)]
struct Collections {
    videos: HashMap<Uuid, Video>,
    comments: HashMap<Uuid, Comment>,
    tweets: HashMap<Uuid, Tweet>,
    playlists: HashMap<Uuid, Playlist>,
    // Vecs keep insertion order so "first match" is well defined
    likes: Vec<Like>,
    subscriptions: Vec<Subscription>,
}

impl Collections {
    fn relation_position(&self, relation: &Relation) -> Option<usize> {
        match relation.kind {
            TargetKind::Video => self
                .likes
                .iter()
                .position(|l| l.liked_by == relation.actor && l.video == Some(relation.target)),
            TargetKind::Tweet => self
                .likes
                .iter()
                .position(|l| l.liked_by == relation.actor && l.tweet == Some(relation.target)),
            TargetKind::Channel => self
                .subscriptions
                .iter()
                .position(|s| s.subscriber == relation.actor && s.channel == relation.target),
        }
    }
}

/// In-process store for local runs and tests.
///
/// A single lock guards every collection, so each trait call is atomic. Every
/// call bumps `access_count`, which lets tests assert that a request never
/// reached the store.
#[derive(Default)]
pub struct MemoryStore {
    data: RwLock<Collections>,
    accesses: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of store calls made so far
    pub fn access_count(&self) -> usize {
        self.accesses.load(Ordering::SeqCst)
    }

    fn touch(&self) {
        self.accesses.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn insert_video(&self, new: NewVideo) -> StoreResult<Video> {
        self.touch();
        let now = Utc::now();
        let video = Video {
            id: Uuid::new_v4(),
            video_file: new.video_file,
            thumbnail: new.thumbnail,
            title: new.title,
            description: new.description,
            duration: new.duration,
            views: 0,
            is_published: true,
            owner: new.owner,
            created_at: now,
            updated_at: now,
        };
        self.data.write().await.videos.insert(video.id, video.clone());
        Ok(video)
    }

    async fn find_video(&self, id: Uuid) -> StoreResult<Option<Video>> {
        self.touch();
        Ok(self.data.read().await.videos.get(&id).cloned())
    }

    async fn update_video(&self, id: Uuid, changes: VideoChanges) -> StoreResult<Option<Video>> {
        self.touch();
        let mut data = self.data.write().await;
        Ok(data.videos.get_mut(&id).map(|video| {
            video.apply(changes);
            video.clone()
        }))
    }

    async fn delete_video(&self, id: Uuid) -> StoreResult<bool> {
        self.touch();
        Ok(self.data.write().await.videos.remove(&id).is_some())
    }

    async fn insert_comment(&self, new: NewComment) -> StoreResult<Comment> {
        self.touch();
        let now = Utc::now();
        let comment = Comment {
            id: Uuid::new_v4(),
            content: new.content,
            video: new.video,
            owner: new.owner,
            created_at: now,
            updated_at: now,
        };
        self.data.write().await.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn find_comment(&self, id: Uuid) -> StoreResult<Option<Comment>> {
        self.touch();
        Ok(self.data.read().await.comments.get(&id).cloned())
    }

    async fn update_comment(&self, id: Uuid, content: String) -> StoreResult<Option<Comment>> {
        self.touch();
        let mut data = self.data.write().await;
        Ok(data.comments.get_mut(&id).map(|comment| {
            comment.content = content;
            comment.updated_at = Utc::now();
            comment.clone()
        }))
    }

    async fn insert_tweet(&self, new: NewTweet) -> StoreResult<Tweet> {
        self.touch();
        let now = Utc::now();
        let tweet = Tweet {
            id: Uuid::new_v4(),
            content: new.content,
            owner: new.owner,
            created_at: now,
            updated_at: now,
        };
        self.data.write().await.tweets.insert(tweet.id, tweet.clone());
        Ok(tweet)
    }

    async fn find_tweet(&self, id: Uuid) -> StoreResult<Option<Tweet>> {
        self.touch();
        Ok(self.data.read().await.tweets.get(&id).cloned())
    }

    async fn tweets_by_owner(&self, owner: Uuid) -> StoreResult<Vec<Tweet>> {
        self.touch();
        let data = self.data.read().await;
        let mut tweets: Vec<Tweet> = data.tweets.values().filter(|t| t.owner == owner).cloned().collect();
        tweets.sort_by_key(|t| t.created_at);
        Ok(tweets)
    }

    async fn update_tweet(&self, id: Uuid, content: String) -> StoreResult<Option<Tweet>> {
        self.touch();
        let mut data = self.data.write().await;
        Ok(data.tweets.get_mut(&id).map(|tweet| {
            tweet.content = content;
            tweet.updated_at = Utc::now();
            tweet.clone()
        }))
    }

    async fn delete_tweet(&self, id: Uuid) -> StoreResult<bool> {
        self.touch();
        Ok(self.data.write().await.tweets.remove(&id).is_some())
    }

    async fn insert_playlist(&self, new: NewPlaylist) -> StoreResult<Playlist> {
        self.touch();
        let now = Utc::now();
        let playlist = Playlist {
            id: Uuid::new_v4(),
            name: new.name,
            description: new.description,
            videos: Vec::new(),
            owner: new.owner,
            created_at: now,
            updated_at: now,
        };
        self.data.write().await.playlists.insert(playlist.id, playlist.clone());
        Ok(playlist)
    }

    async fn find_playlist(&self, id: Uuid) -> StoreResult<Option<Playlist>> {
        self.touch();
        Ok(self.data.read().await.playlists.get(&id).cloned())
    }

    async fn playlists_by_owner(&self, owner: Uuid) -> StoreResult<Vec<Playlist>> {
        self.touch();
        let data = self.data.read().await;
        let mut playlists: Vec<Playlist> =
            data.playlists.values().filter(|p| p.owner == owner).cloned().collect();
        playlists.sort_by_key(|p| p.created_at);
        Ok(playlists)
    }

    async fn update_playlist(&self, id: Uuid, changes: PlaylistChanges) -> StoreResult<Option<Playlist>> {
        self.touch();
        let mut data = self.data.write().await;
        Ok(data.playlists.get_mut(&id).map(|playlist| {
            if let Some(name) = changes.name {
                playlist.name = name;
            }
            if let Some(description) = changes.description {
                playlist.description = description;
            }
            playlist.updated_at = Utc::now();
            playlist.clone()
        }))
    }

    async fn add_playlist_video(&self, id: Uuid, video: Uuid) -> StoreResult<Option<Playlist>> {
        self.touch();
        let mut data = self.data.write().await;
        Ok(data.playlists.get_mut(&id).map(|playlist| {
            if !playlist.videos.contains(&video) {
                playlist.videos.push(video);
            }
            playlist.updated_at = Utc::now();
            playlist.clone()
        }))
    }

    async fn remove_playlist_video(&self, id: Uuid, video: Uuid) -> StoreResult<Option<Playlist>> {
        self.touch();
        let mut data = self.data.write().await;
        Ok(data.playlists.get_mut(&id).map(|playlist| {
            playlist.videos.retain(|v| *v != video);
            playlist.updated_at = Utc::now();
            playlist.clone()
        }))
    }

    async fn delete_playlist(&self, id: Uuid) -> StoreResult<bool> {
        self.touch();
        Ok(self.data.write().await.playlists.remove(&id).is_some())
    }

    async fn toggle_relation(&self, relation: &Relation) -> StoreResult<bool> {
        self.touch();
        let mut data = self.data.write().await;

        if let Some(index) = data.relation_position(relation) {
            match relation.kind {
                TargetKind::Video | TargetKind::Tweet => {
                    data.likes.remove(index);
                }
                TargetKind::Channel => {
                    data.subscriptions.remove(index);
                }
            }
            return Ok(false);
        }

        let now = Utc::now();
        match relation.kind {
            TargetKind::Video | TargetKind::Tweet => data.likes.push(Like {
                id: Uuid::new_v4(),
                liked_by: relation.actor,
                video: (relation.kind == TargetKind::Video).then_some(relation.target),
                tweet: (relation.kind == TargetKind::Tweet).then_some(relation.target),
                created_at: now,
            }),
            TargetKind::Channel => data.subscriptions.push(Subscription {
                id: Uuid::new_v4(),
                subscriber: relation.actor,
                channel: relation.target,
                created_at: now,
            }),
        }
        Ok(true)
    }

    async fn count_relations(&self, relation: &Relation) -> StoreResult<i64> {
        self.touch();
        let data = self.data.read().await;
        let count = match relation.kind {
            TargetKind::Video => data
                .likes
                .iter()
                .filter(|l| l.liked_by == relation.actor && l.video == Some(relation.target))
                .count(),
            TargetKind::Tweet => data
                .likes
                .iter()
                .filter(|l| l.liked_by == relation.actor && l.tweet == Some(relation.target))
                .count(),
            TargetKind::Channel => data
                .subscriptions
                .iter()
                .filter(|s| s.subscriber == relation.actor && s.channel == relation.target)
                .count(),
        };
        Ok(count as i64)
    }

    async fn liked_videos(&self, actor: Uuid) -> StoreResult<Vec<Like>> {
        self.touch();
        let data = self.data.read().await;
        Ok(data
            .likes
            .iter()
            .filter(|l| l.liked_by == actor && l.video.is_some())
            .cloned()
            .collect())
    }
}
