use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: Uuid,
    pub video_file: String,
    pub thumbnail: String,
    pub title: String,
    pub description: String,
    /// Seconds, as reported by the media host
    pub duration: f64,
    pub views: i64,
    pub is_published: bool,
    pub owner: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for a video whose media has already been uploaded
#[derive(Debug, Clone)]
pub struct NewVideo {
    pub video_file: String,
    pub thumbnail: String,
    pub title: String,
    pub description: String,
    pub duration: f64,
    pub owner: Uuid,
}

/// Partial update; `None` keeps the stored value
#[derive(Debug, Clone, Default)]
pub struct VideoChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub thumbnail: Option<String>,
    pub is_published: Option<bool>,
}

impl Video {
    pub fn apply(&mut self, changes: VideoChanges) {
        if let Some(title) = changes.title {
            self.title = title;
        }
        if let Some(description) = changes.description {
            self.description = description;
        }
        if let Some(thumbnail) = changes.thumbnail {
            self.thumbnail = thumbnail;
        }
        if let Some(is_published) = changes.is_published {
            self.is_published = is_published;
        }
        self.updated_at = Utc::now();
    }
}
