use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A like relation. Exactly one of `video`/`tweet` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Like {
    pub id: Uuid,
    pub liked_by: Uuid,
    pub video: Option<Uuid>,
    pub tweet: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}
