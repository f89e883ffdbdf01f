//! Owner-only mutation of comments, tweets, playlists and videos.
//!
//! Handlers load the record first (so a missing record is a 404), then call
//! [`authorize_mutation`] before any write.

use uuid::Uuid;

use crate::database::models::{Comment, Playlist, Tweet, Video};
use crate::error::ApiError;

/// A record whose writes are restricted to its creator
pub trait Owned {
    /// Lowercase noun used in client messages
    const KIND: &'static str;

    fn owner(&self) -> Uuid;
}

impl Owned for Comment {
    const KIND: &'static str = "comment";
    fn owner(&self) -> Uuid {
        self.owner
    }
}

impl Owned for Tweet {
    const KIND: &'static str = "tweet";
    fn owner(&self) -> Uuid {
        self.owner
    }
}

impl Owned for Playlist {
    const KIND: &'static str = "playlist";
    fn owner(&self) -> Uuid {
        self.owner
    }
}

impl Owned for Video {
    const KIND: &'static str = "video";
    fn owner(&self) -> Uuid {
        self.owner
    }
}

/// Allow `action` on `entity` only when `actor` owns it
pub fn authorize_mutation<E: Owned>(actor: Uuid, entity: &E, action: &str) -> Result<(), ApiError> {
    if entity.owner() == actor {
        return Ok(());
    }

    tracing::warn!(
        actor = %actor,
        owner = %entity.owner(),
        kind = E::KIND,
        action,
        "mutation rejected: actor is not the owner"
    );
    Err(ApiError::forbidden(format!(
        "User is not authorized to {} the {}",
        action,
        E::KIND
    )))
}

/// Turn a point lookup result into the record or a 404 naming `E`
pub fn found<E: Owned>(record: Option<E>) -> Result<E, ApiError> {
    record.ok_or_else(|| ApiError::not_found(not_found_message(E::KIND)))
}

fn not_found_message(kind: &str) -> String {
    let mut chars = kind.chars();
    match chars.next() {
        Some(first) => format!("{}{} not found", first.to_uppercase(), chars.as_str()),
        None => "Record not found".to_string(),
    }
}
