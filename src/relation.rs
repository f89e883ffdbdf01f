//! Like/subscribe relations between an actor and a target.
//!
//! At most one relation record exists per (actor, target, kind). A toggle
//! creates the record when absent and deletes it when present; the store
//! performs both branches as one atomic step.

use serde::Serialize;
use uuid::Uuid;

use crate::database::Store;
use crate::error::ApiError;
use crate::validate::parse_id;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKind {
    Video,
    Tweet,
    Channel,
}

impl TargetKind {
    /// Name of the path parameter carrying the target id
    pub fn id_field(&self) -> &'static str {
        match self {
            TargetKind::Video => "videoId",
            TargetKind::Tweet => "tweetId",
            TargetKind::Channel => "channelId",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Relation {
    pub actor: Uuid,
    pub target: Uuid,
    pub kind: TargetKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleOutcome {
    pub is_active: bool,
}

/// Flip the relation between `actor` and the target named by `raw_target`.
///
/// A malformed target fails with `InvalidReference` before the store is touched.
pub async fn toggle(
    store: &dyn Store,
    actor: Uuid,
    raw_target: &str,
    kind: TargetKind,
) -> Result<ToggleOutcome, ApiError> {
    let target = parse_id(kind.id_field(), raw_target)?;
    let relation = Relation { actor, target, kind };

    let is_active = store.toggle_relation(&relation).await?;
    tracing::debug!(
        actor = %actor,
        target = %target,
        kind = ?kind,
        is_active,
        "relation toggled"
    );

    Ok(ToggleOutcome { is_active })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;

    #[tokio::test]
    async fn toggling_twice_returns_to_inactive() {
        let store = MemoryStore::new();
        let actor = Uuid::new_v4();
        let target = Uuid::new_v4();

        for kind in [TargetKind::Video, TargetKind::Tweet, TargetKind::Channel] {
            let first = toggle(&store, actor, &target.to_string(), kind).await.unwrap();
            let second = toggle(&store, actor, &target.to_string(), kind).await.unwrap();
            assert!(first.is_active);
            assert!(!second.is_active);

            let relation = Relation { actor, target, kind };
            assert_eq!(store.count_relations(&relation).await.unwrap(), 0);
        }
    }

    #[tokio::test]
    async fn relations_are_per_actor() {
        let store = MemoryStore::new();
        let channel = Uuid::new_v4().to_string();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

        assert!(toggle(&store, a, &channel, TargetKind::Channel).await.unwrap().is_active);
        assert!(toggle(&store, b, &channel, TargetKind::Channel).await.unwrap().is_active);
        assert!(!toggle(&store, a, &channel, TargetKind::Channel).await.unwrap().is_active);
    }

    #[tokio::test]
    async fn malformed_target_never_reaches_store() {
        let store = MemoryStore::new();
        for raw in ["", "   ", "not-an-id", "507f1f77bcf86cd799439011"] {
            let err = toggle(&store, Uuid::new_v4(), raw, TargetKind::Video).await.unwrap_err();
            assert!(matches!(err, ApiError::InvalidReference { ref field, .. } if field == "videoId"));
        }
        assert_eq!(store.access_count(), 0);
    }

    #[test]
    fn outcome_serializes_camel_case() {
        let value = serde_json::to_value(ToggleOutcome { is_active: true }).unwrap();
        assert_eq!(value, serde_json::json!({ "isActive": true }));
    }
}
