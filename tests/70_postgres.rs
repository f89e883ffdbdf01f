//! Store behaviour against a real Postgres.
//!
//! Set `VIDTUBE_TEST_DATABASE_URL` to a disposable database to run these;
//! without it every test returns early. Ids are random, so runs can share a database.

use std::sync::Arc;

use anyhow::Result;
use uuid::Uuid;

use vidtube_api::config::{AppConfig, StoreBackend};
use vidtube_api::database::models::comment::NewComment;
use vidtube_api::database::models::playlist::{NewPlaylist, PlaylistChanges};
use vidtube_api::database::models::tweet::NewTweet;
use vidtube_api::database::models::video::{NewVideo, VideoChanges};
use vidtube_api::database::{DatabaseManager, Store};
use vidtube_api::relation::{Relation, TargetKind};

async fn pg_store() -> Result<Option<Arc<dyn Store>>> {
    let Ok(url) = std::env::var("VIDTUBE_TEST_DATABASE_URL") else {
        eprintln!("VIDTUBE_TEST_DATABASE_URL not set; skipping Postgres store test");
        return Ok(None);
    };
    let mut config = AppConfig::for_tests();
    config.database.backend = StoreBackend::Postgres;
    config.database.url = Some(url);
    config.database.run_migrations = true;
    Ok(Some(DatabaseManager::open(&config.database).await?))
}

fn new_video(owner: Uuid) -> NewVideo {
    NewVideo {
        video_file: "https://media.test/demo/video/upload/v1/clip.mp4".into(),
        thumbnail: "https://media.test/demo/image/upload/v1/thumb.jpg".into(),
        title: "Clip".into(),
        description: "short".into(),
        duration: 12.5,
        owner,
    }
}

#[tokio::test]
async fn toggling_twice_leaves_no_record() -> Result<()> {
    let Some(store) = pg_store().await? else { return Ok(()) };
    let rel = Relation { actor: Uuid::new_v4(), target: Uuid::new_v4(), kind: TargetKind::Video };

    assert!(store.toggle_relation(&rel).await?);
    assert_eq!(store.count_relations(&rel).await?, 1);
    assert!(!store.toggle_relation(&rel).await?);
    assert_eq!(store.count_relations(&rel).await?, 0);
    Ok(())
}

#[tokio::test]
async fn concurrent_toggles_see_each_other() -> Result<()> {
    let Some(store) = pg_store().await? else { return Ok(()) };
    let rel = Relation { actor: Uuid::new_v4(), target: Uuid::new_v4(), kind: TargetKind::Channel };

    let (first, second) = tokio::join!(store.toggle_relation(&rel), store.toggle_relation(&rel));
    let mut outcomes = vec![first?, second?];
    outcomes.sort();
    assert_eq!(outcomes, vec![false, true]);
    assert_eq!(store.count_relations(&rel).await?, 0);
    Ok(())
}

#[tokio::test]
async fn video_and_tweet_likes_are_separate() -> Result<()> {
    let Some(store) = pg_store().await? else { return Ok(()) };
    let (actor, target) = (Uuid::new_v4(), Uuid::new_v4());
    let video = Relation { actor, target, kind: TargetKind::Video };
    let tweet = Relation { actor, target, kind: TargetKind::Tweet };

    assert!(store.toggle_relation(&video).await?);
    assert_eq!(store.count_relations(&tweet).await?, 0);

    let liked = store.liked_videos(actor).await?;
    assert_eq!(liked.len(), 1);
    assert_eq!(liked[0].video, Some(target));
    assert_eq!(liked[0].tweet, None);
    Ok(())
}

#[tokio::test]
async fn playlist_videos_stay_unique() -> Result<()> {
    let Some(store) = pg_store().await? else { return Ok(()) };
    let playlist = store
        .insert_playlist(NewPlaylist { name: "Mix".into(), description: "assorted".into(), owner: Uuid::new_v4() })
        .await?;
    let (v1, v2) = (Uuid::new_v4(), Uuid::new_v4());

    for video in [v1, v2, v1] {
        store.add_playlist_video(playlist.id, video).await?;
    }
    let found = store.find_playlist(playlist.id).await?.expect("playlist");
    assert_eq!(found.videos, vec![v1, v2]);

    let after = store.remove_playlist_video(playlist.id, v1).await?.expect("playlist");
    assert_eq!(after.videos, vec![v2]);
    assert!(store.add_playlist_video(Uuid::new_v4(), v1).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn partial_updates_keep_absent_fields() -> Result<()> {
    let Some(store) = pg_store().await? else { return Ok(()) };
    let owner = Uuid::new_v4();

    let playlist = store
        .insert_playlist(NewPlaylist { name: "Road trip".into(), description: "driving songs".into(), owner })
        .await?;
    let updated = store
        .update_playlist(playlist.id, PlaylistChanges { name: Some("Road trip 2024".into()), ..Default::default() })
        .await?
        .expect("playlist");
    assert_eq!(updated.name, "Road trip 2024");
    assert_eq!(updated.description, "driving songs");

    let video = store.insert_video(new_video(owner)).await?;
    assert!(video.is_published);
    assert_eq!(video.views, 0);
    let updated = store
        .update_video(video.id, VideoChanges { is_published: Some(false), ..Default::default() })
        .await?
        .expect("video");
    assert!(!updated.is_published);
    assert_eq!(updated.title, "Clip");
    assert_eq!(updated.thumbnail, video.thumbnail);
    Ok(())
}

#[tokio::test]
async fn deletes_report_whether_a_row_went_away() -> Result<()> {
    let Some(store) = pg_store().await? else { return Ok(()) };
    let owner = Uuid::new_v4();

    let tweet = store.insert_tweet(NewTweet { content: "  spaced\n".into(), owner }).await?;
    assert_eq!(tweet.content, "  spaced\n");
    assert_eq!(store.tweets_by_owner(owner).await?.len(), 1);
    assert!(store.delete_tweet(tweet.id).await?);
    assert!(!store.delete_tweet(tweet.id).await?);
    assert!(store.find_tweet(tweet.id).await?.is_none());

    let video = store.insert_video(new_video(owner)).await?;
    assert!(store.delete_video(video.id).await?);
    assert!(store.find_video(video.id).await?.is_none());

    let comment = store
        .insert_comment(NewComment { content: "nice".into(), video: video.id, owner })
        .await?;
    let edited = store.update_comment(comment.id, "nicer".into()).await?.expect("comment");
    assert_eq!(edited.content, "nicer");
    assert!(store.update_comment(Uuid::new_v4(), "x".into()).await?.is_none());
    Ok(())
}
