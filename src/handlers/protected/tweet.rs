use axum::extract::State;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::database::models::{tweet::NewTweet, Tweet};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, IdPath, JsonBody};
use crate::ownership::{authorize_mutation, found};
use crate::state::AppState;
use crate::validate::{parse_id, required};

#[derive(Debug, Default, Deserialize)]
pub struct TweetBody {
    #[serde(default)]
    pub content: Option<String>,
}

/// POST /api/v1/tweets
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    JsonBody(body): JsonBody<TweetBody>,
) -> ApiResult<Tweet> {
    let content = required("content", body.content)?;

    let tweet = state
        .store
        .insert_tweet(NewTweet {
            content,
            owner: user.user_id,
        })
        .await?;

    Ok(ApiResponse::created(tweet, "Tweet created successfully"))
}

/// GET /api/v1/tweets/user/:userId
pub async fn by_user(
    State(state): State<AppState>,
    _user: AuthUser,
    IdPath(user_id): IdPath<String>,
) -> ApiResult<Vec<Tweet>> {
    let owner = parse_id("userId", &user_id)?;
    let tweets = state.store.tweets_by_owner(owner).await?;
    Ok(ApiResponse::success(tweets, "Tweets fetched successfully"))
}

/// PATCH /api/v1/tweets/:tweetId
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    IdPath(tweet_id): IdPath<String>,
    JsonBody(body): JsonBody<TweetBody>,
) -> ApiResult<Tweet> {
    let id = parse_id("tweetId", &tweet_id)?;
    let content = required("content", body.content)?;

    let tweet = found(state.store.find_tweet(id).await?)?;
    authorize_mutation(user.user_id, &tweet, "update")?;

    let updated = found(state.store.update_tweet(id, content).await?)?;
    Ok(ApiResponse::success(updated, "Tweet updated successfully"))
}

/// DELETE /api/v1/tweets/:tweetId
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    IdPath(tweet_id): IdPath<String>,
) -> ApiResult<Value> {
    let id = parse_id("tweetId", &tweet_id)?;

    let tweet = found(state.store.find_tweet(id).await?)?;
    authorize_mutation(user.user_id, &tweet, "delete")?;

    if !state.store.delete_tweet(id).await? {
        return Err(ApiError::not_found("Tweet not found"));
    }
    tracing::info!(tweet = %id, "tweet deleted");
    Ok(ApiResponse::success(json!({}), "Tweet deleted successfully"))
}
