use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware,
    routing::{get, patch, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::config::SecurityConfig;
use crate::handlers::{protected, public};
use crate::middleware::jwt_auth_middleware;
use crate::state::AppState;

/// Full router: public routes at the root, everything else under `/api/v1`
/// behind the access-token middleware.
pub fn app(state: AppState) -> Router {
    let config = state.config.clone();
    let response_level = if config.api.enable_request_logging {
        Level::INFO
    } else {
        Level::DEBUG
    };

    let api = Router::new()
        .nest("/comments", comment_routes())
        .nest("/likes", like_routes())
        .nest("/subscriptions", subscription_routes())
        .nest("/tweets", tweet_routes())
        .nest("/playlist", playlist_routes())
        .nest("/videos", video_routes())
        .route_layer(middleware::from_fn_with_state(state.clone(), jwt_auth_middleware));

    Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        // Protected API
        .nest("/api/v1", api)
        // Global middleware
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                        .on_response(DefaultOnResponse::new().level(response_level)),
                )
                .layer(cors_layer(&config.security))
                .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes)),
        )
        .with_state(state)
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if !security.enable_cors {
        return CorsLayer::new();
    }

    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if security.cors_origins.iter().any(|origin| origin == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}

fn comment_routes() -> Router<AppState> {
    use protected::comment;

    Router::new()
        .route("/:videoId", post(comment::add))
        .route("/comment/:commentId", patch(comment::update))
}

fn like_routes() -> Router<AppState> {
    use protected::like;

    Router::new()
        .route("/toggle/v/:videoId", post(like::toggle_video))
        .route("/toggle/t/:tweetId", post(like::toggle_tweet))
        .route("/videos", get(like::liked_videos))
}

fn subscription_routes() -> Router<AppState> {
    use protected::subscription;

    Router::new().route("/channel/:channelId", post(subscription::toggle))
}

fn tweet_routes() -> Router<AppState> {
    use protected::tweet;

    Router::new()
        .route("/", post(tweet::create))
        .route("/user/:userId", get(tweet::by_user))
        .route("/:tweetId", patch(tweet::update).delete(tweet::delete))
}

fn playlist_routes() -> Router<AppState> {
    use protected::playlist;

    Router::new()
        .route("/", post(playlist::create))
        .route("/user/:userId", get(playlist::by_user))
        .route(
            "/:playlistId",
            get(playlist::get)
                .patch(playlist::update)
                .delete(playlist::delete),
        )
        .route("/add/:videoId/:playlistId", patch(playlist::add_video))
        .route("/remove/:videoId/:playlistId", patch(playlist::remove_video))
}

fn video_routes() -> Router<AppState> {
    use protected::video;

    Router::new()
        .route("/", post(video::publish))
        .route(
            "/:videoId",
            get(video::get).patch(video::update).delete(video::delete),
        )
        .route("/toggle/publish/:videoId", patch(video::toggle_publish))
}

