mod common;

use anyhow::Result;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use uuid::Uuid;

#[tokio::test]
async fn root_and_health_are_public() -> Result<()> {
    let app = common::TestApp::new();

    let (status, body) = app.send(Request::get("/").body(Body::empty())?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["name"], "vidtube-api");

    let (status, body) = app.send(Request::get("/health").body(Body::empty())?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn api_requires_access_token() -> Result<()> {
    let app = common::TestApp::new();

    let (status, body) = app
        .request(Method::GET, &format!("/api/v1/tweets/user/{}", Uuid::new_v4()), None, None)
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["statusCode"], 401);
    assert_eq!(body["code"], "UNAUTHORIZED");
    assert_eq!(app.store.access_count(), 0);
    Ok(())
}

#[tokio::test]
async fn forged_tokens_are_rejected() -> Result<()> {
    let app = common::TestApp::new();

    let request = Request::post("/api/v1/tweets")
        .header(header::AUTHORIZATION, "Bearer not.a.token")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"content":"hello"}"#))?;
    let (status, body) = app.send(request).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid access token");
    assert_eq!(app.store.access_count(), 0);
    Ok(())
}

#[tokio::test]
async fn access_token_cookie_is_accepted() -> Result<()> {
    let app = common::TestApp::new();
    let user = Uuid::new_v4();

    let request = Request::post("/api/v1/tweets")
        .header(header::COOKIE, format!("accessToken={}", app.token(user)))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"content":"from a cookie"}"#))?;
    let (status, body) = app.send(request).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["owner"], user.to_string());
    Ok(())
}
