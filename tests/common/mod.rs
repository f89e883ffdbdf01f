#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use vidtube_api::auth::{generate_jwt, Claims};
use vidtube_api::config::AppConfig;
use vidtube_api::database::MemoryStore;
use vidtube_api::media::{MediaError, MediaHost, ResourceKind, UploadedAsset};
use vidtube_api::{app, AppState};

const BOUNDARY: &str = "vidtube-test-boundary";

/// Media host double that records every call
#[derive(Default)]
pub struct FakeMedia {
    uploads: Mutex<Vec<String>>,
    destroyed: Mutex<Vec<(String, ResourceKind)>>,
    upload_calls: AtomicUsize,
    /// 1-based index of the upload call that should fail
    fail_upload: Mutex<Option<usize>>,
}

impl FakeMedia {
    pub fn fail_upload_number(&self, n: usize) {
        *self.fail_upload.lock().unwrap() = Some(n);
    }

    pub fn uploads(&self) -> Vec<String> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn destroyed(&self) -> Vec<(String, ResourceKind)> {
        self.destroyed.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaHost for FakeMedia {
    async fn upload(&self, path: &Path) -> Result<UploadedAsset, MediaError> {
        let call = self.upload_calls.fetch_add(1, Ordering::SeqCst) + 1;
        let bytes = tokio::fs::read(path).await?;
        if *self.fail_upload.lock().unwrap() == Some(call) {
            return Err(MediaError::Rejected {
                status: 400,
                message: "upload refused".into(),
            });
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let is_video = name.ends_with(".mp4");
        let url = format!(
            "https://media.test/demo/{}/upload/v1/{}",
            if is_video { "video" } else { "image" },
            name
        );
        self.uploads.lock().unwrap().push(url.clone());

        Ok(UploadedAsset {
            url,
            duration: is_video.then_some(bytes.len() as f64),
        })
    }

    async fn destroy(&self, url: &str, kind: ResourceKind) -> Result<(), MediaError> {
        self.destroyed.lock().unwrap().push((url.to_string(), kind));
        Ok(())
    }
}

/// File part of a multipart request
pub struct FilePart<'a> {
    pub field: &'a str,
    pub file_name: &'a str,
    pub bytes: &'a [u8],
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub media: Arc<FakeMedia>,
    pub config: AppConfig,
}

impl TestApp {
    pub fn new() -> Self {
        let mut config = AppConfig::for_tests();
        config.media.temp_dir = std::env::temp_dir().join(format!("vidtube-test-{}", Uuid::new_v4()));

        let store = Arc::new(MemoryStore::new());
        let media = Arc::new(FakeMedia::default());
        let state = AppState::new(config.clone(), store.clone(), media.clone());

        Self {
            router: app(state),
            store,
            media,
            config,
        }
    }

    pub fn token(&self, user: Uuid) -> String {
        let claims = Claims::new(user, format!("user-{}", &user.to_string()[..8]), &self.config.security);
        generate_jwt(&claims, &self.config.security).expect("token")
    }

    pub fn temp_dir(&self) -> PathBuf {
        self.config.media.temp_dir.clone()
    }

    /// Files left in the staging directory
    pub fn staged_files(&self) -> usize {
        std::fs::read_dir(self.temp_dir()).map(|entries| entries.count()).unwrap_or(0)
    }

    pub async fn send(&self, request: Request<Body>) -> Result<(StatusCode, Value)> {
        let response = self.router.clone().oneshot(request).await.context("router error")?;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        Ok((status, body))
    }

    pub async fn request(&self, method: Method, uri: &str, actor: Option<Uuid>, body: Option<Value>) -> Result<(StatusCode, Value)> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(actor) = actor {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", self.token(actor)));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&json)?))?,
            None => builder.body(Body::empty())?,
        };
        self.send(request).await
    }

    pub async fn get(&self, uri: &str, actor: Uuid) -> Result<(StatusCode, Value)> {
        self.request(Method::GET, uri, Some(actor), None).await
    }

    pub async fn post(&self, uri: &str, actor: Uuid, body: Value) -> Result<(StatusCode, Value)> {
        self.request(Method::POST, uri, Some(actor), Some(body)).await
    }

    pub async fn post_empty(&self, uri: &str, actor: Uuid) -> Result<(StatusCode, Value)> {
        self.request(Method::POST, uri, Some(actor), None).await
    }

    pub async fn patch(&self, uri: &str, actor: Uuid, body: Value) -> Result<(StatusCode, Value)> {
        self.request(Method::PATCH, uri, Some(actor), Some(body)).await
    }

    pub async fn patch_empty(&self, uri: &str, actor: Uuid) -> Result<(StatusCode, Value)> {
        self.request(Method::PATCH, uri, Some(actor), None).await
    }

    pub async fn delete(&self, uri: &str, actor: Uuid) -> Result<(StatusCode, Value)> {
        self.request(Method::DELETE, uri, Some(actor), None).await
    }

    pub async fn multipart(
        &self,
        method: Method,
        uri: &str,
        actor: Uuid,
        fields: &[(&str, &str)],
        files: &[FilePart<'_>],
    ) -> Result<(StatusCode, Value)> {
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        for file in files {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                    file.field, file.file_name
                )
                .as_bytes(),
            );
            body.extend_from_slice(file.bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.token(actor)))
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
            .body(Body::from(body))?;
        self.send(request).await
    }

    /// Publish a video through the API and return its payload
    pub async fn publish_video(&self, owner: Uuid, title: &str) -> Result<Value> {
        let (status, body) = self
            .multipart(
                Method::POST,
                "/api/v1/videos",
                owner,
                &[("title", title), ("description", "a test upload")],
                &[
                    FilePart { field: "videoFile", file_name: "clip.mp4", bytes: b"0123456789" },
                    FilePart { field: "thumbnail", file_name: "thumb.png", bytes: b"png" },
                ],
            )
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "publish failed: {} {}", status, body);
        Ok(body["data"].clone())
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.config.media.temp_dir);
    }
}

pub fn id_of(data: &Value) -> String {
    data["id"].as_str().unwrap_or_default().to_string()
}
