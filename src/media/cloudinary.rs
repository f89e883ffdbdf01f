use async_trait::async_trait;
use chrono::Utc;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use super::{public_id_from_url, MediaError, MediaHost, ResourceKind, UploadedAsset};
use crate::config::MediaConfig;

/// Cloudinary upload API client built from explicit configuration
pub struct CloudinaryClient {
    http: reqwest::Client,
    base_url: String,
    cloud_name: String,
    api_key: String,
    api_secret: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
    url: Option<String>,
    public_id: String,
    duration: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl CloudinaryClient {
    pub fn new(config: &MediaConfig) -> Result<Self, MediaError> {
        if config.cloud_name.is_empty() {
            return Err(MediaError::NotConfigured("CLOUDINARY_CLOUD_NAME"));
        }
        if config.api_key.is_empty() {
            return Err(MediaError::NotConfigured("CLOUDINARY_API_KEY"));
        }
        if config.api_secret.is_empty() {
            return Err(MediaError::NotConfigured("CLOUDINARY_API_SECRET"));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            cloud_name: config.cloud_name.clone(),
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
        })
    }

    fn endpoint(&self, resource: &str, action: &str) -> String {
        format!("{}/{}/{}/{}", self.base_url, self.cloud_name, resource, action)
    }

    /// Signed parameters plus `api_key` and `signature`, ready to post
    fn signed_params(&self, mut params: BTreeMap<&'static str, String>) -> BTreeMap<&'static str, String> {
        params.insert("timestamp", Utc::now().timestamp().to_string());
        let signature = sign(&params, &self.api_secret);
        params.insert("signature", signature);
        params.insert("signature_algorithm", "sha256".to_string());
        params.insert("api_key", self.api_key.clone());
        params
    }

    async fn rejected(response: reqwest::Response) -> MediaError {
        let status = response.status().as_u16();
        let message = match response.json::<ErrorResponse>().await {
            Ok(body) => body.error.message,
            Err(_) => "no error details".to_string(),
        };
        MediaError::Rejected { status, message }
    }
}

/// Request signature: `k=v` pairs sorted by key, joined with `&`, secret appended, SHA-256 hex
fn sign(params: &BTreeMap<&'static str, String>, secret: &str) -> String {
    let to_sign = params
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(secret.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[async_trait]
impl MediaHost for CloudinaryClient {
    async fn upload(&self, path: &Path) -> Result<UploadedAsset, MediaError> {
        let file = tokio::fs::File::open(path).await?;
        let length = file.metadata().await?.len();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        let part = Part::stream_with_length(reqwest::Body::from(file), length).file_name(file_name);
        let mut form = Form::new().part("file", part);
        for (key, value) in self.signed_params(BTreeMap::new()) {
            form = form.text(key, value);
        }

        let response = self
            .http
            .post(self.endpoint("auto", "upload"))
            .multipart(form)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::rejected(response).await);
        }

        let body: UploadResponse = response.json().await?;
        let url = body
            .secure_url
            .or(body.url)
            .ok_or_else(|| MediaError::InvalidResponse("upload response has no url".to_string()))?;

        tracing::info!(public_id = %body.public_id, "uploaded asset to media host");
        Ok(UploadedAsset {
            url,
            duration: body.duration,
        })
    }

    async fn destroy(&self, url: &str, kind: ResourceKind) -> Result<(), MediaError> {
        let public_id = public_id_from_url(url)?;
        let mut params = BTreeMap::new();
        params.insert("public_id", public_id);

        let response = self
            .http
            .post(self.endpoint(kind.as_str(), "destroy"))
            .form(&self.signed_params(params))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::rejected(response).await);
        }

        let body: DestroyResponse = response.json().await?;
        match body.result.as_str() {
            "ok" => Ok(()),
            other => Err(MediaError::InvalidResponse(format!("destroy returned '{}'", other))),
        }
    }
}
