//! Third-party media hosting for video files and thumbnails.

pub mod cloudinary;

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

pub use cloudinary::CloudinaryClient;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Media host not configured: {0}")]
    NotConfigured(&'static str),

    #[error("Local file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Media host request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Media host rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Unexpected media host response: {0}")]
    InvalidResponse(String),

    #[error("Not a hosted asset URL: {0}")]
    InvalidUrl(String),
}

/// How the host stores an asset; needed to delete it again
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Image,
    Video,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Image => "image",
            ResourceKind::Video => "video",
        }
    }
}

/// A successfully hosted file
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedAsset {
    pub url: String,
    /// Seconds; only reported for audio/video
    pub duration: Option<f64>,
}

#[async_trait]
pub trait MediaHost: Send + Sync {
    /// Upload the file at `path`. The caller owns the local file.
    async fn upload(&self, path: &Path) -> Result<UploadedAsset, MediaError>;

    /// Delete a previously hosted asset by its URL
    async fn destroy(&self, url: &str, kind: ResourceKind) -> Result<(), MediaError>;
}

/// Host used when no media credentials are configured; every call fails
/// with `NotConfigured` so video endpoints answer 500 while the rest of the
/// API keeps working.
pub struct DisabledMediaHost {
    missing: &'static str,
}

impl DisabledMediaHost {
    pub fn new(missing: &'static str) -> Self {
        Self { missing }
    }
}

#[async_trait]
impl MediaHost for DisabledMediaHost {
    async fn upload(&self, _path: &Path) -> Result<UploadedAsset, MediaError> {
        Err(MediaError::NotConfigured(self.missing))
    }

    async fn destroy(&self, _url: &str, _kind: ResourceKind) -> Result<(), MediaError> {
        Err(MediaError::NotConfigured(self.missing))
    }
}

/// Upload a staged local file and remove it afterwards, whatever the outcome
pub async fn upload_staged(host: &dyn MediaHost, path: &Path) -> Result<UploadedAsset, MediaError> {
    let result = host.upload(path).await;
    if let Err(e) = tokio::fs::remove_file(path).await {
        tracing::warn!(path = %path.display(), "failed to remove staged upload: {}", e);
    }
    result
}

/// Best-effort delete of a hosted asset. Failures are logged so orphaned
/// assets can be found later; they never fail the request.
pub async fn discard(host: &dyn MediaHost, url: &str, kind: ResourceKind) {
    match host.destroy(url, kind).await {
        Ok(()) => tracing::debug!(url, kind = kind.as_str(), "remote asset deleted"),
        Err(e) => tracing::warn!(
            url,
            kind = kind.as_str(),
            error = %e,
            "remote asset deletion failed; asset may be orphaned"
        ),
    }
}

/// Public id of a hosted asset: the last path segment without its extension
pub fn public_id_from_url(raw: &str) -> Result<String, MediaError> {
    let url = url::Url::parse(raw).map_err(|_| MediaError::InvalidUrl(raw.to_string()))?;
    let last = url
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .ok_or_else(|| MediaError::InvalidUrl(raw.to_string()))?;

    let id = match last.rsplit_once('.') {
        Some((stem, _ext)) if !stem.is_empty() => stem,
        _ => last,
    };
    Ok(id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_public_id() {
        let url = "http://res.cloudinary.com/demo/video/upload/v1712345678/abc123.mp4";
        assert_eq!(public_id_from_url(url).unwrap(), "abc123");
    }

    #[test]
    fn public_id_without_extension() {
        let url = "https://res.cloudinary.com/demo/image/upload/v1/sample";
        assert_eq!(public_id_from_url(url).unwrap(), "sample");
    }

    #[test]
    fn keeps_inner_dots() {
        let url = "https://res.cloudinary.com/demo/image/upload/v1/my.thumb.jpg";
        assert_eq!(public_id_from_url(url).unwrap(), "my.thumb");
    }

    #[test]
    fn rejects_non_urls() {
        assert!(matches!(public_id_from_url("abc123.mp4"), Err(MediaError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn disabled_host_reports_missing_setting() {
        let host = DisabledMediaHost::new("CLOUDINARY_API_KEY");
        let err = host.upload(Path::new("/nonexistent")).await.unwrap_err();
        assert!(matches!(err, MediaError::NotConfigured("CLOUDINARY_API_KEY")));
    }

    #[tokio::test]
    async fn staged_file_is_removed_even_on_failure() {
        struct Failing;

        #[async_trait]
        impl MediaHost for Failing {
            async fn upload(&self, _path: &Path) -> Result<UploadedAsset, MediaError> {
                Err(MediaError::InvalidResponse("boom".into()))
            }
            async fn destroy(&self, _url: &str, _kind: ResourceKind) -> Result<(), MediaError> {
                Err(MediaError::InvalidResponse("boom".into()))
            }
        }

        let dir = std::env::temp_dir().join(format!("vidtube-media-{}", uuid::Uuid::new_v4()));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        let path = dir.join("clip.mp4");
        tokio::fs::write(&path, b"data").await.unwrap();

        assert!(upload_staged(&Failing, &path).await.is_err());
        assert!(!path.exists());

        // discard swallows the failure
        discard(&Failing, "https://res.cloudinary.com/x/image/upload/v1/a.jpg", ResourceKind::Image).await;
        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
