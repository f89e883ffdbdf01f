use axum::extract::Multipart;
use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::error::ApiError;
use crate::validate::present;

/// A multipart file part written to the staging directory.
///
/// `with_staged_form` removes staged files once the handler is done. Dropping
/// the guard queues a removal on the runtime as well, which covers handlers
/// cancelled mid-request.
#[derive(Debug)]
pub struct StagedFile {
    path: PathBuf,
}

impl StagedFile {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(remove_staged_file(self.path.clone()));
        }
    }
}

async fn remove_staged_file(path: PathBuf) {
    match tokio::fs::remove_file(&path).await {
        Ok(()) => tracing::debug!(path = %path.display(), "removed staged file"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(path = %path.display(), "failed to remove staged file: {}", e),
    }
}

/// Read a multipart body, hand it to `handle`, then remove every file it staged
pub async fn with_staged_form<T, F, Fut>(multipart: Multipart, temp_dir: &Path, handle: F) -> Result<T, ApiError>
where
    F: FnOnce(StagedForm) -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let form = StagedForm::read(multipart, temp_dir).await?;
    let staged = form.staged_paths();
    let result = handle(form).await;
    for path in staged {
        remove_staged_file(path).await;
    }
    result
}

/// Text fields and staged files of a multipart request
#[derive(Debug, Default)]
pub struct StagedForm {
    fields: HashMap<String, String>,
    files: HashMap<String, StagedFile>,
}

impl StagedForm {
    /// Drain `multipart`, streaming file parts into `temp_dir`. Files staged
    /// before a failure are removed again.
    pub async fn read(multipart: Multipart, temp_dir: &Path) -> Result<Self, ApiError> {
        let mut form = StagedForm::default();
        if let Err(e) = form.drain(multipart, temp_dir).await {
            for path in form.staged_paths() {
                remove_staged_file(path).await;
            }
            return Err(e);
        }
        Ok(form)
    }

    async fn drain(&mut self, mut multipart: Multipart, temp_dir: &Path) -> Result<(), ApiError> {
        while let Some(mut field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::bad_request(format!("Malformed multipart body: {}", e)))?
        {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            if field.file_name().is_none() {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Malformed multipart field '{}': {}", name, e)))?;
                self.fields.insert(name, text);
                continue;
            }

            tokio::fs::create_dir_all(temp_dir).await.map_err(staging_error)?;
            let path = temp_dir.join(staged_file_name(field.file_name()));
            let mut file = tokio::fs::File::create(&path).await.map_err(staging_error)?;
            // Tracked before the first chunk so a failed body still gets cleaned up
            self.files.insert(name.clone(), StagedFile { path });

            while let Some(chunk) = field
                .chunk()
                .await
                .map_err(|e| ApiError::bad_request(format!("Malformed multipart field '{}': {}", name, e)))?
            {
                file.write_all(&chunk).await.map_err(staging_error)?;
            }
            file.flush().await.map_err(staging_error)?;
        }

        Ok(())
    }

    fn staged_paths(&self) -> Vec<PathBuf> {
        self.files.values().map(|file| file.path.clone()).collect()
    }

    /// Non-blank text field
    pub fn text(&mut self, name: &str) -> Option<String> {
        present(self.fields.remove(name))
    }

    pub fn has_file(&self, name: &str) -> bool {
        self.files.contains_key(name)
    }

    pub fn take_file(&mut self, name: &str) -> Option<StagedFile> {
        self.files.remove(name)
    }
}

fn staging_error(e: std::io::Error) -> ApiError {
    tracing::error!("Failed to stage upload: {}", e);
    ApiError::internal_server_error("Failed to store uploaded file")
}

/// Random name that keeps a short alphanumeric extension from the client's file name
fn staged_file_name(original: Option<&str>) -> String {
    let ext = original
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric()));

    match ext {
        Some(ext) => format!("{}.{}", Uuid::new_v4().simple(), ext.to_ascii_lowercase()),
        None => Uuid::new_v4().simple().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_safe_extensions_only() {
        assert!(staged_file_name(Some("clip.MP4")).ends_with(".mp4"));
        assert!(!staged_file_name(Some("../../etc/passwd")).contains('/'));
        assert!(!staged_file_name(Some("evil.sh;rm")).contains('.'));
        assert!(!staged_file_name(None).contains('.'));
    }

    #[tokio::test]
    async fn dropped_staged_file_is_removed_in_the_background() {
        let path = std::env::temp_dir().join(format!("vidtube-staged-{}", Uuid::new_v4()));
        tokio::fs::write(&path, b"x").await.unwrap();
        drop(StagedFile { path: path.clone() });

        for _ in 0..100 {
            if tokio::fs::metadata(&path).await.is_err() {
                return;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        panic!("staged file still present: {}", path.display());
    }

    #[tokio::test]
    async fn removing_a_missing_file_is_quiet() {
        let path = std::env::temp_dir().join(format!("vidtube-missing-{}", Uuid::new_v4()));
        remove_staged_file(path.clone()).await;
        assert!(tokio::fs::metadata(&path).await.is_err());
    }
}
