use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

use super::{Result, ServiceError};

/// Opaque pass-through to an external object store: given bytes and a
/// name, returns a URL or an error.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn upload(&self, name: &str, content: Vec<u8>) -> Result<String>;
    async fn delete(&self, url: &str) -> Result<()>;
}

/// Placeholder storage backend. The deployment currently runs without
/// an object store, so both operations are refused outright.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledStorage;

#[async_trait]
impl ObjectStorage for DisabledStorage {
    async fn upload(&self, _name: &str, _content: Vec<u8>) -> Result<String> {
        Err(ServiceError::Denied("File upload is disabled"))
    }

    async fn delete(&self, _url: &str) -> Result<()> {
        Err(ServiceError::Denied("File deletion is disabled"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadedFile {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileDeleted {
    pub message: &'static str,
}

/// File upload and deletion behind whatever [`ObjectStorage`] backend
/// the process was built with.
#[derive(Clone)]
pub struct FileService {
    storage: Arc<dyn ObjectStorage>,
}

impl FileService {
    #[must_use]
    pub fn new(storage: Arc<dyn ObjectStorage>) -> Self {
        Self { storage }
    }

    #[tracing::instrument(name = "services.files.upload", skip(self, content))]
    pub async fn upload_file(&self, name: &str, content: Vec<u8>) -> Result<UploadedFile> {
        let url = self.storage.upload(name, content).await?;
        Ok(UploadedFile { url })
    }

    #[tracing::instrument(name = "services.files.delete", skip(self))]
    pub async fn delete_file(&self, url: &str) -> Result<FileDeleted> {
        self.storage.delete(url).await?;
        Ok(FileDeleted {
            message: "File deleted successfully",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disabled_storage_refuses_both_operations() {
        let service = FileService::new(Arc::new(DisabledStorage));

        let err = service
            .upload_file("avatar.png", vec![1, 2, 3])
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Denied("File upload is disabled")));

        let err = service.delete_file("https://example.com/a.png").await.unwrap_err();
        assert!(matches!(err, ServiceError::Denied("File deletion is disabled")));
    }
}
