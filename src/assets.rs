//! Loading puzzle images before a round starts.

use async_trait::async_trait;
use derive_more::{Display, Error};
use tracing::{debug, info, instrument, warn};

use crate::games::puzzle::CatalogEntry;

/// An image could not be made available.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
#[display("Failed to load image {}: {}", image_ref, message)]
pub struct AssetError {
    /// Image that failed.
    pub image_ref: String,
    /// What went wrong.
    pub message: String,
}

impl AssetError {
    /// Creates a new asset error.
    pub fn new(image_ref: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            image_ref: image_ref.into(),
            message: message.into(),
        }
    }
}

/// Makes a catalog image available for display.
#[async_trait]
pub trait AssetLoader: Send + Sync {
    /// Resolves once the image is ready, or fails with the reason it is not.
    async fn ensure_loaded(&self, entry: &CatalogEntry) -> Result<(), AssetError>;
}

/// Fetches `http`/`https` images with a GET and checks local paths on disk.
#[derive(Debug, Clone, Default)]
pub struct HttpAssetLoader {
    client: reqwest::Client,
}

impl HttpAssetLoader {
    /// Creates a loader with a fresh HTTP client.
    pub fn new() -> Self {
        Self::default()
    }

    async fn fetch(&self, url: &str) -> Result<(), AssetError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AssetError::new(url, e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(AssetError::new(url, format!("HTTP {}", status)));
        }
        let body = response
            .bytes()
            .await
            .map_err(|e| AssetError::new(url, e.to_string()))?;
        if body.is_empty() {
            return Err(AssetError::new(url, "empty response body"));
        }
        debug!(bytes = body.len(), "Image downloaded");
        Ok(())
    }

    async fn check_file(&self, path: &str) -> Result<(), AssetError> {
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| AssetError::new(path, e.to_string()))?;
        if !metadata.is_file() || metadata.len() == 0 {
            return Err(AssetError::new(path, "not a non-empty file"));
        }
        Ok(())
    }
}

#[async_trait]
impl AssetLoader for HttpAssetLoader {
    #[instrument(skip(self, entry), fields(image_ref = %entry.image_ref()))]
    async fn ensure_loaded(&self, entry: &CatalogEntry) -> Result<(), AssetError> {
        let image_ref = entry.image_ref();
        let result = if image_ref.starts_with("http://") || image_ref.starts_with("https://") {
            self.fetch(image_ref).await
        } else {
            self.check_file(image_ref).await
        };
        match &result {
            Ok(()) => info!(title = %entry.title(), "Image ready"),
            Err(e) => warn!(error = %e, "Image unavailable"),
        }
        result
    }
}

/// Treats every image as available without touching the network.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineAssetLoader;

#[async_trait]
impl AssetLoader for OfflineAssetLoader {
    async fn ensure_loaded(&self, entry: &CatalogEntry) -> Result<(), AssetError> {
        debug!(title = %entry.title(), "Offline mode, skipping image fetch");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_offline_loader_always_succeeds() {
        let entry = CatalogEntry::new("https://example.invalid/x.png".into(), "X".into());
        assert!(OfflineAssetLoader.ensure_loaded(&entry).await.is_ok());
    }

    #[tokio::test]
    async fn test_local_file_checked() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(b"png").expect("write");
        let path = file.path().display().to_string();
        let loader = HttpAssetLoader::new();
        assert!(loader
            .ensure_loaded(&CatalogEntry::new(path, "Local".into()))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_missing_file_fails() {
        let loader = HttpAssetLoader::new();
        let err = loader
            .ensure_loaded(&CatalogEntry::new("/no/such/image.png".into(), "Gone".into()))
            .await
            .expect_err("missing file");
        assert_eq!(err.image_ref, "/no/such/image.png");
    }
}
