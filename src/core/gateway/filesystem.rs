use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use super::{build_public_url, StorageGateway};
use crate::core::error::GatewayError;

/// Object storage on the local filesystem: `<root>/<bucket>/<key>`.
#[derive(Clone, Debug)]
pub struct FilesystemStorage {
    root: PathBuf,
    public_base_url: String,
}

impl FilesystemStorage {
    pub fn new(root: impl Into<PathBuf>, public_base_url: &str) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self, bucket: &str, key: &str) -> Result<PathBuf, GatewayError> {
        for part in [bucket, key] {
            let mut components = Path::new(part).components();
            let single_normal = matches!(components.next(), Some(Component::Normal(_)))
                && components.next().is_none();
            if !single_normal {
                return Err(GatewayError::storage(format!(
                    "invalid object path segment: {part}"
                )));
            }
        }
        Ok(self.root.join(bucket).join(key))
    }
}

#[async_trait]
impl StorageGateway for FilesystemStorage {
    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        bytes: &[u8],
        _content_type: &str,
    ) -> Result<(), GatewayError> {
        let path = self.object_path(bucket, key)?;
        debug!("writing {} bytes to {}", bytes.len(), path.display());
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|err| GatewayError::storage(err.to_string()))?;
        }
        fs::write(&path, bytes)
            .await
            .map_err(|err| GatewayError::storage(err.to_string()))
    }

    fn public_url(&self, bucket: &str, key: &str) -> String {
        build_public_url(&self.public_base_url, bucket, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upload_writes_under_bucket() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let storage = FilesystemStorage::new(dir.path(), "http://localhost:8000");
        storage
            .upload("avatars", "u1-0.25.png", b"\x89PNG", "image/png")
            .await?;
        let path = dir.path().join("avatars").join("u1-0.25.png");
        let written = tokio::fs::read(path).await?;
        assert_eq!(written, b"\x89PNG");
        Ok(())
    }

    #[tokio::test]
    async fn test_upload_rejects_traversal() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let storage = FilesystemStorage::new(dir.path(), "http://localhost:8000");
        let res = storage
            .upload("avatars", "../escape.png", b"x", "image/png")
            .await;
        assert!(matches!(res, Err(GatewayError::Storage(_))));
        Ok(())
    }

    #[test]
    fn test_public_url() {
        let storage = FilesystemStorage::new("./storage", "https://cdn.example.com");
        assert_eq!(
            storage.public_url("avatars", "u1-0.5.jpg"),
            "https://cdn.example.com/storage/v1/object/public/avatars/u1-0.5.jpg"
        );
    }
}
