use anyhow::{anyhow, Result};
use async_trait::async_trait;
use bytes::Bytes;
use std::path::PathBuf;

use super::ImageStore;

/// Local filesystem image store / 本地图片存储
///
/// References are bare file names inside `root` (`{post_id}_{uuid}.{ext}`).
pub struct LocalImageStore {
    root: PathBuf,
}

impl LocalImageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Reject references that could escape the image directory / 防止路径穿越
    fn resolve(&self, reference: &str) -> Option<PathBuf> {
        let valid = !reference.is_empty()
            && !reference.contains(['/', '\\'])
            && reference != "."
            && reference != "..";
        valid.then(|| self.root.join(reference))
    }
}

fn clean_extension(extension: &str) -> String {
    let ext: String = extension
        .trim_start_matches('.')
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();
    if ext.is_empty() {
        "bin".to_string()
    } else {
        ext.to_lowercase()
    }
}

#[async_trait]
impl ImageStore for LocalImageStore {
    async fn write(&self, post_id: i64, data: Bytes, extension: &str) -> Result<String> {
        tokio::fs::create_dir_all(&self.root).await?;

        let reference = format!("{}_{}.{}", post_id, uuid::Uuid::new_v4().simple(), clean_extension(extension));
        let path = self
            .resolve(&reference)
            .ok_or_else(|| anyhow!("invalid image reference: {}", reference))?;
        tokio::fs::write(&path, &data).await?;

        tracing::debug!("Image stored: {:?} ({} bytes)", path, data.len());
        Ok(reference)
    }

    async fn read(&self, reference: &str) -> Result<Option<Bytes>> {
        let Some(path) = self.resolve(reference) else {
            return Ok(None);
        };
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Some(Bytes::from(data))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
