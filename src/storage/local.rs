use super::{StorageBackend, StorageItem};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::Path;
use walkdir::WalkDir;

/// ローカルファイルシステム用のストレージバックエンド
#[derive(Clone, Debug)]
pub struct LocalStorageBackend;

impl Default for LocalStorageBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalStorageBackend {
    pub fn new() -> Self {
        Self
    }

    /// ディレクトリ直下をファイル名順に列挙（ブロッキング）
    fn list_dir_blocking(dir: &Path) -> Result<Vec<StorageItem>> {
        if !dir.is_dir() {
            anyhow::bail!("Not a readable directory: {}", dir.display());
        }

        let mut items = Vec::new();
        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry =
                entry.with_context(|| format!("Failed to read directory: {}", dir.display()))?;
            let id = entry.path().to_string_lossy().into_owned();

            if entry.file_type().is_dir() {
                items.push(StorageItem::directory(id));
            } else {
                let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
                items.push(StorageItem::file(id, size));
            }
        }

        Ok(items)
    }
}

#[async_trait]
impl StorageBackend for LocalStorageBackend {
    async fn list_items(&self, dir: &str) -> Result<Vec<StorageItem>> {
        let path = Path::new(dir).to_path_buf();
        tokio::task::spawn_blocking(move || Self::list_dir_blocking(&path))
            .await
            .context("Failed to spawn blocking task for directory listing")?
    }

    async fn read_item(&self, id: &str) -> Result<Vec<u8>> {
        let data = tokio::fs::read(id)
            .await
            .with_context(|| format!("Failed to read file: {id}"))?;
        Ok(data)
    }

    async fn write_item(&self, id: &str, data: &[u8]) -> Result<()> {
        tokio::fs::write(id, data)
            .await
            .with_context(|| format!("Failed to write file: {id}"))
    }

    async fn ensure_directory(&self, dir: &str) -> Result<()> {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create directory: {dir}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_list_items_sorted_and_flat() {
        let temp_dir = tempdir().unwrap();
        let temp_path = temp_dir.path();

        std::fs::write(temp_path.join("b.png"), b"dummy").unwrap();
        std::fs::write(temp_path.join("a.jpg"), b"dummy").unwrap();
        std::fs::write(temp_path.join("notes.txt"), b"dummy").unwrap();
        std::fs::create_dir(temp_path.join("nested")).unwrap();
        std::fs::write(temp_path.join("nested").join("deep.png"), b"dummy").unwrap();

        let backend = LocalStorageBackend::new();
        let items = backend
            .list_items(temp_path.to_str().unwrap())
            .await
            .unwrap();

        let names: Vec<&str> = items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["a.jpg", "b.png", "nested", "notes.txt"]);
        assert!(items.iter().any(|i| i.name == "nested" && i.is_directory));

        let images: Vec<_> = items.iter().filter(|i| backend.is_image_file(i)).collect();
        assert_eq!(images.len(), 2);
    }

    #[tokio::test]
    async fn test_list_missing_directory_fails() {
        let backend = LocalStorageBackend::new();
        let result = backend.list_items("/nonexistent/input_dir").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_write_then_read() {
        let temp_dir = tempdir().unwrap();
        let out_dir = temp_dir.path().join("out").join("grayscale_sequential");
        let out_dir_str = out_dir.to_str().unwrap();

        let backend = LocalStorageBackend::new();
        backend.ensure_directory(out_dir_str).await.unwrap();
        backend.ensure_directory(out_dir_str).await.unwrap();

        let file = out_dir.join("x.png");
        let file_str = file.to_str().unwrap();
        backend.write_item(file_str, b"Hello").await.unwrap();

        assert_eq!(backend.read_item(file_str).await.unwrap(), b"Hello");
    }

    #[tokio::test]
    async fn test_write_into_missing_directory_fails() {
        let temp_dir = tempdir().unwrap();
        let file = temp_dir.path().join("missing").join("x.png");

        let backend = LocalStorageBackend::new();
        assert!(backend
            .write_item(file.to_str().unwrap(), b"data")
            .await
            .is_err());
    }
}
