use super::{StorageBackend, StorageItem};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

/// メモリ上のストレージバックエンド（テスト用）
///
/// クローンは同じ内容を共有する。
#[derive(Clone, Debug, Default)]
pub struct MemoryStorageBackend {
    inner: Arc<Mutex<MemoryState>>,
}

#[derive(Debug, Default)]
struct MemoryState {
    files: BTreeMap<String, Vec<u8>>,
    directories: BTreeSet<String>,
}

fn parent_of(id: &str) -> String {
    Path::new(id)
        .parent()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default()
}

impl MemoryState {
    fn add_directory(&mut self, dir: &str) {
        let mut current = Some(Path::new(dir));
        while let Some(path) = current {
            let key = path.to_string_lossy().into_owned();
            if key.is_empty() {
                break;
            }
            self.directories.insert(key);
            current = path.parent();
        }
    }
}

impl MemoryStorageBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// 親ディレクトリごとファイルを追加
    pub fn with_file(self, id: &str, data: impl Into<Vec<u8>>) -> Self {
        if let Ok(mut state) = self.inner.lock() {
            state.add_directory(&parent_of(id));
            state.files.insert(id.to_string(), data.into());
        }
        self
    }

    /// 空のディレクトリを追加
    pub fn with_directory(self, dir: &str) -> Self {
        if let Ok(mut state) = self.inner.lock() {
            state.add_directory(dir);
        }
        self
    }

    /// 保存済みファイルの内容
    pub fn file(&self, id: &str) -> Option<Vec<u8>> {
        self.inner.lock().ok()?.files.get(id).cloned()
    }

    /// 保存済みファイルのパス一覧（昇順）
    pub fn file_ids(&self) -> Vec<String> {
        self.inner
            .lock()
            .map(|state| state.files.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn state(&self) -> Result<MutexGuard<'_, MemoryState>> {
        self.inner
            .lock()
            .map_err(|_| anyhow!("Memory storage lock poisoned"))
    }
}

#[async_trait]
impl StorageBackend for MemoryStorageBackend {
    async fn list_items(&self, dir: &str) -> Result<Vec<StorageItem>> {
        let state = self.state()?;
        if !state.directories.contains(dir) {
            anyhow::bail!("Failed to read directory: {dir}");
        }

        let directories = state
            .directories
            .iter()
            .filter(|d| parent_of(d) == dir)
            .map(|d| StorageItem::directory(d.clone()));
        let files = state
            .files
            .iter()
            .filter(|(id, _)| parent_of(id) == dir)
            .map(|(id, data)| StorageItem::file(id.clone(), data.len() as u64));

        let mut items: Vec<StorageItem> = directories.chain(files).collect();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(items)
    }

    async fn read_item(&self, id: &str) -> Result<Vec<u8>> {
        self.state()?
            .files
            .get(id)
            .cloned()
            .ok_or_else(|| anyhow!("Failed to read file: {id}"))
    }

    async fn write_item(&self, id: &str, data: &[u8]) -> Result<()> {
        let mut state = self.state()?;
        let parent = parent_of(id);
        if !parent.is_empty() && !state.directories.contains(&parent) {
            anyhow::bail!("Failed to write file: {id} (directory {parent} does not exist)");
        }
        state.files.insert(id.to_string(), data.to_vec());
        Ok(())
    }

    async fn ensure_directory(&self, dir: &str) -> Result<()> {
        self.state()?.add_directory(dir);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_list_items_is_flat_and_sorted() {
        let storage = MemoryStorageBackend::new()
            .with_file("input/b.png", vec![1, 2])
            .with_file("input/a.jpg", vec![3])
            .with_file("input/sub/c.png", vec![4])
            .with_file("other/d.png", vec![5]);

        let items = storage.list_items("input").await.unwrap();
        let names: Vec<&str> = items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["a.jpg", "b.png", "sub"]);
        assert_eq!(items[1].size, 2);
        assert!(items[2].is_directory);
    }

    #[tokio::test]
    async fn test_unknown_directory_fails() {
        let storage = MemoryStorageBackend::new();
        assert!(storage.list_items("missing").await.is_err());
    }

    #[tokio::test]
    async fn test_write_requires_existing_directory() {
        let storage = MemoryStorageBackend::new();
        assert!(storage.write_item("out/x.png", b"x").await.is_err());

        storage.ensure_directory("out").await.unwrap();
        storage.write_item("out/x.png", b"x").await.unwrap();
        assert_eq!(storage.file("out/x.png"), Some(b"x".to_vec()));
    }

    #[tokio::test]
    async fn test_ensure_directory_creates_ancestors() {
        let storage = MemoryStorageBackend::new();
        storage
            .ensure_directory("output_folder/sobel_sequential")
            .await
            .unwrap();

        assert!(storage.list_items("output_folder").await.unwrap()[0].is_directory);
    }

    #[tokio::test]
    async fn test_clones_share_contents() {
        let storage = MemoryStorageBackend::new().with_directory("out");
        let clone = storage.clone();
        clone.write_item("out/y.png", b"y").await.unwrap();

        assert_eq!(storage.file_ids(), vec!["out/y.png".to_string()]);
        assert!(storage.read_item("missing.png").await.is_err());
    }
}
