use crate::storage::StorageBackend;
use anyhow::{Context, Result};

/// 処理対象ファイル名の一覧（辞書順）
///
/// 分割の決定性のため必ずソート済み。構築後は変更しない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    names: Vec<String>,
}

impl Catalog {
    /// ストレージからディレクトリ直下の画像ファイルを列挙
    pub async fn discover<S>(storage: &S, source_dir: &str) -> Result<Self>
    where
        S: StorageBackend + ?Sized,
    {
        let items = storage
            .list_items(source_dir)
            .await
            .with_context(|| format!("Failed to list input directory: {source_dir}"))?;

        let names = items
            .into_iter()
            .filter(|item| storage.is_image_file(item))
            .map(|item| item.name)
            .collect();

        Ok(Self::from_names(names))
    }

    /// 既知のファイル名から作成（ソートする）
    pub fn from_names(mut names: Vec<String>) -> Self {
        names.sort();
        Self { names }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

}
