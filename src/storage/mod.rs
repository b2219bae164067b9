use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

pub mod local;
pub mod memory;

/// 処理対象として受け付ける拡張子（大文字小文字を区別しない）
pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// ストレージ内のアイテムを表す構造体
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageItem {
    /// アイテムの識別子（パス）
    pub id: String,
    /// アイテム名（ファイル名）
    pub name: String,
    /// アイテムのサイズ（バイト）
    pub size: u64,
    /// アイテムがディレクトリかどうか
    pub is_directory: bool,
    /// 拡張子（あれば）
    pub extension: Option<String>,
}

impl StorageItem {
    /// パス文字列からファイルのアイテムを作成
    pub fn file(id: impl Into<String>, size: u64) -> Self {
        let id = id.into();
        let path = std::path::Path::new(&id);
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().into_owned());

        Self {
            name,
            size,
            is_directory: false,
            extension,
            id,
        }
    }

    /// パス文字列からディレクトリのアイテムを作成
    pub fn directory(id: impl Into<String>) -> Self {
        let id = id.into();
        let name = std::path::Path::new(&id)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            name,
            size: 0,
            is_directory: true,
            extension: None,
            id,
        }
    }
}

/// ストレージバックエンドのトレイト
#[automock]
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// ディレクトリ直下のアイテムをリストする（再帰しない）
    async fn list_items(&self, dir: &str) -> Result<Vec<StorageItem>>;

    /// アイテムのデータを読み込む
    async fn read_item(&self, id: &str) -> Result<Vec<u8>>;

    /// アイテムを書き込む（既存なら上書き）
    async fn write_item(&self, id: &str, data: &[u8]) -> Result<()>;

    /// ディレクトリを作成する（既存なら何もしない）
    async fn ensure_directory(&self, dir: &str) -> Result<()>;

    /// 処理対象の画像ファイルかどうかを判定
    fn is_image_file(&self, item: &StorageItem) -> bool {
        if item.is_directory {
            return false;
        }

        item.extension.as_deref().is_some_and(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|supported| ext.eq_ignore_ascii_case(supported))
        })
    }
}
