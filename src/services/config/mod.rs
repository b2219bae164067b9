// 設定管理機能
// ワーカー数、チャンネルサイズ、画像内並列度、JSON 設定ファイル

pub mod implementations;

// 公開API
pub use implementations::DefaultProcessingConfig;
