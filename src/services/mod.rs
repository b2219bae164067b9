// サービス層 - 設定と進捗報告
// 各サービスは特定の責任を持ち、エンジン層から注入される

pub mod config;
pub mod monitoring;

// 公開API - 各サービスの主要機能を明示的にエクスポート
pub use config::DefaultProcessingConfig;
pub use monitoring::{ConsoleProgressReporter, NoOpProgressReporter};
