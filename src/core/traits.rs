// バッチ処理システムのトレイト定義
// 設定と進捗報告の抽象化インターフェース

use super::types::ThresholdDecision;
use async_trait::async_trait;
use mockall::automock;

/// バッチ処理の設定を抽象化するトレイト
#[automock]
pub trait ProcessingConfig: Send + Sync {
    /// 共有メモリ並列時のワーカー数
    fn worker_threads(&self) -> usize;

    /// チャンネルバッファサイズを取得
    fn channel_buffer_size(&self) -> usize;

    /// 画像内カーネルの分割数（1 なら逐次実行）
    fn kernel_partitions(&self) -> usize;

    /// 進捗報告を有効にするかどうか
    fn enable_progress_reporting(&self) -> bool;
}

/// 進捗報告の抽象化トレイト
///
/// スキップしたファイルと閾値の決定は発生した時点で必ず報告される。
#[automock]
#[async_trait]
pub trait ProgressReporter: Send + Sync {
    /// 処理開始時の報告
    async fn report_started(&self, total_files: usize);

    /// ファイル処理開始の報告
    async fn report_processing(&self, file_name: &str);

    /// 閾値決定の報告
    async fn report_threshold(&self, file_name: &str, decision: ThresholdDecision);

    /// 出力保存の報告
    async fn report_saved(&self, file_name: &str, output_path: &str);

    /// 進捗更新の報告
    async fn report_progress(&self, completed: usize, total: usize);

    /// スキップ（ファイル単位のエラー）の報告
    async fn report_error(&self, file_name: &str, error: &str);

    /// 処理完了時の報告
    async fn report_completed(&self, total_processed: usize, total_errors: usize);
}
