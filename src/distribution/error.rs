use super::batch::BatchError;
use super::frame::FrameError;
use crate::core::ProcessingError;
use thiserror::Error;

/// 分配プロトコルと通信層のエラー（すべて実行全体にとって致命的）
#[derive(Error, Debug)]
pub enum DistributionError {
    #[error("ワーカー数が 0 です")]
    EmptyGroup,

    #[error("rank {rank} はグループサイズ {size} の範囲外です")]
    InvalidRank { rank: usize, size: usize },

    #[error("rank {rank} には {operation} を実行できません")]
    InvalidRole { rank: usize, operation: &'static str },

    #[error("ルートの送信データがありません: {operation}")]
    MissingRootData { operation: &'static str },

    #[error("想定外のフレーム: {expected} を待っていましたが {actual} を受信しました")]
    UnexpectedFrame {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("長さが一致しません: 期待 {expected} バイト、実際 {actual} バイト")]
    LengthMismatch { expected: u64, actual: u64 },

    #[error("rank {rank} の担当件数が一致しません: 期待 {expected}、実際 {actual}")]
    CountMismatch {
        rank: usize,
        expected: usize,
        actual: usize,
    },

    #[error("ルートにより中止されました: {reason}")]
    Aborted { reason: String },

    #[error("rank {rank} との接続が切れました")]
    Disconnected { rank: usize },

    #[error("ワーカープロセス rank {rank} を起動できません: {source}")]
    Spawn {
        rank: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("ワーカープロセス rank {rank} が異常終了しました: {status}")]
    WorkerFailed { rank: usize, status: String },

    #[error("ファイル名リストが不正です: {0}")]
    Batch(#[from] BatchError),

    #[error("フレームエラー: {0}")]
    Frame(#[from] FrameError),
}

impl DistributionError {
    /// 実行全体のエラーへ変換
    pub fn into_processing_error(self, rank: usize) -> ProcessingError {
        match self {
            DistributionError::Aborted { reason } => ProcessingError::aborted(reason),
            DistributionError::WorkerFailed { rank, status } => {
                ProcessingError::worker_process(rank, status)
            }
            DistributionError::Spawn { rank, source } => {
                ProcessingError::worker_process(rank, source.to_string())
            }
            other => ProcessingError::distribution(rank, other.to_string()),
        }
    }
}
