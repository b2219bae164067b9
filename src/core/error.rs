// バッチ処理用のカスタムエラー型定義
// 実行全体を止めるエラーのみ。ファイル単位の失敗はスキップとして結果に記録する

use thiserror::Error;

/// バッチ処理固有のエラー型
#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("ファイル発見エラー: {path} - {source}")]
    FileDiscoveryError {
        path: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("並列処理エラー: {message}")]
    ParallelExecutionError { message: String },

    #[error("設定エラー: {message}")]
    ConfigurationError { message: String },

    #[error("分配プロトコルエラー (rank {rank}): {message}")]
    DistributionError { rank: usize, message: String },

    #[error("実行中断: {reason}")]
    AbortedError { reason: String },

    #[error("ワーカープロセスエラー (rank {rank}): {message}")]
    WorkerProcessError { rank: usize, message: String },

    #[error("バリデーションエラー: {field} - {reason}")]
    ValidationError { field: String, reason: String },

    #[error("内部エラー: {source}")]
    InternalError {
        #[source]
        source: anyhow::Error,
    },
}

impl ProcessingError {
    /// ファイル発見エラーの作成
    pub fn file_discovery(path: impl Into<String>, source: anyhow::Error) -> Self {
        Self::FileDiscoveryError {
            path: path.into(),
            source,
        }
    }

    /// 並列実行エラーの作成
    pub fn parallel_execution(message: impl Into<String>) -> Self {
        Self::ParallelExecutionError {
            message: message.into(),
        }
    }

    /// 設定エラーの作成
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::ConfigurationError {
            message: message.into(),
        }
    }

    /// 分配プロトコルエラーの作成
    pub fn distribution(rank: usize, message: impl Into<String>) -> Self {
        Self::DistributionError {
            rank,
            message: message.into(),
        }
    }

    /// コーディネーターからの中断
    pub fn aborted(reason: impl Into<String>) -> Self {
        Self::AbortedError {
            reason: reason.into(),
        }
    }

    /// ワーカープロセスエラーの作成
    pub fn worker_process(rank: usize, message: impl Into<String>) -> Self {
        Self::WorkerProcessError {
            rank,
            message: message.into(),
        }
    }

    /// バリデーションエラーの作成
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// 内部エラーの作成
    pub fn internal(source: anyhow::Error) -> Self {
        Self::InternalError { source }
    }

}

/// バッチ処理の結果型
pub type ProcessingResult<T> = std::result::Result<T, ProcessingError>;

impl From<anyhow::Error> for ProcessingError {
    fn from(error: anyhow::Error) -> Self {
        ProcessingError::InternalError { source: error }
    }
}
