// 処理に関連するデータ型定義

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 実行バックエンドの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum BackendKind {
    /// 単一スレッドで順番に処理
    Sequential,
    /// 共有メモリのワーカープールで動的に処理
    #[value(name = "shared-parallel")]
    SharedParallel,
    /// 複数プロセスに静的分配して処理
    Distributed,
}

impl BackendKind {
    /// 出力ディレクトリ名などに使う識別子
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Sequential => "sequential",
            Self::SharedParallel => "shared-parallel",
            Self::Distributed => "distributed",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 閾値の決定方法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThresholdSource {
    /// 大津の方法で算出
    Computed,
    /// ユーザー指定
    UserProvided,
}

/// 1枚の画像に対する閾値の決定結果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdDecision {
    pub value: u8,
    pub source: ThresholdSource,
}

/// 処理時のメタデータ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingMetadata {
    pub input_bytes: u64,
    pub output_bytes: u64,
    pub image_dimensions: (u32, u32),
    pub input_channels: u8,
    pub output_channels: u8,
    pub processing_time_ms: u64,
}

/// 個別処理の結果
#[derive(Debug)]
pub enum ProcessingOutcome {
    Success {
        file_name: String,
        output_path: String,
        threshold: Option<ThresholdDecision>,
        metadata: ProcessingMetadata,
    },
    Skipped {
        file_name: String,
        error: String,
    },
}

impl ProcessingOutcome {
    pub fn file_name(&self) -> &str {
        match self {
            Self::Success { file_name, .. } | Self::Skipped { file_name, .. } => file_name,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// 処理全体のサマリー
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingSummary {
    pub total_files: usize,
    pub processed_files: usize,
    pub error_count: usize,
    pub total_processing_time_ms: u64,
    pub average_time_per_file_ms: f64,
}

impl ProcessingSummary {
    /// カウンタと経過時間からサマリーを作成
    pub fn from_counts(
        total_files: usize,
        processed_files: usize,
        error_count: usize,
        total_processing_time_ms: u64,
    ) -> Self {
        let average_time_per_file_ms = if total_files > 0 {
            total_processing_time_ms as f64 / total_files as f64
        } else {
            0.0
        };

        Self {
            total_files,
            processed_files,
            error_count,
            total_processing_time_ms,
            average_time_per_file_ms,
        }
    }

    /// 空のサマリー（割り当てファイルなし）
    pub fn empty() -> Self {
        Self::from_counts(0, 0, 0, 0)
    }
}

/// 実行レポート（--report 指定時にJSONで保存）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub filter: String,
    pub backend: BackendKind,
    pub rank: Option<usize>,
    pub world_size: Option<usize>,
    pub input_dir: String,
    pub output_dir: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub summary: ProcessingSummary,
}
