// 画像フィルタのカーネル群
// ピクセル単位の変換、Sobel、ヒストグラムと大津法、汎用並列リダクション

pub mod histogram;
pub mod pixel;
pub mod reduce;
pub mod sobel;

use crate::core::{RasterBuffer, ThresholdDecision, ThresholdSource};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub use histogram::{build_histogram, compute_threshold, Histogram, GRAY_LEVELS};
pub use pixel::{apply_threshold, grayscale, luma, negative, to_luma};
pub use reduce::parallel_reduce;
pub use sobel::sobel;

/// カーネル実行時のエラー
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KernelError {
    #[error("{kernel}: チャンネル数 {actual} には未対応です (必要: {expected})")]
    UnsupportedChannels {
        kernel: &'static str,
        expected: &'static str,
        actual: u8,
    },

    #[error("画像が小さすぎます: {width}x{height} (最小 {min}x{min})")]
    ImageTooSmall { width: u32, height: u32, min: u32 },
}

/// 画像内の実行方法
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionPolicy {
    Serial,
    /// rayon で並列実行。`partitions` はヒストグラムの私的区間数
    Parallel { partitions: usize },
}

impl ExecutionPolicy {
    /// 分割数から実行方法を決定（1 以下は逐次）
    pub fn from_partitions(partitions: usize) -> Self {
        if partitions <= 1 {
            Self::Serial
        } else {
            Self::Parallel { partitions }
        }
    }
}

/// フィルタの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    Grayscale,
    Negative,
    Sobel,
    Otsu,
}

impl FilterKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Grayscale => "grayscale",
            Self::Negative => "negative",
            Self::Sobel => "sobel",
            Self::Otsu => "otsu",
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 大津法の閾値指定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThresholdMode {
    /// ヒストグラムから自動算出
    #[default]
    Auto,
    /// 固定値
    Fixed(u8),
}

impl ThresholdMode {
    /// CLI の値から変換（0 は自動算出）
    pub fn from_cli_value(value: u8) -> Self {
        match value {
            0 => Self::Auto,
            fixed => Self::Fixed(fixed),
        }
    }
}

/// フィルタ指定（種類 + 大津法の閾値）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterSpec {
    pub kind: FilterKind,
    pub threshold: ThresholdMode,
}

/// フィルタ適用結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOutput {
    pub raster: RasterBuffer,
    pub threshold: Option<ThresholdDecision>,
}

impl FilterSpec {
    pub fn new(kind: FilterKind) -> Self {
        Self {
            kind,
            threshold: ThresholdMode::Auto,
        }
    }

    pub fn with_threshold(mut self, threshold: ThresholdMode) -> Self {
        self.threshold = threshold;
        self
    }

    /// デコード済み画像にフィルタを適用
    pub fn apply(
        &self,
        input: &RasterBuffer,
        policy: ExecutionPolicy,
    ) -> Result<FilterOutput, KernelError> {
        match self.kind {
            FilterKind::Grayscale => {
                // 単一チャンネルは既にグレースケール
                let raster = if input.channels() < 3 {
                    input.clone()
                } else {
                    grayscale(input, policy)?
                };
                Ok(FilterOutput {
                    raster,
                    threshold: None,
                })
            }
            FilterKind::Negative => Ok(FilterOutput {
                raster: negative(input, policy),
                threshold: None,
            }),
            FilterKind::Sobel => {
                let gray = to_luma(input, policy);
                Ok(FilterOutput {
                    raster: sobel(&gray, policy)?,
                    threshold: None,
                })
            }
            FilterKind::Otsu => {
                let gray = to_luma(input, policy);
                let decision = match self.threshold {
                    ThresholdMode::Fixed(value) => ThresholdDecision {
                        value,
                        source: ThresholdSource::UserProvided,
                    },
                    ThresholdMode::Auto => {
                        let histogram = build_histogram(&gray, policy)?;
                        ThresholdDecision {
                            value: compute_threshold(&histogram, gray.pixel_count() as u64),
                            source: ThresholdSource::Computed,
                        }
                    }
                };
                Ok(FilterOutput {
                    raster: apply_threshold(&gray, decision.value, policy)?,
                    threshold: Some(decision),
                })
            }
        }
    }
}
