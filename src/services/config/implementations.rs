// 設定管理の具象実装

use crate::core::{ProcessingConfig, ProcessingError, ProcessingResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// デフォルト設定実装
///
/// JSON 設定ファイルから読み込める。ファイルにない項目は既定値になる。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultProcessingConfig {
    worker_threads: usize,
    channel_buffer_size: usize,
    kernel_partitions: usize,
    enable_progress_reporting: bool,
}

impl DefaultProcessingConfig {
    pub fn new(cpu_count: usize) -> Self {
        let cpu_count = cpu_count.max(1);
        Self {
            worker_threads: cpu_count,
            channel_buffer_size: 100,
            kernel_partitions: cpu_count,
            enable_progress_reporting: true,
        }
    }

    pub fn with_worker_threads(mut self, worker_threads: usize) -> Self {
        self.worker_threads = worker_threads;
        self
    }

    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.channel_buffer_size = buffer_size;
        self
    }

    pub fn with_kernel_partitions(mut self, partitions: usize) -> Self {
        self.kernel_partitions = partitions;
        self
    }

    pub fn with_progress_reporting(mut self, enable: bool) -> Self {
        self.enable_progress_reporting = enable;
        self
    }

    /// JSON 設定ファイルから読み込み、検証する
    pub fn from_json_file(path: &Path) -> ProcessingResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            ProcessingError::configuration(format!(
                "設定ファイルを読めません: {} ({e})",
                path.display()
            ))
        })?;

        let config: Self = serde_json::from_str(&text).map_err(|e| {
            ProcessingError::configuration(format!(
                "設定ファイルの形式が不正です: {} ({e})",
                path.display()
            ))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// 値の範囲を検証
    pub fn validate(&self) -> ProcessingResult<()> {
        if self.worker_threads == 0 {
            return Err(ProcessingError::validation(
                "worker_threads",
                "1以上である必要があります",
            ));
        }
        if self.channel_buffer_size == 0 {
            return Err(ProcessingError::validation(
                "channel_buffer_size",
                "1以上である必要があります",
            ));
        }
        Ok(())
    }
}

impl Default for DefaultProcessingConfig {
    fn default() -> Self {
        Self::new(num_cpus::get())
    }
}

impl ProcessingConfig for DefaultProcessingConfig {
    fn worker_threads(&self) -> usize {
        self.worker_threads
    }

    fn channel_buffer_size(&self) -> usize {
        self.channel_buffer_size
    }

    fn kernel_partitions(&self) -> usize {
        self.kernel_partitions
    }

    fn enable_progress_reporting(&self) -> bool {
        self.enable_progress_reporting
    }
}
