// 進捗監視の具象実装

use crate::core::{ProgressReporter, ThresholdDecision, ThresholdSource};
use async_trait::async_trait;

/// コンソール出力による進捗報告実装
///
/// 分散実行時は rank ラベルを行頭に付ける。
#[derive(Debug, Default, Clone)]
pub struct ConsoleProgressReporter {
    quiet: bool,
    label: Option<String>,
}

impl ConsoleProgressReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn quiet() -> Self {
        Self {
            quiet: true,
            label: None,
        }
    }

    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn with_rank(mut self, rank: usize, size: usize) -> Self {
        self.label = Some(format!("[rank {rank}/{size}] "));
        self
    }

    fn prefix(&self) -> &str {
        self.label.as_deref().unwrap_or("")
    }

    fn threshold_line(&self, file_name: &str, decision: ThresholdDecision) -> String {
        let source = match decision.source {
            ThresholdSource::Computed => "大津法で算出",
            ThresholdSource::UserProvided => "ユーザー指定",
        };
        format!(
            "{}🎚️  閾値 {} ({source}): {file_name}",
            self.prefix(),
            decision.value
        )
    }
}

#[async_trait]
impl ProgressReporter for ConsoleProgressReporter {
    async fn report_started(&self, total_files: usize) {
        if !self.quiet {
            println!("{}🚀 {total_files} ファイルの処理を開始します", self.prefix());
        }
    }

    async fn report_processing(&self, file_name: &str) {
        if !self.quiet {
            println!("{}🖼️  処理中: {file_name}", self.prefix());
        }
    }

    async fn report_threshold(&self, file_name: &str, decision: ThresholdDecision) {
        // 閾値の決定は quiet でも必ず表示する
        println!("{}", self.threshold_line(file_name, decision));
    }

    async fn report_saved(&self, _file_name: &str, output_path: &str) {
        if !self.quiet {
            println!("{}💾 保存: {output_path}", self.prefix());
        }
    }

    async fn report_progress(&self, completed: usize, total: usize) {
        if !self.quiet && total > 0 && (completed % 100 == 0 || completed == total) {
            let percentage = (completed as f64 / total as f64) * 100.0;
            println!("{}📊 進捗: {completed}/{total} ({percentage:.1}%)", self.prefix());
        }
    }

    async fn report_error(&self, file_name: &str, error: &str) {
        // スキップは quiet でも必ず表示する
        eprintln!("{}⚠️  スキップ {file_name}: {error}", self.prefix());
    }

    async fn report_completed(&self, total_processed: usize, total_errors: usize) {
        if !self.quiet {
            println!(
                "{}✅ 完了! 成功: {total_processed}, スキップ: {total_errors}",
                self.prefix()
            );
        }
    }
}

/// 何もしない進捗報告実装（テスト・ベンチマーク用）
#[derive(Debug, Default, Clone)]
pub struct NoOpProgressReporter;

impl NoOpProgressReporter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProgressReporter for NoOpProgressReporter {
    async fn report_started(&self, _total_files: usize) {}

    async fn report_processing(&self, _file_name: &str) {}

    async fn report_threshold(&self, _file_name: &str, _decision: ThresholdDecision) {}

    async fn report_saved(&self, _file_name: &str, _output_path: &str) {}

    async fn report_progress(&self, _completed: usize, _total: usize) {}

    async fn report_error(&self, _file_name: &str, _error: &str) {}

    async fn report_completed(&self, _total_processed: usize, _total_errors: usize) {}
}
