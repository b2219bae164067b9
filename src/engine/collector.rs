// Collector - 結果の集計と報告

use crate::core::{ProcessingOutcome, ProcessingSummary, ProgressReporter};
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// 成功・スキップの件数を数え、到着した順に報告する
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutcomeTally {
    total: usize,
    processed: usize,
    errors: usize,
}

impl OutcomeTally {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            processed: 0,
            errors: 0,
        }
    }

    pub async fn record<R>(&mut self, outcome: &ProcessingOutcome, reporter: &R)
    where
        R: ProgressReporter + ?Sized,
    {
        match outcome {
            ProcessingOutcome::Success { .. } => self.processed += 1,
            ProcessingOutcome::Skipped { file_name, error } => {
                reporter.report_error(file_name, error).await;
                self.errors += 1;
            }
        }

        reporter
            .report_progress(self.processed + self.errors, self.total)
            .await;
    }

    pub fn processed(&self) -> usize {
        self.processed
    }

    pub fn errors(&self) -> usize {
        self.errors
    }

    pub fn summary(&self, elapsed: Duration) -> ProcessingSummary {
        ProcessingSummary::from_counts(
            self.total,
            self.processed,
            self.errors,
            elapsed.as_millis() as u64,
        )
    }
}

/// Collector: 結果チャンネルが閉じるまで集計する
pub fn spawn_result_collector<R>(
    mut result_rx: mpsc::Receiver<ProcessingOutcome>,
    total_files: usize,
    reporter: Arc<R>,
) -> tokio::task::JoinHandle<Result<OutcomeTally>>
where
    R: ProgressReporter + 'static,
{
    tokio::spawn(async move {
        let mut tally = OutcomeTally::new(total_files);
        while let Some(outcome) = result_rx.recv().await {
            tally.record(&outcome, reporter.as_ref()).await;
        }
        Ok(tally)
    })
}
