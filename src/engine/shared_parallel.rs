// SharedParallel - Producer-Consumer パイプライン
// Producer → 有界チャンネル → 固定サイズのワーカープール → Collector

use super::collector::{spawn_result_collector, OutcomeTally};
use super::consumer::spawn_consumers;
use super::producer::spawn_producer;
use super::worker::FileContext;
use crate::{core::ProgressReporter, image_codec::ImageCodec, storage::StorageBackend};
use anyhow::Result;
use std::sync::Arc;
use tokio::sync::mpsc;

/// ワーカー数とチャンネル容量
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSettings {
    pub worker_count: usize,
    pub buffer_size: usize,
}

/// ファイルリストをワーカープールで処理
pub async fn run_shared_parallel<I, S, R>(
    ctx: Arc<FileContext<I, S, R>>,
    file_names: Vec<String>,
    settings: PoolSettings,
) -> Result<OutcomeTally>
where
    I: ImageCodec + 'static,
    S: StorageBackend + 'static,
    R: ProgressReporter + 'static,
{
    let total_files = file_names.len();

    // Producer-Consumerチャンネル構築
    let (work_tx, work_rx) = mpsc::channel::<String>(settings.buffer_size.max(1));
    let (result_tx, result_rx) = mpsc::channel(settings.buffer_size.max(1));

    let reporter = Arc::clone(&ctx.reporter);

    // Producer起動
    let producer_handle = spawn_producer(file_names, work_tx);

    // Consumer Pool起動
    let consumer_handles = spawn_consumers(ctx, work_rx, result_tx, settings.worker_count);

    // Result Collector起動（送信側はすべてConsumerが保持）
    let collector_handle = spawn_result_collector(result_rx, total_files, reporter);

    producer_handle.await??;

    for handle in consumer_handles {
        handle.await??;
    }

    // 全Consumer終了で結果チャンネルが閉じ、Collectorが完了する
    collector_handle.await?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{BackendKind, RasterBuffer};
    use crate::engine::job::BatchJob;
    use crate::image_codec::standard::StandardImageCodec;
    use crate::kernels::{ExecutionPolicy, FilterKind, FilterSpec};
    use crate::services::NoOpProgressReporter;
    use crate::storage::memory::MemoryStorageBackend;

    fn context(storage: MemoryStorageBackend, kind: FilterKind) -> Arc<FileContext<StandardImageCodec, MemoryStorageBackend, NoOpProgressReporter>> {
        Arc::new(FileContext {
            codec: Arc::new(StandardImageCodec::new()),
            storage: Arc::new(storage),
            reporter: Arc::new(NoOpProgressReporter::new()),
            job: BatchJob::new("in", FilterSpec::new(kind), BackendKind::SharedParallel)
                .with_output_root("out"),
            policy: ExecutionPolicy::Parallel { partitions: 2 },
        })
    }

    #[tokio::test]
    async fn test_pool_processes_all_files() {
        let png = StandardImageCodec::new()
            .encode(&RasterBuffer::new((0..48).collect(), 4, 4, 3).unwrap())
            .unwrap();
        let mut storage = MemoryStorageBackend::new().with_directory("out/sobel_shared-parallel");
        let mut names = Vec::new();
        for i in 0..9 {
            let name = format!("p{i}.png");
            storage = storage.with_file(&format!("in/{name}"), png.clone());
            names.push(name);
        }
        names.push("missing.png".to_string());

        let tally = run_shared_parallel(
            context(storage.clone(), FilterKind::Sobel),
            names,
            PoolSettings {
                worker_count: 3,
                buffer_size: 2,
            },
        )
        .await
        .unwrap();

        assert_eq!(tally.processed(), 9);
        assert_eq!(tally.errors(), 1);
        let outputs = storage
            .file_ids()
            .into_iter()
            .filter(|id| id.starts_with("out/sobel_shared-parallel/"))
            .count();
        assert_eq!(outputs, 9);
    }

    #[tokio::test]
    async fn test_empty_file_list() {
        let storage = MemoryStorageBackend::new().with_directory("out/negative_shared-parallel");
        let tally = run_shared_parallel(
            context(storage, FilterKind::Negative),
            Vec::new(),
            PoolSettings {
                worker_count: 4,
                buffer_size: 8,
            },
        )
        .await
        .unwrap();

        assert_eq!(tally, OutcomeTally::new(0));
    }
}
