// Consumer - 共有メモリ並列のワーカープール
// 各ワーカーは共有キューから次の未処理ファイルを取り出す（動的スケジューリング）

use super::worker::{process_single_file, FileContext, KernelPlacement};
use crate::{
    core::{ProcessingOutcome, ProgressReporter},
    image_codec::ImageCodec,
    storage::StorageBackend,
};
use anyhow::Result;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

/// 単一Consumerワーカー
pub fn spawn_single_consumer<I, S, R>(
    worker_id: usize,
    ctx: Arc<FileContext<I, S, R>>,
    work_rx: Arc<Mutex<mpsc::Receiver<String>>>,
    result_tx: mpsc::Sender<ProcessingOutcome>,
) -> tokio::task::JoinHandle<Result<()>>
where
    I: ImageCodec + 'static,
    S: StorageBackend + 'static,
    R: ProgressReporter + 'static,
{
    tokio::spawn(async move {
        let mut handled = 0usize;
        loop {
            // 次の作業を取得（ロックは受信の間だけ保持）
            let file_name = {
                let mut rx = work_rx.lock().await;
                match rx.recv().await {
                    Some(name) => name,
                    None => break,
                }
            };

            let outcome =
                process_single_file(ctx.as_ref(), &file_name, KernelPlacement::Blocking).await;
            handled += 1;

            if result_tx.send(outcome).await.is_err() {
                // 結果チャンネルが閉じられた場合は終了
                break;
            }
        }

        log::debug!("worker {worker_id}: {handled} 件処理");
        Ok(())
    })
}

/// Consumers: 固定サイズのワーカープール
pub fn spawn_consumers<I, S, R>(
    ctx: Arc<FileContext<I, S, R>>,
    work_rx: mpsc::Receiver<String>,
    result_tx: mpsc::Sender<ProcessingOutcome>,
    worker_count: usize,
) -> Vec<tokio::task::JoinHandle<Result<()>>>
where
    I: ImageCodec + 'static,
    S: StorageBackend + 'static,
    R: ProgressReporter + 'static,
{
    let work_rx = Arc::new(Mutex::new(work_rx));

    (0..worker_count)
        .map(|worker_id| {
            spawn_single_consumer(
                worker_id,
                Arc::clone(&ctx),
                Arc::clone(&work_rx),
                result_tx.clone(),
            )
        })
        .collect()
}
