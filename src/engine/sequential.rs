// Sequential - 単一実行単位でカタログ順に処理

use super::collector::OutcomeTally;
use super::worker::{process_single_file, FileContext, KernelPlacement};
use crate::{core::ProgressReporter, image_codec::ImageCodec, storage::StorageBackend};

/// 担当ファイルを順番に 1 件ずつ処理する（カーネルは呼び出し側タスクで実行）
pub async fn run_sequential<I, S, R>(ctx: &FileContext<I, S, R>, file_names: &[String]) -> OutcomeTally
where
    I: ImageCodec + 'static,
    S: StorageBackend,
    R: ProgressReporter,
{
    let mut tally = OutcomeTally::new(file_names.len());
    for file_name in file_names {
        let outcome = process_single_file(ctx, file_name, KernelPlacement::Inline).await;
        tally.record(&outcome, ctx.reporter.as_ref()).await;
    }
    tally
}
