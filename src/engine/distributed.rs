// Distributed - 担当ファイルの取得
// ルートがカタログを作成して分配し、各参加者は自分の担当分だけを受け取る

use crate::{
    catalog::Catalog,
    core::{ProcessingError, ProcessingResult},
    distribution::{distribute_catalog, Communicator},
    storage::StorageBackend,
};

/// 分配プロトコルを 1 回実行し、このプロセスの担当ファイル名を返す
///
/// ルートでカタログ作成に失敗した場合は全参加者へ中止を通知してからエラーを返す。
pub async fn acquire_share<S, C>(
    storage: &S,
    comm: &C,
    input_dir: &str,
) -> ProcessingResult<Vec<String>>
where
    S: StorageBackend + ?Sized,
    C: Communicator + ?Sized,
{
    let rank = comm.rank();

    let catalog = if comm.is_root() {
        match Catalog::discover(storage, input_dir).await {
            Ok(catalog) => Some(catalog),
            Err(error) => {
                let reason = format!("{error:#}");
                if let Err(abort_error) = comm.abort(&reason).await {
                    log::warn!("中止通知の送信に失敗しました: {abort_error}");
                }
                return Err(ProcessingError::file_discovery(input_dir, error));
            }
        }
    } else {
        None
    };

    let batch = distribute_catalog(comm, catalog.as_ref().map(Catalog::names))
        .await
        .map_err(|e| e.into_processing_error(rank))?;

    log::info!(
        "rank {rank}/{}: {} 件を担当",
        comm.size(),
        batch.len()
    );
    Ok(batch.into_names())
}
