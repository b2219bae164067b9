// カタログ分配プロトコル（実行ごとに 1 回）
//
// 1. ルートだけがカタログを列挙する
// 2. ルートが件数 N を全員へ配る
// 3. ルートが分割を計算し、rank ごとのファイル名リストをエンコードする
// 4. rank ごとのバイト長を配り、続いて連結ペイロードを長さに従って配る
// 5. 各参加者はデコードし、件数を share_size(N, P, rank) と照合する

use super::batch::FilenameBatch;
use super::communicator::Communicator;
use super::error::DistributionError;
use super::partition::{share_size, WorkPartition};

/// ルート側: カタログを分割して配り、ルート自身の担当分を返す
pub async fn scatter_catalog<C>(comm: &C, names: &[String]) -> Result<FilenameBatch, DistributionError>
where
    C: Communicator + ?Sized,
{
    if !comm.is_root() {
        return Err(DistributionError::InvalidRole {
            rank: comm.rank(),
            operation: "scatter_catalog",
        });
    }

    let partition = WorkPartition::new(names.len(), comm.size()).ok_or(DistributionError::EmptyGroup)?;
    comm.broadcast_count(Some(names.len() as u64)).await?;

    let mut payload = Vec::new();
    let mut lengths = Vec::with_capacity(partition.worker_count());
    for range in partition.ranges() {
        let encoded = FilenameBatch::new(names[range.clone()].to_vec()).encode()?;
        lengths.push(encoded.len() as u64);
        payload.extend_from_slice(&encoded);
    }

    log::debug!(
        "カタログ {} 件を {} 個に分割: {:?}",
        names.len(),
        partition.worker_count(),
        partition.sizes()
    );

    comm.scatter_lengths(Some(&lengths[..])).await?;
    let own = comm.scatter_payload(Some((&payload[..], &lengths[..]))).await?;
    Ok(FilenameBatch::decode(&own)?)
}

/// 参加者側: 自分の担当分を受け取り検証する
pub async fn receive_share<C>(comm: &C) -> Result<FilenameBatch, DistributionError>
where
    C: Communicator + ?Sized,
{
    let total = comm.broadcast_count(None).await? as usize;
    let expected_len = comm.scatter_lengths(None).await?;
    let bytes = comm.scatter_payload(None).await?;

    if bytes.len() as u64 != expected_len {
        return Err(DistributionError::LengthMismatch {
            expected: expected_len,
            actual: bytes.len() as u64,
        });
    }

    let batch = FilenameBatch::decode(&bytes)?;
    let expected = share_size(total, comm.size(), comm.rank());
    if batch.len() != expected {
        return Err(DistributionError::CountMismatch {
            rank: comm.rank(),
            expected,
            actual: batch.len(),
        });
    }

    log::debug!("rank {} が {} 件を受信", comm.rank(), batch.len());
    Ok(batch)
}

/// ルートなら `root_names` を配り、参加者なら受信する
pub async fn distribute_catalog<C>(
    comm: &C,
    root_names: Option<&[String]>,
) -> Result<FilenameBatch, DistributionError>
where
    C: Communicator + ?Sized,
{
    if comm.is_root() {
        let names = root_names.ok_or(DistributionError::MissingRootData {
            operation: "distribute_catalog",
        })?;
        scatter_catalog(comm, names).await
    } else {
        receive_share(comm).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::local::LocalCommunicator;
    use crate::distribution::frame::Frame;

    fn catalog(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("img_{i:03}.png")).collect()
    }

    async fn run_group(size: usize, names: Vec<String>) -> Vec<FilenameBatch> {
        let mut group = LocalCommunicator::group(size).unwrap();
        let participants = group.split_off(1);
        let root = group.remove(0);

        let handles: Vec<_> = participants
            .into_iter()
            .map(|comm| tokio::spawn(async move { receive_share(&comm).await }))
            .collect();

        let mut batches = vec![scatter_catalog(&root, &names).await.unwrap()];
        for handle in handles {
            batches.push(handle.await.unwrap().unwrap());
        }
        batches
    }

    #[tokio::test]
    async fn test_uneven_catalog_is_split_contiguously() {
        let names = catalog(10);
        let batches = run_group(4, names.clone()).await;

        let sizes: Vec<usize> = batches.iter().map(|b| b.len()).collect();
        assert_eq!(sizes, vec![3, 3, 2, 2]);

        let rejoined: Vec<String> = batches.into_iter().flat_map(|b| b.into_names()).collect();
        assert_eq!(rejoined, names);
    }

    #[tokio::test]
    async fn test_more_workers_than_files() {
        let batches = run_group(5, catalog(2)).await;
        let sizes: Vec<usize> = batches.iter().map(|b| b.len()).collect();
        assert_eq!(sizes, vec![1, 1, 0, 0, 0]);
    }

    #[tokio::test]
    async fn test_empty_catalog() {
        let batches = run_group(3, Vec::new()).await;
        assert!(batches.iter().all(|b| b.is_empty()));
    }

    #[tokio::test]
    async fn test_single_member_group_keeps_everything() {
        let batches = run_group(1, catalog(4)).await;
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].names(), catalog(4).as_slice());
    }

    #[tokio::test]
    async fn test_count_mismatch_is_detected() {
        let mut group = LocalCommunicator::group(2).unwrap();
        let participant = group.pop().unwrap();
        let root = group.remove(0);

        // N=4 なら rank 1 の担当は 2 件だが 1 件しか送らない
        root.send(1, Frame::Count(4)).await.unwrap();
        root.send(1, Frame::Length(6)).await.unwrap();
        root.send(1, Frame::Payload(b"a.png\0".to_vec())).await.unwrap();

        let err = receive_share(&participant).await.unwrap_err();
        assert!(matches!(
            err,
            DistributionError::CountMismatch { rank: 1, expected: 2, actual: 1 }
        ));
    }

    #[tokio::test]
    async fn test_length_mismatch_is_detected() {
        let mut group = LocalCommunicator::group(2).unwrap();
        let participant = group.pop().unwrap();
        let root = group.remove(0);

        root.send(1, Frame::Count(2)).await.unwrap();
        root.send(1, Frame::Length(10)).await.unwrap();
        root.send(1, Frame::Payload(b"a.png\0".to_vec())).await.unwrap();

        let err = receive_share(&participant).await.unwrap_err();
        assert!(matches!(err, DistributionError::LengthMismatch { expected: 10, actual: 6 }));
    }

    #[tokio::test]
    async fn test_out_of_order_frame_is_protocol_error() {
        let mut group = LocalCommunicator::group(2).unwrap();
        let participant = group.pop().unwrap();
        let root = group.remove(0);

        root.send(1, Frame::Length(3)).await.unwrap();
        let err = receive_share(&participant).await.unwrap_err();
        assert!(matches!(
            err,
            DistributionError::UnexpectedFrame { expected: "count", actual: "length" }
        ));
    }

    #[tokio::test]
    async fn test_root_abort_fails_all_participants() {
        let mut group = LocalCommunicator::group(3).unwrap();
        let participants = group.split_off(1);
        let root = group.remove(0);

        root.abort("入力ディレクトリを読めません").await.unwrap();
        for comm in &participants {
            let err = distribute_catalog(comm, None).await.unwrap_err();
            assert!(matches!(err, DistributionError::Aborted { .. }));
        }
    }

    #[tokio::test]
    async fn test_root_requires_names() {
        let group = LocalCommunicator::group(1).unwrap();
        let err = distribute_catalog(&group[0], None).await.unwrap_err();
        assert!(matches!(err, DistributionError::MissingRootData { .. }));
    }
}
