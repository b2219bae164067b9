// 分配プロトコルの通信層
// ルート（rank 0）だけが送信し、他の参加者は受信するだけの一方向トポロジー

use super::error::DistributionError;
use super::frame::Frame;
use async_trait::async_trait;

/// ルートの rank
pub const ROOT_RANK: usize = 0;

/// プロセス群（またはタスク群）の通信インターフェース
///
/// `send` と `recv` だけを実装すれば、プロトコルが使う集団操作は既定実装で得られる。
/// 集団操作の `root_*` 引数はルートでのみ使われ、参加者側では `None` を渡す。
#[async_trait]
pub trait Communicator: Send + Sync {
    fn rank(&self) -> usize;

    fn size(&self) -> usize;

    fn is_root(&self) -> bool {
        self.rank() == ROOT_RANK
    }

    /// ルートから参加者 `dest` へ 1 フレーム送信
    async fn send(&self, dest: usize, frame: Frame) -> Result<(), DistributionError>;

    /// ルートからのフレームを 1 つ受信（参加者のみ）
    async fn recv(&self) -> Result<Frame, DistributionError>;

    /// 件数を全員へ配る
    async fn broadcast_count(&self, root_count: Option<u64>) -> Result<u64, DistributionError> {
        if self.is_root() {
            let count = root_count.ok_or(DistributionError::MissingRootData {
                operation: "broadcast_count",
            })?;
            for dest in 1..self.size() {
                self.send(dest, Frame::Count(count)).await?;
            }
            Ok(count)
        } else {
            match reject_abort(self.recv().await?)? {
                Frame::Count(count) => Ok(count),
                other => Err(unexpected("count", &other)),
            }
        }
    }

    /// rank ごとに 1 つずつ長さを配る
    async fn scatter_lengths(&self, root_lengths: Option<&[u64]>) -> Result<u64, DistributionError> {
        if self.is_root() {
            let lengths = root_lengths.ok_or(DistributionError::MissingRootData {
                operation: "scatter_lengths",
            })?;
            check_per_rank(lengths.len(), self.size())?;
            for (dest, &length) in lengths.iter().enumerate().skip(1) {
                self.send(dest, Frame::Length(length)).await?;
            }
            Ok(lengths[ROOT_RANK])
        } else {
            match reject_abort(self.recv().await?)? {
                Frame::Length(length) => Ok(length),
                other => Err(unexpected("length", &other)),
            }
        }
    }

    /// 連結済みペイロードを長さに従って切り分け、各 rank へ配る
    async fn scatter_payload(
        &self,
        root_payload: Option<(&[u8], &[u64])>,
    ) -> Result<Vec<u8>, DistributionError> {
        if self.is_root() {
            let (payload, lengths) = root_payload.ok_or(DistributionError::MissingRootData {
                operation: "scatter_payload",
            })?;
            check_per_rank(lengths.len(), self.size())?;

            let declared: u64 = lengths.iter().sum();
            if declared != payload.len() as u64 {
                return Err(DistributionError::LengthMismatch {
                    expected: declared,
                    actual: payload.len() as u64,
                });
            }

            let mut pieces = Vec::with_capacity(lengths.len());
            let mut offset = 0usize;
            for &length in lengths {
                let end = offset + length as usize;
                pieces.push(&payload[offset..end]);
                offset = end;
            }

            for (dest, piece) in pieces.iter().enumerate().skip(1) {
                self.send(dest, Frame::Payload(piece.to_vec())).await?;
            }
            Ok(pieces[ROOT_RANK].to_vec())
        } else {
            match reject_abort(self.recv().await?)? {
                Frame::Payload(bytes) => Ok(bytes),
                other => Err(unexpected("payload", &other)),
            }
        }
    }

    /// 全参加者へ中止を通知（ルートのみ）
    async fn abort(&self, reason: &str) -> Result<(), DistributionError> {
        if !self.is_root() {
            return Err(DistributionError::InvalidRole {
                rank: self.rank(),
                operation: "abort",
            });
        }
        for dest in 1..self.size() {
            self.send(dest, Frame::Abort(reason.to_string())).await?;
        }
        Ok(())
    }
}

/// Abort フレームを中止エラーに変換
fn reject_abort(frame: Frame) -> Result<Frame, DistributionError> {
    match frame {
        Frame::Abort(reason) => Err(DistributionError::Aborted { reason }),
        other => Ok(other),
    }
}

fn unexpected(expected: &'static str, actual: &Frame) -> DistributionError {
    DistributionError::UnexpectedFrame {
        expected,
        actual: actual.kind(),
    }
}

fn check_per_rank(len: usize, size: usize) -> Result<(), DistributionError> {
    if len != size {
        return Err(DistributionError::LengthMismatch {
            expected: size as u64,
            actual: len as u64,
        });
    }
    Ok(())
}

/// 送信先 rank がルート以外のグループ内かを確認
pub(crate) fn check_destination(dest: usize, size: usize) -> Result<(), DistributionError> {
    if dest == ROOT_RANK || dest >= size {
        return Err(DistributionError::InvalidRank { rank: dest, size });
    }
    Ok(())
}
