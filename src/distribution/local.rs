// プロセス内の通信グループ（tokio チャネル）
// テストや単一プロセスでの分散実行シミュレーションに使う

use super::communicator::{check_destination, Communicator, ROOT_RANK};
use super::error::DistributionError;
use super::frame::Frame;
use async_trait::async_trait;
use tokio::sync::{mpsc, Mutex};

pub struct LocalCommunicator {
    rank: usize,
    size: usize,
    /// ルートのみ保持。index は rank（0 は未使用）
    senders: Vec<Option<mpsc::UnboundedSender<Frame>>>,
    /// 参加者のみ保持
    receiver: Option<Mutex<mpsc::UnboundedReceiver<Frame>>>,
}

impl LocalCommunicator {
    /// `size` 個のメンバーからなるグループを作成。返り値の index が rank
    pub fn group(size: usize) -> Result<Vec<LocalCommunicator>, DistributionError> {
        if size == 0 {
            return Err(DistributionError::EmptyGroup);
        }

        let mut senders = vec![None];
        let mut members = Vec::with_capacity(size);

        for rank in 1..size {
            let (tx, rx) = mpsc::unbounded_channel();
            senders.push(Some(tx));
            members.push(LocalCommunicator {
                rank,
                size,
                senders: Vec::new(),
                receiver: Some(Mutex::new(rx)),
            });
        }

        members.insert(
            ROOT_RANK,
            LocalCommunicator {
                rank: ROOT_RANK,
                size,
                senders,
                receiver: None,
            },
        );
        Ok(members)
    }
}

#[async_trait]
impl Communicator for LocalCommunicator {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    async fn send(&self, dest: usize, frame: Frame) -> Result<(), DistributionError> {
        if !self.is_root() {
            return Err(DistributionError::InvalidRole {
                rank: self.rank,
                operation: "send",
            });
        }
        check_destination(dest, self.size)?;

        let sender = self.senders[dest]
            .as_ref()
            .ok_or(DistributionError::Disconnected { rank: dest })?;
        sender
            .send(frame)
            .map_err(|_| DistributionError::Disconnected { rank: dest })
    }

    async fn recv(&self) -> Result<Frame, DistributionError> {
        let receiver = self.receiver.as_ref().ok_or(DistributionError::InvalidRole {
            rank: self.rank,
            operation: "recv",
        })?;
        receiver
            .lock()
            .await
            .recv()
            .await
            .ok_or(DistributionError::Disconnected { rank: ROOT_RANK })
    }
}
