// 子プロセス群による通信（本番の分散バックエンド）
// ルートが自分自身の実行ファイルを `worker` サブコマンドで起動し、標準入力へフレームを書き込む

use super::communicator::{check_destination, Communicator, ROOT_RANK};
use super::error::DistributionError;
use super::frame::{read_frame, write_frame, Frame};
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::{BufReader, Stdin};
use tokio::process::{Child, ChildStdin, Command};
use tokio::sync::Mutex;

/// ルート側: 起動した子プロセスとその標準入力
struct WorkerHandle {
    rank: usize,
    child: Mutex<Child>,
    stdin: Mutex<Option<ChildStdin>>,
}

enum Role {
    Root { workers: Vec<WorkerHandle> },
    Participant { reader: Mutex<BufReader<Stdin>> },
}

pub struct ProcessCommunicator {
    rank: usize,
    size: usize,
    role: Role,
}

impl ProcessCommunicator {
    /// 現在の実行ファイルを `size - 1` 個起動してルートになる
    pub fn spawn(size: usize, job_args: &[OsString]) -> Result<Self, DistributionError> {
        let program = std::env::current_exe()
            .map_err(|source| DistributionError::Spawn { rank: 1, source })?;
        Self::spawn_program(program, size, job_args)
    }

    /// 指定した実行ファイルを起動してルートになる
    pub fn spawn_program(
        program: PathBuf,
        size: usize,
        job_args: &[OsString],
    ) -> Result<Self, DistributionError> {
        if size == 0 {
            return Err(DistributionError::EmptyGroup);
        }

        let mut workers = Vec::with_capacity(size.saturating_sub(1));
        for rank in 1..size {
            let mut command = Command::new(&program);
            command
                .arg("worker")
                .arg("--rank")
                .arg(rank.to_string())
                .arg("--size")
                .arg(size.to_string())
                .args(job_args)
                .stdin(Stdio::piped())
                .stdout(Stdio::inherit())
                .stderr(Stdio::inherit());

            log::debug!("ワーカー rank {rank} を起動: {:?}", command.as_std());

            let mut child = command
                .spawn()
                .map_err(|source| DistributionError::Spawn { rank, source })?;
            let stdin = child.stdin.take();
            workers.push(WorkerHandle {
                rank,
                child: Mutex::new(child),
                stdin: Mutex::new(stdin),
            });
        }

        Ok(Self {
            rank: ROOT_RANK,
            size,
            role: Role::Root { workers },
        })
    }

    /// 標準入力からフレームを受け取る参加者になる
    pub fn from_stdin(rank: usize, size: usize) -> Result<Self, DistributionError> {
        if rank == ROOT_RANK || rank >= size {
            return Err(DistributionError::InvalidRank { rank, size });
        }

        Ok(Self {
            rank,
            size,
            role: Role::Participant {
                reader: Mutex::new(BufReader::new(tokio::io::stdin())),
            },
        })
    }

    /// 全子プロセスの終了を待つ（ルートのみ。参加者では何もしない）
    ///
    /// 標準入力を閉じてから待機する。異常終了した子があれば最初の 1 件をエラーとして返す。
    pub async fn wait_workers(self) -> Result<(), DistributionError> {
        let workers = match self.role {
            Role::Root { workers } => workers,
            Role::Participant { .. } => return Ok(()),
        };

        let mut first_failure = None;
        for worker in workers {
            drop(worker.stdin.into_inner());

            let mut child = worker.child.into_inner();
            let outcome = match child.wait().await {
                Ok(status) if status.success() => None,
                Ok(status) => Some(status.to_string()),
                Err(e) => Some(e.to_string()),
            };

            if let Some(status) = outcome {
                log::warn!("ワーカー rank {} が異常終了: {status}", worker.rank);
                first_failure.get_or_insert(DistributionError::WorkerFailed {
                    rank: worker.rank,
                    status,
                });
            }
        }

        match first_failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Communicator for ProcessCommunicator {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    async fn send(&self, dest: usize, frame: Frame) -> Result<(), DistributionError> {
        let workers = match &self.role {
            Role::Root { workers } => workers,
            Role::Participant { .. } => {
                return Err(DistributionError::InvalidRole {
                    rank: self.rank,
                    operation: "send",
                })
            }
        };
        check_destination(dest, self.size)?;

        let worker = &workers[dest - 1];
        let mut stdin = worker.stdin.lock().await;
        let pipe = stdin
            .as_mut()
            .ok_or(DistributionError::Disconnected { rank: dest })?;
        write_frame(pipe, &frame).await?;
        Ok(())
    }

    async fn recv(&self) -> Result<Frame, DistributionError> {
        match &self.role {
            Role::Participant { reader } => {
                let mut reader = reader.lock().await;
                Ok(read_frame(&mut *reader).await?)
            }
            Role::Root { .. } => Err(DistributionError::InvalidRole {
                rank: self.rank,
                operation: "recv",
            }),
        }
    }
}
