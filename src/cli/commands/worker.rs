use super::run::{build_engine, build_job, load_config};
use crate::cli::JobArgs;
use crate::core::{BackendKind, ProcessingSummary};
use crate::distribution::ProcessCommunicator;
use anyhow::Result;

/// Execute hidden worker command (participant of a distributed run)
///
/// 標準入力からルートのフレームを受け取り、自分の担当分だけを処理する。
pub async fn execute_worker(job: JobArgs, rank: usize, size: usize) -> Result<ProcessingSummary> {
    let comm =
        ProcessCommunicator::from_stdin(rank, size).map_err(|e| e.into_processing_error(rank))?;

    let config = load_config(&job)?;
    let batch = build_job(&job, BackendKind::Distributed)?;
    let engine = build_engine(&job, config, Some((rank, size)));

    log::debug!("rank {rank}/{size}: ルートからの分配を待機");
    let summary = engine.run_distributed(&batch, &comm).await?;
    Ok(summary)
}
