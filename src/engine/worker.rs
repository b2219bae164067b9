// Worker - 単一ファイル処理機能
// 読み込み → デコード → フィルタ → エンコード → 書き込み。失敗はスキップとして返す

use super::job::BatchJob;
use crate::{
    core::{ProcessingMetadata, ProcessingOutcome, ProgressReporter, ThresholdDecision},
    image_codec::{ChannelRequest, ImageCodec},
    kernels::{ExecutionPolicy, FilterKind, FilterSpec},
    storage::StorageBackend,
};
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Instant;

/// ファイル処理に必要な依存関係一式（ワーカー間で共有）
pub struct FileContext<I, S, R> {
    pub codec: Arc<I>,
    pub storage: Arc<S>,
    pub reporter: Arc<R>,
    pub job: BatchJob,
    pub policy: ExecutionPolicy,
}

/// カーネルを実行する場所
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelPlacement {
    /// 呼び出し側タスクでそのまま実行
    Inline,
    /// tokio のブロッキングプールで実行
    Blocking,
}

/// フィルタ適用後のエンコード済み画像
#[derive(Debug, Clone)]
pub struct FilteredImage {
    pub encoded: Vec<u8>,
    pub dimensions: (u32, u32),
    pub input_channels: u8,
    pub output_channels: u8,
    pub threshold: Option<ThresholdDecision>,
}

/// フィルタごとのデコード時のチャンネル要求
fn decode_request(kind: FilterKind) -> ChannelRequest {
    match kind {
        FilterKind::Sobel => ChannelRequest::Luma,
        FilterKind::Grayscale | FilterKind::Negative | FilterKind::Otsu => ChannelRequest::Native,
    }
}

/// デコード、フィルタ、PNG エンコードをまとめて行う（同期）
pub fn filter_image<I>(
    codec: &I,
    data: &[u8],
    spec: FilterSpec,
    policy: ExecutionPolicy,
) -> Result<FilteredImage>
where
    I: ImageCodec + ?Sized,
{
    let input = codec
        .decode(data, decode_request(spec.kind))
        .context("デコードに失敗しました")?;

    let output = spec
        .apply(&input, policy)
        .with_context(|| format!("{} フィルタを適用できません", spec.kind))?;

    let encoded = codec
        .encode(&output.raster)
        .context("エンコードに失敗しました")?;

    Ok(FilteredImage {
        encoded,
        dimensions: input.dimensions(),
        input_channels: input.channels(),
        output_channels: output.raster.channels(),
        threshold: output.threshold,
    })
}

/// 単一ファイルの処理
pub async fn process_single_file<I, S, R>(
    ctx: &FileContext<I, S, R>,
    file_name: &str,
    placement: KernelPlacement,
) -> ProcessingOutcome
where
    I: ImageCodec + 'static,
    S: StorageBackend,
    R: ProgressReporter,
{
    let start_time = Instant::now();
    ctx.reporter.report_processing(file_name).await;

    let result = async {
        let input_path = ctx.job.input_path(file_name);
        let data = ctx
            .storage
            .read_item(&input_path)
            .await
            .with_context(|| format!("読み込みに失敗しました: {input_path}"))?;
        let input_bytes = data.len() as u64;

        let spec = ctx.job.filter();
        let policy = ctx.policy;
        let filtered = match placement {
            KernelPlacement::Inline => filter_image(ctx.codec.as_ref(), &data, spec, policy)?,
            KernelPlacement::Blocking => {
                let codec = Arc::clone(&ctx.codec);
                tokio::task::spawn_blocking(move || {
                    filter_image(codec.as_ref(), &data, spec, policy)
                })
                .await
                .context("Failed to spawn blocking task for filtering")??
            }
        };

        if let Some(decision) = filtered.threshold {
            ctx.reporter.report_threshold(file_name, decision).await;
        }

        let output_path = ctx.job.output_path(file_name);
        ctx.storage
            .write_item(&output_path, &filtered.encoded)
            .await
            .with_context(|| format!("書き込みに失敗しました: {output_path}"))?;
        ctx.reporter.report_saved(file_name, &output_path).await;

        let metadata = ProcessingMetadata {
            input_bytes,
            output_bytes: filtered.encoded.len() as u64,
            image_dimensions: filtered.dimensions,
            input_channels: filtered.input_channels,
            output_channels: filtered.output_channels,
            processing_time_ms: start_time.elapsed().as_millis() as u64,
        };

        anyhow::Ok((output_path, filtered.threshold, metadata))
    }
    .await;

    match result {
        Ok((output_path, threshold, metadata)) => ProcessingOutcome::Success {
            file_name: file_name.to_string(),
            output_path,
            threshold,
            metadata,
        },
        Err(error) => ProcessingOutcome::Skipped {
            file_name: file_name.to_string(),
            error: format!("{error:#}"),
        },
    }
}
