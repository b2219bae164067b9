use crate::cli::JobArgs;
use crate::core::{BackendKind, ProcessingConfig, ProcessingSummary, RunReport};
use crate::distribution::{ProcessCommunicator, ROOT_RANK};
use crate::engine::{BatchJob, FilterEngine};
use crate::image_codec::standard::StandardImageCodec;
use crate::kernels::{FilterSpec, ThresholdMode};
use crate::services::{ConsoleProgressReporter, DefaultProcessingConfig};
use crate::storage::local::LocalStorageBackend;
use anyhow::{Context, Result};
use chrono::Utc;
use std::path::{Path, PathBuf};

/// run サブコマンドの引数一式
pub struct RunOptions {
    pub job: JobArgs,
    pub backend: BackendKind,
    pub processes: Option<usize>,
    pub report: Option<PathBuf>,
}

/// 本番構成のエンジン
pub type LocalFilterEngine =
    FilterEngine<StandardImageCodec, LocalStorageBackend, DefaultProcessingConfig, ConsoleProgressReporter>;

/// 設定ファイル → CLI 指定の順で設定を組み立てる
pub fn load_config(job: &JobArgs) -> Result<DefaultProcessingConfig> {
    let mut config = match &job.config {
        Some(path) => DefaultProcessingConfig::from_json_file(path)?,
        None => DefaultProcessingConfig::default(),
    };

    if let Some(threads) = job.threads {
        config = config.with_worker_threads(threads);
    }

    config.validate()?;
    Ok(config)
}

/// CLI 引数からジョブを作成
pub fn build_job(job: &JobArgs, backend: BackendKind) -> Result<BatchJob> {
    let input_dir = path_to_str(&job.input_dir)?;
    let output_root = path_to_str(&job.output)?;
    let filter = FilterSpec::new(job.filter).with_threshold(ThresholdMode::from_cli_value(job.threshold));

    Ok(BatchJob::new(input_dir, filter, backend)
        .with_output_root(output_root)
        .with_hybrid(job.hybrid))
}

/// 本番構成のエンジンを作成（rank 指定時はラベル付きで出力）
pub fn build_engine(
    job: &JobArgs,
    config: DefaultProcessingConfig,
    rank: Option<(usize, usize)>,
) -> LocalFilterEngine {
    let mut reporter =
        ConsoleProgressReporter::new().with_quiet(job.quiet || !config.enable_progress_reporting());
    if let Some((rank, size)) = rank {
        reporter = reporter.with_rank(rank, size);
    }

    FilterEngine::new(
        StandardImageCodec::new(),
        LocalStorageBackend::new(),
        config,
        reporter,
    )
}

/// Execute run command
pub async fn execute_run(options: RunOptions) -> Result<ProcessingSummary> {
    let config = load_config(&options.job)?;
    let batch = build_job(&options.job, options.backend)?;
    let started_at = Utc::now();

    let world_size = match options.backend {
        BackendKind::Distributed => Some(options.processes.unwrap_or_else(num_cpus::get).max(1)),
        _ => None,
    };

    if !options.job.quiet {
        println!("🔍 フィルタ処理開始");
        println!("   - 入力ディレクトリ: {}", batch.input_dir());
        println!("   - 出力ディレクトリ: {}", batch.output_dir());
        println!("   - フィルタ: {}", batch.filter().kind);
        println!("   - バックエンド: {}", batch.backend());
        println!("⚙️  処理設定:");
        println!("   - ワーカースレッド数: {}", config.worker_threads());
        println!("   - カーネル分割数: {}", config.kernel_partitions());
        if let Some(size) = world_size {
            println!("   - プロセス数: {size}");
        }
    }

    let summary = match world_size {
        Some(size) => run_distributed_root(&options.job, config, &batch, size).await?,
        None => {
            let engine = build_engine(&options.job, config, None);
            engine.run(&batch).await?
        }
    };

    if let Some(path) = &options.report {
        let report = RunReport {
            filter: batch.filter().kind.to_string(),
            backend: batch.backend(),
            rank: world_size.map(|_| ROOT_RANK),
            world_size,
            input_dir: batch.input_dir().to_string(),
            output_dir: batch.output_dir(),
            started_at,
            finished_at: Utc::now(),
            summary: summary.clone(),
        };
        write_report(path, &report).await?;
        if !options.job.quiet {
            println!("📄 実行レポートを {} に保存しました", path.display());
        }
    }

    Ok(summary)
}

/// ルートとして参加者プロセスを起動し、自分の担当分を処理してから全員の終了を待つ
async fn run_distributed_root(
    job: &JobArgs,
    config: DefaultProcessingConfig,
    batch: &BatchJob,
    size: usize,
) -> Result<ProcessingSummary> {
    let comm = ProcessCommunicator::spawn(size, &job.to_worker_args())
        .map_err(|e| e.into_processing_error(ROOT_RANK))?;

    let engine = build_engine(job, config, Some((ROOT_RANK, size)));
    let result = engine.run_distributed(batch, &comm).await;
    let waited = comm.wait_workers().await;

    let summary = result?;
    waited.map_err(|e| e.into_processing_error(ROOT_RANK))?;
    Ok(summary)
}

/// 実行レポートを JSON で保存
pub async fn write_report(path: &Path, report: &RunReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("Failed to serialize run report")?;
    tokio::fs::write(path, json)
        .await
        .with_context(|| format!("Failed to write run report: {}", path.display()))
}

fn path_to_str(path: &Path) -> Result<&str> {
    path.to_str()
        .ok_or_else(|| anyhow::anyhow!("Invalid UTF-8 path: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ProcessingError;
    use crate::kernels::FilterKind;
    use std::fs;
    use tempfile::TempDir;

    fn job_args(input_dir: &Path, output: &Path) -> JobArgs {
        JobArgs {
            input_dir: input_dir.to_path_buf(),
            filter: FilterKind::Negative,
            threshold: 0,
            output: output.to_path_buf(),
            threads: None,
            hybrid: false,
            config: None,
            quiet: true,
        }
    }

    fn write_png(path: &Path) {
        let raster = crate::core::RasterBuffer::new(vec![20; 12], 2, 2, 3).unwrap();
        let png = crate::image_codec::ImageCodec::encode(&StandardImageCodec::new(), &raster).unwrap();
        fs::write(path, png).unwrap();
    }

    #[test]
    fn test_cli_threads_override_config_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        fs::write(
            &config_path,
            r#"{ "worker_threads": 2, "channel_buffer_size": 7, "kernel_partitions": 3 }"#,
        )
        .unwrap();

        let mut job = job_args(temp_dir.path(), temp_dir.path());
        job.config = Some(config_path);
        job.threads = Some(5);

        let config = load_config(&job).unwrap();
        assert_eq!(config.worker_threads(), 5);
        assert_eq!(config.channel_buffer_size(), 7);
        assert_eq!(config.kernel_partitions(), 3);
    }

    #[test]
    fn test_invalid_config_file_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        fs::write(&config_path, "{ not json").unwrap();

        let mut job = job_args(temp_dir.path(), temp_dir.path());
        job.config = Some(config_path);

        let error = load_config(&job).unwrap_err();
        assert!(matches!(
            error.downcast_ref::<ProcessingError>(),
            Some(ProcessingError::ConfigurationError { .. })
        ));
    }

    #[test]
    fn test_build_job_maps_threshold() {
        let temp_dir = TempDir::new().unwrap();
        let mut job = job_args(temp_dir.path(), Path::new("out"));
        job.filter = FilterKind::Otsu;
        job.threshold = 0;
        let auto = build_job(&job, BackendKind::Sequential).unwrap();
        assert_eq!(auto.filter().threshold, ThresholdMode::Auto);

        job.threshold = 128;
        let fixed = build_job(&job, BackendKind::Sequential).unwrap();
        assert_eq!(fixed.filter().threshold, ThresholdMode::Fixed(128));
        assert_eq!(fixed.output_dir(), "out/otsu_sequential");
    }

    #[tokio::test]
    async fn test_execute_run_writes_outputs_and_report() {
        let input_dir = TempDir::new().unwrap();
        let output_dir = TempDir::new().unwrap();
        write_png(&input_dir.path().join("a.png"));
        write_png(&input_dir.path().join("b.jpg"));
        fs::write(input_dir.path().join("c.png"), b"broken").unwrap();
        let report_path = output_dir.path().join("report.json");

        let summary = execute_run(RunOptions {
            job: job_args(input_dir.path(), output_dir.path()),
            backend: BackendKind::SharedParallel,
            processes: None,
            report: Some(report_path.clone()),
        })
        .await
        .unwrap();

        assert_eq!(summary.total_files, 3);
        assert_eq!(summary.processed_files, 2);
        assert_eq!(summary.error_count, 1);

        let out = output_dir.path().join("negative_shared-parallel");
        assert!(out.join("a.png").is_file());
        assert!(out.join("b.jpg").is_file());
        assert!(!out.join("c.png").exists());

        let report: RunReport =
            serde_json::from_str(&fs::read_to_string(&report_path).unwrap()).unwrap();
        assert_eq!(report.backend, BackendKind::SharedParallel);
        assert_eq!(report.filter, "negative");
        assert_eq!(report.summary.processed_files, 2);
        assert!(report.finished_at >= report.started_at);
    }

    #[tokio::test]
    async fn test_missing_input_directory_is_fatal() {
        let output_dir = TempDir::new().unwrap();
        let result = execute_run(RunOptions {
            job: job_args(&output_dir.path().join("missing"), output_dir.path()),
            backend: BackendKind::Sequential,
            processes: None,
            report: None,
        })
        .await;

        assert!(result.is_err());
    }
}
