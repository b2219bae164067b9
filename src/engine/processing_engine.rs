// FilterEngine - 依存性注入によるバッチフィルタエンジン
// 全ての依存関係がコンストラクタで注入され、バックエンドを切り替えて実行する

use super::collector::OutcomeTally;
use super::distributed::acquire_share;
use super::job::BatchJob;
use super::sequential::run_sequential;
use super::shared_parallel::{run_shared_parallel, PoolSettings};
use super::worker::FileContext;
use crate::{
    catalog::Catalog,
    core::{
        BackendKind, ProcessingConfig, ProcessingError, ProcessingResult, ProcessingSummary,
        ProgressReporter,
    },
    distribution::{Communicator, LocalCommunicator},
    image_codec::ImageCodec,
    kernels::ExecutionPolicy,
    storage::StorageBackend,
};
use std::sync::Arc;
use std::time::Instant;

/// 依存性注入によるバッチフィルタエンジン
///
/// 並列処理で共有される依存関係はArcで管理する。
pub struct FilterEngine<I, S, C, R> {
    codec: Arc<I>,
    storage: Arc<S>,
    config: Arc<C>,
    reporter: Arc<R>,
}

impl<I, S, C, R> FilterEngine<I, S, C, R>
where
    I: ImageCodec + 'static,
    S: StorageBackend + 'static,
    C: ProcessingConfig,
    R: ProgressReporter + 'static,
{
    pub fn new(codec: I, storage: S, config: C, reporter: R) -> Self {
        Self {
            codec: Arc::new(codec),
            storage: Arc::new(storage),
            config: Arc::new(config),
            reporter: Arc::new(reporter),
        }
    }

    /// ディレクトリ直下の画像ファイルを発見
    pub async fn discover(&self, directory: &str) -> ProcessingResult<Catalog> {
        Catalog::discover(self.storage.as_ref(), directory)
            .await
            .map_err(|e| ProcessingError::file_discovery(directory, e))
    }

    /// ジョブを実行（発見から完了報告まで）
    ///
    /// 分散バックエンドは 1 プロセスのグループとして実行する。
    pub async fn run(&self, job: &BatchJob) -> ProcessingResult<ProcessingSummary> {
        if job.backend() == BackendKind::Distributed {
            let mut group = LocalCommunicator::group(1)
                .map_err(|e| e.into_processing_error(0))?;
            let comm = group
                .pop()
                .ok_or_else(|| ProcessingError::internal(anyhow::anyhow!("empty local group")))?;
            return self.run_distributed(job, &comm).await;
        }

        self.validate_config()?;
        let catalog = self.discover(job.input_dir()).await?;
        self.process_files(job, catalog.names().to_vec()).await
    }

    /// 指定されたファイルリストを処理
    pub async fn process_files(
        &self,
        job: &BatchJob,
        file_names: Vec<String>,
    ) -> ProcessingResult<ProcessingSummary> {
        self.validate_config()?;
        let start_time = Instant::now();
        let total_files = file_names.len();

        self.prepare_output(job).await?;
        self.reporter.report_started(total_files).await;

        let tally = self.execute(job, file_names).await?;

        self.reporter
            .report_completed(tally.processed(), tally.errors())
            .await;
        Ok(tally.summary(start_time.elapsed()))
    }

    /// 分散実行: 分配プロトコルで担当分を受け取り、それを処理する
    pub async fn run_distributed<M>(
        &self,
        job: &BatchJob,
        comm: &M,
    ) -> ProcessingResult<ProcessingSummary>
    where
        M: Communicator + ?Sized,
    {
        self.validate_config()?;
        let share = acquire_share(self.storage.as_ref(), comm, job.input_dir()).await?;
        self.process_files(job, share).await
    }

    /// バックエンドと設定から決まるカーネル実行方針
    pub fn kernel_policy(&self, job: &BatchJob) -> ExecutionPolicy {
        match job.backend() {
            BackendKind::Sequential => ExecutionPolicy::Serial,
            BackendKind::SharedParallel => {
                ExecutionPolicy::from_partitions(self.config.kernel_partitions())
            }
            BackendKind::Distributed if job.hybrid() => {
                ExecutionPolicy::from_partitions(self.config.kernel_partitions())
            }
            BackendKind::Distributed => ExecutionPolicy::Serial,
        }
    }

    /// 設定への参照を取得
    pub fn config(&self) -> &C {
        &self.config
    }

    /// レポーターへの参照を取得
    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn validate_config(&self) -> ProcessingResult<()> {
        if self.config.worker_threads() == 0 {
            return Err(ProcessingError::configuration(
                "ワーカースレッド数は1以上である必要があります",
            ));
        }
        if self.config.channel_buffer_size() == 0 {
            return Err(ProcessingError::configuration(
                "チャンネルバッファサイズは1以上である必要があります",
            ));
        }
        Ok(())
    }

    async fn prepare_output(&self, job: &BatchJob) -> ProcessingResult<()> {
        let output_dir = job.output_dir();
        self.storage
            .ensure_directory(&output_dir)
            .await
            .map_err(|e| ProcessingError::file_discovery(output_dir.as_str(), e))
    }

    async fn execute(&self, job: &BatchJob, file_names: Vec<String>) -> ProcessingResult<OutcomeTally> {
        let ctx = FileContext {
            codec: Arc::clone(&self.codec),
            storage: Arc::clone(&self.storage),
            reporter: Arc::clone(&self.reporter),
            job: job.clone(),
            policy: self.kernel_policy(job),
        };

        let pooled = match job.backend() {
            BackendKind::Sequential => false,
            BackendKind::SharedParallel => true,
            BackendKind::Distributed => job.hybrid(),
        };

        if !pooled {
            return Ok(run_sequential(&ctx, &file_names).await);
        }

        let settings = PoolSettings {
            worker_count: self.config.worker_threads(),
            buffer_size: self.config.channel_buffer_size(),
        };
        run_shared_parallel(Arc::new(ctx), file_names, settings)
            .await
            .map_err(|e| ProcessingError::parallel_execution(format!("パイプライン実行エラー: {e:#}")))
    }
}
