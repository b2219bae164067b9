use crate::core::BackendKind;
use crate::engine::DEFAULT_OUTPUT_ROOT;
use crate::kernels::FilterKind;
use clap::{Args, Parser, Subcommand};
use std::ffi::OsString;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "image_filters")]
#[command(about = "Apply pixel filters to a directory of images on a selectable backend")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Filter every image in a directory
    Run {
        #[command(flatten)]
        job: JobArgs,

        /// Execution backend
        #[arg(short, long, value_enum, default_value = "sequential")]
        backend: BackendKind,

        /// Number of processes for the distributed backend (coordinator included)
        #[arg(short = 'n', long, value_parser = parse_positive)]
        processes: Option<usize>,

        /// Write a JSON run report to this file
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Participant process of a distributed run (started by the coordinator)
    #[command(hide = true)]
    Worker {
        #[command(flatten)]
        job: JobArgs,

        #[arg(long)]
        rank: usize,

        #[arg(long, value_parser = parse_positive)]
        size: usize,
    },
}

/// 全プロセスで共通のジョブ引数（ワーカーへそのまま転送する）
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct JobArgs {
    /// Directory containing the input images
    pub input_dir: PathBuf,

    /// Filter to apply
    #[arg(short, long, value_enum)]
    pub filter: FilterKind,

    /// Otsu threshold (0 = compute automatically)
    #[arg(long, default_value = "0", value_parser = parse_threshold)]
    pub threshold: u8,

    /// Output root directory
    #[arg(short, long, default_value = DEFAULT_OUTPUT_ROOT)]
    pub output: PathBuf,

    /// Number of worker threads for the shared-parallel pool
    #[arg(short, long, value_parser = parse_positive)]
    pub threads: Option<usize>,

    /// Use the shared-parallel pool inside each distributed process
    #[arg(long)]
    pub hybrid: bool,

    /// JSON configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Suppress per-file progress output
    #[arg(short, long)]
    pub quiet: bool,
}

impl JobArgs {
    /// ワーカープロセス用の引数列に戻す
    pub fn to_worker_args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            self.input_dir.clone().into_os_string(),
            "--filter".into(),
            self.filter.as_str().into(),
            "--threshold".into(),
            self.threshold.to_string().into(),
            "--output".into(),
            self.output.clone().into_os_string(),
        ];

        if let Some(threads) = self.threads {
            args.push("--threads".into());
            args.push(threads.to_string().into());
        }
        if self.hybrid {
            args.push("--hybrid".into());
        }
        if let Some(config) = &self.config {
            args.push("--config".into());
            args.push(config.clone().into_os_string());
        }
        if self.quiet {
            args.push("--quiet".into());
        }
        args
    }
}

fn parse_threshold(value: &str) -> Result<u8, String> {
    let parsed: i64 = value
        .parse()
        .map_err(|_| format!("`{value}` is not an integer"))?;
    u8::try_from(parsed).map_err(|_| format!("threshold must be between 0 and 255, got {parsed}"))
}

fn parse_positive(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err("value must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(_) => Err(format!("`{value}` is not a positive integer")),
    }
}
