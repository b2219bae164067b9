pub mod catalog;
pub mod cli;
pub mod core;
pub mod distribution;
pub mod engine;
pub mod image_codec;
pub mod kernels;
pub mod services;
pub mod storage;

// 主要な型の再エクスポート
pub use catalog::Catalog;
pub use core::{BackendKind, ProcessingError, ProcessingResult, ProcessingSummary, RasterBuffer};
pub use engine::{BatchJob, FilterEngine};
pub use kernels::{ExecutionPolicy, FilterKind, FilterSpec, ThresholdMode};
