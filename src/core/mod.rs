// コアレイヤー - 基盤となるトレイト、型、エラー定義
// 他のレイヤーから参照される基本的な抽象化を提供

pub mod error;
pub mod partition;
pub mod raster;
pub mod traits;
pub mod types;

// 公開API - 明示的にエクスポートして曖昧性を回避
pub use error::{ProcessingError, ProcessingResult};
pub use raster::{RasterBuffer, RasterError};
pub use traits::{ProcessingConfig, ProgressReporter};
pub use types::{
    BackendKind, ProcessingMetadata, ProcessingOutcome, ProcessingSummary, RunReport,
    ThresholdDecision, ThresholdSource,
};
