// エンジン層 - バックエンド選択とオーケストレーション
// ストレージ・コーデック・カーネルを組み合わせてバッチ処理を提供

pub mod collector;
pub mod consumer;
pub mod distributed;
pub mod job;
pub mod processing_engine;
pub mod producer;
pub mod sequential;
pub mod shared_parallel;
pub mod worker;

// 公開API - 主要エンジンクラス
pub use collector::OutcomeTally;
pub use job::{BatchJob, DEFAULT_OUTPUT_ROOT};
pub use processing_engine::FilterEngine;
pub use worker::{filter_image, FilteredImage};
