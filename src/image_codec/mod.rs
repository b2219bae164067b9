use crate::core::RasterBuffer;
use anyhow::Result;
use mockall::automock;

pub mod standard;

/// デコード時に要求するチャンネル構成
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelRequest {
    /// 元画像のチャンネル数を保つ（グレー+アルファは RGBA に展開）
    Native,
    /// 単一チャンネルの輝度に変換（`kernels::luma` と同じ式）
    Luma,
}

/// 画像コーデックのトレイト
///
/// CPU バウンドの同期処理。呼び出し側がブロッキングプールで実行する。
#[automock]
pub trait ImageCodec: Send + Sync {
    /// バイト列をラスタにデコード
    fn decode(&self, data: &[u8], request: ChannelRequest) -> Result<RasterBuffer>;

    /// ラスタを PNG バイト列にエンコード
    fn encode(&self, raster: &RasterBuffer) -> Result<Vec<u8>>;
}
