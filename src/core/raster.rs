// ラスタバッファ - デコード済み画像の生バイト列とジオメトリ

use thiserror::Error;

/// ラスタ構築時のエラー
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RasterError {
    #[error("未対応のチャンネル数です: {0} (1, 3, 4 のみ対応)")]
    UnsupportedChannels(u8),

    #[error("バッファ長が一致しません: 期待値 {expected} バイト, 実際 {actual} バイト")]
    LengthMismatch { expected: usize, actual: usize },
}

/// 幅×高さ×チャンネル数の連続バイト列を所有する画像バッファ
///
/// バッファ長は常に `width * height * channels` と一致する。
/// カーネルは入力を書き換えず、必ず新しい `RasterBuffer` を返す。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterBuffer {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
}

impl RasterBuffer {
    /// 既存のバイト列からバッファを作成（長さとチャンネル数を検証）
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8) -> Result<Self, RasterError> {
        if !matches!(channels, 1 | 3 | 4) {
            return Err(RasterError::UnsupportedChannels(channels));
        }

        let expected = width as usize * height as usize * channels as usize;
        if data.len() != expected {
            return Err(RasterError::LengthMismatch {
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            data,
            width,
            height,
            channels,
        })
    }

    /// カーネル出力用: 長さが一致することが分かっている場合の内部コンストラクタ
    pub(crate) fn from_parts(data: Vec<u8>, width: u32, height: u32, channels: u8) -> Self {
        debug_assert_eq!(
            data.len(),
            width as usize * height as usize * channels as usize
        );
        Self {
            data,
            width,
            height,
            channels,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// ピクセル数（チャンネルを含まない）
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_validates_length() {
        let raster = RasterBuffer::new(vec![0; 12], 2, 2, 3).unwrap();
        assert_eq!(raster.dimensions(), (2, 2));
        assert_eq!(raster.pixel_count(), 4);

        let err = RasterBuffer::new(vec![0; 11], 2, 2, 3).unwrap_err();
        assert_eq!(
            err,
            RasterError::LengthMismatch {
                expected: 12,
                actual: 11
            }
        );
    }

    #[test]
    fn test_new_rejects_two_channels() {
        let err = RasterBuffer::new(vec![0; 8], 2, 2, 2).unwrap_err();
        assert_eq!(err, RasterError::UnsupportedChannels(2));
    }

    #[test]
    fn test_empty_image_is_valid() {
        let raster = RasterBuffer::new(Vec::new(), 0, 0, 1).unwrap();
        assert_eq!(raster.pixel_count(), 0);
    }
}
