// テストユーティリティ
// 統合テストで使う画像の生成と保存

#![allow(dead_code)]

use image_filters::core::RasterBuffer;
use image_filters::image_codec::{standard::StandardImageCodec, ImageCodec};
use std::path::Path;

/// 4x4 の単一チャンネル画像（中央に明るい正方形）
pub fn luma_4x4() -> RasterBuffer {
    #[rustfmt::skip]
    let data = vec![
        10,  10,  10, 10,
        10, 200, 200, 10,
        10, 200, 200, 10,
        10,  10,  10, 10,
    ];
    RasterBuffer::new(data, 4, 4, 1).unwrap()
}

/// 幅 x 高さの RGB グラデーション画像
pub fn rgb_gradient(width: u32, height: u32) -> RasterBuffer {
    let mut data = Vec::with_capacity((width * height * 3) as usize);
    for y in 0..height {
        for x in 0..width {
            data.push((x * 255 / width.max(1)) as u8);
            data.push((y * 255 / height.max(1)) as u8);
            data.push(((x + y) * 7 % 256) as u8);
        }
    }
    RasterBuffer::new(data, width, height, 3).unwrap()
}

pub fn encode_png(raster: &RasterBuffer) -> Vec<u8> {
    StandardImageCodec::new().encode(raster).unwrap()
}

pub fn write_image(dir: &Path, name: &str, raster: &RasterBuffer) {
    std::fs::write(dir.join(name), encode_png(raster)).unwrap();
}

/// 出力ディレクトリ内のファイル名一覧（ソート済み）
pub fn list_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
