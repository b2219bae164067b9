// ピクセル単位のカーネル: グレースケール、ネガ、二値化
// すべて純粋関数で、出力は常に新しく確保したバッファ

use super::{ExecutionPolicy, KernelError};
use crate::core::RasterBuffer;
use rayon::prelude::*;

const LUMA_R: f64 = 0.299;
const LUMA_G: f64 = 0.587;
const LUMA_B: f64 = 0.114;

/// 輝度値（四捨五入）
///
/// グレースケール変換と大津法の内部変換の両方がこの式を使う。
#[inline]
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    (LUMA_R * r as f64 + LUMA_G * g as f64 + LUMA_B * b as f64).round() as u8
}

#[inline]
fn grayscale_pixel(src: &[u8], dst: &mut [u8]) {
    let gray = luma(src[0], src[1], src[2]);
    dst[0] = gray;
    dst[1] = gray;
    dst[2] = gray;
    if src.len() == 4 {
        dst[3] = src[3];
    }
}

/// RGB の3チャンネルに輝度を書き込む。アルファは変更せずコピー
pub fn grayscale(input: &RasterBuffer, policy: ExecutionPolicy) -> Result<RasterBuffer, KernelError> {
    let channels = input.channels() as usize;
    if channels < 3 {
        return Err(KernelError::UnsupportedChannels {
            kernel: "grayscale",
            expected: "3 or 4",
            actual: input.channels(),
        });
    }

    let mut output = vec![0u8; input.data().len()];
    match policy {
        ExecutionPolicy::Serial => output
            .chunks_exact_mut(channels)
            .zip(input.data().chunks_exact(channels))
            .for_each(|(dst, src)| grayscale_pixel(src, dst)),
        ExecutionPolicy::Parallel { .. } => output
            .par_chunks_exact_mut(channels)
            .zip(input.data().par_chunks_exact(channels))
            .for_each(|(dst, src)| grayscale_pixel(src, dst)),
    }

    Ok(RasterBuffer::from_parts(
        output,
        input.width(),
        input.height(),
        input.channels(),
    ))
}

/// 全バイトを反転（アルファも反転する）
pub fn negative(input: &RasterBuffer, policy: ExecutionPolicy) -> RasterBuffer {
    let output: Vec<u8> = match policy {
        ExecutionPolicy::Serial => input.data().iter().map(|&v| 255 - v).collect(),
        ExecutionPolicy::Parallel { .. } => input.data().par_iter().map(|&v| 255 - v).collect(),
    };

    RasterBuffer::from_parts(output, input.width(), input.height(), input.channels())
}

/// 単一チャンネルへの輝度変換（大津法の前処理）
///
/// 入力が単一チャンネルならそのままコピーを返す。
pub fn to_luma(input: &RasterBuffer, policy: ExecutionPolicy) -> RasterBuffer {
    let channels = input.channels() as usize;
    if channels == 1 {
        return input.clone();
    }

    let convert = |px: &[u8]| luma(px[0], px[1], px[2]);
    let output: Vec<u8> = match policy {
        ExecutionPolicy::Serial => input.data().chunks_exact(channels).map(convert).collect(),
        ExecutionPolicy::Parallel { .. } => input
            .data()
            .par_chunks_exact(channels)
            .map(convert)
            .collect(),
    };

    RasterBuffer::from_parts(output, input.width(), input.height(), 1)
}

/// 二値化: 閾値より厳密に大きい画素のみ 255、等しい画素は背景 0
pub fn apply_threshold(
    gray: &RasterBuffer,
    threshold: u8,
    policy: ExecutionPolicy,
) -> Result<RasterBuffer, KernelError> {
    if gray.channels() != 1 {
        return Err(KernelError::UnsupportedChannels {
            kernel: "threshold",
            expected: "1",
            actual: gray.channels(),
        });
    }

    let binarize = |&v: &u8| if v > threshold { 255 } else { 0 };
    let output: Vec<u8> = match policy {
        ExecutionPolicy::Serial => gray.data().iter().map(binarize).collect(),
        ExecutionPolicy::Parallel { .. } => gray.data().par_iter().map(binarize).collect(),
    };

    Ok(RasterBuffer::from_parts(output, gray.width(), gray.height(), 1))
}
