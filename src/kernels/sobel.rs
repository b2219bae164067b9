// Sobel エッジ検出
// 3x3 近傍の勾配強度。境界画素は常に 0。

use super::{ExecutionPolicy, KernelError};
use crate::core::RasterBuffer;
use rayon::prelude::*;

/// 水平方向カーネル
pub const GX: [[i32; 3]; 3] = [[-1, 0, 1], [-2, 0, 2], [-1, 0, 1]];

/// 垂直方向カーネル
pub const GY: [[i32; 3]; 3] = [[-1, -2, -1], [0, 0, 0], [1, 2, 1]];

/// 1行分の勾配強度を計算して `out_row` に書き込む
fn sobel_row(input: &[u8], width: usize, height: usize, y: usize, out_row: &mut [u8]) {
    if y == 0 || y == height - 1 {
        out_row.fill(0);
        return;
    }

    out_row[0] = 0;
    out_row[width - 1] = 0;

    for x in 1..width - 1 {
        let mut sum_x = 0i32;
        let mut sum_y = 0i32;

        for (ky, (gx_row, gy_row)) in GX.iter().zip(GY.iter()).enumerate() {
            let row_start = (y + ky - 1) * width;
            for kx in 0..3 {
                let pixel = input[row_start + x + kx - 1] as i32;
                sum_x += pixel * gx_row[kx];
                sum_y += pixel * gy_row[kx];
            }
        }

        let magnitude = ((sum_x * sum_x + sum_y * sum_y) as f64).sqrt() as i32;
        out_row[x] = magnitude.min(255) as u8;
    }
}

/// 単一チャンネル画像の Sobel 勾配強度
///
/// 幅・高さとも 3 以上が必要。それ未満は `KernelError::ImageTooSmall`。
pub fn sobel(input: &RasterBuffer, policy: ExecutionPolicy) -> Result<RasterBuffer, KernelError> {
    if input.channels() != 1 {
        return Err(KernelError::UnsupportedChannels {
            kernel: "sobel",
            expected: "1",
            actual: input.channels(),
        });
    }

    let (width, height) = (input.width() as usize, input.height() as usize);
    if width < 3 || height < 3 {
        return Err(KernelError::ImageTooSmall {
            width: input.width(),
            height: input.height(),
            min: 3,
        });
    }

    let src = input.data();
    let mut output = vec![0u8; src.len()];
    match policy {
        ExecutionPolicy::Serial => output
            .chunks_exact_mut(width)
            .enumerate()
            .for_each(|(y, row)| sobel_row(src, width, height, y, row)),
        ExecutionPolicy::Parallel { .. } => output
            .par_chunks_exact_mut(width)
            .enumerate()
            .for_each(|(y, row)| sobel_row(src, width, height, y, row)),
    }

    Ok(RasterBuffer::from_parts(
        output,
        input.width(),
        input.height(),
        1,
    ))
}
