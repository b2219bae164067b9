// 輝度ヒストグラムと大津の閾値選択
//
// ヒストグラム構築は並列化できるが（区間ごとの私的ヒストグラム + 要素ごとの和）、
// 閾値探索は累積和に依存するため必ず逐次で行う。

use super::reduce::parallel_reduce;
use super::{ExecutionPolicy, KernelError};
use crate::core::RasterBuffer;

/// 輝度レベル数
pub const GRAY_LEVELS: usize = 256;

/// 256 ビンの輝度ヒストグラム
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Histogram {
    bins: [u64; GRAY_LEVELS],
}

impl Default for Histogram {
    fn default() -> Self {
        Self::new()
    }
}

impl Histogram {
    pub fn new() -> Self {
        Self {
            bins: [0; GRAY_LEVELS],
        }
    }

    /// 各レベルの度数を直接指定して作成
    pub fn from_bins(bins: [u64; GRAY_LEVELS]) -> Self {
        Self { bins }
    }

    /// 画素列を逐次に数える
    pub fn from_pixels(pixels: &[u8]) -> Self {
        Self::new().accumulate(pixels)
    }

    /// 画素列を `parts` 個の区間に分けて並列に数える
    pub fn from_pixels_parallel(pixels: &[u8], parts: usize) -> Self {
        parallel_reduce(
            pixels,
            parts,
            Histogram::new,
            |hist, chunk| hist.accumulate(chunk),
            Histogram::merge,
        )
    }

    fn accumulate(mut self, pixels: &[u8]) -> Self {
        for &value in pixels {
            self.bins[value as usize] += 1;
        }
        self
    }

    /// 要素ごとの和
    pub fn merge(mut self, other: Self) -> Self {
        for (bin, count) in self.bins.iter_mut().zip(other.bins.iter()) {
            *bin += count;
        }
        self
    }

    pub fn bins(&self) -> &[u64; GRAY_LEVELS] {
        &self.bins
    }

    pub fn count(&self, level: u8) -> u64 {
        self.bins[level as usize]
    }

    /// 総画素数
    pub fn total(&self) -> u64 {
        self.bins.iter().sum()
    }
}

/// 単一チャンネル画像のヒストグラムを構築
pub fn build_histogram(gray: &RasterBuffer, policy: ExecutionPolicy) -> Result<Histogram, KernelError> {
    if gray.channels() != 1 {
        return Err(KernelError::UnsupportedChannels {
            kernel: "histogram",
            expected: "1",
            actual: gray.channels(),
        });
    }

    Ok(match policy {
        ExecutionPolicy::Serial => Histogram::from_pixels(gray.data()),
        ExecutionPolicy::Parallel { partitions } => {
            Histogram::from_pixels_parallel(gray.data(), partitions)
        }
    })
}

/// 大津の方法でクラス間分散が最大となる閾値を求める
///
/// 分散が厳密に大きい場合のみ更新するため、最大値に最初に到達した t が選ばれる。
/// 単一レベルのみ、または空のヒストグラムでは 0 を返す。
pub fn compute_threshold(histogram: &Histogram, total_pixels: u64) -> u8 {
    let bins = histogram.bins();
    let sum: f64 = bins
        .iter()
        .enumerate()
        .map(|(level, &count)| level as f64 * count as f64)
        .sum();

    let mut sum_b = 0.0f64;
    let mut w_b = 0u64;
    let mut var_max = 0.0f64;
    let mut threshold = 0u8;

    for (t, &count) in bins.iter().enumerate() {
        w_b += count;
        if w_b == 0 {
            continue;
        }

        let w_f = match total_pixels.checked_sub(w_b) {
            Some(w_f) if w_f > 0 => w_f,
            _ => break,
        };

        sum_b += t as f64 * count as f64;

        let m_b = sum_b / w_b as f64;
        let m_f = (sum - sum_b) / w_f as f64;

        let var_between = w_b as f64 * w_f as f64 * (m_b - m_f) * (m_b - m_f);

        if var_between > var_max {
            var_max = var_between;
            threshold = t as u8;
        }
    }

    threshold
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_peak_histogram(low: u8, high: u8, count: u64) -> Histogram {
        let mut bins = [0u64; GRAY_LEVELS];
        bins[low as usize] = count;
        bins[high as usize] = count;
        Histogram::from_bins(bins)
    }

    fn pseudo_random_pixels(len: usize) -> Vec<u8> {
        let mut state = 0x2545_f491u32;
        (0..len)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                (state >> 24) as u8
            })
            .collect()
    }

    #[test]
    fn test_histogram_total_equals_pixel_count() {
        let pixels = pseudo_random_pixels(10_007);
        let hist = Histogram::from_pixels(&pixels);
        assert_eq!(hist.total(), 10_007);
    }

    #[test]
    fn test_parallel_histogram_matches_serial_for_any_partition() {
        let pixels = pseudo_random_pixels(4099);
        let serial = Histogram::from_pixels(&pixels);

        for parts in [1, 2, 3, 4, 5, 8, 13, 64, 4099, 5000] {
            assert_eq!(
                Histogram::from_pixels_parallel(&pixels, parts),
                serial,
                "parts={parts}"
            );
        }
    }

    #[test]
    fn test_build_histogram_requires_single_channel() {
        let rgb = RasterBuffer::new(vec![0; 12], 2, 2, 3).unwrap();
        assert!(build_histogram(&rgb, ExecutionPolicy::Serial).is_err());

        let gray = RasterBuffer::new(vec![0, 0, 7, 255], 2, 2, 1).unwrap();
        let hist = build_histogram(&gray, ExecutionPolicy::Parallel { partitions: 3 }).unwrap();
        assert_eq!(hist.count(0), 2);
        assert_eq!(hist.count(7), 1);
        assert_eq!(hist.count(255), 1);
    }

    #[test]
    fn test_two_peaks_are_separated() {
        let hist = two_peak_histogram(30, 220, 1000);
        let threshold = compute_threshold(&hist, hist.total());

        // t=30..219 は同じ分散。最初に到達した t が残る
        assert_eq!(threshold, 30);
        assert!((30..220).contains(&threshold));

        let gray = RasterBuffer::new(vec![30, 220, 30, 220], 2, 2, 1).unwrap();
        let binary = super::super::pixel::apply_threshold(&gray, threshold, ExecutionPolicy::Serial)
            .unwrap();
        assert_eq!(binary.data(), &[0, 255, 0, 255]);
    }

    #[test]
    fn test_threshold_strictly_between_spread_peaks() {
        let mut bins = [0u64; GRAY_LEVELS];
        bins[30] = 500;
        bins[40] = 500;
        bins[200] = 500;
        bins[220] = 500;
        let hist = Histogram::from_bins(bins);

        let threshold = compute_threshold(&hist, hist.total());
        assert_eq!(threshold, 40);
        assert!(threshold > 30 && threshold < 220);
    }

    #[test]
    fn test_threshold_is_deterministic() {
        let pixels = pseudo_random_pixels(2048);
        let hist = Histogram::from_pixels(&pixels);
        let first = compute_threshold(&hist, hist.total());
        for _ in 0..5 {
            assert_eq!(compute_threshold(&hist, hist.total()), first);
        }
    }

    #[test]
    fn test_single_level_histogram_yields_zero() {
        let mut bins = [0u64; GRAY_LEVELS];
        bins[128] = 400;
        let hist = Histogram::from_bins(bins);
        assert_eq!(compute_threshold(&hist, 400), 0);
    }

    #[test]
    fn test_empty_histogram_yields_zero() {
        assert_eq!(compute_threshold(&Histogram::new(), 0), 0);
    }
}
