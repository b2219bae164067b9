// カタログの連続区間分割
// 区間の計算は core::partition、ここでは rank から区間への写像を持つ

use std::ops::Range;

pub use crate::core::partition::{partition_ranges, share_size};

/// ワーカー番号から担当区間への写像
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkPartition {
    total: usize,
    ranges: Vec<Range<usize>>,
}

impl WorkPartition {
    /// 分割を作成。ワーカー数 0 は None
    pub fn new(total: usize, worker_count: usize) -> Option<Self> {
        if worker_count == 0 {
            return None;
        }

        Some(Self {
            total,
            ranges: partition_ranges(total, worker_count),
        })
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn worker_count(&self) -> usize {
        self.ranges.len()
    }

    pub fn range(&self, rank: usize) -> Option<Range<usize>> {
        self.ranges.get(rank).cloned()
    }

    pub fn ranges(&self) -> &[Range<usize>] {
        &self.ranges
    }

    pub fn sizes(&self) -> Vec<usize> {
        self.ranges.iter().map(|r| r.len()).collect()
    }
}
