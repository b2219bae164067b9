// 連続区間分割
// N 件を P 個に分け、サイズ差は最大 1。余りは先頭の (N mod P) 個に 1 件ずつ加算する。
// カタログの分配とカーネルの私的区間の両方がこの規則を使う。

use std::ops::Range;

/// 区間番号ごとの件数
pub fn share_size(total: usize, parts: usize, rank: usize) -> usize {
    if parts == 0 || rank >= parts {
        return 0;
    }
    total / parts + usize::from(rank < total % parts)
}

/// 連続区間のリストを計算（parts = 0 は 1 として扱う）
pub fn partition_ranges(total: usize, parts: usize) -> Vec<Range<usize>> {
    let parts = parts.max(1);
    let mut ranges = Vec::with_capacity(parts);
    let mut offset = 0;

    for rank in 0..parts {
        let size = share_size(total, parts, rank);
        ranges.push(offset..offset + size);
        offset += size;
    }

    debug_assert_eq!(offset, total);
    ranges
}
