// 汎用の並列リダクション
// 区間ごとに私的なアキュムレータへ畳み込み、全区間の完了後に呼び出し側スレッドで結合する。

use crate::core::partition::partition_ranges;
use rayon::prelude::*;

/// `items` を `parts` 個の連続区間に分けて並列に畳み込み、区間順に結合する
///
/// 各区間は自分専用のアキュムレータを持つため、共有の可変状態もアトミック操作も不要。
/// `combine` は rayon の全タスク完了後に単一の所有者が実行する。
pub fn parallel_reduce<T, A, I, F, C>(items: &[T], parts: usize, identity: I, fold: F, combine: C) -> A
where
    T: Sync,
    A: Send,
    I: Fn() -> A + Sync,
    F: Fn(A, &[T]) -> A + Sync,
    C: Fn(A, A) -> A,
{
    let partials: Vec<A> = partition_ranges(items.len(), parts)
        .into_par_iter()
        .map(|range| fold(identity(), &items[range]))
        .collect();

    partials.into_iter().fold(identity(), combine)
}
