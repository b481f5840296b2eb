//! 接收算子比较器
//!
//! `TaoComparator` 把两个算子的交换论证（与两机流水车间的 Johnson 规则同源）
//! 推广到整个未调度集合上。它对任意 `p`/`m`/`mp` 组合并不保证传递性，
//! 因此排序使用 [`stable_sort_by`]：比较器不满足全序时结果可能依赖输入顺序，但不会 panic。

use std::cmp::Ordering;

use super::base::OpProps;

/// 比较策略：`Less` 表示 `a` 应先于 `b` 调度
pub trait OpComparator {
    fn compare(&self, a: &OpProps, b: &OpProps) -> Ordering;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TaoComparator;

impl OpComparator for TaoComparator {
    fn compare(&self, this: &OpProps, other: &OpProps) -> Ordering {
        let a = other.p.min(this.m);
        let b = this.p.min(other.m);
        a.cmp(&b).then_with(|| this.mp.cmp(&other.mp))
    }
}

/// 只看联合依赖大小
#[derive(Debug, Clone, Copy, Default)]
pub struct MpComparator;

impl OpComparator for MpComparator {
    fn compare(&self, a: &OpProps, b: &OpProps) -> Ordering {
        a.mp.cmp(&b.mp)
    }
}

/// 稳定归并排序。
///
/// 标准库的 `sort_by` 在比较器不是全序时允许 panic，这里的比较器恰好可能如此。
pub fn stable_sort_by<T: Copy>(items: &mut [T], mut cmp: impl FnMut(&T, &T) -> Ordering) {
    if items.len() < 2 {
        return;
    }
    let mut buf = items.to_vec();
    merge_sort(items, &mut buf, &mut cmp);
}

fn merge_sort<T: Copy>(items: &mut [T], buf: &mut [T], cmp: &mut impl FnMut(&T, &T) -> Ordering) {
    let n = items.len();
    if n < 2 {
        return;
    }
    let mid = n / 2;
    {
        let (lo, hi) = items.split_at_mut(mid);
        let (blo, bhi) = buf.split_at_mut(mid);
        merge_sort(lo, blo, cmp);
        merge_sort(hi, bhi, cmp);
    }
    buf[..n].copy_from_slice(items);
    let (mut i, mut j) = (0, mid);
    for slot in items.iter_mut() {
        // 右侧严格更小才取右侧，保证稳定
        let take_right = i >= mid || (j < n && cmp(&buf[j], &buf[i]) == Ordering::Less);
        if take_right {
            *slot = buf[j];
            j += 1;
        } else {
            *slot = buf[i];
            i += 1;
        }
    }
}
