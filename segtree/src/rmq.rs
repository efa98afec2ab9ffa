use crate::{operation::Min, Segtree};

/// 区間最小値クエリ。
///
/// 最小値が複数あるときはどれが返るかは規定しない。(`Min`は左側を返すので、実際には最も左のもの)
pub type Rmq<T> = Segtree<T, Min<T>>;

impl<T: Ord + Clone> Segtree<T, Min<T>> {
    pub fn new<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_iter_op(iter, Min::default())
    }

    /// 閉区間`[lo, hi]`の最小値
    pub fn min(&self, lo: usize, hi: usize) -> T {
        self.range_query(lo, hi)
    }
}
