pub mod operation;
pub mod rmq;

use operation::Operator;
pub use rmq::Rmq;
use std::{
    cmp::Ordering,
    ops::{Bound, Deref, DerefMut, RangeBounds},
};

/// 区間`[lo, hi]`を担当するノード。
///
/// 子は`[lo, mid]`と`[mid + 1, hi]`(`mid = (lo + hi) / 2`)。
/// ノードの値は帰りがけ順で配列に並んでおり、`start`はこのノードの部分木が占める領域の先頭。
/// 長さ`m`の区間の部分木は`2m - 1`個の要素を占め、ノード自身はその末尾にある。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Node {
    start: usize,
    lo: usize,
    hi: usize,
}

impl Node {
    const fn root(len: usize) -> Self {
        Self {
            start: 0,
            lo: 0,
            hi: len - 1,
        }
    }

    const fn pos(self) -> usize {
        self.start + 2 * (self.hi - self.lo)
    }

    const fn is_leaf(self) -> bool {
        self.lo == self.hi
    }

    const fn mid(self) -> usize {
        (self.lo + self.hi) / 2
    }

    const fn left(self) -> Self {
        Self {
            start: self.start,
            lo: self.lo,
            hi: self.mid(),
        }
    }

    const fn right(self) -> Self {
        let mid = self.mid();
        Self {
            start: self.start + 2 * (mid - self.lo) + 1,
            lo: mid + 1,
            hi: self.hi,
        }
    }
}

/// 結合則を満たす二項演算`OP`による区間積を管理するセグメント木。
///
/// 長さ`n`の列に対して`2n - 1`個のノードを持つ。
/// 演算は交換則を満たさなくてもよく、区間積は常に添字の昇順に結合される。
#[derive(Debug, Clone)]
pub struct Segtree<T, OP> {
    len: usize,
    data: Box<[T]>,
    op: OP,
}

impl<T, OP> Segtree<T, OP> {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn leaf(&self, index: usize) -> Node {
        let mut node = Node::root(self.len);
        while !node.is_leaf() {
            node = if index <= node.mid() {
                node.left()
            } else {
                node.right()
            };
        }
        node
    }

    pub fn get(&self, index: usize) -> &T {
        assert!(index < self.len, "index out of bounds");
        &self.data[self.leaf(index).pos()]
    }

    /// 葉を添字の順に並べたものを返す。
    pub fn into_vec(self) -> Vec<T> {
        if self.len == 0 {
            return Vec::new();
        }
        let mut is_leaf = vec![false; self.data.len()];
        mark_leaves(Node::root(self.len), &mut is_leaf);
        self.data
            .into_vec()
            .into_iter()
            .zip(is_leaf)
            .filter_map(|(value, leaf)| leaf.then_some(value))
            .collect()
    }
}

fn mark_leaves(node: Node, is_leaf: &mut [bool]) {
    if node.is_leaf() {
        is_leaf[node.pos()] = true;
    } else {
        mark_leaves(node.left(), is_leaf);
        mark_leaves(node.right(), is_leaf);
    }
}

impl<T, OP: Operator<Query = T>> Segtree<T, OP> {
    pub fn from_iter_op<I: IntoIterator<Item = T>>(iter: I, op: OP) -> Self {
        let values = iter.into_iter().collect::<Vec<_>>();
        let len = values.len();
        if len == 0 {
            return Self {
                len,
                data: Box::new([]),
                op,
            };
        }
        let mut data = Vec::with_capacity(2 * len - 1);
        build(&op, Node::root(len), &mut values.into_iter(), &mut data);
        debug_assert_eq!(data.len(), 2 * len - 1);
        Self {
            len,
            data: data.into_boxed_slice(),
            op,
        }
    }

    fn pull(&mut self, node: Node) {
        let value = self
            .op
            .op(&self.data[node.left().pos()], &self.data[node.right().pos()]);
        self.data[node.pos()] = value;
    }

    /// `index`を含む葉から根までのノードを再計算する。葉自身は変更しない。
    fn recalc(&mut self, node: Node, index: usize) {
        if node.is_leaf() {
            return;
        }
        if index <= node.mid() {
            self.recalc(node.left(), index);
        } else {
            self.recalc(node.right(), index);
        }
        self.pull(node);
    }

    pub fn update(&mut self, index: usize, value: T) {
        assert!(index < self.len, "index out of bounds");
        let leaf = self.leaf(index);
        self.data[leaf.pos()] = value;
        self.recalc(Node::root(self.len), index);
    }

    pub fn get_mut(&mut self, index: usize) -> ValMut<'_, T, OP> {
        assert!(index < self.len, "index out of bounds");
        ValMut {
            pos: self.leaf(index).pos(),
            index,
            segtree: self,
        }
    }
}

fn build<T, OP, I>(op: &OP, node: Node, values: &mut I, data: &mut Vec<T>)
where
    OP: Operator<Query = T>,
    I: Iterator<Item = T>,
{
    if node.is_leaf() {
        let value = values
            .next()
            .unwrap_or_else(|| panic!("missing value for index {}", node.lo));
        data.push(value);
        return;
    }
    let (left, right) = (node.left(), node.right());
    build(op, left, values, data);
    build(op, right, values, data);
    debug_assert_eq!(data.len(), node.pos());
    let value = op.op(&data[left.pos()], &data[right.pos()]);
    data.push(value);
}

impl<T: Clone, OP: Operator<Query = T>> Segtree<T, OP> {
    /// 戻り値を`(l, r)`とすると以下が保証される。
    ///
    /// * `l <= r <= self.len()`
    fn get_lr<R: RangeBounds<usize>>(&self, range: R) -> (usize, usize) {
        use Bound::*;
        let size = self.len;
        let l = match range.start_bound() {
            Excluded(s) => s
                .checked_add(1)
                .unwrap_or_else(|| panic!("attempted to index slice from after maximum usize")),
            Included(s) => *s,
            Unbounded => 0,
        };
        let r = match range.end_bound() {
            Excluded(e) => *e,
            Included(e) => e
                .checked_add(1)
                .unwrap_or_else(|| panic!("attempted to index slice up to maximum usize")),
            Unbounded => size,
        };
        if l > r {
            panic!("slice index starts at {l} but ends at {r}");
        } else if r > size {
            panic!("range end index {r} out of range for slice of length {size}");
        }
        (l, r)
    }

    /// 閉区間`[lo, hi]`の要素を左から順に結合した値を返す。O(log(n))
    pub fn range_query(&self, lo: usize, hi: usize) -> T {
        if lo > hi {
            panic!("slice index starts at {lo} but ends at {hi}");
        } else if hi >= self.len {
            panic!(
                "range end index {} out of range for slice of length {}",
                hi + 1,
                self.len
            );
        }
        self.fold(Node::root(self.len), lo, hi)
    }

    /// 区間が空なら`None`を返す。
    pub fn query<R: RangeBounds<usize>>(&self, range: R) -> Option<T> {
        let (l, r) = self.get_lr(range);
        (l < r).then(|| self.fold(Node::root(self.len), l, r - 1))
    }

    fn fold(&self, node: Node, lo: usize, hi: usize) -> T {
        if lo == node.lo && hi == node.hi {
            return self.data[node.pos()].clone();
        }
        let mid = node.mid();
        if hi <= mid {
            self.fold(node.left(), lo, hi)
        } else if lo > mid {
            self.fold(node.right(), lo, hi)
        } else {
            let left = self.fold(node.left(), lo, mid);
            let right = self.fold(node.right(), mid + 1, hi);
            self.op.op(&left, &right)
        }
    }

    /// `pred(self.query(l..j))`が`true`となる最大の`j`をO(log(n))で求める。
    ///
    /// 空区間では`pred`を呼ばず`true`とみなす。`pred`は単調でなければならない。
    pub fn upper_bound<P>(&self, l: usize, mut pred: P) -> usize
    where
        P: FnMut(&T) -> bool,
    {
        match l.cmp(&self.len()) {
            Ordering::Equal => return l,
            Ordering::Greater => {
                panic!("index {l} out of range for slice of length {}", self.len())
            }
            _ => {}
        };
        let mut acc = None;
        self.upper_bound_rec(Node::root(self.len), l, &mut acc, &mut pred)
            .unwrap_or(self.len)
    }

    fn upper_bound_rec<P>(
        &self,
        node: Node,
        l: usize,
        acc: &mut Option<T>,
        pred: &mut P,
    ) -> Option<usize>
    where
        P: FnMut(&T) -> bool,
    {
        if node.hi < l {
            return None;
        }
        if l <= node.lo {
            let value = &self.data[node.pos()];
            let next = match acc {
                Some(acc) => self.op.op(acc, value),
                None => value.clone(),
            };
            if pred(&next) {
                *acc = Some(next);
                return None;
            }
            if node.is_leaf() {
                return Some(node.lo);
            }
        }
        if let Some(j) = self.upper_bound_rec(node.left(), l, acc, pred) {
            return Some(j);
        }
        self.upper_bound_rec(node.right(), l, acc, pred)
    }

    /// `pred(self.query(j..r))`が`true`となる最小の`j`をO(log(n))で求める。
    ///
    /// 空区間では`pred`を呼ばず`true`とみなす。`pred`は単調でなければならない。
    pub fn lower_bound<P>(&self, r: usize, mut pred: P) -> usize
    where
        P: FnMut(&T) -> bool,
    {
        if r > self.len {
            panic!("index {r} out of range for slice of length {}", self.len())
        }
        if r == 0 {
            return 0;
        }
        let mut acc = None;
        self.lower_bound_rec(Node::root(self.len), r, &mut acc, &mut pred)
            .unwrap_or(0)
    }

    fn lower_bound_rec<P>(
        &self,
        node: Node,
        r: usize,
        acc: &mut Option<T>,
        pred: &mut P,
    ) -> Option<usize>
    where
        P: FnMut(&T) -> bool,
    {
        if node.lo >= r {
            return None;
        }
        if node.hi < r {
            let value = &self.data[node.pos()];
            let next = match acc {
                Some(acc) => self.op.op(value, acc),
                None => value.clone(),
            };
            if pred(&next) {
                *acc = Some(next);
                return None;
            }
            if node.is_leaf() {
                return Some(node.lo + 1);
            }
        }
        if let Some(j) = self.lower_bound_rec(node.right(), r, acc, pred) {
            return Some(j);
        }
        self.lower_bound_rec(node.left(), r, acc, pred)
    }
}

pub struct ValMut<'a, T, OP: Operator<Query = T>> {
    segtree: &'a mut Segtree<T, OP>,
    index: usize,
    pos: usize,
}

impl<'a, T, OP: Operator<Query = T>> Deref for ValMut<'a, T, OP> {
    type Target = T;
    fn deref(&self) -> &Self::Target {
        &self.segtree.data[self.pos]
    }
}

impl<'a, T, OP: Operator<Query = T>> DerefMut for ValMut<'a, T, OP> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.segtree.data[self.pos]
    }
}

impl<'a, T, OP: Operator<Query = T>> Drop for ValMut<'a, T, OP> {
    fn drop(&mut self) {
        let root = Node::root(self.segtree.len);
        self.segtree.recalc(root, self.index);
    }
}

impl<I, OP> FromIterator<I> for Segtree<I, OP>
where
    OP: Default + Operator<Query = I>,
{
    fn from_iter<T: IntoIterator<Item = I>>(iter: T) -> Self {
        Self::from_iter_op(iter, OP::default())
    }
}

impl<T, OP> From<Segtree<T, OP>> for Vec<T> {
    fn from(value: Segtree<T, OP>) -> Self {
        value.into_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario() -> Segtree<i32, operation::Max<i32>> {
        (0..10).map(|i| (3 * i + 2) % 10).collect()
    }

    #[test]
    fn node_layout_test() {
        let root = Node::root(5);
        assert_eq!(root.pos(), 8);
        assert_eq!(root.left(), Node { start: 0, lo: 0, hi: 2 });
        assert_eq!(root.left().pos(), 4);
        assert_eq!(root.right(), Node { start: 5, lo: 3, hi: 4 });
        assert_eq!(root.right().pos(), 7);
        assert_eq!(root.right().right().pos(), 6);
    }

    #[test]
    fn new_test() {
        let segtree = Segtree::from_iter_op([1u32, 2, 3, 4, 5, 6], operation::min());
        // [0,5] -> [0,2] [3,5] -> [0,1] [2] [3,4] [5] -> ...
        assert_eq!(&segtree.data[..], &[1, 2, 1, 3, 1, 4, 5, 4, 6, 4, 1]);
        assert_eq!(segtree.len(), 6);
    }

    #[test]
    fn scenario_test() {
        let mut segtree = scenario();
        assert_eq!(segtree.clone().into_vec(), vec![2, 5, 8, 1, 4, 7, 0, 3, 6, 9]);
        assert_eq!(segtree.range_query(0, 5), 8);
        segtree.update(3, 9);
        assert_eq!(segtree.range_query(0, 5), 9);
        assert_eq!(segtree.range_query(3, 3), 9);
        segtree.update(0, 9);
        assert_eq!(segtree.range_query(0, 5), 9);
        assert_eq!(segtree.range_query(4, 8), 7);
    }

    #[test]
    fn sum_query_test() {
        let segtree = [-4, 6, -3, 2, 1, 1, 7]
            .into_iter()
            .collect::<Segtree<_, operation::Add<_>>>();

        assert_eq!(segtree.query(..), Some(10));
        assert_eq!(segtree.query(3..), Some(11));
        assert_eq!(segtree.query(3..6), Some(4));
        assert_eq!(segtree.query(..3), Some(-1));

        assert_eq!(segtree.query(0..1), Some(-4));
        assert_eq!(segtree.query(0..=0), Some(-4));
        assert_eq!(segtree.query(0..=1), Some(2));
        assert_eq!(segtree.query(0..0), None);
        assert_eq!(segtree.query(1..1), None);
        assert_eq!(segtree.query(7..7), None);
        assert_eq!(segtree.query(6..7), Some(7));
        assert_eq!(segtree.range_query(2, 4), 0);
    }

    #[test]
    fn min_query_test() {
        let segtree = [23i32, 12, -3, 0, 3, -2, 7, 8]
            .into_iter()
            .collect::<Segtree<_, operation::Min<_>>>();

        assert_eq!(segtree.query(..), Some(-3));
        assert_eq!(segtree.query(3..), Some(-2));
        assert_eq!(segtree.query(..2), Some(12));
        assert_eq!(segtree.query(3..5), Some(0));
        assert_eq!(segtree.query(7..8), Some(8));
    }

    #[test]
    fn non_commutative_test() {
        let words = ["a", "b", "c", "d", "e", "f", "g"].map(String::from);
        let mut segtree =
            Segtree::from_iter_op(words, operation::from_fn(|a: &String, b: &String| a.clone() + b));
        assert_eq!(segtree.range_query(0, 6), "abcdefg");
        assert_eq!(segtree.range_query(2, 5), "cdef");
        assert_eq!(segtree.query(1..=3).as_deref(), Some("bcd"));
        segtree.update(4, "XY".to_string());
        assert_eq!(segtree.range_query(3, 6), "dXYfg");
        assert_eq!(segtree.get(4), "XY");
    }

    #[test]
    fn single_element_test() {
        let mut segtree = [42].into_iter().collect::<Segtree<_, operation::Add<_>>>();
        assert_eq!(segtree.range_query(0, 0), 42);
        segtree.update(0, 7);
        assert_eq!(segtree.query(..), Some(7));
        assert_eq!(segtree.upper_bound(0, |v| *v < 10), 1);
    }

    #[test]
    fn empty_test() {
        let segtree = std::iter::empty::<u32>().collect::<Segtree<_, operation::Add<_>>>();
        assert!(segtree.is_empty());
        assert_eq!(segtree.query(..), None);
        assert_eq!(segtree.upper_bound(0, |_| true), 0);
        assert_eq!(segtree.lower_bound(0, |_| true), 0);
        assert!(segtree.into_vec().is_empty());
    }

    #[test]
    #[should_panic]
    fn out_of_bounds_test1() {
        let segtree = [1, 2, 3, 4, 5, 6, 7]
            .into_iter()
            .collect::<Segtree<_, operation::Add<_>>>();
        segtree.query(0..9);
    }

    #[test]
    #[should_panic]
    fn out_of_bounds_test2() {
        let segtree = [1, 2, 3, 4, 5, 6, 7]
            .into_iter()
            .collect::<Segtree<_, operation::Add<_>>>();
        segtree.range_query(3, 7);
    }

    #[test]
    #[should_panic]
    fn out_of_bounds_test3() {
        let segtree = [1, 2, 3, 4, 5, 6, 7]
            .into_iter()
            .collect::<Segtree<_, operation::Add<_>>>();
        segtree.range_query(5, 4);
    }

    #[test]
    #[should_panic]
    #[allow(clippy::reversed_empty_ranges)]
    fn out_of_bounds_test4() {
        let segtree = [1, 2, 3, 4, 5, 6, 7]
            .into_iter()
            .collect::<Segtree<_, operation::Add<_>>>();
        segtree.query(5..4);
    }

    #[test]
    #[should_panic]
    fn out_of_bounds_test5() {
        let mut segtree = [1, 2, 3].into_iter().collect::<Segtree<_, operation::Add<_>>>();
        segtree.update(3, 0);
    }

    #[test]
    fn update_test() {
        let mut segtree = [-4, 6, -3, 2, 1, 1, 7]
            .into_iter()
            .collect::<Segtree<_, operation::Add<_>>>();

        *segtree.get_mut(2) = 3;
        assert_eq!(segtree.query(..), Some(16));
        assert_eq!(segtree.query(3..), Some(11));
        assert_eq!(segtree.query(3..6), Some(4));
        assert_eq!(segtree.query(..3), Some(5));

        segtree.update(6, -7);
        assert_eq!(segtree.query(..), Some(2));
        assert_eq!(*segtree.get(6), -7);
        assert_eq!(Vec::from(segtree), vec![-4, 6, 3, 2, 1, 1, -7]);
    }

    #[test]
    fn partition_point_test() {
        let segtree = [3u32, 5, 2, 1, 9, 11, 15, 3]
            .into_iter()
            .collect::<Segtree<_, operation::Add<_>>>();

        assert_eq!(segtree.upper_bound(0, |v| *v <= 20), 5);
        assert_eq!(segtree.upper_bound(1, |v| *v <= 20), 5);
        assert_eq!(segtree.upper_bound(4, |v| *v <= 25), 6);
        assert_eq!(segtree.upper_bound(3, |v| *v <= 100), 8);
        assert_eq!(segtree.upper_bound(8, |v| *v <= 20), 8);
        assert_eq!(segtree.upper_bound(6, |v| *v <= 10), 6);

        assert_eq!(segtree.lower_bound(8, |v| *v <= 20), 6);
        assert_eq!(segtree.lower_bound(5, |v| *v <= 12), 2);
        assert_eq!(segtree.lower_bound(8, |v| *v <= 100), 0);
        assert_eq!(segtree.lower_bound(0, |v| *v <= 0), 0);
        assert_eq!(segtree.lower_bound(4, |v| *v == 0), 4);
    }

    #[test]
    fn max_query_test() {
        let mut segtree = [23i32, 12, -3, 0, 3, -2, 7, 8]
            .into_iter()
            .collect::<Segtree<_, operation::Max<_>>>();

        assert_eq!(segtree.query(..), Some(23));
        assert_eq!(segtree.query(1..), Some(12));
        assert_eq!(segtree.query(2..), Some(8));
        assert_eq!(segtree.query(1..6), Some(12));
        assert_eq!(segtree.query(2..6), Some(3));
        assert_eq!(segtree.query(2..=6), Some(7));

        segtree.update(2, 5);
        assert_eq!(segtree.query(..), Some(23));
        assert_eq!(segtree.query(2..), Some(8));
        assert_eq!(segtree.query(2..6), Some(5));
        assert_eq!(segtree.query(2..=6), Some(7));

        segtree.update(0, 10);
        assert_eq!(segtree.upper_bound(2, |v| *v < 12), 8);
        assert_eq!(segtree.upper_bound(2, |v| *v < 7), 6);
        assert_eq!(segtree.upper_bound(0, |v| *v < 10), 0);
    }

    #[test]
    #[should_panic]
    fn partition_point_panic() {
        let segtree = [3u32, 5, 2, 1, 9, 11, 15, 3]
            .into_iter()
            .collect::<Segtree<_, operation::Add<_>>>();
        segtree.upper_bound(9, |v| *v <= 20);
    }

    #[test]
    fn idempotent_query_test() {
        let segtree = scenario();
        let first = segtree.range_query(2, 7);
        for _ in 0..3 {
            assert_eq!(segtree.range_query(2, 7), first);
        }
    }
}
