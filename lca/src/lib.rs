//! 根付き木の最小共通祖先(LCA)
//!
//! オイラーツアー上の`(深さ, 頂点)`の列に対する区間最小値クエリに帰着させる。
//! 構築O(n)、クエリO(log(n))。

use segtree::Rmq;
use thiserror::Error;

/// 根から到達できない頂点の出現位置
const ABSENT: usize = usize::MAX;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("tree has no nodes")]
    Empty,
    #[error("root {root} is out of range for {len} nodes")]
    RootOutOfRange { root: usize, len: usize },
    #[error("node {node} is out of range for {len} nodes")]
    NodeOutOfRange { node: usize, len: usize },
    #[error("node {0} is reachable from the root along more than one path")]
    Revisited(usize),
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    node: usize,
    parent: Option<usize>,
    next: usize,
}

#[derive(Debug, Clone)]
pub struct Lca {
    root: usize,
    /// 各頂点がオイラーツアーに最初に現れる位置
    first: Box<[usize]>,
    /// 各頂点がオイラーツアーに最後に現れる位置
    last: Box<[usize]>,
    depth: Box<[usize]>,
    rmq: Rmq<(usize, usize)>,
}

impl Lca {
    /// `children[v]`は頂点`v`の子を順に並べたもの。頂点番号は`0..children.len()`。
    ///
    /// 根から到達できない番号は木に含まれないものとして扱う。(1-indexedの入力で0番を空けておく場合など)
    /// 閉路や複数の親を持つ頂点があればエラーを返す。
    pub fn new<C: AsRef<[usize]>>(root: usize, children: &[C]) -> Result<Self, TreeError> {
        Self::build(root, children, false)
    }

    /// 無向辺のリストから構築する。頂点番号は`0..n`。
    pub fn from_edges<I>(n: usize, root: usize, edges: I) -> Result<Self, TreeError>
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        let mut adjacency = vec![vec![]; n];
        for (u, v) in edges {
            for node in [u, v] {
                if node >= n {
                    return Err(TreeError::NodeOutOfRange { node, len: n });
                }
            }
            adjacency[u].push(v);
            adjacency[v].push(u);
        }
        Self::build(root, &adjacency, true)
    }

    fn build<C: AsRef<[usize]>>(
        root: usize,
        adjacency: &[C],
        undirected: bool,
    ) -> Result<Self, TreeError> {
        let n = adjacency.len();
        Self::euler_tour_of(root, adjacency, undirected)
            .map(|(first, last, depth, tour)| {
                log::debug!(
                    "built lca over {n} nodes rooted at {root}, euler tour length {}",
                    tour.len()
                );
                Self {
                    root,
                    first: first.into_boxed_slice(),
                    last: last.into_boxed_slice(),
                    depth: depth.into_boxed_slice(),
                    rmq: Rmq::new(tour),
                }
            })
            .inspect_err(|err| log::trace!("rejected tree rooted at {root}: {err}"))
    }

    /// 戻り値は`(first, last, depth, tour)`。
    #[allow(clippy::type_complexity)]
    fn euler_tour_of<C: AsRef<[usize]>>(
        root: usize,
        adjacency: &[C],
        undirected: bool,
    ) -> Result<(Vec<usize>, Vec<usize>, Vec<usize>, Vec<(usize, usize)>), TreeError> {
        let n = adjacency.len();
        if n == 0 {
            return Err(TreeError::Empty);
        }
        if root >= n {
            return Err(TreeError::RootOutOfRange { root, len: n });
        }
        let mut first = vec![ABSENT; n];
        let mut last = vec![ABSENT; n];
        let mut depth = vec![0; n];
        let mut tour = Vec::with_capacity(2 * n - 1);

        first[root] = 0;
        tour.push((0, root));
        let mut stack = vec![Frame {
            node: root,
            parent: None,
            next: 0,
        }];
        while let Some(frame) = stack.last_mut() {
            let Frame { node, parent, next } = *frame;
            match adjacency[node].as_ref().get(next) {
                Some(&child) => {
                    frame.next += 1;
                    if undirected && Some(child) == parent {
                        continue;
                    }
                    if child >= n {
                        return Err(TreeError::NodeOutOfRange { node: child, len: n });
                    }
                    if first[child] != ABSENT {
                        return Err(TreeError::Revisited(child));
                    }
                    depth[child] = depth[node] + 1;
                    first[child] = tour.len();
                    tour.push((depth[child], child));
                    stack.push(Frame {
                        node: child,
                        parent: Some(node),
                        next: 0,
                    });
                }
                None => {
                    stack.pop();
                    last[node] = tour.len() - 1;
                    if let Some(parent) = parent {
                        tour.push((depth[parent], parent));
                    }
                }
            }
        }
        Ok((first, last, depth, tour))
    }

    /// 頂点番号の個数。根から到達できない番号も含む。
    pub fn len(&self) -> usize {
        self.first.len()
    }

    pub fn is_empty(&self) -> bool {
        self.first.is_empty()
    }

    pub fn root(&self) -> usize {
        self.root
    }

    pub fn contains(&self, v: usize) -> bool {
        self.first.get(v).is_some_and(|&i| i != ABSENT)
    }

    fn position(&self, v: usize) -> usize {
        match self.first[v] {
            ABSENT => panic!("node {v} is not reachable from root {}", self.root),
            i => i,
        }
    }

    /// `u`と`v`の最小共通祖先。O(log(n))
    pub fn lca(&self, u: usize, v: usize) -> usize {
        let (mut i, mut j) = (self.position(u), self.position(v));
        if i > j {
            std::mem::swap(&mut i, &mut j);
        }
        self.rmq.min(i, j).1
    }

    pub fn depth(&self, v: usize) -> usize {
        self.position(v);
        self.depth[v]
    }

    /// `u`と`v`を結ぶパスの辺の本数
    pub fn distance(&self, u: usize, v: usize) -> usize {
        let w = self.lca(u, v);
        self.depth[u] + self.depth[v] - 2 * self.depth[w]
    }

    /// `a`が`b`の祖先であるか。`a == b`のときも`true`。O(1)
    pub fn is_ancestor(&self, a: usize, b: usize) -> bool {
        let (a_first, b_first) = (self.position(a), self.position(b));
        a_first <= b_first && self.last[b] <= self.last[a]
    }

    /// `(深さ, 頂点)`の列。長さは`2 * 辺の本数 + 1`。
    pub fn euler_tour(&self) -> Vec<(usize, usize)> {
        self.rmq.clone().into_vec()
    }
}
