use std::{fmt, marker::PhantomData, ops};

/// セグメント木のノード同士を結合する二項演算
///
/// # 条件
/// * 任意の元`a,b,c`に対して、`op(op(a, b), c) == op(a, op(b, c))`が成り立つ。(結合則)
///
/// 交換則は要求しない。単位元も要求しない。
pub trait Operator {
    type Query;
    fn op(&self, a: &Self::Query, b: &Self::Query) -> Self::Query;
}

impl<OP: Operator> Operator for &OP {
    type Query = OP::Query;
    fn op(&self, a: &Self::Query, b: &Self::Query) -> Self::Query {
        OP::op(self, a, b)
    }
}

macro_rules! marker_op {
    ($($name:ident),*) => {
        $(
            pub struct $name<T>(PhantomData<fn() -> T>);

            impl<T> Default for $name<T> {
                fn default() -> Self {
                    Self(PhantomData)
                }
            }

            impl<T> Clone for $name<T> {
                fn clone(&self) -> Self {
                    *self
                }
            }

            impl<T> Copy for $name<T> {}

            impl<T> fmt::Debug for $name<T> {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(stringify!($name))
                }
            }
        )*
    };
}

marker_op!(Add, Mul, Max, Min);

impl<T> Operator for Add<T>
where
    T: ops::Add<Output = T> + Clone,
{
    type Query = T;
    fn op(&self, a: &Self::Query, b: &Self::Query) -> Self::Query {
        a.clone() + b.clone()
    }
}

impl<T> Operator for Mul<T>
where
    T: ops::Mul<Output = T> + Clone,
{
    type Query = T;
    fn op(&self, a: &Self::Query, b: &Self::Query) -> Self::Query {
        a.clone() * b.clone()
    }
}

/// 等しいときは左側を返す。
impl<T> Operator for Max<T>
where
    T: Ord + Clone,
{
    type Query = T;
    fn op(&self, a: &Self::Query, b: &Self::Query) -> Self::Query {
        if a >= b {
            a.clone()
        } else {
            b.clone()
        }
    }
}

/// 等しいときは左側を返す。
impl<T> Operator for Min<T>
where
    T: Ord + Clone,
{
    type Query = T;
    fn op(&self, a: &Self::Query, b: &Self::Query) -> Self::Query {
        if a <= b {
            a.clone()
        } else {
            b.clone()
        }
    }
}

/// 任意の関数を二項演算として扱う。結合則を満たすかは呼び出し側の責任。
#[repr(transparent)]
pub struct FnOp<T, F> {
    f: F,
    _marker: PhantomData<fn(&T, &T) -> T>,
}

impl<T, F: Clone> Clone for FnOp<T, F> {
    fn clone(&self) -> Self {
        Self {
            f: self.f.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T, F: Copy> Copy for FnOp<T, F> {}

impl<T, F> fmt::Debug for FnOp<T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnOp")
    }
}

impl<T, F: Fn(&T, &T) -> T> FnOp<T, F> {
    pub fn new(f: F) -> Self {
        Self {
            f,
            _marker: PhantomData,
        }
    }
}

impl<T, F: Fn(&T, &T) -> T> Operator for FnOp<T, F> {
    type Query = T;
    fn op(&self, a: &T, b: &T) -> T {
        (self.f)(a, b)
    }
}

pub fn add<T>() -> Add<T> {
    Add::default()
}

pub fn mul<T>() -> Mul<T> {
    Mul::default()
}

pub fn max<T>() -> Max<T> {
    Max::default()
}

pub fn min<T>() -> Min<T> {
    Min::default()
}

pub fn from_fn<T, F: Fn(&T, &T) -> T>(f: F) -> FnOp<T, F> {
    FnOp::new(f)
}
