use std::{
    iter::Sum,
    ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub, SubAssign},
};

use super::{Expr, Node};

fn add(a: Expr, b: Expr) -> Expr {
    match (a.as_constant(), b.as_constant()) {
        (Some(x), Some(y)) => Expr::constant(x + y),
        (Some(x), _) if x == 0.0 => b,
        (_, Some(y)) if y == 0.0 => a,
        _ => Expr::from_node(Node::Add(a, b)),
    }
}

fn sub(a: Expr, b: Expr) -> Expr {
    match (a.as_constant(), b.as_constant()) {
        (Some(x), Some(y)) => Expr::constant(x - y),
        (_, Some(y)) if y == 0.0 => a,
        (Some(x), _) if x == 0.0 => neg(b),
        _ => Expr::from_node(Node::Sub(a, b)),
    }
}

fn mul(a: Expr, b: Expr) -> Expr {
    match (a.as_constant(), b.as_constant()) {
        (Some(x), Some(y)) => Expr::constant(x * y),
        (Some(x), _) | (_, Some(x)) if x == 0.0 => Expr::zero(),
        (Some(x), _) if x == 1.0 => b,
        (_, Some(y)) if y == 1.0 => a,
        (Some(x), _) if x == -1.0 => neg(b),
        (_, Some(y)) if y == -1.0 => neg(a),
        _ => Expr::from_node(Node::Mul(a, b)),
    }
}

fn div(a: Expr, b: Expr) -> Expr {
    match (a.as_constant(), b.as_constant()) {
        (Some(x), Some(y)) if y != 0.0 => Expr::constant(x / y),
        (Some(x), _) if x == 0.0 => Expr::zero(),
        (_, Some(y)) if y == 1.0 => a,
        _ => Expr::from_node(Node::Div(a, b)),
    }
}

fn neg(a: Expr) -> Expr {
    if let Some(c) = a.as_constant() {
        return Expr::constant(-c);
    }
    if let Node::Neg(inner) = a.node() {
        return inner.clone();
    }
    Expr::from_node(Node::Neg(a))
}

macro_rules! impl_binary_op {
    ($trait:ident, $method:ident, $func:ident) => {
        impl $trait<Expr> for Expr {
            type Output = Expr;
            fn $method(self, rhs: Expr) -> Expr {
                $func(self, rhs)
            }
        }

        impl $trait<&Expr> for Expr {
            type Output = Expr;
            fn $method(self, rhs: &Expr) -> Expr {
                $func(self, rhs.clone())
            }
        }

        impl $trait<Expr> for &Expr {
            type Output = Expr;
            fn $method(self, rhs: Expr) -> Expr {
                $func(self.clone(), rhs)
            }
        }

        impl $trait<&Expr> for &Expr {
            type Output = Expr;
            fn $method(self, rhs: &Expr) -> Expr {
                $func(self.clone(), rhs.clone())
            }
        }

        impl $trait<f64> for Expr {
            type Output = Expr;
            fn $method(self, rhs: f64) -> Expr {
                $func(self, Expr::constant(rhs))
            }
        }

        impl $trait<f64> for &Expr {
            type Output = Expr;
            fn $method(self, rhs: f64) -> Expr {
                $func(self.clone(), Expr::constant(rhs))
            }
        }

        impl $trait<Expr> for f64 {
            type Output = Expr;
            fn $method(self, rhs: Expr) -> Expr {
                $func(Expr::constant(self), rhs)
            }
        }

        impl $trait<&Expr> for f64 {
            type Output = Expr;
            fn $method(self, rhs: &Expr) -> Expr {
                $func(Expr::constant(self), rhs.clone())
            }
        }
    };
}

impl_binary_op!(Add, add, add);
impl_binary_op!(Sub, sub, sub);
impl_binary_op!(Mul, mul, mul);
impl_binary_op!(Div, div, div);

macro_rules! impl_assign_op {
    ($trait:ident, $method:ident, $func:ident) => {
        impl<T: Into<Expr>> $trait<T> for Expr {
            fn $method(&mut self, rhs: T) {
                let lhs = std::mem::replace(self, Expr::zero());
                *self = $func(lhs, rhs.into());
            }
        }
    };
}

impl_assign_op!(AddAssign, add_assign, add);
impl_assign_op!(SubAssign, sub_assign, sub);
impl_assign_op!(MulAssign, mul_assign, mul);

impl Neg for Expr {
    type Output = Expr;
    fn neg(self) -> Expr {
        neg(self)
    }
}

impl Neg for &Expr {
    type Output = Expr;
    fn neg(self) -> Expr {
        neg(self.clone())
    }
}

/// Adds `terms` pairwise, so the result is only logarithmically deep.
pub(crate) fn balanced_sum(mut terms: Vec<Expr>) -> Expr {
    if terms.is_empty() {
        return Expr::zero();
    }
    while terms.len() > 1 {
        let mut pairs = terms.into_iter();
        let mut next = Vec::with_capacity(pairs.len().div_ceil(2));
        while let Some(a) = pairs.next() {
            next.push(match pairs.next() {
                Some(b) => add(a, b),
                None => a,
            });
        }
        terms = next;
    }
    terms.swap_remove(0)
}

impl Sum for Expr {
    fn sum<I: Iterator<Item = Expr>>(iter: I) -> Expr {
        balanced_sum(iter.collect())
    }
}

impl<'a> Sum<&'a Expr> for Expr {
    fn sum<I: Iterator<Item = &'a Expr>>(iter: I) -> Expr {
        balanced_sum(iter.cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Vector;

    fn depth(expr: &Expr) -> usize {
        let mut deepest = 0;
        let mut pending = vec![(expr, 1)];
        while let Some((e, d)) = pending.pop() {
            deepest = deepest.max(d);
            pending.extend(e.node().operands().map(|o| (o, d + 1)));
        }
        deepest
    }

    #[test]
    fn sums_are_balanced() {
        let u = Vector::symbolic("u", 1024);
        let total: Expr = u.iter().sum();
        assert_eq!(depth(&total), 11);
    }

    #[test]
    fn sum_of_nothing_is_zero() {
        assert_eq!(std::iter::empty::<Expr>().sum::<Expr>(), Expr::zero());
        let u = Vector::symbolic("u", 1);
        assert_eq!(u.iter().sum::<Expr>(), u[0]);
    }
}
