//! Interval evaluation of operand expressions.
//!
//! Labels are not known exactly until layout settles, so every expression is
//! evaluated to the closed range of values it can still take.

use std::fmt;
use std::ops::{Add, Sub, Mul};

use crate::error::Error;
use crate::expr::{Expr, Func};
use crate::label::Labels;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub lo: i64,
    pub hi: i64,
}

impl Interval {
    /// Anything in the 16-bit address space.
    pub const UNKNOWN: Interval = Interval { lo: 0, hi: 0xFFFF };

    pub fn new(lo: i64, hi: i64) -> Self {
        debug_assert!(lo <= hi, "inverted interval [{lo}, {hi}]");
        Interval { lo, hi }
    }

    pub fn point(v: i64) -> Self {
        Interval { lo: v, hi: v }
    }

    pub fn is_point(&self) -> bool {
        self.lo == self.hi
    }

    pub fn value(&self) -> Option<i64> {
        self.is_point().then_some(self.lo)
    }

    pub fn within(&self, lo: i64, hi: i64) -> bool {
        lo <= self.lo && self.hi <= hi
    }

    pub fn contains(&self, v: i64) -> bool {
        self.lo <= v && v <= self.hi
    }

    /// Low byte: exact only while the whole range shares one high byte.
    pub fn lo_byte(self) -> Self {
        if self.lo >> 8 == self.hi >> 8 {
            Interval::new(self.lo & 0xFF, self.hi & 0xFF)
        } else {
            Interval::new(0x00, 0xFF)
        }
    }

    pub fn hi_byte(self) -> Self {
        Interval::new(self.lo >> 8, self.hi >> 8)
    }

    pub fn apply(self, func: Func) -> Self {
        match func {
            Func::Lo => self.lo_byte(),
            Func::Hi => self.hi_byte(),
        }
    }
}

// Bounds saturate at the i64 limits. A saturated bound is far outside any
// byte or word, so it is rejected wherever the value is used.
impl Add for Interval {
    type Output = Interval;
    fn add(self, rhs: Interval) -> Interval {
        Interval::new(self.lo.saturating_add(rhs.lo), self.hi.saturating_add(rhs.hi))
    }
}

impl Sub for Interval {
    type Output = Interval;
    fn sub(self, rhs: Interval) -> Interval {
        Interval::new(self.lo.saturating_sub(rhs.hi), self.hi.saturating_sub(rhs.lo))
    }
}

impl Mul for Interval {
    type Output = Interval;
    fn mul(self, rhs: Interval) -> Interval {
        let corners = [
            self.lo.saturating_mul(rhs.lo),
            self.lo.saturating_mul(rhs.hi),
            self.hi.saturating_mul(rhs.lo),
            self.hi.saturating_mul(rhs.hi),
        ];
        let lo = corners.iter().copied().min().unwrap_or(0);
        let hi = corners.iter().copied().max().unwrap_or(0);
        Interval::new(lo, hi)
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value() {
            Some(v) => write!(f, "${:04X}", v),
            None => write!(f, "[${:04X}, ${:04X}]", self.lo, self.hi),
        }
    }
}

/// Evaluates `expr` against the current label intervals.
pub fn evaluate(expr: &Expr, labels: &Labels) -> Result<Interval, Error> {
    match expr {
        Expr::Literal(v) => Ok(Interval::point(*v as i64)),
        Expr::Label(name) => labels
            .get(name)
            .ok_or_else(|| Error::UnknownLabel(name.clone())),
        Expr::Reg(_) | Expr::Indirect(_) => Err(Error::NonStaticValue),
        Expr::AddressOf(e) => evaluate(e, labels),
        Expr::Add(l, r) => Ok(evaluate(l, labels)? + evaluate(r, labels)?),
        Expr::Sub(l, r) => Ok(evaluate(l, labels)? - evaluate(r, labels)?),
        Expr::Mul(l, r) => Ok(evaluate(l, labels)? * evaluate(r, labels)?),
        Expr::Func(func, e) => Ok(evaluate(e, labels)?.apply(*func)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Reg;

    fn labels() -> Labels {
        [
            ("a".to_string(), Interval::new(0x10, 0x20)),
            ("b".to_string(), Interval::new(2, 3)),
            ("page".to_string(), Interval::new(0x12F0, 0x1310)),
        ]
        .into_iter()
        .collect()
    }

    macro_rules! test_eval {
        ($($name:ident: $expr:expr => $expect:expr,)*) => {
            $(
                #[test]
                fn $name() {
                    let expr = $expr;
                    let result = evaluate(&expr, &labels());
                    println!("{} -> {:?}", expr, result);
                    assert_eq!(result.ok(), $expect);
                }
            )*
        }
    }

    test_eval! {
        eval_literal: Expr::lit(0x1234) => Some(Interval::point(0x1234)),
        eval_label: Expr::label("a") => Some(Interval::new(0x10, 0x20)),
        eval_add: Expr::add(Expr::label("a"), Expr::label("b")) => Some(Interval::new(0x12, 0x23)),
        eval_sub: Expr::sub(Expr::label("a"), Expr::label("b")) => Some(Interval::new(0x0D, 0x1E)),
        eval_sub_negative: Expr::sub(Expr::label("b"), Expr::label("a")) => Some(Interval::new(-0x1E, -0x0D)),
        eval_mul: Expr::mul(Expr::label("b"), Expr::label("a")) => Some(Interval::new(0x20, 0x60)),
        eval_mul_negative: Expr::mul(
            Expr::sub(Expr::lit(0), Expr::label("b")),
            Expr::label("b")
        ) => Some(Interval::new(-9, -4)),
        eval_lo_same_page: Expr::func(Func::Lo, Expr::label("a")) => Some(Interval::new(0x10, 0x20)),
        eval_lo_cross_page: Expr::func(Func::Lo, Expr::label("page")) => Some(Interval::new(0x00, 0xFF)),
        eval_hi: Expr::func(Func::Hi, Expr::label("page")) => Some(Interval::new(0x12, 0x13)),
        eval_address_of: Expr::addr(Expr::lit(0x44)) => Some(Interval::point(0x44)),
        eval_register: Expr::reg(Reg::X) => None,
        eval_indirect: Expr::ind(Expr::lit(0x10)) => None,
        eval_unknown: Expr::label("nowhere") => None,
        eval_mul_saturates: Expr::mul(
            Expr::mul(Expr::mul(Expr::mul(Expr::lit(0xFFFF), Expr::lit(0xFFFF)), Expr::lit(0xFFFF)), Expr::lit(0xFFFF)),
            Expr::lit(0xFFFF)
        ) => Some(Interval::point(i64::MAX)),
        eval_sub_saturates: Expr::sub(
            Expr::sub(Expr::lit(0), Expr::mul(Expr::mul(Expr::mul(Expr::mul(Expr::lit(0xFFFF), Expr::lit(0xFFFF)), Expr::lit(0xFFFF)), Expr::lit(0xFFFF)), Expr::lit(0xFFFF))),
            Expr::lit(0xFFFF)
        ) => Some(Interval::point(i64::MIN)),
        eval_add_saturates_one_bound: Expr::add(
            Expr::mul(Expr::mul(Expr::mul(Expr::mul(Expr::label("a"), Expr::lit(0xFFFF)), Expr::lit(0xFFFF)), Expr::lit(0xFFFF)), Expr::lit(0x800)),
            Expr::label("b")
        ) => Some(Interval::new(0x10 * 0xFFFF_i64.pow(3) * 0x800 + 2, i64::MAX)),
    }

    #[test]
    fn first_error_wins() {
        let expr = Expr::add(Expr::label("nowhere"), Expr::reg(Reg::A));
        assert!(matches!(
            evaluate(&expr, &labels()),
            Err(Error::UnknownLabel(name)) if name == "nowhere"
        ));
    }
}
