use proptest::prelude::*;
use std::collections::HashMap;

use r65asm::expr::{Expr, ExprRef, Func};
use r65asm::label::Labels;
use r65asm::range::{evaluate, Interval};

const NAMES: [&str; 4] = ["a", "b", "c", "d"];

/// Concrete evaluation with every label bound to a single value. Arithmetic
/// saturates the same way interval bounds do.
fn concrete(expr: &Expr, values: &HashMap<String, i64>) -> i64 {
    match expr {
        Expr::Literal(v) => *v as i64,
        Expr::Label(name) => values[name],
        Expr::AddressOf(e) => concrete(e, values),
        Expr::Add(l, r) => concrete(l, values).saturating_add(concrete(r, values)),
        Expr::Sub(l, r) => concrete(l, values).saturating_sub(concrete(r, values)),
        Expr::Mul(l, r) => concrete(l, values).saturating_mul(concrete(r, values)),
        Expr::Func(Func::Lo, e) => concrete(e, values) & 0xFF,
        Expr::Func(Func::Hi, e) => concrete(e, values) >> 8,
        Expr::Reg(_) | Expr::Indirect(_) => unreachable!("not generated"),
    }
}

/// Literals of either sign.
fn literal() -> impl Strategy<Value = ExprRef> {
    (any::<u16>(), any::<bool>()).prop_map(|(v, negative)| match negative {
        true => Expr::sub(Expr::lit(0), Expr::lit(v)),
        false => Expr::lit(v),
    })
}

/// Products of up to four literals, reaching past the i64 limits.
fn large() -> impl Strategy<Value = ExprRef> {
    prop::collection::vec(literal(), 2..=4).prop_map(|factors| {
        factors
            .into_iter()
            .reduce(Expr::mul)
            .unwrap_or_else(|| Expr::lit(0))
    })
}

fn leaf() -> impl Strategy<Value = ExprRef> {
    prop_oneof![
        3 => literal(),
        3 => prop::sample::select(NAMES.to_vec()).prop_map(Expr::label),
        1 => large(),
    ]
}

fn expr() -> impl Strategy<Value = ExprRef> {
    leaf().prop_recursive(4, 24, 2, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(l, r)| Expr::add(l, r)),
            (inner.clone(), inner.clone()).prop_map(|(l, r)| Expr::sub(l, r)),
            (inner.clone(), inner.clone()).prop_map(|(l, r)| Expr::mul(l, r)),
            inner.clone().prop_map(|e| Expr::func(Func::Lo, e)),
            inner.clone().prop_map(|e| Expr::func(Func::Hi, e)),
            inner.prop_map(Expr::addr),
        ]
    })
}

/// Label intervals inside the address space plus one sample position per
/// label, as a fraction of the interval width.
fn labels() -> impl Strategy<Value = Vec<(i64, i64, f64)>> {
    prop::collection::vec(
        (0i64..=0xFFFF, 0i64..0x400, 0.0f64..=1.0),
        NAMES.len(),
    )
}

proptest! {
    #[test]
    fn evaluation_contains_every_assignment(expr in expr(), bounds in labels()) {
        let table: Labels = NAMES
            .iter()
            .zip(&bounds)
            .map(|(name, &(lo, width, _))| {
                let hi = (lo + width).min(0xFFFF);
                (name.to_string(), Interval::new(lo, hi))
            })
            .collect();
        let values: HashMap<String, i64> = NAMES
            .iter()
            .zip(&bounds)
            .map(|(name, &(lo, width, t))| {
                let hi = (lo + width).min(0xFFFF);
                let v = lo + ((hi - lo) as f64 * t).round() as i64;
                (name.to_string(), v.clamp(lo, hi))
            })
            .collect();

        let range = evaluate(&expr, &table).map_err(|e| TestCaseError::fail(e.to_string()))?;
        let value = concrete(&expr, &values);
        prop_assert!(range.lo <= range.hi, "{} gave {}", expr, range);
        prop_assert!(range.contains(value), "{} = {} outside {}", expr, value, range);
    }

    #[test]
    fn points_evaluate_exactly(expr in expr(), bounds in labels()) {
        let table: Labels = NAMES
            .iter()
            .zip(&bounds)
            .map(|(name, &(lo, _, _))| (name.to_string(), Interval::point(lo)))
            .collect();
        let values: HashMap<String, i64> = NAMES
            .iter()
            .zip(&bounds)
            .map(|(name, &(lo, _, _))| (name.to_string(), lo))
            .collect();

        let range = evaluate(&expr, &table).map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert_eq!(range, Interval::point(concrete(&expr, &values)));
    }
}
