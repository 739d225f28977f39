//! Addressing-mode inference for operand expressions.
//!
//! Plain values and addresses are decided from their intervals alone. Forms
//! that involve a register or an indirection are decided from the shape of
//! the expression, which is why there are two stages.

use arch::AddressingMode;

use crate::error::Error;
use crate::expr::{Expr, ExprRef, Reg};
use crate::label::Labels;
use crate::range::Interval;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    RegA,
    RegX,
    RegY,
    Value,
    Address,
    Complex,
}

/// Stage 1: what kind of operand `expr` is, and the values it can take.
///
/// Unknown labels count as anywhere in the address space so that a forward
/// reference can be classified before layout has narrowed it.
pub fn classify(expr: &Expr, labels: &Labels) -> (ParamKind, Interval) {
    use ParamKind::*;

    let complex = (Complex, Interval::UNKNOWN);
    match expr {
        Expr::Literal(v) => (Value, Interval::point(*v as i64)),
        Expr::Label(name) => (Address, labels.get(name).unwrap_or(Interval::UNKNOWN)),
        Expr::Reg(Reg::A) => (RegA, Interval::UNKNOWN),
        Expr::Reg(Reg::X) => (RegX, Interval::UNKNOWN),
        Expr::Reg(Reg::Y) => (RegY, Interval::UNKNOWN),
        Expr::AddressOf(e) => match classify(e, labels) {
            (Value | Address, range) => (Address, range),
            _ => complex,
        },
        Expr::Add(l, r) => match (classify(l, labels), classify(r, labels)) {
            ((kind @ (Value | Address), l), (Value, r)) => (kind, l + r),
            ((Value, l), (Address, r)) => (Address, l + r),
            _ => complex,
        },
        Expr::Sub(l, r) => match (classify(l, labels), classify(r, labels)) {
            ((kind @ (Value | Address), l), (Value, r)) => (kind, l - r),
            ((Address, l), (Address, r)) => {
                let diff = l - r;
                let lo = diff.lo.max(0);
                (Value, Interval::new(lo, diff.hi.max(lo)))
            }
            _ => complex,
        },
        Expr::Mul(l, r) => match (classify(l, labels), classify(r, labels)) {
            ((Value, l), (Value, r)) => (Value, l * r),
            _ => complex,
        },
        Expr::Func(func, e) => match classify(e, labels) {
            (Value | Address, range) => (Value, range.apply(*func)),
            _ => complex,
        },
        Expr::Indirect(_) => complex,
    }
}

/// Stage 2: register-indexed and indirect forms, decided structurally.
///
/// Returns the mode together with the sub-expression that supplies the
/// operand bytes.
pub fn resolve_complex(expr: &Expr, labels: &Labels) -> Result<(AddressingMode, ExprRef), Error> {
    use AddressingMode::*;

    match expr {
        Expr::Add(l, r) => {
            let (lmode, lparam) = determine_addressing_mode(l, labels)?;
            let (rmode, rparam) = determine_addressing_mode(r, labels)?;
            let (mode, param) = match (lmode, rmode) {
                (Zpg, RegX) => (ZpgX, lparam),
                (Zpg, RegY) => (ZpgY, lparam),
                (Abs, RegX) => (AbsX, lparam),
                (Abs, RegY) => (AbsY, lparam),
                (Ind, RegY) => (IndY, lparam),
                (RegX, Zpg) => (ZpgX, rparam),
                (RegX, Abs) => (AbsX, rparam),
                (RegY, Zpg) => (ZpgY, rparam),
                (RegY, Abs) => (AbsY, rparam),
                (RegY, Ind) => (IndY, rparam),
                _ => return Err(Error::UnsupportedAddressingMode),
            };
            let param = param.ok_or(Error::UnsupportedAddressingMode)?;
            Ok((mode, param))
        }
        Expr::Indirect(inner) => {
            let (mode, param) = determine_addressing_mode(inner, labels)?;
            let mode = match mode {
                Zpg => Ind,
                ZpgX => IndX,
                _ => return Err(Error::UnsupportedIndirection),
            };
            let param = param.ok_or(Error::UnsupportedIndirection)?;
            Ok((mode, param))
        }
        _ => Err(Error::UnsupportedExpression),
    }
}

/// Picks the addressing mode of an instruction operand.
///
/// Register operands carry no operand expression; every other mode returns
/// the expression whose value is encoded after the opcode.
pub fn determine_addressing_mode(
    expr: &ExprRef,
    labels: &Labels,
) -> Result<(AddressingMode, Option<ExprRef>), Error> {
    match classify(expr, labels) {
        (ParamKind::Value, range) => {
            if !range.within(0x00, 0xFF) {
                return Err(Error::ValueOutOfRange(range.lo, range.hi));
            }
            Ok((AddressingMode::Imm, Some(expr.clone())))
        }
        (ParamKind::Address, range) => {
            if !range.within(0x0000, 0xFFFF) {
                return Err(Error::ValueOutOfRange(range.lo, range.hi));
            }
            if range.lo < 0x100 && range.hi >= 0x100 {
                return Err(Error::AmbiguousPageZero(range.lo, range.hi));
            }
            let mode = match range.hi < 0x100 {
                true => AddressingMode::Zpg,
                false => AddressingMode::Abs,
            };
            Ok((mode, Some(expr.clone())))
        }
        (ParamKind::RegA, _) => Ok((AddressingMode::Acc, None)),
        (ParamKind::RegX, _) => Ok((AddressingMode::RegX, None)),
        (ParamKind::RegY, _) => Ok((AddressingMode::RegY, None)),
        (ParamKind::Complex, _) => {
            let (mode, param) = resolve_complex(expr, labels)?;
            Ok((mode, Some(param)))
        }
    }
}
