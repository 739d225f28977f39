use std::fmt;
use std::rc::Rc;

use strum::{Display, EnumString};

/// Built-in byte selectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Func {
    Lo,
    Hi,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display)]
pub enum Reg {
    A,
    X,
    Y,
}

/// Sub-expressions are reference counted so a named constant can be
/// substituted into many instructions without copying.
pub type ExprRef = Rc<Expr>;

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(u16),
    Label(String),
    Reg(Reg),
    AddressOf(ExprRef),
    Add(ExprRef, ExprRef),
    Sub(ExprRef, ExprRef),
    Mul(ExprRef, ExprRef),
    Indirect(ExprRef),
    Func(Func, ExprRef),
}

impl Expr {
    pub fn lit(value: u16) -> ExprRef {
        Rc::new(Expr::Literal(value))
    }

    pub fn label(name: &str) -> ExprRef {
        Rc::new(Expr::Label(name.to_string()))
    }

    pub fn reg(reg: Reg) -> ExprRef {
        Rc::new(Expr::Reg(reg))
    }

    pub fn addr(e: ExprRef) -> ExprRef {
        Rc::new(Expr::AddressOf(e))
    }

    pub fn add(lhs: ExprRef, rhs: ExprRef) -> ExprRef {
        Rc::new(Expr::Add(lhs, rhs))
    }

    pub fn sub(lhs: ExprRef, rhs: ExprRef) -> ExprRef {
        Rc::new(Expr::Sub(lhs, rhs))
    }

    pub fn mul(lhs: ExprRef, rhs: ExprRef) -> ExprRef {
        Rc::new(Expr::Mul(lhs, rhs))
    }

    pub fn ind(e: ExprRef) -> ExprRef {
        Rc::new(Expr::Indirect(e))
    }

    pub fn func(f: Func, e: ExprRef) -> ExprRef {
        Rc::new(Expr::Func(f, e))
    }

    /// Every label name the expression refers to, in source order.
    pub fn labels(&self) -> Vec<&str> {
        let mut out = vec![];
        self.collect_labels(&mut out);
        out
    }

    fn collect_labels<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Expr::Label(name) => out.push(name),
            Expr::Literal(_) | Expr::Reg(_) => {}
            Expr::AddressOf(e) | Expr::Indirect(e) | Expr::Func(_, e) => e.collect_labels(out),
            Expr::Add(l, r) | Expr::Sub(l, r) | Expr::Mul(l, r) => {
                l.collect_labels(out);
                r.collect_labels(out);
            }
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(v) if *v < 0x100 => write!(f, "${:02X}", v),
            Expr::Literal(v) => write!(f, "${:04X}", v),
            Expr::Label(name) => write!(f, "@{}", name),
            Expr::Reg(reg) => write!(f, "{}", reg),
            Expr::AddressOf(e) => write!(f, "#{}", e),
            Expr::Add(l, r) => write!(f, "{} + {}", l, r),
            Expr::Sub(l, r) => write!(f, "{} - {}", l, r),
            Expr::Mul(l, r) => write!(f, "{} * {}", l, r),
            Expr::Indirect(e) => write!(f, "[{}]", e),
            Expr::Func(func, e) => write!(f, "{}({})", func, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        let e = Expr::add(Expr::ind(Expr::label("ptr")), Expr::reg(Reg::Y));
        assert_eq!(e.to_string(), "[@ptr] + Y");
        let e = Expr::func(Func::Hi, Expr::add(Expr::label("tbl"), Expr::lit(0x0100)));
        assert_eq!(e.to_string(), "hi(@tbl + $0100)");
        assert_eq!(Expr::addr(Expr::lit(0x20)).to_string(), "#$20");
    }

    #[test]
    fn labels() {
        let e = Expr::sub(Expr::label("end"), Expr::mul(Expr::label("start"), Expr::lit(2)));
        assert_eq!(e.labels(), vec!["end", "start"]);
    }
}
